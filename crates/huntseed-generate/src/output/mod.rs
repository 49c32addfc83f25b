pub mod csv;
pub mod ndjson;
