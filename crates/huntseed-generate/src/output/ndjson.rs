use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::clock::format_timestamp;
use crate::errors::GenerationError;

/// Timestamp wrapped as `{"$date": "<iso>"}` for document-store importers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypedDate(pub DateTime<Utc>);

#[derive(Serialize, Deserialize)]
struct DateWrapper {
    #[serde(rename = "$date")]
    date: String,
}

impl Serialize for TypedDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        DateWrapper {
            date: format_timestamp(&self.0),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TypedDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wrapper = DateWrapper::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&wrapper.date)
            .map(|date| TypedDate(date.with_timezone(&Utc)))
            .map_err(D::Error::custom)
    }
}

/// Render `record` as one newline-terminated JSON line.
pub fn encode_line<T: Serialize>(record: &T) -> Result<String, GenerationError> {
    let mut line = serde_json::to_string(record)?;
    line.push('\n');
    Ok(line)
}
