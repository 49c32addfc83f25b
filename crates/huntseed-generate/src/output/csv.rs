use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::clock::format_timestamp;
use crate::errors::GenerationError;

/// Marker written for absent optional values; bulk loaders read it as NULL.
pub const NULL_MARKER: &str = "\\N";

/// One typed cell of a tabular fixture row.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<'a> {
    Id(u64),
    Int(i64),
    Bool(bool),
    Text(Cow<'a, str>),
    Timestamp(DateTime<Utc>),
    Null,
}

impl<'a> Field<'a> {
    pub fn text(value: &'a str) -> Self {
        Field::Text(Cow::Borrowed(value))
    }

    pub fn lines(values: &[String]) -> Self {
        Field::Text(Cow::Owned(values.join("\n")))
    }

    pub fn optional_timestamp(value: Option<DateTime<Utc>>) -> Self {
        value.map(Field::Timestamp).unwrap_or(Field::Null)
    }
}

/// A record that renders as one CSV line under a fixed header.
pub trait TabularRecord {
    const HEADER: &'static [&'static str];

    fn fields(&self) -> Vec<Field<'_>>;
}

pub fn header_line(header: &[&str]) -> String {
    let mut line = header.join(",");
    line.push('\n');
    line
}

/// Append `fields` to `out` as one newline-terminated line.
///
/// Text and timestamps are always quoted with inner quotes doubled, booleans
/// are `1`/`0`, and nulls are the bare [`NULL_MARKER`].
pub fn encode_row(fields: &[Field<'_>], out: &mut String) {
    for (index, field) in fields.iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        match field {
            Field::Id(value) => out.push_str(&value.to_string()),
            Field::Int(value) => out.push_str(&value.to_string()),
            Field::Bool(value) => out.push(if *value { '1' } else { '0' }),
            Field::Text(value) => push_quoted(out, value),
            Field::Timestamp(value) => push_quoted(out, &format_timestamp(value)),
            Field::Null => out.push_str(NULL_MARKER),
        }
    }
    out.push('\n');
}

pub fn encode_record<R: TabularRecord>(record: &R) -> String {
    let mut line = String::new();
    encode_row(&record.fields(), &mut line);
    line
}

fn push_quoted(out: &mut String, value: &str) {
    out.push('"');
    for ch in value.chars() {
        if ch == '"' {
            out.push_str("\"\"");
        } else {
            out.push(ch);
        }
    }
    out.push('"');
}

/// Parse a single encoded line back into raw cell values.
pub fn parse_line(line: &str) -> Result<Vec<String>, GenerationError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(line.as_bytes());
    let record = reader
        .records()
        .next()
        .transpose()?
        .ok_or_else(|| GenerationError::InvalidOptions("empty csv line".to_string()))?;
    Ok(record.iter().map(str::to_string).collect())
}

/// A generated CSV fixture loaded for random access by row index.
#[derive(Debug, Clone)]
pub struct FixtureTable {
    columns: HashMap<String, usize>,
    rows: Vec<csv::StringRecord>,
}

impl FixtureTable {
    pub fn open(path: &Path) -> Result<Self, GenerationError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)?;
        let columns = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(index, name)| (name.to_string(), index))
            .collect();
        let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
        Ok(Self { columns, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<FixtureRow<'_>> {
        self.rows.get(index).map(|record| FixtureRow {
            columns: &self.columns,
            record,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = FixtureRow<'_>> {
        self.rows.iter().map(|record| FixtureRow {
            columns: &self.columns,
            record,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixtureRow<'a> {
    columns: &'a HashMap<String, usize>,
    record: &'a csv::StringRecord,
}

impl<'a> FixtureRow<'a> {
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.columns
            .get(column)
            .and_then(|index| self.record.get(*index))
    }

    /// Like [`Self::get`], mapping the null marker to `None`.
    pub fn get_opt(&self, column: &str) -> Option<&'a str> {
        self.get(column).filter(|value| *value != NULL_MARKER)
    }

    pub fn get_u64(&self, column: &str) -> Option<u64> {
        self.get(column).and_then(|value| value.parse().ok())
    }

    pub fn get_i64(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(|value| value.parse().ok())
    }
}

/// Byte-counting writer used under the sink's buffer.
pub(crate) struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    pub(crate) fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    pub(crate) fn bytes_written(&self) -> u64 {
        self.bytes
    }

    pub(crate) fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
