use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::errors::GenerationError;
use crate::output::csv::CountingWriter;

/// What a finished sink wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SinkSummary {
    pub path: PathBuf,
    pub lines: u64,
    pub bytes: u64,
}

/// Append-only writer for one fixture file.
///
/// The file only survives a successful [`FixtureSink::finish`]; a sink that is
/// aborted or dropped first removes what it wrote.
pub struct FixtureSink {
    path: PathBuf,
    writer: Option<CountingWriter<BufWriter<File>>>,
    lines: u64,
}

impl FixtureSink {
    /// Create `dir` if needed, drop any stale `file_name` in it, and open a
    /// fresh file.
    pub fn create(dir: &Path, file_name: &str) -> Result<Self, GenerationError> {
        ensure_directory(dir)?;
        let path = dir.join(file_name);
        remove_if_exists(&path)?;
        let file = File::create(&path)?;
        Ok(Self {
            path,
            writer: Some(CountingWriter::new(BufWriter::new(file))),
            lines: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines(&self) -> u64 {
        self.lines
    }

    pub fn write_line(&mut self, line: &str) -> Result<(), GenerationError> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            GenerationError::InvalidOptions(format!("sink {} is closed", self.path.display()))
        })?;
        writer.write_all(line.as_bytes())?;
        self.lines += 1;
        Ok(())
    }

    /// Flush, fsync and close the file.
    pub fn finish(mut self) -> Result<SinkSummary, GenerationError> {
        let Some(writer) = self.writer.take() else {
            return Err(GenerationError::InvalidOptions(format!(
                "sink {} is already closed",
                self.path.display()
            )));
        };
        match close(writer) {
            Ok(bytes) => Ok(SinkSummary {
                path: self.path.clone(),
                lines: self.lines,
                bytes,
            }),
            Err(err) => {
                discard_file(&self.path);
                Err(err)
            }
        }
    }

    /// Close the file and remove it.
    pub fn abort(mut self) {
        self.discard();
    }

    fn discard(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
            drop(writer);
            discard_file(&self.path);
        }
    }
}

impl Drop for FixtureSink {
    fn drop(&mut self) {
        self.discard();
    }
}

/// Run `body` against a fresh sink, finishing it on success and removing the
/// partial file on failure.
pub fn with_sink<T, F>(
    dir: &Path,
    file_name: &str,
    body: F,
) -> Result<(T, SinkSummary), GenerationError>
where
    F: FnOnce(&mut FixtureSink) -> Result<T, GenerationError>,
{
    let mut sink = FixtureSink::create(dir, file_name)?;
    match body(&mut sink) {
        Ok(value) => {
            let summary = sink.finish()?;
            Ok((value, summary))
        }
        Err(err) => {
            sink.abort();
            Err(err)
        }
    }
}

fn close(writer: CountingWriter<BufWriter<File>>) -> Result<u64, GenerationError> {
    let bytes = writer.bytes_written();
    let file = writer.into_inner().into_inner().map_err(|err| err.into_error())?;
    file.sync_all()?;
    Ok(bytes)
}

fn ensure_directory(dir: &Path) -> Result<(), GenerationError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        info!(dir = %dir.display(), "output directory created");
    }
    Ok(())
}

fn remove_if_exists(path: &Path) -> Result<(), GenerationError> {
    if path.exists() {
        std::fs::remove_file(path)?;
        info!(path = %path.display(), "existing fixture removed");
    }
    Ok(())
}

fn discard_file(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => warn!(path = %path.display(), "partial fixture removed"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => warn!(path = %path.display(), error = %err, "failed to remove partial fixture"),
    }
}
