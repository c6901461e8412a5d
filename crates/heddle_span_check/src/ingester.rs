// SPDX-License-Identifier: Apache-2.0

//! Span capture ingesters: JSON lines from a file or standard input.

use std::io::BufRead;
use std::path::PathBuf;

use crate::sample::SampleSpan;
use crate::{Error, Ingester};

fn parse_lines(reader: impl BufRead) -> Result<Vec<SampleSpan>, Error> {
    let mut spans = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| Error::IngestError {
            error: format!("line {}: {e}", index + 1),
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let span: SampleSpan = serde_json::from_str(&line).map_err(|e| Error::IngestError {
            error: format!("line {}: {e}", index + 1),
        })?;
        spans.push(span);
    }
    Ok(spans)
}

/// Reads spans from a JSON lines file, one span object per line.
pub struct JsonFileIngester {
    path: PathBuf,
}

impl JsonFileIngester {
    /// Creates an ingester for the given file.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Ingester<SampleSpan> for JsonFileIngester {
    fn ingest(&self) -> Result<Box<dyn Iterator<Item = SampleSpan>>, Error> {
        let file = std::fs::File::open(&self.path).map_err(|e| Error::IngestError {
            error: format!("{}: {e}", self.path.display()),
        })?;
        let spans = parse_lines(std::io::BufReader::new(file))?;
        Ok(Box::new(spans.into_iter()))
    }
}

/// Reads spans from standard input, one span object per line.
#[derive(Default)]
pub struct JsonStdinIngester;

impl JsonStdinIngester {
    /// Creates a stdin ingester.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Ingester<SampleSpan> for JsonStdinIngester {
    fn ingest(&self) -> Result<Box<dyn Iterator<Item = SampleSpan>>, Error> {
        let stdin = std::io::stdin();
        let spans = parse_lines(stdin.lock())?;
        Ok(Box::new(spans.into_iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_ingester() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spans.jsonl");
        std::fs::write(
            &path,
            "{\"name\": \"a\"}\n\n{\"name\": \"b\", \"attributes\": {\"k\": 1}}\n",
        )
        .unwrap();
        let spans: Vec<_> = JsonFileIngester::new(path).ingest().unwrap().collect();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].name, "b");
    }

    #[test]
    fn test_malformed_line_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spans.jsonl");
        std::fs::write(&path, "{\"name\": \"a\"}\nnot json\n").unwrap();
        let err = JsonFileIngester::new(path).ingest().err().unwrap();
        assert!(err.to_string().contains("line 2"));
    }
}
