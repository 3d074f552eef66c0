use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Two-character breaks first so CRLF / LFCR count as one separator.
    static ref LINE_BREAK: Regex = Regex::new(r"\r\n|\n\r|\r|\n").unwrap();
}

/// Split raw file text into lines, treating CR, LF, CRLF and LFCR uniformly.
pub fn split_lines(text: &str) -> Vec<&str> {
    LINE_BREAK.split(text).collect()
}

/// Column names parsed from the first line of a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderRow {
    columns: Vec<String>,
}

impl HeaderRow {
    /// Comma split with trimming. Trailing empty entries are dropped; interior
    /// ones survive here and are skipped when a dropdown is populated.
    pub fn parse(line: &str) -> Self {
        let mut columns: Vec<String> = line.split(',').map(|c| c.trim().to_string()).collect();
        while columns.last().is_some_and(|c| c.is_empty()) {
            columns.pop();
        }
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Header plus the remaining data lines of a file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestedFile {
    pub header: HeaderRow,
    pub body: Vec<String>,
}

pub fn ingest(text: &str) -> IngestedFile {
    let mut lines = split_lines(text).into_iter();
    let header = lines.next().map(HeaderRow::parse).unwrap_or_default();
    let body = lines.map(str::to_string).collect();
    IngestedFile { header, body }
}
