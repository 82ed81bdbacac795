//! CSV/TSV parser with delimiter detection.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use super::source::{DataTable, DatasetSource};
use crate::error::{DatalensError, Result};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
        }
    }
}

/// Parses tabular data files into [`DataTable`]s.
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the data table plus source metadata.
    ///
    /// The SHA-256 of the raw bytes becomes the dataset version id, so the
    /// same bytes always map to the same version.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(DataTable, DatasetSource)> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|e| DatalensError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(|e| DatalensError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let dataset_version_id = format!("sha256:{:x}", hasher.finalize());

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents),
        };

        let table = self.parse_bytes(&contents, delimiter)?;

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        }
        .to_string();

        let source = DatasetSource::new(
            path.to_path_buf(),
            dataset_version_id,
            contents.len() as u64,
            format,
            table.row_count(),
            table.column_count(),
        );

        Ok((table, source))
    }

    /// Parse raw bytes with a known delimiter.
    ///
    /// Emptiness is not an error here; the profiler owns that check so that
    /// in-memory tables get the same treatment as files.
    pub fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<DataTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(self.config.has_header)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = if self.config.has_header {
            reader.headers()?.iter().map(|s| s.to_string()).collect()
        } else {
            Vec::new()
        };

        let mut rows = Vec::new();
        let mut width = headers.len();

        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }

            let record = result?;
            if width == 0 {
                width = record.len();
            }

            let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
            // Normalize ragged rows to the header width.
            row.resize(width, String::new());
            rows.push(row);
        }

        let headers = if headers.is_empty() {
            (0..width).map(|i| format!("column_{}", i + 1)).collect()
        } else {
            headers
        };

        Ok(DataTable::new(headers, rows, delimiter))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Detect the delimiter by scoring candidate consistency across the first lines.
fn detect_delimiter(bytes: &[u8]) -> u8 {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    let mut best_delimiter = b',';
    let mut best_score = 0usize;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let Some(&first_count) = counts.first() else {
            continue;
        };
        if first_count == 0 {
            continue;
        }

        // A delimiter that appears the same number of times in every line is
        // almost certainly the real one.
        let score = if counts.iter().all(|&c| c == first_count) {
            first_count * 1000
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    best_delimiter
}

/// Count delimiter occurrences in a line, respecting double quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"a,b,c\n1,2,3\n4,5,6";
        assert_eq!(detect_delimiter(data), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"a\tb\tc\n1\t2\t3\n4\t5\t6";
        assert_eq!(detect_delimiter(data), b'\t');
    }

    #[test]
    fn test_detect_delimiter_quoted_commas() {
        let data = b"a;b\n\"x,y\";2\n\"p,q\";4";
        assert_eq!(detect_delimiter(data), b';');
    }

    #[test]
    fn test_parse_csv() {
        let parser = Parser::new();
        let data = b"name,age,city\nAlice,30,NYC\nBob,25,LA";
        let table = parser.parse_bytes(data, b',').unwrap();

        assert_eq!(table.headers, vec!["name", "age", "city"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(0, 0), Some("Alice"));
        assert_eq!(table.get(1, 1), Some("25"));
    }

    #[test]
    fn test_parse_ragged_rows() {
        let parser = Parser::new();
        let data = b"a,b,c\n1,2\n4,5,6,7";
        let table = parser.parse_bytes(data, b',').unwrap();

        assert_eq!(table.get(0, 2), Some(""));
        assert_eq!(table.rows[1].len(), 3);
    }

    #[test]
    fn test_parse_empty_input_yields_empty_table() {
        let parser = Parser::new();
        let table = parser.parse_bytes(b"a,b\n", b',').unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 2);
    }
}
