//! Report writers

mod csv;
mod json;

pub use self::csv::CsvWriter;
pub use self::json::JsonWriter;

use crate::error::{OutputError, Result};
use crate::harvest::HarvestReport;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Whole report as one JSON document
    #[default]
    Json,
    /// One JSON record per line
    NdJson,
    /// Records only, one column per field
    Csv,
}

impl FromStr for OutputFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "ndjson" | "jsonl" => Ok(OutputFormat::NdJson),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(OutputError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutputFormat::Json => "json",
            OutputFormat::NdJson => "ndjson",
            OutputFormat::Csv => "csv",
        };
        f.write_str(s)
    }
}

/// Sink for a finished harvest
pub trait OutputWriter {
    fn write_report(&mut self, report: &HarvestReport) -> Result<()>;

    /// Flush buffered output
    fn finalize(&mut self) -> Result<()>;
}

/// Create a writer for `format`; `None` writes to stdout
pub fn create_writer(format: OutputFormat, path: Option<&Path>) -> Result<Box<dyn OutputWriter>> {
    let output = open_output(path)?;
    Ok(match format {
        OutputFormat::Json => Box::new(JsonWriter::new(output, false)),
        OutputFormat::NdJson => Box::new(JsonWriter::new(output, true)),
        OutputFormat::Csv => Box::new(CsvWriter::new(output)),
    })
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write + Send>> {
    Ok(match path {
        Some(p) => {
            let file = File::create(p)
                .map_err(|e| OutputError::FileCreate(format!("{}: {}", p.display(), e)))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout())),
    })
}
