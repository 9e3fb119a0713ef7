//! JSON output writer

use crate::error::{OutputError, Result};
use crate::harvest::HarvestReport;
use crate::output::OutputWriter;
use std::io::Write;

/// JSON writer: the whole report, or one record per line
pub struct JsonWriter {
    writer: Box<dyn Write + Send>,
    lines: bool,
}

impl JsonWriter {
    pub fn new(writer: Box<dyn Write + Send>, lines: bool) -> Self {
        Self { writer, lines }
    }
}

impl OutputWriter for JsonWriter {
    fn write_report(&mut self, report: &HarvestReport) -> Result<()> {
        if self.lines {
            for record in &report.records {
                serde_json::to_writer(&mut self.writer, record)
                    .map_err(|e| OutputError::JsonWrite(e.to_string()))?;
                writeln!(self.writer).map_err(|e| OutputError::JsonWrite(e.to_string()))?;
            }
        } else {
            serde_json::to_writer_pretty(&mut self.writer, report)
                .map_err(|e| OutputError::JsonWrite(e.to_string()))?;
            writeln!(self.writer).map_err(|e| OutputError::JsonWrite(e.to_string()))?;
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| OutputError::JsonWrite(e.to_string()))?;
        Ok(())
    }
}
