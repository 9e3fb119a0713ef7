//! CSV output writer

use crate::decode::{DecodedRecord, DecodedValue};
use crate::error::{OutputError, Result};
use crate::harvest::HarvestReport;
use crate::output::OutputWriter;
use std::collections::BTreeSet;
use std::io::Write;

/// Leading columns present on every row
const FIXED_COLUMNS: [&str; 5] = [
    "block_number",
    "transaction_hash",
    "emitter",
    "event_name",
    "selector",
];

/// CSV output writer
///
/// Field columns are the sorted union of field names across the report. A record without a
/// given field leaves that cell empty. A field named like a fixed column is headed
/// `fields.<name>`, which no event parameter can be called.
pub struct CsvWriter {
    writer: csv::Writer<Box<dyn Write + Send>>,
}

impl CsvWriter {
    pub fn new(output: Box<dyn Write + Send>) -> Self {
        Self {
            writer: csv::Writer::from_writer(output),
        }
    }

    fn columns(records: &[DecodedRecord]) -> Vec<String> {
        let names: BTreeSet<&String> = records.iter().flat_map(|r| r.fields.keys()).collect();
        names.into_iter().cloned().collect()
    }

    fn header_name(field: &str) -> String {
        if FIXED_COLUMNS.contains(&field) {
            format!("fields.{}", field)
        } else {
            field.to_string()
        }
    }

    fn row(record: &DecodedRecord, columns: &[String]) -> Vec<String> {
        let mut row = vec![
            record.block_number.to_string(),
            record.transaction_hash.to_string(),
            record.emitter.to_string(),
            record.event_name.clone(),
            record.selector.to_string(),
        ];
        row.extend(columns.iter().map(|col| {
            record
                .fields
                .get(col)
                .map(Self::value_to_string)
                .unwrap_or_default()
        }));
        row
    }

    /// Convert a decoded value to string
    fn value_to_string(value: &DecodedValue) -> String {
        match value {
            DecodedValue::Felt(f) => f.to_string(),
            DecodedValue::Uint(s) => s.clone(),
            DecodedValue::Bool(b) => b.to_string(),
            DecodedValue::String(s) => s.clone(),
        }
    }
}

impl OutputWriter for CsvWriter {
    fn write_report(&mut self, report: &HarvestReport) -> Result<()> {
        let columns = Self::columns(&report.records);

        let header = FIXED_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(columns.iter().map(|c| Self::header_name(c)));
        self.writer
            .write_record(header)
            .map_err(|e| OutputError::CsvWrite(e.to_string()))?;

        for record in &report.records {
            self.writer
                .write_record(Self::row(record, &columns))
                .map_err(|e| OutputError::CsvWrite(e.to_string()))?;
        }

        if !report.diagnostics.is_empty() {
            tracing::warn!(
                "{} diagnostics are not included in CSV output",
                report.diagnostics.len()
            );
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| OutputError::CsvWrite(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::felt::Felt;
    use std::collections::BTreeMap;

    fn record(block: u64, fields: &[(&str, DecodedValue)]) -> DecodedRecord {
        DecodedRecord {
            block_number: block,
            transaction_hash: Felt::from(block),
            emitter: Felt::from(0x10u64),
            event_name: "E".into(),
            selector: Felt::from(0x20u64),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(
            CsvWriter::value_to_string(&DecodedValue::Uint("1000".to_string())),
            "1000"
        );
        assert_eq!(CsvWriter::value_to_string(&DecodedValue::Bool(true)), "true");
        assert_eq!(
            CsvWriter::value_to_string(&DecodedValue::Felt(Felt::from(255u64))),
            "0xff"
        );
    }

    #[test]
    fn test_union_of_columns() {
        let records = vec![
            record(1, &[("name", DecodedValue::String("a, b".into()))]),
            record(2, &[("amount", DecodedValue::Uint("7".into()))]),
        ];
        assert_eq!(CsvWriter::columns(&records), vec!["amount", "name"]);

        let row = CsvWriter::row(&records[0], &CsvWriter::columns(&records));
        assert_eq!(row, vec!["1", "0x1", "0x10", "E", "0x20", "", "a, b"]);
    }

    #[derive(Clone, Default)]
    struct SharedBuf(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_field_named_like_fixed_column() {
        let records = vec![record(
            5,
            &[
                ("selector", DecodedValue::Felt(Felt::from(0x99u64))),
                ("owner", DecodedValue::Felt(Felt::from(1u64))),
            ],
        )];
        let report = HarvestReport {
            records,
            ..HarvestReport::default()
        };

        let buf = SharedBuf::default();
        let mut writer = CsvWriter::new(Box::new(buf.clone()));
        writer.write_report(&report).unwrap();
        writer.finalize().unwrap();

        let out = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        let mut lines = out.lines();
        assert_eq!(
            lines.next(),
            Some("block_number,transaction_hash,emitter,event_name,selector,owner,fields.selector")
        );
        assert_eq!(lines.next(), Some("5,0x5,0x10,E,0x20,0x1,0x99"));
    }
}
