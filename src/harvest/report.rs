//! Harvest results and per-event diagnostics

use super::window::ScanWindow;
use crate::decode::{DecodedRecord, FragmentError};
use crate::error::DecodeError;
use crate::felt::Felt;
use crate::ledger::RawEvent;
use serde::Serialize;
use std::fmt;

/// Category of a skipped or degraded event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// ByteArray layout did not match; event skipped
    MalformedByteArray,
    /// No decoder for `keys[0]`, or the payload shape disagrees with the schema; event skipped
    SchemaMismatch,
    /// A u256 did not fit; event skipped
    Overflow,
    /// A field value was out of range for its type; event skipped
    InvalidValue,
    /// A ByteArray word decoded as an empty fragment; record kept
    LossyFragment,
}

impl DiagnosticKind {
    /// Whether the event was dropped from the output
    pub fn is_skip(&self) -> bool {
        !matches!(self, DiagnosticKind::LossyFragment)
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticKind::MalformedByteArray => "malformed_byte_array",
            DiagnosticKind::SchemaMismatch => "schema_mismatch",
            DiagnosticKind::Overflow => "overflow",
            DiagnosticKind::InvalidValue => "invalid_value",
            DiagnosticKind::LossyFragment => "lossy_fragment",
        };
        f.write_str(s)
    }
}

/// Identity of an event plus what went wrong with it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub block_number: u64,
    pub transaction_hash: Felt,
    /// Position of the event among the events its window returned, in ledger order
    pub event_index: usize,
    pub selector: Option<Felt>,
    pub kind: DiagnosticKind,
    pub reason: String,
}

impl Diagnostic {
    /// Diagnostic for an event that failed to decode
    pub fn skipped(event: &RawEvent, event_index: usize, error: &DecodeError) -> Self {
        let kind = match error {
            DecodeError::MalformedByteArray { .. } => DiagnosticKind::MalformedByteArray,
            DecodeError::Overflow(_) => DiagnosticKind::Overflow,
            DecodeError::InvalidValue { .. } | DecodeError::InvalidFelt(_) => {
                DiagnosticKind::InvalidValue
            }
            DecodeError::SchemaMismatch(_)
            | DecodeError::Truncated { .. }
            | DecodeError::InvalidSignature(_) => DiagnosticKind::SchemaMismatch,
        };

        Self {
            block_number: event.block_number,
            transaction_hash: event.transaction_hash,
            event_index,
            selector: event.selector(),
            kind,
            reason: error.to_string(),
        }
    }

    /// Diagnostic for a ByteArray word replaced by an empty fragment
    pub fn lossy(
        event: &RawEvent,
        event_index: usize,
        field: &str,
        fragment: &FragmentError,
    ) -> Self {
        Self {
            block_number: event.block_number,
            transaction_hash: event.transaction_hash,
            event_index,
            selector: event.selector(),
            kind: DiagnosticKind::LossyFragment,
            reason: format!("field '{}': {}", field, fragment),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "block {} tx {} event #{}: {} ({})",
            self.block_number, self.transaction_hash, self.event_index, self.kind, self.reason
        )
    }
}

/// Decoded output of one fully drained window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowOutcome {
    pub window: ScanWindow,
    /// Events the ledger returned for the window
    pub raw_events: usize,
    pub records: Vec<DecodedRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Everything a harvest produced
///
/// Records are in window-visit order (newest window first) and ascending inside each window.
/// Callers that need globally ascending output should call [`HarvestReport::sort_ascending`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HarvestReport {
    /// Concrete block the scan started from
    pub start_block: u64,
    pub windows_scanned: usize,
    /// Lowest block covered so far
    pub lowest_block: Option<u64>,
    /// The scan reached block 0 before its window budget ran out (or exactly at it)
    pub reached_genesis: bool,
    /// The record budget stopped the scan early
    pub stopped_by_budget: bool,
    pub records: Vec<DecodedRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

impl HarvestReport {
    pub fn new(start_block: u64) -> Self {
        Self {
            start_block,
            ..Default::default()
        }
    }

    /// Append one window's outcome
    pub fn absorb(&mut self, outcome: WindowOutcome) {
        self.windows_scanned += 1;
        self.lowest_block = Some(outcome.window.from_block);
        self.reached_genesis = outcome.window.reaches_genesis();
        self.records.extend(outcome.records);
        self.diagnostics.extend(outcome.diagnostics);
    }

    /// Events dropped because they could not be decoded
    pub fn skipped_events(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.kind.is_skip()).count()
    }

    /// Re-order records by block number; stable, so per-block ledger order survives
    pub fn sort_ascending(&mut self) {
        self.records.sort_by_key(|r| r.block_number);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ByteArrayFault;
    use std::collections::BTreeMap;

    fn raw() -> RawEvent {
        RawEvent {
            from_address: Felt::from(1u64),
            keys: vec![Felt::from(0x5eu64)],
            data: vec![],
            block_number: 42,
            block_hash: None,
            transaction_hash: Felt::from(0x77u64),
        }
    }

    fn record(block: u64) -> DecodedRecord {
        DecodedRecord {
            block_number: block,
            transaction_hash: Felt::from(block),
            emitter: Felt::from(1u64),
            event_name: "E".into(),
            selector: Felt::from(2u64),
            fields: BTreeMap::new(),
        }
    }

    #[test]
    fn test_skipped_classification() {
        let err = DecodeError::MalformedByteArray {
            offset: 4,
            fault: ByteArrayFault::BadHeader("0x1234".into()),
        };
        let diag = Diagnostic::skipped(&raw(), 3, &err);
        assert_eq!(diag.kind, DiagnosticKind::MalformedByteArray);
        assert_eq!(diag.block_number, 42);
        assert_eq!(diag.event_index, 3);
        assert_eq!(diag.selector, Some(Felt::from(0x5eu64)));
        assert!(diag.kind.is_skip());

        let diag = Diagnostic::skipped(&raw(), 0, &DecodeError::SchemaMismatch("x".into()));
        assert_eq!(diag.kind, DiagnosticKind::SchemaMismatch);
        assert!(diag.to_string().contains("event #0: schema_mismatch"));
    }

    #[test]
    fn test_absorb_tracks_genesis_and_order() {
        let mut report = HarvestReport::new(1000);
        report.absorb(WindowOutcome {
            window: ScanWindow {
                index: 0,
                from_block: 500,
                to_block: 1000,
            },
            raw_events: 2,
            records: vec![record(600), record(900)],
            diagnostics: vec![],
        });
        assert!(!report.reached_genesis);

        report.absorb(WindowOutcome {
            window: ScanWindow {
                index: 1,
                from_block: 0,
                to_block: 499,
            },
            raw_events: 1,
            records: vec![record(10)],
            diagnostics: vec![Diagnostic::skipped(
                &raw(),
                0,
                &DecodeError::Overflow("x".into()),
            )],
        });

        assert!(report.reached_genesis);
        assert_eq!(report.windows_scanned, 2);
        assert_eq!(report.lowest_block, Some(0));
        assert_eq!(report.skipped_events(), 1);

        let blocks: Vec<u64> = report.records.iter().map(|r| r.block_number).collect();
        assert_eq!(blocks, vec![600, 900, 10]);

        report.sort_ascending();
        let blocks: Vec<u64> = report.records.iter().map(|r| r.block_number).collect();
        assert_eq!(blocks, vec![10, 600, 900]);
    }
}
