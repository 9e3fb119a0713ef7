//! Event decoding into records

use super::byte_array::{decode_byte_array, FragmentError};
use super::cursor::FeltCursor;
use super::parser::{EventSignature, ParamKind, ParsedParam};
use super::uint::read_u256;
use crate::error::DecodeError;
use crate::felt::Felt;
use crate::ledger::RawEvent;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Decoded parameter value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DecodedValue {
    /// Raw word or address, hex
    Felt(Felt),
    /// Unsigned integer, decimal string
    Uint(String),
    Bool(bool),
    /// ByteArray contents
    String(String),
}

impl DecodedValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DecodedValue::String(s) | DecodedValue::Uint(s) => Some(s),
            _ => None,
        }
    }
}

/// One harvested event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedRecord {
    pub block_number: u64,
    pub transaction_hash: Felt,
    /// Contract that emitted the event
    pub emitter: Felt,
    pub event_name: String,
    pub selector: Felt,
    pub fields: BTreeMap<String, DecodedValue>,
}

impl DecodedRecord {
    pub fn field(&self, name: &str) -> Option<&DecodedValue> {
        self.fields.get(name)
    }
}

/// Fields of one event plus any fragments that were dropped while decoding them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedFields {
    pub fields: BTreeMap<String, DecodedValue>,
    /// `(field name, fragment)` for every ByteArray word decoded as empty
    pub lossy: Vec<(String, FragmentError)>,
}

/// A decoder for one event type, selected by `keys[0]`
pub trait EventDecoder: Send + Sync {
    /// Event name used in records
    fn name(&self) -> &str;

    /// Selector this decoder handles
    fn selector(&self) -> Felt;

    /// Decode the fields of an event whose `keys[0]` equals [`EventDecoder::selector`]
    fn decode_fields(&self, event: &RawEvent) -> Result<DecodedFields, DecodeError>;
}

impl EventDecoder for EventSignature {
    fn name(&self) -> &str {
        &self.name
    }

    fn selector(&self) -> Felt {
        self.selector
    }

    fn decode_fields(&self, event: &RawEvent) -> Result<DecodedFields, DecodeError> {
        let mut out = DecodedFields::default();

        // keys[0] is the selector itself
        let mut keys = FeltCursor::at(&event.keys, 1);
        for param in self.key_params() {
            decode_param(param, &mut keys, &mut out)?;
        }

        let mut data = FeltCursor::new(&event.data);
        for param in self.data_params() {
            decode_param(param, &mut data, &mut out)?;
        }

        if !keys.is_exhausted() || !data.is_exhausted() {
            return Err(DecodeError::SchemaMismatch(format!(
                "{} leaves {} key and {} data words unread",
                self.name,
                keys.remaining(),
                data.remaining()
            )));
        }

        Ok(out)
    }
}

fn decode_param(
    param: &ParsedParam,
    cursor: &mut FeltCursor<'_>,
    out: &mut DecodedFields,
) -> Result<(), DecodeError> {
    let value = match param.kind {
        ParamKind::Felt | ParamKind::Address => DecodedValue::Felt(cursor.next(&param.name)?),
        ParamKind::Bool => {
            let word = cursor.next(&param.name)?;
            match word.to_u64() {
                Some(0) => DecodedValue::Bool(false),
                Some(1) => DecodedValue::Bool(true),
                _ => {
                    return Err(DecodeError::InvalidValue {
                        field: param.name.clone(),
                        reason: format!("{} is not a bool", word),
                    })
                }
            }
        }
        ParamKind::Uint(bits) => {
            let word = cursor.next(&param.name)?;
            if word.value().bit_len() > bits as usize {
                return Err(DecodeError::InvalidValue {
                    field: param.name.clone(),
                    reason: format!("{} does not fit in u{}", word, bits),
                });
            }
            DecodedValue::Uint(word.value().to_string())
        }
        ParamKind::U256 => DecodedValue::Uint(read_u256(cursor, &param.name)?.to_string()),
        ParamKind::ByteArray => {
            let decoded = decode_byte_array(cursor)?;
            out.lossy
                .extend(decoded.lossy.into_iter().map(|f| (param.name.clone(), f)));
            DecodedValue::String(decoded.text)
        }
    };

    out.fields.insert(param.name.clone(), value);
    Ok(())
}

/// Output of [`LogDecoder::decode`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEvent {
    pub record: DecodedRecord,
    pub lossy: Vec<(String, FragmentError)>,
}

/// Registry of event decoders keyed by selector
#[derive(Clone, Default)]
pub struct LogDecoder {
    decoders: HashMap<Felt, Arc<dyn EventDecoder>>,
}

impl LogDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a single signature string
    pub fn from_signature(signature: &str) -> Result<Self, DecodeError> {
        Self::from_signatures([signature])
    }

    /// Build from several signature strings
    pub fn from_signatures<I, S>(signatures: I) -> Result<Self, DecodeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut decoder = Self::new();
        for sig in signatures {
            decoder.register(EventSignature::parse(sig.as_ref())?);
        }
        Ok(decoder)
    }

    /// Register a decoder, replacing any previous one for the same selector
    pub fn register<D: EventDecoder + 'static>(&mut self, decoder: D) {
        let selector = decoder.selector();
        if self.decoders.insert(selector, Arc::new(decoder)).is_some() {
            tracing::warn!("Replaced decoder for selector {}", selector);
        }
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Registered selectors, sorted; this is the topic filter handed to the ledger
    pub fn selectors(&self) -> Vec<Felt> {
        let mut selectors: Vec<Felt> = self.decoders.keys().copied().collect();
        selectors.sort();
        selectors
    }

    /// Decode one raw event
    pub fn decode(&self, event: &RawEvent) -> Result<DecodedEvent, DecodeError> {
        let selector = event
            .keys
            .first()
            .copied()
            .ok_or_else(|| DecodeError::SchemaMismatch("event has no keys".to_string()))?;

        let decoder = self.decoders.get(&selector).ok_or_else(|| {
            DecodeError::SchemaMismatch(format!("no decoder registered for selector {}", selector))
        })?;

        let DecodedFields { fields, lossy } = decoder.decode_fields(event)?;

        Ok(DecodedEvent {
            record: DecodedRecord {
                block_number: event.block_number,
                transaction_hash: event.transaction_hash,
                emitter: event.from_address,
                event_name: decoder.name().to_string(),
                selector,
                fields,
            },
            lossy,
        })
    }
}

impl std::fmt::Debug for LogDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.decoders.values().map(|d| d.name()).collect();
        f.debug_struct("LogDecoder").field("events", &names).finish()
    }
}
