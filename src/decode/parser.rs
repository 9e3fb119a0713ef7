//! Event signature parsing
//!
//! Signatures use Cairo-style parameter lists:
//!
//! ```text
//! TokenMinted(collection_id: u256, token_id: u256, token_uri: ByteArray)
//! Transfer(#[key] from: ContractAddress, #[key] to: ContractAddress, value: u256)
//! ```
//!
//! `#[key]` parameters are read from `keys[1..]`, everything else from `data`.

use crate::error::DecodeError;
use crate::felt::Felt;
use alloy_primitives::{keccak256, U256};
use std::fmt;

/// Payload type of one event parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Raw word (`felt252`, `ClassHash`, ...)
    Felt,
    /// `ContractAddress`
    Address,
    /// `bool`, encoded as 0 or 1
    Bool,
    /// Unsigned integer of at most `bits` bits in one word
    Uint(u16),
    /// `u256` as a `(lo, hi)` pair
    U256,
    /// Packed string
    ByteArray,
}

impl ParamKind {
    fn parse(ty: &str) -> Option<Self> {
        let kind = match ty {
            "felt" | "felt252" | "ClassHash" | "EthAddress" => ParamKind::Felt,
            "ContractAddress" => ParamKind::Address,
            "bool" => ParamKind::Bool,
            "u8" => ParamKind::Uint(8),
            "u16" => ParamKind::Uint(16),
            "u32" => ParamKind::Uint(32),
            "u64" => ParamKind::Uint(64),
            "u128" => ParamKind::Uint(128),
            "u256" => ParamKind::U256,
            "ByteArray" => ParamKind::ByteArray,
            _ => return None,
        };
        Some(kind)
    }

    /// Canonical type name
    pub fn type_name(&self) -> String {
        match self {
            ParamKind::Felt => "felt252".to_string(),
            ParamKind::Address => "ContractAddress".to_string(),
            ParamKind::Bool => "bool".to_string(),
            ParamKind::Uint(bits) => format!("u{}", bits),
            ParamKind::U256 => "u256".to_string(),
            ParamKind::ByteArray => "ByteArray".to_string(),
        }
    }
}

/// One parsed parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedParam {
    pub name: String,
    pub kind: ParamKind,
    /// Read from `keys` instead of `data`
    pub key: bool,
}

/// Parsed event signature with its selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSignature {
    pub name: String,
    pub params: Vec<ParsedParam>,
    /// `keys[0]` of matching events
    pub selector: Felt,
}

impl EventSignature {
    /// Parse `Name(param: type, ...)`
    pub fn parse(signature: &str) -> Result<Self, DecodeError> {
        let signature = signature.trim();
        let invalid =
            |reason: &str| DecodeError::InvalidSignature(format!("{}: {}", reason, signature));

        let open = signature.find('(').ok_or_else(|| invalid("missing '('"))?;
        if !signature.ends_with(')') {
            return Err(invalid("missing ')'"));
        }

        let name = signature[..open].trim();
        if !is_identifier(name) {
            return Err(invalid("invalid event name"));
        }

        let body = &signature[open + 1..signature.len() - 1];
        let mut params = Vec::new();

        for raw in body.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, rest) = match raw.strip_prefix("#[key]") {
                Some(rest) => (true, rest.trim()),
                None => (false, raw),
            };

            let (param_name, ty) = rest
                .split_once(':')
                .ok_or_else(|| invalid(&format!("parameter '{}' has no type", rest)))?;
            let param_name = param_name.trim();
            let ty = ty.trim();

            if !is_identifier(param_name) {
                return Err(invalid(&format!("invalid parameter name '{}'", param_name)));
            }
            if params.iter().any(|p: &ParsedParam| p.name == param_name) {
                return Err(invalid(&format!("duplicate parameter '{}'", param_name)));
            }

            let kind = ParamKind::parse(ty)
                .ok_or_else(|| invalid(&format!("unsupported type '{}'", ty)))?;

            params.push(ParsedParam {
                name: param_name.to_string(),
                kind,
                key,
            });
        }

        Ok(Self {
            selector: selector_for(name),
            name: name.to_string(),
            params,
        })
    }

    /// Parameters read from `keys[1..]`
    pub fn key_params(&self) -> impl Iterator<Item = &ParsedParam> {
        self.params.iter().filter(|p| p.key)
    }

    /// Parameters read from `data`
    pub fn data_params(&self) -> impl Iterator<Item = &ParsedParam> {
        self.params.iter().filter(|p| !p.key)
    }
}

impl fmt::Display for EventSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| {
                let prefix = if p.key { "#[key] " } else { "" };
                format!("{}{}: {}", prefix, p.name, p.kind.type_name())
            })
            .collect();
        write!(f, "{}({})", self.name, params.join(", "))
    }
}

/// Starknet event selector: keccak256 of the name, truncated to 250 bits
pub fn selector_for(name: &str) -> Felt {
    let hash = U256::from_be_bytes(keccak256(name.as_bytes()).0);
    let mask = (U256::from(1u8) << 250usize) - U256::from(1u8);
    Felt::new(hash & mask)
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
