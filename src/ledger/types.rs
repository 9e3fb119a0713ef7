//! Wire types of the ledger event-query primitive

use crate::error::ConfigError;
use crate::felt::Felt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An event exactly as the ledger returned it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub from_address: Felt,
    /// `keys[0]` is the event selector
    pub keys: Vec<Felt>,
    pub data: Vec<Felt>,
    pub block_number: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<Felt>,
    pub transaction_hash: Felt,
}

impl RawEvent {
    pub fn selector(&self) -> Option<Felt> {
        self.keys.first().copied()
    }
}

/// Which events a query returns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Emitting contract; `None` matches every contract
    pub address: Option<Felt>,
    /// Per key position, the accepted alternatives; an empty position matches anything
    pub keys: Vec<Vec<Felt>>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address(mut self, address: Felt) -> Self {
        self.address = Some(address);
        self
    }

    /// Accept any of `selectors` in `keys[0]`
    pub fn selectors(mut self, selectors: Vec<Felt>) -> Self {
        if self.keys.is_empty() {
            self.keys.push(selectors);
        } else {
            self.keys[0] = selectors;
        }
        self
    }
}

/// One page request; block bounds are always concrete heights
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventsRequest {
    pub filter: EventFilter,
    pub from_block: u64,
    pub to_block: u64,
    pub chunk_size: u64,
    pub continuation_token: Option<String>,
}

/// One page of results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventsPage {
    pub events: Vec<RawEvent>,
    /// Absent when the window has no more pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
}

/// Block height or the `latest` sentinel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BlockId {
    Number(u64),
    #[default]
    Latest,
}

impl FromStr for BlockId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("latest") {
            return Ok(BlockId::Latest);
        }
        s.replace('_', "")
            .parse::<u64>()
            .map(BlockId::Number)
            .map_err(|_| ConfigError::InvalidBlockNumber(s.to_string()))
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockId::Number(n) => write!(f, "{}", n),
            BlockId::Latest => write!(f, "latest"),
        }
    }
}

impl Serialize for BlockId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BlockId::Number(n) => serializer.serialize_u64(*n),
            BlockId::Latest => serializer.serialize_str("latest"),
        }
    }
}

impl<'de> Deserialize<'de> for BlockId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(u64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(BlockId::Number(n)),
            Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}
