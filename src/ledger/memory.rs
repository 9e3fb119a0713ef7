//! In-memory event source
//!
//! Serves a fixed event list with the same filter and paging rules as a node. Used for offline
//! replay of event dumps and in tests.

use super::{EventSource, EventsPage, EventsRequest, RawEvent};
use crate::error::{Result, RpcError};
use serde::Deserialize;
use std::path::Path;

/// Node error code for an unknown continuation token
const INVALID_TOKEN_CODE: i64 = 33;

/// Accepted dump layouts: a bare array, or a saved `starknet_getEvents` result
#[derive(Deserialize)]
#[serde(untagged)]
enum EventDump {
    List(Vec<RawEvent>),
    Page { events: Vec<RawEvent> },
}

/// A ledger held in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    /// Sorted by block number; ledger order inside a block is kept
    events: Vec<RawEvent>,
    head: u64,
}

impl MemorySource {
    /// Build from events in any order; the head is the highest block seen
    pub fn new(mut events: Vec<RawEvent>) -> Self {
        events.sort_by_key(|e| e.block_number);
        let head = events.last().map(|e| e.block_number).unwrap_or(0);
        Self { events, head }
    }

    /// Override the reported chain height
    pub fn with_head(mut self, head: u64) -> Self {
        self.head = head;
        self
    }

    /// Load a JSON dump of events
    pub fn from_json(json: &str) -> Result<Self> {
        let events = match serde_json::from_str(json)? {
            EventDump::List(events) => events,
            EventDump::Page { events } => events,
        };
        Ok(Self::new(events))
    }

    /// Load a JSON dump from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let source = Self::from_json(&content)?;
        tracing::debug!("Loaded {} events from {}", source.len(), path.display());
        Ok(source)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn matches(request: &EventsRequest, event: &RawEvent) -> bool {
        if !(request.from_block..=request.to_block).contains(&event.block_number) {
            return false;
        }
        if let Some(address) = &request.filter.address {
            if *address != event.from_address {
                return false;
            }
        }
        request
            .filter
            .keys
            .iter()
            .enumerate()
            .all(|(i, accepted)| {
                accepted.is_empty() || event.keys.get(i).is_some_and(|k| accepted.contains(k))
            })
    }

    fn page(&self, request: &EventsRequest) -> std::result::Result<EventsPage, RpcError> {
        let offset = match &request.continuation_token {
            None => 0,
            Some(token) => token.parse::<usize>().map_err(|_| RpcError::Provider {
                code: INVALID_TOKEN_CODE,
                message: format!(
                    "The supplied continuation token is invalid or unknown: {}",
                    token
                ),
            })?,
        };
        let chunk = request.chunk_size.max(1) as usize;

        let mut matching = self.events.iter().filter(|e| Self::matches(request, e)).skip(offset);
        let events: Vec<RawEvent> = matching.by_ref().take(chunk).cloned().collect();
        let continuation_token = matching
            .next()
            .is_some()
            .then(|| (offset + events.len()).to_string());

        Ok(EventsPage {
            events,
            continuation_token,
        })
    }
}

impl EventSource for MemorySource {
    async fn get_events(
        &self,
        request: &EventsRequest,
    ) -> std::result::Result<EventsPage, RpcError> {
        self.page(request)
    }

    async fn block_number(&self) -> std::result::Result<u64, RpcError> {
        Ok(self.head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::felt::Felt;
    use crate::ledger::EventFilter;

    fn event(block: u64, emitter: u64, selector: u64) -> RawEvent {
        RawEvent {
            from_address: Felt::from(emitter),
            keys: vec![Felt::from(selector)],
            data: vec![],
            block_number: block,
            block_hash: None,
            transaction_hash: Felt::from(block),
        }
    }

    fn request(filter: EventFilter, chunk_size: u64, token: Option<String>) -> EventsRequest {
        EventsRequest {
            filter,
            from_block: 10,
            to_block: 20,
            chunk_size,
            continuation_token: token,
        }
    }

    #[tokio::test]
    async fn test_filters_and_pages() {
        let source = MemorySource::new(vec![
            event(15, 1, 7),
            event(12, 1, 7),
            event(13, 2, 7),
            event(14, 1, 8),
            event(21, 1, 7),
            event(9, 1, 7),
            event(18, 1, 7),
        ]);
        assert_eq!(source.block_number().await.unwrap(), 21);

        let filter = EventFilter::new()
            .address(Felt::from(1u64))
            .selectors(vec![Felt::from(7u64)]);

        let first = source.get_events(&request(filter.clone(), 2, None)).await.unwrap();
        let blocks: Vec<u64> = first.events.iter().map(|e| e.block_number).collect();
        assert_eq!(blocks, vec![12, 15]);
        assert_eq!(first.continuation_token.as_deref(), Some("2"));

        let second = source
            .get_events(&request(filter, 2, first.continuation_token))
            .await
            .unwrap();
        let blocks: Vec<u64> = second.events.iter().map(|e| e.block_number).collect();
        assert_eq!(blocks, vec![18]);
        assert!(second.continuation_token.is_none());
    }

    #[tokio::test]
    async fn test_exact_final_page_has_no_token() {
        let source = MemorySource::new(vec![event(11, 1, 7), event(12, 1, 7)]);
        let page = source.get_events(&request(EventFilter::new(), 2, None)).await.unwrap();
        assert_eq!(page.events.len(), 2);
        assert!(page.continuation_token.is_none());
    }

    #[tokio::test]
    async fn test_bad_token() {
        let source = MemorySource::new(vec![event(11, 1, 7)]);
        let err = source
            .get_events(&request(EventFilter::new(), 2, Some("nope".into())))
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::Provider { code: 33, .. }));
    }

    #[test]
    fn test_from_json_layouts() {
        let list = r#"[{"from_address":"0x1","keys":["0x2"],"data":["0x3"],"block_number":5,"transaction_hash":"0x4"}]"#;
        let source = MemorySource::from_json(list).unwrap();
        assert_eq!(source.len(), 1);

        let page = format!(r#"{{"events": {}, "continuation_token": "9"}}"#, list);
        let source = MemorySource::from_json(&page).unwrap().with_head(100);
        assert_eq!(source.len(), 1);
        assert_eq!(source.head, 100);

        assert!(MemorySource::from_json("{\"nope\": 1}").is_err());
    }
}
