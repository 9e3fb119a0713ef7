//! Ledger event-query primitive
//!
//! The harvester only ever talks to the ledger through [`EventSource`]. [`RpcEndpoint`] is the
//! Starknet JSON-RPC implementation; [`MemorySource`] replays a saved event dump.

mod endpoint;
mod memory;
mod types;

pub use endpoint::RpcEndpoint;
pub use memory::MemorySource;
pub use types::{BlockId, EventFilter, EventsPage, EventsRequest, RawEvent};

use crate::error::RpcError;
use std::future::Future;

/// Paginated event query plus chain-head lookup
pub trait EventSource: Sync {
    /// Fetch one page of events for a concrete block range
    fn get_events(
        &self,
        request: &EventsRequest,
    ) -> impl Future<Output = Result<EventsPage, RpcError>> + Send;

    /// Current chain height
    fn block_number(&self) -> impl Future<Output = Result<u64, RpcError>> + Send;
}
