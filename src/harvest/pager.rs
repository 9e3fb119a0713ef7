//! Continuation-token drain of a single window

use super::window::ScanWindow;
use crate::error::{Error, Result, RpcError};
use crate::ledger::{EventFilter, EventSource, EventsRequest, RawEvent};
use futures::stream::{self, Stream, TryStreamExt};
use std::collections::HashSet;

/// Pages through one window at a time
///
/// A drain always starts without a token and stops at the first response that carries none.
/// Tokens never outlive the drain that produced them.
pub struct EventPager<'a, S> {
    source: &'a S,
    filter: &'a EventFilter,
    page_size: u64,
}

/// Drain state: the token for the next query plus every token already handed out
enum PageState {
    Next {
        token: Option<String>,
        seen: HashSet<String>,
    },
    Done,
}

impl<'a, S: EventSource> EventPager<'a, S> {
    pub fn new(source: &'a S, filter: &'a EventFilter, page_size: u64) -> Self {
        Self {
            source,
            filter,
            page_size,
        }
    }

    /// Lazy stream of pages in ledger order
    ///
    /// The first failed page ends the stream with [`Error::Window`]. A token that was already
    /// handed out earlier in the same drain fails it with [`RpcError::StalledContinuation`].
    pub fn pages(
        &self,
        window: ScanWindow,
    ) -> impl Stream<Item = Result<Vec<RawEvent>>> + 'a {
        let source = self.source;
        let filter = self.filter;
        let page_size = self.page_size;

        let initial = PageState::Next {
            token: None,
            seen: HashSet::new(),
        };

        stream::try_unfold(initial, move |state| async move {
            let (token, mut seen) = match state {
                PageState::Next { token, seen } => (token, seen),
                PageState::Done => return Ok(None),
            };

            let request = EventsRequest {
                filter: filter.clone(),
                from_block: window.from_block,
                to_block: window.to_block,
                chunk_size: page_size,
                continuation_token: token,
            };
            let page = source
                .get_events(&request)
                .await
                .map_err(|e| Error::window(window, e))?;

            tracing::debug!(
                "Window {}: {} events, token {:?}",
                window,
                page.events.len(),
                page.continuation_token
            );

            let next = match page.continuation_token {
                Some(next) if seen.contains(&next) => {
                    return Err(Error::window(window, RpcError::StalledContinuation(next)));
                }
                Some(next) => {
                    seen.insert(next.clone());
                    PageState::Next {
                        token: Some(next),
                        seen,
                    }
                }
                None => PageState::Done,
            };

            Ok::<_, Error>(Some((page.events, next)))
        })
    }

    /// Drain every page of `window`, concatenated in page order
    pub async fn drain_window(&self, window: ScanWindow) -> Result<Vec<RawEvent>> {
        self.pages(window).try_concat().await
    }
}
