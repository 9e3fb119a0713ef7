//! Backward window planning
//!
//! Pure block arithmetic, no I/O. A plan is an iterator, so it can be restarted by cloning it
//! before consumption.

use serde::Serialize;
use std::fmt;

/// An inclusive block range scanned as one pagination unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ScanWindow {
    /// Position in visit order, 0 = newest
    pub index: usize,
    pub from_block: u64,
    pub to_block: u64,
}

impl ScanWindow {
    /// Number of blocks covered
    pub fn block_count(&self) -> u64 {
        self.to_block - self.from_block + 1
    }

    pub fn contains(&self, block: u64) -> bool {
        (self.from_block..=self.to_block).contains(&block)
    }

    pub fn reaches_genesis(&self) -> bool {
        self.from_block == 0
    }
}

impl fmt::Display for ScanWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} [{}, {}]", self.index, self.from_block, self.to_block)
    }
}

/// Windows walking backward from a fixed start block
///
/// Lower bounds sit on `start - k * window_size` (clipped at 0). The first window also
/// includes `start` itself, and every later window ends one block below the previous lower
/// bound, so the windows tile `[lowest, start]` with no gap and no overlap. The plan ends after
/// `window_count` windows or after the window that reaches block 0, whichever comes first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowPlan {
    start_block: u64,
    window_size: u64,
    window_count: usize,
    next_index: usize,
    /// Lower bound of the previous window; `None` before the first window
    previous_from: Option<u64>,
}

impl WindowPlan {
    /// `window_size` must be non-zero; a zero size yields an empty plan
    pub fn new(start_block: u64, window_size: u64, window_count: usize) -> Self {
        Self {
            start_block,
            window_size,
            window_count,
            next_index: 0,
            previous_from: None,
        }
    }

    pub fn start_block(&self) -> u64 {
        self.start_block
    }

    /// Windows the plan will still produce, counting the genesis cut-off
    pub fn planned_len(&self) -> usize {
        if self.window_size == 0 {
            return 0;
        }
        let until_genesis = match self.previous_from {
            Some(0) => return 0,
            None if self.start_block == 0 => 1,
            None => self.start_block.div_ceil(self.window_size),
            Some(from) => from.div_ceil(self.window_size),
        };
        let budget = self.window_count - self.next_index;
        until_genesis.min(budget as u64) as usize
    }
}

impl Iterator for WindowPlan {
    type Item = ScanWindow;

    fn next(&mut self) -> Option<ScanWindow> {
        if self.window_size == 0 || self.next_index >= self.window_count {
            return None;
        }

        let to_block = match self.previous_from {
            None => self.start_block,
            Some(0) => return None,
            Some(from) => from - 1,
        };

        let step = (self.next_index as u64 + 1).saturating_mul(self.window_size);
        let from_block = self.start_block.saturating_sub(step);

        let window = ScanWindow {
            index: self.next_index,
            from_block,
            to_block,
        };

        self.next_index += 1;
        self.previous_from = Some(from_block);
        Some(window)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.planned_len();
        (len, Some(len))
    }
}

impl ExactSizeIterator for WindowPlan {}
