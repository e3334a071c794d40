//! Instrumented page source for teardown and failure tests.

use crate::arena::{HeapPages, PageBlock, PageSource};
use crate::error::{Result, StrataError};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct LedgerState {
    acquired: usize,
    released: Vec<usize>,
    outstanding: Vec<usize>,
    armed_failures: usize,
    refused: usize,
}

/// Shared record of what a [`CountingPages`] has done.
///
/// Clones share the same record, so a test can keep a ledger after handing
/// the source to an arena and inspect it once the arena is gone.
#[derive(Debug, Clone, Default)]
pub struct PageLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl PageLedger {
    /// Blocks handed out.
    pub fn acquired(&self) -> usize {
        self.state.lock().acquired
    }

    /// Blocks taken back.
    pub fn released(&self) -> usize {
        self.state.lock().released.len()
    }

    /// Base addresses of released blocks, in release order.
    pub fn released_addrs(&self) -> Vec<usize> {
        self.state.lock().released.clone()
    }

    /// Blocks handed out and not yet taken back.
    pub fn outstanding(&self) -> usize {
        self.state.lock().outstanding.len()
    }

    /// Check if any address was released twice, or released without being acquired.
    pub fn has_double_release(&self) -> bool {
        let state = self.state.lock();
        let mut seen = state.released.clone();
        seen.sort_unstable();
        let duplicate = seen.windows(2).any(|pair| pair[0] == pair[1]);
        duplicate || state.released.len() > state.acquired
    }

    /// Make the next `count` acquisitions fail.
    pub fn arm_failures(&self, count: usize) {
        self.state.lock().armed_failures = count;
    }

    /// Acquisitions refused because of [`arm_failures`](Self::arm_failures).
    pub fn refused(&self) -> usize {
        self.state.lock().refused
    }
}

/// Page source wrapper that counts every acquire and release.
#[derive(Debug)]
pub struct CountingPages<S: PageSource = HeapPages> {
    inner: S,
    ledger: PageLedger,
}

impl<S: PageSource> CountingPages<S> {
    /// Wrap `inner`.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            ledger: PageLedger::default(),
        }
    }

    /// A handle to this source's ledger.
    pub fn ledger(&self) -> PageLedger {
        self.ledger.clone()
    }
}

impl CountingPages<HeapPages> {
    /// Count heap blocks of `page_size` bytes.
    pub fn heap(page_size: usize) -> Result<Self> {
        Ok(Self::new(HeapPages::with_page_size(page_size)?))
    }
}

impl<S: PageSource> PageSource for CountingPages<S> {
    fn page_size(&self) -> usize {
        self.inner.page_size()
    }

    fn acquire(&mut self, min_usable: usize) -> Result<PageBlock> {
        {
            let mut state = self.ledger.state.lock();
            if state.armed_failures > 0 {
                state.armed_failures -= 1;
                state.refused += 1;
                return Err(StrataError::AllocationFailure {
                    requested: min_usable,
                    cause: "injected failure".to_string(),
                });
            }
        }

        let block = self.inner.acquire(min_usable)?;
        let mut state = self.ledger.state.lock();
        state.acquired += 1;
        state.outstanding.push(block.addr());
        Ok(block)
    }

    fn release(&mut self, block: PageBlock) {
        let addr = block.addr();
        {
            let mut state = self.ledger.state.lock();
            state.released.push(addr);
            if let Some(pos) = state.outstanding.iter().position(|a| *a == addr) {
                state.outstanding.swap_remove(pos);
            }
        }
        self.inner.release(block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_acquire_and_release() {
        let mut pages = CountingPages::heap(4096).unwrap();
        let ledger = pages.ledger();

        let a = pages.acquire(10).unwrap();
        let b = pages.acquire(10).unwrap();
        let addr = a.addr();
        assert_eq!(ledger.acquired(), 2);
        assert_eq!(ledger.outstanding(), 2);

        pages.release(a);
        pages.release(b);
        assert_eq!(ledger.released(), 2);
        assert_eq!(ledger.outstanding(), 0);
        assert_eq!(ledger.released_addrs()[0], addr);
        assert!(!ledger.has_double_release());
    }

    #[test]
    fn armed_failures() {
        let mut pages = CountingPages::heap(4096).unwrap();
        let ledger = pages.ledger();
        ledger.arm_failures(2);

        assert!(pages.acquire(1).is_err());
        assert!(pages.acquire(1).is_err());
        let block = pages.acquire(1).unwrap();
        assert_eq!(ledger.refused(), 2);
        assert_eq!(ledger.acquired(), 1);
        pages.release(block);
    }
}
