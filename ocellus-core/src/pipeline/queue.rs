//! Bounded drop-oldest frame queue
//!
//! Many producers (render task, custom-image dispatch, loading spinner)
//! push; the eye's display task pops. Pushing never waits.

use core::cell::RefCell;
use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Deque;
use log::trace;

/// Frames buffered per eye
pub const FRAME_QUEUE_DEPTH: usize = 10;

/// Fixed-capacity FIFO that evicts its oldest entry when full
pub struct FrameQueue<T, const N: usize = FRAME_QUEUE_DEPTH> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Deque<T, N>>>,
    evicted: AtomicU32,
}

impl<T, const N: usize> FrameQueue<T, N> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
            evicted: AtomicU32::new(0),
        }
    }

    /// Append `item`, returning the entry evicted to make room, if any
    pub fn push(&self, item: T) -> Option<T> {
        let evicted = self.inner.lock(|q| {
            let mut q = q.borrow_mut();
            let old = if q.is_full() { q.pop_front() } else { None };
            // Cannot fail: there is room after the eviction above
            let _ = q.push_back(item);
            old
        });
        if evicted.is_some() {
            let n = self.evicted.fetch_add(1, Ordering::Relaxed) + 1;
            trace!("frame queue full, evicted oldest ({} total)", n);
        }
        evicted
    }

    /// Take the oldest entry
    pub fn pop(&self) -> Option<T> {
        self.inner.lock(|q| q.borrow_mut().pop_front())
    }

    /// Drop everything queued
    pub fn clear(&self) {
        self.inner.lock(|q| q.borrow_mut().clear());
    }

    pub fn len(&self) -> usize {
        self.inner.lock(|q| q.borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Entries dropped on overflow since creation
    pub fn evicted(&self) -> u32 {
        self.evicted.load(Ordering::Relaxed)
    }
}

impl<T, const N: usize> Default for FrameQueue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
