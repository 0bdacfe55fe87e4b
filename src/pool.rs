//! Body storage for captures.
//!
//! A capture needs a growable byte buffer. [`BufferSource`] decides where it
//! comes from:
//!
//! - [`BufferSource::Fresh`] allocates a new buffer per request and drops it
//!   afterwards.
//! - [`BufferSource::Pooled`] checks a pre-sized buffer out of a shared
//!   [`BufferPool`] and hands it back once the capture is flushed.
//!
//! From the client's point of view the two are indistinguishable. The pool
//! only saves allocations on hot paths with large bodies.

use std::sync::Arc;

use bytes::BytesMut;
use parking_lot::Mutex;
use tracing::debug;

/// Sizing for a [`BufferPool`]. Read once, when the pool is built.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PoolConfig {
    /// Maximum number of idle buffers kept for reuse.
    pub size: usize,
    /// Initial capacity of every pooled buffer, in bytes.
    pub alloc: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { size: 32, alloc: 16 * 1024 }
    }
}

/// A bounded set of reusable, pre-sized body buffers.
///
/// Shared across concurrent requests; checkout and return are serialised by
/// a mutex. The lock is only held for a `Vec` push or pop.
#[derive(Debug)]
pub struct BufferPool {
    idle: Mutex<Vec<BytesMut>>,
    config: PoolConfig,
}

impl BufferPool {
    pub fn new(config: PoolConfig) -> Self {
        Self { idle: Mutex::new(Vec::with_capacity(config.size)), config }
    }

    pub fn config(&self) -> PoolConfig {
        self.config
    }

    /// Number of buffers currently waiting to be checked out.
    pub fn idle(&self) -> usize {
        self.idle.lock().len()
    }

    /// Checks out a buffer. Never fails: an empty pool allocates.
    pub fn get(&self) -> BytesMut {
        let popped = self.idle.lock().pop();
        match popped {
            Some(buf) => buf,
            None => {
                debug!(alloc = self.config.alloc, "buffer pool empty, allocating");
                BytesMut::with_capacity(self.config.alloc)
            }
        }
    }

    /// Returns a buffer to the pool.
    ///
    /// The buffer is cleared. One that grew past the configured allocation is
    /// swapped for a fresh pre-sized buffer so a single large response does
    /// not pin memory in the pool forever. When the pool is full the buffer
    /// is dropped.
    pub fn put(&self, mut buf: BytesMut) {
        buf.clear();
        if buf.capacity() > self.config.alloc {
            debug!(capacity = buf.capacity(), alloc = self.config.alloc, "replacing oversized buffer");
            buf = BytesMut::with_capacity(self.config.alloc);
        }

        let mut idle = self.idle.lock();
        if idle.len() < self.config.size {
            idle.push(buf);
        } else {
            debug!(size = self.config.size, "buffer pool full, dropping buffer");
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

/// Where a capture's body buffer comes from and goes back to.
#[derive(Clone, Debug, Default)]
pub enum BufferSource {
    /// Allocate per request; drop after the flush.
    #[default]
    Fresh,
    /// Borrow from, and return to, a shared pool.
    Pooled(Arc<BufferPool>),
}

impl BufferSource {
    pub fn pooled(config: PoolConfig) -> Self {
        Self::Pooled(Arc::new(BufferPool::new(config)))
    }

    pub fn acquire(&self) -> BytesMut {
        match self {
            Self::Fresh => BytesMut::new(),
            Self::Pooled(pool) => pool.get(),
        }
    }

    pub fn release(&self, buf: BytesMut) {
        if let Self::Pooled(pool) = self {
            pool.put(buf);
        }
    }

    pub fn is_pooled(&self) -> bool {
        matches!(self, Self::Pooled(_))
    }
}
