//! Request Pool
//!
//! Reusable per-connection buffers so steady-state serving does not allocate.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::BytesMut;
use crossbeam::queue::ArrayQueue;

/// Initial capacity of each pooled response buffer
const RESPONSE_CAPACITY: usize = 512;

/// One request's worth of buffers
pub struct RequestSlot {
    /// Fixed-size receive buffer; one read fills it with one request
    buffer: Box<[u8]>,

    /// Framed response, cleared before the slot is reused
    response: BytesMut,
}

impl RequestSlot {
    fn new(buffer_size: usize) -> Self {
        Self {
            buffer: vec![0u8; buffer_size].into_boxed_slice(),
            response: BytesMut::with_capacity(RESPONSE_CAPACITY),
        }
    }

    /// Zero-sized placeholder left behind when a slot goes home
    fn vacant() -> Self {
        Self {
            buffer: Box::default(),
            response: BytesMut::new(),
        }
    }

    /// Borrow the receive buffer and the response buffer together
    pub fn split(&mut self) -> (&mut [u8], &mut BytesMut) {
        (&mut self.buffer, &mut self.response)
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn response(&self) -> &[u8] {
        &self.response
    }
}

/// Bounded pool of [`RequestSlot`]s
///
/// ## Concurrency:
/// - `slots`: lock-free bounded queue (crossbeam `ArrayQueue`)
/// - a checked-out slot is owned by exactly one [`PooledRequest`]
pub struct RequestPool {
    slots: ArrayQueue<RequestSlot>,
    buffer_size: usize,

    /// Slots created over the pool's lifetime (prefill plus overflow)
    allocated: AtomicUsize,
}

impl RequestPool {
    /// Create a pool prefilled with `capacity` slots
    pub fn new(capacity: usize, buffer_size: usize) -> Arc<Self> {
        let capacity = capacity.max(1);
        let slots = ArrayQueue::new(capacity);
        for _ in 0..capacity {
            let _ = slots.push(RequestSlot::new(buffer_size));
        }

        Arc::new(Self {
            slots,
            buffer_size,
            allocated: AtomicUsize::new(capacity),
        })
    }

    /// Take a slot, allocating a fresh one if the pool is drained
    pub fn checkout(self: &Arc<Self>) -> PooledRequest {
        let slot = self.slots.pop().unwrap_or_else(|| {
            self.allocated.fetch_add(1, Ordering::Relaxed);
            tracing::trace!("Request pool drained, allocating a slot");
            RequestSlot::new(self.buffer_size)
        });

        PooledRequest {
            slot,
            pool: Arc::clone(self),
        }
    }

    /// Slots currently idle in the pool
    pub fn available(&self) -> usize {
        self.slots.len()
    }

    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub fn allocated(&self) -> usize {
        self.allocated.load(Ordering::Relaxed)
    }

    fn give_back(&self, mut slot: RequestSlot) {
        slot.response.clear();
        // Overflow slots are dropped once the pool is full again
        let _ = self.slots.push(slot);
    }
}

/// A checked-out slot; returns itself to the pool on drop
pub struct PooledRequest {
    slot: RequestSlot,
    pool: Arc<RequestPool>,
}

impl Deref for PooledRequest {
    type Target = RequestSlot;

    fn deref(&self) -> &RequestSlot {
        &self.slot
    }
}

impl DerefMut for PooledRequest {
    fn deref_mut(&mut self) -> &mut RequestSlot {
        &mut self.slot
    }
}

impl Drop for PooledRequest {
    fn drop(&mut self) {
        let slot = std::mem::replace(&mut self.slot, RequestSlot::vacant());
        self.pool.give_back(slot);
    }
}
