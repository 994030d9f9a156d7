//! Pending order queue
//!
//! Orders are appended at the tail and never shifted while a scan is in
//! progress: a settled order stays in its slot as a tombstone. Between scans
//! the dead prefix is skipped by moving `head`, and once the live region is
//! small compared to the allocation it is moved back to index 0.

use std::ops::Index;
use types::order::{Order, OrderState};

/// Slots allocated up front; the queue grows past this on demand.
pub const INITIAL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct OrderQueue {
    slots: Vec<Order>,
    /// First possibly-live slot
    head: usize,
}

impl OrderQueue {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            head: 0,
        }
    }

    /// Append an order at the tail, returning its slot index.
    pub fn push(&mut self, order: Order) -> usize {
        self.slots.push(order);
        self.slots.len() - 1
    }

    pub fn head(&self) -> usize {
        self.head
    }

    /// One past the last slot
    pub fn tail(&self) -> usize {
        self.slots.len()
    }

    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Live orders in queue order
    pub fn live(&self) -> impl Iterator<Item = &Order> {
        self.slots[self.head..].iter().filter(|o| o.is_live())
    }

    pub fn live_count(&self) -> usize {
        self.live().count()
    }

    pub fn is_empty(&self) -> bool {
        self.live_count() == 0
    }

    /// Settle the order at `idx` if it is still live.
    pub fn settle(&mut self, idx: usize, state: OrderState) -> bool {
        match self.slots.get_mut(idx) {
            Some(order) if order.is_live() => {
                order.settle(state);
                true
            }
            _ => false,
        }
    }

    /// Settle every live order in front of `idx`, returning copies of the
    /// settled orders in queue order.
    pub fn settle_before(&mut self, idx: usize, state: OrderState) -> Vec<Order> {
        let end = idx.min(self.slots.len());
        let mut settled = Vec::new();
        for order in &mut self.slots[self.head..end] {
            if order.is_live() {
                order.settle(state);
                settled.push(order.clone());
            }
        }
        settled
    }

    /// Skip the dead prefix and compact when worthwhile.
    ///
    /// Returns true when slots were moved.
    pub fn compact(&mut self) -> bool {
        while self.head < self.slots.len() && !self.slots[self.head].is_live() {
            self.head += 1;
        }
        if self.head == 0 {
            return false;
        }
        let live_region = self.slots.len() - self.head;
        if live_region * 2 >= self.slots.capacity() {
            return false;
        }
        self.slots.drain(..self.head);
        self.head = 0;
        true
    }
}

impl Default for OrderQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<usize> for OrderQueue {
    type Output = Order;

    fn index(&self, idx: usize) -> &Order {
        &self.slots[idx]
    }
}
