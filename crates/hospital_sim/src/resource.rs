//! Capacity-bounded facility pool with priority-ordered admission.
//!
//! Requests wait in a min-heap keyed by (priority, arrival order): a lower
//! priority value is admitted first, and equal priorities are FIFO. A held
//! slot can only be released by its own holder; there is no preemption.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use bevy_ecs::prelude::Entity;

use crate::clock::VirtualTime;
use crate::error::SimulationError;

/// A pending admission. `seq` is assigned at enqueue time and breaks priority
/// ties, so no request can starve behind later arrivals of its own class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitingRequest {
    pub patient: Entity,
    pub priority: u32,
    pub enqueued_at: VirtualTime,
    seq: u64,
}

impl Ord for WaitingRequest {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for WaitingRequest {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A pool of identical servers. Holder tokens are the entities themselves.
#[derive(Debug)]
pub struct PriorityResource {
    capacity: usize,
    holders: Vec<Entity>,
    waiting: BinaryHeap<Reverse<WaitingRequest>>,
    arrival_seq: u64,
}

impl PriorityResource {
    pub fn new(capacity: usize) -> Result<Self, SimulationError> {
        if capacity == 0 {
            return Err(SimulationError::CapacityConfigInvalid { capacity });
        }
        Ok(Self {
            capacity,
            holders: Vec::with_capacity(capacity),
            waiting: BinaryHeap::new(),
            arrival_seq: 0,
        })
    }

    /// Enqueue a request and grant the queue head if a slot is free. Returns
    /// the entity granted a slot, if any. Even an uncontended request goes
    /// through the queue, so admission order is uniform; the caller schedules
    /// the granted entity's resumption as a zero-delay event.
    pub fn request(&mut self, patient: Entity, priority: u32, now: VirtualTime) -> Option<Entity> {
        let seq = self.arrival_seq;
        self.arrival_seq += 1;
        self.waiting.push(Reverse(WaitingRequest {
            patient,
            priority,
            enqueued_at: now,
            seq,
        }));
        self.try_grant()
    }

    /// Release a held slot and grant the new queue head, if any. Returns the
    /// entity granted the freed slot; the caller schedules its resumption at
    /// the current instant.
    pub fn release(&mut self, holder: Entity) -> Option<Entity> {
        match self.holders.iter().position(|&h| h == holder) {
            Some(pos) => {
                self.holders.swap_remove(pos);
            }
            None => debug_assert!(false, "release called by a non-holder"),
        }
        self.try_grant()
    }

    fn try_grant(&mut self) -> Option<Entity> {
        if self.holders.len() >= self.capacity {
            return None;
        }
        let Reverse(next) = self.waiting.pop()?;
        self.holders.push(next.patient);
        debug_assert!(self.holders.len() <= self.capacity);
        Some(next.patient)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots currently held.
    pub fn in_use(&self) -> usize {
        self.holders.len()
    }

    pub fn is_full(&self) -> bool {
        self.holders.len() == self.capacity
    }

    pub fn waiting_len(&self) -> usize {
        self.waiting.len()
    }

    pub fn holds(&self, entity: Entity) -> bool {
        self.holders.contains(&entity)
    }
}
