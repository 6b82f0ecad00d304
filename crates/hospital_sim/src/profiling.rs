//! Event accounting: per-kind counts of processed events.

use std::collections::HashMap;

use bevy_ecs::prelude::Resource;

use crate::clock::EventKind;

/// Counts events as the runner dispatches them. Optional: the runner records
/// into it only when the resource is present.
#[derive(Debug, Default, Resource)]
pub struct EventMetrics {
    counts: HashMap<EventKind, u64>,
    total: u64,
}

impl EventMetrics {
    pub fn record_event(&mut self, kind: EventKind) {
        *self.counts.entry(kind).or_insert(0) += 1;
        self.total += 1;
    }

    pub fn count(&self, kind: EventKind) -> u64 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}
