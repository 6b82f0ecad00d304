//! Metrics: running counters plus periodic samples, read by the external
//! reporting collaborator after the run (or between runs).

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

/// Accumulates counters and periodic samples over a run. Counters are
/// mutated by the life-cycle systems, samples by the periodic monitor.
#[derive(Debug, Default, Resource)]
pub struct HospitalMetrics {
    pub total_patients: u64,
    pub departed_patients: u64,
    /// Contention events at the surgery request, not unique patients: every
    /// request that observes a non-empty theatre queue increments this once,
    /// so simultaneously queued requests can overcount unique blocked
    /// patients. Kept as-is rather than deduplicated.
    pub blocked_surgeries: u64,
    pub completed_surgeries: u64,
    pub total_sojourn_time: f64,
    /// Preparation waiting-queue length at each monitor tick.
    pub prep_queue_samples: Vec<usize>,
    /// Whether every recovery bed was occupied at each monitor tick.
    pub recovery_full_samples: Vec<bool>,
}

impl HospitalMetrics {
    pub fn record_arrival(&mut self) {
        self.total_patients += 1;
    }

    pub fn record_blocked_surgery(&mut self) {
        self.blocked_surgeries += 1;
    }

    pub fn record_completed_surgery(&mut self) {
        self.completed_surgeries += 1;
    }

    pub fn record_departure(&mut self, sojourn_time: f64) {
        self.departed_patients += 1;
        self.total_sojourn_time += sojourn_time;
    }

    pub fn record_sample(&mut self, prep_queue_len: usize, recovery_full: bool) {
        self.prep_queue_samples.push(prep_queue_len);
        self.recovery_full_samples.push(recovery_full);
    }

    /// Discard the periodic samples gathered so far (warm-up period).
    /// Running counters keep accumulating for the full run.
    pub fn reset_samples(&mut self) {
        self.prep_queue_samples.clear();
        self.recovery_full_samples.clear();
    }

    pub fn patients_in_flight(&self) -> u64 {
        self.total_patients - self.departed_patients
    }

    /// Mean arrival-to-departure time over departed patients.
    pub fn avg_sojourn_time(&self) -> f64 {
        if self.departed_patients == 0 {
            return 0.0;
        }
        self.total_sojourn_time / self.departed_patients as f64
    }

    /// Aggregate snapshot for the reporting collaborator. Every ratio guards
    /// against an empty denominator.
    pub fn report(&self) -> SimReport {
        let avg_preparation_queue = if self.prep_queue_samples.is_empty() {
            0.0
        } else {
            let sum: usize = self.prep_queue_samples.iter().sum();
            sum as f64 / self.prep_queue_samples.len() as f64
        };

        let attempts = self.completed_surgeries + self.blocked_surgeries;
        let blocking_rate = if attempts == 0 {
            0.0
        } else {
            self.blocked_surgeries as f64 / attempts as f64
        };

        let recovery_busy_probability = if self.recovery_full_samples.is_empty() {
            0.0
        } else {
            let full = self.recovery_full_samples.iter().filter(|&&b| b).count();
            full as f64 / self.recovery_full_samples.len() as f64 * 100.0
        };

        let utilization_surgery = if self.total_patients == 0 {
            0.0
        } else {
            self.completed_surgeries as f64 / self.total_patients as f64 * 100.0
        };

        SimReport {
            avg_preparation_queue,
            blocking_rate,
            recovery_busy_probability,
            utilization_surgery,
        }
    }
}

/// Steady-state performance snapshot handed across the engine boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimReport {
    pub avg_preparation_queue: f64,
    /// In [0, 1].
    pub blocking_rate: f64,
    /// Percentage in [0, 100].
    pub recovery_busy_probability: f64,
    /// Percentage in [0, 100].
    pub utilization_surgery: f64,
}
