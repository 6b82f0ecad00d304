use bevy_ecs::prelude::Component;

use crate::clock::VirtualTime;

/// Severity class assigned at arrival. Maps to the admission priority used
/// for every facility and to a scaling factor on sampled service times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Severe,
    Mild,
}

impl Severity {
    /// Admission priority; a lower value is admitted first.
    pub fn priority(self) -> u32 {
        match self {
            Severity::Severe => 0,
            Severity::Mild => 1,
        }
    }

    /// Mild cases take half the sampled service time in every stage.
    pub fn duration_scale(self) -> f64 {
        match self {
            Severity::Severe => 1.0,
            Severity::Mild => 0.5,
        }
    }
}

/// Life-cycle stage; doubles as the patient's suspension point. Transitions
/// are strictly Preparing → InSurgery → WaitingForRecoveryBed* → Recovering
/// → Departed, driven only by the patient's own events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatientStage {
    Preparing,
    InSurgery,
    WaitingForRecoveryBed,
    Recovering,
    Departed,
}

/// Service times for the three treatment stages, sampled at arrival and
/// already severity-scaled. Zero durations are valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageDurations {
    pub preparation: f64,
    pub surgery: f64,
    pub recovery: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct Patient {
    pub id: u64,
    pub severity: Severity,
    pub stage: PatientStage,
    pub durations: StageDurations,
    pub arrival_time: VirtualTime,
    /// Set once on departure; the patient is immutable afterwards.
    pub departed_at: Option<VirtualTime>,
}

impl Patient {
    pub fn priority(&self) -> u32 {
        self.severity.priority()
    }

    /// Arrival-to-departure time, once departed.
    pub fn sojourn_time(&self) -> Option<f64> {
        self.departed_at.map(|d| d.value() - self.arrival_time.value())
    }
}
