//! Arrival generator: reacts to SimulationStarted and PatientArrival events.
//!
//! The generator is an infinite loop in event form: every arrival schedules
//! the next one after a sampled inter-arrival gap. It never terminates on
//! its own; the runner's stop condition simply leaves its next event pending.

use bevy_ecs::prelude::{Commands, Res, ResMut};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::ecs::{Patient, PatientStage, Severity, StageDurations};
use crate::scenario::{ArrivalConfig, ArrivalState, MonitorConfig, PreparationRooms};
use crate::telemetry::HospitalMetrics;

/// Bootstraps the two recurring processes at time 0: the first patient
/// arrives after one inter-arrival gap, the monitor samples after one
/// interval.
pub fn simulation_started_system(
    mut clock: ResMut<SimulationClock>,
    config: Res<ArrivalConfig>,
    state: Res<ArrivalState>,
    monitor: Res<MonitorConfig>,
    event: Res<CurrentEvent>,
) {
    if event.0.kind != EventKind::SimulationStarted {
        return;
    }

    let now = clock.now();
    let gap = config.interarrival.sample(state.arrivals).max(0.0);
    clock.schedule_at(now.after(gap), EventKind::PatientArrival, None);
    clock.schedule_at(now.after(monitor.interval), EventKind::MonitorTick, None);
}

/// Spawns one patient per wake-up, requests a preparation room for it and
/// schedules the next arrival.
pub fn patient_arrival_system(
    mut commands: Commands,
    mut clock: ResMut<SimulationClock>,
    config: Res<ArrivalConfig>,
    mut state: ResMut<ArrivalState>,
    mut prep: ResMut<PreparationRooms>,
    mut metrics: ResMut<HospitalMetrics>,
    event: Res<CurrentEvent>,
) {
    if event.0.kind != EventKind::PatientArrival {
        return;
    }

    let now = clock.now();
    let id = state.next_patient_id;
    state.next_patient_id += 1;

    // Severity is drawn from an RNG keyed by patient id so a given scenario
    // reproduces the same population.
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(id));
    let severity = if rng.gen::<f64>() < config.severe_probability {
        Severity::Severe
    } else {
        Severity::Mild
    };
    let scale = severity.duration_scale();
    let durations = StageDurations {
        preparation: config.preparation.sample(id).max(0.0) * scale,
        surgery: config.surgery.sample(id).max(0.0) * scale,
        recovery: config.recovery.sample(id).max(0.0) * scale,
    };

    let patient = commands
        .spawn(Patient {
            id,
            severity,
            stage: PatientStage::Preparing,
            durations,
            arrival_time: now,
            departed_at: None,
        })
        .id();
    metrics.record_arrival();
    tracing::debug!(patient = id, severity = ?severity, time = now.value(), "patient arrived");

    // Preparation admission; the grant resumes as a zero-delay event.
    if let Some(granted) = prep.0.request(patient, severity.priority(), now) {
        clock.schedule_at(now, EventKind::EnterPreparation, Some(granted));
    }

    state.arrivals += 1;
    let gap = config.interarrival.sample(state.arrivals).max(0.0);
    clock.schedule_at(now.after(gap), EventKind::PatientArrival, None);
}
