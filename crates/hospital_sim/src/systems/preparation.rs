//! Preparation stage: hold a room for the sampled duration, then move on to
//! the operating theatre queue.

use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::ecs::Patient;
use crate::scenario::{PreparationRooms, SurgeryTheatre};
use crate::telemetry::HospitalMetrics;

/// The patient was granted a preparation room; hold it for the sampled
/// preparation time.
pub fn enter_preparation_system(
    mut clock: ResMut<SimulationClock>,
    patients: Query<&Patient>,
    event: Res<CurrentEvent>,
) {
    if event.0.kind != EventKind::EnterPreparation {
        return;
    }
    let Some(entity) = event.0.patient else {
        return;
    };
    let Ok(patient) = patients.get(entity) else {
        return;
    };

    let now = clock.now();
    tracing::debug!(patient = patient.id, time = now.value(), "entered preparation");
    clock.schedule_at(
        now.after(patient.durations.preparation),
        EventKind::PreparationDone,
        Some(entity),
    );
}

/// Preparation finished: release the room (waking the next waiter, if any)
/// and request the theatre. A request that sees a non-empty theatre queue
/// counts as a blocked-surgery contention event.
pub fn preparation_done_system(
    mut clock: ResMut<SimulationClock>,
    mut prep: ResMut<PreparationRooms>,
    mut surgery: ResMut<SurgeryTheatre>,
    mut metrics: ResMut<HospitalMetrics>,
    patients: Query<&Patient>,
    event: Res<CurrentEvent>,
) {
    if event.0.kind != EventKind::PreparationDone {
        return;
    }
    let Some(entity) = event.0.patient else {
        return;
    };
    let Ok(patient) = patients.get(entity) else {
        return;
    };

    let now = clock.now();
    if let Some(next) = prep.0.release(entity) {
        clock.schedule_at(now, EventKind::EnterPreparation, Some(next));
    }

    if surgery.0.waiting_len() > 0 {
        metrics.record_blocked_surgery();
        tracing::debug!(patient = patient.id, time = now.value(), "surgery request blocked behind queue");
    }
    if let Some(granted) = surgery.0.request(entity, patient.priority(), now) {
        clock.schedule_at(now, EventKind::EnterSurgery, Some(granted));
    }
}
