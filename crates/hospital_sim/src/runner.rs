//! Simulation runner: advances the clock and routes events into the ECS.
//!
//! Clock progression and event routing happen here, outside systems. Each
//! step pops the next event from [SimulationClock], inserts it as
//! [CurrentEvent], then runs the schedule. Exactly one process resumes per
//! step; concurrency is interleaving, never parallel execution.

use bevy_ecs::prelude::Res;
use bevy_ecs::prelude::{Schedule, World};
use bevy_ecs::schedule::{apply_deferred, IntoSystemConfigs};

use crate::clock::{CurrentEvent, Event, EventKind, SimulationClock, VirtualTime};
use crate::error::SimulationError;
use crate::profiling::EventMetrics;
use crate::scenario::SimulationEndTime;
use crate::systems::{
    monitor::monitor_tick_system,
    preparation::{enter_preparation_system, preparation_done_system},
    recovery::{enter_recovery_system, recovery_check_system, recovery_done_system},
    spawner::{patient_arrival_system, simulation_started_system},
    surgery::{enter_surgery_system, surgery_done_system},
};
use crate::telemetry::HospitalMetrics;

// Condition functions for each event kind
fn is_simulation_started(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::SimulationStarted)
        .unwrap_or(false)
}

fn is_patient_arrival(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::PatientArrival)
        .unwrap_or(false)
}

fn is_enter_preparation(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::EnterPreparation)
        .unwrap_or(false)
}

fn is_preparation_done(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::PreparationDone)
        .unwrap_or(false)
}

fn is_enter_surgery(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::EnterSurgery)
        .unwrap_or(false)
}

fn is_surgery_done(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::SurgeryDone)
        .unwrap_or(false)
}

fn is_recovery_check(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::RecoveryCheck)
        .unwrap_or(false)
}

fn is_enter_recovery(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::EnterRecovery)
        .unwrap_or(false)
}

fn is_recovery_done(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::RecoveryDone)
        .unwrap_or(false)
}

fn is_monitor_tick(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::MonitorTick)
        .unwrap_or(false)
}

/// Runs one simulation step: pops the next event, inserts it as
/// [CurrentEvent], then runs the schedule. Returns `true` if an event was
/// processed, `false` if the clock was empty or the next event is at or past
/// [SimulationEndTime] (when that resource is present). Events past the end
/// time stay pending; their processes keep their state but never resume.
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> bool {
    let stop_at = world.get_resource::<SimulationEndTime>().map(|e| e.0);
    let next_due = world
        .get_resource::<SimulationClock>()
        .and_then(|c| c.next_event_time());
    if let (Some(end), Some(due)) = (stop_at, next_due) {
        if due >= end {
            return false;
        }
    }

    let event = match world.resource_mut::<SimulationClock>().pop_next() {
        Some(e) => e,
        None => return false,
    };
    world.insert_resource(CurrentEvent(event));
    tracing::trace!(kind = ?event.kind, time = event.due.value(), seq = event.seq, "dispatch");

    // Track event counts if EventMetrics resource exists
    if let Some(mut metrics) = world.get_resource_mut::<EventMetrics>() {
        metrics.record_event(event.kind);
    }

    schedule.run(world);
    true
}

/// Runs one simulation step and invokes `hook` after the schedule completes.
/// The hook is the state-transition observer side-channel; it sees every
/// processed event exactly once.
pub fn run_next_event_with_hook<F>(world: &mut World, schedule: &mut Schedule, mut hook: F) -> bool
where
    F: FnMut(&World, &Event),
{
    let stop_at = world.get_resource::<SimulationEndTime>().map(|e| e.0);
    let next_due = world
        .get_resource::<SimulationClock>()
        .and_then(|c| c.next_event_time());
    if let (Some(end), Some(due)) = (stop_at, next_due) {
        if due >= end {
            return false;
        }
    }

    let event = match world.resource_mut::<SimulationClock>().pop_next() {
        Some(e) => e,
        None => return false,
    };
    world.insert_resource(CurrentEvent(event));

    if let Some(mut metrics) = world.get_resource_mut::<EventMetrics>() {
        metrics.record_event(event.kind);
    }

    schedule.run(world);
    hook(world, &event);
    true
}

/// Runs steps until the next event is at or past [SimulationEndTime].
/// Returns the number of events processed. Draining the queue before the end
/// time means a recurring process stopped rescheduling itself, which is a
/// logic error surfaced as [SimulationError::QueueEmpty].
pub fn run_until_end(world: &mut World, schedule: &mut Schedule) -> Result<usize, SimulationError> {
    let mut steps = 0;
    while run_next_event(world, schedule) {
        steps += 1;
    }
    if reached_end(world) {
        Ok(steps)
    } else {
        Err(SimulationError::QueueEmpty)
    }
}

/// Runs until the end time and invokes `hook` after each step.
pub fn run_until_end_with_hook<F>(
    world: &mut World,
    schedule: &mut Schedule,
    mut hook: F,
) -> Result<usize, SimulationError>
where
    F: FnMut(&World, &Event),
{
    let mut steps = 0;
    while run_next_event_with_hook(world, schedule, &mut hook) {
        steps += 1;
    }
    if reached_end(world) {
        Ok(steps)
    } else {
        Err(SimulationError::QueueEmpty)
    }
}

/// Runs to `warm_up`, discards the periodic samples gathered so far, then
/// runs to `run_length`. Counters are never reset; only samples are.
pub fn run_with_warmup(
    world: &mut World,
    schedule: &mut Schedule,
    warm_up: f64,
    run_length: f64,
) -> Result<usize, SimulationError> {
    if !warm_up.is_finite() || warm_up < 0.0 {
        return Err(SimulationError::InvalidDelay { delay: warm_up });
    }

    world.insert_resource(SimulationEndTime(VirtualTime(warm_up.min(run_length))));
    let mut steps = run_until_end(world, schedule)?;

    if let Some(mut metrics) = world.get_resource_mut::<HospitalMetrics>() {
        metrics.reset_samples();
    }

    world.insert_resource(SimulationEndTime(VirtualTime(run_length)));
    steps += run_until_end(world, schedule)?;
    Ok(steps)
}

fn reached_end(world: &World) -> bool {
    let Some(end) = world.get_resource::<SimulationEndTime>() else {
        return false;
    };
    let Some(clock) = world.get_resource::<SimulationClock>() else {
        return false;
    };
    clock.next_event_time().is_some_and(|due| due >= end.0)
}

/// Builds the default simulation schedule: all event-reacting systems plus
/// [apply_deferred] so a spawned patient is applied before its next event.
///
/// Systems are conditionally executed based on event type to reduce overhead.
pub fn simulation_schedule() -> Schedule {
    let mut schedule = Schedule::default();

    schedule.add_systems((
        simulation_started_system.run_if(is_simulation_started),
        patient_arrival_system.run_if(is_patient_arrival),
        enter_preparation_system.run_if(is_enter_preparation),
        preparation_done_system.run_if(is_preparation_done),
        enter_surgery_system.run_if(is_enter_surgery),
        surgery_done_system.run_if(is_surgery_done),
        recovery_check_system.run_if(is_recovery_check),
        enter_recovery_system.run_if(is_enter_recovery),
        recovery_done_system.run_if(is_recovery_done),
        monitor_tick_system.run_if(is_monitor_tick),
        // Always run apply_deferred to ensure spawned patients are available
        apply_deferred,
    ));

    schedule
}

/// Initializes the simulation by scheduling the SimulationStarted event at
/// time 0. Call this after building the scenario and before running events.
pub fn initialize_simulation(world: &mut World) {
    let mut clock = world.resource_mut::<SimulationClock>();
    clock.schedule_at(VirtualTime::ZERO, EventKind::SimulationStarted, None);
}
