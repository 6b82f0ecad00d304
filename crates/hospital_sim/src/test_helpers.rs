//! Deterministic builders shared by integration tests and benches.

use std::sync::Arc;

use bevy_ecs::prelude::{Schedule, World};

use crate::distributions::FixedServiceTime;
use crate::error::SimulationError;
use crate::runner::{initialize_simulation, run_until_end, run_with_warmup, simulation_schedule};
use crate::scenario::{build_world, ScenarioParams};

/// Scenario with constant gaps and durations: inter-arrival 25, preparation
/// 40, surgery 20, recovery 40, every patient severe. Fully deterministic.
pub fn fixed_scenario(
    preparation_rooms: usize,
    recovery_rooms: usize,
    run_length: f64,
) -> ScenarioParams {
    ScenarioParams::default()
        .with_rooms(preparation_rooms, recovery_rooms)
        .with_interarrival(Arc::new(FixedServiceTime::new(25.0)))
        .with_service_times(
            Arc::new(FixedServiceTime::new(40.0)),
            Arc::new(FixedServiceTime::new(20.0)),
            Arc::new(FixedServiceTime::new(40.0)),
        )
        .with_severe_probability(1.0)
        .with_run_length(run_length)
}

/// Build a world and schedule with the bootstrap event already queued.
pub fn build_simulation(params: &ScenarioParams) -> Result<(World, Schedule), SimulationError> {
    let mut world = build_world(params)?;
    initialize_simulation(&mut world);
    Ok((world, simulation_schedule()))
}

/// Build and run a scenario to its end time (honoring any warm-up), returning
/// the finished world and the number of events processed.
pub fn run_scenario(params: &ScenarioParams) -> Result<(World, usize), SimulationError> {
    let (mut world, mut schedule) = build_simulation(params)?;
    let steps = match params.warm_up {
        Some(warm_up) => run_with_warmup(&mut world, &mut schedule, warm_up, params.run_length)?,
        None => run_until_end(&mut world, &mut schedule)?,
    };
    Ok((world, steps))
}
