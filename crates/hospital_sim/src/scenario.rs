//! Scenario setup: configuration parameters and world assembly.
//!
//! Defaults follow the reference configuration: 3 preparation rooms, a
//! single operating theatre, 3 recovery beds, fixed inter-arrival gap of 25
//! time units and uniform service times per stage.

use std::sync::Arc;

use bevy_ecs::prelude::{Resource, World};

use crate::clock::{SimulationClock, VirtualTime};
use crate::distributions::{FixedServiceTime, ServiceTimeDistribution, UniformServiceTime};
use crate::error::SimulationError;
use crate::profiling::EventMetrics;
use crate::resource::PriorityResource;
use crate::telemetry::HospitalMetrics;

/// The hospital runs a single operating theatre.
const SURGERY_THEATRES: usize = 1;

/// Preparation rooms facility.
#[derive(Debug, Resource)]
pub struct PreparationRooms(pub PriorityResource);

/// The operating theatre (capacity 1).
#[derive(Debug, Resource)]
pub struct SurgeryTheatre(pub PriorityResource);

/// Recovery beds facility.
#[derive(Debug, Resource)]
pub struct RecoveryBeds(pub PriorityResource);

/// Virtual time at which the run stops. Events due at or past this instant
/// are left pending; their processes keep their state but are never resumed.
#[derive(Debug, Clone, Copy, Resource)]
pub struct SimulationEndTime(pub VirtualTime);

/// Injected sampling functions plus the severity mix for arriving patients.
#[derive(Debug, Clone, Resource)]
pub struct ArrivalConfig {
    pub interarrival: Arc<dyn ServiceTimeDistribution>,
    pub preparation: Arc<dyn ServiceTimeDistribution>,
    pub surgery: Arc<dyn ServiceTimeDistribution>,
    pub recovery: Arc<dyn ServiceTimeDistribution>,
    /// Probability that an arriving patient is severe.
    pub severe_probability: f64,
    /// Seed for the per-patient severity draw.
    pub seed: u64,
}

/// Arrival generator state: next patient id and the inter-arrival draw count.
#[derive(Debug, Default, Resource)]
pub struct ArrivalState {
    pub next_patient_id: u64,
    pub arrivals: u64,
}

/// Periodic monitor configuration.
#[derive(Debug, Clone, Copy, Resource)]
pub struct MonitorConfig {
    /// Gap between queue-length samples, virtual time units.
    pub interval: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self { interval: 1.0 }
    }
}

/// Parameters for building a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioParams {
    pub preparation_rooms: usize,
    pub recovery_rooms: usize,
    pub seed: u64,
    pub interarrival: Arc<dyn ServiceTimeDistribution>,
    pub preparation: Arc<dyn ServiceTimeDistribution>,
    pub surgery: Arc<dyn ServiceTimeDistribution>,
    pub recovery: Arc<dyn ServiceTimeDistribution>,
    pub severe_probability: f64,
    pub monitor_interval: f64,
    /// Run length in virtual time units.
    pub run_length: f64,
    /// Optional warm-up length; samples gathered before it are discarded.
    pub warm_up: Option<f64>,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        let seed = 33;
        Self {
            preparation_rooms: 3,
            recovery_rooms: 3,
            seed,
            interarrival: Arc::new(FixedServiceTime::new(25.0)),
            preparation: Arc::new(UniformServiceTime::new(30.0, 50.0, seed)),
            surgery: Arc::new(UniformServiceTime::new(15.0, 30.0, seed.wrapping_add(1))),
            recovery: Arc::new(UniformServiceTime::new(30.0, 50.0, seed.wrapping_add(2))),
            severe_probability: 0.5,
            monitor_interval: 1.0,
            run_length: 300.0,
            warm_up: None,
        }
    }
}

impl ScenarioParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_rooms(mut self, preparation_rooms: usize, recovery_rooms: usize) -> Self {
        self.preparation_rooms = preparation_rooms;
        self.recovery_rooms = recovery_rooms;
        self
    }

    pub fn with_interarrival(mut self, interarrival: Arc<dyn ServiceTimeDistribution>) -> Self {
        self.interarrival = interarrival;
        self
    }

    pub fn with_service_times(
        mut self,
        preparation: Arc<dyn ServiceTimeDistribution>,
        surgery: Arc<dyn ServiceTimeDistribution>,
        recovery: Arc<dyn ServiceTimeDistribution>,
    ) -> Self {
        self.preparation = preparation;
        self.surgery = surgery;
        self.recovery = recovery;
        self
    }

    pub fn with_severe_probability(mut self, severe_probability: f64) -> Self {
        self.severe_probability = severe_probability.clamp(0.0, 1.0);
        self
    }

    pub fn with_monitor_interval(mut self, interval: f64) -> Self {
        self.monitor_interval = interval;
        self
    }

    pub fn with_run_length(mut self, run_length: f64) -> Self {
        self.run_length = run_length;
        self
    }

    pub fn with_warm_up(mut self, warm_up: f64) -> Self {
        self.warm_up = Some(warm_up);
        self
    }
}

/// Build a world with all engine resources installed. Validates capacities
/// and time parameters; fails fast at setup rather than mid-run.
pub fn build_world(params: &ScenarioParams) -> Result<World, SimulationError> {
    if !params.run_length.is_finite() || params.run_length < 0.0 {
        return Err(SimulationError::InvalidDelay {
            delay: params.run_length,
        });
    }
    // A non-positive monitor interval would pin the clock to one instant.
    if !params.monitor_interval.is_finite() || params.monitor_interval <= 0.0 {
        return Err(SimulationError::InvalidDelay {
            delay: params.monitor_interval,
        });
    }
    if let Some(warm_up) = params.warm_up {
        if !warm_up.is_finite() || warm_up < 0.0 {
            return Err(SimulationError::InvalidDelay { delay: warm_up });
        }
    }

    let mut world = World::new();
    world.insert_resource(SimulationClock::default());
    world.insert_resource(PreparationRooms(PriorityResource::new(
        params.preparation_rooms,
    )?));
    world.insert_resource(SurgeryTheatre(PriorityResource::new(SURGERY_THEATRES)?));
    world.insert_resource(RecoveryBeds(PriorityResource::new(params.recovery_rooms)?));
    world.insert_resource(HospitalMetrics::default());
    world.insert_resource(EventMetrics::default());
    world.insert_resource(ArrivalConfig {
        interarrival: Arc::clone(&params.interarrival),
        preparation: Arc::clone(&params.preparation),
        surgery: Arc::clone(&params.surgery),
        recovery: Arc::clone(&params.recovery),
        severe_probability: params.severe_probability,
        seed: params.seed,
    });
    world.insert_resource(ArrivalState::default());
    world.insert_resource(MonitorConfig {
        interval: params.monitor_interval,
    });
    world.insert_resource(SimulationEndTime(VirtualTime(params.run_length)));
    Ok(world)
}
