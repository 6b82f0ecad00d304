//! Runs the reference scenario and prints the aggregate report as JSON.
//!
//! Set RUST_LOG=hospital_sim=debug to trace patient stage transitions.

use hospital_sim::scenario::ScenarioParams;
use hospital_sim::telemetry::HospitalMetrics;
use hospital_sim::test_helpers::run_scenario;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let params = ScenarioParams::default()
        .with_run_length(1000.0)
        .with_warm_up(100.0);

    let (world, steps) = run_scenario(&params)?;
    let metrics = world.resource::<HospitalMetrics>();

    eprintln!(
        "processed {} events: {} patients, {} departed, {} in flight",
        steps,
        metrics.total_patients,
        metrics.departed_patients,
        metrics.patients_in_flight(),
    );
    println!("{}", serde_json::to_string_pretty(&metrics.report())?);
    Ok(())
}
