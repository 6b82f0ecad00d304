//! Sampling functions for inter-arrival gaps and stage service times.
//!
//! Distributions are stateless: each draw seeds its own RNG from the
//! configured seed plus the draw index, so a given scenario reproduces the
//! same sequence regardless of call order.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Trait for sampling durations in virtual time units. `draw_index`
/// identifies the draw (arrival count or patient id); equal indices yield
/// equal samples. Samples are always non-negative; zero is a valid duration.
pub trait ServiceTimeDistribution: Send + Sync + std::fmt::Debug {
    fn sample(&self, draw_index: u64) -> f64;
}

/// Constant duration.
#[derive(Debug, Clone)]
pub struct FixedServiceTime {
    pub duration: f64,
}

impl FixedServiceTime {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: duration.max(0.0),
        }
    }
}

impl ServiceTimeDistribution for FixedServiceTime {
    fn sample(&self, _draw_index: u64) -> f64 {
        self.duration
    }
}

/// Uniform duration in `[min, max]`.
#[derive(Debug, Clone)]
pub struct UniformServiceTime {
    pub min: f64,
    pub max: f64,
    pub seed: u64,
}

impl UniformServiceTime {
    pub fn new(min: f64, max: f64, seed: u64) -> Self {
        let min = min.max(0.0);
        Self {
            min,
            max: max.max(min),
            seed,
        }
    }
}

impl ServiceTimeDistribution for UniformServiceTime {
    fn sample(&self, draw_index: u64) -> f64 {
        if self.max <= self.min {
            return self.min;
        }
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(draw_index));
        rng.gen_range(self.min..=self.max)
    }
}

/// Exponential duration with the given mean (inverse-CDF sampling). With a
/// mean inter-arrival gap this yields a Poisson arrival process.
#[derive(Debug, Clone)]
pub struct ExponentialServiceTime {
    pub mean: f64,
    pub seed: u64,
}

impl ExponentialServiceTime {
    pub fn new(mean: f64, seed: u64) -> Self {
        Self {
            mean: mean.max(0.0),
            seed,
        }
    }
}

impl ServiceTimeDistribution for ExponentialServiceTime {
    fn sample(&self, draw_index: u64) -> f64 {
        if self.mean <= 0.0 {
            return 0.0;
        }
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(draw_index));
        // Sample from exponential: -ln(U) * mean, where U is uniform [0,1)
        let u: f64 = rng.gen();
        let u = u.max(1e-10); // Avoid log(0)
        -u.ln() * self.mean
    }
}
