//! Stand-in coverage backend with a random outcome

use async_trait::async_trait;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::warn;

use super::CoverageBackend;
use crate::config::CoverageConfig;
use crate::utils::error::CoverageError;

/// Chance of a covered answer when the configured one is unusable
pub const DEFAULT_PROBABILITY: f64 = 0.7;

/// Answers after a fixed delay, covered with a fixed probability
pub struct SimulatedBackend {
    delay: Duration,
    probability: f64,
    rng: Mutex<ChaCha8Rng>,
}

impl SimulatedBackend {
    /// `probability` is clamped to `0.0..=1.0` and NaN or infinite values fall
    /// back to [`DEFAULT_PROBABILITY`]; a `seed` makes runs repeatable
    pub fn new(delay: Duration, probability: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let probability = if probability.is_finite() {
            probability.clamp(0.0, 1.0)
        } else {
            warn!(probability, "Non-finite coverage probability, using default");
            DEFAULT_PROBABILITY
        };

        Self {
            delay,
            probability,
            rng: Mutex::new(rng),
        }
    }

    pub fn from_config(config: &CoverageConfig) -> Self {
        Self::new(
            Duration::from_millis(config.simulated_delay_ms),
            config.simulated_probability,
            config.simulated_seed,
        )
    }
}

#[async_trait]
impl CoverageBackend for SimulatedBackend {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn check(&self, _address: &str) -> Result<bool, CoverageError> {
        tokio::time::sleep(self.delay).await;

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(rng.gen_bool(self.probability))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_seeded_backend_is_repeatable() {
        let a = SimulatedBackend::new(Duration::from_millis(1500), 0.7, Some(42));
        let b = SimulatedBackend::new(Duration::from_millis(1500), 0.7, Some(42));

        for _ in 0..10 {
            assert_eq!(
                a.check("Kiganjo").await.unwrap(),
                b.check("Kiganjo").await.unwrap()
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_extreme_probabilities() {
        let always = SimulatedBackend::new(Duration::ZERO, 1.0, None);
        let never = SimulatedBackend::new(Duration::ZERO, 0.0, None);
        for _ in 0..20 {
            assert!(always.check("x").await.unwrap());
            assert!(!never.check("x").await.unwrap());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_answers_after_delay() {
        let backend = SimulatedBackend::new(Duration::from_millis(1500), 0.7, Some(1));
        let start = tokio::time::Instant::now();
        backend.check("Kiganjo").await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_finite_probability_uses_default() {
        for probability in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let backend = SimulatedBackend::new(Duration::ZERO, probability, Some(7));
            assert_eq!(backend.probability, DEFAULT_PROBABILITY);
            assert!(backend.check("Kiganjo").await.is_ok());
        }
    }

    #[test]
    fn test_out_of_range_probability_is_clamped() {
        assert_eq!(SimulatedBackend::new(Duration::ZERO, 1.5, None).probability, 1.0);
        assert_eq!(SimulatedBackend::new(Duration::ZERO, -0.2, None).probability, 0.0);
    }
}
