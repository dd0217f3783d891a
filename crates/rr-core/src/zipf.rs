use crate::error::RrError;
use crate::extremes::max_by_value;
use crate::table::Popularity;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Zipf;
use std::collections::HashMap;

/// Exponent of the popularity law.
pub const DEFAULT_EXPONENT: f64 = 2.0;

/// Default bound on generation attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 100_000;

/// Rank support. Large enough that the bounded law is indistinguishable from
/// the unbounded one for any realistic sample size.
const ZIPF_SUPPORT: u64 = u32::MAX as u64;

/// Draws category popularity counts from a Zipf power law.
///
/// Owns its random source; two generators built with the same seed and
/// exponent produce identical popularity mappings.
pub struct ZipfGenerator {
    dist: Zipf<f64>,
    exponent: f64,
    rng: StdRng,
    max_attempts: usize,
}

impl ZipfGenerator {
    pub fn new(exponent: f64, rng_seed: u64) -> Result<Self, RrError> {
        if !exponent.is_finite() {
            return Err(RrError::configuration(format!(
                "zipf exponent must be finite, got {exponent}"
            )));
        }
        let dist = Zipf::new(ZIPF_SUPPORT, exponent)
            .map_err(|e| RrError::configuration(format!("invalid zipf exponent {exponent}: {e}")))?;
        Ok(Self {
            dist,
            exponent,
            rng: StdRng::seed_from_u64(rng_seed),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        })
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn exponent(&self) -> f64 {
        self.exponent
    }

    /// Draw `size` ranks and count them. Buckets are in first-seen order.
    fn histogram(&mut self, size: usize) -> Vec<u64> {
        let mut slot: HashMap<u64, usize> = HashMap::new();
        let mut buckets: Vec<u64> = Vec::new();
        for _ in 0..size {
            let rank = self.rng.sample(&self.dist) as u64;
            let pos = *slot.entry(rank).or_insert_with(|| {
                buckets.push(0);
                buckets.len() - 1
            });
            buckets[pos] += 1;
        }
        buckets
    }

    /// Produce exactly `num_categories` categories whose counts follow the
    /// Zipf law, rescaled so the modal bucket saturates `population_size`
    /// (up to integer division).
    ///
    /// The sample size starts at `num_categories` and grows by one after
    /// every attempt whose distinct-rank count misses the target.
    pub fn generate(
        &mut self,
        num_categories: usize,
        population_size: u64,
    ) -> Result<Popularity, RrError> {
        if num_categories == 0 {
            return Err(RrError::configuration("num_categories must be > 0"));
        }

        let mut size = num_categories;
        for attempt in 1..=self.max_attempts {
            let buckets = self.histogram(size);
            if buckets.len() != num_categories {
                size += 1;
                continue;
            }

            let max_count = max_by_value(buckets.iter().copied().enumerate())
                .map(|(_, count)| count)
                .unwrap_or(0);
            if max_count == 0 {
                return Err(RrError::configuration(
                    "modal zipf bucket is empty, scale factor undefined",
                ));
            }

            let scale_factor = population_size / max_count;
            if scale_factor == 0 {
                tracing::warn!(
                    population_size,
                    max_count,
                    "population smaller than modal bucket, all counts are zero"
                );
            }

            tracing::debug!(
                attempt,
                sample_size = size,
                max_count,
                scale_factor,
                "zipf histogram accepted"
            );

            return Ok(buckets
                .into_iter()
                .enumerate()
                .map(|(i, count)| (i.to_string(), count * scale_factor))
                .collect());
        }

        Err(RrError::configuration(format!(
            "could not draw exactly {num_categories} distinct zipf ranks within {} attempts",
            self.max_attempts
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_category_count() {
        for n in [1, 5, 20] {
            let mut gen = ZipfGenerator::new(DEFAULT_EXPONENT, 22527).unwrap();
            let pop = gen.generate(n, 10_000).unwrap();
            assert_eq!(pop.len(), n);
        }
    }

    #[test]
    fn keys_are_enumerated() {
        let mut gen = ZipfGenerator::new(DEFAULT_EXPONENT, 7).unwrap();
        let pop = gen.generate(8, 5_000).unwrap();
        let keys: Vec<String> = pop.keys().map(String::from).collect();
        let expected: Vec<String> = (0..8).map(|i| i.to_string()).collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn single_category_saturates_population() {
        // One sample, one bucket of size 1, scale factor == population.
        let mut gen = ZipfGenerator::new(DEFAULT_EXPONENT, 1).unwrap();
        let pop = gen.generate(1, 1_000).unwrap();
        assert_eq!(pop.get("0"), Some(&1_000));
    }

    #[test]
    fn modal_count_bounded_by_population() {
        let mut gen = ZipfGenerator::new(DEFAULT_EXPONENT, 22527).unwrap();
        let population = 50_000;
        let pop = gen.generate(10, population).unwrap();

        let (_, max) = max_by_value(pop.iter()).unwrap();
        assert!(*max <= population);
        // bucket * floor(population / bucket) always exceeds half the population
        assert!(2 * *max > population);
        assert!(pop.values().all(|v| v <= max));
        assert!(pop.values().sum::<u64>() >= *max);
    }

    #[test]
    fn deterministic_for_fixed_seed() {
        let a = ZipfGenerator::new(DEFAULT_EXPONENT, 99)
            .unwrap()
            .generate(12, 20_000)
            .unwrap();
        let b = ZipfGenerator::new(DEFAULT_EXPONENT, 99)
            .unwrap()
            .generate(12, 20_000)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_categories_rejected() {
        let mut gen = ZipfGenerator::new(DEFAULT_EXPONENT, 1).unwrap();
        assert!(matches!(
            gen.generate(0, 100),
            Err(RrError::Configuration { .. })
        ));
    }

    #[test]
    fn attempt_bound_is_enforced() {
        // 50 draws from a Zipf(2) law are never all distinct in practice.
        let mut gen = ZipfGenerator::new(DEFAULT_EXPONENT, 3)
            .unwrap()
            .with_max_attempts(1);
        assert!(matches!(
            gen.generate(50, 1_000),
            Err(RrError::Configuration { .. })
        ));
    }

    #[test]
    fn invalid_exponent_rejected() {
        assert!(ZipfGenerator::new(-1.0, 1).is_err());
        assert!(ZipfGenerator::new(f64::NAN, 1).is_err());
    }

    #[test]
    fn small_population_yields_zero_counts() {
        let mut gen = ZipfGenerator::new(DEFAULT_EXPONENT, 5).unwrap();
        let pop = gen.generate(3, 0).unwrap();
        assert!(pop.values().all(|&v| v == 0));
    }
}
