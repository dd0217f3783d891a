use crate::error::RrError;
use crate::population::Record;
use crate::traits::{cover, Mechanism, RrParams};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Fox randomized response.
///
/// Each bit is reported truthfully with probability `q`. Otherwise the
/// respondent answers 1 with probability `r`, independently of the true bit.
/// Every category of every record goes through the coin. `tau` is ignored.
pub struct FoxRr {
    rng: StdRng,
}

impl FoxRr {
    pub fn new(rng_seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(rng_seed),
        }
    }

    fn respond(&mut self, bit: u8, q: f64, r: f64) -> u8 {
        if self.rng.gen::<f64>() <= q {
            bit
        } else {
            cover(&mut self.rng, r)
        }
    }
}

impl Mechanism for FoxRr {
    fn name(&self) -> &'static str {
        "fox"
    }

    fn perturb_record(&mut self, record: &Record, params: &RrParams) -> Result<Record, RrError> {
        let bits = record
            .bits()
            .iter()
            .map(|&bit| self.respond(bit, params.q, params.r))
            .collect();
        Ok(Record::from_bits_unchecked(bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::{build, Population};
    use crate::table::Popularity;

    fn seed() -> Population {
        let popularity: Popularity = [("0", 300u64), ("1", 120), ("2", 0), ("3", 1000)]
            .into_iter()
            .collect();
        build(1_000, &popularity)
    }

    #[test]
    fn full_truth_is_identity() {
        let seed = seed();
        let mut fox = FoxRr::new(1);
        let out = fox.perturb(&seed, &RrParams::new(1.0, 0.0, 0)).unwrap();
        assert_eq!(out, seed);
    }

    #[test]
    fn never_truthful_always_lying_to_one() {
        let seed = seed();
        let mut fox = FoxRr::new(2);
        let freq = fox.simulate(&seed, &RrParams::new(0.0, 1.0, 0)).unwrap();
        assert!(freq.values().all(|&v| v == 1_000));
    }

    #[test]
    fn never_truthful_never_one() {
        let seed = seed();
        let mut fox = FoxRr::new(3);
        let freq = fox.simulate(&seed, &RrParams::new(0.0, 0.0, 0)).unwrap();
        assert!(freq.values().all(|&v| v == 0));
    }

    #[test]
    fn expected_rate_for_mixed_parameters() {
        // P(report 1 | bit 0) = (1 - q) * r = 0.5 * 0.5
        let seed = seed();
        let mut fox = FoxRr::new(4);
        let freq = fox.simulate(&seed, &RrParams::new(0.5, 0.5, 0)).unwrap();
        let zeros = *freq.get("2").unwrap();
        assert!((170..=330).contains(&zeros), "got {zeros}");
        // Category "3" is all ones: q + (1 - q) * r = 0.75
        let ones = *freq.get("3").unwrap();
        assert!((670..=830).contains(&ones), "got {ones}");
    }

    #[test]
    fn tau_is_ignored() {
        let seed = seed();
        let params_a = RrParams::new(0.3, 0.6, 0);
        let params_b = RrParams::new(0.3, 0.6, 40);
        let a = FoxRr::new(9).simulate(&seed, &params_a).unwrap();
        let b = FoxRr::new(9).simulate(&seed, &params_b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn deterministic_for_fixed_seed() {
        let seed = seed();
        let params = RrParams::new(0.4, 0.3, 0);
        let a = FoxRr::new(22527).simulate(&seed, &params).unwrap();
        let b = FoxRr::new(22527).simulate(&seed, &params).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn rejects_invalid_probability() {
        let mut fox = FoxRr::new(5);
        assert!(matches!(
            fox.simulate(&seed(), &RrParams::new(2.0, 0.5, 0)),
            Err(RrError::Configuration { .. })
        ));
    }
}
