use crate::error::RrError;
use crate::population::Record;
use crate::traits::{cover, Mechanism, RrParams};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Mangat randomized response.
///
/// True ones are always reported as 1. True zeros are covered: reported as 1
/// with probability `r`. `q` and `tau` are ignored.
pub struct MangatRr {
    rng: StdRng,
}

impl MangatRr {
    pub fn new(rng_seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(rng_seed),
        }
    }

    fn respond(&mut self, bit: u8, r: f64) -> u8 {
        if bit == 1 {
            1
        } else {
            cover(&mut self.rng, r)
        }
    }
}

impl Mechanism for MangatRr {
    fn name(&self) -> &'static str {
        "mangat"
    }

    fn perturb_record(&mut self, record: &Record, params: &RrParams) -> Result<Record, RrError> {
        let bits = record
            .bits()
            .iter()
            .map(|&bit| self.respond(bit, params.r))
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
        let popularity: Popularity = [("0", 1000u64), ("1", 0), ("2", 250)]
            .into_iter()
            .collect();
        build(1_000, &popularity)
    }

    #[test]
    fn ones_are_never_flipped() {
        let seed = seed();
        for (i, r) in [0.0, 0.3, 1.0].into_iter().enumerate() {
            let mut m = MangatRr::new(i as u64);
            let out = m.perturb(&seed, &RrParams::new(0.0, r, 0)).unwrap();
            for (truth, reported) in seed.records().iter().zip(out.records()) {
                for (&t, &p) in truth.bits().iter().zip(reported.bits()) {
                    if t == 1 {
                        assert_eq!(p, 1);
                    }
                }
            }
        }
    }

    #[test]
    fn zero_cover_keeps_zeros() {
        let seed = seed();
        let mut m = MangatRr::new(1);
        let out = m.perturb(&seed, &RrParams::new(0.0, 0.0, 0)).unwrap();
        assert_eq!(out, seed);
    }

    #[test]
    fn full_cover_reports_everything() {
        let seed = seed();
        let mut m = MangatRr::new(2);
        let freq = m.simulate(&seed, &RrParams::new(0.0, 1.0, 0)).unwrap();
        assert!(freq.values().all(|&v| v == 1_000));
    }

    #[test]
    fn partial_cover_rate() {
        let seed = seed();
        let mut m = MangatRr::new(3);
        let freq = m.simulate(&seed, &RrParams::new(0.0, 0.2, 0)).unwrap();
        // Category "1" is all zeros; expected 200 reported ones.
        let reported = *freq.get("1").unwrap();
        assert!((130..=270).contains(&reported), "got {reported}");
        // 250 true ones + 0.2 * 750 covered zeros
        let mixed = *freq.get("2").unwrap();
        assert!((340..=460).contains(&mixed), "got {mixed}");
    }

    #[test]
    fn q_is_ignored() {
        let seed = seed();
        let a = MangatRr::new(7)
            .simulate(&seed, &RrParams::new(0.1, 0.4, 0))
            .unwrap();
        let b = MangatRr::new(7)
            .simulate(&seed, &RrParams::new(0.9, 0.4, 5))
            .unwrap();
        assert_eq!(a, b);
    }
}
