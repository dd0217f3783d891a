//! Synthetic interest data and local randomized-response mechanisms.
//!
//! A Zipf-distributed popularity mapping ([`zipf`]) is expanded into a
//! ground-truth seed population ([`population::build`]). Each mechanism
//! ([`fox`], [`mangat`], [`fixed`]) perturbs that population record by record
//! and the reported bits are summed per category ([`aggregate`]).

pub mod aggregate;
pub mod error;
pub mod extremes;
pub mod fixed;
pub mod fox;
pub mod mangat;
pub mod population;
pub mod sampling;
pub mod table;
pub mod traits;
pub mod zipf;

pub use aggregate::aggregate;
pub use error::RrError;
pub use fixed::FixedRr;
pub use fox::FoxRr;
pub use mangat::MangatRr;
pub use population::{Population, Record};
pub use table::{CategoryId, CategoryTable, FrequencyTable, Popularity};
pub use traits::{Mechanism, MechanismKind, RrParams};
pub use zipf::ZipfGenerator;

#[cfg(test)]
mod tests {
    use super::*;

    /// Generated popularity → seed → every mechanism, checking the invariants
    /// that hold regardless of parameters.
    #[test]
    fn pipeline_invariants() {
        let popularity = ZipfGenerator::new(zipf::DEFAULT_EXPONENT, 22527)
            .unwrap()
            .generate(6, 500)
            .unwrap();
        let seed = population::build(1_000, &popularity);
        assert_eq!(aggregate(&seed).unwrap(), popularity);

        let params = RrParams::new(0.6, 0.3, 2);
        let mut mechanisms: Vec<Box<dyn Mechanism>> = vec![
            Box::new(FoxRr::new(1)),
            Box::new(MangatRr::new(1)),
            Box::new(FixedRr::new(1)),
        ];
        for m in mechanisms.iter_mut() {
            let freq = m.simulate(&seed, &params).unwrap();
            let keys: Vec<&str> = freq.keys().collect();
            let expected: Vec<&str> = seed.categories().iter().map(String::as_str).collect();
            assert_eq!(keys, expected, "{} changed the key set", m.name());
            assert!(freq.values().all(|&v| v <= seed.len() as u64));
        }
    }
}
