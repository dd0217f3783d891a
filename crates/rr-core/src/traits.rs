use crate::aggregate::aggregate;
use crate::error::RrError;
use crate::population::{Population, Record};
use crate::table::FrequencyTable;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mechanism parameters. All three mechanisms accept the full set; each
/// reads only the fields it needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RrParams {
    /// Truth-telling probability (Fox).
    pub q: f64,
    /// Probability of reporting 1 when randomizing.
    pub r: f64,
    /// Maximum zero-valued categories randomized per record (Fixed).
    pub tau: usize,
}

impl RrParams {
    pub fn new(q: f64, r: f64, tau: usize) -> Self {
        Self { q, r, tau }
    }

    /// Both probabilities must be finite and within `[0, 1]`.
    pub fn validate(&self) -> Result<(), RrError> {
        for (name, p) in [("q", self.q), ("r", self.r)] {
            if !(0.0..=1.0).contains(&p) {
                return Err(RrError::configuration(format!(
                    "{name} must be a probability in [0, 1], got {p}"
                )));
            }
        }
        Ok(())
    }
}

/// Common interface for the randomized-response mechanisms.
///
/// Implementations: Fox, Mangat, Fixed.
/// Each instance owns its random source, so a run is a pure function of
/// (seed, parameters, rng seed). Methods take `&mut self` because every
/// draw advances that source.
pub trait Mechanism: Send {
    /// Short lowercase name, also used as the results directory.
    fn name(&self) -> &'static str;

    /// Produce the reported bits for one user.
    fn perturb_record(&mut self, record: &Record, params: &RrParams) -> Result<Record, RrError>;

    /// Perturb every record of `seed`, in order.
    fn perturb(&mut self, seed: &Population, params: &RrParams) -> Result<Population, RrError> {
        let records = seed
            .records()
            .iter()
            .map(|record| self.perturb_record(record, params))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(seed.with_records(records))
    }

    /// Validate parameters, perturb the whole population and aggregate the
    /// reported bits per category.
    fn simulate(&mut self, seed: &Population, params: &RrParams) -> Result<FrequencyTable, RrError> {
        params.validate()?;
        let perturbed = self.perturb(seed, params)?;
        aggregate(&perturbed)
    }
}

/// Report 1 with probability `r`, else 0.
#[inline]
pub(crate) fn cover<R: Rng + ?Sized>(rng: &mut R, r: f64) -> u8 {
    if rng.gen::<f64>() <= r {
        1
    } else {
        0
    }
}

/// The available mechanisms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MechanismKind {
    Fox,
    Mangat,
    Fixed,
}

impl MechanismKind {
    pub const ALL: [MechanismKind; 3] = [Self::Fox, Self::Mangat, Self::Fixed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fox => "fox",
            Self::Mangat => "mangat",
            Self::Fixed => "fixed",
        }
    }
}

impl fmt::Display for MechanismKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MechanismKind {
    type Err = RrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fox" => Ok(Self::Fox),
            "mangat" => Ok(Self::Mangat),
            "fixed" => Ok(Self::Fixed),
            other => Err(RrError::configuration(format!(
                "unknown mechanism: {other}, use 'fox', 'mangat' or 'fixed'"
            ))),
        }
    }
}
