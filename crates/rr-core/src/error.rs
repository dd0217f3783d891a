use std::fmt;

/// Errors raised by seed generation, sampling and the RR mechanisms.
///
/// Every variant is fatal to the run that produced it; nothing in this crate
/// retries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RrError {
    /// Generation or mechanism parameters cannot be satisfied.
    Configuration { reason: String },
    /// A constrained sample asked for more elements than exist.
    SampleRange { requested: usize, available: usize },
    /// Aggregation was asked to sum over a population with no records.
    EmptyPopulation,
    /// A loaded or assembled seed does not have the expected shape.
    InvalidSeed { reason: String },
}

impl RrError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    pub fn invalid_seed(reason: impl Into<String>) -> Self {
        Self::InvalidSeed {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { reason } => write!(f, "invalid configuration: {reason}"),
            Self::SampleRange {
                requested,
                available,
            } => write!(
                f,
                "requested sample size exceeds population size (requested={requested}, available={available})"
            ),
            Self::EmptyPopulation => write!(f, "cannot aggregate an empty population"),
            Self::InvalidSeed { reason } => write!(f, "invalid seed: {reason}"),
        }
    }
}

impl std::error::Error for RrError {}
