use crate::error::RrError;
use crate::population::Record;
use crate::sampling::sample;
use crate::traits::{cover, Mechanism, RrParams};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Fixed randomized response.
///
/// Only a bounded number of categories per user are randomized: out of the
/// record's zero-valued categories, `min(tau, zeros)` are sampled without
/// replacement and each is reported as 1 with probability `r`. True ones and
/// unselected zeros pass through unchanged. `q` is ignored.
///
/// With [`FixedRr::replicate_last_value_bit`] enabled, every selected
/// category is randomized with the bit of the record's *last* category
/// instead of its own. When that bit is 1 the selected categories report 1
/// unconditionally. This reproduces the recorded output of earlier
/// experiment runs and is off by default.
pub struct FixedRr {
    rng: StdRng,
    last_value_bit: bool,
    anomalies: u64,
}

impl FixedRr {
    pub fn new(rng_seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(rng_seed),
            last_value_bit: false,
            anomalies: 0,
        }
    }

    pub fn replicate_last_value_bit(mut self, enabled: bool) -> Self {
        self.last_value_bit = enabled;
        self
    }

    /// Number of selected categories randomized with a true bit of 1.
    /// Only non-zero in last-value mode.
    pub fn anomalies(&self) -> u64 {
        self.anomalies
    }

    fn respond(&mut self, bit: u8, r: f64) -> u8 {
        if bit == 1 {
            self.anomalies += 1;
            1
        } else {
            cover(&mut self.rng, r)
        }
    }
}

impl Mechanism for FixedRr {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn perturb_record(&mut self, record: &Record, params: &RrParams) -> Result<Record, RrError> {
        let mut out = record.bits().to_vec();
        let zeros = record.zero_positions();
        if zeros.is_empty() {
            return Ok(Record::from_bits_unchecked(out));
        }

        let k = params.tau.min(zeros.len());
        let selected: Vec<usize> = sample(&zeros, k, &mut self.rng)?
            .into_iter()
            .copied()
            .collect();

        let last_bit = record.bits().last().copied().unwrap_or(0);
        for pos in selected {
            let bit = if self.last_value_bit {
                last_bit
            } else {
                record.bits()[pos]
            };
            out[pos] = self.respond(bit, params.r);
        }
        Ok(Record::from_bits_unchecked(out))
    }
}
