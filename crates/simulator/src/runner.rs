use crate::output::{self, BoxError};
use rr_core::extremes::{max_by_value, min_by_value};
use rr_core::{
    FixedRr, FoxRr, FrequencyTable, MangatRr, Mechanism, MechanismKind, Population, Record,
    RrError, RrParams,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Concrete mechanism behind a [`MechanismKind`].
enum AnyMechanism {
    Fox(FoxRr),
    Mangat(MangatRr),
    Fixed(FixedRr),
}

impl AnyMechanism {
    fn build(kind: MechanismKind, rng_seed: u64, replicate_fixed_last_value: bool) -> Self {
        match kind {
            MechanismKind::Fox => AnyMechanism::Fox(FoxRr::new(rng_seed)),
            MechanismKind::Mangat => AnyMechanism::Mangat(MangatRr::new(rng_seed)),
            MechanismKind::Fixed => AnyMechanism::Fixed(
                FixedRr::new(rng_seed).replicate_last_value_bit(replicate_fixed_last_value),
            ),
        }
    }

    fn anomalies(&self) -> u64 {
        match self {
            AnyMechanism::Fixed(m) => m.anomalies(),
            _ => 0,
        }
    }
}

impl Mechanism for AnyMechanism {
    fn name(&self) -> &'static str {
        match self {
            AnyMechanism::Fox(m) => m.name(),
            AnyMechanism::Mangat(m) => m.name(),
            AnyMechanism::Fixed(m) => m.name(),
        }
    }

    fn perturb_record(&mut self, record: &Record, params: &RrParams) -> Result<Record, RrError> {
        match self {
            AnyMechanism::Fox(m) => m.perturb_record(record, params),
            AnyMechanism::Mangat(m) => m.perturb_record(record, params),
            AnyMechanism::Fixed(m) => m.perturb_record(record, params),
        }
    }
}

/// Everything one simulation run needs.
#[derive(Clone)]
pub struct RunPlan {
    pub seed: Arc<Population>,
    pub params: RrParams,
    pub run: u64,
    pub base_seed: u64,
    pub results_dir: PathBuf,
    pub mechanisms: Vec<MechanismKind>,
    pub replicate_fixed_last_value: bool,
}

impl RunPlan {
    /// RNG seed shared by every mechanism of this run.
    pub fn rng_seed(&self) -> u64 {
        self.base_seed.wrapping_add(self.run)
    }
}

/// Result of one mechanism's run.
#[derive(Debug)]
pub struct RunOutcome {
    pub mechanism: MechanismKind,
    pub path: PathBuf,
    pub frequencies: FrequencyTable,
}

/// Simulate one mechanism and persist its frequency table.
fn run_one(plan: &RunPlan, kind: MechanismKind) -> Result<RunOutcome, BoxError> {
    let mut mechanism = AnyMechanism::build(kind, plan.rng_seed(), plan.replicate_fixed_last_value);
    let frequencies = mechanism.simulate(&plan.seed, &plan.params)?;

    if mechanism.anomalies() > 0 {
        tracing::warn!(
            mechanism = mechanism.name(),
            run = plan.run,
            anomalies = mechanism.anomalies(),
            "selected categories randomized with a true bit of 1 (last-value mode)"
        );
    }

    let path = output::frequency_path(&plan.results_dir, kind, plan.run, &plan.params);
    output::write_frequencies(&path, &frequencies)?;

    let most = max_by_value(frequencies.iter());
    let least = min_by_value(frequencies.iter());
    tracing::info!(
        mechanism = mechanism.name(),
        run = plan.run,
        reported = frequencies.values().sum::<u64>(),
        most = ?most,
        least = ?least,
        path = %path.display(),
        "frequencies written"
    );

    Ok(RunOutcome {
        mechanism: kind,
        path,
        frequencies,
    })
}

/// Run every configured mechanism on its own blocking task.
///
/// Each task builds its own mechanism (and therefore its own RNG) from the
/// run seed; the population is shared read-only. The first failing task
/// fails the run. Outcomes are returned in the plan's mechanism order.
pub async fn run_all(plan: RunPlan) -> Result<Vec<RunOutcome>, BoxError> {
    let plan = Arc::new(plan);
    let mut tasks = JoinSet::new();

    for (slot, &kind) in plan.mechanisms.iter().enumerate() {
        let plan = Arc::clone(&plan);
        tasks.spawn_blocking(move || (slot, run_one(&plan, kind)));
    }

    let mut outcomes: Vec<Option<RunOutcome>> = plan.mechanisms.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        let (slot, result) = joined.map_err(|e| format!("simulation task failed: {e}"))?;
        match result {
            Ok(outcome) => outcomes[slot] = Some(outcome),
            Err(e) => {
                tasks.abort_all();
                return Err(e);
            }
        }
    }

    Ok(outcomes.into_iter().flatten().collect())
}
