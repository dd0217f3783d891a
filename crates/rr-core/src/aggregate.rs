use crate::error::RrError;
use crate::population::Population;
use crate::table::FrequencyTable;

/// Sum each category's bit across every record.
///
/// The table lists every category of the population, in the population's
/// category order, including those no record reported.
pub fn aggregate(population: &Population) -> Result<FrequencyTable, RrError> {
    if population.is_empty() {
        return Err(RrError::EmptyPopulation);
    }

    let mut sums = vec![0u64; population.num_categories()];
    for record in population.records() {
        for (sum, &bit) in sums.iter_mut().zip(record.bits()) {
            *sum += u64::from(bit);
        }
    }

    Ok(population
        .categories()
        .iter()
        .cloned()
        .zip(sums)
        .collect())
}
