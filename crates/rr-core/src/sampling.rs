use crate::error::RrError;
use rand::Rng;

/// Select `k` distinct elements of `population` uniformly at random.
///
/// Indices are drawn as `floor(u * n)` and redrawn while already taken, so
/// the result is in selection order and no index appears twice.
pub fn sample<'a, T, R>(population: &'a [T], k: usize, rng: &mut R) -> Result<Vec<&'a T>, RrError>
where
    R: Rng + ?Sized,
{
    let n = population.len();
    if k > n {
        return Err(RrError::SampleRange {
            requested: k,
            available: n,
        });
    }

    let mut taken = vec![false; n];
    let mut selected = Vec::with_capacity(k);
    for _ in 0..k {
        let mut index = draw_index(rng, n);
        while taken[index] {
            index = draw_index(rng, n);
        }
        taken[index] = true;
        selected.push(&population[index]);
    }
    Ok(selected)
}

#[inline]
fn draw_index<R: Rng + ?Sized>(rng: &mut R, n: usize) -> usize {
    let u: f64 = rng.gen();
    // u < 1.0, but the product can round up to n for very large n
    ((u * n as f64) as usize).min(n - 1)
}
