use rand::Rng;
use rand::seq::index;

use crate::error::PlanError;

/// Picks `n` distinct elements of `items`, in random order.
pub fn pick_random<'a, T, R>(rng: &mut R, items: &'a [T], n: usize) -> Result<Vec<&'a T>, PlanError>
where
    R: Rng + ?Sized,
{
    if n > items.len() {
        return Err(PlanError::NotEnoughCandidates {
            requested: n,
            available: items.len(),
        });
    }
    Ok(index::sample(rng, items.len(), n).into_iter().map(|i| &items[i]).collect())
}
