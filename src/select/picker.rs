//! Non-repeating index picker
//!
//! Pure exclusion logic over `0..n`: indices already in the usage record are
//! skipped until every index has been used once. At that point the record is
//! cleared except for the most recent index, which stays excluded for one more
//! pick so a cycle boundary never produces an immediate repeat.

use rand::Rng;
use rand::seq::IndexedRandom;

/// Outcome of a single pick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pick {
    pub index: usize,
    /// Usage record to persist for the next call
    pub used: Vec<usize>,
    /// True when this pick started a new cycle
    pub wrapped: bool,
}

/// Pick the next index for a list of `n` candidates given prior usage.
///
/// `used` must only hold indices below `n`; the selector discards records that
/// don't. Returns `None` only when `n == 0`.
pub fn pick<R>(n: usize, mut used: Vec<usize>, rng: &mut R) -> Option<Pick>
where
    R: Rng + ?Sized,
{
    if n == 0 {
        return None;
    }

    let wrapped = used.len() >= n;
    let excluded: Vec<usize> = if wrapped {
        let last = used.last().copied();
        used.clear();
        last.into_iter().collect()
    } else {
        used.clone()
    };

    let possible: Vec<usize> = (0..n).filter(|i| !excluded.contains(i)).collect();

    // n == 1 with a non-empty record leaves nothing; fall back to the only index
    let index = possible.choose(rng).copied().unwrap_or(0);
    used.push(index);

    Some(Pick { index, used, wrapped })
}
