use super::CancellationFlag;
use crate::{
    encodings::CnfEncoder,
    error::{Result, SchedError},
    sat::{Literal, SolvingResult},
};
use log::{debug, warn};

/// A minimal unsatisfiable subset of selectors, given by their indices.
pub(crate) struct UnsatSubset {
    pub(crate) indices: Vec<usize>,
    pub(crate) minimal: bool,
}

/// Computes a minimal subset of selectors which cannot be assumed together (deletion-based extraction).
///
/// The full set of selectors must be unsatisfiable together with the `base` assumptions.
/// Each selector is tentatively removed; it is dropped for good if the remaining ones are still unsatisfiable.
/// When the backend cannot decide a check, the selector is kept and the result is flagged as non-minimal.
pub(crate) fn minimal_unsat_subset(
    encoder: &mut CnfEncoder,
    selectors: &[Literal],
    base: &[Literal],
    cancellation: &CancellationFlag,
) -> Result<UnsatSubset> {
    let mut kept = vec![true; selectors.len()];
    let mut minimal = true;
    for i in 0..selectors.len() {
        if cancellation.is_cancelled() {
            return Err(SchedError::Cancelled);
        }
        kept[i] = false;
        let mut assumptions = base.to_vec();
        assumptions.extend(
            selectors
                .iter()
                .zip(kept.iter())
                .filter(|(_, k)| **k)
                .map(|(s, _)| *s),
        );
        match encoder.solve_under_assumptions(&assumptions)? {
            SolvingResult::Unsatisfiable => {}
            SolvingResult::Satisfiable(_) => kept[i] = true,
            SolvingResult::Unknown => {
                kept[i] = true;
                minimal = false;
            }
        }
    }
    if !minimal {
        warn!("the explanation may not be minimal since some checks could not be decided");
    }
    let indices = (0..selectors.len()).filter(|i| kept[*i]).collect::<Vec<usize>>();
    debug!(
        "unsatisfiable subset of {} selectors among {}",
        indices.len(),
        selectors.len()
    );
    Ok(UnsatSubset { indices, minimal })
}
