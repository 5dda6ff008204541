use super::CancellationFlag;
use crate::{
    encodings::CompiledProblem,
    error::{Result, SchedError},
    sat::{Literal, SolvingResult, Valuation},
};
use log::{debug, info};

/// The result of a cost minimization.
pub(crate) struct Optimum {
    pub(crate) valuation: Valuation,
    pub(crate) cost: usize,
    pub(crate) optimal: bool,
}

/// Returns a literal which, when assumed, bounds the cost of the models by `bound`.
pub(crate) fn cost_bound(compiled: &mut CompiledProblem, bound: usize) -> Literal {
    let violations = compiled
        .soft_terms()
        .iter()
        .map(|(w, l)| (*w, l.negate()))
        .collect::<Vec<(usize, Literal)>>();
    compiled.encoder_mut().weighted_at_most(&violations, bound)
}

/// Decreases the cost of a model as much as possible (linear SAT-UNSAT search).
///
/// Each step looks for a model which cost is strictly lower than the best one;
/// the search stops when no such model exists, or when the backend cannot decide.
pub(crate) fn minimize_cost(
    compiled: &mut CompiledProblem,
    assumptions: &[Literal],
    first: Valuation,
    cancellation: &CancellationFlag,
) -> Result<Optimum> {
    let mut best = first;
    let mut cost = compiled.cost(&best);
    info!("initial cost is {}", cost);
    loop {
        if cost == 0 {
            return Ok(Optimum {
                valuation: best,
                cost,
                optimal: true,
            });
        }
        if cancellation.is_cancelled() {
            return Err(SchedError::Cancelled);
        }
        let bound = cost_bound(compiled, cost - 1);
        let mut step_assumptions = assumptions.to_vec();
        step_assumptions.push(bound);
        match compiled
            .encoder_mut()
            .solve_under_assumptions(&step_assumptions)?
        {
            SolvingResult::Satisfiable(v) => {
                cost = compiled.cost(&v);
                best = v;
                debug!("found a model with cost {}", cost);
            }
            SolvingResult::Unsatisfiable => {
                info!("optimal cost is {}", cost);
                return Ok(Optimum {
                    valuation: best,
                    cost,
                    optimal: true,
                });
            }
            SolvingResult::Unknown => {
                info!("the backend could not decide whether a lower cost than {} exists", cost);
                return Ok(Optimum {
                    valuation: best,
                    cost,
                    optimal: false,
                });
            }
        }
    }
}
