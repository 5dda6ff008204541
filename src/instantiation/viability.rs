use crate::conditions::Condition;
use log::debug;
use permutator::CartesianProduct;
use std::{cell::RefCell, collections::HashMap};

/// A predicate deciding whether a tuple of an unrestricted rule must be instantiated.
///
/// Rejecting a tuple must not change the set of models: predicates may only discard tuples
/// for which the condition is equivalent to the one of a kept tuple.
pub trait ViabilityPredicate {
    /// Returns `true` iff the condition must be instantiated on the tuple of assignments (given by ids).
    fn is_viable(&self, condition: &Condition, tuple: &[usize]) -> bool;
}

/// The default predicate, keeping every tuple.
#[derive(Default)]
pub struct AcceptAll;

impl ViabilityPredicate for AcceptAll {
    fn is_viable(&self, _condition: &Condition, _tuple: &[usize]) -> bool {
        true
    }
}

const MAX_SYMMETRY_ARITY: usize = 6;

/// A predicate keeping a single representative among the tuples a condition treats the same way.
///
/// The symmetries of a condition are the permutations of its tuple positions that leave
/// its [canonical form](Condition::canonical) unchanged.
/// A tuple is kept iff it is lexicographically minimal among its images by these symmetries.
/// As an example, `(distinct 0.room 1.room)` is only instantiated on `(M1, M2)`, not on `(M2, M1)`.
///
/// Soft rules instantiated with this predicate count each violated class of symmetric tuples once.
///
/// Conditions which arity is above 6 are not searched for symmetries.
#[derive(Default)]
pub struct SymmetryBreaking {
    symmetries: RefCell<HashMap<String, Vec<Vec<usize>>>>,
}

impl SymmetryBreaking {
    fn compute_symmetries(condition: &Condition) -> Vec<Vec<usize>> {
        let arity = condition.arity();
        if arity < 2 || arity > MAX_SYMMETRY_ARITY {
            return vec![];
        }
        let canonical = condition.canonical();
        let positions = (0..arity).collect::<Vec<usize>>();
        let domains = vec![positions.as_slice(); arity];
        let mut symmetries = vec![];
        domains.cart_prod().for_each(|p| {
            let mapping = p.into_iter().copied().collect::<Vec<usize>>();
            if !is_permutation(&mapping) || mapping == positions {
                return;
            }
            if condition.remap_positions(&mapping).canonical() == canonical {
                symmetries.push(mapping);
            }
        });
        debug!("{} symmetries found for {}", symmetries.len(), condition);
        symmetries
    }
}

fn is_permutation(mapping: &[usize]) -> bool {
    (0..mapping.len()).all(|i| !mapping[i + 1..].contains(&mapping[i]))
}

impl ViabilityPredicate for SymmetryBreaking {
    fn is_viable(&self, condition: &Condition, tuple: &[usize]) -> bool {
        let key = condition.canonical();
        let mut cache = self.symmetries.borrow_mut();
        let symmetries = cache
            .entry(key)
            .or_insert_with(|| Self::compute_symmetries(condition));
        symmetries.iter().all(|mapping| {
            let image = mapping.iter().map(|p| tuple[*p]).collect::<Vec<usize>>();
            tuple <= image.as_slice()
        })
    }
}
