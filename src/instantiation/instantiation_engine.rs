use super::{AcceptAll, ViabilityPredicate};
use crate::{
    model::{Labeled, Problem},
    rules::{self, Rule, Scope},
};
use log::debug;
use permutator::CartesianProduct;

/// Expands the scope of rules into the tuples of assignments their conditions are instantiated on.
///
/// Restricted scopes are returned as is.
/// For unrestricted scopes:
/// - a condition containing a counting predicate is instantiated once, on the tuple of all the assignments in registration order;
/// - other conditions are instantiated on each tuple of distinct assignments which length is the arity of the condition,
///   in lexicographic order of assignment ids. Tuples which assignments lack a referenced slot are skipped,
///   as well as tuples rejected by the viability predicate.
///
/// The result only depends on the problem, the rule and the predicate.
pub struct InstantiationEngine<'a> {
    problem: &'a Problem,
    viability: Box<dyn ViabilityPredicate + 'a>,
}

impl<'a> InstantiationEngine<'a> {
    /// Builds an engine accepting every applicable tuple.
    pub fn new(problem: &'a Problem) -> Self {
        Self::new_with_viability_predicate(problem, Box::new(AcceptAll))
    }

    /// Builds an engine filtering the tuples of unrestricted, non-counting rules with a predicate.
    pub fn new_with_viability_predicate(
        problem: &'a Problem,
        viability: Box<dyn ViabilityPredicate + 'a>,
    ) -> Self {
        Self { problem, viability }
    }

    /// Returns the tuples (of assignment ids) the condition of the rule must be instantiated on.
    pub fn instantiate(&self, rule: &Rule) -> Vec<Vec<usize>> {
        let tuples = match rule.scope() {
            Scope::Restricted(tuples) => tuples.clone(),
            Scope::Unrestricted => {
                if rule.condition().contains_aggregate() {
                    self.instantiate_aggregate(rule)
                } else {
                    self.instantiate_combinations(rule)
                }
            }
        };
        debug!(
            "rule {} instantiated on {} tuple(s)",
            rule.label(),
            tuples.len()
        );
        tuples
    }

    fn instantiate_aggregate(&self, rule: &Rule) -> Vec<Vec<usize>> {
        let all = (0..self.problem.assignments().len()).collect::<Vec<usize>>();
        if rules::is_applicable(self.problem, rule.condition(), &all) {
            vec![all]
        } else {
            vec![]
        }
    }

    fn instantiate_combinations(&self, rule: &Rule) -> Vec<Vec<usize>> {
        let condition = rule.condition();
        let arity = condition.arity();
        let n_assignments = self.problem.assignments().len();
        if arity == 0 {
            return vec![vec![]];
        }
        if n_assignments < arity {
            return vec![];
        }
        let ids = (0..n_assignments).collect::<Vec<usize>>();
        let domains = vec![ids.as_slice(); arity];
        let mut tuples = Vec::new();
        domains.cart_prod().for_each(|p| {
            let tuple = p.into_iter().copied().collect::<Vec<usize>>();
            if !all_distinct(&tuple) {
                return;
            }
            if !rules::is_applicable(self.problem, condition, &tuple) {
                return;
            }
            if self.viability.is_viable(condition, &tuple) {
                tuples.push(tuple);
            }
        });
        tuples.sort_unstable();
        tuples
    }
}

fn all_distinct(tuple: &[usize]) -> bool {
    (0..tuple.len()).all(|i| !tuple[i + 1..].contains(&tuple[i]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        conditions::{Condition, SlotRef},
        instantiation::SymmetryBreaking,
        model::{Cardinality, SlotDefinition},
        rules::Hardness,
    };

    fn problem() -> Problem {
        let mut problem = Problem::default();
        problem.new_component_type("Room").unwrap();
        problem.new_component("R1", "Room").unwrap();
        problem.new_component_type("Employee").unwrap();
        problem.new_component("E1", "Employee").unwrap();
        for a in ["M1", "M2", "M3"] {
            problem.new_assignment(a).unwrap();
            problem
                .add_slot(a, "room", SlotDefinition::variable("Room", Cardinality::Exactly(1)))
                .unwrap();
        }
        problem.new_assignment("Lunch").unwrap();
        problem
            .add_slot("Lunch", "host", SlotDefinition::variable("Employee", Cardinality::Exactly(1)))
            .unwrap();
        problem
    }

    fn distinct_rooms() -> std::sync::Arc<Condition> {
        Condition::distinct(vec![SlotRef::new(0, "room"), SlotRef::new(1, "room")])
    }

    #[test]
    fn test_unrestricted_pairs() {
        let mut problem = problem();
        problem.new_rule("r", distinct_rooms(), Hardness::Hard).unwrap();
        let engine = InstantiationEngine::new(&problem);
        assert_eq!(
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![1, 0],
                vec![1, 2],
                vec![2, 0],
                vec![2, 1]
            ],
            engine.instantiate(problem.rules().get(0))
        );
    }

    #[test]
    fn test_unrestricted_pairs_with_symmetry_breaking() {
        let mut problem = problem();
        problem.new_rule("r", distinct_rooms(), Hardness::Hard).unwrap();
        let engine = InstantiationEngine::new_with_viability_predicate(
            &problem,
            Box::new(SymmetryBreaking::default()),
        );
        assert_eq!(
            vec![vec![0, 1], vec![0, 2], vec![1, 2]],
            engine.instantiate(problem.rules().get(0))
        );
    }

    #[test]
    fn test_restricted() {
        let mut problem = problem();
        problem
            .new_restricted_rule("r", distinct_rooms(), Hardness::Hard, &[&["M3", "M1"]])
            .unwrap();
        let engine = InstantiationEngine::new(&problem);
        assert_eq!(vec![vec![2, 0]], engine.instantiate(problem.rules().get(0)));
    }

    #[test]
    fn test_unary_skips_heterogeneous_assignments() {
        let mut problem = problem();
        problem
            .new_rule(
                "r",
                Condition::component_is(SlotRef::new(0, "host"), "E1"),
                Hardness::Hard,
            )
            .unwrap();
        let engine = InstantiationEngine::new(&problem);
        assert_eq!(vec![vec![3]], engine.instantiate(problem.rules().get(0)));
    }

    #[test]
    fn test_aggregate() {
        let mut problem = problem();
        problem
            .new_rule(
                "r",
                Condition::max_assignments(Condition::component_is(SlotRef::new(0, "room"), "R1"), 1),
                Hardness::Hard,
            )
            .unwrap();
        let engine = InstantiationEngine::new(&problem);
        assert_eq!(vec![vec![0, 1, 2, 3]], engine.instantiate(problem.rules().get(0)));
    }

    #[test]
    fn test_arity_too_high() {
        let mut problem = Problem::default();
        problem.new_component_type("Room").unwrap();
        problem.new_assignment("M1").unwrap();
        problem
            .add_slot("M1", "room", SlotDefinition::variable("Room", Cardinality::Any))
            .unwrap();
        problem.new_rule("r", distinct_rooms(), Hardness::Hard).unwrap();
        let engine = InstantiationEngine::new(&problem);
        assert!(engine.instantiate(problem.rules().get(0)).is_empty());
    }
}
