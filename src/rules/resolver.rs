use super::{Hardness, Scope};
use crate::{
    conditions::{ComponentSet, Condition},
    error::{Result, SchedError},
    model::{Labeled, Problem},
};
use log::debug;

/// Checks a rule before its registration.
///
/// The structure of the condition and the labels it refers to are checked,
/// as well as each tuple of a restricted scope.
/// Each slot the condition refers to must be held by at least one registered assignment.
pub(crate) fn check_rule(
    problem: &Problem,
    label: &str,
    condition: &Condition,
    scope: &Scope,
    hardness: Hardness,
) -> Result<()> {
    let in_rule = |e: SchedError| match e {
        SchedError::Schema(msg) => SchedError::schema(format!(r#"in rule "{}": {}"#, label, msg)),
        _ => e,
    };
    condition.validate_structure().map_err(in_rule)?;
    check_labels(problem, condition).map_err(in_rule)?;
    check_slot_names(problem, condition).map_err(in_rule)?;
    if let Scope::Restricted(tuples) = scope {
        tuples
            .iter()
            .try_for_each(|t| check_tuple(problem, condition, t))
            .map_err(in_rule)?;
    }
    debug!(
        "rule {} checked ({:?}, {})",
        label,
        hardness,
        match scope {
            Scope::Unrestricted => "unrestricted".to_string(),
            Scope::Restricted(v) => format!("{} tuple(s)", v.len()),
        }
    );
    Ok(())
}

fn check_labels(problem: &Problem, condition: &Condition) -> Result<()> {
    let mut result = Ok(());
    condition.for_each_node(&mut |node| {
        if result.is_err() {
            return;
        }
        result = match node {
            Condition::ComponentIs(_, c) => problem.components().id_of(c).map(|_| ()),
            Condition::InGroup(_, g) => problem.groups().id_of(g).map(|_| ()),
            Condition::ComponentIn(_, ComponentSet::Type(t)) => {
                problem.component_types().id_of(t).map(|_| ())
            }
            Condition::ComponentIn(_, ComponentSet::Group(g)) => {
                problem.groups().id_of(g).map(|_| ())
            }
            Condition::ComponentIn(_, ComponentSet::Components(v)) => v
                .iter()
                .try_for_each(|c| problem.components().id_of(c).map(|_| ())),
            _ => Ok(()),
        };
    });
    result
}

fn check_slot_names(problem: &Problem, condition: &Condition) -> Result<()> {
    let mut result = Ok(());
    condition.for_each_node(&mut |node| {
        for s in node.slot_refs() {
            if result.is_err() {
                return;
            }
            if !problem.assignments().iter().any(|a| a.slot(s.slot()).is_some()) {
                result = Err(SchedError::schema(format!(
                    r#"no assignment has a slot named "{}""#,
                    s.slot()
                )));
            }
        }
    });
    result
}

/// Checks that a condition can be instantiated on a tuple of assignments (given by ids).
///
/// The tuple length must be the arity of the condition, or at least its arity if the condition contains a counting predicate.
/// Each slot referenced outside counting sub-conditions must exist in the assignment at the referenced position,
/// and the predicates must compare slots and components of the same type.
pub(crate) fn check_tuple(problem: &Problem, condition: &Condition, tuple: &[usize]) -> Result<()> {
    let arity = condition.arity();
    let arity_ok = if condition.contains_aggregate() {
        tuple.len() >= arity
    } else {
        tuple.len() == arity
    };
    if !arity_ok {
        return Err(SchedError::schema(format!(
            "tuple {} has length {} but {} has arity {}",
            tuple_to_string(problem, tuple),
            tuple.len(),
            condition,
            arity
        )));
    }
    let mut result = Ok(());
    check_positional_nodes(problem, condition, tuple, &mut result);
    result
}

/// Returns `true` iff [`check_tuple`] succeeds.
pub(crate) fn is_applicable(problem: &Problem, condition: &Condition, tuple: &[usize]) -> bool {
    match check_tuple(problem, condition, tuple) {
        Ok(()) => true,
        Err(e) => {
            debug!("skipping tuple {}: {}", tuple_to_string(problem, tuple), e);
            false
        }
    }
}

fn check_positional_nodes(
    problem: &Problem,
    node: &Condition,
    tuple: &[usize],
    result: &mut Result<()>,
) {
    if result.is_err() {
        return;
    }
    let mut slot_types = Vec::new();
    for s in node.slot_refs() {
        let assignment = problem.assignments().get(tuple[s.position()]);
        match assignment.slot(s.slot()) {
            Some(slot) => slot_types.push(slot.type_id()),
            None => {
                *result = Err(SchedError::schema(format!(
                    r#"assignment "{}" has no slot "{}""#,
                    assignment.label(),
                    s.slot()
                )));
                return;
            }
        }
    }
    match node {
        Condition::ComponentIs(s, c) => {
            if let Ok(component) = problem.components().get_by_label(c) {
                if component.type_id() != slot_types[0] {
                    *result = Err(type_mismatch(problem, node, &s.to_string(), slot_types[0], component.type_id()));
                    return;
                }
            }
        }
        Condition::SameComponent(_, _) | Condition::Distinct(_) => {
            if let Some(t) = slot_types.iter().find(|t| **t != slot_types[0]) {
                *result = Err(type_mismatch(problem, node, "slots", slot_types[0], *t));
                return;
            }
        }
        _ => {}
    }
    if !node.condition_type().is_aggregate() {
        node.children()
            .into_iter()
            .for_each(|c| check_positional_nodes(problem, c, tuple, result));
    }
}

fn type_mismatch(
    problem: &Problem,
    node: &Condition,
    what: &str,
    expected: usize,
    actual: usize,
) -> SchedError {
    SchedError::schema(format!(
        r#"type mismatch in {}: {} of type "{}" and "{}""#,
        node,
        what,
        problem.component_types().get(expected).label(),
        problem.component_types().get(actual).label(),
    ))
}

pub(crate) fn tuple_to_string(problem: &Problem, tuple: &[usize]) -> String {
    format!(
        "({})",
        tuple
            .iter()
            .map(|a| problem.assignments().get(*a).label())
            .collect::<Vec<&str>>()
            .join(", ")
    )
}
