use super::{ComponentSet, Condition, SlotRef};
use crate::{
    error::{Result, SchedError},
    model::{Labeled, Problem},
};

/// Returns `true` iff the component with the given id belongs to the set.
pub(crate) fn in_component_set(
    problem: &Problem,
    set: &ComponentSet,
    component_id: usize,
) -> Result<bool> {
    let component = problem.components().get(component_id);
    match set {
        ComponentSet::Type(t) => Ok(component.type_id() == problem.component_types().id_of(t)?),
        ComponentSet::Group(g) => Ok(component.in_group(problem.groups().id_of(g)?)),
        ComponentSet::Components(v) => {
            for label in v {
                if problem.components().id_of(label)? == component_id {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}

impl Condition {
    /// Evaluates this condition on a tuple of assignments given their bindings.
    ///
    /// The `bound` function returns the ids of the components bound to a slot of an assignment,
    /// or `None` if the assignment has no such slot.
    /// Assignments lacking a slot referenced by a counting sub-condition do not satisfy it;
    /// a missing slot anywhere else is a schema error.
    ///
    /// This evaluation gives the meaning of conditions; compiled constraints are equivalent to it.
    pub fn evaluate<F>(&self, problem: &Problem, tuple: &[usize], bound: &F) -> Result<bool>
    where
        F: Fn(usize, &str) -> Option<Vec<usize>>,
    {
        let slot_content = |s: &SlotRef| -> Result<Vec<usize>> {
            let assignment = *tuple.get(s.position()).ok_or_else(|| {
                SchedError::schema(format!(
                    "position {} is out of a tuple of length {}",
                    s.position(),
                    tuple.len()
                ))
            })?;
            bound(assignment, s.slot()).ok_or_else(|| {
                SchedError::schema(format!(
                    r#"assignment "{}" has no slot "{}""#,
                    problem.assignments().get(assignment).label(),
                    s.slot()
                ))
            })
        };
        match self {
            Condition::Not(c) => Ok(!c.evaluate(problem, tuple, bound)?),
            Condition::And(v) => {
                for c in v {
                    if !c.evaluate(problem, tuple, bound)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Condition::Or(v) => {
                for c in v {
                    if c.evaluate(problem, tuple, bound)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Condition::Xor(c1, c2) => {
                Ok(c1.evaluate(problem, tuple, bound)? != c2.evaluate(problem, tuple, bound)?)
            }
            Condition::Implies(c1, c2) => {
                Ok(!c1.evaluate(problem, tuple, bound)? || c2.evaluate(problem, tuple, bound)?)
            }
            Condition::Iff(c1, c2) => {
                Ok(c1.evaluate(problem, tuple, bound)? == c2.evaluate(problem, tuple, bound)?)
            }
            Condition::ComponentIs(s, c) => {
                let component_id = problem.components().id_of(c)?;
                Ok(slot_content(s)?.contains(&component_id))
            }
            Condition::ComponentIn(s, set) => {
                let content = slot_content(s)?;
                if content.is_empty() {
                    return Ok(false);
                }
                for c in content {
                    if !in_component_set(problem, set, c)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Condition::SameComponent(s1, s2) => {
                let mut content_1 = slot_content(s1)?;
                let mut content_2 = slot_content(s2)?;
                content_1.sort_unstable();
                content_2.sort_unstable();
                Ok(content_1 == content_2)
            }
            Condition::Distinct(v) => {
                let mut all = Vec::new();
                for s in v {
                    all.append(&mut slot_content(s)?);
                }
                let n = all.len();
                all.sort_unstable();
                all.dedup();
                Ok(all.len() == n)
            }
            Condition::InGroup(s, g) => {
                let group_id = problem.groups().id_of(g)?;
                Ok(slot_content(s)?
                    .iter()
                    .any(|c| problem.components().get(*c).in_group(group_id)))
            }
            Condition::MaxAssignments(sub, k) => {
                Ok(sub.satisfaction_vector(problem, tuple, bound)?.iter().filter(|b| **b).count() <= *k)
            }
            Condition::MinAssignments(sub, k) => {
                Ok(sub.satisfaction_vector(problem, tuple, bound)?.iter().filter(|b| **b).count() >= *k)
            }
            Condition::MaxInSequence(sub, k) => {
                let mut run = 0;
                for satisfied in sub.satisfaction_vector(problem, tuple, bound)? {
                    run = if satisfied { run + 1 } else { 0 };
                    if run > *k {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    fn satisfaction_vector<F>(&self, problem: &Problem, tuple: &[usize], bound: &F) -> Result<Vec<bool>>
    where
        F: Fn(usize, &str) -> Option<Vec<usize>>,
    {
        let refs = self.positional_slot_refs();
        tuple
            .iter()
            .map(|a| {
                if refs.iter().any(|s| bound(*a, s.slot()).is_none()) {
                    Ok(false)
                } else {
                    self.evaluate(problem, &[*a], bound)
                }
            })
            .collect()
    }
}
