use crate::{
    conditions::Condition,
    encodings::AssertionTag,
    error::Result,
    instantiation::InstantiationEngine,
    model::{Labeled, Problem},
    rules::Rule,
};
use std::{collections::BTreeMap, fmt::Display};

/// The components bound to the slots of an assignment in a [`Model`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentBinding {
    label: String,
    fulfilled: bool,
    slots: BTreeMap<String, Vec<String>>,
}

impl AssignmentBinding {
    /// Returns the label of the assignment.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns `true` iff the assignment is fulfilled.
    ///
    /// Non-optional assignments are always fulfilled.
    /// The variable slots of unfulfilled assignments are empty.
    pub fn is_fulfilled(&self) -> bool {
        self.fulfilled
    }

    /// Returns the labels of the components bound to a slot, in registration order.
    pub fn slot(&self, name: &str) -> Option<&[String]> {
        self.slots.get(name).map(|v| v.as_slice())
    }

    /// Iterates over the slots, by name order.
    pub fn iter_slots(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.slots.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// A binding of components to the slots of every assignment, satisfying the hard assertions of a problem.
///
/// Two models are equal iff they bind the same components to the same slots and fulfill the same assignments.
#[derive(Debug, Clone)]
pub struct Model {
    assignments: Vec<AssignmentBinding>,
    component_ids: Vec<BTreeMap<String, Vec<usize>>>,
    cost: usize,
    optimal: bool,
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.assignments == other.assignments
    }
}

impl Eq for Model {}

impl Model {
    pub(crate) fn new(
        problem: &Problem,
        component_ids: Vec<BTreeMap<String, Vec<usize>>>,
        fulfilled: Vec<bool>,
        cost: usize,
        optimal: bool,
    ) -> Self {
        let assignments = problem
            .assignments()
            .iter()
            .map(|a| AssignmentBinding {
                label: a.label().to_string(),
                fulfilled: fulfilled[a.id()],
                slots: component_ids[a.id()]
                    .iter()
                    .map(|(slot, ids)| {
                        let labels = ids
                            .iter()
                            .map(|c| problem.components().get(*c).label().to_string())
                            .collect();
                        (slot.clone(), labels)
                    })
                    .collect(),
            })
            .collect();
        Self {
            assignments,
            component_ids,
            cost,
            optimal,
        }
    }

    /// Returns the bindings of the assignments, in registration order.
    pub fn assignments(&self) -> &[AssignmentBinding] {
        &self.assignments
    }

    /// Returns the binding of the assignment with the given label.
    pub fn assignment(&self, label: &str) -> Option<&AssignmentBinding> {
        self.assignments.iter().find(|a| a.label == label)
    }

    /// Returns the sum of the weights of the soft terms this model violates.
    pub fn cost(&self) -> usize {
        self.cost
    }

    /// Returns `true` iff no model of the problem has a lower cost.
    pub fn is_optimal(&self) -> bool {
        self.optimal
    }

    /// Evaluates a condition on a tuple of assignments (given by ids) under the bindings of this model.
    pub fn evaluate(&self, problem: &Problem, condition: &Condition, tuple: &[usize]) -> Result<bool> {
        let bound = |a: usize, s: &str| self.component_ids.get(a).and_then(|m| m.get(s)).cloned();
        condition.evaluate(problem, tuple, &bound)
    }

    /// Returns `true` iff the condition of the rule holds on every tuple of its scope.
    pub fn satisfies(&self, problem: &Problem, rule: &Rule) -> Result<bool> {
        for tuple in InstantiationEngine::new(problem).instantiate(rule) {
            if !self.evaluate(problem, rule.condition(), &tuple)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// A hard assertion involved in a conflict, with a human readable description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    tag: AssertionTag,
    description: String,
}

impl Conflict {
    pub(crate) fn new(problem: &Problem, tag: AssertionTag) -> Self {
        let description = match &tag {
            AssertionTag::Exclusive(c) => format!("component {} is bound at most once", c),
            AssertionTag::Rule { rule, tuple } => {
                let labels = tuple.iter().map(|s| s.as_str()).collect::<Vec<&str>>();
                match problem.rules().get_by_label(rule) {
                    Ok(r) => r.condition().describe(&labels),
                    Err(_) => String::new(),
                }
            }
        };
        Self { tag, description }
    }

    /// Returns the tag of the assertion.
    pub fn tag(&self) -> &AssertionTag {
        &self.tag
    }

    /// Returns a description of the assertion.
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.tag, self.description)
    }
}

/// The explanation of an unsatisfiable problem: a set of hard assertions which cannot hold together.
///
/// When the explanation is minimal, removing any of its assertions makes the remaining ones satisfiable.
/// It may not be minimal if the backend could not decide some of the checks made while minimizing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explanation {
    conflicts: Vec<Conflict>,
    minimal: bool,
}

impl Explanation {
    pub(crate) fn new(conflicts: Vec<Conflict>, minimal: bool) -> Self {
        Self { conflicts, minimal }
    }

    /// Returns the conflicting assertions, in compilation order.
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// Returns `true` iff the explanation is known to be minimal.
    pub fn is_minimal(&self) -> bool {
        self.minimal
    }

    /// Returns the labels of the rules involved in the conflict, without duplicates.
    pub fn rule_labels(&self) -> Vec<&str> {
        let mut labels = Vec::new();
        self.conflicts
            .iter()
            .filter_map(|c| c.tag.rule_label())
            .for_each(|l| {
                if !labels.contains(&l) {
                    labels.push(l)
                }
            });
        labels
    }

    /// Returns the number of conflicting assertions.
    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    /// Returns `true` iff there is no conflicting assertion
    /// (the problem is inconsistent whatever the hard assertions).
    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }
}
