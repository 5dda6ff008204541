use crate::{conditions::Condition, model::Labeled};
use std::{fmt::Display, sync::Arc};

/// Whether a rule must hold or only contributes to the cost of models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hardness {
    /// The rule must hold on every tuple of its scope.
    Hard,
    /// Each tuple of the scope on which the rule does not hold costs the given weight.
    Soft(usize),
}

/// The tuples of assignments a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Every applicable tuple of distinct assignments.
    Unrestricted,
    /// The given tuples (assignment ids).
    Restricted(Vec<Vec<usize>>),
}

/// A rule: a shared condition, a scope and a hardness.
#[derive(Debug, Clone)]
pub struct Rule {
    id: usize,
    label: String,
    condition: Arc<Condition>,
    scope: Scope,
    hardness: Hardness,
}

impl Rule {
    pub(crate) fn new(
        id: usize,
        label: &str,
        condition: Arc<Condition>,
        scope: Scope,
        hardness: Hardness,
    ) -> Self {
        Self {
            id,
            label: label.to_string(),
            condition,
            scope,
            hardness,
        }
    }

    /// Returns the condition of the rule.
    pub fn condition(&self) -> &Arc<Condition> {
        &self.condition
    }

    /// Returns the scope of the rule.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Returns the hardness of the rule.
    pub fn hardness(&self) -> Hardness {
        self.hardness
    }

    /// Returns `true` iff the rule is hard.
    pub fn is_hard(&self) -> bool {
        self.hardness == Hardness::Hard
    }
}

impl Labeled for Rule {
    fn label(&self) -> &str {
        &self.label
    }

    fn id(&self) -> usize {
        self.id
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.hardness {
            Hardness::Hard => write!(f, "{} hard {}", self.label, self.condition),
            Hardness::Soft(w) => write!(f, "{} soft {} {}", self.label, w, self.condition),
        }
    }
}
