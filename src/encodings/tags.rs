use std::fmt::Display;

/// The identifier of a hard assertion, used to report the assertions involved in a conflict.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssertionTag {
    /// A component of an exclusive type is bound at most once.
    Exclusive(String),
    /// A hard rule instantiated on a tuple of assignments.
    Rule {
        /// The label of the rule.
        rule: String,
        /// The labels of the assignments of the tuple.
        tuple: Vec<String>,
    },
}

impl AssertionTag {
    /// Returns the label of the rule if this tag is a rule instantiation.
    pub fn rule_label(&self) -> Option<&str> {
        match self {
            AssertionTag::Rule { rule, .. } => Some(rule),
            _ => None,
        }
    }
}

impl Display for AssertionTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssertionTag::Exclusive(c) => write!(f, "exclusive {}", c),
            AssertionTag::Rule { rule, tuple } => write!(f, "rule {} ({})", rule, tuple.join(", ")),
        }
    }
}
