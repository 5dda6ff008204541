//! Condition trees, the logical expressions rules are made of.

mod condition;
pub use condition::ComponentSet;
pub use condition::Condition;
pub use condition::ConditionType;
pub use condition::SlotRef;

mod evaluation;
pub(crate) use evaluation::in_component_set;
