//! The expansion of rule scopes into tuples of assignments.

mod instantiation_engine;
pub use instantiation_engine::InstantiationEngine;

mod viability;
pub use viability::AcceptAll;
pub use viability::SymmetryBreaking;
pub use viability::ViabilityPredicate;
