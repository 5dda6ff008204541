//! The domain model of scheduling problems.
//!
//! A [`Problem`] is made of typed components, groups of components, and assignments.
//! An assignment is a bundle of named [`ComponentSlot`]s, each of them accepting components of a single type.

mod assignment;
pub use assignment::Assignment;
pub use assignment::Cardinality;
pub use assignment::ComponentSlot;
pub use assignment::SlotContent;
pub use assignment::SlotDefinition;

mod component;
pub use component::Component;
pub use component::ComponentType;
pub use component::Group;

mod problem;
pub use problem::Problem;

mod registry;
pub use registry::Labeled;
pub use registry::Registry;
