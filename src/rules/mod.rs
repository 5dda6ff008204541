//! Rules, made of a condition, a scope and a hardness, and their validation against a problem.

mod resolver;
pub(crate) use resolver::check_rule;
pub(crate) use resolver::check_tuple;
pub(crate) use resolver::is_applicable;
pub(crate) use resolver::tuple_to_string;

mod rule;
pub use rule::Hardness;
pub use rule::Rule;
pub use rule::Scope;
