//! The compilation of scheduling problems into SAT clauses.

mod cnf_encoder;
pub use cnf_encoder::CnfEncoder;

mod compiler;
pub use compiler::CompiledProblem;
pub use compiler::ConstraintCompiler;

mod formula;
pub use formula::Formula;

mod tags;
pub use tags::AssertionTag;
