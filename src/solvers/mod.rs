//! Solving, enumerating and explaining scheduling problems.

mod cancellation;
pub use cancellation::CancellationFlag;

mod model;
pub use model::AssignmentBinding;
pub use model::Conflict;
pub use model::Explanation;
pub use model::Model;

mod mus;

mod optimizer;

mod schedule_solver;
pub use schedule_solver::Enumeration;
pub use schedule_solver::EnumerationTermination;
pub use schedule_solver::ScheduleSolver;
pub use schedule_solver::SolveOutcome;
pub use schedule_solver::SolverOptions;
pub use schedule_solver::SolverStatus;
