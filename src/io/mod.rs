//! Objects used to read problem descriptions and to write the results of the solvers.

mod condition_parser;
pub use condition_parser::parse_condition;

mod problem_reader;
pub use problem_reader::ProblemReader;
pub use problem_reader::WarningHandler;

mod schedule_writer;
pub use schedule_writer::ScheduleWriter;
