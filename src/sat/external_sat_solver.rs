use super::{
    buffered_sat_solver::{BufferedSatSolver, DimacsInstanceRead},
    Literal, SatSolver, SatSolverFactory, SolvingListener, SolvingResult,
};
use crate::error::{Result, SchedError};
use std::{
    io::{Cursor, Read, Write},
    process::{Command, Stdio},
    time::Duration,
};

/// A SAT solver which execution is made by a system command.
///
/// The system command is composed by an executable program, and a potential list of CLI arguments.
///
/// The SAT solver must read from the standard input (if it does not by default, this may be possible with the right CLI arguments).
/// The input and output formats must follow the ones from the SAT competitions.
/// A failure to execute the program is reported as a backend failure.
pub struct ExternalSatSolver {
    buffered_sat_solver: BufferedSatSolver,
}

impl ExternalSatSolver {
    /// Builds a new external SAT solver.
    ///
    /// The `program` argument is the path from a directory in execution path to the software to execute.
    /// The `options` parameter is the CLI options to provide to the software under execution.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use schedsat::sat::{ExternalSatSolver, Literal, SatSolver};
    /// let mut solver = ExternalSatSolver::new(
    ///     "/home/me/my_solver".to_string(),
    ///     vec!["-i".to_string(), "/dev/stdin".to_string()],
    /// );
    /// solver.add_clause(vec![Literal::from(-1), Literal::from(-2)]);
    /// solver.add_clause(vec![Literal::from(-1), Literal::from(2)]);
    /// let result = solver.solve().unwrap();
    /// assert_eq!(Some(false), result.model().unwrap().value(Literal::from(1)));
    /// ```
    pub fn new(program: String, options: Vec<String>) -> Self {
        Self {
            buffered_sat_solver: BufferedSatSolver::new(Box::new(move |r: DimacsInstanceRead| {
                exec_solver(r, &program, &options)
            })),
        }
    }
}

impl SatSolver for ExternalSatSolver {
    fn add_clause(&mut self, cl: Vec<Literal>) {
        self.buffered_sat_solver.add_clause(cl)
    }

    fn solve(&mut self) -> Result<SolvingResult> {
        self.buffered_sat_solver.solve()
    }

    fn solve_under_assumptions(&mut self, assumptions: &[Literal]) -> Result<SolvingResult> {
        self.buffered_sat_solver
            .solve_under_assumptions(assumptions)
    }

    fn n_vars(&self) -> usize {
        self.buffered_sat_solver.n_vars()
    }

    fn add_listener(&mut self, listener: Box<dyn SolvingListener>) {
        self.buffered_sat_solver.add_listener(listener);
    }

    fn reserve(&mut self, new_max_id: usize) {
        self.buffered_sat_solver.reserve(new_max_id)
    }

    fn set_time_limit(&mut self, time_limit: Option<Duration>) {
        self.buffered_sat_solver.set_time_limit(time_limit)
    }
}

fn exec_solver(
    mut reader: DimacsInstanceRead,
    program: &str,
    options: &[String],
) -> Result<Box<dyn Read>> {
    let failure =
        |what: &str, e: std::io::Error| SchedError::backend(format!("{} {}: {}", what, program, e));
    let mut child = Command::new(program)
        .args(options)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .map_err(|e| failure("failed to spawn", e))?;
    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| SchedError::backend(format!("failed to open stdin of {}", program)))?;
    let writer = std::thread::spawn(move || -> std::io::Result<()> {
        let mut buffer = String::new();
        reader.read_to_string(&mut buffer)?;
        stdin.write_all(buffer.as_bytes())?;
        stdin.flush()
    });
    let output = child
        .wait_with_output()
        .map_err(|e| failure("failed to wait on", e))?;
    if let Ok(Err(e)) = writer.join() {
        if e.kind() != std::io::ErrorKind::BrokenPipe {
            return Err(failure("failed to write the instance to", e));
        }
    }
    Ok(Box::new(Cursor::new(output.stdout)))
}

/// A factory producing [`ExternalSatSolver`] instances.
pub struct ExternalSatSolverFactory {
    program: String,
    options: Vec<String>,
    listener_factories: Vec<Box<dyn Fn() -> Box<dyn SolvingListener>>>,
}

impl ExternalSatSolverFactory {
    /// Builds a factory for the given program and CLI options.
    pub fn new(program: String, options: Vec<String>) -> Self {
        Self {
            program,
            options,
            listener_factories: vec![],
        }
    }

    /// Adds a function producing a listener for each new solver.
    pub fn add_solver_listener(
        &mut self,
        listener_factory: Box<dyn Fn() -> Box<dyn SolvingListener>>,
    ) {
        self.listener_factories.push(listener_factory);
    }
}

impl SatSolverFactory for ExternalSatSolverFactory {
    fn new_solver(&self) -> Box<dyn SatSolver> {
        let mut solver = ExternalSatSolver::new(self.program.clone(), self.options.clone());
        self.listener_factories
            .iter()
            .for_each(|f| solver.add_listener(f()));
        Box::new(solver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause;
    use std::{cell::RefCell, rc::Rc};

    /// A shell script which reads the instance and prints the given output.
    fn script_solver(output: &str) -> Option<(String, Vec<String>)> {
        if cfg!(target_family = "unix") {
            let script = format!("cat > /dev/null; printf '{}'", output);
            Some(("sh".to_string(), vec!["-c".to_string(), script]))
        } else {
            None
        }
    }

    #[test]
    fn test_sat_output() {
        let (program, options) = match script_solver("s SATISFIABLE\\nv 1 -2 0\\n") {
            Some(cmd) => cmd,
            None => return,
        };
        let mut s = ExternalSatSolver::new(program, options);
        s.add_clause(clause![1, 2]);
        let result = s.solve().unwrap();
        let model = result.model().unwrap();
        assert!(model.is_true(Literal::from(1)));
        assert!(model.is_true(Literal::from(-2)));
    }

    struct CallCounter(Rc<RefCell<usize>>);

    impl SolvingListener for CallCounter {
        fn solving_start(&self, _n_vars: usize, _n_clauses: usize) {}

        fn solving_end(&self, _result: &SolvingResult) {
            *self.0.borrow_mut() += 1;
        }
    }

    #[test]
    fn test_factory_with_listener() {
        let (program, options) = match script_solver("s UNSATISFIABLE\\n") {
            Some(cmd) => cmd,
            None => return,
        };
        let calls = Rc::new(RefCell::new(0));
        let calls_cl = Rc::clone(&calls);
        let mut factory = ExternalSatSolverFactory::new(program, options);
        factory.add_solver_listener(Box::new(move || {
            Box::new(CallCounter(Rc::clone(&calls_cl))) as Box<dyn SolvingListener>
        }));
        let mut s = factory.new_solver();
        s.add_clause(clause![1, 2]);
        let result = s
            .solve_under_assumptions(&[Literal::from(-1), Literal::from(-2)])
            .unwrap();
        assert!(result.is_unsatisfiable());
        assert_eq!(1, *calls.borrow());
    }

    #[test]
    fn test_missing_program() {
        let mut s = ExternalSatSolver::new("/nonexistent/sat/solver".to_string(), vec![]);
        s.add_clause(clause![1, 2]);
        assert!(matches!(s.solve(), Err(SchedError::BackendFailure(_))));
    }
}
