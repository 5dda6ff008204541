use super::{Literal, SatSolver, SolvingListener, SolvingResult, Valuation};
use crate::error::{Result, SchedError};
use std::{
    io::{BufRead, BufReader, Cursor, Read},
    time::Duration,
};

/// The type of the functions in charge of solving the DIMACS instances built by a [`BufferedSatSolver`].
///
/// The function must return a reader to the output of the solver, formatted as in the SAT competitions.
pub type SolvingFn = dyn Fn(DimacsInstanceRead) -> Result<Box<dyn Read>>;

/// A reader to a DIMACS instance built by a [`BufferedSatSolver`].
///
/// Assumptions are given as unit clauses at the end of the instance.
pub struct DimacsInstanceRead {
    preamble: Cursor<String>,
    clauses: Cursor<String>,
    assumptions: Cursor<String>,
}

impl Read for DimacsInstanceRead {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let r = self.preamble.read(buf)?;
        if r > 0 {
            return Ok(r);
        }
        let r = self.clauses.read(buf)?;
        if r > 0 {
            return Ok(r);
        }
        self.assumptions.read(buf)
    }
}

const DEFAULT_BUFFER_CAP: usize = 1 << 20;

const OUTPUT_CONTEXT: &str = "error while reading solving function output in BufferedSatSolver";

/// A SAT solver which stores the clauses as DIMACS text and delegates each solving call to a function.
///
/// Each solving call gives the function the whole instance, with the assumptions as unit clauses.
/// Any problem in the output of the function (unexpected line, literal out of bounds, multiple status lines)
/// is reported as a backend failure.
pub struct BufferedSatSolver {
    n_vars: usize,
    n_clauses: usize,
    clauses: String,
    solving_fn: Box<SolvingFn>,
    listeners: Vec<Box<dyn SolvingListener>>,
}

impl BufferedSatSolver {
    /// Builds a new buffered solver given the solving function.
    pub fn new(solving_fn: Box<SolvingFn>) -> Self {
        Self {
            n_vars: 0,
            n_clauses: 0,
            clauses: String::with_capacity(DEFAULT_BUFFER_CAP),
            solving_fn,
            listeners: Vec::new(),
        }
    }

    fn read_output(&self, solver_output: Box<dyn Read>) -> Result<SolvingResult> {
        let mut output = SolverOutput::new(self.n_vars);
        for line in BufReader::new(solver_output).lines() {
            let line = line.map_err(|e| output_failure(&e.to_string()))?;
            output.read_line(&line)?;
        }
        Ok(output.into_result())
    }
}

fn output_failure(msg: &str) -> SchedError {
    SchedError::backend(format!("{}: {}", OUTPUT_CONTEXT, msg))
}

/// The state of the parsing of a solver output.
struct SolverOutput {
    status: Option<bool>,
    values: Vec<Option<bool>>,
    has_values: bool,
    values_ended: bool,
}

impl SolverOutput {
    fn new(n_vars: usize) -> Self {
        Self {
            status: None,
            values: vec![None; n_vars],
            has_values: false,
            values_ended: false,
        }
    }

    fn read_line(&mut self, line: &str) -> Result<()> {
        match line.split_ascii_whitespace().next() {
            None | Some("c") => Ok(()),
            Some("s") => self.read_status(line),
            Some("v") => self.read_values(line),
            Some(_) => Err(output_failure(&format!(r#"unexpected line "{}""#, line))),
        }
    }

    fn read_status(&mut self, line: &str) -> Result<()> {
        let status = match line {
            "s SATISFIABLE" => true,
            "s UNSATISFIABLE" => false,
            "s UNKNOWN" => return Ok(()),
            _ => return Err(output_failure(&format!(r#"unexpected line "{}""#, line))),
        };
        if self.status.replace(status).is_some() {
            return Err(output_failure("multiple status lines"));
        }
        Ok(())
    }

    fn read_values(&mut self, line: &str) -> Result<()> {
        self.has_values = true;
        for w in line.split_ascii_whitespace().skip(1) {
            let n = w
                .parse::<isize>()
                .map_err(|_| output_failure(&format!(r#""{}" is not a literal"#, w)))?;
            if n == 0 {
                if self.values_ended {
                    return Err(output_failure("multiple zeroes on value line"));
                }
                self.values_ended = true;
                continue;
            }
            match self.values.get_mut(n.unsigned_abs() - 1) {
                Some(v) => *v = Some(n > 0),
                None => {
                    return Err(output_failure(
                        "a variable in value line is out of bounds",
                    ))
                }
            }
        }
        Ok(())
    }

    fn into_result(self) -> SolvingResult {
        match self.status {
            Some(true) if self.has_values => SolvingResult::Satisfiable(Valuation::new(self.values)),
            Some(false) => SolvingResult::Unsatisfiable,
            _ => SolvingResult::Unknown,
        }
    }
}

impl SatSolver for BufferedSatSolver {
    fn add_clause(&mut self, cl: Vec<Literal>) {
        for l in cl {
            self.reserve(l.var().index());
            self.clauses.push_str(&l.to_string());
            self.clauses.push(' ');
        }
        self.clauses.push_str("0\n");
        self.n_clauses += 1;
    }

    fn solve(&mut self) -> Result<SolvingResult> {
        self.solve_under_assumptions(&[])
    }

    fn solve_under_assumptions(&mut self, assumptions: &[Literal]) -> Result<SolvingResult> {
        for l in self.listeners.iter() {
            l.solving_start(self.n_vars, self.n_clauses);
        }
        let mut units = String::new();
        for a in assumptions {
            self.reserve(a.var().index());
            units.push_str(&format!("{} 0\n", a));
        }
        let instance_reader = DimacsInstanceRead {
            preamble: Cursor::new(format!(
                "p cnf {} {}\n",
                self.n_vars,
                self.n_clauses + assumptions.len()
            )),
            clauses: Cursor::new(self.clauses.clone()),
            assumptions: Cursor::new(units),
        };
        let solving_result = self.read_output((self.solving_fn)(instance_reader)?)?;
        for l in self.listeners.iter() {
            l.solving_end(&solving_result);
        }
        Ok(solving_result)
    }

    fn n_vars(&self) -> usize {
        self.n_vars
    }

    fn add_listener(&mut self, listener: Box<dyn SolvingListener>) {
        self.listeners.push(listener);
    }

    fn reserve(&mut self, new_max_id: usize) {
        self.n_vars = usize::max(self.n_vars, new_max_id);
    }

    fn set_time_limit(&mut self, _time_limit: Option<Duration>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause;
    use std::{cell::RefCell, rc::Rc};

    fn echo_solver(output: &'static str) -> BufferedSatSolver {
        let mut s = BufferedSatSolver::new(Box::new(move |_: DimacsInstanceRead| {
            Ok(Box::new(output.as_bytes()) as Box<dyn Read>)
        }));
        s.add_clause(clause![1, -2]);
        s
    }

    fn backend_failure(output: &'static str) -> String {
        match echo_solver(output).solve() {
            Err(SchedError::BackendFailure(msg)) => msg,
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_instance_written() {
        let instance = Rc::new(RefCell::new(String::new()));
        let instance_cl = Rc::clone(&instance);
        let mut s = BufferedSatSolver::new(Box::new(move |mut r: DimacsInstanceRead| {
            r.read_to_string(&mut instance_cl.borrow_mut()).unwrap();
            Ok(Box::new(std::io::empty()) as Box<dyn Read>)
        }));
        s.add_clause(clause![1, 2]);
        s.add_clause(clause![-1, -2]);
        let result = s.solve_under_assumptions(&[Literal::from(-3)]).unwrap();
        assert_eq!(SolvingResult::Unknown, result);
        assert_eq!("p cnf 3 3\n1 2 0\n-1 -2 0\n-3 0\n", *instance.borrow());
        assert_eq!(3, s.n_vars());
    }

    #[test]
    fn test_read_model() {
        let result = echo_solver("c comment\ns SATISFIABLE\nv -1 -2 0\n").solve().unwrap();
        let model = result.model().unwrap();
        assert_eq!(Some(false), model.value(Literal::from(1)));
        assert!(model.is_true(Literal::from(-2)));
    }

    #[test]
    fn test_read_model_on_several_lines() {
        let result = echo_solver("s SATISFIABLE\nv\nv 1\nv -2\nv 0\n").solve().unwrap();
        let model = result.model().unwrap();
        assert!(model.is_true(Literal::from(1)));
        assert!(model.is_true(Literal::from(-2)));
    }

    #[test]
    fn test_read_unsat() {
        let result = echo_solver("c\n\ns UNSATISFIABLE\n").solve().unwrap();
        assert!(result.is_unsatisfiable());
    }

    #[test]
    fn test_undecided_outputs() {
        for output in ["v 1 2 0\n", "s SATISFIABLE\n", "s UNKNOWN\n", ""] {
            assert_eq!(SolvingResult::Unknown, echo_solver(output).solve().unwrap());
        }
    }

    #[test]
    fn test_protocol_violations() {
        let cases = [
            ("s SATISFIABLE\nv 1 2 3 0\n", "a variable in value line is out of bounds"),
            ("s SATISFIABLE\nv 1 x 0\n", r#""x" is not a literal"#),
            ("s SATISFIABLE\ns SATISFIABLE\nv 1 2 0\n", "multiple status lines"),
            ("s SATISFIABLE\nv 1 0\nv 2 0\n", "multiple zeroes on value line"),
            ("foo\ns UNSATISFIABLE\n", r#"unexpected line "foo""#),
            ("s MAYBE\n", r#"unexpected line "s MAYBE""#),
        ];
        for (output, msg) in cases {
            assert_eq!(format!("{}: {}", OUTPUT_CONTEXT, msg), backend_failure(output));
        }
    }

    #[test]
    fn test_solving_fn_failure() {
        let mut s = BufferedSatSolver::new(Box::new(|_: DimacsInstanceRead| {
            Err(SchedError::backend("no solver"))
        }));
        s.add_clause(clause![1]);
        assert_eq!(Err(SchedError::backend("no solver")), s.solve());
    }
}
