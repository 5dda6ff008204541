use super::cadical_solver::CadicalSolver;
use crate::error::Result;
use std::{
    fmt::Display,
    num::{NonZeroIsize, NonZeroUsize},
    time::Duration,
};

/// A variable of a SAT solver, identified by a positive index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable(NonZeroUsize);

impl Variable {
    /// Returns the variable of the given index.
    ///
    /// # Panics
    ///
    /// If the index is zero.
    pub fn new(index: usize) -> Self {
        match NonZeroUsize::new(index) {
            Some(i) => Self(i),
            None => panic!("variable indices start at 1"),
        }
    }

    /// Returns the index of this variable.
    pub fn index(self) -> usize {
        self.0.get()
    }

    /// Returns the literal of this variable with the given polarity.
    pub fn literal(self, positive: bool) -> Literal {
        let i = self.0.get() as isize;
        Literal::from(if positive { i } else { -i })
    }
}

impl From<usize> for Variable {
    fn from(index: usize) -> Self {
        Self::new(index)
    }
}

impl From<Variable> for usize {
    fn from(v: Variable) -> Self {
        v.index()
    }
}

/// A literal of a SAT solver: a variable or its negation, in the DIMACS signed integer convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal(NonZeroIsize);

impl Literal {
    /// Returns the opposite literal.
    pub fn negate(self) -> Self {
        Self(-self.0)
    }

    /// Returns the variable of this literal.
    pub fn var(&self) -> Variable {
        Variable(self.0.unsigned_abs())
    }

    /// Returns `true` iff this literal is the positive one of its variable.
    pub fn is_positive(&self) -> bool {
        self.0.get() > 0
    }
}

macro_rules! impl_lit_from_signed {
    ($($t: ty),*) => {
        $(
            impl From<$t> for Literal {
                fn from(l: $t) -> Self {
                    match NonZeroIsize::new(l as isize) {
                        Some(n) => Self(n),
                        None => panic!("0 is not a literal"),
                    }
                }
            }
        )*
    };
}
impl_lit_from_signed!(i32, i64, isize);

impl From<Variable> for Literal {
    fn from(v: Variable) -> Self {
        v.literal(true)
    }
}

impl From<Literal> for isize {
    fn from(l: Literal) -> Self {
        l.0.get()
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Builds a clause from a list of integers.
#[macro_export]
macro_rules! clause {
    () => (
        vec![] as Vec<$crate::sat::Literal>
    );
    ($($x:expr),+ $(,)?) => (
        [$($x),+].into_iter().map($crate::sat::Literal::from).collect::<Vec<$crate::sat::Literal>>()
    );
}

/// The values a SAT solver gave to its variables.
///
/// Variables the solver did not assign (or did not know) have no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Valuation(Vec<Option<bool>>);

impl Valuation {
    pub(crate) fn new(valuation: Vec<Option<bool>>) -> Self {
        Self(valuation)
    }

    /// Returns the value of a literal, if its variable is assigned.
    pub fn value(&self, l: Literal) -> Option<bool> {
        self.0
            .get(l.var().index() - 1)
            .copied()
            .flatten()
            .map(|b| b == l.is_positive())
    }

    /// Returns `true` iff the literal is set to true; unassigned literals are not.
    pub fn is_true(&self, l: Literal) -> bool {
        self.value(l) == Some(true)
    }

    /// Returns the number of variables covered by this valuation.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` iff this valuation covers no variable.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The result of a SAT solver call.
#[derive(Debug, PartialEq, Eq)]
pub enum SolvingResult {
    /// The formula is satisfiable; a model is provided.
    Satisfiable(Valuation),
    /// The formula is unsatisfiable.
    Unsatisfiable,
    /// The solver could not decide the formula (time limit, missing model).
    Unknown,
}

impl SolvingResult {
    /// Returns the model, if the formula was proved satisfiable.
    pub fn model(&self) -> Option<&Valuation> {
        match self {
            SolvingResult::Satisfiable(valuation) => Some(valuation),
            _ => None,
        }
    }

    /// Returns `true` iff the formula was proved unsatisfiable.
    pub fn is_unsatisfiable(&self) -> bool {
        matches!(self, SolvingResult::Unsatisfiable)
    }
}

/// A trait for SAT solvers.
///
/// Clauses may be added between calls to the solving functions (incremental use).
/// Solving functions return an error when the solver itself faulted;
/// the cases where the solver could not decide are reported by [SolvingResult::Unknown].
pub trait SatSolver {
    /// Adds a clause to this solver.
    fn add_clause(&mut self, cl: Vec<Literal>);

    /// Solves the problem formed by the clauses added so far.
    fn solve(&mut self) -> Result<SolvingResult>;

    /// Solves the problem formed by the clauses added so far and the provided assumptions.
    fn solve_under_assumptions(&mut self, assumptions: &[Literal]) -> Result<SolvingResult>;

    /// Returns the highest variable index known by the solver.
    fn n_vars(&self) -> usize;

    /// Adds a listener, notified at each call to a solving function.
    fn add_listener(&mut self, listener: Box<dyn SolvingListener>);

    /// Declares that variables up to `new_max_id` may be used, even if they do not appear in clauses.
    fn reserve(&mut self, new_max_id: usize);

    /// Bounds the time taken by each call to a solving function.
    ///
    /// When the bound is reached, [SolvingResult::Unknown] is returned.
    /// Solvers unable to bound their time ignore this setting.
    fn set_time_limit(&mut self, time_limit: Option<Duration>);
}

/// A trait for objects listening to the calls to a SAT solver.
pub trait SolvingListener {
    /// Called when a solving function is called.
    fn solving_start(&self, n_vars: usize, n_clauses: usize);

    /// Called when a solving function returns a result.
    fn solving_end(&self, result: &SolvingResult);
}

/// A trait for objects producing new SAT solvers.
pub trait SatSolverFactory {
    /// Returns a new, empty SAT solver.
    fn new_solver(&self) -> Box<dyn SatSolver>;
}

impl<F> SatSolverFactory for F
where
    F: Fn() -> Box<dyn SatSolver>,
{
    fn new_solver(&self) -> Box<dyn SatSolver> {
        (self)()
    }
}

type ListenerFactory = Box<dyn Fn() -> Box<dyn SolvingListener>>;

/// A factory producing instances of the default SAT solver.
#[derive(Default)]
pub struct DefaultSatSolverFactory {
    listener_factories: Vec<ListenerFactory>,
}

impl DefaultSatSolverFactory {
    /// Adds a function producing a listener for each new solver.
    pub fn add_solver_listener(&mut self, listener_factory: ListenerFactory) {
        self.listener_factories.push(listener_factory);
    }
}

impl SatSolverFactory for DefaultSatSolverFactory {
    fn new_solver(&self) -> Box<dyn SatSolver> {
        let mut solver = default_solver();
        self.listener_factories
            .iter()
            .for_each(|f| solver.add_listener(f()));
        solver
    }
}

/// The default SAT solver (Cadical).
pub fn default_solver() -> Box<dyn SatSolver> {
    Box::new(CadicalSolver::default())
}
