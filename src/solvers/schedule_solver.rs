use super::{mus, optimizer, CancellationFlag, Conflict, Explanation, Model};
use crate::{
    encodings::{CompiledProblem, ConstraintCompiler},
    error::{Result, SchedError},
    instantiation::SymmetryBreaking,
    model::Problem,
    sat::{DefaultSatSolverFactory, Literal, SatSolverFactory, SolvingResult, Valuation},
};
use log::{debug, info, warn};
use std::time::Duration;

/// The options of a [`ScheduleSolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverOptions {
    /// The time limit of each backend check, if any.
    pub time_limit: Option<Duration>,
    /// Whether an explanation is computed for unsatisfiable problems.
    pub explain: bool,
    /// Whether the cost of the returned model is minimized.
    pub optimize: bool,
    /// Whether an enumeration interrupted by an undecided check or a failure discards the models found so far.
    pub all_or_nothing: bool,
    /// Whether the tuples of unrestricted rules are filtered by [`SymmetryBreaking`].
    pub symmetry_breaking: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            time_limit: None,
            explain: true,
            optimize: true,
            all_or_nothing: false,
            symmetry_breaking: false,
        }
    }
}

/// The state of a [`ScheduleSolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum SolverStatus {
    /// The problem is not compiled yet, or its compilation was discarded after a backend failure.
    Uncompiled,
    /// The problem is compiled but not solved.
    Compiled,
    /// The last check found a model.
    Satisfiable,
    /// The last check proved there is no model.
    Unsatisfiable,
    /// The last check could not be decided.
    Unknown,
}

/// The outcome of [`ScheduleSolver::solve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    /// A model was found.
    Satisfiable(Model),
    /// There is no model; the explanation is given if it was requested.
    Unsatisfiable(Option<Explanation>),
    /// The backend could not decide within its resource bound.
    Unknown,
}

/// The reason why an enumeration stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumerationTermination {
    /// Every model was found.
    Exhausted,
    /// A check could not be decided.
    Unknown,
    /// The enumeration was cancelled.
    Cancelled,
    /// The backend failed.
    BackendFailure(String),
}

/// The result of [`ScheduleSolver::enumerate_all`].
///
/// Unless the termination is [`EnumerationTermination::Exhausted`], the list of models may be partial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enumeration {
    models: Vec<Model>,
    termination: EnumerationTermination,
}

impl Enumeration {
    /// Returns the models found, in discovery order.
    pub fn models(&self) -> &[Model] {
        &self.models
    }

    /// Returns the models found, consuming the enumeration.
    pub fn into_models(self) -> Vec<Model> {
        self.models
    }

    /// Returns the reason why the enumeration stopped.
    pub fn termination(&self) -> &EnumerationTermination {
        &self.termination
    }

    /// Returns `true` iff every model was found.
    pub fn is_complete(&self) -> bool {
        self.termination == EnumerationTermination::Exhausted
    }
}

/// A SAT-based solver for scheduling problems.
///
/// The solver compiles the problem once, then answers [`solve`](Self::solve) and
/// [`enumerate_all`](Self::enumerate_all) calls on the compiled clauses.
/// The problem must not be modified after the solver is built (it is borrowed for the lifetime of the solver).
///
/// # Example
///
/// ```
/// # use schedsat::conditions::{Condition, SlotRef};
/// # use schedsat::model::{Cardinality, Problem, SlotDefinition};
/// # use schedsat::rules::Hardness;
/// # use schedsat::solvers::{ScheduleSolver, SolveOutcome};
/// let mut problem = Problem::default();
/// problem.new_component_type("Room").unwrap();
/// problem.new_component("R1", "Room").unwrap();
/// problem.new_component("R2", "Room").unwrap();
/// problem.new_assignment("Meeting").unwrap();
/// problem
///     .add_slot("Meeting", "room", SlotDefinition::variable("Room", Cardinality::Exactly(1)))
///     .unwrap();
/// problem
///     .new_rule("in_r1", Condition::component_is(SlotRef::new(0, "room"), "R1"), Hardness::Hard)
///     .unwrap();
/// let mut solver = ScheduleSolver::new(&problem);
/// match solver.solve().unwrap() {
///     SolveOutcome::Satisfiable(model) => {
///         let meeting = model.assignment("Meeting").unwrap();
///         assert_eq!(&["R1".to_string()], meeting.slot("room").unwrap());
///     }
///     _ => panic!(),
/// }
/// ```
pub struct ScheduleSolver<'a> {
    problem: &'a Problem,
    options: SolverOptions,
    solver_factory: Box<dyn SatSolverFactory + 'a>,
    compiled: Option<CompiledProblem>,
    status: SolverStatus,
    cancellation: CancellationFlag,
}

impl<'a> ScheduleSolver<'a> {
    /// Builds a solver with the default options and the default SAT solver.
    pub fn new(problem: &'a Problem) -> Self {
        Self::new_with_options(problem, SolverOptions::default())
    }

    /// Builds a solver with the default SAT solver.
    pub fn new_with_options(problem: &'a Problem, options: SolverOptions) -> Self {
        Self::new_with_sat_solver_factory(
            problem,
            options,
            Box::new(DefaultSatSolverFactory::default()),
        )
    }

    /// Builds a solver which SAT solvers are given by a factory.
    ///
    /// A new SAT solver is requested each time the problem is compiled.
    pub fn new_with_sat_solver_factory(
        problem: &'a Problem,
        options: SolverOptions,
        solver_factory: Box<dyn SatSolverFactory + 'a>,
    ) -> Self {
        Self {
            problem,
            options,
            solver_factory,
            compiled: None,
            status: SolverStatus::Uncompiled,
            cancellation: CancellationFlag::default(),
        }
    }

    /// Returns the options of this solver.
    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Returns the current state of this solver.
    pub fn status(&self) -> SolverStatus {
        self.status
    }

    /// Returns a flag which cancels the operations of this solver when set.
    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancellation.clone()
    }

    /// Returns the compiled problem, if the problem is compiled.
    pub fn compiled_problem(&self) -> Option<&CompiledProblem> {
        self.compiled.as_ref()
    }

    /// Compiles the problem if it is not compiled yet.
    ///
    /// Schema errors not detected at registration time are raised here.
    pub fn compile(&mut self) -> Result<()> {
        if self.compiled.is_some() {
            return Ok(());
        }
        let compiler = if self.options.symmetry_breaking {
            ConstraintCompiler::new_with_viability_predicate(
                self.problem,
                Box::new(SymmetryBreaking::default()),
            )
        } else {
            ConstraintCompiler::new(self.problem)
        };
        let mut solver = self.solver_factory.new_solver();
        solver.set_time_limit(self.options.time_limit);
        self.compiled = Some(compiler.compile(solver)?);
        self.status = SolverStatus::Compiled;
        Ok(())
    }

    fn check_cancellation(&self) -> Result<()> {
        if self.cancellation.is_cancelled() {
            info!("operation cancelled");
            Err(SchedError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn compiled_mut(&mut self) -> Result<&mut CompiledProblem> {
        self.compiled
            .as_mut()
            .ok_or_else(|| SchedError::backend("the problem is not compiled"))
    }

    fn discard_on_failure<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(SchedError::BackendFailure(msg)) = &result {
            warn!("discarding the compiled problem after a backend failure: {}", msg);
            self.compiled = None;
            self.status = SolverStatus::Uncompiled;
        }
        result
    }

    /// Looks for a model.
    ///
    /// If the options require it, the returned model has the minimal cost (or the lowest cost found
    /// if the backend could not decide whether a better one exists), and the unsatisfiable outcome
    /// comes with an explanation.
    pub fn solve(&mut self) -> Result<SolveOutcome> {
        self.check_cancellation()?;
        self.compile()?;
        self.check_cancellation()?;
        let result = self.solve_compiled();
        self.discard_on_failure(result)
    }

    fn solve_compiled(&mut self) -> Result<SolveOutcome> {
        let problem = self.problem;
        let optimize = self.options.optimize;
        let explain = self.options.explain;
        let cancellation = self.cancellation.clone();
        let compiled = self.compiled_mut()?;
        let assumptions = compiled.selector_literals();
        let outcome = match compiled.encoder_mut().solve_under_assumptions(&assumptions)? {
            SolvingResult::Satisfiable(v) => {
                let (valuation, cost, optimal) = if optimize && !compiled.soft_terms().is_empty() {
                    let optimum =
                        optimizer::minimize_cost(compiled, &assumptions, v, &cancellation)?;
                    (optimum.valuation, optimum.cost, optimum.optimal)
                } else {
                    let cost = compiled.cost(&v);
                    (v, cost, cost == 0)
                };
                SolveOutcome::Satisfiable(read_model(problem, compiled, &valuation, cost, optimal))
            }
            SolvingResult::Unsatisfiable => {
                if explain {
                    SolveOutcome::Unsatisfiable(Some(explain_conflict(
                        problem,
                        compiled,
                        &cancellation,
                    )?))
                } else {
                    SolveOutcome::Unsatisfiable(None)
                }
            }
            SolvingResult::Unknown => SolveOutcome::Unknown,
        };
        self.status = match &outcome {
            SolveOutcome::Satisfiable(_) => SolverStatus::Satisfiable,
            SolveOutcome::Unsatisfiable(_) => SolverStatus::Unsatisfiable,
            SolveOutcome::Unknown => SolverStatus::Unknown,
        };
        info!("problem is {}", self.status);
        Ok(outcome)
    }

    /// Enumerates all the models of the problem, or all its models of minimal cost.
    ///
    /// Each model found is excluded by a blocking clause before the next check.
    /// The compiled problem is discarded at the end of the enumeration, with its blocking clauses:
    /// the next operation compiles the problem again into a new SAT solver.
    ///
    /// The enumeration stops when no more model exists, or when a check cannot be decided, fails or is cancelled.
    /// In the latter cases, the models found so far are returned, unless the options require all-or-nothing results:
    /// then the corresponding error is returned.
    pub fn enumerate_all(&mut self, optimal_only: bool) -> Result<Enumeration> {
        self.check_cancellation()?;
        self.compile()?;
        let mut models = Vec::new();
        let result = self.enumerate_compiled(optimal_only, &mut models);
        let termination = match self.discard_on_failure(result) {
            Ok(t) => t,
            Err(SchedError::BackendFailure(msg)) => EnumerationTermination::BackendFailure(msg),
            Err(SchedError::Cancelled) => EnumerationTermination::Cancelled,
            Err(e) => return Err(e),
        };
        if self.compiled.take().is_some() {
            debug!("discarding the compiled problem and its blocking clauses");
        }
        if self.status == SolverStatus::Compiled {
            self.status = SolverStatus::Uncompiled;
        }
        info!(
            "enumeration stopped after {} model(s): {:?}",
            models.len(),
            termination
        );
        if self.options.all_or_nothing {
            match &termination {
                EnumerationTermination::Exhausted => {}
                EnumerationTermination::Unknown => return Err(SchedError::Unknown),
                EnumerationTermination::Cancelled => return Err(SchedError::Cancelled),
                EnumerationTermination::BackendFailure(msg) => {
                    return Err(SchedError::backend(msg.clone()))
                }
            }
        }
        Ok(Enumeration {
            models,
            termination,
        })
    }

    fn enumerate_compiled(
        &mut self,
        optimal_only: bool,
        models: &mut Vec<Model>,
    ) -> Result<EnumerationTermination> {
        let problem = self.problem;
        let cancellation = self.cancellation.clone();
        let compiled = self.compiled_mut()?;
        let mut assumptions = compiled.selector_literals();
        let mut optimal_cost = None;
        if optimal_only && !compiled.soft_terms().is_empty() {
            let first = match compiled.encoder_mut().solve_under_assumptions(&assumptions)? {
                SolvingResult::Satisfiable(v) => v,
                SolvingResult::Unsatisfiable => {
                    self.status = SolverStatus::Unsatisfiable;
                    return Ok(EnumerationTermination::Exhausted);
                }
                SolvingResult::Unknown => {
                    self.status = SolverStatus::Unknown;
                    return Ok(EnumerationTermination::Unknown);
                }
            };
            let optimum = optimizer::minimize_cost(compiled, &assumptions, first, &cancellation)?;
            if !optimum.optimal {
                self.status = SolverStatus::Unknown;
                return Ok(EnumerationTermination::Unknown);
            }
            let bound = optimizer::cost_bound(compiled, optimum.cost);
            assumptions.push(bound);
            optimal_cost = Some(optimum.cost);
        }
        let decisions = compiled.decision_literals();
        let termination = loop {
            if cancellation.is_cancelled() {
                break EnumerationTermination::Cancelled;
            }
            match compiled.encoder_mut().solve_under_assumptions(&assumptions) {
                Ok(SolvingResult::Satisfiable(v)) => {
                    let block = decisions
                        .iter()
                        .map(|l| if v.is_true(*l) { l.negate() } else { *l })
                        .collect();
                    compiled.encoder_mut().add_clause(block);
                    let cost = compiled.cost(&v);
                    let optimal = optimal_cost.is_some() || compiled.soft_terms().is_empty();
                    models.push(read_model(problem, compiled, &v, cost, optimal));
                }
                Ok(SolvingResult::Unsatisfiable) => break EnumerationTermination::Exhausted,
                Ok(SolvingResult::Unknown) => break EnumerationTermination::Unknown,
                Err(e) => return Err(e),
            }
        };
        self.status = match (&termination, models.is_empty()) {
            (EnumerationTermination::Exhausted, true) => SolverStatus::Unsatisfiable,
            (EnumerationTermination::Unknown, _) => SolverStatus::Unknown,
            (_, false) => SolverStatus::Satisfiable,
            (_, true) => SolverStatus::Compiled,
        };
        Ok(termination)
    }
}

fn read_model(
    problem: &Problem,
    compiled: &CompiledProblem,
    valuation: &Valuation,
    cost: usize,
    optimal: bool,
) -> Model {
    let bindings = compiled.bindings(problem, valuation);
    let fulfilled = (0..problem.assignments().len())
        .map(|a| valuation.is_true(compiled.fulfillment_literal(a)))
        .collect();
    Model::new(problem, bindings, fulfilled, cost, optimal)
}

fn explain_conflict(
    problem: &Problem,
    compiled: &mut CompiledProblem,
    cancellation: &CancellationFlag,
) -> Result<Explanation> {
    info!("computing an explanation");
    let selectors = compiled.selector_literals();
    let subset = mus::minimal_unsat_subset(
        compiled.encoder_mut(),
        &selectors,
        &[] as &[Literal],
        cancellation,
    )?;
    let conflicts = subset
        .indices
        .iter()
        .map(|i| Conflict::new(problem, compiled.selectors()[*i].1.clone()))
        .collect();
    Ok(Explanation::new(conflicts, subset.minimal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        io::ProblemReader,
        sat::{BufferedSatSolver, DimacsInstanceRead, SatSolver},
    };

    fn read(instance: &str) -> Problem {
        ProblemReader::default()
            .read(&mut instance.as_bytes())
            .unwrap()
    }

    fn room_of(model: &Model, assignment: &str) -> Vec<String> {
        model
            .assignment(assignment)
            .unwrap()
            .slot("room")
            .unwrap()
            .to_vec()
    }

    fn assert_hard_rules_hold(problem: &Problem, models: &[Model]) {
        for model in models {
            for rule in problem.rules().iter().filter(|r| r.is_hard()) {
                assert!(model.satisfies(problem, rule).unwrap());
            }
        }
    }

    const TWO_MEETINGS: &str = r#"
    type Room
    component R1 Room
    component R2 Room
    assignment M1
    assignment M2
    slot M1 room Room 1
    slot M2 room Room 1
    rule no_double_booking hard (distinct 0.room 1.room)
    "#;

    macro_rules! test_for_options {
        ($symmetry_breaking:expr, $suffix:literal) => {
            paste::item! {

    fn [< options_ $suffix >] () -> SolverOptions {
        SolverOptions {
            symmetry_breaking: $symmetry_breaking,
            ..SolverOptions::default()
        }
    }

    #[test]
    fn [< test_single_meeting_ $suffix >] () {
        let problem = read(r#"
        type Room
        component R1 Room
        component R2 Room
        assignment Meeting
        slot Meeting room Room 1
        rule in_r1 hard (component-is 0.room R1)
        "#);
        let mut solver = ScheduleSolver::new_with_options(&problem, [< options_ $suffix >]());
        let models = solver.enumerate_all(false).unwrap().into_models();
        assert_eq!(1, models.len());
        assert_eq!(vec!["R1"], room_of(&models[0], "Meeting"));
    }

    #[test]
    fn [< test_distinct_rooms_ $suffix >] () {
        let problem = read(TWO_MEETINGS);
        let mut solver = ScheduleSolver::new_with_options(&problem, [< options_ $suffix >]());
        let enumeration = solver.enumerate_all(false).unwrap();
        assert!(enumeration.is_complete());
        let mut rooms = enumeration
            .models()
            .iter()
            .map(|m| (room_of(m, "M1"), room_of(m, "M2")))
            .collect::<Vec<_>>();
        rooms.sort();
        assert_eq!(
            vec![
                (vec!["R1".to_string()], vec!["R2".to_string()]),
                (vec!["R2".to_string()], vec!["R1".to_string()]),
            ],
            rooms
        );
        assert_hard_rules_hold(&problem, enumeration.models());
        assert_eq!(SolverStatus::Satisfiable, solver.status());
    }

    #[test]
    fn [< test_distinct_rooms_and_fixed_choice_ $suffix >] () {
        let problem = read(&format!("{}\nrule m1_in_r1 hard (component-is 0.room R1) for M1\n", TWO_MEETINGS));
        let mut solver = ScheduleSolver::new_with_options(&problem, [< options_ $suffix >]());
        let models = solver.enumerate_all(false).unwrap().into_models();
        assert_eq!(1, models.len());
        assert_eq!(vec!["R1"], room_of(&models[0], "M1"));
        assert_eq!(vec!["R2"], room_of(&models[0], "M2"));
    }

    #[test]
    fn [< test_conflict_explanation_ $suffix >] () {
        let problem = read(&format!("{}\nrule in_r1 hard (component-is 0.room R1)\n", TWO_MEETINGS));
        let mut solver = ScheduleSolver::new_with_options(&problem, [< options_ $suffix >]());
        let explanation = match solver.solve().unwrap() {
            SolveOutcome::Unsatisfiable(Some(e)) => e,
            _ => panic!(),
        };
        assert!(explanation.is_minimal());
        assert_eq!(3, explanation.len());
        let mut labels = explanation.rule_labels();
        labels.sort_unstable();
        assert_eq!(vec!["in_r1", "no_double_booking"], labels);
        assert_eq!(SolverStatus::Unsatisfiable, solver.status());
        let enumeration = solver.enumerate_all(false).unwrap();
        assert!(enumeration.is_complete());
        assert!(enumeration.models().is_empty());
    }

    #[test]
    fn [< test_aggregates_ $suffix >] () {
        let problem = read(r#"
        type Room
        component R1 Room
        component R2 Room
        type Host
        component E1 Host
        component E2 Host
        assignment Mon
        assignment Tue
        assignment Wed
        slot Mon host Host 1
        slot Tue host Host 1
        slot Wed host Host 1
        fixed Mon room Room R1
        fixed Tue room Room R1
        fixed Wed room Room R2
        rule e1_twice hard (min-assignments 2 (component-is 0.host E1))
        rule no_streak hard (max-in-sequence 1 (component-is 0.host E1))
        "#);
        let mut solver = ScheduleSolver::new_with_options(&problem, [< options_ $suffix >]());
        let models = solver.enumerate_all(false).unwrap().into_models();
        assert_eq!(1, models.len());
        let host = |a: &str| models[0].assignment(a).unwrap().slot("host").unwrap().to_vec();
        assert_eq!(vec!["E1"], host("Mon"));
        assert_eq!(vec!["E2"], host("Tue"));
        assert_eq!(vec!["E1"], host("Wed"));
        assert_eq!(vec!["R2"], models[0].assignment("Wed").unwrap().slot("room").unwrap());
        assert_hard_rules_hold(&problem, &models);
    }

            }
        };
    }

    test_for_options!(false, "default");
    test_for_options!(true, "symmetry_breaking");

    #[test]
    fn test_optimization() {
        let problem = read(r#"
        type Room
        component R1 Room
        component R2 Room
        component R3 Room
        group Big R3
        assignment M1
        assignment M2 optional 5
        slot M1 room Room 1
        slot M2 room Room 1
        rule no_double_booking hard (distinct 0.room 1.room)
        rule big_for_m1 soft 3 (in-group 0.room Big) for M1
        rule big_for_m2 soft 2 (in-group 0.room Big) for M2
        "#);
        let mut solver = ScheduleSolver::new(&problem);
        let model = match solver.solve().unwrap() {
            SolveOutcome::Satisfiable(m) => m,
            _ => panic!(),
        };
        assert_eq!(2, model.cost());
        assert!(model.is_optimal());
        assert_eq!(vec!["R3"], room_of(&model, "M1"));
        assert!(model.assignment("M2").unwrap().is_fulfilled());
        let optimal = solver.enumerate_all(true).unwrap().into_models();
        assert_eq!(2, optimal.len());
        assert!(optimal.iter().all(|m| m.cost() == 2 && m.is_optimal()));
        let all = solver.enumerate_all(false).unwrap().into_models();
        // M2 unfulfilled (3 rooms for M1), or both fulfilled in distinct rooms
        assert_eq!(3 + 6, all.len());
    }

    #[test]
    fn test_optional_slot_and_exclusive_type() {
        let problem = read(r#"
        type Screen exclusive
        component S1 Screen
        type Room
        component R1 Room
        assignment M1
        assignment M2
        slot M1 room Room 1
        slot M2 room Room 1
        slot M1 screen Screen 1 optional
        slot M2 screen Screen 1
        "#);
        let mut solver = ScheduleSolver::new(&problem);
        let models = solver.enumerate_all(false).unwrap().into_models();
        assert_eq!(1, models.len());
        let screen = |a: &str| models[0].assignment(a).unwrap().slot("screen").unwrap().to_vec();
        assert!(screen("M1").is_empty());
        assert_eq!(vec!["S1"], screen("M2"));
    }

    #[test]
    fn test_cancellation() {
        let problem = read(TWO_MEETINGS);
        let mut solver = ScheduleSolver::new(&problem);
        solver.cancellation_flag().cancel();
        assert_eq!(Err(SchedError::Cancelled), solver.solve());
        assert_eq!(SolverStatus::Uncompiled, solver.status());
    }

    #[test]
    fn test_backend_failure_discards_compilation() {
        let problem = read(TWO_MEETINGS);
        let factory = || {
            Box::new(BufferedSatSolver::new(Box::new(|_: DimacsInstanceRead| {
                Err(SchedError::backend("solver crashed"))
            }))) as Box<dyn SatSolver>
        };
        let mut solver =
            ScheduleSolver::new_with_sat_solver_factory(&problem, SolverOptions::default(), Box::new(factory));
        solver.compile().unwrap();
        assert_eq!(SolverStatus::Compiled, solver.status());
        assert!(matches!(solver.solve(), Err(SchedError::BackendFailure(_))));
        assert_eq!(SolverStatus::Uncompiled, solver.status());
        assert!(solver.compiled_problem().is_none());
        let enumeration = solver.enumerate_all(false).unwrap();
        assert!(matches!(
            enumeration.termination(),
            EnumerationTermination::BackendFailure(_)
        ));
    }

    #[test]
    fn test_unknown() {
        let problem = read(TWO_MEETINGS);
        let factory = || {
            Box::new(BufferedSatSolver::new(Box::new(|_: DimacsInstanceRead| {
                Ok(Box::new("c no answer\n".as_bytes()) as Box<dyn std::io::Read>)
            }))) as Box<dyn SatSolver>
        };
        let mut solver =
            ScheduleSolver::new_with_sat_solver_factory(&problem, SolverOptions::default(), Box::new(factory));
        assert_eq!(SolveOutcome::Unknown, solver.solve().unwrap());
        assert_eq!(SolverStatus::Unknown, solver.status());
        let enumeration = solver.enumerate_all(false).unwrap();
        assert_eq!(&EnumerationTermination::Unknown, enumeration.termination());
        let options = SolverOptions {
            all_or_nothing: true,
            ..SolverOptions::default()
        };
        let mut solver = ScheduleSolver::new_with_sat_solver_factory(&problem, options, Box::new(factory));
        assert_eq!(Err(SchedError::Unknown), solver.enumerate_all(false));
    }

    #[test]
    fn test_enumeration_starts_from_a_new_sat_solver() {
        let problem = read(TWO_MEETINGS);
        let n_solvers = std::rc::Rc::new(std::cell::Cell::new(0));
        let n_solvers_cl = std::rc::Rc::clone(&n_solvers);
        let factory = move || {
            n_solvers_cl.set(n_solvers_cl.get() + 1);
            crate::sat::default_solver()
        };
        let mut solver =
            ScheduleSolver::new_with_sat_solver_factory(&problem, SolverOptions::default(), Box::new(factory));
        assert_eq!(2, solver.enumerate_all(false).unwrap().models().len());
        assert!(solver.compiled_problem().is_none());
        assert_eq!(SolverStatus::Satisfiable, solver.status());
        assert_eq!(2, solver.enumerate_all(false).unwrap().models().len());
        assert!(matches!(solver.solve().unwrap(), SolveOutcome::Satisfiable(_)));
        assert!(solver.compiled_problem().is_some());
        assert_eq!(3, n_solvers.get());
    }
}
