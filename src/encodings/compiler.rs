use super::{AssertionTag, CnfEncoder, Formula};
use crate::{
    conditions::{in_component_set, Condition, SlotRef},
    error::{Result, SchedError},
    instantiation::{InstantiationEngine, ViabilityPredicate},
    model::{Cardinality, ComponentSlot, Labeled, Problem},
    rules::{Hardness, Rule, Scope},
    sat::{Literal, SatSolver, Valuation},
};
use log::{debug, info};
use std::collections::{BTreeMap, HashMap};

/// Translates a [`Problem`] into the clauses of a SAT solver.
///
/// Each variable slot gets one boolean variable per component of its type, set to true iff the component is bound to the slot.
/// Fixed slots get constants instead.
/// Each assignment gets a fulfillment variable; an unfulfilled assignment binds nothing in its variable slots.
///
/// Non-optional assignments are always fulfilled.
/// The other hard assertions (exclusive components, hard rules) are guarded by selectors
/// which must be passed as assumptions when solving.
/// Soft assertions (fulfillment of optional assignments, soft rules) are returned as weighted literals.
pub struct ConstraintCompiler<'a> {
    problem: &'a Problem,
    engine: InstantiationEngine<'a>,
}

impl<'a> ConstraintCompiler<'a> {
    /// Builds a compiler instantiating rules on every applicable tuple.
    pub fn new(problem: &'a Problem) -> Self {
        Self {
            problem,
            engine: InstantiationEngine::new(problem),
        }
    }

    /// Builds a compiler filtering the tuples of unrestricted rules with a predicate.
    pub fn new_with_viability_predicate(
        problem: &'a Problem,
        viability: Box<dyn ViabilityPredicate + 'a>,
    ) -> Self {
        Self {
            problem,
            engine: InstantiationEngine::new_with_viability_predicate(problem, viability),
        }
    }

    /// Compiles the problem into the provided solver, which must be empty.
    pub fn compile(&self, solver: Box<dyn SatSolver>) -> Result<CompiledProblem> {
        let mut compiled = CompiledProblem {
            encoder: CnfEncoder::new(solver),
            slot_literals: Vec::with_capacity(self.problem.assignments().len()),
            fulfillment: Vec::with_capacity(self.problem.assignments().len()),
            selectors: Vec::new(),
            soft_terms: Vec::new(),
        };
        self.compile_assignments(&mut compiled);
        self.compile_exclusive_types(&mut compiled);
        for rule in self.problem.rules().iter() {
            self.compile_rule(&mut compiled, rule)?;
        }
        compiled
            .soft_terms
            .iter()
            .try_fold(0usize, |acc, (w, _)| acc.checked_add(*w))
            .ok_or_else(|| {
                SchedError::schema("the sum of the weights of the soft assertions is too large")
            })?;
        info!(
            "compiled problem into {} variables, {} clauses, {} selectors and {} soft terms",
            compiled.encoder.n_vars(),
            compiled.encoder.n_clauses(),
            compiled.selectors.len(),
            compiled.soft_terms.len()
        );
        Ok(compiled)
    }

    fn compile_assignments(&self, compiled: &mut CompiledProblem) {
        for assignment in self.problem.assignments().iter() {
            let encoder = &mut compiled.encoder;
            let fulfilled = encoder.new_var();
            let mut slots = HashMap::new();
            for slot in assignment.iter_slots() {
                let literals = match slot.fixed_components() {
                    Some(fixed) => {
                        let mut literals = vec![encoder.false_lit(); self.domain_size(slot)];
                        fixed.iter().for_each(|c| {
                            literals[self.problem.components().get(*c).domain_index()] =
                                encoder.true_lit()
                        });
                        literals
                    }
                    None => {
                        let literals = (0..self.domain_size(slot))
                            .map(|_| encoder.new_var())
                            .collect::<Vec<Literal>>();
                        literals
                            .iter()
                            .for_each(|l| encoder.add_clause(vec![fulfilled, l.negate()]));
                        let occupancy = occupancy_formula(slot, &literals);
                        encoder.assert_guarded(fulfilled, &occupancy);
                        literals
                    }
                };
                slots.insert(slot.name().to_string(), literals);
            }
            if assignment.is_optional() {
                if assignment.weight() > 0 {
                    compiled.soft_terms.push((assignment.weight(), fulfilled));
                }
            } else {
                compiled.encoder.add_clause(vec![fulfilled]);
            }
            compiled.slot_literals.push(slots);
            compiled.fulfillment.push(fulfilled);
        }
    }

    fn domain_size(&self, slot: &ComponentSlot) -> usize {
        self.problem
            .component_types()
            .get(slot.type_id())
            .components()
            .len()
    }

    fn compile_exclusive_types(&self, compiled: &mut CompiledProblem) {
        for component_type in self.problem.component_types().iter() {
            if !component_type.is_exclusive() {
                continue;
            }
            for (domain_index, component) in component_type.components().iter().enumerate() {
                let mut occurrences = Vec::new();
                for assignment in self.problem.assignments().iter() {
                    for slot in assignment.iter_slots() {
                        if slot.type_id() == component_type.id() {
                            let l = compiled.slot_literals[assignment.id()][slot.name()][domain_index];
                            occurrences.push(compiled.literal_formula(l));
                        }
                    }
                }
                let formula = Formula::at_most(1, occurrences);
                if formula.is_constant(true) {
                    continue;
                }
                let selector = compiled.encoder.new_var();
                compiled.encoder.assert_guarded(selector, &formula);
                let label = self.problem.components().get(*component).label().to_string();
                compiled
                    .selectors
                    .push((selector, AssertionTag::Exclusive(label)));
            }
        }
    }

    fn compile_rule(&self, compiled: &mut CompiledProblem, rule: &Rule) -> Result<()> {
        let tuples = self.engine.instantiate(rule);
        if tuples.is_empty()
            && matches!(rule.scope(), Scope::Unrestricted)
            && rule.condition().arity() <= self.problem.assignments().len()
        {
            return Err(SchedError::schema(format!(
                r#"rule "{}" applies to no tuple of assignments"#,
                rule.label()
            )));
        }
        let mut n_trivial = 0;
        for tuple in tuples {
            let formula = compiled.lower(self.problem, rule.condition(), &tuple)?;
            match rule.hardness() {
                Hardness::Hard => {
                    if formula.is_constant(true) {
                        n_trivial += 1;
                        continue;
                    }
                    let selector = compiled.encoder.new_var();
                    compiled.encoder.assert_guarded(selector, &formula);
                    let tuple_labels = tuple
                        .iter()
                        .map(|a| self.problem.assignments().get(*a).label().to_string())
                        .collect();
                    compiled.selectors.push((
                        selector,
                        AssertionTag::Rule {
                            rule: rule.label().to_string(),
                            tuple: tuple_labels,
                        },
                    ));
                }
                Hardness::Soft(weight) => {
                    if weight == 0 || formula.is_constant(true) {
                        n_trivial += 1;
                        continue;
                    }
                    let l = compiled.encoder.encode(&formula);
                    compiled.soft_terms.push((weight, l));
                }
            }
        }
        if n_trivial > 0 {
            debug!(
                "rule {}: {} instantiation(s) hold trivially",
                rule.label(),
                n_trivial
            );
        }
        Ok(())
    }
}

fn occupancy_formula(slot: &ComponentSlot, literals: &[Literal]) -> Formula {
    let lits = || literals.iter().map(|l| Formula::lit(*l)).collect::<Vec<Formula>>();
    let none = || Formula::and(literals.iter().map(|l| Formula::lit(l.negate())).collect());
    match slot.cardinality() {
        Cardinality::Exactly(n) => {
            let exactly = Formula::and(vec![Formula::at_least(n, lits()), Formula::at_most(n, lits())]);
            if slot.is_optional() {
                Formula::or(vec![exactly, none()])
            } else {
                exactly
            }
        }
        Cardinality::OneOrMore if !slot.is_optional() => Formula::at_least(1, lits()),
        Cardinality::OneOrMore | Cardinality::Any => Formula::constant(true),
    }
}

/// A problem compiled into the clauses of a SAT solver.
///
/// Besides the encoder holding the solver, it records the literals of the slots,
/// the fulfillment literals, the selectors of the hard assertions and the soft terms.
pub struct CompiledProblem {
    encoder: CnfEncoder,
    slot_literals: Vec<HashMap<String, Vec<Literal>>>,
    fulfillment: Vec<Literal>,
    selectors: Vec<(Literal, AssertionTag)>,
    soft_terms: Vec<(usize, Literal)>,
}

impl CompiledProblem {
    /// Returns the encoder holding the solver.
    pub fn encoder_mut(&mut self) -> &mut CnfEncoder {
        &mut self.encoder
    }

    /// Returns the encoder holding the solver.
    pub fn encoder(&self) -> &CnfEncoder {
        &self.encoder
    }

    /// Returns the selectors of the hard assertions, with their tags.
    pub fn selectors(&self) -> &[(Literal, AssertionTag)] {
        &self.selectors
    }

    /// Returns the selector literals, to be used as assumptions.
    pub fn selector_literals(&self) -> Vec<Literal> {
        self.selectors.iter().map(|(l, _)| *l).collect()
    }

    /// Returns the soft terms, as pairs of a weight and a literal which is true iff the term is satisfied.
    pub fn soft_terms(&self) -> &[(usize, Literal)] {
        &self.soft_terms
    }

    /// Returns the literal which is true iff the assignment with the given id is fulfilled.
    pub fn fulfillment_literal(&self, assignment_id: usize) -> Literal {
        self.fulfillment[assignment_id]
    }

    /// Returns the literals of a slot, indexed by the domain index of the components, if the slot exists.
    pub fn slot_literals(&self, assignment_id: usize, slot: &str) -> Option<&[Literal]> {
        self.slot_literals
            .get(assignment_id)
            .and_then(|m| m.get(slot))
            .map(|v| v.as_slice())
    }

    /// Returns the literals which values distinguish two models:
    /// the ones of the variable slots and the fulfillment literals.
    pub fn decision_literals(&self) -> Vec<Literal> {
        let constants = [self.encoder.true_lit(), self.encoder.false_lit()];
        let mut literals = self.fulfillment.clone();
        for slots in &self.slot_literals {
            let mut names = slots.keys().collect::<Vec<&String>>();
            names.sort_unstable();
            for name in names {
                literals.extend(slots[name].iter().filter(|l| !constants.contains(l)));
            }
        }
        literals
    }

    /// Returns the cost of a valuation, that is the sum of the weights of its falsified soft terms.
    pub fn cost(&self, valuation: &Valuation) -> usize {
        self.soft_terms
            .iter()
            .filter(|(_, l)| !valuation.is_true(*l))
            .fold(0usize, |acc, (w, _)| acc.saturating_add(*w))
    }

    /// Reads the bindings of each assignment from a valuation.
    ///
    /// The result gives, for each assignment id, the ids of the components bound to each slot.
    pub fn bindings(
        &self,
        problem: &Problem,
        valuation: &Valuation,
    ) -> Vec<BTreeMap<String, Vec<usize>>> {
        problem
            .assignments()
            .iter()
            .map(|assignment| {
                assignment
                    .iter_slots()
                    .map(|slot| {
                        let domain = problem.component_types().get(slot.type_id()).components();
                        let bound = self.slot_literals[assignment.id()][slot.name()]
                            .iter()
                            .enumerate()
                            .filter(|(_, l)| self.literal_value(valuation, **l))
                            .map(|(i, _)| domain[i])
                            .collect();
                        (slot.name().to_string(), bound)
                    })
                    .collect()
            })
            .collect()
    }

    fn literal_value(&self, valuation: &Valuation, l: Literal) -> bool {
        if l == self.encoder.true_lit() {
            true
        } else if l == self.encoder.false_lit() {
            false
        } else {
            valuation.is_true(l)
        }
    }

    fn literal_formula(&self, l: Literal) -> Formula {
        if l == self.encoder.true_lit() {
            Formula::constant(true)
        } else if l == self.encoder.false_lit() {
            Formula::constant(false)
        } else {
            Formula::lit(l)
        }
    }

    fn slot_formulas(&self, problem: &Problem, assignment_id: usize, slot: &str) -> Result<Vec<Formula>> {
        match self.slot_literals(assignment_id, slot) {
            Some(literals) => Ok(literals.iter().map(|l| self.literal_formula(*l)).collect()),
            None => Err(SchedError::schema(format!(
                r#"assignment "{}" has no slot "{}""#,
                problem.assignments().get(assignment_id).label(),
                slot
            ))),
        }
    }

    fn slot_of<'p>(
        &self,
        problem: &'p Problem,
        tuple: &[usize],
        slot_ref: &SlotRef,
    ) -> Result<(usize, &'p ComponentSlot)> {
        let assignment_id = *tuple.get(slot_ref.position()).ok_or_else(|| {
            SchedError::schema(format!(
                "position {} is out of a tuple of length {}",
                slot_ref.position(),
                tuple.len()
            ))
        })?;
        let assignment = problem.assignments().get(assignment_id);
        let slot = assignment.slot(slot_ref.slot()).ok_or_else(|| {
            SchedError::schema(format!(
                r#"assignment "{}" has no slot "{}""#,
                assignment.label(),
                slot_ref.slot()
            ))
        })?;
        Ok((assignment_id, slot))
    }

    fn slot_with_formulas<'p>(
        &self,
        problem: &'p Problem,
        tuple: &[usize],
        slot_ref: &SlotRef,
    ) -> Result<(&'p ComponentSlot, Vec<Formula>)> {
        let (assignment_id, slot) = self.slot_of(problem, tuple, slot_ref)?;
        Ok((slot, self.slot_formulas(problem, assignment_id, slot_ref.slot())?))
    }

    /// Lowers a condition instantiated on a tuple into a formula over the slot literals.
    ///
    /// The formula holds in a valuation iff the condition evaluates to true on the bindings read from this valuation.
    pub fn lower(&self, problem: &Problem, condition: &Condition, tuple: &[usize]) -> Result<Formula> {
        let lower_all = |v: &[std::sync::Arc<Condition>]| -> Result<Vec<Formula>> {
            v.iter().map(|c| self.lower(problem, c, tuple)).collect()
        };
        let slot = |s: &SlotRef| self.slot_with_formulas(problem, tuple, s);
        Ok(match condition {
            Condition::Not(c) => Formula::not(self.lower(problem, c, tuple)?),
            Condition::And(v) => Formula::and(lower_all(v)?),
            Condition::Or(v) => Formula::or(lower_all(v)?),
            Condition::Xor(c1, c2) => Formula::xor(
                self.lower(problem, c1, tuple)?,
                self.lower(problem, c2, tuple)?,
            ),
            Condition::Implies(c1, c2) => Formula::implies(
                self.lower(problem, c1, tuple)?,
                self.lower(problem, c2, tuple)?,
            ),
            Condition::Iff(c1, c2) => Formula::iff(
                self.lower(problem, c1, tuple)?,
                self.lower(problem, c2, tuple)?,
            ),
            Condition::ComponentIs(s, c) => {
                let (slot, mut formulas) = slot(s)?;
                let component = problem.components().get_by_label(c)?;
                if component.type_id() == slot.type_id() {
                    formulas.swap_remove(component.domain_index())
                } else {
                    Formula::constant(false)
                }
            }
            Condition::ComponentIn(s, set) => {
                let (slot, formulas) = slot(s)?;
                let domain = problem.component_types().get(slot.type_id()).components();
                let mut outside = Vec::new();
                for (i, f) in formulas.iter().enumerate() {
                    if !in_component_set(problem, set, domain[i])? {
                        outside.push(Formula::not(f.clone()));
                    }
                }
                Formula::and(vec![Formula::or(formulas), Formula::and(outside)])
            }
            Condition::InGroup(s, g) => {
                let (slot, formulas) = slot(s)?;
                let group_id = problem.groups().id_of(g)?;
                let domain = problem.component_types().get(slot.type_id()).components();
                Formula::or(
                    formulas
                        .into_iter()
                        .enumerate()
                        .filter(|(i, _)| problem.components().get(domain[*i]).in_group(group_id))
                        .map(|(_, f)| f)
                        .collect(),
                )
            }
            Condition::SameComponent(s1, s2) => {
                let (slot_1, formulas_1) = slot(s1)?;
                let (slot_2, formulas_2) = slot(s2)?;
                if slot_1.type_id() == slot_2.type_id() {
                    Formula::and(
                        formulas_1
                            .into_iter()
                            .zip(formulas_2)
                            .map(|(f1, f2)| Formula::iff(f1, f2))
                            .collect(),
                    )
                } else {
                    Formula::and(
                        formulas_1
                            .into_iter()
                            .chain(formulas_2)
                            .map(Formula::not)
                            .collect(),
                    )
                }
            }
            Condition::Distinct(v) => {
                let mut occurrences: BTreeMap<(usize, usize), Vec<Formula>> = BTreeMap::new();
                for s in v {
                    let (slot, formulas) = slot(s)?;
                    for (i, f) in formulas.into_iter().enumerate() {
                        occurrences.entry((slot.type_id(), i)).or_default().push(f);
                    }
                }
                Formula::and(
                    occurrences
                        .into_values()
                        .map(|fs| Formula::at_most(1, fs))
                        .collect(),
                )
            }
            Condition::MaxAssignments(sub, k) => {
                Formula::at_most(*k, self.lower_per_assignment(problem, sub, tuple)?)
            }
            Condition::MinAssignments(sub, k) => {
                Formula::at_least(*k, self.lower_per_assignment(problem, sub, tuple)?)
            }
            Condition::MaxInSequence(sub, k) => {
                let satisfied = self.lower_per_assignment(problem, sub, tuple)?;
                if *k >= satisfied.len() {
                    Formula::constant(true)
                } else {
                    Formula::and(
                        satisfied
                            .windows(*k + 1)
                            .map(|w| Formula::not(Formula::and(w.to_vec())))
                            .collect(),
                    )
                }
            }
        })
    }

    fn lower_per_assignment(
        &self,
        problem: &Problem,
        sub: &Condition,
        tuple: &[usize],
    ) -> Result<Vec<Formula>> {
        let refs = sub.positional_slot_refs();
        tuple
            .iter()
            .map(|a| {
                if refs
                    .iter()
                    .any(|s| problem.assignments().get(*a).slot(s.slot()).is_none())
                {
                    Ok(Formula::constant(false))
                } else {
                    self.lower(problem, sub, &[*a])
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        conditions::ComponentSet,
        model::SlotDefinition,
        sat::{self, SolvingResult},
    };
    use std::sync::Arc;

    fn problem() -> Problem {
        let mut problem = Problem::default();
        problem.new_component_type("Room").unwrap();
        for r in ["R1", "R2", "R3"] {
            problem.new_component(r, "Room").unwrap();
        }
        problem.new_group("Big").unwrap();
        problem.add_to_group("R3", "Big").unwrap();
        for a in ["M1", "M2", "M3"] {
            problem.new_assignment(a).unwrap();
            problem
                .add_slot(a, "room", SlotDefinition::variable("Room", Cardinality::Exactly(1)))
                .unwrap();
        }
        problem
    }

    fn count_models(problem: &Problem, condition: &Condition, tuple: &[usize]) -> usize {
        let compiler = ConstraintCompiler::new(problem);
        let mut compiled = compiler.compile(sat::default_solver()).unwrap();
        let formula = compiled.lower(problem, condition, tuple).unwrap();
        compiled.encoder_mut().assert_formula(&formula);
        let assumptions = compiled.selector_literals();
        let decisions = compiled.decision_literals();
        let mut n = 0;
        loop {
            match compiled
                .encoder_mut()
                .solve_under_assumptions(&assumptions)
                .unwrap()
            {
                SolvingResult::Satisfiable(v) => {
                    let bindings = compiled.bindings(problem, &v);
                    let bound = |a: usize, s: &str| bindings[a].get(s).cloned();
                    assert!(condition.evaluate(problem, tuple, &bound).unwrap());
                    let block = decisions
                        .iter()
                        .map(|l| if v.is_true(*l) { l.negate() } else { *l })
                        .collect();
                    compiled.encoder_mut().add_clause(block);
                    n += 1;
                }
                _ => return n,
            }
        }
    }

    #[test]
    fn test_unconstrained() {
        let problem = problem();
        assert_eq!(27, count_models(&problem, &Condition::And(vec![]), &[]));
    }

    #[test]
    fn test_component_is() {
        let problem = problem();
        let c = Condition::component_is(SlotRef::new(0, "room"), "R1");
        assert_eq!(9, count_models(&problem, &c, &[1]));
    }

    #[test]
    fn test_distinct() {
        let problem = problem();
        let c = Condition::distinct(vec![
            SlotRef::new(0, "room"),
            SlotRef::new(1, "room"),
            SlotRef::new(2, "room"),
        ]);
        assert_eq!(6, count_models(&problem, &c, &[0, 1, 2]));
    }

    #[test]
    fn test_same_component_and_in_group() {
        let problem = problem();
        let c = Condition::and(vec![
            Condition::same_component(SlotRef::new(0, "room"), SlotRef::new(1, "room")),
            Condition::component_in(SlotRef::new(0, "room"), ComponentSet::Group("Big".to_string())),
        ]);
        assert_eq!(3, count_models(&problem, &c, &[0, 2]));
        let c = Condition::not(Condition::in_group(SlotRef::new(0, "room"), "Big"));
        assert_eq!(18, count_models(&problem, &c, &[1]));
    }

    #[test]
    fn test_max_assignments() {
        let problem = problem();
        let c = Condition::max_assignments(Condition::component_is(SlotRef::new(0, "room"), "R1"), 1);
        // 8 models without R1, 3 * 4 with exactly one R1
        assert_eq!(20, count_models(&problem, &c, &[0, 1, 2]));
    }

    #[test]
    fn test_max_in_sequence() {
        let problem = problem();
        let c = Condition::max_in_sequence(Condition::component_is(SlotRef::new(0, "room"), "R1"), 1);
        // forbidden: R1 at (0, 1) or (1, 2)
        assert_eq!(27 - 5, count_models(&problem, &c, &[0, 1, 2]));
        let c = Condition::max_in_sequence(
            Condition::component_is(SlotRef::new(0, "room"), "R1"),
            usize::MAX,
        );
        assert_eq!(27, count_models(&problem, &c, &[0, 1, 2]));
    }

    #[test]
    fn test_soft_weights_too_large() {
        let mut problem = problem();
        for label in ["in_r1", "in_r2"] {
            problem
                .new_restricted_rule(
                    label,
                    Condition::component_is(SlotRef::new(0, "room"), &label[3..].to_uppercase()),
                    Hardness::Soft(usize::MAX),
                    &[&["M1"]],
                )
                .unwrap();
        }
        let compiler = ConstraintCompiler::new(&problem);
        assert!(matches!(
            compiler.compile(sat::default_solver()),
            Err(SchedError::Schema(_))
        ));
    }

    #[test]
    fn test_optional_assignment_and_fixed_slot() {
        let mut problem = Problem::default();
        problem.new_component_type("Room").unwrap();
        problem.new_component("R1", "Room").unwrap();
        problem.new_component("R2", "Room").unwrap();
        problem.new_component_type("Host").unwrap();
        problem.new_component("H1", "Host").unwrap();
        problem.new_assignment("M1").unwrap();
        problem.set_optional("M1", 3).unwrap();
        problem
            .add_slot("M1", "room", SlotDefinition::variable("Room", Cardinality::Exactly(1)))
            .unwrap();
        problem
            .add_slot("M1", "host", SlotDefinition::fixed("Host", &["H1"]))
            .unwrap();
        let compiler = ConstraintCompiler::new(&problem);
        let compiled = compiler.compile(sat::default_solver()).unwrap();
        assert!(compiled.selectors().is_empty());
        assert_eq!(&[(3, compiled.fulfillment_literal(0))], compiled.soft_terms());
        // fulfillment + two room literals
        assert_eq!(3, compiled.decision_literals().len());
        let c = Condition::component_is(SlotRef::new(0, "host"), "H1");
        assert!(compiled.lower(&problem, &c, &[0]).unwrap().is_constant(true));
        // unfulfilled, or fulfilled in one of two rooms
        assert_eq!(3, count_models(&problem, &Condition::And(vec![]), &[]));
    }

    #[test]
    fn test_exclusive_type() {
        let mut problem = problem();
        problem.set_exclusive("Room", true).unwrap();
        let compiler = ConstraintCompiler::new(&problem);
        let compiled = compiler.compile(sat::default_solver()).unwrap();
        assert_eq!(
            3,
            compiled
                .selectors()
                .iter()
                .filter(|(_, t)| matches!(t, AssertionTag::Exclusive(_)))
                .count()
        );
        assert_eq!(6, count_models(&problem, &Condition::And(vec![]), &[]));
    }

    #[test]
    fn test_missing_slot() {
        let problem = problem();
        let compiler = ConstraintCompiler::new(&problem);
        let compiled = compiler.compile(sat::default_solver()).unwrap();
        let c = Condition::component_is(SlotRef::new(0, "host"), "R1");
        assert!(matches!(
            compiled.lower(&problem, &c, &[0]),
            Err(SchedError::Schema(_))
        ));
        let c = Arc::new(Condition::Distinct(vec![SlotRef::new(0, "room"), SlotRef::new(3, "room")]));
        assert!(compiled.lower(&problem, &c, &[0, 1]).is_err());
    }
}
