use super::Formula;
use crate::{
    error::Result,
    sat::{Literal, SatSolver, SolvingResult},
};
use std::collections::HashMap;

/// A SAT solver session together with the encoding of formulas into its clauses.
///
/// The encoder owns the solver and the counter of variables: each encoder allocates its own variables,
/// starting from 1.
/// Variable 1 is forced to true and is used to express constants.
///
/// Formulas are encoded with the Tseitin transformation: each subformula is given a literal
/// equivalent to it. Cardinality constraints are encoded with totalizers.
/// The literals of encoded subformulas are cached, so that equal subformulas share their literal.
pub struct CnfEncoder {
    solver: Box<dyn SatSolver>,
    n_vars: usize,
    n_clauses: usize,
    true_lit: Literal,
    memo: HashMap<Formula, Literal>,
}

impl CnfEncoder {
    /// Builds an encoder on top of an empty solver.
    pub fn new(solver: Box<dyn SatSolver>) -> Self {
        let mut encoder = Self {
            solver,
            n_vars: 0,
            n_clauses: 0,
            true_lit: Literal::from(1),
            memo: HashMap::new(),
        };
        let true_lit = encoder.new_var();
        encoder.true_lit = true_lit;
        encoder.add_clause(vec![true_lit]);
        encoder
    }

    /// Allocates a new variable and returns its positive literal.
    pub fn new_var(&mut self) -> Literal {
        self.n_vars += 1;
        self.solver.reserve(self.n_vars);
        Literal::from(self.n_vars as isize)
    }

    /// Returns the literal which is always true.
    pub fn true_lit(&self) -> Literal {
        self.true_lit
    }

    /// Returns the literal which is always false.
    pub fn false_lit(&self) -> Literal {
        self.true_lit.negate()
    }

    /// Returns the literal of a constant.
    pub fn const_lit(&self, b: bool) -> Literal {
        if b {
            self.true_lit()
        } else {
            self.false_lit()
        }
    }

    /// Returns the number of variables allocated so far.
    pub fn n_vars(&self) -> usize {
        self.n_vars
    }

    /// Returns the number of clauses added so far.
    pub fn n_clauses(&self) -> usize {
        self.n_clauses
    }

    /// Adds a clause to the underlying solver.
    pub fn add_clause(&mut self, cl: Vec<Literal>) {
        self.n_clauses += 1;
        self.solver.add_clause(cl);
    }

    /// Asserts a formula.
    pub fn assert_formula(&mut self, f: &Formula) {
        match f {
            Formula::Const(true) => {}
            Formula::And(v) => v.iter().for_each(|g| self.assert_formula(g)),
            Formula::Or(v) if v.iter().all(|g| matches!(g, Formula::Lit(_))) => {
                let cl = v
                    .iter()
                    .filter_map(|g| match g {
                        Formula::Lit(l) => Some(*l),
                        _ => None,
                    })
                    .collect();
                self.add_clause(cl)
            }
            _ => {
                let l = self.encode(f);
                self.add_clause(vec![l]);
            }
        }
    }

    /// Asserts a formula under a guard: the formula must hold when the guard is true.
    pub fn assert_guarded(&mut self, guard: Literal, f: &Formula) {
        match f {
            Formula::Const(true) => {}
            Formula::And(v) => v.iter().for_each(|g| self.assert_guarded(guard, g)),
            Formula::Or(v) if v.iter().all(|g| matches!(g, Formula::Lit(_))) => {
                let mut cl = Vec::with_capacity(v.len() + 1);
                cl.push(guard.negate());
                v.iter().for_each(|g| {
                    if let Formula::Lit(l) = g {
                        cl.push(*l)
                    }
                });
                self.add_clause(cl)
            }
            _ => {
                let l = self.encode(f);
                self.add_clause(vec![guard.negate(), l]);
            }
        }
    }

    /// Returns a literal equivalent to the formula, adding the clauses defining it if needed.
    pub fn encode(&mut self, f: &Formula) -> Literal {
        match f {
            Formula::Const(b) => return self.const_lit(*b),
            Formula::Lit(l) => return *l,
            Formula::Not(g) => return self.encode(g).negate(),
            _ => {}
        }
        if let Some(l) = self.memo.get(f) {
            return *l;
        }
        let l = match f {
            Formula::And(v) => {
                let lits = v.iter().map(|g| self.encode(g)).collect::<Vec<Literal>>();
                self.encode_and(&lits)
            }
            Formula::Or(v) => {
                let lits = v.iter().map(|g| self.encode(g)).collect::<Vec<Literal>>();
                self.encode_and(&lits.iter().map(|l| l.negate()).collect::<Vec<Literal>>())
                    .negate()
            }
            Formula::AtLeast(k, v) => {
                let lits = v.iter().map(|g| self.encode(g)).collect::<Vec<Literal>>();
                self.encode_at_least(*k, &lits)
            }
            Formula::AtMost(k, v) => {
                let lits = v.iter().map(|g| self.encode(g)).collect::<Vec<Literal>>();
                self.encode_at_least(*k + 1, &lits).negate()
            }
            Formula::Const(_) | Formula::Lit(_) | Formula::Not(_) => unreachable!(),
        };
        self.memo.insert(f.clone(), l);
        l
    }

    fn encode_and(&mut self, lits: &[Literal]) -> Literal {
        let y = self.new_var();
        let mut long_clause = Vec::with_capacity(lits.len() + 1);
        long_clause.push(y);
        for l in lits {
            self.add_clause(vec![y.negate(), *l]);
            long_clause.push(l.negate());
        }
        self.add_clause(long_clause);
        y
    }

    fn encode_at_least(&mut self, k: usize, lits: &[Literal]) -> Literal {
        if k == 0 {
            return self.true_lit();
        }
        if k > lits.len() {
            return self.false_lit();
        }
        self.totalizer(lits)[k - 1]
    }

    /// Builds a totalizer over the literals.
    ///
    /// The `j`-th output literal (0-based) is true iff at least `j + 1` input literals are true.
    pub fn totalizer(&mut self, lits: &[Literal]) -> Vec<Literal> {
        if lits.len() <= 1 {
            return lits.to_vec();
        }
        let (left, right) = lits.split_at(lits.len() / 2);
        let a = self.totalizer(left);
        let b = self.totalizer(right);
        let (p, q) = (a.len(), b.len());
        let r = (0..p + q).map(|_| self.new_var()).collect::<Vec<Literal>>();
        for i in 0..=p {
            for j in 0..=q {
                if i + j > 0 {
                    let mut cl = Vec::with_capacity(3);
                    if i > 0 {
                        cl.push(a[i - 1].negate());
                    }
                    if j > 0 {
                        cl.push(b[j - 1].negate());
                    }
                    cl.push(r[i + j - 1]);
                    self.add_clause(cl);
                }
                if i + j < p + q {
                    let mut cl = Vec::with_capacity(3);
                    if i < p {
                        cl.push(a[i]);
                    }
                    if j < q {
                        cl.push(b[j]);
                    }
                    cl.push(r[i + j].negate());
                    self.add_clause(cl);
                }
            }
        }
        r
    }

    /// Returns a literal which, when true, bounds the weighted sum of true literals by `bound`.
    ///
    /// The terms are pairs made of a weight and a literal.
    /// The encoding is a decision diagram over the terms, which nodes are shared when they represent the same
    /// (remaining terms, remaining bound) pair.
    pub fn weighted_at_most(&mut self, terms: &[(usize, Literal)], bound: usize) -> Literal {
        let mut suffix_sums = vec![0u128; terms.len() + 1];
        for i in (0..terms.len()).rev() {
            suffix_sums[i] = suffix_sums[i + 1] + terms[i].0 as u128;
        }
        let mut memo = HashMap::new();
        self.weighted_node(terms, &suffix_sums, 0, bound, &mut memo)
    }

    fn weighted_node(
        &mut self,
        terms: &[(usize, Literal)],
        suffix_sums: &[u128],
        i: usize,
        bound: usize,
        memo: &mut HashMap<(usize, usize), Literal>,
    ) -> Literal {
        if suffix_sums[i] <= bound as u128 {
            return self.true_lit();
        }
        if let Some(l) = memo.get(&(i, bound)) {
            return *l;
        }
        let (w, l) = terms[i];
        let y = self.new_var();
        let low = self.weighted_node(terms, suffix_sums, i + 1, bound, memo);
        self.add_clause(vec![y.negate(), low]);
        if w > bound {
            self.add_clause(vec![y.negate(), l.negate()]);
        } else {
            let high = self.weighted_node(terms, suffix_sums, i + 1, bound - w, memo);
            self.add_clause(vec![y.negate(), l.negate(), high]);
        }
        memo.insert((i, bound), y);
        y
    }

    /// Solves the clauses added so far under assumptions.
    pub fn solve_under_assumptions(&mut self, assumptions: &[Literal]) -> Result<SolvingResult> {
        self.solver.solve_under_assumptions(assumptions)
    }

    /// Returns the underlying solver.
    pub fn solver_mut(&mut self) -> &mut dyn SatSolver {
        self.solver.as_mut()
    }
}
