use crate::sat::Literal;

/// A propositional formula over SAT literals, with cardinality constraints.
///
/// Formulas are built through the associated functions of this type, which simplify constants away:
/// a formula built this way is either a constant or contains no constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Formula {
    /// A constant.
    Const(bool),
    /// A literal.
    Lit(Literal),
    /// A negation.
    Not(Box<Formula>),
    /// A conjunction (at least two operands).
    And(Vec<Formula>),
    /// A disjunction (at least two operands).
    Or(Vec<Formula>),
    /// At least `k` operands are true.
    AtLeast(usize, Vec<Formula>),
    /// At most `k` operands are true.
    AtMost(usize, Vec<Formula>),
}

impl Formula {
    /// Builds a constant.
    pub fn constant(b: bool) -> Self {
        Formula::Const(b)
    }

    /// Builds a literal formula.
    pub fn lit(l: Literal) -> Self {
        Formula::Lit(l)
    }

    /// Builds the negation of a formula.
    #[allow(clippy::should_implement_trait)]
    pub fn not(f: Formula) -> Self {
        match f {
            Formula::Const(b) => Formula::Const(!b),
            Formula::Lit(l) => Formula::Lit(l.negate()),
            Formula::Not(g) => *g,
            _ => Formula::Not(Box::new(f)),
        }
    }

    /// Builds the conjunction of formulas; an empty conjunction is true.
    pub fn and(operands: Vec<Formula>) -> Self {
        Self::n_ary(operands, true)
    }

    /// Builds the disjunction of formulas; an empty disjunction is false.
    pub fn or(operands: Vec<Formula>) -> Self {
        Self::n_ary(operands, false)
    }

    fn n_ary(operands: Vec<Formula>, is_and: bool) -> Self {
        let mut kept = Vec::with_capacity(operands.len());
        for f in operands {
            match f {
                Formula::Const(b) if b == is_and => {}
                Formula::Const(_) => return Formula::Const(!is_and),
                Formula::And(mut v) if is_and => kept.append(&mut v),
                Formula::Or(mut v) if !is_and => kept.append(&mut v),
                _ => kept.push(f),
            }
        }
        match kept.len() {
            0 => Formula::Const(is_and),
            1 => kept.pop().unwrap_or(Formula::Const(is_and)),
            _ if is_and => Formula::And(kept),
            _ => Formula::Or(kept),
        }
    }

    /// Builds an implication.
    pub fn implies(antecedent: Formula, consequent: Formula) -> Self {
        Self::or(vec![Self::not(antecedent), consequent])
    }

    /// Builds an equivalence, as the conjunction of both implications.
    pub fn iff(f1: Formula, f2: Formula) -> Self {
        Self::and(vec![
            Self::implies(f1.clone(), f2.clone()),
            Self::implies(f2, f1),
        ])
    }

    /// Builds an exclusive disjunction.
    pub fn xor(f1: Formula, f2: Formula) -> Self {
        Self::or(vec![
            Self::and(vec![f1.clone(), Self::not(f2.clone())]),
            Self::and(vec![Self::not(f1), f2]),
        ])
    }

    /// Builds a formula which is true iff at least `k` operands are true.
    pub fn at_least(k: usize, operands: Vec<Formula>) -> Self {
        let (n_true, rest) = Self::split_constants(operands);
        if n_true >= k {
            return Formula::Const(true);
        }
        let k = k - n_true;
        if k > rest.len() {
            Formula::Const(false)
        } else if k == 1 {
            Self::or(rest)
        } else if k == rest.len() {
            Self::and(rest)
        } else {
            Formula::AtLeast(k, rest)
        }
    }

    /// Builds a formula which is true iff at most `k` operands are true.
    pub fn at_most(k: usize, operands: Vec<Formula>) -> Self {
        let (n_true, rest) = Self::split_constants(operands);
        if n_true > k {
            return Formula::Const(false);
        }
        let k = k - n_true;
        if k >= rest.len() {
            Formula::Const(true)
        } else if k == 0 {
            Self::and(rest.into_iter().map(Self::not).collect())
        } else if k + 1 == rest.len() {
            Self::not(Self::and(rest))
        } else {
            Formula::AtMost(k, rest)
        }
    }

    fn split_constants(operands: Vec<Formula>) -> (usize, Vec<Formula>) {
        let mut n_true = 0;
        let mut rest = Vec::with_capacity(operands.len());
        for f in operands {
            match f {
                Formula::Const(true) => n_true += 1,
                Formula::Const(false) => {}
                _ => rest.push(f),
            }
        }
        (n_true, rest)
    }

    /// Returns `true` iff this formula is the given constant.
    pub fn is_constant(&self, b: bool) -> bool {
        *self == Formula::Const(b)
    }
}
