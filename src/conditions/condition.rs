use crate::error::{Result, SchedError};
use std::sync::Arc;

/// The kinds of condition nodes.
///
/// The string representation of a kind is the keyword used by the textual syntax of conditions.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::AsRefStr,
    strum_macros::Display,
    strum_macros::EnumIter,
    strum_macros::EnumString,
)]
#[strum(serialize_all = "kebab-case")]
pub enum ConditionType {
    /// Negation.
    Not,
    /// Conjunction.
    And,
    /// Disjunction.
    Or,
    /// Exclusive disjunction.
    Xor,
    /// Implication.
    Implies,
    /// Equivalence.
    Iff,
    /// A component is bound to a slot.
    ComponentIs,
    /// A slot only binds components from a set.
    ComponentIn,
    /// Two slots bind the same components.
    SameComponent,
    /// Slots share no component.
    Distinct,
    /// A slot binds a component of a group.
    InGroup,
    /// Upper bound on the number of assignments satisfying a condition.
    MaxAssignments,
    /// Lower bound on the number of assignments satisfying a condition.
    MinAssignments,
    /// Upper bound on the length of runs of consecutive assignments satisfying a condition.
    MaxInSequence,
}

impl ConditionType {
    /// Returns `true` iff nodes of this kind count assignments.
    pub fn is_aggregate(&self) -> bool {
        matches!(
            self,
            ConditionType::MaxAssignments
                | ConditionType::MinAssignments
                | ConditionType::MaxInSequence
        )
    }
}

/// A reference to a slot of the assignment at some position of the tuple a condition is instantiated on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotRef {
    position: usize,
    slot: String,
}

impl SlotRef {
    /// Builds a reference to the slot `slot` of the assignment at position `position`.
    pub fn new(position: usize, slot: &str) -> Self {
        Self {
            position,
            slot: slot.to_string(),
        }
    }

    /// Returns the position of the assignment in the tuple.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the slot name.
    pub fn slot(&self) -> &str {
        &self.slot
    }
}

impl std::fmt::Display for SlotRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.position, self.slot)
    }
}

impl TryFrom<&str> for SlotRef {
    type Error = SchedError;

    fn try_from(value: &str) -> Result<Self> {
        let malformed = || SchedError::schema(format!(r#"malformed slot reference "{}""#, value));
        let (position, slot) = value.split_once('.').ok_or_else(malformed)?;
        let position = position.parse::<usize>().map_err(|_| malformed())?;
        if slot.is_empty() {
            return Err(malformed());
        }
        Ok(SlotRef::new(position, slot))
    }
}

/// A set of components, given by a type, a group, or an explicit list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentSet {
    /// The components of a type.
    Type(String),
    /// The components of a group.
    Group(String),
    /// The listed components.
    Components(Vec<String>),
}

impl std::fmt::Display for ComponentSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComponentSet::Type(t) => write!(f, "(type {})", t),
            ComponentSet::Group(g) => write!(f, "(group {})", g),
            ComponentSet::Components(v) => write!(f, "(components {})", v.join(" ")),
        }
    }
}

/// A node of a condition tree.
///
/// Conditions are built once, then shared through [`Arc`]s by the rules that use them.
/// The constructors of this type directly return such shared pointers.
///
/// Domain predicates refer to slots by [`SlotRef`]s, that is by the position of an assignment in a tuple
/// and a slot name.
/// The tuple is given when the condition is instantiated.
/// The sub-conditions of counting predicates (max/min assignments, max in sequence) are unary:
/// they are evaluated on each assignment of the tuple, which is at position 0 for them.
///
/// The [`Display`](std::fmt::Display) implementation writes conditions as s-expressions.
///
/// ```
/// # use schedsat::conditions::{Condition, SlotRef};
/// let c = Condition::and(vec![
///     Condition::component_is(SlotRef::new(0, "room"), "R1"),
///     Condition::distinct(vec![SlotRef::new(0, "room"), SlotRef::new(1, "room")]),
/// ]);
/// assert_eq!("(and (component-is 0.room R1) (distinct 0.room 1.room))", c.to_string());
/// assert_eq!(2, c.arity());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Negation.
    Not(Arc<Condition>),
    /// Conjunction.
    And(Vec<Arc<Condition>>),
    /// Disjunction.
    Or(Vec<Arc<Condition>>),
    /// Exclusive disjunction.
    Xor(Arc<Condition>, Arc<Condition>),
    /// Implication (antecedent, consequent).
    Implies(Arc<Condition>, Arc<Condition>),
    /// Equivalence.
    Iff(Arc<Condition>, Arc<Condition>),
    /// The component is bound to the slot.
    ComponentIs(SlotRef, String),
    /// The slot is not empty and only binds components from the set.
    ComponentIn(SlotRef, ComponentSet),
    /// Both slots bind exactly the same components.
    SameComponent(SlotRef, SlotRef),
    /// No component is bound to two of the slots.
    Distinct(Vec<SlotRef>),
    /// The slot binds at least one component of the group.
    InGroup(SlotRef, String),
    /// At most `k` assignments of the tuple satisfy the sub-condition.
    MaxAssignments(Arc<Condition>, usize),
    /// At least `k` assignments of the tuple satisfy the sub-condition.
    MinAssignments(Arc<Condition>, usize),
    /// No more than `k` consecutive assignments of the tuple satisfy the sub-condition.
    MaxInSequence(Arc<Condition>, usize),
}

impl Condition {
    /// Builds the negation of a condition.
    pub fn not(child: Arc<Condition>) -> Arc<Condition> {
        Arc::new(Condition::Not(child))
    }

    /// Builds the conjunction of conditions.
    pub fn and(children: Vec<Arc<Condition>>) -> Arc<Condition> {
        Arc::new(Condition::And(children))
    }

    /// Builds the disjunction of conditions.
    pub fn or(children: Vec<Arc<Condition>>) -> Arc<Condition> {
        Arc::new(Condition::Or(children))
    }

    /// Builds the exclusive disjunction of two conditions.
    pub fn xor(c1: Arc<Condition>, c2: Arc<Condition>) -> Arc<Condition> {
        Arc::new(Condition::Xor(c1, c2))
    }

    /// Builds an implication.
    pub fn implies(antecedent: Arc<Condition>, consequent: Arc<Condition>) -> Arc<Condition> {
        Arc::new(Condition::Implies(antecedent, consequent))
    }

    /// Builds an equivalence.
    pub fn iff(c1: Arc<Condition>, c2: Arc<Condition>) -> Arc<Condition> {
        Arc::new(Condition::Iff(c1, c2))
    }

    /// Builds a predicate requiring a component to be bound to a slot.
    pub fn component_is(slot: SlotRef, component: &str) -> Arc<Condition> {
        Arc::new(Condition::ComponentIs(slot, component.to_string()))
    }

    /// Builds a predicate requiring a slot to be non-empty and to bind components from a set only.
    pub fn component_in(slot: SlotRef, set: ComponentSet) -> Arc<Condition> {
        Arc::new(Condition::ComponentIn(slot, set))
    }

    /// Builds a predicate requiring two slots to bind the same components.
    pub fn same_component(slot_a: SlotRef, slot_b: SlotRef) -> Arc<Condition> {
        Arc::new(Condition::SameComponent(slot_a, slot_b))
    }

    /// Builds a predicate requiring slots to share no component.
    pub fn distinct(slots: Vec<SlotRef>) -> Arc<Condition> {
        Arc::new(Condition::Distinct(slots))
    }

    /// Builds a predicate requiring a slot to bind a component of a group.
    pub fn in_group(slot: SlotRef, group: &str) -> Arc<Condition> {
        Arc::new(Condition::InGroup(slot, group.to_string()))
    }

    /// Builds a predicate bounding above the number of assignments satisfying a unary condition.
    pub fn max_assignments(sub: Arc<Condition>, k: usize) -> Arc<Condition> {
        Arc::new(Condition::MaxAssignments(sub, k))
    }

    /// Builds a predicate bounding below the number of assignments satisfying a unary condition.
    pub fn min_assignments(sub: Arc<Condition>, k: usize) -> Arc<Condition> {
        Arc::new(Condition::MinAssignments(sub, k))
    }

    /// Builds a predicate bounding above the runs of consecutive assignments satisfying a unary condition.
    pub fn max_in_sequence(sub: Arc<Condition>, k: usize) -> Arc<Condition> {
        Arc::new(Condition::MaxInSequence(sub, k))
    }

    /// Returns the kind of this node.
    pub fn condition_type(&self) -> ConditionType {
        match self {
            Condition::Not(_) => ConditionType::Not,
            Condition::And(_) => ConditionType::And,
            Condition::Or(_) => ConditionType::Or,
            Condition::Xor(_, _) => ConditionType::Xor,
            Condition::Implies(_, _) => ConditionType::Implies,
            Condition::Iff(_, _) => ConditionType::Iff,
            Condition::ComponentIs(_, _) => ConditionType::ComponentIs,
            Condition::ComponentIn(_, _) => ConditionType::ComponentIn,
            Condition::SameComponent(_, _) => ConditionType::SameComponent,
            Condition::Distinct(_) => ConditionType::Distinct,
            Condition::InGroup(_, _) => ConditionType::InGroup,
            Condition::MaxAssignments(_, _) => ConditionType::MaxAssignments,
            Condition::MinAssignments(_, _) => ConditionType::MinAssignments,
            Condition::MaxInSequence(_, _) => ConditionType::MaxInSequence,
        }
    }

    /// Returns the direct children of this node.
    ///
    /// The sub-condition of a counting predicate is its only child.
    pub fn children(&self) -> Vec<&Arc<Condition>> {
        match self {
            Condition::Not(c)
            | Condition::MaxAssignments(c, _)
            | Condition::MinAssignments(c, _)
            | Condition::MaxInSequence(c, _) => vec![c],
            Condition::And(v) | Condition::Or(v) => v.iter().collect(),
            Condition::Xor(c1, c2) | Condition::Implies(c1, c2) | Condition::Iff(c1, c2) => {
                vec![c1, c2]
            }
            _ => vec![],
        }
    }

    /// Returns the slots directly referenced by this node (empty for non-leaf nodes).
    pub fn slot_refs(&self) -> Vec<&SlotRef> {
        match self {
            Condition::ComponentIs(s, _)
            | Condition::ComponentIn(s, _)
            | Condition::InGroup(s, _) => vec![s],
            Condition::SameComponent(s1, s2) => vec![s1, s2],
            Condition::Distinct(v) => v.iter().collect(),
            _ => vec![],
        }
    }

    /// Returns the slots referenced by this tree, excluding the ones of counting sub-conditions.
    ///
    /// These are the references which positions are positions in the instantiation tuple.
    pub fn positional_slot_refs(&self) -> Vec<&SlotRef> {
        let mut refs = self.slot_refs();
        if !self.condition_type().is_aggregate() {
            self.children()
                .into_iter()
                .for_each(|c| refs.append(&mut c.positional_slot_refs()));
        }
        refs
    }

    /// Returns the number of assignments this condition is instantiated on.
    ///
    /// This is one more than the highest position referenced outside counting predicates,
    /// or zero if there is no such reference.
    pub fn arity(&self) -> usize {
        self.positional_slot_refs()
            .iter()
            .map(|s| s.position().saturating_add(1))
            .max()
            .unwrap_or(0)
    }

    /// Returns `true` iff this tree contains a counting predicate.
    pub fn contains_aggregate(&self) -> bool {
        self.condition_type().is_aggregate() || self.children().iter().any(|c| c.contains_aggregate())
    }

    /// Calls a function on each node of the tree, in prefix order, counting sub-conditions included.
    pub fn for_each_node<F>(&self, f: &mut F)
    where
        F: FnMut(&Condition),
    {
        f(self);
        self.children().into_iter().for_each(|c| c.for_each_node(f));
    }

    /// Checks the structure of the tree, independently of any problem.
    ///
    /// Conjunctions and disjunctions need at least one operand, `distinct` at least two slots,
    /// explicit component sets at least one component.
    /// Counting sub-conditions must be unary and must not contain counting predicates.
    pub fn validate_structure(&self) -> Result<()> {
        match self {
            Condition::And(v) | Condition::Or(v) if v.is_empty() => {
                return Err(SchedError::schema(format!(
                    "{} requires at least one operand",
                    self.condition_type()
                )))
            }
            Condition::Distinct(v) if v.len() < 2 => {
                return Err(SchedError::schema(
                    "distinct requires at least two slots".to_string(),
                ))
            }
            Condition::ComponentIn(_, ComponentSet::Components(v)) if v.is_empty() => {
                return Err(SchedError::schema(
                    "empty component set in component-in".to_string(),
                ))
            }
            Condition::MaxAssignments(sub, _)
            | Condition::MinAssignments(sub, _)
            | Condition::MaxInSequence(sub, _) => {
                if sub.contains_aggregate() {
                    return Err(SchedError::schema(format!(
                        "nested counting predicate in {}",
                        self.condition_type()
                    )));
                }
                if sub.arity() > 1 {
                    return Err(SchedError::schema(format!(
                        "the sub-condition of {} must only refer to position 0, got {}",
                        self.condition_type(),
                        sub
                    )));
                }
            }
            _ => {}
        }
        self.children()
            .into_iter()
            .try_for_each(|c| c.validate_structure())
    }

    /// Returns a copy of this tree where each tuple position `p` is replaced by `mapping[p]`.
    ///
    /// Counting sub-conditions are left untouched.
    pub(crate) fn remap_positions(&self, mapping: &[usize]) -> Condition {
        let remap_ref = |s: &SlotRef| SlotRef::new(mapping[s.position()], s.slot());
        let remap_child = |c: &Arc<Condition>| Arc::new(c.remap_positions(mapping));
        match self {
            Condition::Not(c) => Condition::Not(remap_child(c)),
            Condition::And(v) => Condition::And(v.iter().map(remap_child).collect()),
            Condition::Or(v) => Condition::Or(v.iter().map(remap_child).collect()),
            Condition::Xor(c1, c2) => Condition::Xor(remap_child(c1), remap_child(c2)),
            Condition::Implies(c1, c2) => Condition::Implies(remap_child(c1), remap_child(c2)),
            Condition::Iff(c1, c2) => Condition::Iff(remap_child(c1), remap_child(c2)),
            Condition::ComponentIs(s, c) => Condition::ComponentIs(remap_ref(s), c.clone()),
            Condition::ComponentIn(s, set) => Condition::ComponentIn(remap_ref(s), set.clone()),
            Condition::SameComponent(s1, s2) => {
                Condition::SameComponent(remap_ref(s1), remap_ref(s2))
            }
            Condition::Distinct(v) => Condition::Distinct(v.iter().map(remap_ref).collect()),
            Condition::InGroup(s, g) => Condition::InGroup(remap_ref(s), g.clone()),
            Condition::MaxAssignments(_, _)
            | Condition::MinAssignments(_, _)
            | Condition::MaxInSequence(_, _) => self.clone(),
        }
    }

    /// Returns a textual form of this tree which is invariant under the reordering of commutative operands.
    ///
    /// Two conditions with the same canonical form are logically equivalent.
    pub fn canonical(&self) -> String {
        let sorted = |mut v: Vec<String>| {
            v.sort_unstable();
            v.join(" ")
        };
        let kw = self.condition_type();
        match self {
            Condition::And(v) | Condition::Or(v) => {
                format!("({} {})", kw, sorted(v.iter().map(|c| c.canonical()).collect()))
            }
            Condition::Xor(c1, c2) | Condition::Iff(c1, c2) => {
                format!("({} {})", kw, sorted(vec![c1.canonical(), c2.canonical()]))
            }
            Condition::SameComponent(s1, s2) => {
                format!("({} {})", kw, sorted(vec![s1.to_string(), s2.to_string()]))
            }
            Condition::Distinct(v) => {
                format!("({} {})", kw, sorted(v.iter().map(|s| s.to_string()).collect()))
            }
            Condition::ComponentIn(s, ComponentSet::Components(v)) => {
                format!("({} {} (components {}))", kw, s, sorted(v.clone()))
            }
            Condition::Not(c) => format!("({} {})", kw, c.canonical()),
            Condition::Implies(c1, c2) => {
                format!("({} {} {})", kw, c1.canonical(), c2.canonical())
            }
            Condition::MaxAssignments(c, k)
            | Condition::MinAssignments(c, k)
            | Condition::MaxInSequence(c, k) => format!("({} {} {})", kw, k, c.canonical()),
            _ => self.to_string(),
        }
    }

    /// Writes this condition, replacing tuple positions by the labels of the assignments of a tuple.
    ///
    /// Positions without label are written `?`.
    ///
    /// ```
    /// # use schedsat::conditions::{Condition, SlotRef};
    /// let c = Condition::distinct(vec![SlotRef::new(0, "room"), SlotRef::new(1, "room")]);
    /// assert_eq!("(distinct M1.room M2.room)", c.describe(&["M1", "M2"]));
    /// ```
    pub fn describe(&self, tuple_labels: &[&str]) -> String {
        self.render(&|s: &SlotRef| {
            format!(
                "{}.{}",
                tuple_labels.get(s.position()).copied().unwrap_or("?"),
                s.slot()
            )
        })
    }

    fn render(&self, slot_name: &dyn Fn(&SlotRef) -> String) -> String {
        let kw = self.condition_type();
        match self {
            Condition::Not(c) => format!("({} {})", kw, c.render(slot_name)),
            Condition::And(v) | Condition::Or(v) => format!(
                "({} {})",
                kw,
                v.iter()
                    .map(|c| c.render(slot_name))
                    .collect::<Vec<String>>()
                    .join(" ")
            ),
            Condition::Xor(c1, c2) | Condition::Implies(c1, c2) | Condition::Iff(c1, c2) => {
                format!("({} {} {})", kw, c1.render(slot_name), c2.render(slot_name))
            }
            Condition::ComponentIs(s, c) => format!("({} {} {})", kw, slot_name(s), c),
            Condition::ComponentIn(s, set) => format!("({} {} {})", kw, slot_name(s), set),
            Condition::SameComponent(s1, s2) => {
                format!("({} {} {})", kw, slot_name(s1), slot_name(s2))
            }
            Condition::Distinct(v) => format!(
                "({} {})",
                kw,
                v.iter().map(slot_name).collect::<Vec<String>>().join(" ")
            ),
            Condition::InGroup(s, g) => format!("({} {} {})", kw, slot_name(s), g),
            Condition::MaxAssignments(c, k)
            | Condition::MinAssignments(c, k)
            | Condition::MaxInSequence(c, k) => format!("({} {} {})", kw, k, c),
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render(&|s: &SlotRef| s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    fn room(position: usize) -> SlotRef {
        SlotRef::new(position, "room")
    }

    #[test]
    fn test_keywords() {
        assert_eq!("component-is", ConditionType::ComponentIs.as_ref());
        assert_eq!(
            ConditionType::MaxInSequence,
            ConditionType::from_str("max-in-sequence").unwrap()
        );
        assert!(ConditionType::from_str("maybe").is_err());
        assert_eq!(
            3,
            ConditionType::iter().filter(|t| t.is_aggregate()).count()
        );
    }

    #[test]
    fn test_slot_ref_from_str() {
        assert_eq!(room(2), SlotRef::try_from("2.room").unwrap());
        assert!(SlotRef::try_from("room").is_err());
        assert!(SlotRef::try_from("a.room").is_err());
        assert!(SlotRef::try_from("0.").is_err());
    }

    #[test]
    fn test_display() {
        let c = Condition::implies(
            Condition::in_group(room(0), "Big"),
            Condition::not(Condition::component_in(
                room(1),
                ComponentSet::Components(vec!["R1".to_string(), "R2".to_string()]),
            )),
        );
        assert_eq!(
            "(implies (in-group 0.room Big) (not (component-in 1.room (components R1 R2))))",
            c.to_string()
        );
        let c = Condition::max_assignments(Condition::component_is(SlotRef::new(0, "host"), "E1"), 2);
        assert_eq!("(max-assignments 2 (component-is 0.host E1))", c.to_string());
    }

    #[test]
    fn test_arity() {
        assert_eq!(1, Condition::component_is(room(0), "R1").arity());
        assert_eq!(
            3,
            Condition::or(vec![
                Condition::component_is(room(0), "R1"),
                Condition::same_component(room(0), room(2)),
            ])
            .arity()
        );
        let aggregate = Condition::min_assignments(Condition::component_is(room(0), "R1"), 1);
        assert_eq!(0, aggregate.arity());
        assert!(aggregate.contains_aggregate());
        let mixed = Condition::and(vec![aggregate, Condition::component_is(room(1), "R2")]);
        assert_eq!(2, mixed.arity());
        assert!(mixed.contains_aggregate());
        assert_eq!(usize::MAX, Condition::component_is(room(usize::MAX), "R1").arity());
    }

    #[test]
    fn test_shared_subtrees() {
        let shared = Condition::component_is(room(0), "R1");
        let c1 = Condition::not(Arc::clone(&shared));
        let c2 = Condition::or(vec![Arc::clone(&shared), Condition::in_group(room(0), "Big")]);
        assert_eq!(3, Arc::strong_count(&shared));
        assert!(Arc::ptr_eq(c1.children()[0], c2.children()[0]));
    }

    #[test]
    fn test_validate_structure() {
        assert!(Condition::and(vec![]).validate_structure().is_err());
        assert!(Condition::distinct(vec![room(0)]).validate_structure().is_err());
        assert!(Condition::max_assignments(Condition::same_component(room(0), room(1)), 1)
            .validate_structure()
            .is_err());
        assert!(Condition::max_in_sequence(
            Condition::max_assignments(Condition::component_is(room(0), "R1"), 1),
            1
        )
        .validate_structure()
        .is_err());
        assert!(Condition::not(Condition::or(vec![Condition::component_is(room(0), "R1")]))
            .validate_structure()
            .is_ok());
    }

    #[test]
    fn test_canonical_commutative() {
        let c1 = Condition::and(vec![
            Condition::distinct(vec![room(0), room(1)]),
            Condition::component_is(room(0), "R1"),
        ]);
        let c2 = Condition::and(vec![
            Condition::component_is(room(0), "R1"),
            Condition::distinct(vec![room(1), room(0)]),
        ]);
        assert_eq!(c1.canonical(), c2.canonical());
        let i1 = Condition::implies(
            Condition::component_is(room(0), "R1"),
            Condition::component_is(room(1), "R1"),
        );
        let i2 = Condition::implies(
            Condition::component_is(room(1), "R1"),
            Condition::component_is(room(0), "R1"),
        );
        assert_ne!(i1.canonical(), i2.canonical());
    }

    #[test]
    fn test_remap_positions() {
        let c = Condition::distinct(vec![room(0), room(1)]);
        let swapped = c.remap_positions(&[1, 0]);
        assert_eq!("(distinct 1.room 0.room)", swapped.to_string());
        assert_eq!(c.canonical(), swapped.canonical());
    }

    #[test]
    fn test_describe() {
        let c = Condition::same_component(room(0), room(2));
        assert_eq!("(same-component M1.room ?.room)", c.describe(&["M1", "M2"]));
    }
}
