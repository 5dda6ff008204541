use super::registry::Labeled;
use crate::error::{Result, SchedError};
use std::collections::BTreeMap;
use std::fmt::Display;

/// The number of components a slot requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// Exactly this number of components.
    Exactly(usize),
    /// At least one component, no upper bound.
    OneOrMore,
    /// Any number of components, including zero.
    Any,
}

impl Cardinality {
    /// Returns `true` iff a slot with this cardinality may bind `count` components.
    ///
    /// Slot optionality is not taken into account; see [`ComponentSlot::admits`].
    pub fn admits(&self, count: usize) -> bool {
        match self {
            Cardinality::Exactly(n) => count == *n,
            Cardinality::OneOrMore => count >= 1,
            Cardinality::Any => true,
        }
    }
}

impl Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cardinality::Exactly(n) => write!(f, "{}", n),
            Cardinality::OneOrMore => write!(f, "+"),
            Cardinality::Any => write!(f, "*"),
        }
    }
}

impl TryFrom<&str> for Cardinality {
    type Error = SchedError;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "+" => Ok(Cardinality::OneOrMore),
            "*" => Ok(Cardinality::Any),
            _ => value.parse::<usize>().map(Cardinality::Exactly).map_err(|_| {
                SchedError::schema(format!(r#"undefined cardinality "{}""#, value))
            }),
        }
    }
}

/// The content of a slot: decided by the solver, or fixed at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotContent {
    /// The bound components are decision variables.
    Variable,
    /// The bound components are the given ones (ids), in every model.
    Fixed(Vec<usize>),
}

/// A named placeholder inside an [`Assignment`].
#[derive(Debug, Clone)]
pub struct ComponentSlot {
    name: String,
    type_id: usize,
    cardinality: Cardinality,
    optional: bool,
    content: SlotContent,
}

impl ComponentSlot {
    pub(crate) fn new(
        name: &str,
        type_id: usize,
        cardinality: Cardinality,
        optional: bool,
        content: SlotContent,
    ) -> Self {
        Self {
            name: name.to_string(),
            type_id,
            cardinality,
            optional,
            content,
        }
    }

    /// Returns the name of the slot, unique inside its assignment.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the id of the component type accepted by this slot.
    pub fn type_id(&self) -> usize {
        self.type_id
    }

    /// Returns the cardinality policy of the slot.
    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// Returns `true` iff the slot may stay empty whatever its cardinality.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Returns `true` iff the content of this slot is given at construction time.
    pub fn is_fixed(&self) -> bool {
        matches!(self.content, SlotContent::Fixed(_))
    }

    /// Returns the ids of the fixed components, or `None` for variable slots.
    pub fn fixed_components(&self) -> Option<&[usize]> {
        match &self.content {
            SlotContent::Fixed(components) => Some(components),
            SlotContent::Variable => None,
        }
    }

    /// Returns `true` iff binding `count` components satisfies both the cardinality and the optionality of the slot.
    pub fn admits(&self, count: usize) -> bool {
        (self.optional && count == 0) || self.cardinality.admits(count)
    }
}

/// The definition of a slot, given by labels, as provided by callers when building a [`Problem`](super::Problem).
///
/// # Example
///
/// ```
/// # use schedsat::model::{Cardinality, Problem, SlotDefinition};
/// let mut problem = Problem::default();
/// problem.new_component_type("Room").unwrap();
/// problem.new_component("R1", "Room").unwrap();
/// problem.new_assignment("Meeting").unwrap();
/// problem
///     .add_slot("Meeting", "room", SlotDefinition::variable("Room", Cardinality::Exactly(1)))
///     .unwrap();
/// problem
///     .add_slot("Meeting", "backup", SlotDefinition::fixed("Room", &["R1"]))
///     .unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotDefinition {
    pub(crate) type_label: String,
    pub(crate) cardinality: Cardinality,
    pub(crate) optional: bool,
    pub(crate) fixed: Option<Vec<String>>,
}

impl SlotDefinition {
    /// Defines a slot which content is decided by the solver.
    pub fn variable(type_label: &str, cardinality: Cardinality) -> Self {
        Self {
            type_label: type_label.to_string(),
            cardinality,
            optional: false,
            fixed: None,
        }
    }

    /// Defines a slot bound to the given components.
    ///
    /// The cardinality is set to the number of components; it can be changed by [`with_cardinality`](Self::with_cardinality).
    pub fn fixed(type_label: &str, components: &[&str]) -> Self {
        Self {
            type_label: type_label.to_string(),
            cardinality: Cardinality::Exactly(components.len()),
            optional: false,
            fixed: Some(components.iter().map(|c| c.to_string()).collect()),
        }
    }

    /// Sets the slot optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Sets the cardinality of the slot.
    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }
}

/// A schedulable unit, made of named component slots.
#[derive(Debug, Clone)]
pub struct Assignment {
    id: usize,
    label: String,
    slots: BTreeMap<String, ComponentSlot>,
    optional: bool,
    weight: usize,
}

impl Assignment {
    pub(crate) fn new(id: usize, label: &str) -> Self {
        Self {
            id,
            label: label.to_string(),
            slots: BTreeMap::new(),
            optional: false,
            weight: 0,
        }
    }

    /// Returns the slot with the given name, if any.
    pub fn slot(&self, name: &str) -> Option<&ComponentSlot> {
        self.slots.get(name)
    }

    /// Iterates over the slots, ordered by name.
    pub fn iter_slots(&self) -> impl Iterator<Item = &ComponentSlot> + '_ {
        self.slots.values()
    }

    /// Returns the number of slots.
    pub fn n_slots(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` iff the assignment may stay unfulfilled.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Returns the cost of leaving this assignment unfulfilled (only relevant for optional assignments).
    pub fn weight(&self) -> usize {
        self.weight
    }

    pub(crate) fn set_optional(&mut self, optional: bool, weight: usize) {
        self.optional = optional;
        self.weight = weight;
    }

    pub(crate) fn add_slot(&mut self, slot: ComponentSlot) -> Result<()> {
        if self.slots.contains_key(slot.name()) {
            return Err(SchedError::schema(format!(
                r#"slot "{}" is already defined for assignment "{}""#,
                slot.name(),
                self.label
            )));
        }
        self.slots.insert(slot.name().to_string(), slot);
        Ok(())
    }
}

impl Labeled for Assignment {
    fn label(&self) -> &str {
        &self.label
    }

    fn id(&self) -> usize {
        self.id
    }
}

impl Display for Assignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinality_admits() {
        assert!(Cardinality::Exactly(2).admits(2));
        assert!(!Cardinality::Exactly(2).admits(1));
        assert!(!Cardinality::OneOrMore.admits(0));
        assert!(Cardinality::OneOrMore.admits(7));
        assert!(Cardinality::Any.admits(0));
    }

    #[test]
    fn test_cardinality_from_str() {
        assert_eq!(Cardinality::Exactly(3), Cardinality::try_from("3").unwrap());
        assert_eq!(Cardinality::OneOrMore, Cardinality::try_from("+").unwrap());
        assert_eq!(Cardinality::Any, Cardinality::try_from("*").unwrap());
        assert!(Cardinality::try_from("-1").is_err());
        assert!(Cardinality::try_from("many").is_err());
    }

    #[test]
    fn test_cardinality_display() {
        assert_eq!("3", Cardinality::Exactly(3).to_string());
        assert_eq!("+", Cardinality::OneOrMore.to_string());
        assert_eq!("*", Cardinality::Any.to_string());
    }

    #[test]
    fn test_slot_admits_optional() {
        let slot = ComponentSlot::new("s", 0, Cardinality::Exactly(2), true, SlotContent::Variable);
        assert!(slot.admits(0));
        assert!(!slot.admits(1));
        assert!(slot.admits(2));
        assert!(!slot.is_fixed());
        assert!(slot.fixed_components().is_none());
    }

    #[test]
    fn test_assignment_duplicate_slot() {
        let mut assignment = Assignment::new(0, "a");
        let slot = ComponentSlot::new("s", 0, Cardinality::Any, false, SlotContent::Variable);
        assignment.add_slot(slot.clone()).unwrap();
        assert!(assignment.add_slot(slot).is_err());
        assert_eq!(1, assignment.n_slots());
    }
}
