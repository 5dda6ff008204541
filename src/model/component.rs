use super::registry::Labeled;
use std::collections::BTreeSet;
use std::fmt::Display;

/// A finite pool of interchangeable components, like "Room" or "Employee".
///
/// Components of different types are never comparable.
/// When a type is exclusive, each of its components may be bound at most once in a model,
/// whatever the slot and the assignment.
#[derive(Debug, Clone)]
pub struct ComponentType {
    id: usize,
    label: String,
    components: Vec<usize>,
    exclusive: bool,
}

impl ComponentType {
    pub(crate) fn new(id: usize, label: &str) -> Self {
        Self {
            id,
            label: label.to_string(),
            components: Vec::new(),
            exclusive: false,
        }
    }

    /// Returns the ids of the components of this type, in registration order.
    ///
    /// The position of a component in this slice is its index in the type domain.
    pub fn components(&self) -> &[usize] {
        &self.components
    }

    /// Returns `true` iff the components of this type may be bound at most once.
    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    pub(crate) fn set_exclusive(&mut self, exclusive: bool) {
        self.exclusive = exclusive;
    }

    pub(crate) fn push_component(&mut self, component_id: usize) -> usize {
        self.components.push(component_id);
        self.components.len() - 1
    }
}

impl Labeled for ComponentType {
    fn label(&self) -> &str {
        &self.label
    }

    fn id(&self) -> usize {
        self.id
    }
}

impl Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// A component, belonging to exactly one [`ComponentType`] and to any number of [`Group`]s.
#[derive(Debug, Clone)]
pub struct Component {
    id: usize,
    label: String,
    type_id: usize,
    domain_index: usize,
    groups: BTreeSet<usize>,
}

impl Component {
    pub(crate) fn new(id: usize, label: &str, type_id: usize, domain_index: usize) -> Self {
        Self {
            id,
            label: label.to_string(),
            type_id,
            domain_index,
            groups: BTreeSet::new(),
        }
    }

    /// Returns the id of the type of this component.
    pub fn type_id(&self) -> usize {
        self.type_id
    }

    /// Returns the index of this component among the components of its type.
    pub fn domain_index(&self) -> usize {
        self.domain_index
    }

    /// Returns `true` iff this component belongs to the group with the given id.
    pub fn in_group(&self, group_id: usize) -> bool {
        self.groups.contains(&group_id)
    }

    /// Iterates over the ids of the groups this component belongs to.
    pub fn iter_groups(&self) -> impl Iterator<Item = usize> + '_ {
        self.groups.iter().copied()
    }

    pub(crate) fn join_group(&mut self, group_id: usize) -> bool {
        self.groups.insert(group_id)
    }
}

impl Labeled for Component {
    fn label(&self) -> &str {
        &self.label
    }

    fn id(&self) -> usize {
        self.id
    }
}

impl Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// A named set of components, used by membership predicates.
///
/// Groups are not typed: they may contain components of several types.
/// Membership is stored on the components.
#[derive(Debug, Clone)]
pub struct Group {
    id: usize,
    label: String,
}

impl Group {
    pub(crate) fn new(id: usize, label: &str) -> Self {
        Self {
            id,
            label: label.to_string(),
        }
    }
}

impl Labeled for Group {
    fn label(&self) -> &str {
        &self.label
    }

    fn id(&self) -> usize {
        self.id
    }
}

impl Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}
