use super::{
    registry::{Labeled, Registry},
    Assignment, Component, ComponentSlot, ComponentType, Group, SlotContent, SlotDefinition,
};
use crate::{
    conditions::Condition,
    error::{Result, SchedError},
    rules::{self, Hardness, Rule, Scope},
};
use std::sync::Arc;

/// A component-to-slot scheduling problem.
///
/// The problem owns the component types, the components, the groups, the assignments and the rules.
/// Entities are registered by label; the registration methods return the identifier given to the new entity.
/// Everything a rule references (components, groups, types, slots) must be registered before the rule,
/// since rules are validated at registration time.
///
/// Once built, a problem is handed read-only to a [`ScheduleSolver`](crate::solvers::ScheduleSolver).
///
/// # Example
///
/// ```
/// # use schedsat::conditions::{Condition, SlotRef};
/// # use schedsat::model::{Cardinality, Problem, SlotDefinition};
/// # use schedsat::rules::Hardness;
/// let mut problem = Problem::default();
/// problem.new_component_type("Room").unwrap();
/// problem.new_component("R1", "Room").unwrap();
/// problem.new_component("R2", "Room").unwrap();
/// problem.new_assignment("Meeting").unwrap();
/// problem
///     .add_slot("Meeting", "room", SlotDefinition::variable("Room", Cardinality::Exactly(1)))
///     .unwrap();
/// problem
///     .new_rule(
///         "in_r1",
///         Condition::component_is(SlotRef::new(0, "room"), "R1"),
///         Hardness::Hard,
///     )
///     .unwrap();
/// assert_eq!(1, problem.rules().len());
/// ```
#[derive(Debug)]
pub struct Problem {
    component_types: Registry<ComponentType>,
    components: Registry<Component>,
    groups: Registry<Group>,
    assignments: Registry<Assignment>,
    rules: Registry<Rule>,
}

impl Default for Problem {
    fn default() -> Self {
        Self {
            component_types: Registry::new("component type"),
            components: Registry::new("component"),
            groups: Registry::new("group"),
            assignments: Registry::new("assignment"),
            rules: Registry::new("rule"),
        }
    }
}

impl Problem {
    /// Registers a new component type.
    pub fn new_component_type(&mut self, label: &str) -> Result<usize> {
        self.component_types
            .insert_with(label, |id| ComponentType::new(id, label))
    }

    /// Sets whether the components of a type may be bound at most once in a model.
    pub fn set_exclusive(&mut self, type_label: &str, exclusive: bool) -> Result<()> {
        self.component_types
            .get_mut_by_label(type_label)?
            .set_exclusive(exclusive);
        Ok(())
    }

    /// Registers a new component of an existing type.
    pub fn new_component(&mut self, label: &str, type_label: &str) -> Result<usize> {
        let type_id = self.component_types.id_of(type_label)?;
        let domain_index = self.component_types.get(type_id).components().len();
        let id = self
            .components
            .insert_with(label, |id| Component::new(id, label, type_id, domain_index))?;
        self.component_types.get_mut(type_id).push_component(id);
        Ok(id)
    }

    /// Registers a new, empty group.
    pub fn new_group(&mut self, label: &str) -> Result<usize> {
        self.groups.insert_with(label, |id| Group::new(id, label))
    }

    /// Adds a component to a group.
    ///
    /// Adding a component twice to the same group has no effect.
    pub fn add_to_group(&mut self, component_label: &str, group_label: &str) -> Result<()> {
        let group_id = self.groups.id_of(group_label)?;
        self.components
            .get_mut_by_label(component_label)?
            .join_group(group_id);
        Ok(())
    }

    /// Registers a new assignment, without slots.
    pub fn new_assignment(&mut self, label: &str) -> Result<usize> {
        self.assignments
            .insert_with(label, |id| Assignment::new(id, label))
    }

    /// Makes an assignment optional; leaving it unfulfilled costs `weight`.
    pub fn set_optional(&mut self, assignment_label: &str, weight: usize) -> Result<()> {
        self.assignments
            .get_mut_by_label(assignment_label)?
            .set_optional(true, weight);
        Ok(())
    }

    /// Adds a slot to an assignment.
    ///
    /// The type of the slot must exist.
    /// For fixed slots, the components must exist, have the slot type, be pairwise distinct,
    /// and their number must satisfy the cardinality of the slot.
    pub fn add_slot(
        &mut self,
        assignment_label: &str,
        slot_name: &str,
        definition: SlotDefinition,
    ) -> Result<()> {
        if slot_name.is_empty() {
            return Err(SchedError::schema(format!(
                r#"empty slot name for assignment "{}""#,
                assignment_label
            )));
        }
        let assignment_id = self.assignments.id_of(assignment_label)?;
        let type_id = self.component_types.id_of(&definition.type_label)?;
        let content = match &definition.fixed {
            None => SlotContent::Variable,
            Some(labels) => {
                SlotContent::Fixed(self.fixed_slot_content(slot_name, type_id, labels, &definition)?)
            }
        };
        let slot = ComponentSlot::new(
            slot_name,
            type_id,
            definition.cardinality,
            definition.optional,
            content,
        );
        self.assignments.get_mut(assignment_id).add_slot(slot)
    }

    fn fixed_slot_content(
        &self,
        slot_name: &str,
        type_id: usize,
        labels: &[String],
        definition: &SlotDefinition,
    ) -> Result<Vec<usize>> {
        let mut ids = Vec::with_capacity(labels.len());
        for label in labels {
            let component = self.components.get_by_label(label)?;
            if component.type_id() != type_id {
                return Err(SchedError::schema(format!(
                    r#"component "{}" has type "{}" but slot "{}" requires type "{}""#,
                    label,
                    self.component_types.get(component.type_id()).label(),
                    slot_name,
                    definition.type_label
                )));
            }
            if ids.contains(&component.id()) {
                return Err(SchedError::schema(format!(
                    r#"component "{}" appears twice in fixed slot "{}""#,
                    label, slot_name
                )));
            }
            ids.push(component.id());
        }
        let admitted = (definition.optional && ids.is_empty())
            || definition.cardinality.admits(ids.len());
        if !admitted {
            return Err(SchedError::schema(format!(
                r#"fixed slot "{}" holds {} component(s), which violates its cardinality {}"#,
                slot_name,
                ids.len(),
                definition.cardinality
            )));
        }
        Ok(ids)
    }

    /// Registers a rule which applies to every applicable tuple of assignments.
    pub fn new_rule(
        &mut self,
        label: &str,
        condition: Arc<Condition>,
        hardness: Hardness,
    ) -> Result<usize> {
        self.register_rule(label, condition, Scope::Unrestricted, hardness)
    }

    /// Registers a rule which applies to the given tuples of assignments only.
    ///
    /// Each tuple is given by assignment labels, ordered by the positions used in the condition.
    pub fn new_restricted_rule(
        &mut self,
        label: &str,
        condition: Arc<Condition>,
        hardness: Hardness,
        tuples: &[&[&str]],
    ) -> Result<usize> {
        let id_tuples = tuples
            .iter()
            .map(|t| {
                t.iter()
                    .map(|a| self.assignments.id_of(a))
                    .collect::<Result<Vec<usize>>>()
            })
            .collect::<Result<Vec<Vec<usize>>>>()?;
        self.register_rule(label, condition, Scope::Restricted(id_tuples), hardness)
    }

    fn register_rule(
        &mut self,
        label: &str,
        condition: Arc<Condition>,
        scope: Scope,
        hardness: Hardness,
    ) -> Result<usize> {
        rules::check_rule(self, label, &condition, &scope, hardness)?;
        self.rules
            .insert_with(label, |id| Rule::new(id, label, condition, scope, hardness))
    }

    /// Returns the component types.
    pub fn component_types(&self) -> &Registry<ComponentType> {
        &self.component_types
    }

    /// Returns the components.
    pub fn components(&self) -> &Registry<Component> {
        &self.components
    }

    /// Returns the groups.
    pub fn groups(&self) -> &Registry<Group> {
        &self.groups
    }

    /// Returns the assignments.
    pub fn assignments(&self) -> &Registry<Assignment> {
        &self.assignments
    }

    /// Returns the rules.
    pub fn rules(&self) -> &Registry<Rule> {
        &self.rules
    }
}
