use crate::error::{Result, SchedError};
use std::collections::HashMap;

/// A trait for the entities stored in a [`Registry`].
///
/// Each entity has a label, which is unique among the entities of its registry,
/// and an identifier given by the registry at insertion time.
pub trait Labeled {
    /// Returns the label of the entity.
    fn label(&self) -> &str;

    /// Returns the identifier of the entity.
    fn id(&self) -> usize;
}

/// An arena of labeled entities indexed by stable integer identifiers.
///
/// The identifier of an entity is its insertion index.
/// Entities are never removed, so identifiers stay valid during the whole life of the registry.
#[derive(Debug)]
pub struct Registry<T>
where
    T: Labeled,
{
    kind: &'static str,
    items: Vec<T>,
    label_to_id: HashMap<String, usize>,
}

impl<T> Registry<T>
where
    T: Labeled,
{
    pub(crate) fn new(kind: &'static str) -> Self {
        Self {
            kind,
            items: Vec::new(),
            label_to_id: HashMap::new(),
        }
    }

    /// Inserts a new entity built from its future identifier.
    ///
    /// An error is returned if an entity with the same label already exists.
    pub(crate) fn insert_with<F>(&mut self, label: &str, builder: F) -> Result<usize>
    where
        F: FnOnce(usize) -> T,
    {
        if label.is_empty() {
            return Err(SchedError::schema(format!("empty {} label", self.kind)));
        }
        if self.label_to_id.contains_key(label) {
            return Err(SchedError::schema(format!(
                r#"{} "{}" is already defined"#,
                self.kind, label
            )));
        }
        let id = self.items.len();
        self.items.push(builder(id));
        self.label_to_id.insert(label.to_string(), id);
        Ok(id)
    }

    /// Returns the identifier of the entity with the given label.
    pub fn id_of(&self, label: &str) -> Result<usize> {
        self.label_to_id
            .get(label)
            .copied()
            .ok_or_else(|| SchedError::schema(format!(r#"no such {}: "{}""#, self.kind, label)))
    }

    /// Returns the entity with the given label.
    pub fn get_by_label(&self, label: &str) -> Result<&T> {
        self.id_of(label).map(|id| &self.items[id])
    }

    pub(crate) fn get_mut_by_label(&mut self, label: &str) -> Result<&mut T> {
        let id = self.id_of(label)?;
        Ok(&mut self.items[id])
    }

    pub(crate) fn get_mut(&mut self, id: usize) -> &mut T {
        &mut self.items[id]
    }

    /// Returns the entity with the given identifier.
    ///
    /// # Panics
    ///
    /// Panics if no entity has such identifier.
    pub fn get(&self, id: usize) -> &T {
        &self.items[id]
    }

    /// Returns the number of entities.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` iff the registry has no entity.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over the entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter()
    }
}
