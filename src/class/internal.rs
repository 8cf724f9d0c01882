use crate::class::{ClassId, ClassSet};
use crate::{DEFAULT_NUM_ANCESTORS, DEFAULT_NUM_PARENTS};

/// Internal record of a single ontology class
///
/// Holds the data the arena stores per class. Clients only ever see the
/// borrowed [`crate::Class`] view.
#[derive(Debug)]
pub(crate) struct ClassInternal {
    id: ClassId,
    label: String,
    parents: ClassSet,
    ancestors: ClassSet,
    frequency: u64,
}

impl ClassInternal {
    pub fn new(id: ClassId, label: String) -> ClassInternal {
        ClassInternal {
            id,
            label,
            parents: ClassSet::with_capacity(DEFAULT_NUM_PARENTS),
            ancestors: ClassSet::with_capacity(DEFAULT_NUM_ANCESTORS),
            frequency: 0,
        }
    }

    pub fn id(&self) -> &ClassId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn parents(&self) -> &ClassSet {
        &self.parents
    }

    pub fn parents_mut(&mut self) -> &mut ClassSet {
        &mut self.parents
    }

    /// The reflexive-transitive ancestor closure, including the class itself
    pub fn ancestors(&self) -> &ClassSet {
        &self.ancestors
    }

    pub fn ancestors_mut(&mut self) -> &mut ClassSet {
        &mut self.ancestors
    }

    /// Number of corpus entities whose closure contains this class
    pub fn frequency(&self) -> u64 {
        self.frequency
    }

    pub fn frequency_mut(&mut self) -> &mut u64 {
        &mut self.frequency
    }
}

impl PartialEq for ClassInternal {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ClassInternal {}
