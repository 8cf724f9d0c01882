use std::collections::HashMap;

use crate::class::ClassInternal;
use crate::entity::EntityInternal;
use crate::{ClassId, ClassIdx, EntityId};

/// Dense storage for class records
///
/// Classes live in a flat `Vec` indexed by [`ClassIdx`]; the map resolves
/// public [`ClassId`]s to indices. Indices are assigned by the corpus
/// builder in lexical id order and never change afterwards.
#[derive(Debug, Default)]
pub(crate) struct ClassArena {
    classes: Vec<ClassInternal>,
    by_id: HashMap<ClassId, ClassIdx>,
}

impl ClassArena {
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Appends a class record, returning its dense index
    pub fn push(&mut self, class: ClassInternal) -> ClassIdx {
        let idx = ClassIdx::from(self.classes.len());
        self.by_id.insert(class.id().clone(), idx);
        self.classes.push(class);
        idx
    }

    pub fn get(&self, idx: ClassIdx) -> Option<&ClassInternal> {
        self.classes.get(idx.to_usize())
    }

    pub fn get_mut(&mut self, idx: ClassIdx) -> Option<&mut ClassInternal> {
        self.classes.get_mut(idx.to_usize())
    }

    pub fn index_of(&self, id: &ClassId) -> Option<ClassIdx> {
        self.by_id.get(id).copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ClassInternal> {
        self.classes.iter()
    }
}

/// Dense storage for entity records, mirroring [`ClassArena`]
#[derive(Debug, Default)]
pub(crate) struct EntityArena {
    entities: Vec<EntityInternal>,
    by_id: HashMap<EntityId, usize>,
}

impl EntityArena {
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn push(&mut self, entity: EntityInternal) -> usize {
        let idx = self.entities.len();
        self.by_id.insert(entity.id().clone(), idx);
        self.entities.push(entity);
        idx
    }

    pub fn get(&self, idx: usize) -> Option<&EntityInternal> {
        self.entities.get(idx)
    }

    pub fn by_id(&self, id: &EntityId) -> Option<&EntityInternal> {
        self.by_id.get(id).map(|idx| &self.entities[*idx])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EntityInternal> {
        self.entities.iter()
    }
}
