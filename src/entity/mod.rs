//! Annotated entities: genes, individuals, patients
//!
//! An [`Entity`] is a read-only input to scoring. It owns its direct
//! annotations and the attribute closure derived from them. Both sets are
//! computed once at corpus build time and never change afterwards, which is
//! the caching contract the scorers depend on.
use core::fmt::Debug;
use std::fmt::Display;

use crate::class::{ClassSet, Classes};
use crate::corpus::Corpus;
use crate::DEFAULT_NUM_ANNOTATIONS;

/// An opaque entity identifier, e.g. a gene symbol or sample id
///
/// `EntityId`s compare lexically; batch results are ordered by this.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    inner: Box<str>,
}

impl EntityId {
    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self { inner: s.into() }
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self {
            inner: s.into_boxed_str(),
        }
    }
}

impl Debug for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EntityId({})", self.inner)
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl PartialEq<str> for EntityId {
    fn eq(&self, other: &str) -> bool {
        &*self.inner == other
    }
}

/// Internal record of an annotated entity
#[derive(Debug)]
pub(crate) struct EntityInternal {
    id: EntityId,
    annotations: ClassSet,
    closure: ClassSet,
}

impl EntityInternal {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            annotations: ClassSet::with_capacity(DEFAULT_NUM_ANNOTATIONS),
            closure: ClassSet::new(),
        }
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn annotations(&self) -> &ClassSet {
        &self.annotations
    }

    pub fn annotations_mut(&mut self) -> &mut ClassSet {
        &mut self.annotations
    }

    pub fn closure(&self) -> &ClassSet {
        &self.closure
    }

    pub fn closure_mut(&mut self) -> &mut ClassSet {
        &mut self.closure
    }
}

/// A single annotated entity, borrowed from a [`Corpus`]
#[derive(Debug, Clone, Copy)]
pub struct Entity<'a> {
    internal: &'a EntityInternal,
    corpus: &'a Corpus,
}

impl<'a> Entity<'a> {
    pub(crate) fn new(corpus: &'a Corpus, internal: &'a EntityInternal) -> Self {
        Entity { internal, corpus }
    }

    /// Returns the identifier of the entity
    pub fn id(&self) -> &'a EntityId {
        self.internal.id()
    }

    /// Returns the indices of the classes the entity is directly annotated to
    pub fn annotation_idxs(&self) -> &'a ClassSet {
        self.internal.annotations()
    }

    /// Returns the full attribute closure: every class the entity is
    /// directly or transitively annotated to
    pub fn closure_idxs(&self) -> &'a ClassSet {
        self.internal.closure()
    }

    /// Returns an iterator over the directly annotated classes
    pub fn annotations(&self) -> Classes<'a> {
        Classes::new(self.internal.annotations(), self.corpus)
    }

    /// Returns an iterator over the attribute closure
    pub fn closure(&self) -> Classes<'a> {
        Classes::new(self.internal.closure(), self.corpus)
    }

    /// Returns the number of direct annotations
    pub fn len(&self) -> usize {
        self.internal.annotations().len()
    }

    /// Returns `true` if the entity has no annotations
    ///
    /// Such entities score 0 against any partner, they are not an error.
    pub fn is_empty(&self) -> bool {
        self.internal.annotations().is_empty()
    }
}

impl PartialEq for Entity<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Entity<'_> {}
