//! Ontology classes, their identifiers and sets of them
use core::fmt::Debug;
use std::fmt::Display;

use crate::corpus::Corpus;

mod group;
mod internal;

pub use group::{ClassSet, ClassSetIter};
pub(crate) use internal::ClassInternal;

/// An opaque ontology class identifier, e.g. `GO:0008150` or `HP:0000118`
///
/// `ClassId`s compare lexically. The scorers use that ordering for all
/// documented tie-breaks, so results are reproducible across runs.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId {
    inner: Box<str>,
}

impl ClassId {
    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl From<&str> for ClassId {
    fn from(s: &str) -> Self {
        Self { inner: s.into() }
    }
}

impl From<String> for ClassId {
    fn from(s: String) -> Self {
        Self {
            inner: s.into_boxed_str(),
        }
    }
}

impl Debug for ClassId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ClassId({})", self.inner)
    }
}

impl Display for ClassId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl PartialEq<str> for ClassId {
    fn eq(&self, other: &str) -> bool {
        &*self.inner == other
    }
}

/// Dense index of a class within one [`Corpus`]
///
/// Indices are assigned at corpus build time in lexical [`ClassId`] order,
/// so comparing two `ClassIdx` values of the same corpus is equivalent to
/// comparing their class ids. An index is only meaningful for the corpus
/// that produced it.
#[derive(Copy, Clone, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ClassIdx {
    inner: u32,
}

impl ClassIdx {
    pub(crate) fn to_usize(self) -> usize {
        self.inner as usize
    }
}

impl From<u32> for ClassIdx {
    fn from(inner: u32) -> Self {
        Self { inner }
    }
}

impl From<usize> for ClassIdx {
    fn from(n: usize) -> Self {
        Self {
            inner: u32::try_from(n).expect("class index exceeds u32"),
        }
    }
}

impl Debug for ClassIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ClassIdx({})", self.inner)
    }
}

impl Display for ClassIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

/// A single ontology class, borrowed from a [`Corpus`]
///
/// The view resolves relationship and information-content data through the
/// corpus it was created from.
#[derive(Debug, Clone, Copy)]
pub struct Class<'a> {
    idx: ClassIdx,
    internal: &'a ClassInternal,
    corpus: &'a Corpus,
}

impl<'a> Class<'a> {
    pub(crate) fn new(corpus: &'a Corpus, idx: ClassIdx, internal: &'a ClassInternal) -> Self {
        Class {
            idx,
            internal,
            corpus,
        }
    }

    /// Returns the dense index of the class within its corpus
    pub fn idx(&self) -> ClassIdx {
        self.idx
    }

    /// Returns the identifier of the class, e.g. `GO:0008150`
    pub fn id(&self) -> &'a ClassId {
        self.internal.id()
    }

    /// Returns the human-readable label of the class
    pub fn label(&self) -> &'a str {
        self.internal.label()
    }

    /// Returns the indices of the direct parents
    pub fn parent_idxs(&self) -> &'a ClassSet {
        self.internal.parents()
    }

    /// Returns the reflexive-transitive ancestor closure, including `self`
    pub fn ancestor_idxs(&self) -> &'a ClassSet {
        self.internal.ancestors()
    }

    /// Returns an iterator over the direct parent classes
    pub fn parents(&self) -> Classes<'a> {
        Classes::new(self.internal.parents(), self.corpus)
    }

    /// Returns an iterator over all ancestors, including `self`
    pub fn ancestors(&self) -> Classes<'a> {
        Classes::new(self.internal.ancestors(), self.corpus)
    }

    /// Returns the number of corpus entities annotated to this class
    /// (directly or through a descendant)
    pub fn frequency(&self) -> u64 {
        self.internal.frequency()
    }

    /// Returns the information content, or `None` if the class is never
    /// annotated in the corpus
    pub fn ic(&self) -> Option<f64> {
        self.corpus.ic_model().ic(self.idx)
    }

    /// Returns `true` if `self` is an ancestor of `other` (or the same class)
    pub fn ancestor_of(&self, other: &Class) -> bool {
        other.ancestor_idxs().contains(self.idx)
    }

    /// Returns `true` if `self` is a descendant of `other` (or the same class)
    pub fn descendant_of(&self, other: &Class) -> bool {
        other.ancestor_of(self)
    }
}

impl PartialEq for Class<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.idx == other.idx
    }
}

impl Eq for Class<'_> {}

/// Iterates the [`Class`]es of a [`ClassSet`]
pub struct Classes<'a> {
    inner: ClassSetIter<'a>,
    corpus: &'a Corpus,
}

impl<'a> Classes<'a> {
    pub(crate) fn new(group: &'a ClassSet, corpus: &'a Corpus) -> Self {
        Classes {
            inner: group.into_iter(),
            corpus,
        }
    }
}

impl<'a> Iterator for Classes<'a> {
    type Item = Class<'a>;
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|idx| {
            self.corpus
                .class(idx)
                .expect("class sets only hold indices of their own corpus")
        })
    }
}
