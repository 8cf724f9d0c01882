use core::fmt::Debug;

use crate::class::{Class, ClassInternal};
use crate::entity::Entity;
use crate::ic::IcModel;
use crate::similarity::ElementPairScores;
use crate::{ClassId, ClassIdx, ClassSet, EntityId, SimError, SimResult};

mod arena;
mod builder;

use arena::{ClassArena, EntityArena};
pub use builder::CorpusBuilder;

/// The narrow seam between scoring and whatever owns the ontology graph
///
/// The scorers only ever need one thing from a reasoner, closure table or
/// graph database: the reflexive-transitive ancestor set of a class. Any
/// backend implementing this trait can drive the group-wise scorer;
/// [`Corpus`] implements it from its precomputed closures.
///
/// Implementations must be deterministic for a fixed ontology snapshot.
pub trait ClosureProvider {
    /// Returns the ancestor closure of a class, including the class itself,
    /// or `None` if the class is unknown to the provider
    fn ancestors_reflexive(&self, class: ClassIdx) -> Option<&ClassSet>;
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// An immutable ontology-annotation corpus, ready for scoring
///
/// The `Corpus` holds every class with its precomputed ancestor closure,
/// every entity with its attribute closure, and the information-content
/// model derived from the annotation frequencies. It is created through
/// [`CorpusBuilder`] and never changes afterwards; scoring runs only read
/// it, so sharing one corpus across threads needs no synchronization.
///
/// ```mermaid
/// graph TD
///     feed[ontology + annotation feed] --> builder[CorpusBuilder]
///     builder -->|closures, frequencies, IC| corpus[Corpus]
///     corpus --> pair["pair_scores()"]
///     corpus --> matrix[ScoreMatrixBuilder]
///     corpus --> entropy["entropy()"]
/// ```
///
/// # Examples
///
/// ```
/// use owlsim::CorpusBuilder;
///
/// let mut builder = CorpusBuilder::new();
/// builder.add_class("T:0", "root");
/// builder.add_class("T:1", "child");
/// builder.add_edge("T:1", "T:0");
/// builder.add_annotation("sample", "T:1");
///
/// let corpus = builder.build().unwrap();
/// let class = corpus.class_by_id(&"T:1".into()).unwrap();
/// assert_eq!(class.label(), "child");
/// assert_eq!(class.frequency(), 1);
/// ```
pub struct Corpus {
    classes: ClassArena,
    entities: EntityArena,
    ic: IcModel,
}

impl Debug for Corpus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Corpus with {} classes and {} entities",
            self.classes.len(),
            self.entities.len()
        )
    }
}

impl Corpus {
    pub(crate) fn new(classes: ClassArena, entities: EntityArena, ic: IcModel) -> Self {
        Self {
            classes,
            entities,
            ic,
        }
    }

    /// Returns the number of ontology classes
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// Returns the number of annotated entities
    pub fn num_entities(&self) -> usize {
        self.entities.len()
    }

    /// Returns the class at the given dense index
    pub fn class(&self, idx: ClassIdx) -> Option<Class<'_>> {
        self.classes
            .get(idx)
            .map(|internal| Class::new(self, idx, internal))
    }

    /// Returns the class with the given identifier
    pub fn class_by_id(&self, id: &ClassId) -> Option<Class<'_>> {
        self.classes.index_of(id).and_then(|idx| self.class(idx))
    }

    /// Returns an iterator over all classes, in lexical id order
    pub fn classes(&self) -> impl Iterator<Item = Class<'_>> {
        self.classes
            .iter()
            .enumerate()
            .map(|(pos, internal)| Class::new(self, ClassIdx::from(pos), internal))
    }

    /// Returns the entity with the given identifier
    pub fn entity_by_id(&self, id: &EntityId) -> Option<Entity<'_>> {
        self.entities
            .by_id(id)
            .map(|internal| Entity::new(self, internal))
    }

    /// Returns an iterator over all entities, in lexical id order
    pub fn entities(&self) -> impl Iterator<Item = Entity<'_>> {
        self.entities
            .iter()
            .map(|internal| Entity::new(self, internal))
    }

    /// Returns the information-content model of the corpus
    pub fn ic_model(&self) -> &IcModel {
        &self.ic
    }

    /// Returns the annotation entropy of the corpus, or of a class subset
    ///
    /// See [`IcModel::entropy_of`]; an empty subset has entropy `0.0`.
    pub fn entropy(&self, subset: Option<&ClassSet>) -> f64 {
        match subset {
            Some(classes) => self.ic.entropy_of(classes),
            None => self.ic.entropy(),
        }
    }

    /// Computes the full similarity score bag for two entities
    ///
    /// # Errors
    ///
    /// [`SimError::UnknownEntity`] if either id is not part of the corpus.
    pub fn pair_scores(&self, a: &str, b: &str) -> SimResult<ElementPairScores> {
        let a_id = EntityId::from(a);
        let b_id = EntityId::from(b);
        let a_entity = self
            .entities
            .by_id(&a_id)
            .ok_or_else(|| SimError::UnknownEntity(a_id.clone()))?;
        let b_entity = self
            .entities
            .by_id(&b_id)
            .ok_or_else(|| SimError::UnknownEntity(b_id.clone()))?;

        Ok(ElementPairScores::compute(
            a_id,
            b_id,
            a_entity.closure(),
            b_entity.closure(),
            a_entity.annotations(),
            b_entity.annotations(),
            self,
            &self.ic,
        ))
    }
}

impl ClosureProvider for Corpus {
    fn ancestors_reflexive(&self, class: ClassIdx) -> Option<&ClassSet> {
        self.classes.get(class).map(ClassInternal::ancestors)
    }
}
