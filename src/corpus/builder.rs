use std::collections::BTreeMap;

use tracing::debug;

use crate::class::ClassInternal;
use crate::corpus::arena::{ClassArena, EntityArena};
use crate::corpus::Corpus;
use crate::entity::EntityInternal;
use crate::ic::IcModel;
use crate::{ClassId, ClassIdx, ClassSet, EntityId, SimError, SimResult};

/// Builds a [`Corpus`] from classes, hierarchy edges and annotations
///
/// The builder is the programmatic feed of the crate: whatever tooling owns
/// the ontology and annotation files (OBO/OWL parsers, GAF readers, a
/// database) pushes its data in here. All referential checks are deferred to
/// [`build`](CorpusBuilder::build), so feeding does not have to happen in
/// topological order.
///
/// Dense [`ClassIdx`] values are assigned in lexical [`ClassId`] order at
/// build time. All downstream tie-breaks depend on this.
///
/// # Examples
///
/// ```
/// use owlsim::CorpusBuilder;
///
/// let mut builder = CorpusBuilder::new();
/// builder.add_class("HP:0000001", "All");
/// builder.add_class("HP:0000118", "Phenotypic abnormality");
/// builder.add_edge("HP:0000118", "HP:0000001");
/// builder.add_annotation("patient-1", "HP:0000118");
///
/// let corpus = builder.build().unwrap();
/// assert_eq!(corpus.num_classes(), 2);
/// assert_eq!(corpus.num_entities(), 1);
/// ```
#[derive(Debug, Default)]
pub struct CorpusBuilder {
    classes: BTreeMap<ClassId, String>,
    edges: Vec<(ClassId, ClassId)>,
    entities: BTreeMap<EntityId, Vec<ClassId>>,
}

impl CorpusBuilder {
    /// Constructs a new, empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an ontology class with its human-readable label
    ///
    /// Re-registering an existing class keeps the first label.
    pub fn add_class(&mut self, id: impl Into<ClassId>, label: impl Into<String>) {
        self.classes.entry(id.into()).or_insert_with(|| label.into());
    }

    /// Registers a hierarchy edge: `child` is-a / part-of `parent`
    pub fn add_edge(&mut self, child: impl Into<ClassId>, parent: impl Into<ClassId>) {
        self.edges.push((child.into(), parent.into()));
    }

    /// Registers an entity without annotations
    ///
    /// Entities are also created implicitly by
    /// [`add_annotation`](CorpusBuilder::add_annotation); this exists for
    /// subjects that legitimately carry no annotations and must still be
    /// part of the corpus.
    pub fn add_entity(&mut self, id: impl Into<EntityId>) {
        self.entities.entry(id.into()).or_default();
    }

    /// Annotates an entity with an ontology class
    pub fn add_annotation(&mut self, entity: impl Into<EntityId>, class: impl Into<ClassId>) {
        self.entities
            .entry(entity.into())
            .or_default()
            .push(class.into());
    }

    /// Finalizes the corpus
    ///
    /// Assigns dense indices, derives every ancestor closure and entity
    /// closure, counts annotation frequencies and computes the
    /// information-content model.
    ///
    /// # Errors
    ///
    /// - [`SimError::UnknownClass`] if an edge or annotation references a
    ///   class that was never registered
    /// - [`SimError::CyclicHierarchy`] if the class hierarchy is not a DAG
    pub fn build(self) -> SimResult<Corpus> {
        let mut classes = ClassArena::default();
        for (id, label) in self.classes {
            classes.push(ClassInternal::new(id, label));
        }

        for (child, parent) in &self.edges {
            let child_idx = classes
                .index_of(child)
                .ok_or_else(|| SimError::UnknownClass(child.clone()))?;
            let parent_idx = classes
                .index_of(parent)
                .ok_or_else(|| SimError::UnknownClass(parent.clone()))?;
            classes
                .get_mut(child_idx)
                .expect("index from arena lookup")
                .parents_mut()
                .insert(parent_idx);
        }

        compute_closures(&mut classes)?;

        let mut entities = EntityArena::default();
        for (id, annotations) in self.entities {
            let mut entity = EntityInternal::new(id);
            for class in &annotations {
                let idx = classes
                    .index_of(class)
                    .ok_or_else(|| SimError::UnknownClass(class.clone()))?;
                entity.annotations_mut().insert(idx);
            }
            let mut closure = ClassSet::new();
            for idx in entity.annotations() {
                closure = &closure
                    | classes
                        .get(idx)
                        .expect("annotation indices resolved above")
                        .ancestors();
            }
            *entity.closure_mut() = closure;
            entities.push(entity);
        }

        for entity_pos in 0..entities.len() {
            let closure = entities
                .get(entity_pos)
                .expect("position within arena length")
                .closure()
                .clone();
            for idx in &closure {
                *classes
                    .get_mut(idx)
                    .expect("closures only hold arena indices")
                    .frequency_mut() += 1;
            }
        }

        let frequencies: Vec<u64> = classes.iter().map(ClassInternal::frequency).collect();
        let ic = IcModel::new(frequencies, entities.len() as u64);

        debug!(
            classes = classes.len(),
            entities = entities.len(),
            "corpus build complete"
        );

        Ok(Corpus::new(classes, entities, ic))
    }
}

/// Derives the reflexive-transitive ancestor closure of every class
///
/// Iterative depth-first traversal with tri-state marks. A parent that is
/// still open when one of its descendants expands means the hierarchy has a
/// cycle.
fn compute_closures(classes: &mut ClassArena) -> SimResult<()> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        New,
        Open,
        Done,
    }

    let num = classes.len();
    let mut marks = vec![Mark::New; num];

    for start in 0..num {
        if marks[start] == Mark::Done {
            continue;
        }
        let mut stack: Vec<ClassIdx> = vec![start.into()];
        while let Some(node) = stack.last().copied() {
            let pos = node.to_usize();
            match marks[pos] {
                Mark::Done => {
                    stack.pop();
                }
                Mark::Open => {
                    // all parents are resolved now
                    let parents = classes
                        .get(node)
                        .expect("stack only holds arena indices")
                        .parents()
                        .clone();
                    let mut closure = ClassSet::new();
                    closure.insert(node);
                    for parent in &parents {
                        closure = &closure
                            | classes
                                .get(parent)
                                .expect("parents resolved at edge insertion")
                                .ancestors();
                    }
                    *classes
                        .get_mut(node)
                        .expect("stack only holds arena indices")
                        .ancestors_mut() = closure;
                    marks[pos] = Mark::Done;
                    stack.pop();
                }
                Mark::New => {
                    marks[pos] = Mark::Open;
                    let parents = classes
                        .get(node)
                        .expect("stack only holds arena indices")
                        .parents()
                        .clone();
                    for parent in &parents {
                        match marks[parent.to_usize()] {
                            Mark::New => stack.push(parent),
                            Mark::Open => {
                                let id = classes
                                    .get(parent)
                                    .expect("parents resolved at edge insertion")
                                    .id()
                                    .clone();
                                return Err(SimError::CyclicHierarchy(id));
                            }
                            Mark::Done => {}
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> CorpusBuilder {
        // root -> {left, right} -> leaf
        let mut builder = CorpusBuilder::new();
        builder.add_class("T:0", "root");
        builder.add_class("T:1", "left");
        builder.add_class("T:2", "right");
        builder.add_class("T:3", "leaf");
        builder.add_edge("T:1", "T:0");
        builder.add_edge("T:2", "T:0");
        builder.add_edge("T:3", "T:1");
        builder.add_edge("T:3", "T:2");
        builder
    }

    #[test]
    fn closures_are_reflexive_transitive() {
        let mut builder = diamond();
        builder.add_annotation("e1", "T:3");
        let corpus = builder.build().unwrap();

        let leaf = corpus.class_by_id(&"T:3".into()).unwrap();
        let ancestors: Vec<&str> = leaf.ancestors().map(|c| c.id().as_str()).collect();
        assert_eq!(ancestors, vec!["T:0", "T:1", "T:2", "T:3"]);

        let root = corpus.class_by_id(&"T:0".into()).unwrap();
        assert_eq!(root.ancestor_idxs().len(), 1);
        assert!(root.ancestor_of(&leaf));
        assert!(leaf.descendant_of(&root));
    }

    #[test]
    fn entity_closure_unions_annotation_ancestors() {
        let mut builder = diamond();
        builder.add_annotation("e1", "T:1");
        builder.add_annotation("e1", "T:2");
        let corpus = builder.build().unwrap();

        let entity = corpus.entity_by_id(&"e1".into()).unwrap();
        assert_eq!(entity.annotation_idxs().len(), 2);
        assert_eq!(entity.closure_idxs().len(), 3); // T:0, T:1, T:2
    }

    #[test]
    fn frequencies_count_closure_membership() {
        let mut builder = diamond();
        builder.add_annotation("e1", "T:3");
        builder.add_annotation("e2", "T:1");
        builder.add_entity("e3");
        let corpus = builder.build().unwrap();

        assert_eq!(corpus.class_by_id(&"T:0".into()).unwrap().frequency(), 2);
        assert_eq!(corpus.class_by_id(&"T:1".into()).unwrap().frequency(), 2);
        assert_eq!(corpus.class_by_id(&"T:2".into()).unwrap().frequency(), 1);
        assert_eq!(corpus.class_by_id(&"T:3".into()).unwrap().frequency(), 1);
        assert_eq!(corpus.num_entities(), 3);
    }

    #[test]
    fn unknown_class_in_edge_is_rejected() {
        let mut builder = CorpusBuilder::new();
        builder.add_class("T:0", "root");
        builder.add_edge("T:9", "T:0");
        assert_eq!(
            builder.build().unwrap_err(),
            SimError::UnknownClass("T:9".into())
        );
    }

    #[test]
    fn unknown_class_in_annotation_is_rejected() {
        let mut builder = CorpusBuilder::new();
        builder.add_class("T:0", "root");
        builder.add_annotation("e1", "T:9");
        assert_eq!(
            builder.build().unwrap_err(),
            SimError::UnknownClass("T:9".into())
        );
    }

    #[test]
    fn cyclic_hierarchy_is_rejected() {
        let mut builder = CorpusBuilder::new();
        builder.add_class("T:0", "a");
        builder.add_class("T:1", "b");
        builder.add_edge("T:0", "T:1");
        builder.add_edge("T:1", "T:0");
        assert!(matches!(
            builder.build().unwrap_err(),
            SimError::CyclicHierarchy(_)
        ));
    }

    #[test]
    fn indices_follow_lexical_id_order() {
        let mut builder = CorpusBuilder::new();
        builder.add_class("T:2", "c");
        builder.add_class("T:0", "a");
        builder.add_class("T:1", "b");
        let corpus = builder.build().unwrap();

        let ids: Vec<&str> = corpus.classes().map(|c| c.id().as_str()).collect();
        assert_eq!(ids, vec!["T:0", "T:1", "T:2"]);
    }
}
