//! Class hierarchy graph: runtime navigation and tag lookup for entity families.
//!
//! The graph is built once, up front, from static declarations (macro output
//! or a TOML config) and is immutable afterwards. It replaces the "scan every
//! loaded class through reflection" approach with an arena-indexed structure:
//! parent/child edges are resolved at build time, so hierarchy walks are
//! plain index chasing.

use std::collections::HashMap;

use thiserror::Error;

use crate::ClassId;
use crate::config::HierarchyConfig;
use crate::hash::class_id;

/// Definition of one class in a hierarchy (used for graph building from macro).
#[derive(Clone, Copy, Debug)]
pub struct ClassDef {
    pub name: &'static str,
    /// Name of the parent class; `None` marks a hierarchy root.
    pub parent: Option<&'static str>,
    /// Discriminator tag declared by this class, if any.
    pub tag: Option<&'static str>,
}

impl ClassDef {
    pub const fn new(
        name: &'static str,
        parent: Option<&'static str>,
        tag: Option<&'static str>,
    ) -> Self {
        Self { name, parent, tag }
    }
}

/// Errors detected while building a [`ClassGraph`].
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("empty class name is not allowed")]
    EmptyName,
    #[error("duplicate class: {0}")]
    DuplicateClass(String),
    #[error("empty discriminator tag on class '{0}'")]
    EmptyTag(String),
    #[error("missing parent for '{class}': '{parent}'")]
    MissingParent { class: String, parent: String },
    #[error("class id collision: '{0}' and '{1}' hash to the same id")]
    IdCollision(String, String),
    #[error("parent cycle: class '{0}' is not reachable from any root")]
    ParentCycle(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct ClassNode {
    id: ClassId,
    name: String,
    tag: Option<String>,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Pre-built hierarchy graph over all declared classes.
///
/// Provides:
/// - Name ↔ ClassId bidirectional lookup
/// - Parent navigation and transitive descendant enumeration
/// - Declared-tag lookup per class
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassGraph {
    nodes: Vec<ClassNode>,
    name_to_idx: HashMap<String, usize>,
    id_to_idx: HashMap<ClassId, usize>,
}

impl ClassGraph {
    /// Build a graph from class definitions (from the `entity_hierarchy!` macro).
    pub fn build(defs: &[ClassDef]) -> Result<Self, GraphError> {
        Self::build_impl(defs.iter().map(|d| (d.name, d.parent, d.tag)))
    }

    /// Build a graph from a parsed TOML hierarchy config.
    pub fn from_config(config: &HierarchyConfig) -> Result<Self, GraphError> {
        Self::build_impl(
            config
                .classes()
                .map(|c| (c.name.as_str(), c.parent.as_deref(), c.discr.as_deref())),
        )
    }

    fn build_impl<'a>(
        defs: impl Iterator<Item = (&'a str, Option<&'a str>, Option<&'a str>)>,
    ) -> Result<Self, GraphError> {
        let mut nodes: Vec<ClassNode> = Vec::new();
        let mut name_to_idx: HashMap<String, usize> = HashMap::new();
        let mut id_to_idx: HashMap<ClassId, usize> = HashMap::new();
        let mut parent_names: Vec<Option<String>> = Vec::new();

        // 1. Intern nodes in definition order
        for (name, parent, tag) in defs {
            if name.is_empty() {
                return Err(GraphError::EmptyName);
            }
            if let Some(tag) = tag
                && tag.is_empty()
            {
                return Err(GraphError::EmptyTag(name.to_string()));
            }
            if name_to_idx.contains_key(name) {
                return Err(GraphError::DuplicateClass(name.to_string()));
            }

            let id = class_id(name.as_bytes());
            if let Some(&existing) = id_to_idx.get(&id) {
                return Err(GraphError::IdCollision(
                    nodes[existing].name.clone(),
                    name.to_string(),
                ));
            }

            let idx = nodes.len();
            nodes.push(ClassNode {
                id,
                name: name.to_string(),
                tag: tag.map(str::to_string),
                parent: None,
                children: Vec::new(),
            });
            name_to_idx.insert(name.to_string(), idx);
            id_to_idx.insert(id, idx);
            parent_names.push(parent.map(str::to_string));
        }

        // 2. Link parent/child edges (children keep definition order)
        for idx in 0..nodes.len() {
            let Some(parent_name) = &parent_names[idx] else {
                continue;
            };
            let Some(&parent_idx) = name_to_idx.get(parent_name.as_str()) else {
                return Err(GraphError::MissingParent {
                    class: nodes[idx].name.clone(),
                    parent: parent_name.clone(),
                });
            };
            nodes[idx].parent = Some(parent_idx);
            nodes[parent_idx].children.push(idx);
        }

        // 3. Every node must be reachable from a root, otherwise the parent
        //    chain folds back on itself (a class as its own indirect ancestor).
        let mut reachable = vec![false; nodes.len()];
        let mut queue: std::collections::VecDeque<usize> = nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.parent.is_none())
            .map(|(i, _)| i)
            .collect();
        while let Some(idx) = queue.pop_front() {
            reachable[idx] = true;
            queue.extend(nodes[idx].children.iter().copied());
        }
        if let Some(idx) = reachable.iter().position(|&r| !r) {
            return Err(GraphError::ParentCycle(nodes[idx].name.clone()));
        }

        Ok(Self {
            nodes,
            name_to_idx,
            id_to_idx,
        })
    }

    /// Name → ClassId
    #[inline]
    pub fn id_of(&self, name: &str) -> Option<ClassId> {
        self.name_to_idx.get(name).map(|&i| self.nodes[i].id)
    }

    /// ClassId → Name
    #[inline]
    pub fn name_of(&self, id: ClassId) -> Option<&str> {
        self.id_to_idx
            .get(&id)
            .map(|&i| self.nodes[i].name.as_str())
    }

    /// Parent of a class; `None` for hierarchy roots (and unknown ids).
    #[inline]
    pub fn parent_of(&self, id: ClassId) -> Option<ClassId> {
        let &idx = self.id_to_idx.get(&id)?;
        self.nodes[idx].parent.map(|p| self.nodes[p].id)
    }

    /// Declared discriminator tag of a class, if any.
    #[inline]
    pub fn tag_of(&self, id: ClassId) -> Option<&str> {
        let &idx = self.id_to_idx.get(&id)?;
        self.nodes[idx].tag.as_deref()
    }

    /// All transitive descendants of a class (not just direct children),
    /// in definition-order depth-first traversal. Excludes the class itself.
    pub fn descendants_of(&self, id: ClassId) -> Vec<ClassId> {
        let Some(&idx) = self.id_to_idx.get(&id) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        self.collect_descendants(idx, &mut out);
        out
    }

    fn collect_descendants(&self, idx: usize, out: &mut Vec<ClassId>) {
        for &child in &self.nodes[idx].children {
            out.push(self.nodes[child].id);
            self.collect_descendants(child, out);
        }
    }

    /// Check if a class name is declared.
    #[inline]
    pub fn contains_name(&self, name: &str) -> bool {
        self.name_to_idx.contains_key(name)
    }

    /// Check if a ClassId is declared.
    #[inline]
    pub fn contains(&self, id: ClassId) -> bool {
        self.id_to_idx.contains_key(&id)
    }

    /// Total number of declared classes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All class ids in definition order.
    pub fn classes(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.nodes.iter().map(|n| n.id)
    }

    // Arena accessors for the resolver.

    #[inline]
    pub(crate) fn index_of(&self, id: ClassId) -> Option<usize> {
        self.id_to_idx.get(&id).copied()
    }

    #[inline]
    pub(crate) fn parent_idx(&self, idx: usize) -> Option<usize> {
        self.nodes[idx].parent
    }

    #[inline]
    pub(crate) fn children_idx(&self, idx: usize) -> &[usize] {
        &self.nodes[idx].children
    }

    #[inline]
    pub(crate) fn id_at(&self, idx: usize) -> ClassId {
        self.nodes[idx].id
    }

    #[inline]
    pub(crate) fn name_at(&self, idx: usize) -> &str {
        &self.nodes[idx].name
    }

    #[inline]
    pub(crate) fn tag_at(&self, idx: usize) -> Option<&str> {
        self.nodes[idx].tag.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_DEFS: &[ClassDef] = &[
        ClassDef::new("Vehicle", None, None),
        ClassDef::new("Car", Some("Vehicle"), Some("car")),
        ClassDef::new("SportsCar", Some("Car"), Some("sports_car")),
        ClassDef::new("Truck", Some("Vehicle"), Some("truck")),
        ClassDef::new("Boat", None, Some("boat")),
    ];

    #[test]
    fn build_and_lookup() {
        let graph = ClassGraph::build(SAMPLE_DEFS).unwrap();

        assert_eq!(graph.len(), 5);
        assert!(graph.contains_name("Vehicle"));
        assert!(graph.contains_name("SportsCar"));

        // Round-trip
        let car = graph.id_of("Car").unwrap();
        assert_eq!(graph.name_of(car), Some("Car"));
        assert!(graph.contains(car));
    }

    #[test]
    fn parent_navigation() {
        let graph = ClassGraph::build(SAMPLE_DEFS).unwrap();

        let vehicle = graph.id_of("Vehicle").unwrap();
        let car = graph.id_of("Car").unwrap();
        let sports_car = graph.id_of("SportsCar").unwrap();

        assert_eq!(graph.parent_of(vehicle), None);
        assert_eq!(graph.parent_of(car), Some(vehicle));
        assert_eq!(graph.parent_of(sports_car), Some(car));
    }

    #[test]
    fn tag_lookup() {
        let graph = ClassGraph::build(SAMPLE_DEFS).unwrap();

        let vehicle = graph.id_of("Vehicle").unwrap();
        let car = graph.id_of("Car").unwrap();

        assert_eq!(graph.tag_of(vehicle), None);
        assert_eq!(graph.tag_of(car), Some("car"));
    }

    #[test]
    fn descendants_are_transitive_and_ordered() {
        let graph = ClassGraph::build(SAMPLE_DEFS).unwrap();
        let vehicle = graph.id_of("Vehicle").unwrap();

        let descendants = graph.descendants_of(vehicle);
        let names: Vec<&str> = descendants
            .iter()
            .filter_map(|&id| graph.name_of(id))
            .collect();

        // Definition-order DFS: Car before its subtree, Truck after
        assert_eq!(names, vec!["Car", "SportsCar", "Truck"]);
    }

    #[test]
    fn descendants_exclude_self_and_other_roots() {
        let graph = ClassGraph::build(SAMPLE_DEFS).unwrap();
        let vehicle = graph.id_of("Vehicle").unwrap();
        let boat = graph.id_of("Boat").unwrap();

        let descendants = graph.descendants_of(vehicle);
        assert!(!descendants.contains(&vehicle));
        assert!(!descendants.contains(&boat));

        assert!(graph.descendants_of(boat).is_empty());
    }

    #[test]
    fn empty_build_is_allowed() {
        let graph = ClassGraph::build(&[]).unwrap();
        assert!(graph.is_empty());
    }

    #[test]
    fn rejects_duplicate_class() {
        let defs = &[
            ClassDef::new("A", None, None),
            ClassDef::new("A", None, None),
        ];
        assert!(matches!(
            ClassGraph::build(defs),
            Err(GraphError::DuplicateClass(_))
        ));
    }

    #[test]
    fn rejects_missing_parent() {
        let defs = &[ClassDef::new("B", Some("A"), Some("b"))];
        assert!(matches!(
            ClassGraph::build(defs),
            Err(GraphError::MissingParent { .. })
        ));
    }

    #[test]
    fn rejects_empty_name_and_empty_tag() {
        assert!(matches!(
            ClassGraph::build(&[ClassDef::new("", None, None)]),
            Err(GraphError::EmptyName)
        ));
        assert!(matches!(
            ClassGraph::build(&[ClassDef::new("A", None, Some(""))]),
            Err(GraphError::EmptyTag(_))
        ));
    }

    #[test]
    fn rejects_parent_cycle() {
        // A and B each claim the other as parent; neither is a root
        let defs = &[
            ClassDef::new("A", Some("B"), Some("a")),
            ClassDef::new("B", Some("A"), Some("b")),
        ];
        assert!(matches!(
            ClassGraph::build(defs),
            Err(GraphError::ParentCycle(_))
        ));
    }

    #[test]
    fn rejects_self_parent() {
        let defs = &[ClassDef::new("A", Some("A"), Some("a"))];
        assert!(matches!(
            ClassGraph::build(defs),
            Err(GraphError::ParentCycle(_))
        ));
    }

    #[test]
    fn ids_are_stable_regardless_of_def_order() {
        let defs_a = &[
            ClassDef::new("A", None, None),
            ClassDef::new("B", Some("A"), Some("b")),
        ];
        let defs_b = &[
            ClassDef::new("B", Some("A"), Some("b")),
            ClassDef::new("A", None, None),
        ];

        let graph_a = ClassGraph::build(defs_a).unwrap();
        let graph_b = ClassGraph::build(defs_b).unwrap();

        assert_eq!(graph_a.id_of("A"), graph_b.id_of("A"));
        assert_eq!(graph_a.id_of("B"), graph_b.id_of("B"));
    }
}
