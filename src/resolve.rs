//! Hierarchy resolver: climbs to the root, then collects every tagged
//! descendant into one shared discriminator map.
//!
//! Resolution is deterministic and side-effect free: the same hierarchy
//! always yields the same `Resolution`, regardless of which member class
//! triggered it. That property is what lets the cache hand one resolution
//! to every member of the family.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, warn};

use crate::ClassId;
use crate::graph::ClassGraph;
use crate::map::DiscriminatorMap;

/// Errors raised during hierarchy resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("unknown class id {0:#018x}")]
    UnknownClass(ClassId),
    #[error("parent cycle detected at class '{0}'")]
    ParentCycle(String),
}

/// Result of resolving one hierarchy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// The hierarchy root (the unique ancestor with no parent).
    pub root: ClassId,
    /// Every discovered `(class, tag)` pair, in discovery order.
    pub per_class: Vec<(ClassId, String)>,
    /// Inverse mapping tag → class, shared by the whole family.
    pub map: DiscriminatorMap,
}

impl Resolution {
    /// Tag discovered for `class`, if it declared one.
    pub fn tag_of(&self, class: ClassId) -> Option<&str> {
        self.per_class
            .iter()
            .find(|(c, _)| *c == class)
            .map(|(_, t)| t.as_str())
    }
}

/// Resolve the hierarchy containing `class`.
///
/// Walks parent links up to the root, then recursively discovers all
/// descendants. A class without a tag is not recorded but its subtree is
/// still explored; a tag may skip a generation. If two classes claim the
/// same tag the later-discovered one wins and a warning is emitted.
pub fn resolve(graph: &ClassGraph, class: ClassId) -> Result<Resolution, ResolveError> {
    let mut idx = graph
        .index_of(class)
        .ok_or(ResolveError::UnknownClass(class))?;

    // Root discovery: follow parent links upward. The graph rejects cycles
    // at build time; the visited set keeps the climb finite even so.
    let mut climbed = HashSet::new();
    climbed.insert(idx);
    while let Some(parent) = graph.parent_idx(idx) {
        if !climbed.insert(parent) {
            return Err(ResolveError::ParentCycle(graph.name_at(parent).to_string()));
        }
        idx = parent;
    }
    let root_idx = idx;

    // Transitive discovery from the root. The root's own tag, when declared,
    // participates like any member's, so resolution does not depend on the
    // entry point.
    let mut per_class: Vec<(ClassId, String)> = Vec::new();
    if let Some(tag) = graph.tag_at(root_idx) {
        per_class.push((graph.id_at(root_idx), tag.to_string()));
    }
    let mut visited = HashSet::new();
    visited.insert(root_idx);
    collect_tagged(graph, root_idx, &mut visited, &mut per_class);

    // Invert into the shared tag → class map
    let mut map = DiscriminatorMap::new();
    for (class, tag) in &per_class {
        if let Some(previous) = map.insert(tag.clone(), *class) {
            warn!(
                tag = %tag,
                dropped = graph.name_of(previous).unwrap_or("?"),
                kept = graph.name_of(*class).unwrap_or("?"),
                "duplicate discriminator tag in one hierarchy; later class wins"
            );
        }
    }

    let root = graph.id_at(root_idx);
    debug!(
        root = graph.name_at(root_idx),
        classes = per_class.len(),
        "hierarchy resolved"
    );

    Ok(Resolution {
        root,
        per_class,
        map,
    })
}

fn collect_tagged(
    graph: &ClassGraph,
    idx: usize,
    visited: &mut HashSet<usize>,
    out: &mut Vec<(ClassId, String)>,
) {
    for &child in graph.children_idx(idx) {
        if !visited.insert(child) {
            continue;
        }
        if let Some(tag) = graph.tag_at(child) {
            out.push((graph.id_at(child), tag.to_string()));
        }
        // Untagged classes still contribute their subtrees
        collect_tagged(graph, child, visited, out);
    }
}
