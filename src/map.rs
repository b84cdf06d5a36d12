//! Discriminator map: bidirectional tag ↔ class lookup, scoped to one hierarchy.

use std::collections::HashMap;

use crate::ClassId;

/// A bidirectional mapping between discriminator tags and class identities.
///
/// Iteration order is insertion order (discovery order during resolution),
/// which is what the root's subclass list is derived from. Inserting an
/// already-present tag keeps the tag's original position and replaces the
/// class behind it (last-wins).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiscriminatorMap {
    entries: Vec<(String, ClassId)>,
    tag_to_idx: HashMap<String, usize>,
    class_to_idx: HashMap<ClassId, usize>,
}

impl DiscriminatorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `tag` to `class`.
    ///
    /// Returns the class previously mapped to this tag, if any.
    pub fn insert(&mut self, tag: impl Into<String>, class: ClassId) -> Option<ClassId> {
        let tag = tag.into();
        if let Some(&idx) = self.tag_to_idx.get(&tag) {
            let (_, previous) = self.entries[idx];
            self.class_to_idx.remove(&previous);
            self.class_to_idx.insert(class, idx);
            self.entries[idx].1 = class;
            return Some(previous);
        }

        let idx = self.entries.len();
        self.entries.push((tag.clone(), class));
        self.tag_to_idx.insert(tag, idx);
        self.class_to_idx.insert(class, idx);
        None
    }

    /// Tag → ClassId
    #[inline]
    pub fn class_of(&self, tag: &str) -> Option<ClassId> {
        self.tag_to_idx.get(tag).map(|&i| self.entries[i].1)
    }

    /// ClassId → Tag
    #[inline]
    pub fn tag_of(&self, class: ClassId) -> Option<&str> {
        self.class_to_idx
            .get(&class)
            .map(|&i| self.entries[i].0.as_str())
    }

    #[inline]
    pub fn contains_tag(&self, tag: &str) -> bool {
        self.tag_to_idx.contains_key(tag)
    }

    #[inline]
    pub fn contains_class(&self, class: ClassId) -> bool {
        self.class_to_idx.contains_key(&class)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(tag, class)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ClassId)> + '_ {
        self.entries.iter().map(|(t, c)| (t.as_str(), *c))
    }

    /// Mapped classes in insertion order.
    pub fn classes(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.entries.iter().map(|(_, c)| *c)
    }

    /// Tags in insertion order.
    pub fn tags(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(t, _)| t.as_str())
    }
}

impl FromIterator<(String, ClassId)> for DiscriminatorMap {
    fn from_iter<T: IntoIterator<Item = (String, ClassId)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (tag, class) in iter {
            map.insert(tag, class);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup_both_directions() {
        let mut map = DiscriminatorMap::new();
        assert_eq!(map.insert("dog", 1), None);
        assert_eq!(map.insert("cat", 2), None);

        assert_eq!(map.class_of("dog"), Some(1));
        assert_eq!(map.class_of("cat"), Some(2));
        assert_eq!(map.tag_of(1), Some("dog"));
        assert_eq!(map.tag_of(2), Some("cat"));
        assert_eq!(map.class_of("bird"), None);
        assert_eq!(map.tag_of(3), None);
    }

    #[test]
    fn iteration_is_insertion_ordered() {
        let mut map = DiscriminatorMap::new();
        map.insert("dog", 1);
        map.insert("puppy", 2);
        map.insert("cat", 3);

        let tags: Vec<&str> = map.tags().collect();
        assert_eq!(tags, vec!["dog", "puppy", "cat"]);

        let classes: Vec<ClassId> = map.classes().collect();
        assert_eq!(classes, vec![1, 2, 3]);
    }

    #[test]
    fn duplicate_tag_is_last_wins() {
        let mut map = DiscriminatorMap::new();
        map.insert("dog", 1);
        map.insert("cat", 2);

        // Second claim on "dog" displaces the first class
        assert_eq!(map.insert("dog", 3), Some(1));

        assert_eq!(map.class_of("dog"), Some(3));
        assert_eq!(map.tag_of(3), Some("dog"));
        assert_eq!(map.tag_of(1), None);
        assert_eq!(map.len(), 2);

        // Position of the first insertion is retained
        let tags: Vec<&str> = map.tags().collect();
        assert_eq!(tags, vec!["dog", "cat"]);
    }

    #[test]
    fn from_iter_collects() {
        let map: DiscriminatorMap = [("a".to_string(), 1), ("b".to_string(), 2)]
            .into_iter()
            .collect();
        assert_eq!(map.len(), 2);
        assert_eq!(map.class_of("b"), Some(2));
    }
}
