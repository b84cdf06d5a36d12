//! Mutable class-metadata record and the injector that applies a cache
//! entry to it.
//!
//! `ClassMetadata` stands in for the mapping layer's per-class record: the
//! event source hands one to the listener per load, and the injector is the
//! only code that writes to it.

use crate::ClassId;
use crate::cache::CacheEntry;
use crate::map::DiscriminatorMap;

/// The external mutable metadata record carried by a load event.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassMetadata {
    /// Identity of the class this record describes.
    pub class: ClassId,
    /// Tag → class mapping; possibly pre-populated by the mapping layer.
    pub discriminator_map: DiscriminatorMap,
    /// This class's own discriminator tag.
    pub discriminator_value: Option<String>,
    /// Known subclasses, set on the hierarchy root only.
    pub sub_classes: Vec<ClassId>,
}

impl ClassMetadata {
    pub fn new(class: ClassId) -> Self {
        Self {
            class,
            ..Self::default()
        }
    }
}

/// Apply a resolved cache entry to one class's metadata record.
///
/// Sets the record's discriminator map and own tag. For the hierarchy root,
/// additionally sets the subclass list: the map's classes in discovery
/// order, minus the record's own class. The result is always a list, empty
/// when the root has no tagged descendants.
pub fn inject(entry: &CacheEntry, metadata: &mut ClassMetadata) {
    metadata.discriminator_map = (*entry.map).clone();
    metadata.discriminator_value = entry.discr.clone();

    if entry.is_root {
        metadata.sub_classes = entry
            .map
            .classes()
            .filter(|&class| class != metadata.class)
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn entry(pairs: &[(&str, ClassId)], discr: Option<&str>, is_root: bool) -> CacheEntry {
        let mut map = DiscriminatorMap::new();
        for (tag, class) in pairs {
            map.insert(*tag, *class);
        }
        CacheEntry {
            map: Arc::new(map),
            discr: discr.map(str::to_string),
            is_root,
        }
    }

    #[test]
    fn inject_sets_map_and_own_tag() {
        let entry = entry(&[("dog", 1), ("cat", 2)], Some("dog"), false);
        let mut metadata = ClassMetadata::new(1);

        inject(&entry, &mut metadata);

        assert_eq!(metadata.discriminator_map.class_of("dog"), Some(1));
        assert_eq!(metadata.discriminator_map.class_of("cat"), Some(2));
        assert_eq!(metadata.discriminator_value.as_deref(), Some("dog"));
        // Not the root: subclass list untouched
        assert!(metadata.sub_classes.is_empty());
    }

    #[test]
    fn inject_sets_subclasses_on_root_only() {
        let entry = entry(&[("dog", 1), ("puppy", 2), ("cat", 3)], None, true);
        let mut metadata = ClassMetadata::new(10);

        inject(&entry, &mut metadata);

        assert_eq!(metadata.discriminator_value, None);
        assert_eq!(metadata.sub_classes, vec![1, 2, 3]);
    }

    #[test]
    fn root_excludes_itself_from_subclasses() {
        // Tagged root: its own map entry must not appear in sub_classes
        let entry = entry(&[("shape", 10), ("circle", 11)], Some("shape"), true);
        let mut metadata = ClassMetadata::new(10);

        inject(&entry, &mut metadata);

        assert_eq!(metadata.sub_classes, vec![11]);
        assert_eq!(metadata.discriminator_value.as_deref(), Some("shape"));
    }

    #[test]
    fn childless_root_gets_empty_list() {
        let entry = entry(&[("only", 5)], Some("only"), true);
        let mut metadata = ClassMetadata::new(5);

        inject(&entry, &mut metadata);

        assert!(metadata.sub_classes.is_empty());
    }
}
