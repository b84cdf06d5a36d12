//! Load-event listener: the entry point tying graph, resolver, cache and
//! injector together.
//!
//! The mapping layer declares discriminator entries at parent level; this
//! listener turns that around. Each subclass declares its own tag, and on
//! the "class metadata loaded" event the listener resolves the family once,
//! caches the shared map for every member, and injects the loading class's
//! portion into its metadata record.

use tracing::{debug, trace};

use crate::cache::MapCache;
use crate::graph::ClassGraph;
use crate::metadata::{ClassMetadata, inject};
use crate::resolve::{ResolveError, resolve};

/// Event kinds the listener can subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Fired once per class as its metadata record loads.
    LoadClassMetadata,
}

/// Listener for the `loadClassMetadata`-style event.
///
/// Owns the pre-built hierarchy graph and the process-lifetime map cache;
/// `&mut self` on the handler enforces the one-event-at-a-time execution
/// model. Wrap the listener in a lock for concurrent loading; the cache is
/// insert-if-absent, so racing resolutions of one family still converge on
/// a single winning entry set.
#[derive(Clone, Debug)]
pub struct DiscriminatorListener {
    graph: ClassGraph,
    cache: MapCache,
}

impl DiscriminatorListener {
    pub fn new(graph: ClassGraph) -> Self {
        Self {
            graph,
            cache: MapCache::new(),
        }
    }

    /// The event kinds this listener wants to be notified on.
    pub fn subscribed_events(&self) -> &'static [Event] {
        &[Event::LoadClassMetadata]
    }

    pub fn graph(&self) -> &ClassGraph {
        &self.graph
    }

    pub fn cache(&self) -> &MapCache {
        &self.cache
    }

    /// Handle one "class metadata loaded" event.
    ///
    /// Cache hit: inject and return. Miss: if the record arrived with a
    /// non-empty map and the class declares a tag, resolve the whole
    /// hierarchy, cache every discovered member, and inject into this
    /// record only; siblings are served from the cache on their own
    /// events. Anything else is left untouched.
    ///
    /// A record naming a class the graph does not know is a fatal
    /// [`ResolveError::UnknownClass`] (unless the record is not
    /// discriminated at all, in which case it is skipped like any other).
    pub fn load_class_metadata(&mut self, metadata: &mut ClassMetadata) -> Result<(), ResolveError> {
        let class = metadata.class;

        if let Some(entry) = self.cache.get(class) {
            trace!(class = self.graph.name_of(class).unwrap_or("?"), "cache hit");
            inject(entry, metadata);
            return Ok(());
        }

        if metadata.discriminator_map.is_empty() {
            trace!(class, "no incoming discriminator map; skipping");
            return Ok(());
        }
        if !self.graph.contains(class) {
            return Err(ResolveError::UnknownClass(class));
        }
        if self.graph.tag_of(class).is_none() {
            trace!(
                class = self.graph.name_of(class).unwrap_or("?"),
                "no declared tag; skipping"
            );
            return Ok(());
        }

        let resolution = resolve(&self.graph, class)?;
        self.cache.populate(&resolution);
        debug!(
            class = self.graph.name_of(class).unwrap_or("?"),
            family = resolution.per_class.len(),
            "resolved and cached hierarchy"
        );

        if let Some(entry) = self.cache.get(class) {
            inject(entry, metadata);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ClassDef;

    fn listener() -> DiscriminatorListener {
        let graph = ClassGraph::build(&[
            ClassDef::new("Animal", None, None),
            ClassDef::new("Dog", Some("Animal"), Some("dog")),
            ClassDef::new("Cat", Some("Animal"), Some("cat")),
        ])
        .unwrap();
        DiscriminatorListener::new(graph)
    }

    fn loading(listener: &DiscriminatorListener, name: &str) -> ClassMetadata {
        // Simulate the mapping layer's default single-entry map
        let class = listener.graph().id_of(name).unwrap();
        let mut metadata = ClassMetadata::new(class);
        metadata
            .discriminator_map
            .insert(name.to_lowercase(), class);
        metadata
    }

    #[test]
    fn subscribes_to_exactly_one_event() {
        let listener = listener();
        assert_eq!(
            listener.subscribed_events(),
            &[Event::LoadClassMetadata]
        );
    }

    #[test]
    fn miss_resolves_and_injects() {
        let mut listener = listener();
        let mut metadata = loading(&listener, "Dog");

        listener.load_class_metadata(&mut metadata).unwrap();

        assert_eq!(metadata.discriminator_value.as_deref(), Some("dog"));
        assert_eq!(metadata.discriminator_map.len(), 2);
        assert_eq!(listener.cache().len(), 3);
    }

    #[test]
    fn hit_skips_resolution() {
        let mut listener = listener();
        let mut dog = loading(&listener, "Dog");
        listener.load_class_metadata(&mut dog).unwrap();

        // Cat arrives with an empty map; only the cache can serve it
        let cat_id = listener.graph().id_of("Cat").unwrap();
        let mut cat = ClassMetadata::new(cat_id);
        listener.load_class_metadata(&mut cat).unwrap();

        assert_eq!(cat.discriminator_value.as_deref(), Some("cat"));
        assert_eq!(cat.discriminator_map.class_of("dog"), listener.graph().id_of("Dog"));
    }

    #[test]
    fn untagged_class_with_empty_map_is_skipped() {
        let mut listener = listener();
        let animal = listener.graph().id_of("Animal").unwrap();
        let mut metadata = ClassMetadata::new(animal);

        listener.load_class_metadata(&mut metadata).unwrap();

        assert!(metadata.discriminator_map.is_empty());
        assert_eq!(metadata.discriminator_value, None);
        assert!(metadata.sub_classes.is_empty());
        assert!(listener.cache().is_empty());
    }

    #[test]
    fn unknown_discriminated_class_is_fatal() {
        let mut listener = listener();
        let mut metadata = ClassMetadata::new(0xbad_c0de);
        metadata.discriminator_map.insert("bad", 0xbad_c0de);

        assert!(matches!(
            listener.load_class_metadata(&mut metadata),
            Err(ResolveError::UnknownClass(_))
        ));
    }

    #[test]
    fn unknown_undiscriminated_class_is_skipped() {
        let mut listener = listener();
        let mut metadata = ClassMetadata::new(0xbad_c0de);

        listener.load_class_metadata(&mut metadata).unwrap();
        assert!(listener.cache().is_empty());
    }

    #[test]
    fn siblings_are_cached_but_not_mutated() {
        let mut listener = listener();
        let mut dog = loading(&listener, "Dog");
        listener.load_class_metadata(&mut dog).unwrap();

        // Cat is cached...
        let cat_id = listener.graph().id_of("Cat").unwrap();
        assert!(listener.cache().contains(cat_id));
        // ...but only Dog's record was written in that pass
        assert_eq!(dog.discriminator_value.as_deref(), Some("dog"));
    }
}
