//! # Subclass-Declared Discriminator Maps (discr-map)
//!
//! Inheritance mapping usually forces the hierarchy root to enumerate every
//! subtype's discriminator tag up front. This crate turns that around: each
//! subclass declares its own tag, and a listener on the "class metadata
//! loaded" event assembles and caches the shared tag ↔ class map for the
//! whole family, handing each loading class exactly its portion (its
//! own tag, the full map, and for the root its subclass list).
//!
//! ## Design
//!
//! - A hierarchy is declared once, up front, with the `entity_hierarchy!`
//!   macro (or a TOML file) and compiled into a [`ClassGraph`]: an
//!   arena-indexed tree with parent/child edges and per-class tags.
//! - [`resolve`] climbs from any member to the root, then collects every
//!   tagged descendant into one [`DiscriminatorMap`] (untagged classes are
//!   traversed but not recorded, so a tag may skip a generation).
//! - [`MapCache`] memoizes the result for every family member in one batch,
//!   so resolution runs at most once per hierarchy.
//! - [`DiscriminatorListener`] is the event-facing entry point: cache hit →
//!   inject; miss → resolve, populate, inject.
//!
//! ```ignore
//! use discr_map::{ClassGraph, ClassMetadata, DiscriminatorListener};
//! use discr_map_macro::entity_hierarchy;
//!
//! entity_hierarchy! {
//!     pub mod animals {
//!         Animal {
//!             #[discr = "dog"]
//!             Dog {
//!                 #[discr = "puppy"]
//!                 Puppy;
//!             }
//!             #[discr = "cat"]
//!             Cat;
//!         }
//!     }
//! }
//!
//! let graph = ClassGraph::build(animals::DEFINITIONS)?;
//! let mut listener = DiscriminatorListener::new(graph);
//! // feed each loading class's ClassMetadata through
//! // listener.load_class_metadata(...)
//! ```

pub mod cache;
pub mod config;
pub mod graph;
pub mod hash;
pub mod listener;
pub mod map;
pub mod metadata;
pub mod resolve;
pub mod traits;

pub use cache::{CacheEntry, MapCache};
pub use config::{ClassEntry, ConfigError, HierarchyConfig};
pub use graph::{ClassDef, ClassGraph, GraphError};
pub use hash::{class_id, fnv1a_64};
pub use listener::{DiscriminatorListener, Event};
pub use map::DiscriminatorMap;
pub use metadata::{ClassMetadata, inject};
pub use resolve::{Resolution, ResolveError, resolve};
pub use traits::EntityClass;

/// Stable, opaque identity of a class: the FNV-1a hash of its name.
///
/// Never two identities for one class, and (hash collisions aside, which
/// graph building rejects) never one identity for two classes.
pub type ClassId = u64;

/// Reserved invalid identity; [`class_id`] never produces it.
pub const NO_CLASS: ClassId = 0;
