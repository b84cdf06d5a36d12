//! Trait implemented by `entity_hierarchy!`-generated marker types.

use crate::ClassId;

/// Compile-time view of one declared entity class.
pub trait EntityClass {
    /// Class name, globally unique across hierarchies.
    const NAME: &'static str;
    /// Stable identity derived from the name.
    const ID: ClassId;
    /// Declared discriminator tag, if any.
    const TAG: Option<&'static str>;
}
