//! Entity trait: identity that survives state changes.
//!
//! Items, batches, users and rooms are entities; the in-memory repository
//! looks rows up through `Entity::id`.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
