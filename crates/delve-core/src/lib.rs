//! Core types for the Delve resolution engine.
//!
//! Holds the plain data shared by every other crate: normalized catalog
//! identifiers, runtime ids, clamped health tracks, and the player and
//! monster snapshots that combat consumes through the [`Actor`] trait.

pub mod actor;
pub mod error;
pub mod id;
pub mod track;

pub use actor::{Actor, Monster, Player, Side};
pub use error::{CoreError, CoreResult};
pub use id::{CatalogId, CheckId, ConsequenceId, EntityId};
pub use track::Track;
