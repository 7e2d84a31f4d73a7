//! Warden KB - a filesystem-backed knowledge-base store with
//! compare-and-swap writes.
//!
//! Documents are plain text files addressed by a [`KbScope`] (act, scene,
//! or beat) and a relative path. Mutation is two-phase: [`KbStore::preview`]
//! computes a diff and hands out a hash of the current content, and
//! [`KbStore::apply`] commits only while that hash still matches. A stale
//! hash means someone else wrote in between; the caller re-previews rather
//! than clobbering their work.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

mod diff;
pub mod error;
pub mod scope;
pub mod store;

pub use error::{KbError, KbResult};
pub use scope::KbScope;
pub use store::{AppliedWrite, DEFAULT_DOC, KbStore, WritePreview};
