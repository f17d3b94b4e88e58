//! # Missionloom Core
//!
//! Domain types, the token vocabulary, and error definitions for the
//! missionloom dataset pipeline. This crate has **zero framework
//! dependencies** — it defines the canonical event model that the store
//! and the dataset stages operate on.
//!
//! ## Design Philosophy
//!
//! The pipeline is a one-directional batch transform: raw mission records
//! become tokenized [`TimelineEvent`]s, which become context windows, which
//! become training samples. Everything in this crate is an immutable value
//! type; each pipeline stage constructs new values instead of mutating its
//! input. Category-specific behavior is expressed as exhaustive matches over
//! the closed [`EventCategory`] enum, so a schema change in the store is a
//! compile error here, never a silent default.

pub mod error;
pub mod event;
pub mod tokens;

// Re-export key types at crate root for ergonomics
pub use error::{ConvertError, Error, Result, StoreError, WriteError};
pub use event::{
    ContextWindow, EventCategory, SampleMetadata, SourceKind, TimelineEvent, TrainingSample,
};
