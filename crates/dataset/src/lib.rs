//! # Missionloom Dataset Pipeline
//!
//! Turns raw mission records into supervised training examples: a textual
//! context window (input) paired with a single target event (output), plus
//! provenance metadata.
//!
//! The pipeline is a strictly one-directional batch transform:
//!
//! 1. **Source processors** ([`source`]) fetch raw records per category and
//!    convert them into canonical [`missionloom_core::TimelineEvent`]s via
//!    the token vocabulary ([`convert`]).
//! 2. The **assembler** ([`assembler`]) concatenates all configured sources
//!    into one per-agent timeline.
//! 3. The **post-processor** ([`postprocess`]) separates targets from
//!    learning events and prepends bucketed time-delta tokens.
//! 4. The **window splitter** ([`splitter`]) selects the bounded lookback
//!    context for every target via binary search and emits
//!    (context, target) pairs.
//! 5. The **writer** ([`writer`]) serializes each pair as an Alpaca-format
//!    sample with an annotation file.
//!
//! The [`builder`] module drives the whole pass over every (sample, agent)
//! pair in the store and accumulates a [`builder::BuildReport`].
//!
//! # Determinism
//!
//! Given identical records, a build yields byte-identical output on repeated
//! runs: fetch order is fixed by row id, assembly order by configuration,
//! sorting is stable, and no random or time-dependent logic touches sample
//! content.

pub mod assembler;
pub mod builder;
pub mod convert;
pub mod postprocess;
pub mod source;
pub mod splitter;
pub mod writer;

pub use assembler::TimelineAssembler;
pub use builder::{BuildReport, DatasetBuilder};
pub use splitter::{SplitOutcome, WindowSplitter};
pub use writer::{AlpacaRecord, SampleWriter};
