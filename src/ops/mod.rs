//! High-level operations.
//!
//! The stages of a coverage run, and [`cover::run`] which chains them.

pub mod cover;
pub mod harness;
pub mod instrument;
pub mod merge;
pub mod resolve;

pub use cover::{run, CoverOptions, CoverOutcome};
pub use harness::{render_harness, synthesize_harness};
pub use instrument::{CommitMode, InstrumentContext};
pub use merge::merge_units;
pub use resolve::{resolve_all, resolve_dependencies, EntryPoint, Resolution};
