//! Summary Builder
//!
//! Condenses each workout, state-of-mind entry and metric series into a
//! summary that carries precomputed statistics, import metadata and
//! ready-to-store text (title, one-line summary, Markdown).
//!
//! ## Components
//!
//! - **stats**: count/min/max/avg (+ total/first/last) over one series
//! - **metadata**: calendar facts, time-of-day buckets, memory text
//! - **workout / state_of_mind / metric**: one builder per record kind
//!
//! Building is pure: no I/O, no errors, same input same output.

pub mod metadata;
pub mod metric;
pub mod state_of_mind;
pub mod stats;
pub mod workout;

pub use metadata::{ImportMetadata, MemoryContent, TimeOfDay};
pub use metric::{MetricSpan, MetricSummary};
pub use state_of_mind::StateOfMindSummary;
pub use stats::{SeriesKind, Statistics};
pub use workout::WorkoutSummary;
