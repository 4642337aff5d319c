//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod stream_hub;
pub mod test_dependencies;
pub mod traits;

pub use deps::{PostgresNoteStore, ServerDeps};
pub use stream_hub::StreamHub;
pub use test_dependencies::{InMemoryNoteStore, MockClock, TestDependencies};
pub use traits::*;
