//! Isolated mock runtime: a persisted, versionless snapshot of
//! backend-equivalent state plus pure reducers and read projections. When
//! `RuntimeConfig::isolated_mock` is set, every facade routes here and the
//! UI cannot tell the difference.

pub mod fixtures;
pub mod projections;
pub mod runtime;
pub mod state;

pub use runtime::MockRuntime;
pub use state::{CartEntry, IsolatedMockState};
