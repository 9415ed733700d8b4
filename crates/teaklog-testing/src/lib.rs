//! Testing infrastructure for teaklog tests.
//!
//! - `fixtures`: recorded logcat runs and a `LogBuilder` for synthetic ones
//! - `assertions`: checks mirroring the acceptance steps run against devices

pub mod assertions;
pub mod fixtures;

pub use fixtures::{FULL_RUN_LOG, LogBuilder};
