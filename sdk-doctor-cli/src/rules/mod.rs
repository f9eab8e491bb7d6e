//! Pattern-based integration checks
//!
//! Rules read [`PlatformSignals`](crate::scanner::PlatformSignals) only; no
//! file is opened here.

mod common;
pub mod engine;
pub mod version;

pub mod android;
pub mod flutter;
pub mod generic;
pub mod ios;
pub mod react_native;

pub use engine::{Rule, RuleEngine};
pub use version::{SdkVersion, VersionError};
