//! sdk-doctor - TrustArc Mobile Consent SDK integration diagnostics
//!
//! Scans Android, iOS, React Native and Flutter projects for SDK wiring
//! problems, scores them, and answers integration questions grounded in
//! bundled SDK notes.

pub mod cli;
pub mod config;
pub mod knowledge;
pub mod models;
pub mod pipeline;
pub mod qa;
pub mod reporters;
pub mod rules;
pub mod scanner;
pub mod scoring;
