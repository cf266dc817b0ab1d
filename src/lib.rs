//! Touch Dispatch
//!
//! Touch-input routing for a 2D game engine: a priority-ordered registry of
//! touch delegates, fed by the platform and safe to modify mid-dispatch.

/// Application configuration (profiles, env overrides)
pub mod config;

/// Touch input dispatch - delegates, registry and routing
pub mod input;
