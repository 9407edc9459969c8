//! Peekframe Preview Coordinator
//!
//! The scheduling core between the host UI and the render backend:
//! a debounced, fingerprinted, single-flight request scheduler with
//! cancellation-of-intent (pending timers only, never in-flight work),
//! mode-aware artifact release, and a playback-failure backoff policy.
//!
//! Guarantees: at most one render in flight per panel, and no redundant
//! render for an unchanged configuration. Non-guarantee: the freshest
//! possible preview at all times; non-forced triggers arriving while a
//! render is in flight are dropped, not queued.

pub mod backoff;
pub mod coordinator;

pub use backoff::PlaybackBackoff;
pub use coordinator::{
    CoordinatorOptions, GenerationState, PanelSnapshot, PreviewCoordinator,
};
