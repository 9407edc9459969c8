//! Peekframe Preview Model
//!
//! Pure data model for encode previews:
//! - **Encoding configuration:** canonical snapshot + legacy-shape normalization
//! - **Fingerprinting:** stable comparison keys over render-relevant inputs
//! - **Artifacts:** frame pairs and video segments produced by the backend
//! - **Split view:** divider-to-clip-region geometry
//!
//! This crate is pure computation: no I/O, no scheduling.
//! All inputs are data; all outputs are data.

pub mod artifact;
pub mod encoding;
pub mod fingerprint;
pub mod split_view;

pub use artifact::{PreviewArtifact, VideoMetadata};
pub use encoding::{ConfigPayload, EncodingConfiguration, FilterToggle, LegacyEncodingConfig};
pub use fingerprint::{PreviewFingerprint, PreviewMode};
pub use split_view::SplitClip;
