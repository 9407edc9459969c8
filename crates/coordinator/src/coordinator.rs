//! Preview generation state machine.
//!
//! One [`PreviewCoordinator`] exists per preview panel. It owns every piece
//! of scheduling state (the generation state, the last-executed
//! fingerprint memo, the pending debounce timer, and the in-flight guard)
//! so that all transitions are serialized through a single mutex and the
//! single-flight/loop-breaking invariants hold even when the host drives
//! it from multiple tasks.
//!
//! Trigger classes:
//! - **Continuous** (config/mode/visibility edits): debounced behind a
//!   fixed delay, skipped entirely when the fingerprint matches the memo.
//! - **Discrete** (time seeks): cancel any pending timer and render now.
//! - **Forced** (user refresh): render now, ignoring memo and guard.
//!
//! Every scheduled render captures an immutable [`PreviewRequest`] snapshot
//! at schedule time; later input edits never leak into an armed timer.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use peekframe_backend::RenderBackend;
use peekframe_common::config::PreviewDefaults;
use peekframe_common::error::PeekframeError;
use peekframe_model::{
    EncodingConfiguration, PreviewArtifact, PreviewFingerprint, PreviewMode, VideoMetadata,
};

use crate::backoff::PlaybackBackoff;

/// State of preview generation for one panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationState {
    /// Nothing pending.
    Idle,
    /// Debounce timer armed.
    Scheduled,
    /// Backend call outstanding.
    Generating,
    /// The last cycle failed; recovery needs a forced refresh or a
    /// genuinely different input.
    Error(String),
}

/// Scheduling parameters.
#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    /// Delay between the last continuous trigger and generation.
    pub debounce: Duration,

    /// Delay between receiving a segment locator and exposing it, so the
    /// backend can release its filesystem lock.
    pub settle: Duration,

    /// Length of the transcoded segment in video mode (seconds).
    pub segment_secs: f64,

    /// Consecutive playback decode failures before a segment is abandoned.
    pub playback_failure_threshold: u32,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self::from(&PreviewDefaults::default())
    }
}

impl From<&PreviewDefaults> for CoordinatorOptions {
    fn from(defaults: &PreviewDefaults) -> Self {
        Self {
            debounce: Duration::from_millis(defaults.debounce_ms),
            settle: Duration::from_millis(defaults.settle_ms),
            segment_secs: defaults.segment_secs,
            playback_failure_threshold: defaults.playback_failure_threshold,
        }
    }
}

/// Immutable snapshot of the inputs for one render, taken at schedule time.
#[derive(Debug, Clone)]
struct PreviewRequest {
    config: EncodingConfiguration,
    mode: PreviewMode,
    time_secs: f64,
    source: PathBuf,
    fingerprint: PreviewFingerprint,
}

/// Point-in-time view of the panel for the host UI.
#[derive(Debug, Clone)]
pub struct PanelSnapshot {
    pub state: GenerationState,
    pub artifact: Option<PreviewArtifact>,
    pub error: Option<String>,
    pub metadata: Option<VideoMetadata>,
    pub low_bitrate_warning: bool,
}

struct PanelState {
    visible: bool,
    mode: PreviewMode,
    config: Option<EncodingConfiguration>,
    time_secs: f64,
    source: Option<PathBuf>,
    metadata: Option<VideoMetadata>,
    state: GenerationState,
    error: Option<String>,
    artifact: Option<PreviewArtifact>,
    /// Fingerprint of the last *successfully executed* render. Never
    /// updated on failure, never speculatively.
    memo: Option<PreviewFingerprint>,
    backoff: PlaybackBackoff,
    debounce_task: Option<tokio::task::JoinHandle<()>>,
    /// Bumped on every arm/cancel so a fired timer only clears its own
    /// handle, never a newer one armed behind it.
    debounce_seq: u64,
}

impl PanelState {
    fn new(playback_failure_threshold: u32) -> Self {
        Self {
            visible: false,
            mode: PreviewMode::Frame,
            config: None,
            time_secs: 0.0,
            source: None,
            metadata: None,
            state: GenerationState::Idle,
            error: None,
            artifact: None,
            memo: None,
            backoff: PlaybackBackoff::new(playback_failure_threshold),
            debounce_task: None,
            debounce_seq: 0,
        }
    }
}

struct Shared<B> {
    backend: B,
    options: CoordinatorOptions,
    panel: Mutex<PanelState>,
    /// Concurrency guard: true while a backend render is outstanding.
    generating: AtomicBool,
}

/// The preview scheduler. Cheap to clone; all clones share one panel.
pub struct PreviewCoordinator<B> {
    shared: Arc<Shared<B>>,
}

impl<B> Clone for PreviewCoordinator<B> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<B: RenderBackend + 'static> PreviewCoordinator<B> {
    pub fn new(backend: B, options: CoordinatorOptions) -> Self {
        let threshold = options.playback_failure_threshold;
        Self {
            shared: Arc::new(Shared {
                backend,
                options,
                panel: Mutex::new(PanelState::new(threshold)),
                generating: AtomicBool::new(false),
            }),
        }
    }

    /// Show or hide the panel. Becoming visible re-evaluates the trigger
    /// conditions (a hidden panel never schedules work).
    pub fn set_visible(&self, visible: bool) {
        {
            let mut panel = self.panel();
            if panel.visible == visible {
                return;
            }
            panel.visible = visible;
            if !visible {
                // A hidden panel never renders; its armed timer goes too.
                Self::cancel_debounce(&mut panel);
            }
        }
        if visible {
            self.evaluate();
        }
    }

    /// Switch between frame and video preview. The artifact belonging to
    /// the mode being left is discarded immediately.
    pub fn set_mode(&self, mode: PreviewMode) {
        {
            let mut panel = self.panel();
            if panel.mode == mode {
                return;
            }
            panel.mode = mode;
            if panel.artifact.as_ref().is_some_and(|a| a.mode() != mode) {
                panel.artifact = None;
                panel.backoff.reset();
            }
        }
        self.evaluate();
    }

    /// Replace the configuration snapshot (continuous trigger).
    pub fn update_config(&self, config: EncodingConfiguration) {
        {
            self.panel().config = Some(config);
        }
        self.evaluate();
    }

    /// Point the panel at a new source file. Metadata is re-fetched when,
    /// and only when, the path actually changes.
    pub async fn set_source(&self, source: PathBuf) {
        {
            let mut panel = self.panel();
            if panel.source.as_ref() == Some(&source) {
                return;
            }
            panel.source = Some(source.clone());
            panel.metadata = None;
            panel.artifact = None;
            panel.backoff.reset();
            Self::cancel_debounce(&mut panel);
        }

        tracing::info!(source = %source.display(), "Probing new source");
        match self.shared.backend.get_video_metadata(&source).await {
            Ok(metadata) => {
                {
                    let mut panel = self.panel();
                    // Another set_source may have raced past this probe.
                    if panel.source.as_ref() != Some(&source) {
                        return;
                    }
                    panel.metadata = Some(metadata);
                    if matches!(panel.state, GenerationState::Error(_)) {
                        panel.state = GenerationState::Idle;
                        panel.error = None;
                    }
                }
                self.evaluate();
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(error = %message, "Source probe failed");
                let mut panel = self.panel();
                if panel.source.as_ref() != Some(&source) {
                    return;
                }
                panel.error = Some(message.clone());
                panel.state = GenerationState::Error(message);
            }
        }
    }

    /// Discrete time-seek trigger: cancel any pending timer and render
    /// immediately, without the debounce delay.
    pub async fn seek(&self, time_secs: f64) {
        let request = {
            let mut panel = self.panel();
            panel.time_secs = time_secs;
            if !panel.visible || panel.metadata.is_none() {
                return;
            }
            let Some(request) = Self::request_from(&panel) else {
                return;
            };
            Self::cancel_debounce(&mut panel);
            request
        };
        self.generate(request, false).await;
    }

    /// Forced trigger: render now, even if the fingerprint matches the
    /// memo and even if another generation is in flight. Also retries the
    /// metadata probe if the last one failed.
    pub async fn refresh(&self) {
        let (source, have_metadata) = {
            let panel = self.panel();
            (panel.source.clone(), panel.metadata.is_some())
        };
        let Some(source) = source else {
            tracing::warn!("Refresh requested with no source loaded");
            return;
        };

        if !have_metadata {
            match self.shared.backend.get_video_metadata(&source).await {
                Ok(metadata) => {
                    self.panel().metadata = Some(metadata);
                }
                Err(e) => {
                    let message = e.to_string();
                    let mut panel = self.panel();
                    panel.error = Some(message.clone());
                    panel.state = GenerationState::Error(message);
                    return;
                }
            }
        }

        let request = {
            let mut panel = self.panel();
            let Some(request) = Self::request_from(&panel) else {
                return;
            };
            Self::cancel_debounce(&mut panel);
            request
        };
        self.generate(request, true).await;
    }

    /// Report that the player failed to decode a frame of the current
    /// video segment. The third consecutive failure abandons the segment.
    pub fn playback_decode_failed(&self) {
        let mut panel = self.panel();
        if !panel
            .artifact
            .as_ref()
            .is_some_and(|a| a.mode() == PreviewMode::Video)
        {
            return;
        }
        if panel.backoff.record_failure() {
            let message = PeekframeError::playback_decode(
                "segment failed to play repeatedly; refresh to regenerate",
            )
            .to_string();
            tracing::warn!("Abandoning unplayable preview segment");
            panel.artifact = None;
            panel.error = Some(message.clone());
            panel.state = GenerationState::Error(message);
            // The fingerprint memo stays intact: the settings didn't
            // change, so only a forced refresh regenerates.
        }
    }

    /// Report a successful playback frame decode; resets the failure
    /// streak.
    pub fn playback_decode_ok(&self) {
        self.panel().backoff.record_success();
    }

    /// Point-in-time view for the host UI.
    pub fn snapshot(&self) -> PanelSnapshot {
        let panel = self.panel();
        PanelSnapshot {
            state: panel.state.clone(),
            artifact: panel.artifact.clone(),
            error: panel.error.clone(),
            metadata: panel.metadata,
            low_bitrate_warning: panel
                .config
                .as_ref()
                .is_some_and(|c| c.low_bitrate_warning()),
        }
    }

    /// Continuous trigger evaluation: arm (or re-arm) the debounce timer
    /// unless nothing render-relevant changed.
    fn evaluate(&self) {
        let mut panel = self.panel();
        if !panel.visible || panel.metadata.is_none() {
            return;
        }
        let Some(request) = Self::request_from(&panel) else {
            return;
        };
        if panel.memo.as_ref() == Some(&request.fingerprint) {
            // Loop-breaking guard: this exact render already succeeded. A
            // timer armed for an intermediate edit carries a snapshot that
            // no longer reflects the panel and must not fire.
            Self::cancel_debounce(&mut panel);
            return;
        }
        Self::cancel_debounce(&mut panel);
        if panel.state != GenerationState::Generating {
            panel.state = GenerationState::Scheduled;
        }

        // Armed under the lock so a racing seek/refresh can always cancel
        // it; the task itself does nothing until the timer fires.
        panel.debounce_seq = panel.debounce_seq.wrapping_add(1);
        let seq = panel.debounce_seq;
        let debounce = self.shared.options.debounce;
        let coordinator = self.clone();
        panel.debounce_task = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            {
                let mut panel = coordinator.panel();
                if panel.debounce_seq == seq {
                    panel.debounce_task = None;
                }
            }
            coordinator.generate(request, false).await;
        }));
    }

    /// Enter the Generating state and run one render cycle.
    async fn generate(&self, request: PreviewRequest, forced: bool) {
        if forced {
            self.shared.generating.store(true, Ordering::SeqCst);
        } else if self.shared.generating.swap(true, Ordering::SeqCst) {
            // Drop-on-contention: not queued, not retried.
            tracing::debug!(
                fingerprint = %request.fingerprint,
                "Render already in flight; trigger dropped"
            );
            return;
        }

        self.panel().state = GenerationState::Generating;
        tracing::info!(
            mode = %request.mode,
            time_secs = request.time_secs,
            forced,
            "Generating preview"
        );

        let outcome = self.render(&request).await;

        let mut panel = self.panel();
        match outcome {
            Ok(artifact) => {
                panel.memo = Some(request.fingerprint);
                // A stale artifact must never outlive a mode switch.
                if artifact.mode() == panel.mode {
                    panel.artifact = Some(artifact);
                    panel.backoff.reset();
                } else {
                    tracing::debug!("Discarding artifact for an inactive mode");
                }
                panel.error = None;
                // An edit may have armed a timer behind this render.
                panel.state = if panel.debounce_task.is_some() {
                    GenerationState::Scheduled
                } else {
                    GenerationState::Idle
                };
            }
            Err(message) => {
                tracing::warn!(error = %message, "Preview generation failed");
                panel.error = Some(message.clone());
                panel.state = GenerationState::Error(message);
                // Memo untouched: the same settings will be retried on the
                // next qualifying trigger.
            }
        }
        drop(panel);
        self.shared.generating.store(false, Ordering::SeqCst);
    }

    /// Issue the backend calls for one request.
    async fn render(&self, request: &PreviewRequest) -> Result<PreviewArtifact, String> {
        match request.mode {
            PreviewMode::Frame => {
                let baseline = EncodingConfiguration::baseline();
                let original = self
                    .shared
                    .backend
                    .get_preview_frame(&request.source, request.time_secs, &baseline)
                    .await
                    .map_err(|e| e.to_string())?;
                let processed = self
                    .shared
                    .backend
                    .get_preview_frame(&request.source, request.time_secs, &request.config)
                    .await
                    .map_err(|e| e.to_string())?;
                Ok(PreviewArtifact::FramePair {
                    original,
                    processed,
                })
            }
            PreviewMode::Video => {
                let locator = self
                    .shared
                    .backend
                    .get_preview_video_segment(
                        &request.source,
                        request.time_secs,
                        self.shared.options.segment_secs,
                        &request.config,
                    )
                    .await
                    .map_err(|e| e.to_string())?;
                if locator.trim().is_empty() {
                    return Err("Video segment error: backend returned an empty locator".into());
                }
                // Let the backend release its filesystem lock before a
                // player opens the file.
                tokio::time::sleep(self.shared.options.settle).await;
                Ok(PreviewArtifact::VideoSegment { locator })
            }
        }
    }

    fn request_from(panel: &PanelState) -> Option<PreviewRequest> {
        let config = panel.config.clone()?;
        let source = panel.source.clone()?;
        let fingerprint = PreviewFingerprint::compute(
            &config,
            panel.mode,
            panel.time_secs,
            &source.to_string_lossy(),
        );
        Some(PreviewRequest {
            config,
            mode: panel.mode,
            time_secs: panel.time_secs,
            source,
            fingerprint,
        })
    }

    /// Cancellation-of-intent: only a pending, not-yet-fired timer can be
    /// cancelled; in-flight backend work always runs to completion.
    fn cancel_debounce(panel: &mut PanelState) {
        if let Some(handle) = panel.debounce_task.take() {
            handle.abort();
            panel.debounce_seq = panel.debounce_seq.wrapping_add(1);
            if panel.state == GenerationState::Scheduled {
                panel.state = GenerationState::Idle;
            }
        }
    }

    fn panel(&self) -> MutexGuard<'_, PanelState> {
        self.shared
            .panel
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_mirror_preview_defaults() {
        let options = CoordinatorOptions::default();
        assert_eq!(options.debounce, Duration::from_millis(5000));
        assert_eq!(options.settle, Duration::from_millis(150));
        assert_eq!(options.segment_secs, 3.0);
        assert_eq!(options.playback_failure_threshold, 3);
    }
}
