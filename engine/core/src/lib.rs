//! Engine Core - Headless Touch Navigation for vision-bridge
//!
//! This crate provides the non-visual navigation and feedback engine that
//! every vision-bridge screen runs on. A student slides a finger across the
//! screen; whatever region is under the finger is spoken aloud, and a
//! double or triple tap confirms or advances. The crate has no rendering and
//! no platform bindings: layout, navigation, audio playback and the speech,
//! haptic and tone devices are all traits the host implements.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          Host / Platform                          │
//! │  touch layer      LayoutProbe     NavigationSink     OutputDevices│
//! └──────┬───────────────▲─────────────────▲──────────────────▲───────┘
//!        │ PointerEvent  │ measure         │ navigate         │ speak/haptic/tone
//! ┌──────▼───────────────┴─────────────────┴──────────────────┴───────┐
//! │                          ENGINE CORE                               │
//! │  ┌─────────────────────────────────────┐     ┌──────────────────┐  │
//! │  │ SessionRuntime (tokio select! loop) │     │  FeedbackTask    │  │
//! │  │  ┌───────────────────────────────┐  │     │  (cancel-then-   │  │
//! │  │  │ GestureSession                │  │────►│   speak)         │  │
//! │  │  │  Registry · Measurement       │  │ mpsc└──────────────────┘  │
//! │  │  │  Focus · Taps · Scroll-Follow │  │                           │
//! │  │  └──────────────┬────────────────┘  │                           │
//! │  └─────────────────┼───────────────────┘                           │
//! │                    ▼ ScreenHandler (per-screen policy)              │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`GestureSession`]: the per-screen press/move/release state machine
//! - [`ScreenHandler`]: what a screen mounts and what its gestures mean
//! - [`SessionRuntime`]: drives a session on a tokio task
//! - [`FeedbackChannel`]: the only way to make the device speak or vibrate
//! - [`MediaScrubController`]: swipe-to-seek and swipe-to-volume
//! - [`EngineConfig`]: timing and threshold configuration
//!
//! # Module Overview
//!
//! - [`geometry`]: points and rectangles in screen coordinates
//! - [`region`]: the Region Registry
//! - [`measurement`]: bounded-retry region measurement
//! - [`focus`]: hit-testing and focus tracking
//! - [`tap`]: multi-tap classification
//! - [`scroll`]: scroll-follow for long lists
//! - [`feedback`]: speech, haptic and tone output
//! - [`session`]: the Gesture Session Controller
//! - [`runtime`]: tokio driver for a session
//! - [`media`]: the Media Scrub Controller
//! - [`adaptive`]: struggle scoring and assistance profiles
//! - [`navigation`]: navigation requests
//! - [`config`]: TOML and environment configuration
//! - [`test_utils`]: recording doubles for every host collaborator

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod adaptive;
pub mod config;
pub mod events;
pub mod feedback;
pub mod focus;
pub mod geometry;
pub mod measurement;
pub mod media;
pub mod navigation;
pub mod region;
pub mod runtime;
pub mod scroll;
pub mod session;
pub mod tap;
pub mod test_utils;

// Re-exports for convenience
pub use adaptive::{AdaptiveSettings, AssistLevel, LogisticStruggleModel, PathRecorder, StruggleModel};
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigSource,
    EngineConfig, EngineToml,
};
pub use events::{PointerEvent, PointerPhase, SessionOutput};
pub use feedback::{
    FeedbackChannel, FeedbackError, FeedbackRequest, FeedbackTask, HapticKind, HapticMotor,
    ImpactLevel, NotificationKind, OutputDevices, SpeechEngine, TonePlayer,
};
pub use focus::{hit_test, FocusChange, FocusState, FocusTracker};
pub use geometry::{Point, Rect};
pub use measurement::{LayoutProbe, MeasureStatus, Measurement, MeasurementConfig, MeasurementService};
pub use media::{
    format_time, MediaScrubController, MediaSource, PlaybackError, PlaybackSink, PlaybackState,
    PlaybackStatus, ScrubAction, ScrubConfig,
};
pub use navigation::{NavigationRequest, NavigationSink};
pub use region::{Region, RegionId, RegionRegistry, RegionSpec, RegistryError};
pub use runtime::{RuntimeError, SessionHandle, SessionInput, SessionRuntime};
pub use scroll::{ScrollContainer, ScrollFollowConfig, ScrollFollowController, ScrollOffset};
pub use session::{
    GestureSession, GestureState, ScreenCommand, ScreenContext, ScreenHandler, ScreenMount,
    SessionPolicy, SELECT_FIRST_HINT,
};
pub use tap::{TapClassifier, TapConfig, TapGesture, TapPolicy, TapRecord};

/// Install a `RUST_LOG`-aware fmt subscriber for hosts
///
/// Defaults to `engine_core=info` when `RUST_LOG` is unset. Returns `false`
/// if a global subscriber was already installed.
pub fn init_tracing() -> bool {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("engine_core=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
