//! Adaptive Assistance
//!
//! Scores how much a user is struggling from the shape of a finger path
//! and switches between two assistance profiles. A struggling user gets
//! slower speech and wider hit boxes.
//!
//! Scoring itself is delegated to a [`StruggleModel`]; this module only
//! extracts and standardizes the path features, and maps the score onto
//! [`AdaptiveSettings`].

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::Point;

/// Fewest samples a path needs before it can be scored
pub const MIN_PATH_SAMPLES: usize = 5;

/// Feature means used for standardization (velocity, jitter, duration)
pub const FEATURE_MEAN: [f32; 3] = [550.0, 10.5, 3.2];

/// Feature scales used for standardization (velocity, jitter, duration)
pub const FEATURE_SCALE: [f32; 3] = [120.0, 5.2, 2.1];

/// Score above which the beginner profile is selected
pub const STRUGGLE_THRESHOLD: f32 = 0.5;

/// One sample of a finger path
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathSample {
    /// Finger position
    pub point: Point,
    /// When it was there
    pub at: Instant,
}

/// Raw features of a finger path
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathFeatures {
    /// Straight-line distance from first to last sample per second
    pub velocity: f32,
    /// Summed per-step Manhattan distance divided by the sample count
    pub jitter: f32,
    /// Seconds from first to last sample
    pub duration: f32,
}

impl PathFeatures {
    /// Extract features; `None` for paths shorter than [`MIN_PATH_SAMPLES`]
    #[must_use]
    pub fn from_path(path: &[PathSample]) -> Option<Self> {
        if path.len() < MIN_PATH_SAMPLES {
            return None;
        }
        let (first, last) = (path.first()?, path.last()?);

        let duration = last.at.saturating_duration_since(first.at).as_secs_f32();
        let distance = first.point.distance_to(last.point);
        let velocity = if duration > 0.0 { distance / duration } else { 0.0 };

        let deviance: f32 = path
            .windows(2)
            .map(|pair| {
                let (dx, dy) = pair[1].point.delta_from(pair[0].point);
                dx.abs() + dy.abs()
            })
            .sum();
        #[allow(clippy::cast_precision_loss)]
        let jitter = deviance / path.len() as f32;

        Some(Self {
            velocity,
            jitter,
            duration,
        })
    }

    /// Features as `[velocity, jitter, duration]`, standardized
    #[must_use]
    pub fn standardized(&self) -> [f32; 3] {
        let raw = [self.velocity, self.jitter, self.duration];
        let mut out = [0.0; 3];
        for (i, value) in raw.iter().enumerate() {
            out[i] = (value - FEATURE_MEAN[i]) / FEATURE_SCALE[i];
        }
        out
    }
}

/// Maps standardized path features to a struggle score in [0, 1]
pub trait StruggleModel: Send {
    /// Score a standardized `[velocity, jitter, duration]` vector
    fn predict(&self, features: [f32; 3]) -> f32;
}

/// Logistic regression over the standardized features
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogisticStruggleModel {
    /// Per-feature weights
    pub weights: [f32; 3],
    /// Intercept
    pub bias: f32,
}

impl Default for LogisticStruggleModel {
    fn default() -> Self {
        // Slow, jittery, long gestures read as struggling
        Self {
            weights: [-1.2, 1.5, 0.8],
            bias: 0.0,
        }
    }
}

impl StruggleModel for LogisticStruggleModel {
    fn predict(&self, features: [f32; 3]) -> f32 {
        let z: f32 = self
            .weights
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f32>()
            + self.bias;
        1.0 / (1.0 + (-z).exp())
    }
}

/// Score a path, if it is long enough
pub fn score_path(model: &dyn StruggleModel, path: &[PathSample]) -> Option<f32> {
    let features = PathFeatures::from_path(path)?;
    let score = model.predict(features.standardized());
    debug!(score, ?features, "Scored gesture path");
    Some(score)
}

/// Assistance level
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssistLevel {
    /// Slower speech, wider hit boxes
    Beginner,
    /// Platform defaults
    #[default]
    Expert,
}

/// Settings the session applies for an assistance level
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveSettings {
    /// Speech rate for every subsequent utterance
    pub speech_rate: f32,
    /// Hit-box padding in every direction
    pub hit_padding: f32,
    /// Level these settings represent
    pub level: AssistLevel,
}

impl Default for AdaptiveSettings {
    fn default() -> Self {
        Self::expert()
    }
}

impl AdaptiveSettings {
    /// Profile for a struggling user
    #[must_use]
    pub fn beginner() -> Self {
        Self {
            speech_rate: 0.7,
            hit_padding: 25.0,
            level: AssistLevel::Beginner,
        }
    }

    /// Default profile
    #[must_use]
    pub fn expert() -> Self {
        Self {
            speech_rate: 1.0,
            hit_padding: 0.0,
            level: AssistLevel::Expert,
        }
    }

    /// Pick a profile from a struggle score
    #[must_use]
    pub fn from_score(score: f32) -> Self {
        if score > STRUGGLE_THRESHOLD {
            Self::beginner()
        } else {
            Self::expert()
        }
    }
}

/// Collects the finger path between press and release
#[derive(Clone, Debug, Default)]
pub struct PathRecorder {
    samples: Vec<PathSample>,
    recording: bool,
}

impl PathRecorder {
    /// Start a fresh path at the press point
    pub fn start(&mut self, point: Point, at: Instant) {
        self.samples.clear();
        self.samples.push(PathSample { point, at });
        self.recording = true;
    }

    /// Append a sample while recording
    pub fn push(&mut self, point: Point, at: Instant) {
        if self.recording {
            self.samples.push(PathSample { point, at });
        }
    }

    /// Stop recording and hand back the path
    pub fn finish(&mut self, point: Point, at: Instant) -> Vec<PathSample> {
        self.push(point, at);
        self.recording = false;
        std::mem::take(&mut self.samples)
    }

    /// Samples recorded so far
    #[must_use]
    pub fn samples(&self) -> &[PathSample] {
        &self.samples
    }
}
