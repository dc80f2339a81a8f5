//! Compressor configuration: dimension limit, quality schedule, default budget.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::FilterType;

/// Longest output edge, in pixels, when no configuration is supplied.
pub const DEFAULT_MAX_DIMENSION: u32 = 2048;

/// Byte budget used when the caller does not pass one (2 MiB).
pub const DEFAULT_BUDGET_BYTES: u64 = 2 * 1024 * 1024;

pub const DEFAULT_QUALITY_START: f32 = 0.9;
pub const DEFAULT_QUALITY_STEP: f32 = 0.1;
pub const DEFAULT_QUALITY_FLOOR: f32 = 0.1;

/// Smallest step the encoder can tell apart: one point on its 1-100 scale.
pub const MIN_QUALITY_STEP: f32 = 0.01;

// Absorbs float drift when counting steps between start and floor
const LEVEL_EPSILON: f64 = 1e-4;

/// Errors raised when a configuration cannot be used.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("max_dimension must be at least 1 pixel")]
    ZeroMaxDimension,

    #[error("default_budget must be at least 1 byte")]
    ZeroBudget,

    /// A quality bound outside (0, 1].
    #[error("quality {field} must be in (0, 1], got {value}")]
    QualityOutOfRange { field: &'static str, value: f32 },

    #[error("quality step must be in [0.01, 1], got {0}")]
    InvalidStep(f32),

    #[error("quality floor ({floor}) must not exceed start ({start})")]
    FloorAboveStart { floor: f32, start: f32 },
}

/// Encoder fidelity on a 0-1 scale.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct QualityLevel(f32);

impl QualityLevel {
    pub fn new(value: f32) -> Self {
        Self(value)
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Map onto the JPEG encoder's integer 1-100 scale (0.9 -> 90).
    pub fn encoder_quality(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Descending sequence of quality levels tried during the budget search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualitySchedule {
    /// First (highest) quality tried.
    pub start: f32,
    /// Amount subtracted after each over-budget attempt.
    pub step: f32,
    /// Last quality tried; its output is accepted whatever its size.
    pub floor: f32,
}

impl Default for QualitySchedule {
    fn default() -> Self {
        Self {
            start: DEFAULT_QUALITY_START,
            step: DEFAULT_QUALITY_STEP,
            floor: DEFAULT_QUALITY_FLOOR,
        }
    }
}

impl QualitySchedule {
    /// Check the bounds that keep the schedule finite and descending.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("start", self.start), ("floor", self.floor)] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::QualityOutOfRange { field, value });
            }
        }
        if !(self.step >= MIN_QUALITY_STEP && self.step <= 1.0) {
            return Err(ConfigError::InvalidStep(self.step));
        }
        if self.floor > self.start {
            return Err(ConfigError::FloorAboveStart {
                floor: self.floor,
                start: self.start,
            });
        }
        Ok(())
    }

    /// Expand into the concrete levels, highest first.
    ///
    /// Levels above the floor are rounded to the nearest 0.01 and each maps
    /// to a distinct encoder quality. The last level is always exactly `floor`,
    /// and the list is never empty. With the defaults this yields
    /// 0.9, 0.8, ..., 0.2, 0.1.
    pub fn levels(&self) -> Vec<QualityLevel> {
        let floor = QualityLevel(self.floor);
        let start = f64::from(self.start);
        let step = f64::from(self.step);
        let span = start - f64::from(self.floor);

        // Steps below the encoder's resolution yield only the floor; at most
        // one level per encoder point
        let above_floor = if step >= f64::from(MIN_QUALITY_STEP) && span > LEVEL_EPSILON {
            ((span / step - LEVEL_EPSILON).ceil() as usize).min(100)
        } else {
            0
        };

        let mut levels: Vec<QualityLevel> = Vec::with_capacity(above_floor + 1);
        for i in 0..above_floor {
            let level = QualityLevel(round_hundredths(start - step * i as f64));
            let quality = level.encoder_quality();
            let distinct = levels
                .last()
                .map_or(true, |prev| prev.encoder_quality() > quality);
            if distinct && quality > floor.encoder_quality() {
                levels.push(level);
            }
        }
        levels.push(floor);
        levels
    }
}

fn round_hundredths(value: f64) -> f32 {
    ((value * 100.0).round() / 100.0) as f32
}

/// Full configuration surface of the compressor.
///
/// Missing fields deserialize to their defaults, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Longest allowed output edge in pixels.
    pub max_dimension: u32,
    pub quality: QualitySchedule,
    /// Budget applied by callers that do not pass one.
    pub default_budget: u64,
    /// Resampling filter used when downscaling.
    pub filter: FilterType,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
            quality: QualitySchedule::default(),
            default_budget: DEFAULT_BUDGET_BYTES,
            filter: FilterType::default(),
        }
    }
}

impl CompressionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_dimension == 0 {
            return Err(ConfigError::ZeroMaxDimension);
        }
        if self.default_budget == 0 {
            return Err(ConfigError::ZeroBudget);
        }
        self.quality.validate()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: any valid schedule yields strictly descending encoder qualities ending on the floor.
        #[test]
        fn prop_levels_descend_to_floor(
            floor in 0.01f32..=1.0,
            span in 0.0f32..=1.0,
            step in 0.01f32..=1.0,
        ) {
            let start = (floor + span).min(1.0);
            let schedule = QualitySchedule { start, step, floor };
            prop_assert!(schedule.validate().is_ok());

            let levels = schedule.levels();
            prop_assert!(!levels.is_empty());
            prop_assert_eq!(levels.last().map(|l| l.value()), Some(floor));
            prop_assert!(levels.len() <= 101);

            for pair in levels.windows(2) {
                prop_assert!(pair[0].value() > pair[1].value());
                prop_assert!(pair[0].encoder_quality() > pair[1].encoder_quality());
            }
        }
    }
}
