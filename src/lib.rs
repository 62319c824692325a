//! Ketunkolo - a fox's hungover morning in three scenes
//!
//! Core modules:
//! - `sim`: Deterministic gameplay rules (combat, walkability, levels, cutscene)
//! - `game`: Scene stack and per-frame dispatch
//! - `input`: Per-frame keyboard/pointer snapshot fed in by the host
//! - `meter`: The decaying "segis" player stat
//! - `settings`: Persisted player preferences

pub mod error;
pub mod game;
pub mod input;
pub mod meter;
pub mod settings;
pub mod sim;

pub use error::ConfigError;
pub use game::{Game, Layer, SceneId};
pub use input::{FrameInput, Key};
pub use meter::{Rgb, SegisMeter, rainbow_color};
pub use settings::{Settings, Theme};

/// Game configuration constants
pub mod consts {
    /// Logical viewport size (matches the host canvas)
    pub const VIEW_WIDTH: f32 = 800.0;
    pub const VIEW_HEIGHT: f32 = 600.0;

    /// Scene frame delta ceiling (seconds) to survive tab throttling
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Combat clock ceiling (seconds); tighter than scenes so a resumed tab
    /// can't time out a prompt in one frame
    pub const COMBAT_MAX_STEP: f32 = 0.05;

    /// Fallback frame delta when the host reports none
    pub const DEFAULT_DT: f32 = 1.0 / 60.0;

    /// Segis meter bounds
    pub const SEGIS_MAX: f32 = 100.0;
    /// Default segis decay (units per second)
    pub const SEGIS_DECAY_RATE: f32 = 0.01;
}

/// Clamp a host-reported frame delta into `[0, max]`, treating NaN as zero
#[inline]
pub fn clamp_dt(dt: f32, max: f32) -> f32 {
    if dt.is_nan() { 0.0 } else { dt.clamp(0.0, max) }
}
