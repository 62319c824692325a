//! Deterministic gameplay rules
//!
//! Everything here is driven by frame deltas and `FrameInput` snapshots:
//! - Simulated time only (no wall clock, no blocking waits)
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod combat;
pub mod intro;
pub mod movement;
pub mod platform;
pub mod story;
pub mod topdown;
pub mod walkability;

use serde::{Deserialize, Serialize};

pub use combat::{
    CombatConfig, CombatObserver, CombatResult, CombatSession, DEFAULT_ALPHABET, FailureReason,
    Outcome, RoundPrompt,
};
pub use intro::{FoxPose, FoxState, IntroConfig, IntroCutscene};
pub use movement::{
    Actor, MovementConfig, MovementResolution, SnapOutcome, resolve_movement,
    snap_to_nearest_walkable,
};
pub use platform::{PlatformConfig, PlatformLevel, PlatformPose};
pub use story::{StoryConfig, StoryPhase, StoryTeller};
pub use topdown::{Facing, TopDownConfig, TopDownLevel};
pub use walkability::{DEFAULT_THRESHOLD, MaskImage, WalkabilityField};

/// Top-level scenes the player can be in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneId {
    Intro,
    Platform,
    TopDown,
}

/// What a scene asks the scheduler to do after its update
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// Replace everything with a fresh instance of this scene
    GoTo(SceneId),
    /// Pause this scene and open a combat overlay
    StartCombat(CombatConfig),
}
