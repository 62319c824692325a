//! Intro cutscene
//!
//! Title card fades out, then the fox lies silent, narrates, flips over and
//! finally walks off with a speech bubble. Purely timer driven.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::story::{StoryConfig, StoryTeller};
use super::{SceneEvent, SceneId};
use crate::error::{ConfigError, non_negative, positive};
use crate::input::{FrameInput, Key};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntroConfig {
    pub title: String,
    pub title_fade_delay: f32,
    pub title_fade_duration: f32,
    /// State boundaries (seconds since scene start)
    pub silent_end: f32,
    pub talking_end: f32,
    pub flipping_end: f32,
    pub end_at: f32,
    pub fox_start: Vec2,
    /// World units per second while walking
    pub fox_walk_speed: f32,
    pub narration: String,
    pub bubble_text: String,
    pub bubble_offset: Vec2,
    pub story: StoryConfig,
}

impl Default for IntroConfig {
    fn default() -> Self {
        Self {
            title: "Based on a true story".to_string(),
            title_fade_delay: 1.0,
            title_fade_duration: 1.0,
            silent_end: 3.0,
            talking_end: 6.5,
            flipping_end: 8.0,
            end_at: 10.0,
            // 580 with the 60 unit visual lift applied
            fox_start: Vec2::new(360.0, 520.0),
            fox_walk_speed: 240.0,
            narration: "The wizard Fox awakens to the new day with a hungover curse...".to_string(),
            bubble_text: "Potions...".to_string(),
            bubble_offset: Vec2::new(70.0, -70.0),
            story: StoryConfig::default(),
        }
    }
}

impl IntroConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("title_fade_delay", self.title_fade_delay)?;
        non_negative("title_fade_duration", self.title_fade_duration)?;
        non_negative("silent_end", self.silent_end)?;
        non_negative("talking_end", self.talking_end)?;
        non_negative("flipping_end", self.flipping_end)?;
        positive("end_at", self.end_at)?;
        non_negative("fox_walk_speed", self.fox_walk_speed)?;
        self.story.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FoxState {
    Silent,
    Talking,
    Flipping,
    Walking,
}

/// Which fox sprite the host should draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FoxPose {
    TiredFlipped,
    Tired,
    Frown,
}

impl FoxState {
    pub fn pose(&self) -> FoxPose {
        match self {
            FoxState::Silent | FoxState::Talking => FoxPose::TiredFlipped,
            FoxState::Flipping => FoxPose::Tired,
            FoxState::Walking => FoxPose::Frown,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IntroCutscene {
    config: IntroConfig,
    timer: f32,
    title_alpha: f32,
    fox_pos: Vec2,
    fox_state: FoxState,
    storyteller: Option<StoryTeller>,
    narration_started: bool,
}

impl IntroCutscene {
    pub fn new(config: IntroConfig) -> Self {
        log::info!("Intro cutscene started");
        Self {
            fox_pos: config.fox_start,
            config,
            timer: 0.0,
            title_alpha: 1.0,
            fox_state: FoxState::Silent,
            storyteller: None,
            narration_started: false,
        }
    }

    pub fn update(&mut self, dt: f32, input: &FrameInput) -> Option<SceneEvent> {
        if input.just_pressed(Key::Enter) {
            log::info!("Intro skipped");
            return Some(SceneEvent::GoTo(SceneId::Platform));
        }

        self.timer += dt;

        if self.timer > self.config.title_fade_delay && self.title_alpha > 0.0 {
            self.title_alpha = if self.config.title_fade_duration > 0.0 {
                (self.title_alpha - dt / self.config.title_fade_duration).max(0.0)
            } else {
                0.0
            };
        }

        self.fox_state = self.state_at(self.timer);

        if self.fox_state == FoxState::Talking && !self.narration_started {
            self.narration_started = true;
            self.storyteller = Some(StoryTeller::new(&self.config.narration, self.config.story.clone()));
        }
        if let Some(teller) = self.storyteller.as_mut() {
            teller.update(dt);
            if teller.is_finished() {
                self.storyteller = None;
            }
        }

        if self.background_visible() && self.fox_state == FoxState::Walking {
            self.fox_pos.x += self.config.fox_walk_speed * dt;
        }

        if self.timer > self.config.end_at {
            return Some(SceneEvent::GoTo(SceneId::Platform));
        }
        None
    }

    fn state_at(&self, t: f32) -> FoxState {
        if t < self.config.silent_end {
            FoxState::Silent
        } else if t < self.config.talking_end {
            FoxState::Talking
        } else if t < self.config.flipping_end {
            FoxState::Flipping
        } else {
            FoxState::Walking
        }
    }

    pub fn title(&self) -> &str {
        &self.config.title
    }

    pub fn title_alpha(&self) -> f32 {
        self.title_alpha
    }

    /// Background and fox appear once the title is gone
    pub fn background_visible(&self) -> bool {
        self.title_alpha <= 0.0
    }

    pub fn fox_state(&self) -> FoxState {
        self.fox_state
    }

    pub fn fox_pose(&self) -> Option<FoxPose> {
        self.background_visible().then(|| self.fox_state.pose())
    }

    pub fn fox_pos(&self) -> Vec2 {
        self.fox_pos
    }

    pub fn narration(&self) -> Option<&StoryTeller> {
        self.storyteller.as_ref()
    }

    /// Speech bubble anchor and text while the fox walks
    pub fn bubble(&self) -> Option<(Vec2, &str)> {
        (self.background_visible() && self.fox_state == FoxState::Walking)
            .then(|| (self.fox_pos + self.config.bubble_offset, self.config.bubble_text.as_str()))
    }
}
