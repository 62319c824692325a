//! Scene stack and per-frame dispatch
//!
//! The bottom layer is the current scene; a combat overlay may sit on top of
//! a level. Only the top layer runs each frame, everything beneath is paused.
//! Dropping a layer is its teardown: timers and sessions it owns go with it.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::clamp_dt;
use crate::consts::MAX_FRAME_DT;
use crate::error::ConfigError;
use crate::input::{FrameInput, Key};
use crate::meter::SegisMeter;
use crate::settings::Settings;
use crate::sim::{
    CombatConfig, CombatResult, CombatSession, IntroConfig, IntroCutscene, MaskImage, PlatformConfig, PlatformLevel,
    SceneEvent, TopDownConfig, TopDownLevel,
};

pub use crate::sim::SceneId;

/// Per-scene configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub intro: IntroConfig,
    pub platform: PlatformConfig,
    pub topdown: TopDownConfig,
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.intro.validate()?;
        self.platform.validate()?;
        self.topdown.validate()
    }

    /// Same config with fades and the combat result flash made instant
    pub fn with_reduced_motion(&self) -> Self {
        let mut config = self.clone();
        config.intro.title_fade_duration = 0.0;
        config.intro.story.fade_duration = 0.0;
        config.platform.blackout_fade = 0.0;
        config.platform.combat.result_display = 0.0;
        config
    }
}

/// One entry on the scene stack
pub enum Layer {
    Intro(IntroCutscene),
    Platform(PlatformLevel),
    TopDown(TopDownLevel),
    Combat(CombatSession),
}

impl Layer {
    /// Scene this layer belongs to (`None` for overlays)
    pub fn scene_id(&self) -> Option<SceneId> {
        match self {
            Layer::Intro(_) => Some(SceneId::Intro),
            Layer::Platform(_) => Some(SceneId::Platform),
            Layer::TopDown(_) => Some(SceneId::TopDown),
            Layer::Combat(_) => None,
        }
    }
}

pub struct Game {
    config: GameConfig,
    mask: Option<MaskImage>,
    stack: Vec<Layer>,
    meter: SegisMeter,
    settings: Settings,
    rng: Pcg32,
    frame_count: u64,
}

impl Game {
    /// Validate every scene config up front and start on the intro
    pub fn new(config: GameConfig, mask: Option<MaskImage>, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        // Catches mask/world mismatches before the player gets there
        TopDownLevel::new(config.topdown.clone(), mask.clone())?;

        let mut game = Self {
            config,
            mask,
            stack: Vec::new(),
            meter: SegisMeter::default(),
            settings: Settings::load(),
            rng: Pcg32::seed_from_u64(seed),
            frame_count: 0,
        };
        game.switch_to(SceneId::Intro);
        Ok(game)
    }

    /// Advance one host frame
    pub fn frame(&mut self, dt: f32, input: &FrameInput) {
        let dt = clamp_dt(dt, MAX_FRAME_DT);
        self.frame_count += 1;

        let hotkey = [(1, SceneId::Intro), (2, SceneId::Platform), (3, SceneId::TopDown)]
            .into_iter()
            .find(|(d, _)| input.just_pressed(Key::Digit(*d)));
        if let Some((_, id)) = hotkey {
            log::info!("Hotkey jump to {:?}", id);
            self.switch_to(id);
            return;
        }

        let event = match self.stack.last_mut() {
            Some(Layer::Combat(session)) => {
                if let Some(result) = session.tick(dt, &input.pressed) {
                    self.finish_combat(result);
                }
                None
            }
            Some(Layer::Intro(intro)) => intro.update(dt, input),
            Some(Layer::Platform(level)) => level.update(dt, input, &mut self.meter),
            Some(Layer::TopDown(level)) => {
                level.update(dt, input);
                None
            }
            None => None,
        };

        match event {
            Some(SceneEvent::GoTo(id)) => self.switch_to(id),
            Some(SceneEvent::StartCombat(config)) => self.start_combat(config),
            None => {}
        }
    }

    /// Tear down every layer and start a fresh scene
    pub fn switch_to(&mut self, id: SceneId) {
        let config = self.scene_config();
        let layer = match id {
            SceneId::Intro => Layer::Intro(IntroCutscene::new(config.intro)),
            SceneId::Platform => Layer::Platform(PlatformLevel::new(config.platform)),
            SceneId::TopDown => match TopDownLevel::new(config.topdown, self.mask.clone()) {
                Ok(level) => Layer::TopDown(level),
                Err(e) => {
                    log::error!("Can't start top-down level: {}", e);
                    return;
                }
            },
        };

        self.clear_stack();
        log::info!("Scene -> {:?}", id);
        self.stack.push(layer);
    }

    /// Config for newly started scenes, honouring the motion setting
    fn scene_config(&self) -> GameConfig {
        if self.settings.reduced_motion {
            self.config.with_reduced_motion()
        } else {
            self.config.clone()
        }
    }

    fn clear_stack(&mut self) {
        while let Some(layer) = self.stack.pop() {
            if let Layer::Combat(mut session) = layer {
                session.cancel();
            }
        }
    }

    fn start_combat(&mut self, mut config: CombatConfig) {
        if self.settings.reduced_motion {
            config.result_display = 0.0;
        }
        let seed = self.rng.random::<u64>();
        match CombatSession::start(config, seed) {
            Ok(session) => self.stack.push(Layer::Combat(session)),
            Err(e) => {
                log::error!("Combat config rejected: {}", e);
                if let Some(Layer::Platform(level)) = self.stack.last_mut() {
                    level.on_combat_cancelled();
                }
            }
        }
    }

    /// Pop the overlay and hand the result to the level beneath
    fn finish_combat(&mut self, result: CombatResult) {
        self.stack.pop();
        match self.stack.last_mut() {
            Some(Layer::Platform(level)) => level.on_combat_result(result, &mut self.meter),
            _ => log::warn!("Combat result {:?} with no level to receive it", result.outcome),
        }
    }

    /// Current scene (the bottom layer)
    pub fn scene(&self) -> Option<SceneId> {
        self.stack.first().and_then(Layer::scene_id)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.stack
    }

    pub fn top(&self) -> Option<&Layer> {
        self.stack.last()
    }

    pub fn combat(&self) -> Option<&CombatSession> {
        match self.stack.last() {
            Some(Layer::Combat(session)) => Some(session),
            _ => None,
        }
    }

    pub fn platform(&self) -> Option<&PlatformLevel> {
        self.stack.iter().find_map(|layer| match layer {
            Layer::Platform(level) => Some(level),
            _ => None,
        })
    }

    pub fn topdown(&self) -> Option<&TopDownLevel> {
        match self.stack.first() {
            Some(Layer::TopDown(level)) => Some(level),
            _ => None,
        }
    }

    pub fn intro(&self) -> Option<&IntroCutscene> {
        match self.stack.first() {
            Some(Layer::Intro(intro)) => Some(intro),
            _ => None,
        }
    }

    pub fn meter(&self) -> &SegisMeter {
        &self.meter
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
