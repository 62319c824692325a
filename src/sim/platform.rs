//! Platform level: the fox's room
//!
//! Side view with a sloped floor and fake depth (the fox grows as it walks
//! right). A wall blocks the left side, the fridge zone offers a potion (a
//! combat round), and walking out past the door leads to the top-down level.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::combat::{CombatConfig, CombatResult};
use super::{SceneEvent, SceneId};
use crate::consts::{VIEW_HEIGHT, VIEW_WIDTH};
use crate::error::{ConfigError, non_negative, positive};
use crate::input::{FrameInput, Key};
use crate::meter::{Rgb, SegisMeter, rainbow_color};

/// Axis-aligned rectangle, origin top-left
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub view: Vec2,
    /// Player sprite size at scale 1
    pub frame: Vec2,
    pub spawn: Vec2,
    pub floor_start: Vec2,
    pub floor_end: Vec2,
    /// Left wall position as a fraction of view width
    pub block_x_frac: f32,
    pub block_size: Vec2,
    /// Exit trigger distance past the right edge of the view
    pub exit_offset_x: f32,
    pub exit_size: Vec2,
    pub scale_min: f32,
    pub scale_max: f32,
    pub fridge_min_frac: f32,
    pub fridge_max_frac: f32,
    /// World units per second squared
    pub gravity: f32,
    /// Initial vertical velocity of a jump (negative is up)
    pub jump_velocity: f32,
    /// World units per second
    pub speed: f32,
    /// Potions that can be won per visit
    pub max_wins: u32,
    pub combat: CombatConfig,
    /// Meter gain per combat win
    pub win_reward: f32,
    /// Rainbow phase speed per meter unit per second
    pub color_speed: f32,
    pub blackout_fade: f32,
    pub blackout_hold: f32,
    pub blackout_message: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            view: Vec2::new(VIEW_WIDTH, VIEW_HEIGHT),
            frame: Vec2::new(200.0, 140.0),
            spawn: Vec2::new(VIEW_WIDTH * 0.2, 520.0),
            floor_start: Vec2::new(0.0, 510.0),
            floor_end: Vec2::new(1000.0, 710.0),
            block_x_frac: 0.13,
            block_size: Vec2::new(5.0, 800.0),
            exit_offset_x: 300.0,
            exit_size: Vec2::new(10.0, 220.0),
            scale_min: 0.6,
            scale_max: 1.6,
            fridge_min_frac: 0.48,
            fridge_max_frac: 0.68,
            gravity: 1800.0,
            jump_velocity: -600.0,
            speed: 420.0,
            max_wins: 3,
            combat: CombatConfig {
                required_rounds: 1,
                round_timeout: 3.0,
                ..Default::default()
            },
            win_reward: 5.0,
            color_speed: 0.005,
            blackout_fade: 0.8,
            blackout_hold: 3.5,
            blackout_message: "Potions too strong, better luck tomorrow".to_string(),
        }
    }
}

impl PlatformConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("view.x", self.view.x)?;
        positive("gravity", self.gravity)?;
        positive("speed", self.speed)?;
        positive("scale_min", self.scale_min)?;
        non_negative("blackout_fade", self.blackout_fade)?;
        non_negative("blackout_hold", self.blackout_hold)?;
        if self.floor_end.x == self.floor_start.x {
            return Err(ConfigError::NonPositive {
                name: "floor width",
                value: 0.0,
            });
        }
        self.combat.validate()
    }
}

/// Which fox sprite to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformPose {
    /// Before the first potion
    Frown,
    Standing,
    Jump,
    Drunk,
}

/// Fade-to-black after a lost combat, then back to the intro
#[derive(Debug, Clone, Copy, PartialEq)]
enum Blackout {
    Fading { elapsed: f32 },
    Holding { elapsed: f32 },
}

#[derive(Debug, Clone)]
pub struct PlatformLevel {
    config: PlatformConfig,
    /// Top-left of the player sprite
    pos: Vec2,
    velocity_y: f32,
    jumping: bool,
    facing_right: bool,
    speed: f32,
    did_drink: bool,
    wins: u32,
    show_drink_prompt: bool,
    in_combat: bool,
    idle_pose: PlatformPose,
    color_phase: f32,
    blackout: Option<Blackout>,
    wall: Rect,
    exit: Rect,
}

impl PlatformLevel {
    pub fn new(config: PlatformConfig) -> Self {
        let wall = Rect::new(
            config.view.x * config.block_x_frac,
            0.0,
            config.block_size.x,
            config.block_size.y,
        );
        let exit = Rect::new(
            config.view.x + config.exit_offset_x,
            config.floor_end.y - 200.0,
            config.exit_size.x,
            config.exit_size.y,
        );
        log::info!("Platform level started");

        Self {
            pos: config.spawn,
            velocity_y: 0.0,
            jumping: false,
            facing_right: true,
            speed: config.speed,
            did_drink: false,
            wins: 0,
            show_drink_prompt: false,
            in_combat: false,
            idle_pose: PlatformPose::Frown,
            color_phase: 0.0,
            blackout: None,
            wall,
            exit,
            config,
        }
    }

    /// Visual scale for fake depth, growing left to right
    pub fn scale_at(&self, x: f32) -> f32 {
        let t = (x / self.config.view.x.max(1.0)).clamp(0.0, 1.0);
        self.config.scale_min + (self.config.scale_max - self.config.scale_min) * t
    }

    /// Floor height under `x` (linear slope, extrapolated past the ends)
    pub fn floor_y(&self, x: f32) -> f32 {
        let (a, b) = (self.config.floor_start, self.config.floor_end);
        a.y + (b.y - a.y) * (x - a.x) / (b.x - a.x)
    }

    pub fn update(&mut self, dt: f32, input: &FrameInput, meter: &mut SegisMeter) -> Option<SceneEvent> {
        if self.blackout.is_some() {
            return self.advance_blackout(dt);
        }
        if self.in_combat {
            return None;
        }

        let prev_x = self.pos.x;

        self.color_phase += self.config.color_speed * meter.get() * dt;
        meter.update(dt);

        let fridge_min = self.config.view.x * self.config.fridge_min_frac;
        let fridge_max = self.config.view.x * self.config.fridge_max_frac;
        let can_drink = self.wins < self.config.max_wins && !self.did_drink;
        self.show_drink_prompt = self.pos.x >= fridge_min && self.pos.x <= fridge_max && can_drink;

        if input.is_held(Key::Left) {
            self.pos.x -= self.speed * dt;
            self.facing_right = false;
        }
        if input.is_held(Key::Right) {
            self.pos.x += self.speed * dt;
            self.facing_right = true;
        }

        if input.just_pressed(Key::Up) && !self.jumping {
            self.velocity_y = self.config.jump_velocity;
            self.jumping = true;
        }
        self.velocity_y += self.config.gravity * dt;
        self.pos.y += self.velocity_y * dt;

        let floor_y = self.floor_y(self.pos.x);
        let size = self.size();
        if self.pos.y + size.y >= floor_y {
            self.land(floor_y);
        }

        if self.body().intersects(&self.wall) {
            self.push_out_of_wall(prev_x);
            let floor_y = self.floor_y(self.pos.x);
            self.land(floor_y);
        }

        if self.body().intersects(&self.exit) {
            log::info!("Left the room");
            return Some(SceneEvent::GoTo(SceneId::TopDown));
        }

        if input.just_pressed(Key::Space) {
            return Some(SceneEvent::GoTo(SceneId::Intro));
        }

        if input.just_pressed(Key::letter('g')) && self.show_drink_prompt {
            self.show_drink_prompt = false;
            self.in_combat = true;
            log::info!("Potion challenge (wins so far: {})", self.wins);
            return Some(SceneEvent::StartCombat(self.config.combat.clone()));
        }

        None
    }

    fn land(&mut self, floor_y: f32) {
        self.pos.y = floor_y - self.size().y;
        self.velocity_y = 0.0;
        self.jumping = false;
    }

    /// Resolve by movement direction, or by nearest side when standing still
    fn push_out_of_wall(&mut self, prev_x: f32) {
        let width = self.size().x;
        let dx = self.pos.x - prev_x;
        let left_of_wall = if dx > 0.0 {
            true
        } else if dx < 0.0 {
            false
        } else {
            self.body().center_x() < self.wall.center_x()
        };

        self.pos.x = if left_of_wall {
            self.wall.x - width
        } else {
            self.wall.x + self.wall.w
        };
    }

    /// Feed back the overlay's result
    pub fn on_combat_result(&mut self, result: CombatResult, meter: &mut SegisMeter) {
        self.in_combat = false;
        if result.is_win() {
            self.did_drink = false;
            self.wins += 1;
            self.idle_pose = PlatformPose::Standing;
            meter.add(self.config.win_reward);
            log::info!("Potion won ({}/{})", self.wins, self.config.max_wins);
        } else {
            self.did_drink = true;
            self.speed = 0.0;
            meter.reset();
            self.blackout = Some(Blackout::Fading { elapsed: 0.0 });
            log::info!("Potion lost ({:?}), blacking out", result.failure_reason);
        }
    }

    /// Combat overlay was torn down without a result
    pub fn on_combat_cancelled(&mut self) {
        self.in_combat = false;
    }

    fn advance_blackout(&mut self, dt: f32) -> Option<SceneEvent> {
        match self.blackout.as_mut() {
            Some(Blackout::Fading { elapsed }) => {
                *elapsed += dt;
                if *elapsed >= self.config.blackout_fade {
                    self.blackout = Some(Blackout::Holding { elapsed: 0.0 });
                }
                None
            }
            Some(Blackout::Holding { elapsed }) => {
                *elapsed += dt;
                if *elapsed >= self.config.blackout_hold {
                    self.blackout = None;
                    log::info!("Next day");
                    Some(SceneEvent::GoTo(SceneId::Intro))
                } else {
                    None
                }
            }
            None => None,
        }
    }

    /// Sprite size at the current depth
    pub fn size(&self) -> Vec2 {
        self.config.frame * self.scale_at(self.pos.x)
    }

    /// Player bounding box
    pub fn body(&self) -> Rect {
        let size = self.size();
        Rect::new(self.pos.x, self.pos.y, size.x, size.y)
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn pose(&self) -> PlatformPose {
        if self.did_drink {
            PlatformPose::Drunk
        } else if self.jumping {
            PlatformPose::Jump
        } else {
            self.idle_pose
        }
    }

    /// Sprite is mirrored when facing left (drunk sprite never flips)
    pub fn flip_x(&self) -> bool {
        !self.did_drink && !self.facing_right
    }

    pub fn wins(&self) -> u32 {
        self.wins
    }

    pub fn is_jumping(&self) -> bool {
        self.jumping
    }

    pub fn in_combat(&self) -> bool {
        self.in_combat
    }

    pub fn drink_prompt(&self) -> Option<&'static str> {
        self.show_drink_prompt.then_some("Press G to drink a potion.")
    }

    /// HUD meter colour
    pub fn meter_color(&self) -> Rgb {
        rainbow_color(self.color_phase.fract())
    }

    /// Black overlay opacity during the blackout
    pub fn blackout_alpha(&self) -> f32 {
        match self.blackout {
            Some(Blackout::Fading { elapsed }) if self.config.blackout_fade > 0.0 => {
                (elapsed / self.config.blackout_fade).min(1.0)
            }
            Some(Blackout::Fading { .. }) => 1.0,
            Some(Blackout::Holding { .. }) => 1.0,
            None => 0.0,
        }
    }

    /// Message shown on the black screen
    pub fn blackout_message(&self) -> Option<&str> {
        matches!(self.blackout, Some(Blackout::Holding { .. }))
            .then_some(self.config.blackout_message.as_str())
    }
}
