//! Top-down level: free roaming over a masked background
//!
//! The fox walks wherever the walkability mask is light. Keyboard moves on
//! each axis, holding the pointer walks toward it, Shift ignores the mask.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::movement::{Actor, MovementConfig, MovementResolution, resolve_movement};
use super::walkability::{DEFAULT_THRESHOLD, MaskImage, WalkabilityField};
use crate::consts::{VIEW_HEIGHT, VIEW_WIDTH};
use crate::error::{ConfigError, positive};
use crate::input::{FrameInput, Key};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopDownConfig {
    /// Background size before zoom
    pub source_size: Vec2,
    pub zoom: f32,
    pub spawn: Vec2,
    /// Unscaled sprite size; the body is this times `sprite_scale`
    pub sprite_size: Vec2,
    pub sprite_scale: f32,
    /// World units per second
    pub speed: f32,
    /// Pointer follow stops inside this distance
    pub follow_deadzone: f32,
    pub threshold: f32,
    /// Dark pixels are walkable instead
    pub invert: bool,
    pub view: Vec2,
    /// Camera catch-up per 60 Hz frame
    pub camera_lerp: f32,
    pub movement: MovementConfig,
}

impl Default for TopDownConfig {
    fn default() -> Self {
        Self {
            source_size: Vec2::new(1024.0, 768.0),
            zoom: 1.7,
            spawn: Vec2::new(1550.0, 1400.0),
            sprite_size: Vec2::new(200.0, 200.0),
            sprite_scale: 0.2,
            speed: 160.0,
            follow_deadzone: 6.0,
            threshold: DEFAULT_THRESHOLD,
            invert: false,
            view: Vec2::new(VIEW_WIDTH, VIEW_HEIGHT),
            camera_lerp: 0.12,
            movement: MovementConfig::default(),
        }
    }
}

impl TopDownConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("source_size.x", self.source_size.x)?;
        positive("source_size.y", self.source_size.y)?;
        positive("zoom", self.zoom)?;
        positive("sprite_scale", self.sprite_scale)?;
        positive("speed", self.speed)?;
        self.movement.validate()
    }

    pub fn world_size(&self) -> Vec2 {
        self.source_size * self.zoom
    }
}

/// Which directional sprite to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Right,
    Down,
    Left,
    Up,
}

impl Facing {
    /// From a movement direction in screen coordinates (y down)
    pub fn from_velocity(v: Vec2) -> Option<Self> {
        if v == Vec2::ZERO {
            return None;
        }
        let deg = v.y.atan2(v.x).to_degrees();
        Some(if (45.0..135.0).contains(&deg) {
            Facing::Down
        } else if deg >= 135.0 || deg < -135.0 {
            Facing::Left
        } else if (-135.0..-45.0).contains(&deg) {
            Facing::Up
        } else {
            Facing::Right
        })
    }
}

pub struct TopDownLevel {
    config: TopDownConfig,
    field: WalkabilityField,
    actor: Actor,
    facing: Facing,
    /// Top-left of the visible area
    camera: Vec2,
    last: Option<MovementResolution>,
}

impl TopDownLevel {
    /// Build the level; without a mask every in-bounds point is walkable
    pub fn new(config: TopDownConfig, mask: Option<MaskImage>) -> Result<Self, ConfigError> {
        config.validate()?;
        let world = config.world_size();
        let field = match mask {
            Some(mask) => WalkabilityField::build(mask, world.x, world.y, config.threshold, config.invert)?,
            None => {
                log::info!("No walkability mask, whole level is open");
                WalkabilityField::unmasked(world.x, world.y)?
            }
        };

        let half_size = config.sprite_size * config.sprite_scale * 0.5;
        let spawn = config.spawn.clamp(half_size, (world - half_size).max(half_size));
        let actor = Actor::new(spawn, half_size);
        let mut level = Self {
            field,
            actor,
            facing: Facing::Down,
            camera: Vec2::ZERO,
            last: None,
            config,
        };
        level.camera = level.camera_target();
        log::info!("Top-down level started ({}x{})", world.x, world.y);
        Ok(level)
    }

    pub fn update(&mut self, dt: f32, input: &FrameInput) {
        let desired = self.desired_velocity(input);

        let velocity = if input.is_held(Key::Shift) {
            self.last = None;
            desired
        } else {
            let res = resolve_movement(&self.field, &mut self.actor, desired, &self.config.movement);
            self.last = Some(res);
            res.velocity
        };

        if let Some(facing) = Facing::from_velocity(velocity) {
            self.facing = facing;
        }

        let world = self.config.world_size();
        let half = self.actor.half_size;
        let next = self.actor.pos + velocity * dt;
        self.actor.pos = next.clamp(half, (world - half).max(half));

        let t = 1.0 - (1.0 - self.config.camera_lerp).powf(dt * 60.0);
        self.camera = self.camera.lerp(self.camera_target(), t);
    }

    fn desired_velocity(&self, input: &FrameInput) -> Vec2 {
        let speed = self.config.speed;

        if let Some(pointer) = input.pointer.filter(|p| p.down) {
            let delta = pointer.world - self.actor.pos;
            let dist = delta.length();
            return if dist > self.config.follow_deadzone {
                delta / dist * speed
            } else {
                Vec2::ZERO
            };
        }

        let x = if input.either_held(Key::Left, Key::letter('a')) {
            -speed
        } else if input.either_held(Key::Right, Key::letter('d')) {
            speed
        } else {
            0.0
        };
        let y = if input.either_held(Key::Up, Key::letter('w')) {
            -speed
        } else if input.either_held(Key::Down, Key::letter('s')) {
            speed
        } else {
            0.0
        };
        Vec2::new(x, y)
    }

    /// Camera centred on the fox, kept inside the world
    fn camera_target(&self) -> Vec2 {
        let max = (self.config.world_size() - self.config.view).max(Vec2::ZERO);
        (self.actor.pos - self.config.view * 0.5).clamp(Vec2::ZERO, max)
    }

    /// Convert a view-space point (e.g. a click) into world space
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        self.camera + screen
    }

    pub fn pos(&self) -> Vec2 {
        self.actor.pos
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn camera(&self) -> Vec2 {
        self.camera
    }

    pub fn field(&self) -> &WalkabilityField {
        &self.field
    }

    /// Collision result of the last update (`None` when Shift bypassed it)
    pub fn last_resolution(&self) -> Option<&MovementResolution> {
        self.last.as_ref()
    }

    #[cfg(test)]
    fn place(&mut self, pos: Vec2) {
        self.actor.pos = pos;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Pointer;
    use crate::sim::movement::SnapOutcome;

    const DT: f32 = 1.0 / 60.0;

    fn held(keys: &[Key]) -> FrameInput {
        FrameInput {
            held: keys.to_vec(),
            ..Default::default()
        }
    }

    /// 1024x768 mask, light everywhere except where `black` says
    fn level_where(black: impl Fn(u32, u32) -> bool) -> TopDownLevel {
        let mask = MaskImage::from_fn(1024, 768, |x, y| if black(x, y) { 0 } else { 255 }).unwrap();
        TopDownLevel::new(TopDownConfig::default(), Some(mask)).unwrap()
    }

    #[test]
    fn test_spawn_and_world_size() {
        let level = TopDownLevel::new(TopDownConfig::default(), None).unwrap();
        // Spawn sits below the world edge and is pulled inside
        assert_eq!(level.pos().x, 1550.0);
        assert!((level.pos().y - (1305.6 - 20.0)).abs() < 1e-3);
        assert!((level.field().world_width() - 1740.8).abs() < 1e-3);
        assert!((level.field().world_height() - 1305.6).abs() < 1e-3);
        assert_eq!(level.actor().half_size, Vec2::new(20.0, 20.0));
        assert_eq!(level.facing(), Facing::Down);
    }

    #[test]
    fn test_keyboard_moves_and_faces() {
        let mut level = TopDownLevel::new(TopDownConfig::default(), None).unwrap();
        level.place(Vec2::new(800.0, 600.0));
        for _ in 0..60 {
            level.update(DT, &held(&[Key::letter('a')]));
        }
        assert!((level.pos().x - 640.0).abs() < 0.1);
        assert_eq!(level.pos().y, 600.0);
        assert_eq!(level.facing(), Facing::Left);

        level.update(DT, &held(&[Key::Up]));
        assert_eq!(level.facing(), Facing::Up);
    }

    #[test]
    fn test_left_wins_over_right() {
        let mut level = TopDownLevel::new(TopDownConfig::default(), None).unwrap();
        level.place(Vec2::new(800.0, 600.0));
        level.update(DT, &held(&[Key::Left, Key::Right]));
        assert!(level.pos().x < 800.0);
    }

    #[test]
    fn test_clamped_to_world() {
        let mut level = TopDownLevel::new(TopDownConfig::default(), None).unwrap();
        for _ in 0..600 {
            level.update(DT, &held(&[Key::Right, Key::Down]));
        }
        let world = TopDownConfig::default().world_size();
        let half = level.actor().half_size;
        assert!(level.pos().x <= world.x - half.x + 1e-3);
        assert!(level.pos().y <= world.y - half.y + 1e-3);
    }

    #[test]
    fn test_mask_wall_slides() {
        // Mask column 400 is world x 680
        let mut level = level_where(|x, _| x >= 400);
        level.place(Vec2::new(660.0, 600.0));
        for _ in 0..30 {
            level.update(DT, &held(&[Key::Right, Key::Down]));
        }
        assert!(level.pos().x < 680.0);
        assert!(level.pos().y > 600.0);
        assert!(level.last_resolution().unwrap().blocked_x);
        assert_eq!(level.facing(), Facing::Down);
    }

    #[test]
    fn test_shift_bypasses_mask() {
        let mut level = level_where(|x, _| x >= 400);
        level.place(Vec2::new(660.0, 600.0));
        for _ in 0..30 {
            level.update(DT, &held(&[Key::Right, Key::Shift]));
        }
        assert!(level.pos().x > 700.0);
        assert!(level.last_resolution().is_none());
    }

    #[test]
    fn test_stuck_fox_snaps_out() {
        let mut level = level_where(|x, y| (380..420).contains(&x) && (330..370).contains(&y));
        // Centre of the black block in world space
        let stuck = Vec2::new(400.0 * 1.7, 350.0 * 1.7);
        level.place(stuck);
        level.update(DT, &FrameInput::default());
        assert!(matches!(
            level.last_resolution().unwrap().snap,
            Some(SnapOutcome::Moved(_))
        ));
        let clearance = level.actor().clearance(0.45);
        assert!(level.field().is_clear(level.pos().x, level.pos().y, clearance));
    }

    #[test]
    fn test_pointer_follow() {
        let mut level = TopDownLevel::new(TopDownConfig::default(), None).unwrap();
        level.place(Vec2::new(800.0, 600.0));
        let input = FrameInput {
            pointer: Some(Pointer {
                world: Vec2::new(800.0, 800.0),
                down: true,
            }),
            ..Default::default()
        };
        level.update(DT, &input);
        assert!(level.pos().y > 600.0);
        assert_eq!(level.pos().x, 800.0);
        assert_eq!(level.facing(), Facing::Down);

        // Inside the deadzone nothing moves
        let close = FrameInput {
            pointer: Some(Pointer {
                world: level.pos() + Vec2::new(3.0, 0.0),
                down: true,
            }),
            ..Default::default()
        };
        let before = level.pos();
        level.update(DT, &close);
        assert_eq!(level.pos(), before);
    }

    #[test]
    fn test_pointer_released_uses_keyboard() {
        let mut level = TopDownLevel::new(TopDownConfig::default(), None).unwrap();
        level.place(Vec2::new(800.0, 600.0));
        let input = FrameInput {
            held: vec![Key::Right],
            pointer: Some(Pointer {
                world: Vec2::new(0.0, 0.0),
                down: false,
            }),
            ..Default::default()
        };
        level.update(DT, &input);
        assert!(level.pos().x > 800.0);
    }

    #[test]
    fn test_facing_sectors() {
        assert_eq!(Facing::from_velocity(Vec2::ZERO), None);
        assert_eq!(Facing::from_velocity(Vec2::new(1.0, 0.0)), Some(Facing::Right));
        assert_eq!(Facing::from_velocity(Vec2::new(1.0, 0.9)), Some(Facing::Right));
        assert_eq!(Facing::from_velocity(Vec2::new(0.0, 1.0)), Some(Facing::Down));
        assert_eq!(Facing::from_velocity(Vec2::new(-1.0, 0.0)), Some(Facing::Left));
        assert_eq!(Facing::from_velocity(Vec2::new(0.0, -1.0)), Some(Facing::Up));
        assert_eq!(Facing::from_velocity(Vec2::new(1.0, -1.1)), Some(Facing::Up));
    }

    #[test]
    fn test_camera_stays_in_world() {
        let level = TopDownLevel::new(TopDownConfig::default(), None).unwrap();
        let world = TopDownConfig::default().world_size();
        let cam = level.camera();
        assert!(cam.x >= 0.0 && cam.x + VIEW_WIDTH <= world.x + 1e-3);
        assert!(cam.y >= 0.0 && cam.y + VIEW_HEIGHT <= world.y + 1e-3);
        assert_eq!(level.screen_to_world(Vec2::ZERO), cam);
    }

    #[test]
    fn test_rejects_bad_config() {
        let config = TopDownConfig {
            zoom: 0.0,
            ..Default::default()
        };
        assert!(TopDownLevel::new(config, None).is_err());
    }
}
