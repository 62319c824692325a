//! Mask-constrained actor movement
//!
//! Each axis is probed separately a few units ahead; a blocked axis is zeroed
//! so the actor slides along walls. An actor that ends up stuck inside
//! unwalkable terrain is pulled out by an outward spiral search.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::walkability::WalkabilityField;
use crate::error::{ConfigError, positive};

/// Probe and recovery tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementConfig {
    /// How far ahead (world units) each axis is probed
    pub probe_distance: f32,
    /// Clearance as a fraction of the actor's smaller half-extent
    pub clearance_factor: f32,
    /// Recovery search radius cap (world units)
    pub recovery_radius: f32,
    /// Radius increment between search rings
    pub radius_step: f32,
    /// Angular step between samples on a ring (degrees)
    pub angle_step_deg: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            probe_distance: 6.0,
            clearance_factor: 0.45,
            recovery_radius: 80.0,
            radius_step: 2.0,
            angle_step_deg: 10.0,
        }
    }
}

impl MovementConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("probe_distance", self.probe_distance)?;
        positive("clearance_factor", self.clearance_factor)?;
        positive("recovery_radius", self.recovery_radius)?;
        positive("radius_step", self.radius_step)?;
        if !(1.0..=360.0).contains(&self.angle_step_deg) {
            return Err(ConfigError::AngleStepOutOfRange(self.angle_step_deg));
        }
        Ok(())
    }

    /// Samples per ring (assumes a validated step)
    fn ring_samples(&self) -> u32 {
        (360.0 / self.angle_step_deg).round().max(1.0) as u32
    }
}

/// A moving body: center position plus half-extents of its bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub pos: Vec2,
    pub half_size: Vec2,
}

impl Actor {
    pub fn new(pos: Vec2, half_size: Vec2) -> Self {
        Self { pos, half_size }
    }

    /// Footprint probe radius
    pub fn clearance(&self, factor: f32) -> f32 {
        self.half_size.x.min(self.half_size.y) * factor
    }
}

/// Result of a recovery search
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnapOutcome {
    /// Origin was already clear; nothing moved
    AlreadyClear,
    /// First clear point found on the spiral
    Moved(Vec2),
    /// Nothing clear within the radius cap; position left unchanged
    Exhausted,
}

/// Constrained velocity for this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementResolution {
    pub velocity: Vec2,
    pub blocked_x: bool,
    pub blocked_y: bool,
    /// Set when the actor was stuck and a recovery search ran
    pub snap: Option<SnapOutcome>,
}

/// Constrain `desired` against the field, sliding along walls.
///
/// If the actor can't move on either axis and its own position isn't clear,
/// the recovery search runs and, on success, moves `actor` in place.
pub fn resolve_movement(
    field: &WalkabilityField,
    actor: &mut Actor,
    desired: Vec2,
    config: &MovementConfig,
) -> MovementResolution {
    let clearance = actor.clearance(config.clearance_factor);
    let Vec2 { x, y } = actor.pos;

    let blocked_x = desired.x != 0.0
        && !field.is_clear(x + desired.x.signum() * config.probe_distance, y, clearance);
    let blocked_y = desired.y != 0.0
        && !field.is_clear(x, y + desired.y.signum() * config.probe_distance, clearance);

    let velocity = Vec2::new(
        if blocked_x { 0.0 } else { desired.x },
        if blocked_y { 0.0 } else { desired.y },
    );

    let mut snap = None;
    if velocity == Vec2::ZERO && !field.is_clear(x, y, clearance) {
        let outcome = snap_to_nearest_walkable(field, actor.pos, clearance, config.recovery_radius, config);
        if let SnapOutcome::Moved(pos) = outcome {
            actor.pos = pos;
        }
        snap = Some(outcome);
    }

    MovementResolution {
        velocity,
        blocked_x,
        blocked_y,
        snap,
    }
}

/// Spiral outward from `origin` for the nearest point passing `is_clear`.
///
/// Rings every `radius_step` up to `max_radius`, samples every `angle_step_deg`
/// starting at angle 0 on each ring.
pub fn snap_to_nearest_walkable(
    field: &WalkabilityField,
    origin: Vec2,
    clearance: f32,
    max_radius: f32,
    config: &MovementConfig,
) -> SnapOutcome {
    if field.is_clear(origin.x, origin.y, clearance) {
        return SnapOutcome::AlreadyClear;
    }

    let rings = if config.radius_step > 0.0 && max_radius.is_finite() {
        (max_radius / config.radius_step).floor().max(0.0) as u32
    } else {
        0
    };
    let samples = config.ring_samples();
    let angle_step = std::f32::consts::TAU / samples as f32;

    for ring in 1..=rings {
        let r = ring as f32 * config.radius_step;
        for i in 0..samples {
            let a = i as f32 * angle_step;
            let candidate = origin + Vec2::new(a.cos(), a.sin()) * r;
            if field.is_clear(candidate.x, candidate.y, clearance) {
                log::debug!(
                    "Snapped actor from ({:.1}, {:.1}) to ({:.1}, {:.1})",
                    origin.x,
                    origin.y,
                    candidate.x,
                    candidate.y
                );
                return SnapOutcome::Moved(candidate);
            }
        }
    }

    log::warn!(
        "No walkable point within {:.0} units of ({:.1}, {:.1}); actor left in place",
        max_radius,
        origin.x,
        origin.y
    );
    SnapOutcome::Exhausted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::walkability::MaskImage;

    /// 200x200 world, 1:1 mask; `black` decides which pixels are blocked
    fn field_where(black: impl Fn(u32, u32) -> bool) -> WalkabilityField {
        let mask = MaskImage::from_fn(200, 200, |x, y| if black(x, y) { 0 } else { 255 }).unwrap();
        WalkabilityField::build(mask, 200.0, 200.0, 96.0, false).unwrap()
    }

    fn actor_at(x: f32, y: f32) -> Actor {
        Actor::new(Vec2::new(x, y), Vec2::new(10.0, 10.0))
    }

    #[test]
    fn test_free_movement_unchanged() {
        let field = field_where(|_, _| false);
        let mut actor = actor_at(100.0, 100.0);
        let res = resolve_movement(&field, &mut actor, Vec2::new(160.0, -160.0), &MovementConfig::default());
        assert_eq!(res.velocity, Vec2::new(160.0, -160.0));
        assert!(!res.blocked_x && !res.blocked_y);
        assert!(res.snap.is_none());
    }

    #[test]
    fn test_wall_slide() {
        // Wall at x >= 110
        let field = field_where(|x, _| x >= 110);
        let mut actor = actor_at(100.0, 100.0);
        let res = resolve_movement(&field, &mut actor, Vec2::new(160.0, 160.0), &MovementConfig::default());
        assert!(res.blocked_x);
        assert!(!res.blocked_y);
        assert_eq!(res.velocity, Vec2::new(0.0, 160.0));
        assert!(res.snap.is_none());
    }

    #[test]
    fn test_moving_away_from_wall_allowed() {
        let field = field_where(|x, _| x >= 110);
        let mut actor = actor_at(100.0, 100.0);
        let res = resolve_movement(&field, &mut actor, Vec2::new(-160.0, 0.0), &MovementConfig::default());
        assert_eq!(res.velocity, Vec2::new(-160.0, 0.0));
    }

    #[test]
    fn test_corner_blocks_both_axes_without_snap() {
        // Blocked to the right and below, but the actor's own spot is clear
        let field = field_where(|x, y| x >= 110 || y >= 110);
        let mut actor = actor_at(100.0, 100.0);
        let res = resolve_movement(&field, &mut actor, Vec2::new(160.0, 160.0), &MovementConfig::default());
        assert_eq!(res.velocity, Vec2::ZERO);
        assert!(res.snap.is_none());
        assert_eq!(actor.pos, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_stuck_actor_recovers() {
        // Black disc of radius 20 around (100, 100)
        let field = field_where(|x, y| {
            let dx = x as f32 - 100.0;
            let dy = y as f32 - 100.0;
            (dx * dx + dy * dy).sqrt() < 20.0
        });
        let config = MovementConfig::default();
        let mut actor = actor_at(100.0, 100.0);
        let origin = actor.pos;
        let clearance = actor.clearance(config.clearance_factor);
        assert!(!field.is_clear(origin.x, origin.y, clearance));

        let res = resolve_movement(&field, &mut actor, Vec2::ZERO, &config);
        assert!(matches!(res.snap, Some(SnapOutcome::Moved(_))));
        assert!(field.is_clear(actor.pos.x, actor.pos.y, clearance));

        let chord = 2.0 * config.recovery_radius * (config.angle_step_deg.to_radians() / 2.0).sin();
        assert!(actor.pos.distance(origin) <= config.recovery_radius + chord);
        // Nearest ring wins: just past disc edge plus clearance
        assert!(actor.pos.distance(origin) < 20.0 + clearance + config.radius_step + 1.0);
    }

    #[test]
    fn test_exhausted_search_leaves_actor() {
        let field = field_where(|_, _| true);
        let mut actor = actor_at(100.0, 100.0);
        let res = resolve_movement(&field, &mut actor, Vec2::ZERO, &MovementConfig::default());
        assert_eq!(res.snap, Some(SnapOutcome::Exhausted));
        assert_eq!(actor.pos, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_snap_respects_radius_cap() {
        // Only a far corner is walkable
        let field = field_where(|x, y| !(x < 30 && y < 30));
        let origin = Vec2::new(150.0, 150.0);
        let config = MovementConfig::default();
        assert_eq!(
            snap_to_nearest_walkable(&field, origin, 2.0, 80.0, &config),
            SnapOutcome::Exhausted
        );
        assert!(matches!(
            snap_to_nearest_walkable(&field, origin, 2.0, 300.0, &config),
            SnapOutcome::Moved(_)
        ));
    }

    #[test]
    fn test_snap_already_clear() {
        let field = field_where(|_, _| false);
        assert_eq!(
            snap_to_nearest_walkable(&field, Vec2::new(50.0, 50.0), 4.0, 80.0, &MovementConfig::default()),
            SnapOutcome::AlreadyClear
        );
    }

    #[test]
    fn test_config_validation() {
        assert!(MovementConfig::default().validate().is_ok());
        let bad = MovementConfig {
            angle_step_deg: 0.0,
            ..Default::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::AngleStepOutOfRange(_))));
        let tiny = MovementConfig {
            angle_step_deg: 0.5,
            ..Default::default()
        };
        assert!(matches!(tiny.validate(), Err(ConfigError::AngleStepOutOfRange(a)) if a == 0.5));
        let wide = MovementConfig {
            angle_step_deg: 400.0,
            ..Default::default()
        };
        assert!(wide.validate().is_err());
        let nan = MovementConfig {
            angle_step_deg: f32::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());
        assert_eq!(MovementConfig::default().ring_samples(), 36);
    }
}
