//! Segis meter
//!
//! A 0-100 stat that the platform level raises on combat wins and that slowly
//! decays. One instance is owned by [`crate::Game`] and lent to scenes.

use serde::{Deserialize, Serialize};

use crate::consts::{SEGIS_DECAY_RATE, SEGIS_MAX};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SegisMeter {
    value: f32,
}

impl SegisMeter {
    pub fn new(initial: f32) -> Self {
        Self {
            value: initial.clamp(0.0, SEGIS_MAX),
        }
    }

    pub fn add(&mut self, amount: f32) {
        self.value = (self.value + amount).min(SEGIS_MAX);
    }

    pub fn subtract(&mut self, amount: f32) {
        self.value = (self.value - amount).max(0.0);
    }

    /// Decay by `rate` units per second
    pub fn decay(&mut self, dt: f32, rate: f32) {
        self.subtract(rate * dt);
    }

    /// Decay at the default rate
    pub fn update(&mut self, dt: f32) {
        self.decay(dt, SEGIS_DECAY_RATE);
    }

    /// Current value rounded to 2 decimals (what the HUD shows)
    pub fn get(&self) -> f32 {
        (self.value * 100.0).round() / 100.0
    }

    pub fn raw(&self) -> f32 {
        self.value
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }
}

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// CSS hex string, e.g. `#ff8800`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Fully saturated hue sweep; `phase` in [0, 1) maps to 0-360 degrees
pub fn rainbow_color(phase: f32) -> Rgb {
    let h = phase.rem_euclid(1.0) * 360.0;
    let c = 1.0f32;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());

    let (r1, g1, b1) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let to_u8 = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb {
        r: to_u8(r1),
        g: to_u8(g1),
        b: to_u8(b1),
    }
}
