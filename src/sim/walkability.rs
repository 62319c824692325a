//! Mask-based walkability
//!
//! A black/white image laid over the (zoomed) world decides where actors may
//! stand. Lookups are nearest-pixel (truncated), no interpolation, so precision
//! is bounded by the mask resolution relative to the world.

use crate::error::{ConfigError, positive};

/// Row-major RGB pixels
#[derive(Debug, Clone, PartialEq)]
pub struct MaskImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl MaskImage {
    /// Wrap raw RGB bytes (3 per pixel)
    pub fn from_rgb(width: u32, height: u32, data: Vec<u8>) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyMask { width, height });
        }
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(ConfigError::MaskSizeMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a greyscale mask from a per-pixel luminance function
    pub fn from_fn(
        width: u32,
        height: u32,
        mut lum: impl FnMut(u32, u32) -> u8,
    ) -> Result<Self, ConfigError> {
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for y in 0..height {
            for x in 0..width {
                let v = lum(x, y);
                data.extend_from_slice(&[v, v, v]);
            }
        }
        Self::from_rgb(width, height, data)
    }

    /// Uniform grey level
    pub fn filled(width: u32, height: u32, value: u8) -> Result<Self, ConfigError> {
        Self::from_fn(width, height, |_, _| value)
    }

    /// Decode an encoded image (PNG) into a mask
    pub fn from_png_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let rgb = image::load_from_memory(bytes)?.to_rgb8();
        let (width, height) = rgb.dimensions();
        Self::from_rgb(width, height, rgb.into_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGB at pixel coordinates, `None` outside the image
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    /// Mean of the three channels
    pub fn luminance(&self, x: u32, y: u32) -> Option<f32> {
        self.pixel(x, y)
            .map(|[r, g, b]| (r as f32 + g as f32 + b as f32) / 3.0)
    }
}

/// Default luminance cut-off: at or above is "on"
pub const DEFAULT_THRESHOLD: f32 = 96.0;

#[derive(Debug, Clone)]
enum Source {
    Mask(MaskImage),
    /// No mask loaded: everything inside the world is walkable
    Open,
}

/// Precomputed traversability for one level
#[derive(Debug, Clone)]
pub struct WalkabilityField {
    source: Source,
    world_width: f32,
    world_height: f32,
    /// World units -> mask pixels
    scale_x: f32,
    scale_y: f32,
    threshold: f32,
    invert: bool,
}

impl WalkabilityField {
    /// Lay `mask` over a `world_width` x `world_height` world.
    ///
    /// With `invert == false`, pixels at or above `threshold` are walkable.
    pub fn build(
        mask: MaskImage,
        world_width: f32,
        world_height: f32,
        threshold: f32,
        invert: bool,
    ) -> Result<Self, ConfigError> {
        positive("world_width", world_width)?;
        positive("world_height", world_height)?;
        if !(0.0..=255.0).contains(&threshold) {
            return Err(ConfigError::ThresholdOutOfRange(threshold));
        }

        let scale_x = mask.width() as f32 / world_width;
        let scale_y = mask.height() as f32 / world_height;
        log::debug!(
            "Walkability field {}x{} mask over {:.0}x{:.0} world (scale {:.3}, {:.3})",
            mask.width(),
            mask.height(),
            world_width,
            world_height,
            scale_x,
            scale_y
        );

        Ok(Self {
            source: Source::Mask(mask),
            world_width,
            world_height,
            scale_x,
            scale_y,
            threshold,
            invert,
        })
    }

    /// A world with no mask: in-bounds points are all walkable
    pub fn unmasked(world_width: f32, world_height: f32) -> Result<Self, ConfigError> {
        positive("world_width", world_width)?;
        positive("world_height", world_height)?;
        Ok(Self {
            source: Source::Open,
            world_width,
            world_height,
            scale_x: 1.0,
            scale_y: 1.0,
            threshold: DEFAULT_THRESHOLD,
            invert: false,
        })
    }

    pub fn world_width(&self) -> f32 {
        self.world_width
    }

    pub fn world_height(&self) -> f32 {
        self.world_height
    }

    pub fn in_bounds(&self, x: f32, y: f32) -> bool {
        // Written so NaN fails every comparison
        x >= 0.0 && y >= 0.0 && x < self.world_width && y < self.world_height
    }

    /// Mask luminance under a world point; `None` when out of bounds or unmapped
    pub fn sample_luminance(&self, x: f32, y: f32) -> Option<f32> {
        if !self.in_bounds(x, y) {
            return None;
        }
        match &self.source {
            Source::Open => Some(255.0),
            Source::Mask(mask) => {
                // Rounding can push a point just inside the edge onto the next pixel
                let px = ((x * self.scale_x) as u32).min(mask.width() - 1);
                let py = ((y * self.scale_y) as u32).min(mask.height() - 1);
                mask.luminance(px, py)
            }
        }
    }

    pub fn is_walkable(&self, x: f32, y: f32) -> bool {
        match self.sample_luminance(x, y) {
            Some(lum) => (lum >= self.threshold) != self.invert,
            None => false,
        }
    }

    /// Center plus four axis-aligned samples `clearance` away must all be walkable
    pub fn is_clear(&self, x: f32, y: f32, clearance: f32) -> bool {
        self.is_walkable(x, y)
            && self.is_walkable(x - clearance, y)
            && self.is_walkable(x + clearance, y)
            && self.is_walkable(x, y - clearance)
            && self.is_walkable(x, y + clearance)
    }
}
