use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

/// The drawing surface a command list targets, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Straight RGBA color, each channel in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: 1.0,
        }
    }

    /// Channel-wise linear interpolation; `t` is clamped to `0..=1`.
    pub fn lerp(self, to: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0) as f32;
        Color {
            r: self.r + (to.r - self.r) * t,
            g: self.g + (to.g - self.g) * t,
            b: self.b + (to.b - self.b) * t,
            a: self.a + (to.a - self.a) * t,
        }
    }

    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (channel(self.r), channel(self.g), channel(self.b))
    }

    /// `#rrggbb`, alpha dropped.
    pub fn to_hex(self) -> String {
        let (r, g, b) = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trips_rgb8() {
        assert_eq!(Color::from_rgb8(0x50, 0x50, 0x3f).to_hex(), "#50503f");
        assert_eq!(Color::from_rgb8(0xa0, 0x62, 0x40).to_hex(), "#a06240");
    }

    #[test]
    fn lerp_hits_endpoints_and_midpoint() {
        let from = Color::from_rgb8(0, 0, 0);
        let to = Color::from_rgb8(200, 100, 50);
        assert_eq!(from.lerp(to, 0.0).to_rgb8(), (0, 0, 0));
        assert_eq!(from.lerp(to, 1.0).to_rgb8(), (200, 100, 50));
        assert_eq!(from.lerp(to, 0.5).to_rgb8(), (100, 50, 25));
        assert_eq!(from.lerp(to, 7.0).to_rgb8(), (200, 100, 50));
    }

    #[test]
    fn point_distance() {
        assert!((Point::new(0.0, 0.0).distance_to(Point::new(3.0, 4.0)) - 5.0).abs() < 1e-12);
    }
}
