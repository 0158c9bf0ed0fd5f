//! Generation parameters and the linear RGB color they carry.
//!
//! Ranges are the ones the parameter panel enforces. The generator trusts
//! its input; anything entering from outside the panel (config files, CLI)
//! goes through [`ParameterSet::validate`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GalaxyError, Result};

pub const COUNT_RANGE: (u32, u32) = (100, 100_000);
pub const SIZE_RANGE: (f32, f32) = (0.001, 0.1);
pub const RADIUS_RANGE: (f32, f32) = (1.0, 20.0);
pub const BRANCHES_RANGE: (u32, u32) = (2, 20);
pub const SPIN_RANGE: (f32, f32) = (-5.0, 5.0);
pub const RANDOMNESS_RANGE: (f32, f32) = (0.0, 1.0);
pub const GRAVITY_RANGE: (f32, f32) = (2.0, 10.0);

/// Linear RGB color, channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` or `rrggbb`. Channels map byte / 255 with no
    /// color-space conversion.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(GalaxyError::InvalidColor(hex.to_string()));
        }
        let value = u32::from_str_radix(digits, 16)
            .map_err(|_| GalaxyError::InvalidColor(hex.to_string()))?;

        Ok(Self::from_bytes([
            (value >> 16) as u8,
            (value >> 8) as u8,
            value as u8,
        ]))
    }

    pub fn from_bytes(bytes: [u8; 3]) -> Self {
        Self::new(
            bytes[0] as f32 / 255.0,
            bytes[1] as f32 / 255.0,
            bytes[2] as f32 / 255.0,
        )
    }

    pub fn to_bytes(self) -> [u8; 3] {
        let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [to_byte(self.r), to_byte(self.g), to_byte(self.b)]
    }

    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_bytes();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    pub fn lerp(self, other: Color, t: f32) -> Color {
        Color::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl TryFrom<String> for Color {
    type Error = GalaxyError;

    fn try_from(value: String) -> Result<Self> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Everything the generator needs to build one galaxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSet {
    pub count: u32,
    pub size: f32,
    pub radius: f32,
    pub branches: u32,
    pub spin: f32,
    pub randomness: f32,
    /// Exponent biasing particles toward the center.
    pub gravity: f32,
    pub inside_color: Color,
    pub outside_color: Color,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            count: 10_000,
            size: 0.01,
            radius: 7.0,
            branches: 5,
            spin: 1.0,
            randomness: 0.5,
            gravity: 3.0,
            inside_color: Color::from_bytes([0xff, 0x60, 0x30]),
            outside_color: Color::from_bytes([0x1b, 0x39, 0x84]),
        }
    }
}

impl ParameterSet {
    pub fn validate(&self) -> Result<()> {
        check("count", self.count as f64, COUNT_RANGE.0 as f64, COUNT_RANGE.1 as f64)?;
        check("size", self.size as f64, SIZE_RANGE.0 as f64, SIZE_RANGE.1 as f64)?;
        check("radius", self.radius as f64, RADIUS_RANGE.0 as f64, RADIUS_RANGE.1 as f64)?;
        check(
            "branches",
            self.branches as f64,
            BRANCHES_RANGE.0 as f64,
            BRANCHES_RANGE.1 as f64,
        )?;
        check("spin", self.spin as f64, SPIN_RANGE.0 as f64, SPIN_RANGE.1 as f64)?;
        check(
            "randomness",
            self.randomness as f64,
            RANDOMNESS_RANGE.0 as f64,
            RANDOMNESS_RANGE.1 as f64,
        )?;
        check("gravity", self.gravity as f64, GRAVITY_RANGE.0 as f64, GRAVITY_RANGE.1 as f64)?;
        Ok(())
    }
}

fn check(field: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    // NaN fails both comparisons, so test for containment rather than exclusion.
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(GalaxyError::OutOfRange { field, value, min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        let color = Color::from_hex("#ff6030").unwrap();
        assert_eq!(color.r, 1.0);
        assert_eq!(color.g, 0x60 as f32 / 255.0);
        assert_eq!(color.b, 0x30 as f32 / 255.0);
        assert_eq!(Color::from_hex("1b3984").unwrap().to_hex(), "#1b3984");
    }

    #[test]
    fn test_invalid_hex() {
        assert!(Color::from_hex("#ff60").is_err());
        assert!(Color::from_hex("#gg6030").is_err());
        assert!(Color::from_hex("#ff6030ff").is_err());
        assert!(Color::from_hex("").is_err());
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Color::new(1.0, 0.0, 0.5);
        let b = Color::new(0.0, 1.0, 0.5);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Color::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(ParameterSet::default().validate().is_ok());
    }

    #[test]
    fn test_out_of_range_names_field() {
        let params = ParameterSet { branches: 1, ..Default::default() };
        match params.validate() {
            Err(GalaxyError::OutOfRange { field, .. }) => assert_eq!(field, "branches"),
            other => panic!("expected OutOfRange, got {:?}", other),
        }

        let params = ParameterSet { randomness: f32::NAN, ..Default::default() };
        assert!(params.validate().is_err());
    }
}
