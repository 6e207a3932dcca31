use crate::error::{Result, ScappleError};

/// An RGB color with channels in `[0, 1]`, as Scapple stores them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    r: f32,
    g: f32,
    b: f32,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0 };

    /// Channels are clamped; non-finite values collapse to 0.
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: clamp_unit(r),
            g: clamp_unit(g),
            b: clamp_unit(b),
        }
    }

    pub fn r(&self) -> f32 {
        self.r
    }

    pub fn g(&self) -> f32 {
        self.g
    }

    pub fn b(&self) -> f32 {
        self.b
    }

    /// Parses `#rrggbb` (leading `#` optional).
    pub fn from_hex(raw: &str) -> Option<Self> {
        let hex = raw.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(hex, 16).ok()?;
        Some(Self::new(
            ((value >> 16) & 0xff) as f32 / 255.0,
            ((value >> 8) & 0xff) as f32 / 255.0,
            (value & 0xff) as f32 / 255.0,
        ))
    }

    /// Like [`Color::from_hex`] but reports caller input that is not a color.
    pub fn parse_hex(raw: &str) -> Result<Self> {
        Self::from_hex(raw).ok_or_else(|| ScappleError::InvalidColor {
            raw: raw.to_string(),
        })
    }

    pub fn to_hex(&self) -> String {
        format!(
            "#{:02x}{:02x}{:02x}",
            to_byte(self.r),
            to_byte(self.g),
            to_byte(self.b)
        )
    }

    /// Parses the markup form: at least three whitespace separated floats.
    pub fn from_triplet(raw: &str) -> Option<Self> {
        let mut parts = raw.split_whitespace().map(|part| part.parse::<f32>());
        let r = parts.next()?.ok()?;
        let g = parts.next()?.ok()?;
        let b = parts.next()?.ok()?;
        if !(r.is_finite() && g.is_finite() && b.is_finite()) {
            return None;
        }
        Some(Self::new(r, g, b))
    }

    pub fn to_triplet(&self) -> String {
        format!("{} {} {}", self.r, self.g, self.b)
    }
}

pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

fn to_byte(channel: f32) -> u8 {
    (clamp_unit(channel) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_on_construction() {
        let color = Color::new(1.5, -0.2, 0.5);
        assert_eq!(color.r(), 1.0);
        assert_eq!(color.g(), 0.0);
        assert_eq!(color.b(), 0.5);
    }

    #[test]
    fn hex_round_trip() {
        let color = Color::from_hex("#ffeb3b").unwrap();
        assert_eq!(color.to_hex(), "#ffeb3b");
        assert_eq!(Color::from_hex("4FC3F7").unwrap().to_hex(), "#4fc3f7");
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!(Color::from_hex("#fff").is_none());
        assert!(Color::from_hex("#gggggg").is_none());
        let err = Color::parse_hex("blue").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ValidationInvalidColor);
    }

    #[test]
    fn parses_markup_triplets() {
        let color = Color::from_triplet("1.0 0.5 0.0").unwrap();
        assert_eq!(color.to_hex(), "#ff8000");
        assert_eq!(color.to_triplet(), "1 0.5 0");
        assert!(Color::from_triplet("0.1 0.2").is_none());
        assert!(Color::from_triplet("a b c").is_none());
        assert_eq!(Color::from_triplet("2 2 2 1").unwrap(), Color::WHITE);
    }
}
