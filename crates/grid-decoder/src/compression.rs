//! Element encodings of the sample buffer.

use half::f16;
use serde::{Deserialize, Serialize};

/// Element encoding, which fixes the element width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompressionKind {
    /// Unsigned 8-bit samples.
    Byte,
    /// IEEE 754 binary16 samples, little-endian.
    HalfFloat,
    /// IEEE 754 binary32 samples, little-endian.
    Float32,
}

impl Default for CompressionKind {
    fn default() -> Self {
        Self::Float32
    }
}

impl CompressionKind {
    /// Map a header label to an encoding. Unknown or missing labels fall
    /// through to float32, as the backend does.
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("uint8") | Some("byte") | Some("u8") => Self::Byte,
            Some("float16") | Some("half") | Some("half-float") | Some("f16") => Self::HalfFloat,
            _ => Self::Float32,
        }
    }

    /// Element width in bytes.
    pub fn width(&self) -> usize {
        match self {
            Self::Byte => 1,
            Self::HalfFloat => 2,
            Self::Float32 => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Byte => "uint8",
            Self::HalfFloat => "float16",
            Self::Float32 => "float32",
        }
    }
}

/// Widen an IEEE 754 binary16 bit pattern to `f32`.
pub fn f16_to_f32(bits: u16) -> f32 {
    f16::from_bits(bits).to_f32()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(CompressionKind::from_label(Some("uint8")), CompressionKind::Byte);
        assert_eq!(
            CompressionKind::from_label(Some("float16")),
            CompressionKind::HalfFloat
        );
        assert_eq!(
            CompressionKind::from_label(Some("float32")),
            CompressionKind::Float32
        );
        assert_eq!(
            CompressionKind::from_label(Some("float64")),
            CompressionKind::Float32
        );
        assert_eq!(CompressionKind::from_label(None), CompressionKind::Float32);
    }

    #[test]
    fn test_widths() {
        assert_eq!(CompressionKind::Byte.width(), 1);
        assert_eq!(CompressionKind::HalfFloat.width(), 2);
        assert_eq!(CompressionKind::Float32.width(), 4);
    }

    #[test]
    fn test_f16_normal_values() {
        assert_eq!(f16_to_f32(0x3c00), 1.0);
        assert_eq!(f16_to_f32(0xc000), -2.0);
        assert_eq!(f16_to_f32(0x3800), 0.5);
        assert_eq!(f16_to_f32(0x7bff), 65504.0);
    }

    #[test]
    fn test_f16_zero_and_subnormal() {
        assert_eq!(f16_to_f32(0x0000), 0.0);
        assert!(f16_to_f32(0x8000).is_sign_negative());
        assert_eq!(f16_to_f32(0x0001), 2.0f32.powi(-24));
        assert_eq!(f16_to_f32(0x03ff), 1023.0 * 2.0f32.powi(-24));
    }

    #[test]
    fn test_f16_special_values() {
        assert_eq!(f16_to_f32(0x7c00), f32::INFINITY);
        assert_eq!(f16_to_f32(0xfc00), f32::NEG_INFINITY);
        assert!(f16_to_f32(0x7e00).is_nan());
    }
}
