use serde::{Deserialize, Serialize};

use crate::types::Color;

/// Semantic color tokens. The chart uses a single fixed palette, so every
/// backend resolves a token through [`ThemeToken::color`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    Background,

    ChartLine,
    Marker,
    MarkerHover,
    GuideLine,

    AxisLine,
    AxisText,
}

impl ThemeToken {
    pub fn color(self) -> Color {
        match self {
            ThemeToken::Background => Color::from_rgb8(0xff, 0xff, 0xff),
            ThemeToken::ChartLine | ThemeToken::Marker | ThemeToken::GuideLine => {
                Color::from_rgb8(0x50, 0x50, 0x3f)
            }
            ThemeToken::MarkerHover => Color::from_rgb8(0xa0, 0x62, 0x40),
            ThemeToken::AxisLine | ThemeToken::AxisText => Color::from_rgb8(0x00, 0x00, 0x00),
        }
    }
}

/// A fill that is either a plain token or a point partway through a color
/// transition between two tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Paint {
    Token(ThemeToken),
    Blend {
        from: ThemeToken,
        to: ThemeToken,
        /// Progress in `0.0..=1.0`.
        t: f64,
    },
}

impl Paint {
    pub fn resolve(self) -> Color {
        match self {
            Paint::Token(token) => token.color(),
            Paint::Blend { from, to, t } => from.color().lerp(to.color(), t),
        }
    }
}

impl From<ThemeToken> for Paint {
    fn from(token: ThemeToken) -> Self {
        Paint::Token(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_endpoints_resolve_to_tokens() {
        let start = Paint::Blend {
            from: ThemeToken::Marker,
            to: ThemeToken::MarkerHover,
            t: 0.0,
        };
        let end = Paint::Blend {
            from: ThemeToken::Marker,
            to: ThemeToken::MarkerHover,
            t: 1.0,
        };
        assert_eq!(start.resolve().to_hex(), "#50503f");
        assert_eq!(end.resolve().to_hex(), "#a06240");
    }
}
