//! Colors and color-space blending
//!
//! `Color` is the interchange representation: gamma-encoded sRGB with a linear
//! alpha. Blending in other spaces converts both endpoints, interpolates there,
//! and converts back. Alpha is never transformed by any conversion.
//!
//! Supported spaces:
//!
//! - **sRGB**: raw component lerp (not physically linear)
//! - **Linear sRGB**: exact two-piece sRGB transfer function
//! - **HSV**: hue interpolated along the shortest arc
//! - **OKLab**: perceptually uniform lightness / opponent axes
//! - **OKLCH**: cylindrical OKLab, hue along the shortest arc

use crate::geometry::Vec4;
use std::f32::consts::TAU;

/// Color space used when blending two colors
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    /// Component-wise lerp of the gamma-encoded values
    #[default]
    Srgb,
    /// Decode to linear light, lerp, re-encode
    SrgbLinear,
    /// Lerp in HSV with shortest-arc hue
    Hsv,
    /// Lerp in OKLab
    Oklab,
    /// Lerp in OKLCH with shortest-arc hue
    Oklch,
}

// ─────────────────────────────────────────────────────────────────────────────
// sRGB
// ─────────────────────────────────────────────────────────────────────────────

/// RGBA color, gamma-encoded sRGB with linear alpha
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self::rgb(r, g, b)
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha;
        self
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Raw component-wise lerp (sRGB blending)
    pub fn lerp(self, other: Color, t: f32) -> Color {
        Color::rgba(
            lerp1(self.r, other.r, t),
            lerp1(self.g, other.g, t),
            lerp1(self.b, other.b, t),
            lerp1(self.a, other.a, t),
        )
    }

    /// Sum of absolute component differences
    pub fn manhattan(self, other: Color) -> f32 {
        (self.r - other.r).abs()
            + (self.g - other.g).abs()
            + (self.b - other.b).abs()
            + (self.a - other.a).abs()
    }

    pub fn to_linear(self) -> LinearRgb {
        LinearRgb {
            r: srgb_to_linear(self.r),
            g: srgb_to_linear(self.g),
            b: srgb_to_linear(self.b),
            a: self.a,
        }
    }

    pub fn to_hsv(self) -> Hsv {
        let Color { r, g, b, a } = self;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let d = max - min;
        let s = if max == 0.0 { 0.0 } else { d / max };
        let mut h = 0.0;
        if d != 0.0 {
            h = if max == r {
                ((g - b) / d) % 6.0
            } else if max == g {
                (b - r) / d + 2.0
            } else {
                (r - g) / d + 4.0
            };
            h /= 6.0;
            if h < 0.0 {
                h += 1.0;
            }
        }
        Hsv { h, s, v: max, a }
    }

    pub fn to_oklab(self) -> Oklab {
        self.to_linear().to_oklab()
    }

    pub fn to_oklch(self) -> Oklch {
        self.to_oklab().to_oklch()
    }
}

/// Opaque white, the identity value of a color channel
impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<Vec4> for Color {
    fn from(v: Vec4) -> Self {
        Color::rgba(v.x, v.y, v.z, v.w)
    }
}

impl From<Color> for Vec4 {
    fn from(c: Color) -> Self {
        Vec4::new(c.r, c.g, c.b, c.a)
    }
}

/// Decode one gamma-encoded sRGB component to linear light
#[inline]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Encode one linear-light component to gamma-encoded sRGB
#[inline]
pub fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.0031308 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Linear RGB
// ─────────────────────────────────────────────────────────────────────────────

/// Linear-light RGB with alpha
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearRgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl LinearRgb {
    pub fn to_srgb(self) -> Color {
        Color::rgba(
            linear_to_srgb(self.r),
            linear_to_srgb(self.g),
            linear_to_srgb(self.b),
            self.a,
        )
    }

    pub fn lerp(self, other: LinearRgb, t: f32) -> LinearRgb {
        LinearRgb {
            r: lerp1(self.r, other.r, t),
            g: lerp1(self.g, other.g, t),
            b: lerp1(self.b, other.b, t),
            a: lerp1(self.a, other.a, t),
        }
    }

    #[allow(clippy::excessive_precision)]
    pub fn to_oklab(self) -> Oklab {
        let l = 0.4122214708 * self.r + 0.5363325363 * self.g + 0.0514459929 * self.b;
        let m = 0.2119034982 * self.r + 0.6806995451 * self.g + 0.1073969566 * self.b;
        let s = 0.0883024619 * self.r + 0.2817188376 * self.g + 0.6299787005 * self.b;

        let l_c = l.cbrt();
        let m_c = m.cbrt();
        let s_c = s.cbrt();

        Oklab {
            l: 0.2104542553 * l_c + 0.7936177850 * m_c - 0.0040720468 * s_c,
            a: 1.9779984951 * l_c - 2.4285922050 * m_c + 0.4505937099 * s_c,
            b: 0.0259040371 * l_c + 0.7827717662 * m_c - 0.8086757660 * s_c,
            alpha: self.a,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HSV
// ─────────────────────────────────────────────────────────────────────────────

/// Hue / saturation / value, all normalized to `[0, 1]` (hue in turns)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
    pub a: f32,
}

impl Hsv {
    pub fn to_srgb(self) -> Color {
        let Hsv { h, s, v, a } = self;
        if s <= 0.0 {
            return Color::rgba(v, v, v, a);
        }
        let h = h.rem_euclid(1.0) * 6.0;
        let sector = h.floor();
        let f = h - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        let (r, g, b) = match (sector as i32).rem_euclid(6) {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        Color::rgba(r, g, b, a)
    }

    /// Lerp with the hue taking the shortest way around the circle
    pub fn lerp(self, other: Hsv, t: f32) -> Hsv {
        Hsv {
            h: lerp_hue(self.h, other.h, t),
            s: lerp1(self.s, other.s, t),
            v: lerp1(self.v, other.v, t),
            a: lerp1(self.a, other.a, t),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// OKLab / OKLCH
// ─────────────────────────────────────────────────────────────────────────────

/// OKLab lightness and opponent axes, with linear alpha
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Oklab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
    pub alpha: f32,
}

impl Oklab {
    #[allow(clippy::excessive_precision)]
    pub fn to_linear(self) -> LinearRgb {
        let l_c = self.l + 0.3963377774 * self.a + 0.2158037573 * self.b;
        let m_c = self.l - 0.1055613458 * self.a - 0.0638541728 * self.b;
        let s_c = self.l - 0.0894841775 * self.a - 1.2914855480 * self.b;

        let l3 = l_c * l_c * l_c;
        let m3 = m_c * m_c * m_c;
        let s3 = s_c * s_c * s_c;

        LinearRgb {
            r: 4.0767416621 * l3 - 3.3077115913 * m3 + 0.2309699292 * s3,
            g: -1.2684380046 * l3 + 2.6097574011 * m3 - 0.3413193965 * s3,
            b: -0.0041960863 * l3 - 0.7034186147 * m3 + 1.7076147010 * s3,
            a: self.alpha,
        }
    }

    pub fn to_srgb(self) -> Color {
        self.to_linear().to_srgb()
    }

    pub fn to_oklch(self) -> Oklch {
        let c = (self.a * self.a + self.b * self.b).sqrt();
        let mut h = self.b.atan2(self.a) / TAU;
        if h < 0.0 {
            h += 1.0;
        }
        Oklch {
            l: self.l,
            c,
            h,
            alpha: self.alpha,
        }
    }

    pub fn lerp(self, other: Oklab, t: f32) -> Oklab {
        Oklab {
            l: lerp1(self.l, other.l, t),
            a: lerp1(self.a, other.a, t),
            b: lerp1(self.b, other.b, t),
            alpha: lerp1(self.alpha, other.alpha, t),
        }
    }
}

/// Cylindrical OKLab: lightness, chroma and hue (in turns)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Oklch {
    pub l: f32,
    pub c: f32,
    pub h: f32,
    pub alpha: f32,
}

impl Oklch {
    pub fn to_oklab(self) -> Oklab {
        let h = self.h * TAU;
        Oklab {
            l: self.l,
            a: self.c * h.cos(),
            b: self.c * h.sin(),
            alpha: self.alpha,
        }
    }

    pub fn to_srgb(self) -> Color {
        self.to_oklab().to_srgb()
    }

    /// Lerp with the hue taking the shortest way around the circle
    pub fn lerp(self, other: Oklch, t: f32) -> Oklch {
        Oklch {
            l: lerp1(self.l, other.l, t),
            c: lerp1(self.c, other.c, t),
            h: lerp_hue(self.h, other.h, t),
            alpha: lerp1(self.alpha, other.alpha, t),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Blending
// ─────────────────────────────────────────────────────────────────────────────

/// Blend two sRGB colors in the given space
pub fn blend(a: Color, b: Color, t: f32, space: ColorSpace) -> Color {
    match space {
        ColorSpace::Srgb => a.lerp(b, t),
        ColorSpace::SrgbLinear => a.to_linear().lerp(b.to_linear(), t).to_srgb(),
        ColorSpace::Hsv => a.to_hsv().lerp(b.to_hsv(), t).to_srgb(),
        ColorSpace::Oklab => a.to_oklab().lerp(b.to_oklab(), t).to_srgb(),
        ColorSpace::Oklch => a.to_oklch().lerp(b.to_oklch(), t).to_srgb(),
    }
}

#[inline]
fn lerp1(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Interpolate a hue in turns along the shortest arc.
///
/// The difference is folded into `(-0.5, 0.5]` before scaling and the result is
/// wrapped back into `[0, 1)`.
pub fn lerp_hue(a: f32, b: f32, t: f32) -> f32 {
    let dh = 0.5 - (a - b + 0.5).rem_euclid(1.0);
    let h = (a + dh * t).rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative inputs
    if h >= 1.0 {
        0.0
    } else {
        h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Color, b: Color, eps: f32) {
        assert!(
            a.manhattan(b) <= eps * 4.0
                && (a.r - b.r).abs() <= eps
                && (a.g - b.g).abs() <= eps
                && (a.b - b.b).abs() <= eps
                && (a.a - b.a).abs() <= eps,
            "{a:?} != {b:?}"
        );
    }

    /// Circular distance between two hues in turns
    fn hue_distance(a: f32, b: f32) -> f32 {
        let d = (a - b).rem_euclid(1.0);
        d.min(1.0 - d)
    }

    #[test]
    fn test_transfer_function_thresholds() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        assert!((srgb_to_linear(0.04045) - 0.04045 / 12.92).abs() < 1e-7);
        assert!((linear_to_srgb(0.0031308) - 0.0031308 * 12.92).abs() < 1e-6);
        for i in 0..=20 {
            let c = i as f32 / 20.0;
            assert!((linear_to_srgb(srgb_to_linear(c)) - c).abs() < 1e-5);
        }
    }

    #[test]
    fn test_oklab_round_trip() {
        let samples = [
            Color::WHITE,
            Color::BLACK,
            Color::RED,
            Color::GREEN,
            Color::BLUE,
            Color::rgba(0.2, 0.7, 0.4, 0.5),
            Color::from_hex(0xFF5500),
            Color::from_hex(0x123456),
        ];
        for c in samples {
            assert_close(c.to_oklab().to_srgb(), c, 1e-3);
            assert_close(c.to_oklch().to_srgb(), c, 1e-3);
        }
    }

    #[test]
    fn test_hsv_round_trip() {
        for hex in [0xFF5500, 0x00FF88, 0x3366CC, 0x808080, 0xFFFFFF, 0x000000] {
            let c = Color::from_hex(hex);
            assert_close(c.to_hsv().to_srgb(), c, 1e-5);
        }
    }

    #[test]
    fn test_white_black_oklab() {
        let white = Color::WHITE.to_oklab();
        assert!((white.l - 1.0).abs() < 1e-3);
        assert!(white.a.abs() < 1e-3 && white.b.abs() < 1e-3);
        let black = Color::BLACK.to_oklab();
        assert!(black.l.abs() < 1e-6);
    }

    #[test]
    fn test_hue_shortest_arc() {
        let a = 350.0 / 360.0;
        let b = 10.0 / 360.0;
        let mid = lerp_hue(a, b, 0.5);
        assert!(hue_distance(mid, 0.0) < 1e-4, "mid hue {mid}");
        assert!((0.0..1.0).contains(&mid));

        // Reverse direction goes the same short way
        let mid = lerp_hue(b, a, 0.5);
        assert!(hue_distance(mid, 0.0) < 1e-4);

        // Exactly opposite hues move by +0.5
        assert!((lerp_hue(0.0, 0.5, 1.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_hsv_blend_passes_through_red() {
        let a = Hsv { h: 350.0 / 360.0, s: 1.0, v: 1.0, a: 1.0 }.to_srgb();
        let b = Hsv { h: 10.0 / 360.0, s: 1.0, v: 1.0, a: 1.0 }.to_srgb();
        let mid = blend(a, b, 0.5, ColorSpace::Hsv);
        assert!((mid.r - 1.0).abs() < 1e-3);
        assert!(mid.g < 1e-3 && mid.b < 1e-3, "went the long way: {mid:?}");
    }

    #[test]
    fn test_blend_endpoints() {
        let a = Color::from_hex(0x3366CC);
        let b = Color::from_hex(0xFFCC00).with_alpha(0.25);
        for space in [
            ColorSpace::Srgb,
            ColorSpace::SrgbLinear,
            ColorSpace::Hsv,
            ColorSpace::Oklab,
            ColorSpace::Oklch,
        ] {
            assert_close(blend(a, b, 0.0, space), a, 1e-3);
            assert_close(blend(a, b, 1.0, space), b, 1e-3);
        }
    }

    #[test]
    fn test_oklab_midpoint_differs_from_srgb() {
        let oklab = blend(Color::WHITE, Color::BLACK, 0.5, ColorSpace::Oklab);
        let naive = blend(Color::WHITE, Color::BLACK, 0.5, ColorSpace::Srgb);
        assert_eq!(naive, Color::rgb(0.5, 0.5, 0.5));
        assert!((oklab.r - oklab.g).abs() < 1e-3 && (oklab.g - oklab.b).abs() < 1e-3);
        assert!((oklab.r - 0.5).abs() > 0.05);
        assert!((oklab.r - 0.389).abs() < 0.01);
    }
}
