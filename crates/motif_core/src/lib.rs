//! Motif Core
//!
//! Foundational value types shared by the Motif animation engine and its hosts:
//!
//! - **Geometry**: `Vec2`, `Vec4`, `Size` and `Rect`
//! - **Color**: gamma-encoded sRGB `Color` with conversions to linear RGB, HSV,
//!   OKLab and OKLCH, plus a per-space blend dispatcher
//!
//! # Example
//!
//! ```rust
//! use motif_core::{blend, Color, ColorSpace};
//!
//! let mid = blend(Color::WHITE, Color::BLACK, 0.5, ColorSpace::Oklab);
//! // Perceptual midpoint is darker than the naive sRGB average of 0.5
//! assert!((mid.r - 0.389).abs() < 0.01);
//! ```

pub mod color;
pub mod geometry;

pub use color::{blend, ColorSpace, Color, Hsv, LinearRgb, Oklab, Oklch};
pub use geometry::{Rect, Size, Vec2, Vec4};
