//! Anchor-relative targets
//!
//! A relative target is `anchor_size * percent + px_bias`, resolved each frame
//! against a size the host reports. Animations expressed this way follow
//! window and layout resizes without being restarted by hand.

use motif_core::{Size, Vec2, Vec4};

/// Reference rectangle a relative target is measured against
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AnchorSpace {
    /// Remaining content region of the current window
    #[default]
    WindowContent,
    /// Full size of the current window
    Window,
    /// The viewport or display
    Viewport,
    /// Extent of the most recently submitted item
    LastItem,
}

/// Component of a 2D anchor used by scalar targets
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Axis {
    #[default]
    X,
    Y,
}

impl Axis {
    pub fn pick(self, size: Size) -> f32 {
        match self {
            Axis::X => size.width,
            Axis::Y => size.height,
        }
    }
}

/// Host query for anchor sizes
pub trait AnchorSource {
    fn anchor_size(&self, space: AnchorSpace) -> Size;
}

impl<F> AnchorSource for F
where
    F: Fn(AnchorSpace) -> Size,
{
    fn anchor_size(&self, space: AnchorSpace) -> Size {
        self(space)
    }
}

/// Anchor sizes captured once per frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FixedAnchors {
    pub window_content: Size,
    pub window: Size,
    pub viewport: Size,
    pub last_item: Size,
}

impl FixedAnchors {
    /// Every anchor reports the same size
    pub const fn uniform(size: Size) -> Self {
        Self {
            window_content: size,
            window: size,
            viewport: size,
            last_item: size,
        }
    }

    pub fn set(&mut self, space: AnchorSpace, size: Size) {
        match space {
            AnchorSpace::WindowContent => self.window_content = size,
            AnchorSpace::Window => self.window = size,
            AnchorSpace::Viewport => self.viewport = size,
            AnchorSpace::LastItem => self.last_item = size,
        }
    }
}

impl AnchorSource for FixedAnchors {
    fn anchor_size(&self, space: AnchorSpace) -> Size {
        match space {
            AnchorSpace::WindowContent => self.window_content,
            AnchorSpace::Window => self.window,
            AnchorSpace::Viewport => self.viewport,
            AnchorSpace::LastItem => self.last_item,
        }
    }
}

/// A target expressed as `anchor_size * percent + px_bias`
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Relative<T> {
    pub percent: T,
    pub px_bias: T,
    pub space: AnchorSpace,
}

impl<T> Relative<T> {
    pub const fn new(percent: T, px_bias: T, space: AnchorSpace) -> Self {
        Self {
            percent,
            px_bias,
            space,
        }
    }
}

impl Relative<f32> {
    /// Resolve against one axis of the anchor
    pub fn resolve(&self, anchors: &dyn AnchorSource, axis: Axis) -> f32 {
        axis.pick(anchors.anchor_size(self.space)) * self.percent + self.px_bias
    }
}

impl Relative<Vec2> {
    pub fn resolve(&self, anchors: &dyn AnchorSource) -> Vec2 {
        let base = anchors.anchor_size(self.space);
        Vec2::new(
            base.width * self.percent.x + self.px_bias.x,
            base.height * self.percent.y + self.px_bias.y,
        )
    }
}

impl Relative<Vec4> {
    /// x and y scale with the anchor; z and w are `percent + bias`
    pub fn resolve(&self, anchors: &dyn AnchorSource) -> Vec4 {
        let base = anchors.anchor_size(self.space);
        Vec4::new(
            base.width * self.percent.x + self.px_bias.x,
            base.height * self.percent.y + self.px_bias.y,
            self.percent.z + self.px_bias.z,
            self.percent.w + self.px_bias.w,
        )
    }

    /// `percent + bias` on every component, ignoring the anchor
    pub fn offset(&self) -> Vec4 {
        Vec4::new(
            self.percent.x + self.px_bias.x,
            self.percent.y + self.px_bias.y,
            self.percent.z + self.px_bias.z,
            self.percent.w + self.px_bias.w,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_anchors() {
        let mut anchors = FixedAnchors::uniform(Size::new(100.0, 50.0));
        anchors.set(AnchorSpace::LastItem, Size::new(10.0, 20.0));
        assert_eq!(anchors.anchor_size(AnchorSpace::Window), Size::new(100.0, 50.0));
        assert_eq!(anchors.anchor_size(AnchorSpace::LastItem), Size::new(10.0, 20.0));
    }

    #[test]
    fn test_resolve() {
        let anchors = FixedAnchors::uniform(Size::new(800.0, 600.0));
        let half = Relative::new(0.5f32, 10.0, AnchorSpace::Viewport);
        assert_eq!(half.resolve(&anchors, Axis::Y), 310.0);

        let quarter = Relative::new(Vec2::new(0.25, 1.0), Vec2::new(-4.0, 0.0), AnchorSpace::Window);
        assert_eq!(quarter.resolve(&anchors), Vec2::new(196.0, 600.0));

        let rect = Relative::new(
            Vec4::new(0.5, 0.5, 0.25, 1.0),
            Vec4::new(0.0, 0.0, 0.25, -0.5),
            AnchorSpace::Window,
        );
        assert_eq!(rect.resolve(&anchors), Vec4::new(400.0, 300.0, 0.5, 0.5));
        assert_eq!(rect.offset(), Vec4::new(0.5, 0.5, 0.5, 0.5));
    }

    #[test]
    fn test_closure_source() {
        let source = |space: AnchorSpace| match space {
            AnchorSpace::Viewport => Size::new(1920.0, 1080.0),
            _ => Size::ZERO,
        };
        let full = Relative::new(1.0f32, 0.0, AnchorSpace::Viewport);
        assert_eq!(full.resolve(&source, Axis::X), 1920.0);
        let window = Relative::new(1.0f32, 5.0, AnchorSpace::Window);
        assert_eq!(window.resolve(&source, Axis::X), 5.0);
    }
}
