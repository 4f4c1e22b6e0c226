//! Retained 2D draw list
//!
//! Levels rebuild a [`DrawList`] from their state every frame; a backend
//! (the canvas painter on the web) replays it. Keeping the list as plain data
//! means rendering can be inspected in tests without a browser.

use glam::Vec2;

use super::color::Color;
use super::sprites::SpriteKind;
use crate::sim::{ParticleSystem, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    #[default]
    Top,
    Middle,
    Bottom,
}

impl TextBaseline {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextBaseline::Top => "top",
            TextBaseline::Middle => "middle",
            TextBaseline::Bottom => "bottom",
        }
    }
}

/// Font, colour, alignment and optional drop shadow for a text run
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font: String,
    pub color: Color,
    pub align: TextAlign,
    pub baseline: TextBaseline,
    /// Shadow colour and offset (same offset on both axes)
    pub shadow: Option<(Color, f32)>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: "16px Arial".to_string(),
            color: Color::BLACK,
            align: TextAlign::Left,
            baseline: TextBaseline::Top,
            shadow: None,
        }
    }
}

impl TextStyle {
    pub fn new(font: impl Into<String>, color: Color) -> Self {
        Self {
            font: font.into(),
            color,
            ..Self::default()
        }
    }

    pub fn centered(mut self) -> Self {
        self.align = TextAlign::Center;
        self.baseline = TextBaseline::Middle;
        self
    }

    pub fn aligned(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    /// Default drop shadow: half-black, 2px
    pub fn shadowed(mut self) -> Self {
        self.shadow = Some((Color::BLACK.with_alpha(0.5), 2.0));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientDir {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Clear(Color),
    FillRect {
        rect: Rect,
        color: Color,
    },
    StrokeRect {
        rect: Rect,
        color: Color,
        width: f32,
    },
    Gradient {
        rect: Rect,
        from: Color,
        to: Color,
        dir: GradientDir,
    },
    RoundedRect {
        rect: Rect,
        radius: f32,
        color: Color,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    StrokeCircle {
        center: Vec2,
        radius: f32,
        color: Color,
        width: f32,
    },
    /// Filled wedge from the centre, angles in radians
    Pie {
        center: Vec2,
        radius: f32,
        start: f32,
        end: f32,
        color: Color,
    },
    Polygon {
        points: Vec<Vec2>,
        color: Color,
    },
    Polyline {
        points: Vec<Vec2>,
        color: Color,
        width: f32,
    },
    Text {
        text: String,
        pos: Vec2,
        style: TextStyle,
    },
    Sprite {
        kind: SpriteKind,
        center: Vec2,
        size: f32,
        rotation: f32,
    },
    PushTransform {
        translate: Vec2,
        rotate: f32,
    },
    PopTransform,
}

#[derive(Debug, Clone, Default)]
pub struct DrawList {
    cmds: Vec<DrawCmd>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: DrawCmd) {
        self.cmds.push(cmd);
    }

    pub fn reset(&mut self) {
        self.cmds.clear();
    }

    pub fn commands(&self) -> &[DrawCmd] {
        &self.cmds
    }

    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    // === Painter helpers ===

    pub fn clear(&mut self, color: Color) {
        self.push(DrawCmd::Clear(color));
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.push(DrawCmd::FillRect { rect, color });
    }

    pub fn stroke_rect(&mut self, rect: Rect, color: Color, width: f32) {
        self.push(DrawCmd::StrokeRect { rect, color, width });
    }

    pub fn gradient_rect(&mut self, rect: Rect, from: Color, to: Color, dir: GradientDir) {
        self.push(DrawCmd::Gradient {
            rect,
            from,
            to,
            dir,
        });
    }

    /// Corner radius is clamped to half the shorter side
    pub fn rounded_rect(&mut self, rect: Rect, radius: f32, color: Color) {
        let radius = radius.max(0.0).min(rect.w.min(rect.h) / 2.0);
        self.push(DrawCmd::RoundedRect {
            rect,
            radius,
            color,
        });
    }

    /// Rectangle over an offset translucent shadow
    pub fn shadow_rect(&mut self, rect: Rect, color: Color) {
        self.shadow_rect_with(rect, color, Color::BLACK.with_alpha(0.3), 3.0);
    }

    pub fn shadow_rect_with(&mut self, rect: Rect, color: Color, shadow: Color, offset: f32) {
        let shadow_rect = Rect::new(rect.x + offset, rect.y + offset, rect.w, rect.h);
        self.fill_rect(shadow_rect, shadow);
        self.fill_rect(rect, color);
    }

    pub fn circle(&mut self, center: Vec2, radius: f32, color: Color) {
        if radius <= 0.0 {
            return;
        }
        self.push(DrawCmd::Circle {
            center,
            radius,
            color,
        });
    }

    pub fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Color, width: f32) {
        self.push(DrawCmd::StrokeCircle {
            center,
            radius,
            color,
            width,
        });
    }

    pub fn pie(&mut self, center: Vec2, radius: f32, start: f32, end: f32, color: Color) {
        self.push(DrawCmd::Pie {
            center,
            radius,
            start,
            end,
            color,
        });
    }

    pub fn polygon(&mut self, points: Vec<Vec2>, color: Color) {
        if points.len() < 3 {
            return;
        }
        self.push(DrawCmd::Polygon { points, color });
    }

    pub fn line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32) {
        self.push(DrawCmd::Polyline {
            points: vec![from, to],
            color,
            width,
        });
    }

    pub fn polyline(&mut self, points: Vec<Vec2>, color: Color, width: f32) {
        if points.len() < 2 {
            return;
        }
        self.push(DrawCmd::Polyline {
            points,
            color,
            width,
        });
    }

    /// A single soft particle; `alpha` multiplies the colour's own
    pub fn particle(&mut self, pos: Vec2, size: f32, color: Color, alpha: f32) {
        self.circle(pos, size, color.with_alpha(color.a * alpha));
    }

    /// Every live particle, faded by remaining life
    pub fn particles(&mut self, system: &ParticleSystem) {
        for p in system.iter() {
            self.particle(p.pos, p.size, p.color, p.alpha());
        }
    }

    pub fn text(&mut self, text: impl Into<String>, pos: Vec2, style: &TextStyle) {
        self.push(DrawCmd::Text {
            text: text.into(),
            pos,
            style: style.clone(),
        });
    }

    pub fn sprite(&mut self, kind: SpriteKind, center: Vec2, size: f32, rotation: f32) {
        self.push(DrawCmd::Sprite {
            kind,
            center,
            size,
            rotation,
        });
    }

    /// Run `f` with the origin moved and rotated; always balanced
    pub fn with_transform(&mut self, translate: Vec2, rotate: f32, f: impl FnOnce(&mut Self)) {
        self.push(DrawCmd::PushTransform { translate, rotate });
        f(self);
        self.push(DrawCmd::PopTransform);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounded_rect_radius_clamped() {
        let mut list = DrawList::new();
        list.rounded_rect(Rect::new(0.0, 0.0, 40.0, 10.0), 20.0, Color::WHITE);
        match &list.commands()[0] {
            DrawCmd::RoundedRect { radius, .. } => assert_eq!(*radius, 5.0),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_shadow_rect_draws_shadow_first() {
        let mut list = DrawList::new();
        let rect = Rect::new(10.0, 10.0, 5.0, 5.0);
        list.shadow_rect(rect, Color::WHITE);
        assert_eq!(list.len(), 2);
        match &list.commands()[0] {
            DrawCmd::FillRect { rect: r, color } => {
                assert_eq!(r.x, 13.0);
                assert!(color.a < 1.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_transform_balanced() {
        let mut list = DrawList::new();
        list.with_transform(Vec2::new(5.0, 5.0), 0.5, |l| {
            l.circle(Vec2::ZERO, 3.0, Color::WHITE);
        });
        assert!(matches!(list.commands()[0], DrawCmd::PushTransform { .. }));
        assert!(matches!(list.commands()[2], DrawCmd::PopTransform));
    }

    #[test]
    fn test_particle_alpha_multiplies() {
        let mut list = DrawList::new();
        list.particle(Vec2::ZERO, 2.0, Color::WHITE.with_alpha(0.5), 0.5);
        match &list.commands()[0] {
            DrawCmd::Circle { color, .. } => assert!((color.a - 0.25).abs() < 1e-6),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_degenerate_shapes_skipped() {
        let mut list = DrawList::new();
        list.circle(Vec2::ZERO, 0.0, Color::WHITE);
        list.polygon(vec![Vec2::ZERO, Vec2::ONE], Color::WHITE);
        list.polyline(vec![Vec2::ZERO], Color::WHITE, 1.0);
        assert!(list.is_empty());
    }
}
