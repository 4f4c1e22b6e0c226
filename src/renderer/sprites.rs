//! Sprite lookup with procedural fallbacks
//!
//! Sprites load from `assets/sprites/<name>.png`. Until an image arrives, or
//! if it never does, the backend draws a procedurally generated placeholder
//! so the game never stalls on a missing file.

use std::collections::HashMap;
use std::f32::consts::PI;

use super::color::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteKind {
    Pacman,
    Ghost,
    Dot,
    PowerPellet,
    /// Anything without a dedicated generator
    Unknown,
}

impl SpriteKind {
    pub const ALL: [SpriteKind; 4] = [
        SpriteKind::Pacman,
        SpriteKind::Ghost,
        SpriteKind::Dot,
        SpriteKind::PowerPellet,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SpriteKind::Pacman => "pacman",
            SpriteKind::Ghost => "ghost",
            SpriteKind::Dot => "dot",
            SpriteKind::PowerPellet => "power-pellet",
            SpriteKind::Unknown => "unknown",
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "pacman" => SpriteKind::Pacman,
            "ghost" => SpriteKind::Ghost,
            "dot" => SpriteKind::Dot,
            "power-pellet" => SpriteKind::PowerPellet,
            _ => SpriteKind::Unknown,
        }
    }

    pub fn asset_path(&self) -> String {
        format!("assets/sprites/{}.png", self.name())
    }
}

/// Square RGBA8 image, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl PixelImage {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Composite `color` over the existing pixel
    fn blend(&mut self, x: u32, y: u32, color: Color) {
        if color.a <= 0.0 {
            return;
        }
        let i = ((y * self.width + x) * 4) as usize;
        let src_a = color.a.clamp(0.0, 1.0);
        let dst_a = self.pixels[i + 3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }
        let mix = |s: u8, d: u8| {
            ((s as f32 * src_a + d as f32 * dst_a * (1.0 - src_a)) / out_a).round() as u8
        };
        self.pixels[i] = mix(color.r, self.pixels[i]);
        self.pixels[i + 1] = mix(color.g, self.pixels[i + 1]);
        self.pixels[i + 2] = mix(color.b, self.pixels[i + 2]);
        self.pixels[i + 3] = (out_a * 255.0).round() as u8;
    }

    /// Paint every pixel whose centre satisfies `inside`
    fn paint(&mut self, color: Color, inside: impl Fn(f32, f32) -> bool) {
        for y in 0..self.height {
            for x in 0..self.width {
                if inside(x as f32 + 0.5, y as f32 + 0.5) {
                    self.blend(x, y, color);
                }
            }
        }
    }
}

const GHOST_BODY: Color = Color::hex(0xFF6B6B);
const GOLD: Color = Color::hex(0xFFD700);
const ORANGE: Color = Color::hex(0xFFA500);
const PLACEHOLDER_CYAN: Color = Color::hex(0x00F2FE);

/// 5x7 question mark, one row per byte (low 5 bits)
const QUESTION_GLYPH: [u8; 7] = [
    0b01110, 0b10001, 0b00001, 0b00110, 0b00100, 0b00000, 0b00100,
];

fn in_circle(cx: f32, cy: f32, r: f32) -> impl Fn(f32, f32) -> bool {
    move |x, y| (x - cx).powi(2) + (y - cy).powi(2) <= r * r
}

/// Deterministic stand-in artwork for `kind`, `size` pixels square
pub fn procedural_sprite(kind: SpriteKind, size: u32) -> PixelImage {
    let size = size.max(4);
    let mut img = PixelImage::new(size, size);
    let s = size as f32;
    let c = s / 2.0;

    match kind {
        SpriteKind::Ghost => {
            let r = s * 0.4;
            let top = c - r * 0.2;
            // Dome, skirt and a wavy hem
            img.paint(GHOST_BODY, move |x, y| {
                let dome = (x - c).powi(2) + (y - top).powi(2) <= r * r && y <= top;
                let hem = c + r * 0.8 + (x / s * 3.0 * 2.0 * PI).sin() * s * 0.05;
                let skirt = (x - c).abs() <= r && y >= top && y <= hem;
                dome || skirt
            });
            let eye_y = top - r * 0.1;
            for dx in [-0.35, 0.35] {
                let ex = c + dx * r;
                img.paint(Color::WHITE, in_circle(ex, eye_y, r * 0.25));
                img.paint(Color::BLACK, in_circle(ex + r * 0.05, eye_y, r * 0.12));
            }
        }
        SpriteKind::Dot => {
            img.paint(Color::hex(0xFFFF00).with_alpha(0.3), in_circle(c, c, s * 0.4));
            img.paint(GOLD, in_circle(c, c, s * 0.25));
            img.paint(Color::WHITE, in_circle(c - s * 0.08, c - s * 0.08, s * 0.07));
        }
        SpriteKind::PowerPellet => {
            let r = s * 0.3;
            img.paint(ORANGE.with_alpha(0.35), in_circle(c, c, s * 0.48));
            img.paint(GOLD, in_circle(c, c, r));
            img.paint(Color::WHITE.with_alpha(0.8), move |x, y| {
                let d = ((x - c).powi(2) + (y - c).powi(2)).sqrt();
                (d - r * 1.25).abs() <= 0.75
            });
        }
        SpriteKind::Pacman => {
            let r = s * 0.45;
            let mouth = 0.35;
            img.paint(GOLD, move |x, y| {
                let inside = (x - c).powi(2) + (y - c).powi(2) <= r * r;
                let angle = (y - c).atan2(x - c);
                inside && angle.abs() > mouth
            });
        }
        SpriteKind::Unknown => {
            img.paint(PLACEHOLDER_CYAN, |_, _| true);
            let cell = (s / 10.0).max(1.0);
            let ox = c - cell * 2.5;
            let oy = c - cell * 3.5;
            img.paint(Color::WHITE, move |x, y| {
                let col = ((x - ox) / cell).floor();
                let row = ((y - oy) / cell).floor();
                if !(0.0..5.0).contains(&col) || !(0.0..7.0).contains(&row) {
                    return false;
                }
                QUESTION_GLYPH[row as usize] & (1 << (4 - col as u32)) != 0
            });
        }
    }

    img
}

/// Load state of one sprite
#[derive(Debug, Clone)]
pub enum SpriteSlot<I> {
    Pending,
    Loaded(I),
    Failed,
}

/// What the backend should draw for a sprite right now
pub enum SpriteSource<'a, I> {
    Image(&'a I),
    Placeholder(&'a PixelImage),
}

/// Sprite images keyed by kind, generic over the platform's image handle
pub struct SpriteBank<I> {
    slots: HashMap<SpriteKind, SpriteSlot<I>>,
    placeholders: HashMap<SpriteKind, PixelImage>,
    placeholder_size: u32,
}

impl<I> SpriteBank<I> {
    pub fn new(placeholder_size: u32) -> Self {
        Self {
            slots: HashMap::new(),
            placeholders: HashMap::new(),
            placeholder_size,
        }
    }

    /// Mark `kind` as requested. Returns the path to fetch, or `None` if it
    /// was already requested.
    pub fn request(&mut self, kind: SpriteKind) -> Option<String> {
        if self.slots.contains_key(&kind) {
            return None;
        }
        self.slots.insert(kind, SpriteSlot::Pending);
        Some(kind.asset_path())
    }

    pub fn on_loaded(&mut self, kind: SpriteKind, image: I) {
        self.slots.insert(kind, SpriteSlot::Loaded(image));
    }

    pub fn on_failed(&mut self, kind: SpriteKind) {
        log::warn!(
            "Sprite '{}' failed to load, using generated placeholder",
            kind.asset_path()
        );
        self.slots.insert(kind, SpriteSlot::Failed);
    }

    pub fn is_loaded(&self, kind: SpriteKind) -> bool {
        matches!(self.slots.get(&kind), Some(SpriteSlot::Loaded(_)))
    }

    /// Loaded image if available, generated placeholder otherwise
    pub fn lookup(&mut self, kind: SpriteKind) -> SpriteSource<'_, I> {
        if let Some(SpriteSlot::Loaded(image)) = self.slots.get(&kind) {
            return SpriteSource::Image(image);
        }
        let size = self.placeholder_size;
        SpriteSource::Placeholder(
            self.placeholders
                .entry(kind)
                .or_insert_with(|| procedural_sprite(kind, size)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_procedural_sprite_is_deterministic() {
        for kind in SpriteKind::ALL {
            assert_eq!(procedural_sprite(kind, 32), procedural_sprite(kind, 32));
        }
    }

    #[test]
    fn test_dot_centre_is_gold() {
        let img = procedural_sprite(SpriteKind::Dot, 32);
        let [r, g, b, a] = img.get(20, 20);
        assert_eq!((r, g, b, a), (0xFF, 0xD7, 0x00, 255));
        // Corners stay transparent
        assert_eq!(img.get(0, 0)[3], 0);
    }

    #[test]
    fn test_unknown_is_cyan_square() {
        let img = procedural_sprite(SpriteKind::Unknown, 40);
        assert_eq!(img.get(0, 0), [0x00, 0xF2, 0xFE, 255]);
        let has_white = img.pixels.chunks(4).any(|p| p == [255, 255, 255, 255]);
        assert!(has_white);
    }

    #[test]
    fn test_ghost_has_eyes() {
        let img = procedural_sprite(SpriteKind::Ghost, 48);
        let has_black = img.pixels.chunks(4).any(|p| p == [0, 0, 0, 255]);
        assert!(has_black);
    }

    #[test]
    fn test_bank_falls_back_until_loaded() {
        let mut bank: SpriteBank<&'static str> = SpriteBank::new(16);
        assert_eq!(
            bank.request(SpriteKind::Ghost).as_deref(),
            Some("assets/sprites/ghost.png")
        );
        assert!(bank.request(SpriteKind::Ghost).is_none());
        assert!(matches!(
            bank.lookup(SpriteKind::Ghost),
            SpriteSource::Placeholder(_)
        ));

        bank.on_loaded(SpriteKind::Ghost, "img");
        assert!(matches!(bank.lookup(SpriteKind::Ghost), SpriteSource::Image(&"img")));

        bank.request(SpriteKind::Dot);
        bank.on_failed(SpriteKind::Dot);
        assert!(matches!(bank.lookup(SpriteKind::Dot), SpriteSource::Placeholder(_)));
    }

    #[test]
    fn test_names_round_trip() {
        for kind in SpriteKind::ALL {
            assert_eq!(SpriteKind::from_name(kind.name()), kind);
        }
        assert_eq!(SpriteKind::from_name("mystery"), SpriteKind::Unknown);
    }
}
