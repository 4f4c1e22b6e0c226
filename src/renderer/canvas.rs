//! Canvas 2D backend: replays a [`DrawList`] onto the page's canvas

use std::collections::HashMap;
use std::f64::consts::TAU;

use wasm_bindgen::{Clamped, JsCast};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, ImageData};

use super::draw::{DrawCmd, DrawList, GradientDir};
use super::sprites::{PixelImage, SpriteBank, SpriteKind, SpriteSource};
use crate::error::{ArcadeError, Result};

pub struct CanvasPainter {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
    /// Placeholder sprites uploaded to offscreen canvases
    placeholder_canvases: HashMap<SpriteKind, HtmlCanvasElement>,
}

impl CanvasPainter {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|_| ArcadeError::Platform("getContext('2d') threw".into()))?
            .ok_or_else(|| ArcadeError::Platform("2d context unavailable".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| ArcadeError::Platform("not a 2d context".into()))?;
        Ok(Self {
            ctx,
            width: canvas.width() as f64,
            height: canvas.height() as f64,
            placeholder_canvases: HashMap::new(),
        })
    }

    /// Draw every command. Individual failures are skipped; a frame is
    /// never aborted.
    pub fn replay(&mut self, list: &DrawList, sprites: &mut SpriteBank<HtmlImageElement>) {
        for cmd in list.commands() {
            self.draw(cmd, sprites);
        }
    }

    fn draw(&mut self, cmd: &DrawCmd, sprites: &mut SpriteBank<HtmlImageElement>) {
        let ctx = &self.ctx;
        match cmd {
            DrawCmd::Clear(color) => {
                ctx.set_fill_style_str(&color.to_css());
                ctx.fill_rect(0.0, 0.0, self.width, self.height);
            }
            DrawCmd::FillRect { rect, color } => {
                ctx.set_fill_style_str(&color.to_css());
                ctx.fill_rect(rect.x as f64, rect.y as f64, rect.w as f64, rect.h as f64);
            }
            DrawCmd::StrokeRect { rect, color, width } => {
                ctx.set_stroke_style_str(&color.to_css());
                ctx.set_line_width(*width as f64);
                ctx.stroke_rect(rect.x as f64, rect.y as f64, rect.w as f64, rect.h as f64);
            }
            DrawCmd::Gradient {
                rect,
                from,
                to,
                dir,
            } => {
                let (x0, y0) = (rect.x as f64, rect.y as f64);
                let (x1, y1) = match dir {
                    GradientDir::Vertical => (x0, y0 + rect.h as f64),
                    GradientDir::Horizontal => (x0 + rect.w as f64, y0),
                };
                let gradient = ctx.create_linear_gradient(x0, y0, x1, y1);
                gradient.add_color_stop(0.0, &from.to_css()).ok();
                gradient.add_color_stop(1.0, &to.to_css()).ok();
                ctx.set_fill_style_canvas_gradient(&gradient);
                ctx.fill_rect(x0, y0, rect.w as f64, rect.h as f64);
            }
            DrawCmd::RoundedRect {
                rect,
                radius,
                color,
            } => {
                let (x, y, w, h, r) = (
                    rect.x as f64,
                    rect.y as f64,
                    rect.w as f64,
                    rect.h as f64,
                    *radius as f64,
                );
                ctx.begin_path();
                ctx.move_to(x + r, y);
                ctx.arc_to(x + w, y, x + w, y + h, r).ok();
                ctx.arc_to(x + w, y + h, x, y + h, r).ok();
                ctx.arc_to(x, y + h, x, y, r).ok();
                ctx.arc_to(x, y, x + w, y, r).ok();
                ctx.close_path();
                ctx.set_fill_style_str(&color.to_css());
                ctx.fill();
            }
            DrawCmd::Circle {
                center,
                radius,
                color,
            } => {
                ctx.begin_path();
                ctx.arc(center.x as f64, center.y as f64, *radius as f64, 0.0, TAU)
                    .ok();
                ctx.set_fill_style_str(&color.to_css());
                ctx.fill();
            }
            DrawCmd::StrokeCircle {
                center,
                radius,
                color,
                width,
            } => {
                ctx.begin_path();
                ctx.arc(center.x as f64, center.y as f64, *radius as f64, 0.0, TAU)
                    .ok();
                ctx.set_stroke_style_str(&color.to_css());
                ctx.set_line_width(*width as f64);
                ctx.stroke();
            }
            DrawCmd::Pie {
                center,
                radius,
                start,
                end,
                color,
            } => {
                ctx.begin_path();
                ctx.move_to(center.x as f64, center.y as f64);
                ctx.arc(
                    center.x as f64,
                    center.y as f64,
                    *radius as f64,
                    *start as f64,
                    *end as f64,
                )
                .ok();
                ctx.close_path();
                ctx.set_fill_style_str(&color.to_css());
                ctx.fill();
            }
            DrawCmd::Polygon { points, color } => {
                trace_path(ctx, points);
                ctx.close_path();
                ctx.set_fill_style_str(&color.to_css());
                ctx.fill();
            }
            DrawCmd::Polyline {
                points,
                color,
                width,
            } => {
                trace_path(ctx, points);
                ctx.set_stroke_style_str(&color.to_css());
                ctx.set_line_width(*width as f64);
                ctx.stroke();
            }
            DrawCmd::Text { text, pos, style } => {
                ctx.set_font(&style.font);
                ctx.set_text_align(style.align.as_str());
                ctx.set_text_baseline(style.baseline.as_str());
                if let Some((shadow, offset)) = style.shadow {
                    ctx.set_fill_style_str(&shadow.to_css());
                    ctx.fill_text(text, (pos.x + offset) as f64, (pos.y + offset) as f64)
                        .ok();
                }
                ctx.set_fill_style_str(&style.color.to_css());
                ctx.fill_text(text, pos.x as f64, pos.y as f64).ok();
            }
            DrawCmd::Sprite {
                kind,
                center,
                size,
                rotation,
            } => {
                let half = *size as f64 / 2.0;
                ctx.save();
                ctx.translate(center.x as f64, center.y as f64).ok();
                ctx.rotate(*rotation as f64).ok();
                match sprites.lookup(*kind) {
                    SpriteSource::Image(img) => {
                        ctx.draw_image_with_html_image_element_and_dw_and_dh(
                            img,
                            -half,
                            -half,
                            *size as f64,
                            *size as f64,
                        )
                        .ok();
                    }
                    SpriteSource::Placeholder(pixels) => {
                        if !self.placeholder_canvases.contains_key(kind) {
                            match upload_pixels(pixels) {
                                Ok(canvas) => {
                                    self.placeholder_canvases.insert(*kind, canvas);
                                }
                                Err(e) => log::warn!("Placeholder upload failed: {}", e),
                            }
                        }
                        if let Some(canvas) = self.placeholder_canvases.get(kind) {
                            self.ctx
                                .draw_image_with_html_canvas_element_and_dw_and_dh(
                                    canvas,
                                    -half,
                                    -half,
                                    *size as f64,
                                    *size as f64,
                                )
                                .ok();
                        }
                    }
                }
                self.ctx.restore();
            }
            DrawCmd::PushTransform { translate, rotate } => {
                ctx.save();
                ctx.translate(translate.x as f64, translate.y as f64).ok();
                if *rotate != 0.0 {
                    ctx.rotate(*rotate as f64).ok();
                }
            }
            DrawCmd::PopTransform => ctx.restore(),
        }
    }
}

fn trace_path(ctx: &CanvasRenderingContext2d, points: &[glam::Vec2]) {
    ctx.begin_path();
    if let Some((first, rest)) = points.split_first() {
        ctx.move_to(first.x as f64, first.y as f64);
        for p in rest {
            ctx.line_to(p.x as f64, p.y as f64);
        }
    }
}

/// Copy a generated sprite onto an offscreen canvas so it can be scaled
/// and rotated like a loaded image.
fn upload_pixels(image: &PixelImage) -> Result<HtmlCanvasElement> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| ArcadeError::Platform("no document".into()))?;
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(|_| ArcadeError::Platform("createElement failed".into()))?
        .dyn_into()
        .map_err(|_| ArcadeError::Platform("not a canvas".into()))?;
    canvas.set_width(image.width);
    canvas.set_height(image.height);

    let ctx = canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
        .ok_or_else(|| ArcadeError::Platform("offscreen 2d context unavailable".into()))?;
    let data = ImageData::new_with_u8_clamped_array_and_sh(
        Clamped(image.pixels.as_slice()),
        image.width,
        image.height,
    )
    .map_err(|_| ArcadeError::Platform("ImageData rejected pixels".into()))?;
    ctx.put_image_data(&data, 0.0, 0.0)
        .map_err(|_| ArcadeError::Platform("putImageData failed".into()))?;
    Ok(canvas)
}
