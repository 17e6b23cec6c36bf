//! Obscuring noise primitives.
//!
//! Samples a plan of dot and arc primitives from the RNG, then renders it
//! onto the composed canvas in place. The split lets tests assert on the
//! plan without pixel-diffing.

use crate::config::RenderConfig;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_antialiased_line_segment_mut, draw_filled_circle_mut};
use imageproc::pixelops::interpolate;
use rand::Rng;

const ARC_SEGMENTS: i32 = 50;

/// A single noise dot.
#[derive(Debug, Clone, Copy)]
pub struct DotParams {
    pub x: i32,
    pub y: i32,
}

/// An elliptical arc, described by its bounding box and angle range
/// (degrees, clockwise from three o'clock).
#[derive(Debug, Clone, Copy)]
pub struct ArcParams {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub start_deg: i32,
    pub end_deg: i32,
}

/// Everything the injector will draw for one image.
#[derive(Debug, Clone)]
pub struct NoisePlan {
    pub dots: Vec<DotParams>,
    pub arcs: Vec<ArcParams>,
}

/// Samples exactly `dot_number` dots and `curve_number` arcs.
///
/// Dots land anywhere on the canvas. Each arc's box spans from the left
/// 20% column band to the right 20% band, with both vertical edges inside
/// the middle 60% of the height, so the stroke crosses most of the image.
pub fn plan(config: &RenderConfig, rng: &mut impl Rng) -> NoisePlan {
    let w = config.width as i32;
    let h = config.height as i32;

    let dots = (0..config.dot_number)
        .map(|_| DotParams {
            x: rng.random_range(0..=w),
            y: rng.random_range(0..=h),
        })
        .collect();

    let arcs = (0..config.curve_number)
        .map(|_| {
            let y1 = rng.random_range(h / 5..=h - h / 5);
            ArcParams {
                x1: rng.random_range(0..=w / 5),
                x2: rng.random_range(w - w / 5..=w),
                y1,
                y2: rng.random_range(y1..=h - h / 5),
                start_deg: rng.random_range(0..=20),
                end_deg: rng.random_range(160..=200),
            }
        })
        .collect();

    NoisePlan { dots, arcs }
}

/// Renders a noise plan onto the canvas in the foreground color.
pub fn inject(canvas: &mut RgbImage, plan: &NoisePlan, config: &RenderConfig) {
    let fg = config.foreground;
    let color = Rgb([fg[0], fg[1], fg[2]]);
    let radius = (config.dot_size / 2) as i32;

    for dot in &plan.dots {
        if radius == 0 {
            let (x, y) = (dot.x, dot.y);
            if x >= 0 && y >= 0 && (x as u32) < canvas.width() && (y as u32) < canvas.height() {
                canvas.put_pixel(x as u32, y as u32, color);
            }
        } else {
            draw_filled_circle_mut(canvas, (dot.x, dot.y), radius, color);
        }
    }
    for arc in &plan.arcs {
        draw_arc(canvas, arc, color);
    }
}

/// Draws an elliptical arc as a chain of antialiased segments.
fn draw_arc(canvas: &mut RgbImage, arc: &ArcParams, color: Rgb<u8>) {
    let cx = (arc.x1 + arc.x2) as f32 / 2.0;
    let cy = (arc.y1 + arc.y2) as f32 / 2.0;
    let rx = (arc.x2 - arc.x1) as f32 / 2.0;
    let ry = (arc.y2 - arc.y1) as f32 / 2.0;
    let start = (arc.start_deg as f32).to_radians();
    let sweep = ((arc.end_deg - arc.start_deg) as f32).to_radians();

    let mut prev = arc_point(cx, cy, rx, ry, start);
    for i in 1..=ARC_SEGMENTS {
        let angle = start + sweep * i as f32 / ARC_SEGMENTS as f32;
        let curr = arc_point(cx, cy, rx, ry, angle);
        draw_antialiased_line_segment_mut(canvas, prev, curr, color, interpolate);
        prev = curr;
    }
}

fn arc_point(cx: f32, cy: f32, rx: f32, ry: f32, angle: f32) -> (i32, i32) {
    let x = (cx + rx * angle.cos()).round();
    let y = (cy + ry * angle.sin()).round();
    (x as i32, y as i32)
}
