//! SVG serialization of a [`Frame`].
//!
//! The frame's camera becomes one `<g transform>` so commands are written
//! in world coordinates, exactly as built.

use std::fmt::Write;

use tracing::error;

use super::color::Rgba;
use super::frame::{DrawCommand, Frame};

/// Escapes text for XML content and attribute values.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// `fill="#rrggbb"` plus `fill-opacity` when translucent.
fn paint(attr: &str, color: &Rgba) -> String {
    let base = format!("{}=\"#{:02x}{:02x}{:02x}\"", attr, color.r, color.g, color.b);
    if color.a < 1.0 {
        format!("{} {}-opacity=\"{}\"", base, attr, color.a)
    } else {
        base
    }
}

pub fn frame_to_svg(frame: &Frame) -> String {
    let mut svg = String::with_capacity(256 + frame.commands.len() * 96);
    if let Err(e) = write_svg(&mut svg, frame) {
        error!(error = %e, "failed to generate SVG");
        return format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\"/>\n",
            frame.width, frame.height
        );
    }
    svg
}

fn write_svg(svg: &mut String, frame: &Frame) -> std::fmt::Result {
    writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
        w = frame.width,
        h = frame.height
    )?;

    let glows: Vec<(usize, Rgba, f64)> = frame
        .commands
        .iter()
        .enumerate()
        .filter_map(|(i, c)| match c {
            DrawCommand::Circle { glow: Some(g), .. } => Some((i, g.color, g.blur)),
            _ => None,
        })
        .collect();
    if !glows.is_empty() {
        writeln!(svg, "  <defs>")?;
        for (i, color, blur) in &glows {
            writeln!(
                svg,
                "    <filter id=\"glow{}\" x=\"-100%\" y=\"-100%\" width=\"300%\" height=\"300%\"><feDropShadow dx=\"0\" dy=\"0\" stdDeviation=\"{}\" {}/></filter>",
                i,
                blur / 2.0,
                paint("flood-color", color).replace("flood-color-opacity", "flood-opacity")
            )?;
        }
        writeln!(svg, "  </defs>")?;
    }

    writeln!(
        svg,
        "  <rect width=\"100%\" height=\"100%\" {}/>",
        paint("fill", &frame.background)
    )?;
    let t = frame.transform;
    writeln!(svg, "  <g transform=\"translate({} {}) scale({})\">", t.x, t.y, t.k)?;

    for (i, command) in frame.commands.iter().enumerate() {
        match command {
            DrawCommand::Line { x1, y1, x2, y2, color, width } => writeln!(
                svg,
                "    <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" {} stroke-width=\"{}\"/>",
                x1, y1, x2, y2, paint("stroke", color), width
            )?,
            DrawCommand::Lines { segments, color, width } => {
                let mut d = String::with_capacity(segments.len() * 32);
                for [sx, sy, tx, ty] in segments {
                    write!(d, "M{} {}L{} {}", sx, sy, tx, ty)?;
                }
                writeln!(
                    svg,
                    "    <path d=\"{}\" fill=\"none\" {} stroke-width=\"{}\"/>",
                    d, paint("stroke", color), width
                )?;
            }
            DrawCommand::Triangle { points, fill } => writeln!(
                svg,
                "    <polygon points=\"{},{} {},{} {},{}\" {}/>",
                points[0].0, points[0].1, points[1].0, points[1].1, points[2].0, points[2].1,
                paint("fill", fill)
            )?,
            DrawCommand::Circle { cx, cy, r, fill, stroke, stroke_width, glow } => {
                let filter = if glow.is_some() {
                    format!(" filter=\"url(#glow{})\"", i)
                } else {
                    String::new()
                };
                writeln!(
                    svg,
                    "    <circle cx=\"{}\" cy=\"{}\" r=\"{}\" {} {} stroke-width=\"{}\"{}/>",
                    cx, cy, r, paint("fill", fill), paint("stroke", stroke), stroke_width, filter
                )?;
            }
            DrawCommand::Square { x, y, size, fill } => writeln!(
                svg,
                "    <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" {}/>",
                x, y, size, size, paint("fill", fill)
            )?,
            DrawCommand::Text { x, y, text, size, color } => writeln!(
                svg,
                "    <text x=\"{}\" y=\"{}\" font-size=\"{}\" font-family=\"sans-serif\" text-anchor=\"middle\" dominant-baseline=\"hanging\" {}>{}</text>",
                x, y, size, paint("fill", color), escape(text)
            )?,
        }
    }

    writeln!(svg, "  </g>")?;
    writeln!(svg, "</svg>")?;
    Ok(())
}
