use std::fmt::Write as _;

use crate::engine::frame::{BarView, Frame};
use crate::foundation::core::{Rect, Rgba8};
use crate::render::format::format_number;

const BAR_INSET: f64 = 5.0;
const LABEL_FONT_PX: f64 = 14.0;
const LABEL_GAP: f64 = 10.0;
const KEY_FONT_PX: f64 = 64.0;
const TOTAL_FONT_PX: f64 = 24.0;
const KEY_LIFT: f64 = 32.0;
const AXIS_DROP: f64 = 25.0;
const TICK_HALF: f64 = 5.0;
const TICK_LABEL_DROP: f64 = 22.0;
const TICK_FONT_PX: f64 = 12.0;
const POINTER_RADIUS: f64 = 5.0;
const BAR_OPACITY: f64 = 0.9;

/// Presentation knobs for [`frame_to_svg`].
#[derive(Clone, Debug, PartialEq)]
pub struct SvgStyle {
    /// Canvas fill; `None` leaves the background transparent.
    pub background: Option<Rgba8>,
    /// CSS font-family list used for every label.
    pub font_family: String,
    /// Bar name label color.
    pub label_color: Rgba8,
    /// Value label color (drawn inside the bar end).
    pub value_color: Rgba8,
    /// Current key and total counters.
    pub counter_color: Rgba8,
    /// Timeline axis and ticks.
    pub axis_color: Rgba8,
    /// Timeline tick labels and pointer.
    pub tick_color: Rgba8,
}

impl Default for SvgStyle {
    fn default() -> Self {
        Self {
            background: Some(Rgba8::rgb(0xff, 0xff, 0xff)),
            font_family: "Arial, Helvetica, sans-serif".to_owned(),
            label_color: Rgba8::rgb(0, 0, 0),
            value_color: Rgba8::rgb(0xff, 0xff, 0xff),
            counter_color: Rgba8::rgb(0xcc, 0xcc, 0xcc),
            axis_color: Rgba8::rgb(0xcc, 0xcc, 0xcc),
            tick_color: Rgba8::rgb(0x9b, 0x9b, 0x9b),
        }
    }
}

/// Serialize a frame as a standalone SVG document sized to the frame's canvas.
pub fn frame_to_svg(frame: &Frame, style: &SvgStyle) -> String {
    let (w, h) = (frame.canvas.width, frame.canvas.height);
    let mut out = String::with_capacity(1024 + frame.bars.len() * 384);
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{}">"#,
        escape(&style.font_family)
    );
    if let Some(bg) = style.background {
        let _ = writeln!(
            out,
            r#"<rect x="0" y="0" width="{w}" height="{h}" {}/>"#,
            fill(bg, 1.0)
        );
    }

    write_counters(&mut out, frame, style);
    for bar in &frame.bars {
        write_bar(&mut out, bar, style);
    }
    write_timeline(&mut out, frame, style);

    out.push_str("</svg>\n");
    out
}

fn write_bar(out: &mut String, bar: &BarView, style: &SvgStyle) {
    let r = bar.rect;
    let body = Rect::new(r.x0, r.y0 + BAR_INSET, r.x1.max(r.x0), r.y1);
    let _ = writeln!(
        out,
        r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" {}/>"#,
        body.x0,
        body.y0,
        body.width(),
        body.height().max(0.0),
        fill(bar.color, BAR_OPACITY)
    );

    let label_y = r.y0 + (r.height() + BAR_INSET) / 2.0;
    write_text(
        out,
        r.x0 - LABEL_GAP,
        label_y,
        LABEL_FONT_PX,
        false,
        "end",
        true,
        style.label_color,
        &bar.label,
    );

    let value = format_number(bar.value);
    let value_x = (r.x1 - LABEL_GAP).max(r.x0 + LABEL_GAP + text_width(&value, LABEL_FONT_PX));
    write_text(
        out,
        value_x,
        label_y,
        LABEL_FONT_PX,
        false,
        "end",
        true,
        style.value_color,
        &value,
    );
}

fn write_counters(out: &mut String, frame: &Frame, style: &SvgStyle) {
    let Some(key) = &frame.current_key else {
        return;
    };
    let x = frame.plot.x1;
    let y = frame.plot.y1;
    write_text(
        out,
        x,
        y - KEY_LIFT,
        KEY_FONT_PX,
        true,
        "end",
        false,
        style.counter_color,
        key.as_str(),
    );
    write_text(
        out,
        x,
        y,
        TOTAL_FONT_PX,
        false,
        "end",
        false,
        style.counter_color,
        &format!("Total: {}", format_number(frame.total)),
    );
}

fn write_timeline(out: &mut String, frame: &Frame, style: &SvgStyle) {
    let y = frame.plot.y1 + AXIS_DROP;
    let (x0, x1) = (frame.plot.x0, frame.plot.x1);
    let stroke = format!(r#"stroke="{}" stroke-width="1""#, style.axis_color.to_hex_rgb());
    let _ = writeln!(
        out,
        r#"<line x1="{x0:.2}" y1="{y:.2}" x2="{x1:.2}" y2="{y:.2}" {stroke}/>"#
    );

    let keys = &frame.timeline.keys;
    let last = keys.len().saturating_sub(1).max(1) as f64;
    for (i, key) in keys.iter().enumerate() {
        let x = x0 + (x1 - x0) * (i as f64 / last);
        let _ = writeln!(
            out,
            r#"<line x1="{x:.2}" y1="{:.2}" x2="{x:.2}" y2="{:.2}" {stroke}/>"#,
            y - TICK_HALF,
            y + TICK_HALF
        );
        write_text(
            out,
            x,
            y + TICK_LABEL_DROP,
            TICK_FONT_PX,
            false,
            "middle",
            false,
            style.tick_color,
            key.as_str(),
        );
    }

    let px = x0 + (x1 - x0) * frame.timeline.pointer.clamp(0.0, 1.0);
    let _ = writeln!(
        out,
        r#"<circle cx="{px:.2}" cy="{y:.2}" r="{POINTER_RADIUS}" {}/>"#,
        fill(style.tick_color, 1.0)
    );
}

#[allow(clippy::too_many_arguments)]
fn write_text(
    out: &mut String,
    x: f64,
    y: f64,
    size: f64,
    bold: bool,
    anchor: &str,
    middle: bool,
    color: Rgba8,
    text: &str,
) {
    let weight = if bold { r#" font-weight="bold""# } else { "" };
    let baseline = if middle {
        r#" dominant-baseline="central""#
    } else {
        ""
    };
    let _ = writeln!(
        out,
        r#"<text x="{x:.2}" y="{y:.2}" font-size="{size}"{weight} text-anchor="{anchor}"{baseline} {}>{}</text>"#,
        fill(color, 1.0),
        escape(text)
    );
}

fn fill(color: Rgba8, opacity: f64) -> String {
    format!(
        r#"fill="{}" fill-opacity="{:.3}""#,
        color.to_hex_rgb(),
        color.opacity() * opacity
    )
}

/// Rough advance width of `text`; only used to keep value labels inside short bars.
fn text_width(text: &str, size: f64) -> f64 {
    text.chars().count() as f64 * size * 0.55
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/svg.rs"]
mod tests;
