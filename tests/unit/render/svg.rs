use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::engine::frame::TimelineView;
use crate::foundation::core::{Canvas, FrameIndex};
use crate::scene::series::TimelineKey;

fn frame(current: Option<&str>, pointer: f64) -> Frame {
    Frame {
        index: FrameIndex(0),
        time: Duration::ZERO,
        canvas: Canvas::default(),
        plot: Rect::new(100.0, 30.0, 770.0, 340.0),
        bars: vec![
            BarView {
                label: "Fish & <Chips>".to_owned(),
                color: Rgba8::rgb(0x4e, 0x79, 0xa7),
                rect: Rect::new(100.0, 30.0, 770.0, 185.0),
                value: 12345.0,
                slot: 0,
            },
            BarView {
                label: "B".to_owned(),
                color: Rgba8::rgb(0xf2, 0x8e, 0x2b),
                rect: Rect::new(100.0, 185.0, 104.0, 340.0),
                value: 7.0,
                slot: 1,
            },
        ],
        current_key: current.map(TimelineKey::from),
        total: 12352.0,
        timeline: TimelineView {
            keys: Arc::from(vec![TimelineKey::from("2020"), TimelineKey::from("2021")]),
            current: current.map(|_| 0),
            pointer,
        },
    }
}

#[test]
fn document_contains_bars_labels_and_axis() {
    let svg = frame_to_svg(&frame(Some("2020"), 0.5), &SvgStyle::default());
    assert!(svg.starts_with("<svg "));
    assert!(svg.trim_end().ends_with("</svg>"));
    assert!(svg.contains(r#"width="800" height="400""#));
    assert!(svg.contains("Fish &amp; &lt;Chips&gt;"));
    assert!(svg.contains(">12,345</text>"));
    assert!(svg.contains(">Total: 12,352</text>"));
    assert!(svg.contains(">2020</text>"));
    assert!(svg.contains(">2021</text>"));
    // Pointer halfway along the axis at plot.y1 + 25.
    assert!(svg.contains(r#"<circle cx="435.00" cy="365.00""#));
}

#[test]
fn counters_are_hidden_before_first_key() {
    let svg = frame_to_svg(&frame(None, 0.0), &SvgStyle::default());
    assert!(!svg.contains("Total:"));
    assert!(svg.contains(r#"<circle cx="100.00""#));
}

#[test]
fn value_label_stays_inside_short_bars() {
    let svg = frame_to_svg(&frame(None, 0.0), &SvgStyle::default());
    // Bar B ends at x=104; its one-digit label is pushed right to x0 + 10 + width.
    let expected = format!(r#"<text x="{:.2}""#, 100.0 + 10.0 + 14.0 * 0.55);
    assert!(svg.contains(&expected), "{svg}");
}

#[test]
fn transparent_background_omits_fill_rect() {
    let style = SvgStyle {
        background: None,
        ..SvgStyle::default()
    };
    let svg = frame_to_svg(&frame(None, 0.0), &style);
    assert!(!svg.contains(r#"<rect x="0" y="0""#));
}
