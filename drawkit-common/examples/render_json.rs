// Copyright 2024 the Drawkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render a JSON command list to a PNG.
//!
//! Usage: `render_json [commands.json] [out.png]`. Without arguments a small
//! built-in drawing is rendered.

use drawkit_common::{Canvas, CanvasConfig, Color};

const SAMPLE: &str = r##"[
    {"type": "colorFill", "color": "#fafafa"},
    {"type": "shadow", "x": 24, "y": 24, "width": 160, "height": 90, "color": "#66000000",
     "blurRadius": 8, "offsetX": 4, "offsetY": 4},
    {"type": "rect", "x": 20, "y": 20, "width": 160, "height": 90, "cornerRadius": 12,
     "fill": {"kind": "linear", "colors": ["#3498db", "#9b59b6"], "start": [20, 20], "end": [180, 110]},
     "stroke": {"color": "#2c3e50", "width": 2}},
    {"type": "circle", "cx": 280, "cy": 70, "radius": 50,
     "fill": {"kind": "sweep", "center": [280, 70], "colors": ["#e74c3c", "#f1c40f", "#2ecc71", "#e74c3c"]}},
    {"type": "arc", "cx": 100, "cy": 210, "width": 120, "height": 100,
     "startAngle": 200, "sweepAngle": 140, "useCenter": true, "fill": "#e67e22", "opacity": 0.8},
    {"type": "path", "data": "M 220 170 C 260 130 300 250 360 190", "stroke": {"color": "#16a085", "width": 4, "cap": "round"}},
    {"type": "points", "mode": "polygon", "points": [[200, 260], [240, 230], [280, 270], [320, 240]],
     "stroke": {"color": "#34495e", "width": 3, "join": "round"}}
]"##;

fn main() {
    env_logger::init();
    let mut args = std::env::args().skip(1);
    let json = match args.next() {
        Some(path) => std::fs::read_to_string(path).expect("failed to read command list"),
        None => SAMPLE.to_owned(),
    };
    let out = args.next().unwrap_or_else(|| "drawkit-sample.png".into());

    let mut canvas = Canvas::new(CanvasConfig {
        width: 400.0,
        height: 300.0,
        background_color: Some(Color::WHITE),
        scale: 2.0,
        ..Default::default()
    })
    .expect("failed to create canvas");
    canvas.render_json(&json).expect("command list is not a JSON array");
    let report = canvas.paint().expect("paint failed");
    println!("drew {} commands, skipped {}", report.drawn, report.skipped);

    let png = canvas.capture_snapshot().expect("encoding failed");
    std::fs::write(&out, png).expect("file save error");
    println!("wrote {out}");
}
