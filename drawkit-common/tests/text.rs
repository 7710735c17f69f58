// Copyright 2024 the Drawkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text laid out and rasterized with a real font.

use drawkit_common::*;

const MONO: &[u8] = include_bytes!("assets/DejaVuSansMono.ttf");

fn canvas() -> Canvas {
    let _ = env_logger::builder().is_test(true).try_init();
    Canvas::new(CanvasConfig {
        width: 200.0,
        height: 60.0,
        background_color: Some(Color::WHITE),
        ..Default::default()
    })
    .unwrap()
}

/// Bounds `(x0, y0, x1, y1)` of every pixel that isn't white, inclusive.
fn ink_bounds(image: &ImageBuf) -> Option<(usize, usize, usize, usize)> {
    let mut bounds: Option<(usize, usize, usize, usize)> = None;
    for (i, px) in image.raw_pixels().chunks_exact(4).enumerate() {
        if px[..3].iter().all(|c| *c >= 250) {
            continue;
        }
        let (x, y) = (i % image.width(), i / image.width());
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    bounds
}

fn text_json(align: &str) -> String {
    format!(
        r##"[{{"type": "text", "x": 100, "y": 10, "text": "Hello", "fontSize": 16,
              "color": "#ff0000", "align": "{align}"}}]"##
    )
}

#[test]
fn centered_text_is_inked_around_its_anchor() {
    let mut canvas = canvas();
    canvas.load_font(MONO).unwrap();
    canvas.render_json(&text_json("center")).unwrap();
    assert_eq!(canvas.paint().unwrap(), PaintReport { drawn: 1, skipped: 0 });

    let image = canvas.pixels(ImageFormat::RgbaSeparate).unwrap();
    let (x0, y0, x1, y1) = ink_bounds(&image).expect("no ink");
    let middle = (x0 + x1) as f64 / 2.0;
    assert!((middle - 100.0).abs() <= 4.0, "ink spans x {x0}..{x1}");
    assert!((30..70).contains(&(x1 - x0)), "ink spans x {x0}..{x1}");
    assert!(y0 >= 10 && y1 < 10 + 24, "ink spans y {y0}..{y1}");

    // red over white: green and blue fall together, red stays full
    let mut solid = 0;
    for px in image.raw_pixels().chunks_exact(4) {
        assert!(px[0] >= 250 && px[1].abs_diff(px[2]) <= 2, "{px:?}");
        if px[1] < 128 {
            solid += 1;
        }
    }
    assert!(solid > 20, "only {solid} solid pixels");
}

#[test]
fn alignment_moves_the_ink() {
    let mut canvas = canvas();
    canvas.load_font(MONO).unwrap();

    let mut ink = |align: &str| {
        canvas.render_json(&text_json(align)).unwrap();
        let image = canvas.pixels(ImageFormat::RgbaSeparate).unwrap();
        ink_bounds(&image).expect("no ink")
    };
    let left = ink("left");
    let right = ink("right");
    assert!(left.0 >= 100 && left.0 <= 104, "{left:?}");
    assert!(right.2 <= 100 && right.2 >= 94, "{right:?}");
    assert!((left.2 - left.0).abs_diff(right.2 - right.0) <= 2);
}

#[test]
fn registering_a_font_repaints_skipped_text() {
    let mut canvas = canvas();
    canvas.render_json(&text_json("center")).unwrap();
    assert_eq!(canvas.paint().unwrap(), PaintReport { drawn: 0, skipped: 1 });

    let family = canvas
        .register_font("Mono", FontWeight::REGULAR, MONO)
        .unwrap();
    assert_eq!(family.name(), "Mono");
    assert_eq!(canvas.paint().unwrap(), PaintReport { drawn: 1, skipped: 0 });
    let image = canvas.pixels(ImageFormat::RgbaSeparate).unwrap();
    assert!(ink_bounds(&image).is_some());
}

#[test]
fn unreadable_font_data_is_rejected() {
    let mut canvas = canvas();
    assert!(matches!(
        canvas.load_font(b"not a font"),
        Err(Error::FontLoadingFailed(_))
    ));
    assert!(canvas.fonts().is_empty());
}
