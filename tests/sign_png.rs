#![cfg(feature = "host")]
#![allow(missing_docs)]
//! Host-level tests for sign PNG previews.

use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use embassy_time::Instant;
use sign_glow::animation::{AnimationEngine, Mode};
use sign_glow::geometry::{self, Grouping};
use sign_glow::led_strip::{Hsv, SignFrame};
use sign_glow::to_png::{write_sign_apng, write_sign_png};

struct Header {
    width: u32,
    height: u32,
    color_type: png::ColorType,
    animation_control: Option<png::AnimationControl>,
}

fn read_header(path: &Path) -> Result<Header, Box<dyn Error>> {
    let decoder = png::Decoder::new(BufReader::new(File::open(path)?));
    let reader = decoder.read_info()?;
    let info = reader.info();
    Ok(Header {
        width: info.width,
        height: info.height,
        color_type: info.color_type,
        animation_control: info.animation_control,
    })
}

#[test]
fn still_preview_fits_the_target() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("previews").join("letters.png");
    let mut frame = SignFrame::new();
    frame.set_all(geometry::group(Grouping::Letter, 1), Hsv::new(160, 255, 0x40));

    let (width, height) = write_sign_png(&frame, &path, 200)?;
    assert!(width <= 200, "width {width}");
    assert!(width > height);

    let info = read_header(&path)?;
    assert_eq!((info.width, info.height), (width, height));
    assert_eq!(info.color_type, png::ColorType::Rgb);
    Ok(())
}

#[test]
fn tiny_target_keeps_the_minimum_cell() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("tiny.png");
    let (small_width, _) = write_sign_png(&SignFrame::new(), &path, 1)?;
    let (larger_width, _) = write_sign_png(&SignFrame::new(), &path, 400)?;
    assert!(small_width >= 17 * 8);
    assert!(larger_width > small_width);
    Ok(())
}

#[test]
fn animated_preview_has_every_frame() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("strip_chase.png");
    let mut engine = AnimationEngine::new(7);
    let mut frames = Vec::new();
    for step in 0..=12_u64 {
        if engine.render(Mode::StripChase, 0, Instant::from_millis(step * 1_000), |_| 0) {
            frames.push(*engine.frame());
        }
    }
    assert_eq!(frames.len(), 12);

    let (width, height) = write_sign_apng(&frames, &path, 200, 100)?;
    let info = read_header(&path)?;
    assert_eq!((info.width, info.height), (width, height));
    let animation = info.animation_control.ok_or("not animated")?;
    assert_eq!(animation.num_frames, 12);
    Ok(())
}

#[test]
fn animated_preview_rejects_no_frames() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("empty.png");
    assert!(write_sign_apng(&[], &path, 200, 100).is_err());
    assert!(!path.exists());
}
