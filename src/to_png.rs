#![cfg(feature = "host")]
//! PNG previews of sign frames, laid out as the pixels sit behind the letters.

use crate::geometry::{COLUMN_COUNT, PIXEL_POSITIONS, ROW_COUNT};
use crate::led_strip::{RGB8, SignFrame};
use png::{BitDepth, ColorType, Encoder, ScaledFloat};
use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

const PREVIEW_INVERSE_GAMMA: f32 = 2.2;

type Grid = [[RGB8; COLUMN_COUNT]; ROW_COUNT];

/// Render a sign frame into a PNG file no wider than `target_max_dimension`.
///
/// Each pixel is drawn as a soft disc at its column and row; grid cells with no pixel
/// stay black. Returns the image `(width, height)`.
///
/// # Errors
///
/// Returns any I/O or encoding error.
pub fn write_sign_png(
    frame: &SignFrame,
    output_path: impl AsRef<Path>,
    target_max_dimension: u32,
) -> Result<(u32, u32), Box<dyn Error>> {
    let output_path = output_path.as_ref();
    let cell_size = select_cell_size(target_max_dimension);
    let (width, height, pixels) = sign_pixels(&to_grid(frame), cell_size);
    create_parent(output_path)?;

    let file = File::create(output_path)?;
    let mut encoder = Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(ColorType::Rgb);
    encoder.set_depth(BitDepth::Sixteen);
    encoder.set_source_gamma(ScaledFloat::new(1.0));
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&pixels)?;
    Ok((width, height))
}

/// Render a sequence of sign frames into a looping APNG file.
///
/// # Errors
///
/// Returns any I/O or encoding error, or an error if `frames` is empty.
pub fn write_sign_apng(
    frames: &[SignFrame],
    output_path: impl AsRef<Path>,
    target_max_dimension: u32,
    frame_delay_ms: u16,
) -> Result<(u32, u32), Box<dyn Error>> {
    if frames.is_empty() {
        return Err("frames must not be empty".into());
    }
    let output_path = output_path.as_ref();
    let cell_size = select_cell_size(target_max_dimension);
    let rendered: Vec<(u32, u32, Vec<u8>)> = frames
        .iter()
        .map(|frame| sign_pixels(&to_grid(frame), cell_size))
        .collect();
    let (width, height, _) = rendered[0];
    create_parent(output_path)?;

    let file = File::create(output_path)?;
    let mut encoder = Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(ColorType::Rgb);
    encoder.set_depth(BitDepth::Sixteen);
    encoder.set_source_gamma(ScaledFloat::new(1.0));
    encoder.set_animated(u32::try_from(frames.len())?, 0)?;
    let mut writer = encoder.write_header()?;
    for (_, _, pixels) in rendered {
        writer.set_frame_delay(frame_delay_ms, 1000)?;
        writer.write_image_data(&pixels)?;
    }
    writer.finish()?;
    Ok((width, height))
}

/// Place each strip pixel in its cell; the top row of the image is the top of the sign.
fn to_grid(frame: &SignFrame) -> Grid {
    let mut grid = [[RGB8::default(); COLUMN_COUNT]; ROW_COUNT];
    for (color, &(column, row)) in frame.iter().zip(PIXEL_POSITIONS.iter()) {
        let image_row = ROW_COUNT - 1 - usize::from(row);
        grid[image_row][usize::from(column)] = color.to_rgb8();
    }
    grid
}

fn create_parent(output_path: &Path) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn select_cell_size(target_max_dimension: u32) -> u32 {
    let columns = COLUMN_COUNT as u32;
    let rows = ROW_COUNT as u32;
    let mut cell_size = target_max_dimension.max(8);
    while cell_size > 8 {
        let border = led_radius(cell_size);
        let max_dimension = (columns * cell_size + border * 2).max(rows * cell_size + border * 2);
        if max_dimension <= target_max_dimension {
            break;
        }
        cell_size -= 1;
    }
    cell_size
}

fn led_radius(cell_size: u32) -> u32 {
    let led_margin = (cell_size / 8).max(1);
    (cell_size - led_margin * 2) / 2
}

fn sign_pixels(grid: &Grid, cell_size: u32) -> (u32, u32, Vec<u8>) {
    let led_radius = led_radius(cell_size);
    let fade_width = (led_radius / 3).max(1);
    let border = led_radius;
    let width = (COLUMN_COUNT as u32) * cell_size + border * 2;
    let height = (ROW_COUNT as u32) * cell_size + border * 2;
    let mut bytes = vec![0u8; (width * height * 3 * 2) as usize];
    let center = (cell_size - 1) as i32 / 2;
    let led_radius_f = led_radius as f32;
    let inner_radius_f = (led_radius - fade_width) as f32;
    let radius_sq = (led_radius as i32) * (led_radius as i32);

    for (row_index, row) in grid.iter().enumerate() {
        for (column_index, pixel) in row.iter().enumerate() {
            if *pixel == RGB8::default() {
                continue;
            }
            let cell_origin_x = (column_index as u32) * cell_size;
            let cell_origin_y = (row_index as u32) * cell_size;

            for local_y in 0..cell_size {
                let delta_y = local_y as i32 - center;
                for local_x in 0..cell_size {
                    let delta_x = local_x as i32 - center;
                    let distance_sq = delta_x * delta_x + delta_y * delta_y;
                    if distance_sq > radius_sq {
                        continue;
                    }
                    let distance = (distance_sq as f32).sqrt();
                    let intensity = if distance <= inner_radius_f {
                        1.0
                    } else {
                        let fade_span = led_radius_f - inner_radius_f;
                        (1.0 - (distance - inner_radius_f) / fade_span).max(0.0)
                    };
                    let x = border + cell_origin_x + local_x;
                    let y = border + cell_origin_y + local_y;
                    let pixel_index = ((y * width + x) * 3 * 2) as usize;
                    for (channel_index, channel) in [pixel.r, pixel.g, pixel.b].into_iter().enumerate()
                    {
                        let value = linear_to_u16(inverse_gamma_to_linear(channel) * intensity);
                        let [high, low] = value.to_be_bytes();
                        bytes[pixel_index + channel_index * 2] = high;
                        bytes[pixel_index + channel_index * 2 + 1] = low;
                    }
                }
            }
        }
    }

    (width, height, bytes)
}

fn inverse_gamma_to_linear(channel: u8) -> f32 {
    let normalized = f32::from(channel) / 255.0;
    normalized.powf(PREVIEW_INVERSE_GAMMA)
}

fn linear_to_u16(value: f32) -> u16 {
    let clamped = value.clamp(0.0, 1.0);
    (clamped * 65535.0).round() as u16
}
