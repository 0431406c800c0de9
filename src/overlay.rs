//! Frame annotation.
//!
//! Draws detection boxes, their labels, and the FPS readout onto a copy of
//! the captured frame; the original is never mutated. Boxes are hollow
//! rectangles colored per class; text uses a small built-in 5x7 bitmap font
//! so no font assets ship with the binary.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::detect::Detection;
use crate::frame::Frame;

/// Fixed screen position of the FPS readout.
const FPS_ORIGIN: (i32, i32) = (10, 10);
const FPS_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const FPS_BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);
const BOX_THICKNESS: i32 = 2;

const GLYPH_WIDTH: i32 = 6;
const GLYPH_HEIGHT: i32 = 7;

/// Render detections and the FPS readout onto a copy of `frame`.
pub fn annotate(frame: &Frame, detections: &[Detection], fps: f64) -> Frame {
    let mut image = frame.to_rgb_image();

    for detection in detections {
        let color = class_color(detection.class_id);
        let (x, y, w, h) = detection.to_pixel_rect(frame.width(), frame.height());
        draw_box(&mut image, x, y, w, h, color);

        let label = format!("{} {:.2}", detection.label(), detection.confidence);
        // Label sits just above the box, or inside it at the frame edge.
        let label_y = if y >= GLYPH_HEIGHT + 3 {
            y - GLYPH_HEIGHT - 3
        } else {
            y + 2
        };
        draw_text(&mut image, &label, x, label_y, color, None);
    }

    let readout = format!("FPS: {:.2}", fps);
    draw_text(
        &mut image,
        &readout,
        FPS_ORIGIN.0,
        FPS_ORIGIN.1,
        FPS_COLOR,
        Some(FPS_BACKGROUND),
    );

    Frame::from_rgb_image(image)
}

/// Hollow rectangle with a thick border, clipped to the image.
fn draw_box(image: &mut RgbImage, x: i32, y: i32, w: u32, h: u32, color: Rgb<u8>) {
    for offset in 0..BOX_THICKNESS {
        let rect = Rect::at(x - offset, y - offset)
            .of_size(w + (offset as u32 * 2), h + (offset as u32 * 2));
        draw_hollow_rect_mut(image, rect, color);
    }
}

/// Deterministic per-class color, kept saturated so boxes read against
/// typical camera scenes.
fn class_color(class_id: usize) -> Rgb<u8> {
    let mut hash = (class_id as u32).wrapping_add(1).wrapping_mul(2654435761);
    let r = (hash >> 16) as u8;
    hash = hash.wrapping_mul(2654435761);
    let g = (hash >> 16) as u8;
    hash = hash.wrapping_mul(2654435761);
    let b = (hash >> 16) as u8;

    // Lift the dominant channel so the color never muddies to gray.
    let mut channels = [r, g, b];
    if let Some(max) = channels.iter_mut().max() {
        *max = (*max).max(192);
    }
    Rgb(channels)
}

/// Draw `text` with the built-in font, optionally on a filled background.
fn draw_text(
    image: &mut RgbImage,
    text: &str,
    x: i32,
    y: i32,
    color: Rgb<u8>,
    background: Option<Rgb<u8>>,
) {
    if let Some(bg) = background {
        let width = text.chars().count() as i32 * GLYPH_WIDTH + 2;
        for dy in -1..=GLYPH_HEIGHT {
            for dx in -1..width {
                put_pixel_clipped(image, x + dx, y + dy, bg);
            }
        }
    }

    for (index, ch) in text.chars().enumerate() {
        let origin_x = x + index as i32 * GLYPH_WIDTH;
        for (row, bits) in glyph(ch).iter().enumerate() {
            for col in 0..5i32 {
                if (bits >> (4 - col)) & 1 == 1 {
                    put_pixel_clipped(image, origin_x + col, y + row as i32, color);
                }
            }
        }
    }
}

fn put_pixel_clipped(image: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < image.width() && (y as u32) < image.height() {
        image.put_pixel(x as u32, y as u32, color);
    }
}

/// 5x7 glyphs, one bit-packed row per byte, MSB-first across 5 columns.
fn glyph(ch: char) -> [u8; 7] {
    match ch.to_ascii_uppercase() {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b11011, 0b10001],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00110, 0b01000, 0b10000, 0b11111],
        '3' => [0b11110, 0b00001, 0b00001, 0b01110, 0b00001, 0b00001, 0b11110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        ' ' => [0b00000; 7],
        _ => [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111],
    }
}
