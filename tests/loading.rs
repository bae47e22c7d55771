use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;

use gifblocks::loader::{DEFAULT_DELAY, MIN_DELAY};
use gifblocks::{load_frames, prepare_frames, Error, RenderOptions};
use image::codecs::gif::GifEncoder;
use image::codecs::webp::WebPEncoder;
use image::{Delay, ExtendedColorType, Rgba, RgbaImage};

fn write_gif(dir: &Path, frames: &[(Rgba<u8>, u32)]) -> PathBuf {
    let path = dir.join("anim.gif");
    let mut encoder = GifEncoder::new(File::create(&path).unwrap());
    let frames = frames.iter().map(|&(color, ms)| {
        image::Frame::from_parts(
            RgbaImage::from_pixel(6, 6, color),
            0,
            0,
            Delay::from_numer_denom_ms(ms, 1),
        )
    });
    encoder.encode_frames(frames).unwrap();
    path
}

fn write_apng(dir: &Path, frames: &[(Rgba<u8>, u16)]) -> PathBuf {
    let path = dir.join("anim.png");
    let mut encoder = png::Encoder::new(BufWriter::new(File::create(&path).unwrap()), 4, 4);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_animated(frames.len() as u32, 0).unwrap();
    // the first fcTL may go out with the header
    encoder.set_frame_delay(frames[0].1, 1000).unwrap();
    let mut writer = encoder.write_header().unwrap();
    for &(color, ms) in frames {
        writer.set_frame_delay(ms, 1000).unwrap();
        writer.write_image_data(RgbaImage::from_pixel(4, 4, color).as_raw()).unwrap();
    }
    writer.finish().unwrap();
    path
}

fn riff_chunk(out: &mut Vec<u8>, fourcc: &[u8; 4], payload: &[u8]) {
    out.extend_from_slice(fourcc);
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    if payload.len() % 2 == 1 {
        out.push(0);
    }
}

fn u24(v: u32) -> [u8; 3] {
    let [a, b, c, _] = v.to_le_bytes();
    [a, b, c]
}

/// Lossless still WebP from the image crate, reduced to its `VP8L` chunk.
fn vp8l_chunk(raster: &RgbaImage) -> Vec<u8> {
    let mut file = Vec::new();
    WebPEncoder::new_lossless(&mut file)
        .encode(raster.as_raw(), raster.width(), raster.height(), ExtendedColorType::Rgba8)
        .unwrap();

    let mut pos = 12;
    while pos + 8 <= file.len() {
        let size = u32::from_le_bytes(file[pos + 4..pos + 8].try_into().unwrap()) as usize;
        let end = pos + 8 + size + size % 2;
        if &file[pos..pos + 4] == b"VP8L" {
            return file[pos..end.min(file.len())].to_vec();
        }
        pos = end;
    }
    panic!("encoder produced no VP8L chunk");
}

/// Animated WebP container around lossless frames: VP8X, ANIM, one ANMF per frame.
fn write_animated_webp(dir: &Path, frames: &[(Rgba<u8>, u32)]) -> PathBuf {
    const SIZE: u32 = 4;
    let mut body = b"WEBP".to_vec();

    let mut vp8x = vec![0x10 | 0x02, 0, 0, 0];
    vp8x.extend_from_slice(&u24(SIZE - 1));
    vp8x.extend_from_slice(&u24(SIZE - 1));
    riff_chunk(&mut body, b"VP8X", &vp8x);
    riff_chunk(&mut body, b"ANIM", &[0, 0, 0, 0, 0, 0]);

    for &(color, ms) in frames {
        let mut anmf = Vec::new();
        anmf.extend_from_slice(&u24(0));
        anmf.extend_from_slice(&u24(0));
        anmf.extend_from_slice(&u24(SIZE - 1));
        anmf.extend_from_slice(&u24(SIZE - 1));
        anmf.extend_from_slice(&u24(ms));
        // no blending, no disposal
        anmf.push(0x02);
        anmf.extend_from_slice(&vp8l_chunk(&RgbaImage::from_pixel(SIZE, SIZE, color)));
        riff_chunk(&mut body, b"ANMF", &anmf);
    }

    let mut file = Vec::new();
    riff_chunk(&mut file, b"RIFF", &body);
    let path = dir.join("anim.webp");
    std::fs::write(&path, file).unwrap();
    path
}

fn rgb(frame: &gifblocks::Frame) -> (u8, u8, u8) {
    let [r, g, b, _] = frame.raster.get_pixel(1, 1).0;
    (r, g, b)
}

#[test]
fn still_image_is_one_frame_with_default_delay() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("still.png");
    RgbaImage::from_pixel(5, 3, Rgba([10, 20, 30, 255])).save(&path).unwrap();

    let frames = load_frames(&path).unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].delay, DEFAULT_DELAY);
    assert_eq!(frames[0].raster.dimensions(), (5, 3));
    assert_eq!(frames[0].raster.get_pixel(4, 2), &Rgba([10, 20, 30, 255]));
}

#[test]
fn animated_gif_delays_are_read_per_frame() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gif(
        dir.path(),
        &[
            (Rgba([255, 0, 0, 255]), 50),
            (Rgba([0, 255, 0, 255]), 200),
            (Rgba([0, 0, 255, 255]), 0),
        ],
    );

    let frames = load_frames(&path).unwrap();
    let delays: Vec<_> = frames.iter().map(|f| f.delay).collect();
    assert_eq!(delays, [Duration::from_millis(50), Duration::from_millis(200), MIN_DELAY]);

    let [r, g, b, _] = frames[1].raster.get_pixel(3, 3).0;
    assert_eq!((r, g, b), (0, 255, 0));
}

#[test]
fn prepared_frames_match_loaded_frames() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gif(dir.path(), &[(Rgba([255, 0, 0, 255]), 40), (Rgba([0, 0, 255, 255]), 80)]);

    let options = RenderOptions { width: 6, ..RenderOptions::default() };
    let rendered = prepare_frames(&path, &options).unwrap();
    assert_eq!(rendered.len(), 2);
    assert_eq!(rendered[0].delay, Duration::from_millis(40));
    assert_eq!(rendered[0].text.lines().count(), 3);
    assert!(rendered[0].text.starts_with("\x1b[38;2;255;0;0m"));
    assert!(rendered[1].text.starts_with("\x1b[38;2;0;0;255m"));
}

#[test]
fn missing_file_never_reaches_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let err = prepare_frames(dir.path().join("nope.gif"), &RenderOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
    assert!(err.to_string().contains("nope.gif"));
}

#[test]
fn apng_frames_and_delays_are_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_apng(
        dir.path(),
        &[
            (Rgba([255, 0, 0, 255]), 50),
            (Rgba([0, 255, 0, 255]), 200),
            (Rgba([0, 0, 255, 255]), 0),
        ],
    );

    let frames = load_frames(&path).unwrap();
    assert_eq!(frames.len(), 3);
    let delays: Vec<_> = frames.iter().map(|f| f.delay).collect();
    assert_eq!(delays, [Duration::from_millis(50), Duration::from_millis(200), MIN_DELAY]);
    assert_eq!(rgb(&frames[0]), (255, 0, 0));
    assert_eq!(rgb(&frames[2]), (0, 0, 255));
}

#[test]
fn animated_webp_frames_and_delays_are_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_animated_webp(dir.path(), &[(Rgba([255, 0, 0, 255]), 30), (Rgba([0, 255, 0, 255]), 120)]);

    let frames = load_frames(&path).unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].delay, Duration::from_millis(30));
    assert_eq!(frames[1].delay, Duration::from_millis(120));
    assert_eq!(rgb(&frames[0]), (255, 0, 0));
    assert_eq!(rgb(&frames[1]), (0, 255, 0));
}
