//! Minimal well-formed sample files used across integration tests.
#![allow(dead_code)]

use imgcarve::formats::gif::{GIF89A, TRAILER};
use imgcarve::formats::jpeg::{JPEG_EOI, JPEG_SOI};
use imgcarve::formats::png::{chunk_crc, IDAT, IEND, IHDR, PNG_SIGNATURE};
use imgcarve::formats::tiff::TIFF_LITTLE;
use imgcarve::formats::webp::{RIFF_MAGIC, WEBP_FOURCC};

pub fn push_png_chunk(data: &mut Vec<u8>, chunk_type: [u8; 4], payload: &[u8]) {
    data.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    data.extend_from_slice(&chunk_type);
    data.extend_from_slice(payload);
    data.extend_from_slice(&chunk_crc(&chunk_type, payload).to_be_bytes());
}

/// A complete baseline JPEG: JFIF header, one frame, one scan, EOI. Scan
/// data avoids 0xFF so no spurious markers or signatures appear inside.
pub fn jpeg_sample() -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&JPEG_SOI);

    data.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
    data.extend_from_slice(b"JFIF\x00\x01\x01\x00\x00\x01\x00\x01\x00\x00");

    data.extend_from_slice(&[
        0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x00, 0x01, 0x00, 0x01, 0x01, 0x01, 0x11, 0x00,
    ]);

    data.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);
    data.extend_from_slice(&[0x65; 60]);

    data.extend_from_slice(&JPEG_EOI);
    data
}

pub fn png_sample() -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&PNG_SIGNATURE);
    push_png_chunk(
        &mut data,
        IHDR,
        &[0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x10, 0x08, 0x02, 0x00, 0x00, 0x00],
    );
    push_png_chunk(
        &mut data,
        IDAT,
        &[0x08, 0xD7, 0x63, 0x60, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01],
    );
    push_png_chunk(&mut data, IEND, &[]);
    data
}

pub fn gif_sample() -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(GIF89A);
    data.extend_from_slice(&[0x02, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00]);
    data.push(0x2C);
    data.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x02, 0x00, 0x00]);
    data.push(0x02);
    data.push(0x08);
    data.extend_from_slice(&[0x84, 0x51, 0x96, 0x1C, 0xC8, 0x31, 0x22, 0x05]);
    data.push(0x00);
    data.push(TRAILER);
    data
}

pub fn webp_sample() -> Vec<u8> {
    let payload: &[u8] = &[
        0x2F, 0x00, 0x00, 0x00, 0x00, 0x88, 0x88, 0x08, 0x88, 0x08, 0x88, 0x08,
    ];
    let riff_size = 4 + 8 + payload.len();

    let mut data = Vec::new();
    data.extend_from_slice(RIFF_MAGIC);
    data.extend_from_slice(&(riff_size as u32).to_le_bytes());
    data.extend_from_slice(WEBP_FOURCC);
    data.extend_from_slice(b"VP8L");
    data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    data.extend_from_slice(payload);
    data
}

pub fn tiff_sample() -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(TIFF_LITTLE);
    data.extend_from_slice(&8u32.to_le_bytes());
    data.extend_from_slice(&1u16.to_le_bytes());
    data.extend_from_slice(&256u16.to_le_bytes());
    data.extend_from_slice(&3u16.to_le_bytes());
    data.extend_from_slice(&1u32.to_le_bytes());
    data.extend_from_slice(&2u16.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes());
    data.extend_from_slice(&0u32.to_le_bytes());
    data
}
