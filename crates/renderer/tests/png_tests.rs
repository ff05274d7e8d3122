//! Tests for the PNG encoder.
//!
//! Output is checked structurally: chunk layout, CRCs, colour type and the
//! decompressed scanlines.

use std::io::Read;

use renderer::png::{encode_png, encode_png_indexed, encode_png_rgba};

// ============================================================================
// Helper functions
// ============================================================================

struct Chunk {
    kind: [u8; 4],
    data: Vec<u8>,
}

/// Split a PNG into chunks, asserting the signature and every CRC.
fn chunks(png: &[u8]) -> Vec<Chunk> {
    assert_eq!(&png[..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    let mut out = Vec::new();
    let mut pos = 8;
    while pos < png.len() {
        let len = u32::from_be_bytes(png[pos..pos + 4].try_into().unwrap()) as usize;
        let kind: [u8; 4] = png[pos + 4..pos + 8].try_into().unwrap();
        let data = png[pos + 8..pos + 8 + len].to_vec();
        let crc = u32::from_be_bytes(png[pos + 8 + len..pos + 12 + len].try_into().unwrap());

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&kind);
        hasher.update(&data);
        assert_eq!(hasher.finalize(), crc, "bad CRC in {:?}", std::str::from_utf8(&kind));

        out.push(Chunk { kind, data });
        pos += 12 + len;
    }
    out
}

fn find<'a>(chunks: &'a [Chunk], kind: &[u8; 4]) -> Option<&'a Chunk> {
    chunks.iter().find(|c| &c.kind == kind)
}

fn inflate(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    flate2::read::ZlibDecoder::new(data).read_to_end(&mut out).unwrap();
    out
}

/// Reconstruct RGBA pixels from an indexed PNG.
fn decode_indexed(png: &[u8]) -> Vec<u8> {
    let chunks = chunks(png);
    let ihdr = &find(&chunks, b"IHDR").unwrap().data;
    let width = u32::from_be_bytes(ihdr[0..4].try_into().unwrap()) as usize;
    assert_eq!(ihdr[9], 3);

    let plte = &find(&chunks, b"PLTE").unwrap().data;
    let trns = find(&chunks, b"tRNS").map(|c| c.data.clone()).unwrap_or_default();
    let raw = inflate(&find(&chunks, b"IDAT").unwrap().data);

    let mut rgba = Vec::new();
    for row in raw.chunks_exact(width + 1) {
        assert_eq!(row[0], 0, "filter byte");
        for &i in &row[1..] {
            let i = i as usize;
            rgba.extend_from_slice(&plte[i * 3..i * 3 + 3]);
            rgba.push(trns.get(i).copied().unwrap_or(255));
        }
    }
    rgba
}

fn overlay_like_tile(size: usize) -> Vec<u8> {
    let colors: [[u8; 4]; 5] = [
        [0, 0, 0, 0],
        [255, 0, 255, 140],
        [255, 0, 0, 140],
        [85, 153, 255, 140],
        [0, 255, 0, 140],
    ];
    let mut pixels = Vec::with_capacity(size * size * 4);
    for y in 0..size {
        for x in 0..size {
            pixels.extend_from_slice(&colors[(x / 32 + y / 32) % 5]);
        }
    }
    pixels
}

// ============================================================================
// Format selection
// ============================================================================

#[test]
fn test_overlay_tile_encodes_indexed_and_decodes_exactly() {
    let pixels = overlay_like_tile(256);
    let png = encode_png(&pixels, 256, 256).unwrap();

    let parsed = chunks(&png);
    assert_eq!(find(&parsed, b"PLTE").unwrap().data.len(), 5 * 3);
    assert_eq!(find(&parsed, b"tRNS").unwrap().data.len(), 5);
    assert_eq!(decode_indexed(&png), pixels);
}

#[test]
fn test_small_image_uses_sequential_palette() {
    let pixels = [
        255, 0, 0, 140, //
        0, 0, 0, 0, //
        0, 0, 0, 0, //
        255, 0, 0, 140,
    ];
    let png = encode_png(&pixels, 2, 2).unwrap();
    assert_eq!(decode_indexed(&png), pixels.to_vec());
}

#[test]
fn test_many_colors_fall_back_to_rgba() {
    let pixels: Vec<u8> = (0..300u32)
        .flat_map(|i| [(i % 256) as u8, (i / 256) as u8, 7, 255])
        .collect();
    let png = encode_png(&pixels, 300, 1).unwrap();
    let parsed = chunks(&png);
    assert_eq!(find(&parsed, b"IHDR").unwrap().data[9], 6);
    assert!(find(&parsed, b"PLTE").is_none());

    let raw = inflate(&find(&parsed, b"IDAT").unwrap().data);
    assert_eq!(raw[0], 0);
    assert_eq!(&raw[1..], &pixels[..]);
}

#[test]
fn test_indexed_smaller_than_rgba_for_overlay() {
    let pixels = overlay_like_tile(256);
    let indexed = encode_png(&pixels, 256, 256).unwrap();
    let rgba = encode_png_rgba(&pixels, 256, 256).unwrap();
    assert!(
        indexed.len() < rgba.len(),
        "indexed {} bytes, rgba {} bytes",
        indexed.len(),
        rgba.len()
    );
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_encoding_is_byte_identical() {
    let pixels = overlay_like_tile(256);
    let a = encode_png(&pixels, 256, 256).unwrap();
    let b = encode_png(&pixels, 256, 256).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_explicit_indexed_chunk_order() {
    let png = encode_png_indexed(2, 2, &[(0, 0, 0, 0), (0, 255, 0, 140)], &[0, 1, 1, 0]).unwrap();
    let kinds: Vec<[u8; 4]> = chunks(&png).iter().map(|c| c.kind).collect();
    assert_eq!(kinds, vec![*b"IHDR", *b"PLTE", *b"tRNS", *b"IDAT", *b"IEND"]);
}
