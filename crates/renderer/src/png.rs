//! PNG encoding for overlay tiles.
//!
//! Two colour types are written:
//! - **Indexed (colour type 3)** with a `tRNS` chunk, used whenever the
//!   image has at most 256 distinct RGBA values. Overlay tiles use five.
//! - **RGBA (colour type 6)** as the fallback for anything richer.
//!
//! `encode_png` picks between them. Output is deterministic: the same
//! pixels always encode to the same bytes.

use std::collections::HashMap;
use std::io::Write;

use rayon::prelude::*;
use thiserror::Error;

/// Largest palette an 8-bit indexed PNG can carry.
const MAX_PALETTE_SIZE: usize = 256;

/// Below this many pixels palette extraction stays on the calling thread.
const PARALLEL_THRESHOLD: usize = 4096;

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

const COLOR_TYPE_INDEXED: u8 = 3;
const COLOR_TYPE_RGBA: u8 = 6;

/// An RGBA palette entry.
pub type Rgba = (u8, u8, u8, u8);

#[derive(Debug, Error)]
pub enum PngError {
    #[error("pixel buffer holds {actual} bytes, expected {expected} for {width}x{height}")]
    BufferSize {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("palette has {0} entries, at most 256 allowed")]
    PaletteTooLarge(usize),

    #[error("index {index} out of range for a {palette}-entry palette")]
    IndexOutOfRange { index: u8, palette: usize },

    #[error("deflate failed: {0}")]
    Deflate(#[from] std::io::Error),
}

/// Encode RGBA pixels, choosing indexed output when the colours fit.
pub fn encode_png(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, PngError> {
    check_len(pixels.len(), width, height, 4)?;

    let extracted = if width * height >= PARALLEL_THRESHOLD {
        extract_palette_parallel(pixels)
    } else {
        extract_palette_sequential(pixels)
    };

    match extracted {
        Some((palette, indices)) => encode_png_indexed(width, height, &palette, &indices),
        None => encode_png_rgba(pixels, width, height),
    }
}

#[inline(always)]
fn pack(px: &[u8]) -> u32 {
    u32::from_le_bytes([px[0], px[1], px[2], px[3]])
}

#[inline(always)]
fn unpack(packed: u32) -> Rgba {
    let [r, g, b, a] = packed.to_le_bytes();
    (r, g, b, a)
}

/// Palette in first-seen order plus one index per pixel.
fn extract_palette_sequential(pixels: &[u8]) -> Option<(Vec<Rgba>, Vec<u8>)> {
    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Vec<Rgba> = Vec::new();
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for px in pixels.chunks_exact(4) {
        let packed = pack(px);
        let index = match lookup.get(&packed) {
            Some(&i) => i,
            None => {
                if palette.len() == MAX_PALETTE_SIZE {
                    return None;
                }
                let i = palette.len() as u8;
                palette.push(unpack(packed));
                lookup.insert(packed, i);
                i
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

/// Parallel extraction for full tiles.
///
/// Per-chunk colour sets are merged and sorted so the palette order does
/// not depend on hashing or scheduling.
fn extract_palette_parallel(pixels: &[u8]) -> Option<(Vec<Rgba>, Vec<u8>)> {
    let chunk_pixels = (pixels.len() / 4 / rayon::current_num_threads()).max(256);

    let mut colors: Vec<u32> = pixels
        .par_chunks(chunk_pixels * 4)
        .flat_map_iter(|chunk| {
            let mut local: Vec<u32> = Vec::new();
            for px in chunk.chunks_exact(4) {
                let packed = pack(px);
                if !local.contains(&packed) {
                    local.push(packed);
                    if local.len() > MAX_PALETTE_SIZE {
                        break;
                    }
                }
            }
            local
        })
        .collect();
    colors.sort_unstable();
    colors.dedup();
    if colors.len() > MAX_PALETTE_SIZE {
        return None;
    }

    let lookup: HashMap<u32, u8> = colors
        .iter()
        .enumerate()
        .map(|(i, &c)| (c, i as u8))
        .collect();
    let indices: Vec<u8> = pixels
        .par_chunks_exact(4)
        .map(|px| lookup.get(&pack(px)).copied().unwrap_or(0))
        .collect();

    Some((colors.into_iter().map(unpack).collect(), indices))
}

/// Encode an indexed image (colour type 3).
///
/// A `tRNS` chunk is written only when some entry is not fully opaque.
pub fn encode_png_indexed(
    width: usize,
    height: usize,
    palette: &[Rgba],
    indices: &[u8],
) -> Result<Vec<u8>, PngError> {
    if palette.len() > MAX_PALETTE_SIZE {
        return Err(PngError::PaletteTooLarge(palette.len()));
    }
    check_len(indices.len(), width, height, 1)?;
    if let Some(&index) = indices.iter().find(|&&i| i as usize >= palette.len()) {
        return Err(PngError::IndexOutOfRange {
            index,
            palette: palette.len(),
        });
    }

    let mut png = start_png(width, height, COLOR_TYPE_INDEXED);

    let plte: Vec<u8> = palette.iter().flat_map(|&(r, g, b, _)| [r, g, b]).collect();
    write_chunk(&mut png, b"PLTE", &plte);

    if palette.iter().any(|&(_, _, _, a)| a < 255) {
        let trns: Vec<u8> = palette.iter().map(|&(_, _, _, a)| a).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    let idat = deflate_scanlines(indices, width, height, 1)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Encode a full RGBA image (colour type 6).
pub fn encode_png_rgba(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, PngError> {
    check_len(pixels.len(), width, height, 4)?;

    let mut png = start_png(width, height, COLOR_TYPE_RGBA);
    let idat = deflate_scanlines(pixels, width, height, 4)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

fn check_len(actual: usize, width: usize, height: usize, bytes_per_pixel: usize) -> Result<(), PngError> {
    let expected = width * height * bytes_per_pixel;
    if actual != expected {
        return Err(PngError::BufferSize {
            width,
            height,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Signature plus IHDR for an 8-bit image.
fn start_png(width: usize, height: usize, color_type: u8) -> Vec<u8> {
    let mut png = Vec::with_capacity(1024);
    png.extend_from_slice(&PNG_SIGNATURE);

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr.extend_from_slice(&(height as u32).to_be_bytes());
    // bit depth, colour type, compression, filter, interlace
    ihdr.extend_from_slice(&[8, color_type, 0, 0, 0]);
    write_chunk(&mut png, b"IHDR", &ihdr);
    png
}

/// Zlib-compress rows, each prefixed with filter type 0.
fn deflate_scanlines(
    data: &[u8],
    width: usize,
    height: usize,
    bytes_per_pixel: usize,
) -> Result<Vec<u8>, PngError> {
    let stride = width * bytes_per_pixel;
    let mut raw = Vec::with_capacity(height * (stride + 1));
    for row in data.chunks_exact(stride.max(1)).take(height) {
        raw.push(0);
        raw.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder.write_all(&raw)?;
    Ok(encoder.finish()?)
}

fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_palette_first_seen_order() {
        let pixels = [
            255, 0, 0, 255, //
            0, 255, 0, 255, //
            255, 0, 0, 255, //
            0, 0, 0, 0,
        ];
        let (palette, indices) = extract_palette_sequential(&pixels).unwrap();
        assert_eq!(palette, vec![(255, 0, 0, 255), (0, 255, 0, 255), (0, 0, 0, 0)]);
        assert_eq!(indices, vec![0, 1, 0, 2]);
    }

    #[test]
    fn test_parallel_palette_sorted_and_consistent() {
        let mut pixels = Vec::with_capacity(128 * 128 * 4);
        for i in 0..128 * 128 {
            let c = (i % 5) as u8;
            pixels.extend_from_slice(&[c * 40, 0, 255 - c, 140]);
        }
        let (palette, indices) = extract_palette_parallel(&pixels).unwrap();
        assert_eq!(palette.len(), 5);
        for (px, &i) in pixels.chunks_exact(4).zip(&indices) {
            let (r, g, b, a) = palette[i as usize];
            assert_eq!(px, &[r, g, b, a]);
        }

        let again = extract_palette_parallel(&pixels).unwrap();
        assert_eq!(again.0, palette);
    }

    #[test]
    fn test_too_many_colors() {
        let pixels: Vec<u8> = (0..300u32).flat_map(|i| [(i % 256) as u8, (i / 256) as u8, 0, 255]).collect();
        assert!(extract_palette_sequential(&pixels).is_none());
    }

    #[test]
    fn test_indexed_header_and_trns() {
        let png = encode_png_indexed(2, 1, &[(0, 0, 0, 0), (255, 0, 0, 140)], &[0, 1]).unwrap();
        assert_eq!(&png[..8], &PNG_SIGNATURE);
        // IHDR data starts after length + type.
        assert_eq!(png[16 + 9], COLOR_TYPE_INDEXED);
        assert!(png.windows(4).any(|w| w == b"tRNS"));
    }

    #[test]
    fn test_opaque_palette_has_no_trns() {
        let png = encode_png_indexed(1, 1, &[(1, 2, 3, 255)], &[0]).unwrap();
        assert!(!png.windows(4).any(|w| w == b"tRNS"));
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let err = encode_png(&[0, 0, 0], 1, 1).unwrap_err();
        assert!(matches!(err, PngError::BufferSize { expected: 4, actual: 3, .. }));

        let err = encode_png_indexed(1, 1, &[(0, 0, 0, 0)], &[3]).unwrap_err();
        assert!(matches!(err, PngError::IndexOutOfRange { index: 3, .. }));
    }
}
