//! Still-image encoding for screenshots and annotation rasters.

use std::time::Instant;

use bytes::Bytes;

use clipstage_capture::{FrameTimestamp, VideoFrame};

use crate::{CodecError, CodecResult};

const FILE_HEADER_SIZE: u32 = 14;
const INFO_HEADER_SIZE: u32 = 40;

/// Encode a frame as a 24-bit uncompressed BMP.
pub fn encode_bmp(frame: &VideoFrame) -> CodecResult<Bytes> {
    if !frame.is_valid() {
        return Err(CodecError::InvalidInput("truncated frame buffer".into()));
    }

    let w = frame.width as usize;
    let h = frame.height as usize;
    let stride = ((w * 3) + 3) & !3;
    let image_size = (stride * h) as u32;
    let file_size = FILE_HEADER_SIZE + INFO_HEADER_SIZE + image_size;

    let mut out = Vec::with_capacity(file_size as usize);

    // BITMAPFILEHEADER
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&file_size.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // reserved
    out.extend_from_slice(&(FILE_HEADER_SIZE + INFO_HEADER_SIZE).to_le_bytes());

    // BITMAPINFOHEADER
    out.extend_from_slice(&INFO_HEADER_SIZE.to_le_bytes());
    out.extend_from_slice(&frame.width.to_le_bytes());
    out.extend_from_slice(&frame.height.to_le_bytes()); // positive: bottom-up
    out.extend_from_slice(&1u16.to_le_bytes()); // planes
    out.extend_from_slice(&24u16.to_le_bytes()); // bits per pixel
    out.extend_from_slice(&0u32.to_le_bytes()); // BI_RGB
    out.extend_from_slice(&image_size.to_le_bytes());
    out.extend_from_slice(&[0u8; 16]); // resolution and palette fields

    // Pixel rows, bottom-up, BGR, padded to 4 bytes.
    for y in (0..h).rev() {
        let row = &frame.data[y * w * 4..(y + 1) * w * 4];
        let mark = out.len();
        for x in 0..w {
            out.extend_from_slice(&row[x * 4..x * 4 + 3]);
        }
        out.resize(mark + stride, 0);
    }

    Ok(Bytes::from(out))
}

/// Decode a 24-bit uncompressed BMP back into a BGRA frame.
///
/// Only the layout `encode_bmp` produces is accepted: bottom-up rows,
/// 24 bpp, no compression.
pub fn decode_bmp(data: &[u8]) -> CodecResult<VideoFrame> {
    if data.len() < (FILE_HEADER_SIZE + INFO_HEADER_SIZE) as usize || &data[0..2] != b"BM" {
        return Err(CodecError::Malformed("not a BMP payload".into()));
    }
    let pixel_offset = u32::from_le_bytes([data[10], data[11], data[12], data[13]]) as usize;
    let width = i32::from_le_bytes([data[18], data[19], data[20], data[21]]);
    let height = i32::from_le_bytes([data[22], data[23], data[24], data[25]]);
    let bits = u16::from_le_bytes([data[28], data[29]]);
    let compression = u32::from_le_bytes([data[30], data[31], data[32], data[33]]);

    if width <= 0 || height <= 0 {
        return Err(CodecError::Malformed(format!(
            "unsupported BMP dimensions {width}x{height}"
        )));
    }
    if bits != 24 || compression != 0 {
        return Err(CodecError::Malformed(format!(
            "expected uncompressed 24-bit BMP, got {bits} bpp compression {compression}"
        )));
    }

    let w = width as usize;
    let h = height as usize;
    let stride = ((w * 3) + 3) & !3;
    let end = stride
        .checked_mul(h)
        .and_then(|size| pixel_offset.checked_add(size))
        .filter(|&end| end <= data.len())
        .ok_or_else(|| CodecError::Malformed("truncated BMP pixel data".into()))?;
    let rows = &data[pixel_offset..end];

    let mut bgra = vec![0u8; w * h * 4];
    for y in 0..h {
        let src = &rows[(h - 1 - y) * stride..];
        let dst = &mut bgra[y * w * 4..(y + 1) * w * 4];
        for x in 0..w {
            dst[x * 4..x * 4 + 3].copy_from_slice(&src[x * 3..x * 3 + 3]);
            dst[x * 4 + 3] = 255;
        }
    }

    Ok(VideoFrame::new(
        Bytes::from(bgra),
        width as u32,
        height as u32,
        FrameTimestamp::now(Instant::now()),
        0,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_size_are_consistent() {
        let frame = VideoFrame::new(
            Bytes::from(vec![200u8; 3 * 2 * 4]),
            3,
            2,
            FrameTimestamp::now(Instant::now()),
            0,
        );
        let bmp = encode_bmp(&frame).unwrap();

        assert_eq!(&bmp[0..2], b"BM");
        let declared = u32::from_le_bytes([bmp[2], bmp[3], bmp[4], bmp[5]]);
        assert_eq!(declared as usize, bmp.len());
        // 3px rows are 9 bytes, padded to 12.
        assert_eq!(bmp.len(), 14 + 40 + 12 * 2);
    }

    #[test]
    fn bottom_row_is_written_first() {
        // Top row red-ish, bottom row blue-ish, 1x2 frame.
        let data = vec![
            0, 0, 255, 255, // top pixel, BGRA
            255, 0, 0, 255, // bottom pixel
        ];
        let frame = VideoFrame::new(
            Bytes::from(data),
            1,
            2,
            FrameTimestamp::now(Instant::now()),
            0,
        );
        let bmp = encode_bmp(&frame).unwrap();
        let pixels = &bmp[54..];
        assert_eq!(&pixels[0..3], &[255, 0, 0]); // bottom first
        assert_eq!(&pixels[4..7], &[0, 0, 255]);
    }

    #[test]
    fn invalid_frame_is_rejected() {
        let frame = VideoFrame::new(
            Bytes::from(vec![0u8; 7]),
            2,
            2,
            FrameTimestamp::now(Instant::now()),
            0,
        );
        assert!(encode_bmp(&frame).is_err());
    }

    #[test]
    fn decode_recovers_encoded_pixels() {
        let data = vec![
            10, 20, 30, 255, //
            40, 50, 60, 255, //
            70, 80, 90, 255, //
            100, 110, 120, 255,
        ];
        let frame = VideoFrame::new(
            Bytes::from(data),
            2,
            2,
            FrameTimestamp::now(Instant::now()),
            0,
        );
        let decoded = decode_bmp(&encode_bmp(&frame).unwrap()).unwrap();

        assert_eq!((decoded.width, decoded.height), (2, 2));
        assert!(decoded.is_valid());
        assert_eq!(decoded.pixel(0, 0), [10, 20, 30, 255]);
        assert_eq!(decoded.pixel(1, 1), [100, 110, 120, 255]);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            decode_bmp(b"definitely not a bitmap"),
            Err(CodecError::Malformed(_))
        ));
    }

    #[test]
    fn decode_rejects_truncated_pixel_data() {
        let frame = VideoFrame::new(
            Bytes::from(vec![5u8; 4 * 4 * 4]),
            4,
            4,
            FrameTimestamp::now(Instant::now()),
            0,
        );
        let bmp = encode_bmp(&frame).unwrap();
        assert!(decode_bmp(&bmp[..bmp.len() - 8]).is_err());
    }
}
