//! AVI demuxer for payloads produced by [`crate::AviEncoder`].
//!
//! Parses the header lists for stream parameters, then walks the movi list
//! collecting video frames (converted back to top-down BGRA) and PCM16 audio
//! (converted back to interleaved f32). Any structural surprise is a
//! [`CodecError::Malformed`].

use bytes::Bytes;
use tracing::{debug, instrument};

use clipstage_capture::{FrameTimestamp, VideoFrame};

use crate::{CodecError, CodecResult};

/// Decoded AVI payload.
pub struct AviReader {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub sample_rate: u32,
    pub channels: u16,
    frames: Vec<Bytes>,
    audio: Vec<f32>,
}

impl AviReader {
    /// Parse a complete AVI payload.
    #[instrument(name = "avi_parse", skip_all, fields(bytes = data.len()))]
    pub fn parse(data: &[u8]) -> CodecResult<Self> {
        if data.len() < 12 || &data[0..4] != b"RIFF" || &data[8..12] != b"AVI " {
            return Err(CodecError::Malformed("not a RIFF AVI payload".into()));
        }

        let mut width = 0u32;
        let mut height = 0u32;
        let mut fps = 0u32;
        let mut sample_rate = 0u32;
        let mut channels = 0u16;
        let mut raw_frames: Vec<&[u8]> = Vec::new();
        let mut pcm = Vec::new();

        let mut cursor = 12;
        while cursor + 8 <= data.len() {
            let fourcc = &data[cursor..cursor + 4];
            let size = read_u32(data, cursor + 4)? as usize;
            let body_start = cursor + 8;
            let body_end = body_start
                .checked_add(size)
                .filter(|&end| end <= data.len())
                .ok_or_else(|| CodecError::Malformed("chunk overruns payload".into()))?;
            let body = &data[body_start..body_end];

            match fourcc {
                b"LIST" => {
                    if body.len() < 4 {
                        return Err(CodecError::Malformed("truncated LIST".into()));
                    }
                    match &body[0..4] {
                        b"hdrl" => parse_hdrl(
                            &body[4..],
                            &mut width,
                            &mut height,
                            &mut fps,
                            &mut sample_rate,
                            &mut channels,
                        )?,
                        b"movi" => parse_movi(&body[4..], &mut raw_frames, &mut pcm)?,
                        _ => {}
                    }
                }
                b"idx1" => {}
                _ => {}
            }

            // Chunks are word aligned.
            cursor = body_end + (size & 1);
        }

        if width == 0 || height == 0 || fps == 0 {
            return Err(CodecError::Malformed("missing video stream header".into()));
        }

        let stride = ((width as usize * 3) + 3) & !3;
        let expected = stride * height as usize;
        let mut frames = Vec::with_capacity(raw_frames.len());
        for dib in raw_frames {
            if dib.len() != expected {
                return Err(CodecError::Malformed(format!(
                    "frame chunk is {} bytes, expected {}",
                    dib.len(),
                    expected
                )));
            }
            frames.push(dib_to_bgra(dib, width, height, stride));
        }

        debug!(
            frames = frames.len(),
            samples = pcm.len(),
            width,
            height,
            fps,
            "AVI parsed"
        );

        Ok(Self {
            width,
            height,
            fps,
            sample_rate,
            channels,
            frames,
            audio: pcm,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Rebuild the frame at `index` with a timestamp derived from the frame
    /// rate.
    pub fn frame(&self, index: usize) -> Option<VideoFrame> {
        let data = self.frames.get(index)?.clone();
        let pts_100ns = index as u64 * 10_000_000 / self.fps as u64;
        Some(VideoFrame::new(
            data,
            self.width,
            self.height,
            FrameTimestamp {
                capture_time: std::time::Instant::now(),
                pts_100ns,
            },
            index as u64,
        ))
    }

    /// Interleaved f32 samples, in stream order.
    pub fn audio(&self) -> &[f32] {
        &self.audio
    }

    /// Duration implied by the video track.
    pub fn duration_secs(&self) -> f64 {
        self.frames.len() as f64 / self.fps as f64
    }
}

fn read_u32(data: &[u8], offset: usize) -> CodecResult<u32> {
    let bytes = data
        .get(offset..offset + 4)
        .ok_or_else(|| CodecError::Malformed("truncated field".into()))?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn read_u16(data: &[u8], offset: usize) -> CodecResult<u16> {
    let bytes = data
        .get(offset..offset + 2)
        .ok_or_else(|| CodecError::Malformed("truncated field".into()))?;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn parse_hdrl(
    body: &[u8],
    width: &mut u32,
    height: &mut u32,
    fps: &mut u32,
    sample_rate: &mut u32,
    channels: &mut u16,
) -> CodecResult<()> {
    let mut cursor = 0;
    while cursor + 8 <= body.len() {
        let fourcc = &body[cursor..cursor + 4];
        let size = read_u32(body, cursor + 4)? as usize;
        let inner_start = cursor + 8;
        let inner_end = inner_start
            .checked_add(size)
            .filter(|&end| end <= body.len())
            .ok_or_else(|| CodecError::Malformed("header chunk overrun".into()))?;
        let chunk = &body[inner_start..inner_end];

        if fourcc == b"LIST" && chunk.len() >= 4 && &chunk[0..4] == b"strl" {
            parse_strl(&chunk[4..], width, height, fps, sample_rate, channels)?;
        }

        cursor = inner_end + (size & 1);
    }
    Ok(())
}

fn parse_strl(
    body: &[u8],
    width: &mut u32,
    height: &mut u32,
    fps: &mut u32,
    sample_rate: &mut u32,
    channels: &mut u16,
) -> CodecResult<()> {
    let mut stream_type = [0u8; 4];
    let mut scale = 1u32;
    let mut rate = 0u32;

    let mut cursor = 0;
    while cursor + 8 <= body.len() {
        let fourcc = &body[cursor..cursor + 4];
        let size = read_u32(body, cursor + 4)? as usize;
        let inner_start = cursor + 8;
        let inner_end = inner_start
            .checked_add(size)
            .filter(|&end| end <= body.len())
            .ok_or_else(|| CodecError::Malformed("stream chunk overrun".into()))?;
        let chunk = &body[inner_start..inner_end];

        match fourcc {
            b"strh" => {
                if chunk.len() < 32 {
                    return Err(CodecError::Malformed("short strh".into()));
                }
                stream_type.copy_from_slice(&chunk[0..4]);
                scale = read_u32(chunk, 20)?.max(1);
                rate = read_u32(chunk, 24)?;
            }
            b"strf" => match &stream_type {
                b"vids" => {
                    if chunk.len() < 40 {
                        return Err(CodecError::Malformed("short BITMAPINFOHEADER".into()));
                    }
                    *width = read_u32(chunk, 4)?;
                    *height = read_u32(chunk, 8)?;
                    let bit_count = read_u16(chunk, 14)?;
                    let compression = read_u32(chunk, 16)?;
                    if bit_count != 24 || compression != 0 {
                        return Err(CodecError::Malformed(format!(
                            "unsupported DIB format: {bit_count}bpp compression {compression}"
                        )));
                    }
                    *fps = rate / scale;
                }
                b"auds" => {
                    if chunk.len() < 16 {
                        return Err(CodecError::Malformed("short WAVEFORMAT".into()));
                    }
                    let tag = read_u16(chunk, 0)?;
                    if tag != 1 {
                        return Err(CodecError::Malformed(format!(
                            "unsupported audio format tag {tag}"
                        )));
                    }
                    *channels = read_u16(chunk, 2)?;
                    *sample_rate = read_u32(chunk, 4)?;
                }
                _ => {}
            },
            _ => {}
        }

        cursor = inner_end + (size & 1);
    }
    Ok(())
}

fn parse_movi<'a>(
    body: &'a [u8],
    frames: &mut Vec<&'a [u8]>,
    pcm: &mut Vec<f32>,
) -> CodecResult<()> {
    let mut cursor = 0;
    while cursor + 8 <= body.len() {
        let fourcc = &body[cursor..cursor + 4];
        let size = read_u32(body, cursor + 4)? as usize;
        let inner_start = cursor + 8;
        let inner_end = inner_start
            .checked_add(size)
            .filter(|&end| end <= body.len())
            .ok_or_else(|| CodecError::Malformed("movi chunk overrun".into()))?;
        let chunk = &body[inner_start..inner_end];

        match fourcc {
            b"00db" => frames.push(chunk),
            b"01wb" => {
                for sample in chunk.chunks_exact(2) {
                    let v = i16::from_le_bytes([sample[0], sample[1]]);
                    pcm.push(v as f32 / i16::MAX as f32);
                }
            }
            _ => {}
        }

        cursor = inner_end + (size & 1);
    }
    Ok(())
}

/// Bottom-up padded BGR24 rows to top-down BGRA.
fn dib_to_bgra(dib: &[u8], width: u32, height: u32, stride: usize) -> Bytes {
    let w = width as usize;
    let h = height as usize;
    let mut bgra = vec![0u8; w * h * 4];
    for y in 0..h {
        let src_row = &dib[(h - 1 - y) * stride..];
        let dst_row = &mut bgra[y * w * 4..(y + 1) * w * 4];
        for x in 0..w {
            dst_row[x * 4..x * 4 + 3].copy_from_slice(&src_row[x * 3..x * 3 + 3]);
            dst_row[x * 4 + 3] = 255;
        }
    }
    Bytes::from(bgra)
}
