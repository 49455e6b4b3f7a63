//! Canonical 44-byte RIFF/WAVE header generation and parsing.
//!
//! Every multi-byte field is written with `to_le_bytes`, so the output is
//! identical on little- and big-endian hosts.

use crate::models::audio_models::StreamFormat;
use crate::models::error::CaptureError;

/// Size of the canonical WAV header in bytes.
pub const WAV_HEADER_SIZE: usize = 44;

/// PCM format tag in the `fmt ` chunk.
pub const WAVE_FORMAT_PCM: u16 = 1;

/// Largest data chunk a 32-bit RIFF size field can describe.
pub const MAX_DATA_SIZE: u64 = u32::MAX as u64 - 36;

/// Generate a 44-byte WAV RIFF header.
///
/// Layout:
/// ```text
/// [0-3]    "RIFF"
/// [4-7]    36 + data_size
/// [8-11]   "WAVE"
/// [12-15]  "fmt "
/// [16-19]  16 (PCM format chunk size)
/// [20-21]  1 (PCM format code)
/// [22-23]  channels
/// [24-27]  sample_rate
/// [28-31]  byte_rate = sample_rate * bits_per_sample * channels / 8
/// [32-33]  block_align = bits_per_sample * channels / 8
/// [34-35]  bits_per_sample
/// [36-39]  "data"
/// [40-43]  data_size
/// ```
pub fn generate_wav_header(format: &StreamFormat, data_size: u32) -> [u8; WAV_HEADER_SIZE] {
    let chunk_size = data_size.saturating_add(36);

    let mut header = [0u8; WAV_HEADER_SIZE];

    // RIFF chunk descriptor
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&chunk_size.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    // fmt sub-chunk
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&WAVE_FORMAT_PCM.to_le_bytes());
    header[22..24].copy_from_slice(&format.channel_count.to_le_bytes());
    header[24..28].copy_from_slice(&format.sample_rate_hz.to_le_bytes());
    header[28..32].copy_from_slice(&format.byte_rate().to_le_bytes());
    header[32..34].copy_from_slice(&format.block_align().to_le_bytes());
    header[34..36].copy_from_slice(&format.bits_per_sample.to_le_bytes());

    // data sub-chunk
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());

    header
}

/// Fields recovered from a canonical WAV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeaderInfo {
    pub format: StreamFormat,
    pub riff_chunk_size: u32,
    pub data_size: u32,
    pub byte_rate: u32,
    pub block_align: u16,
}

/// Parse the canonical 44-byte header produced by [`generate_wav_header`].
///
/// Only the PCM layout with a 16-byte `fmt ` chunk directly followed by
/// `data` is accepted.
pub fn parse_wav_header(bytes: &[u8]) -> Result<WavHeaderInfo, CaptureError> {
    if bytes.len() < WAV_HEADER_SIZE {
        return Err(CaptureError::Format(format!(
            "header is {} bytes, expected {}",
            bytes.len(),
            WAV_HEADER_SIZE
        )));
    }
    if &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(CaptureError::Format("missing RIFF/WAVE magic".into()));
    }
    if &bytes[12..16] != b"fmt " || read_u32(bytes, 16) != 16 {
        return Err(CaptureError::Format("expected 16-byte fmt chunk".into()));
    }
    let tag = read_u16(bytes, 20);
    if tag != WAVE_FORMAT_PCM {
        return Err(CaptureError::Format(format!("unsupported format tag {}", tag)));
    }
    if &bytes[36..40] != b"data" {
        return Err(CaptureError::Format("missing data chunk".into()));
    }

    let format = StreamFormat {
        channel_count: read_u16(bytes, 22),
        sample_rate_hz: read_u32(bytes, 24),
        bits_per_sample: read_u16(bytes, 34),
    };

    Ok(WavHeaderInfo {
        format,
        riff_chunk_size: read_u32(bytes, 4),
        byte_rate: read_u32(bytes, 28),
        block_align: read_u16(bytes, 32),
        data_size: read_u32(bytes, 40),
    })
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_capture_header_has_chunk_layout_only() {
        let header = generate_wav_header(&StreamFormat::new(8_000, 1, 8), 0);

        assert_eq!(header.len(), WAV_HEADER_SIZE);
        let tags: Vec<&[u8]> = [0..4, 8..12, 12..16, 36..40]
            .into_iter()
            .map(|r| &header[r])
            .collect();
        let expected: [&[u8]; 4] = [b"RIFF", b"WAVE", b"fmt ", b"data"];
        assert_eq!(tags, expected);
        assert_eq!(&header[4..8], &36u32.to_le_bytes());
        assert_eq!(&header[40..44], &[0, 0, 0, 0]);
    }

    #[test]
    fn header_44khz_stereo_32bit() {
        let header = generate_wav_header(&StreamFormat::REQUESTED, 32_768);

        assert_eq!(u16::from_le_bytes([header[20], header[21]]), 1);
        assert_eq!(u16::from_le_bytes([header[22], header[23]]), 2);
        assert_eq!(u32::from_le_bytes([header[24], header[25], header[26], header[27]]), 44_100);
        // 44100 * 32 * 2 / 8
        assert_eq!(u32::from_le_bytes([header[28], header[29], header[30], header[31]]), 352_800);
        assert_eq!(u16::from_le_bytes([header[32], header[33]]), 8);
        assert_eq!(u16::from_le_bytes([header[34], header[35]]), 32);
        assert_eq!(u32::from_le_bytes([header[40], header[41], header[42], header[43]]), 32_768);
        assert_eq!(u32::from_le_bytes([header[4], header[5], header[6], header[7]]), 36 + 32_768);
    }

    #[test]
    fn byte_rate_follows_channel_count() {
        // Mono must not be computed as if it were stereo.
        let header = generate_wav_header(&StreamFormat::new(48_000, 1, 16), 0);
        assert_eq!(u32::from_le_bytes([header[28], header[29], header[30], header[31]]), 96_000);
        assert_eq!(u16::from_le_bytes([header[32], header[33]]), 2);
    }

    #[test]
    fn fields_are_little_endian_byte_sequences() {
        let format = StreamFormat::new(0x0001_BB80, 0x0102, 16); // 48000 Hz
        let header = generate_wav_header(&format, 0x0A0B_0C0D);

        assert_eq!(&header[24..28], &[0x80, 0xBB, 0x01, 0x00]);
        assert_eq!(&header[22..24], &[0x02, 0x01]);
        assert_eq!(&header[40..44], &[0x0D, 0x0C, 0x0B, 0x0A]);
        assert_eq!(&header[16..20], &[16, 0, 0, 0]);
        assert_eq!(&header[20..22], &[1, 0]);
    }

    #[test]
    fn parse_recovers_generated_fields() {
        let format = StreamFormat::new(22_050, 1, 8);
        let header = generate_wav_header(&format, 1_000);
        let info = parse_wav_header(&header).unwrap();

        assert_eq!(info.format, format);
        assert_eq!(info.data_size, 1_000);
        assert_eq!(info.riff_chunk_size, 1_036);
        assert_eq!(info.byte_rate, 22_050);
        assert_eq!(info.block_align, 1);
    }

    #[test]
    fn parse_rejects_malformed_headers() {
        let header = generate_wav_header(&StreamFormat::REQUESTED, 0);

        assert!(parse_wav_header(&header[..40]).is_err());

        let mut bad_magic = header;
        bad_magic[0..4].copy_from_slice(b"RIFX");
        assert!(parse_wav_header(&bad_magic).is_err());

        let mut float_tag = header;
        float_tag[20..22].copy_from_slice(&3u16.to_le_bytes());
        assert!(matches!(parse_wav_header(&float_tag), Err(CaptureError::Format(_))));
    }
}
