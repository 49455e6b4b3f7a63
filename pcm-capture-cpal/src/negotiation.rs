//! Choosing a concrete cpal input configuration for a requested format.
//!
//! The chosen configuration is what the host grants; the caller records it
//! rather than assuming the request was honored.

use cpal::{
    BufferSize, SampleFormat, SampleRate, StreamConfig, SupportedBufferSize,
    SupportedStreamConfig, SupportedStreamConfigRange,
};

use pcm_capture_core::StreamFormat;

/// Integer sample format matching `bits_per_sample`, the way WAV PCM stores it.
pub fn sample_format_for_bits(bits_per_sample: u16) -> SampleFormat {
    match bits_per_sample {
        8 => SampleFormat::U8,
        16 => SampleFormat::I16,
        _ => SampleFormat::I32,
    }
}

/// Bits per sample written to the WAV file for a cpal sample format.
///
/// `U8`, `I16` and `I32` are delivered verbatim. Everything else is
/// converted to `I32` on the audio thread, since PCM format tag 1 only
/// describes unsigned 8-bit and signed wider integers.
pub fn delivered_bits(sample_format: SampleFormat) -> u16 {
    match sample_format {
        SampleFormat::U8 => 8,
        SampleFormat::I16 => 16,
        _ => 32,
    }
}

/// Pick the supported range that best matches `requested`.
///
/// Preference order: exact channels + sample format covering the rate, then
/// exact channels covering the rate with an integer format, then any range
/// covering the rate. Returns `None` if nothing covers the rate, in which
/// case the device default should be used.
pub fn choose_config(
    ranges: &[SupportedStreamConfigRange],
    requested: &StreamFormat,
) -> Option<SupportedStreamConfig> {
    let rate = SampleRate(requested.sample_rate_hz);
    let wanted_format = sample_format_for_bits(requested.bits_per_sample);
    let covers_rate = |r: &&SupportedStreamConfigRange| {
        r.min_sample_rate() <= rate && rate <= r.max_sample_rate()
    };
    let same_channels = |r: &&SupportedStreamConfigRange| r.channels() == requested.channel_count;

    ranges
        .iter()
        .filter(covers_rate)
        .filter(same_channels)
        .find(|r| r.sample_format() == wanted_format)
        .or_else(|| {
            ranges
                .iter()
                .filter(covers_rate)
                .filter(same_channels)
                .find(|r| r.sample_format().is_int())
        })
        .or_else(|| ranges.iter().find(covers_rate))
        .map(|r| r.clone().with_sample_rate(rate))
}

/// Fixed buffer of `frames` when the device allows it, otherwise the default.
pub fn buffer_size_for(supported: &SupportedBufferSize, frames: u32) -> BufferSize {
    match *supported {
        SupportedBufferSize::Range { min, max } if min <= frames && frames <= max => {
            BufferSize::Fixed(frames)
        }
        _ => BufferSize::Default,
    }
}

/// Stream config to open, plus the format the stream will deliver.
pub fn granted(supported: &SupportedStreamConfig, buffer_frames: u32) -> (StreamConfig, StreamFormat) {
    let mut config = supported.config();
    config.buffer_size = buffer_size_for(supported.buffer_size(), buffer_frames);

    let format = StreamFormat::new(
        config.sample_rate.0,
        config.channels,
        delivered_bits(supported.sample_format()),
    );
    (config, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(channels: u16, min: u32, max: u32, format: SampleFormat) -> SupportedStreamConfigRange {
        SupportedStreamConfigRange::new(
            channels,
            SampleRate(min),
            SampleRate(max),
            SupportedBufferSize::Range { min: 64, max: 8192 },
            format,
        )
    }

    #[test]
    fn exact_match_is_preferred() {
        let ranges = vec![
            range(2, 8_000, 96_000, SampleFormat::F32),
            range(2, 8_000, 96_000, SampleFormat::I32),
        ];
        let chosen = choose_config(&ranges, &StreamFormat::REQUESTED).unwrap();

        assert_eq!(chosen.sample_format(), SampleFormat::I32);
        assert_eq!(chosen.sample_rate(), SampleRate(44_100));
        assert_eq!(chosen.channels(), 2);
    }

    #[test]
    fn integer_format_beats_float_when_bits_differ() {
        let ranges = vec![
            range(2, 44_100, 44_100, SampleFormat::F32),
            range(2, 44_100, 44_100, SampleFormat::I16),
        ];
        let chosen = choose_config(&ranges, &StreamFormat::REQUESTED).unwrap();
        assert_eq!(chosen.sample_format(), SampleFormat::I16);
    }

    #[test]
    fn falls_back_to_other_channel_counts() {
        let ranges = vec![range(1, 16_000, 48_000, SampleFormat::I16)];
        let chosen = choose_config(&ranges, &StreamFormat::REQUESTED).unwrap();
        assert_eq!(chosen.channels(), 1);
    }

    #[test]
    fn no_range_covering_rate() {
        let ranges = vec![range(2, 48_000, 48_000, SampleFormat::I32)];
        assert!(choose_config(&ranges, &StreamFormat::REQUESTED).is_none());
    }

    #[test]
    fn fixed_buffer_only_within_range() {
        let supported = SupportedBufferSize::Range { min: 256, max: 4096 };
        assert_eq!(buffer_size_for(&supported, 4096), BufferSize::Fixed(4096));
        assert_eq!(buffer_size_for(&supported, 8192), BufferSize::Default);
        assert_eq!(buffer_size_for(&SupportedBufferSize::Unknown, 4096), BufferSize::Default);
    }

    #[test]
    fn granted_format_reports_delivered_bits() {
        let supported = range(2, 48_000, 48_000, SampleFormat::F32).with_sample_rate(SampleRate(48_000));
        let (config, format) = granted(&supported, 4096);

        assert_eq!(config.buffer_size, BufferSize::Fixed(4096));
        assert_eq!(format, StreamFormat::new(48_000, 2, 32));
    }

    #[test]
    fn bits_map_to_pcm_formats() {
        assert_eq!(sample_format_for_bits(8), SampleFormat::U8);
        assert_eq!(sample_format_for_bits(16), SampleFormat::I16);
        assert_eq!(sample_format_for_bits(32), SampleFormat::I32);
        assert_eq!(delivered_bits(SampleFormat::U16), 32);
        assert_eq!(delivered_bits(SampleFormat::U8), 8);
    }
}
