use std::io::{Seek, Write};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::audio::domain::audio_segment::AudioSegment;

const PCM_BITS: u16 = 16;

/// Writes a segment as 16-bit PCM WAV.
pub fn write_wav(path: &Path, segment: &AudioSegment) -> Result<(), hound::Error> {
    let writer = WavWriter::create(path, pcm_spec(segment))?;
    write_samples(writer, segment)
}

/// Reads a WAV file into normalized f32 samples, whatever its sample format.
pub fn read_wav(path: &Path) -> Result<AudioSegment, hound::Error> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    let samples = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    Ok(AudioSegment::new(samples, spec.sample_rate, spec.channels))
}

/// Downmixes to mono and linearly resamples to `sample_rate`.
///
/// Returns the segment unchanged when it is already in that shape.
pub fn to_mono(segment: AudioSegment, sample_rate: u32) -> AudioSegment {
    if segment.channels() == 1 && segment.sample_rate() == sample_rate {
        return segment;
    }

    let channels = segment.channels().max(1) as usize;
    let mono: Vec<f32> = segment
        .samples()
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect();

    if segment.sample_rate() == sample_rate || mono.is_empty() {
        return AudioSegment::new(mono, segment.sample_rate(), 1);
    }

    let ratio = segment.sample_rate() as f64 / sample_rate as f64;
    let out_len = (mono.len() as f64 / ratio).round() as usize;
    let last = mono.len() - 1;
    let resampled = (0..out_len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let idx = (pos.floor() as usize).min(last);
            let next = (idx + 1).min(last);
            let frac = (pos - idx as f64) as f32;
            mono[idx] * (1.0 - frac) + mono[next] * frac
        })
        .collect();

    AudioSegment::new(resampled, sample_rate, 1)
}

fn pcm_spec(segment: &AudioSegment) -> WavSpec {
    WavSpec {
        channels: segment.channels(),
        sample_rate: segment.sample_rate(),
        bits_per_sample: PCM_BITS,
        sample_format: SampleFormat::Int,
    }
}

fn write_samples<W: Write + Seek>(
    mut writer: WavWriter<W>,
    segment: &AudioSegment,
) -> Result<(), hound::Error> {
    for sample in segment.samples() {
        let pcm = (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
        writer.write_sample(pcm)?;
    }
    writer.finalize()
}
