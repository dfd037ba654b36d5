use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::audio::AudioData;
use crate::error::{AudioError, Result};

/// Extensions decoded through Symphonia (everything except plain WAV)
const SYMPHONIA_EXTENSIONS: &[&str] = &[
    "mp3", "flac", "ogg", "m4a", "aac", "mp4", "m4v", "mov", "mkv", "webm",
];

/// Decode an audio source into interleaved f32 samples.
///
/// WAV goes through `hound` (most reliable for PCM); compressed formats and
/// audio streams inside video containers go through Symphonia.
pub fn load<P: AsRef<Path>>(path: P) -> Result<AudioData> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "wav" => load_wav(path),
        ext if SYMPHONIA_EXTENSIONS.contains(&ext) => load_with_symphonia(path),
        _ => Err(AudioError::UnsupportedFormat { format: extension }.into()),
    }
}

/// Load WAV files using the hound crate
fn load_wav(path: &Path) -> Result<AudioData> {
    let reader = hound::WavReader::open(path).map_err(|_| AudioError::LoadFailed {
        path: path.display().to_string(),
    })?;

    let spec = reader.spec();
    let sample_rate = spec.sample_rate;
    let channels = spec.channels;

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| AudioError::LoadFailed {
                path: path.display().to_string(),
            })?,
        hound::SampleFormat::Int => {
            let bit_depth = spec.bits_per_sample;
            let ints: Vec<i32> = reader
                .into_samples::<i32>()
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|_| AudioError::LoadFailed {
                    path: path.display().to_string(),
                })?;
            ints.into_iter().map(|s| int_to_float(s, bit_depth)).collect()
        }
    };

    Ok(AudioData {
        samples,
        sample_rate,
        channels,
    })
}

/// Load compressed formats using Symphonia
fn load_with_symphonia(path: &Path) -> Result<AudioData> {
    let load_failed = || AudioError::LoadFailed {
        path: path.display().to_string(),
    };

    let file = File::open(path).map_err(|_| load_failed())?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &fmt_opts, &meta_opts)
        .map_err(|_| load_failed())?;

    let mut format = probed.format;

    // First audio track with a known (decodable) codec
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(load_failed)?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let sample_rate = codec_params.sample_rate.ok_or_else(|| AudioError::InvalidParameters {
        details: "no sample rate in stream".to_string(),
    })?;
    let channels = codec_params
        .channels
        .ok_or_else(|| AudioError::InvalidParameters {
            details: "no channel information in stream".to_string(),
        })?
        .count() as u16;

    let dec_opts: DecoderOptions = Default::default();
    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &dec_opts)
        .map_err(|_| load_failed())?;

    let mut samples = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            // End of stream or unrecoverable container error
            Err(_) => break,
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let capacity = decoded.capacity();
                let too_small = sample_buf
                    .as_ref()
                    .map_or(true, |b| b.capacity() < capacity * spec.channels.count());
                if too_small {
                    sample_buf = Some(SampleBuffer::new(capacity as u64, spec));
                }
                if let Some(buf) = sample_buf.as_mut() {
                    buf.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buf.samples());
                }
            }
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(_) => break,
        }
    }

    if samples.is_empty() {
        return Err(load_failed().into());
    }

    Ok(AudioData {
        samples,
        sample_rate,
        channels,
    })
}

/// Convert integer sample to float (-1.0 to 1.0)
fn int_to_float(sample: i32, bit_depth: u16) -> f32 {
    match bit_depth {
        8 => (sample as f32 - 128.0) / 128.0,
        16 => sample as f32 / 32768.0,
        24 => sample as f32 / 8388608.0,
        32 => sample as f32 / 2147483648.0,
        _ => sample as f32 / 32768.0,
    }
}
