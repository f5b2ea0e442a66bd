//! In-memory decoding with Symphonia

use std::io::Cursor;
use std::sync::Arc;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

/// Errors that can occur while decoding a staged file
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("No audio track found in data")]
    NoAudioTrack,
    #[error("Unknown sample rate")]
    UnknownSampleRate,
    #[error("Data decoded to no audio")]
    Empty,
    #[error("Decode error: {0}")]
    Codec(String),
}

/// A fully decoded sound
#[derive(Debug, Clone)]
pub struct DecodedSound {
    /// Interleaved stereo samples
    pub samples: Arc<Vec<f32>>,
    /// Native sample rate in Hz
    pub sample_rate: u32,
}

impl DecodedSound {
    pub fn frames(&self) -> usize {
        self.samples.len() / 2
    }

    /// Length rounded to the nearest millisecond
    pub fn length_ms(&self) -> u32 {
        let rate = self.sample_rate.max(1) as u64;
        ((self.frames() as u64 * 1000 + rate / 2) / rate) as u32
    }
}

/// Decode a complete file held in memory
///
/// `extension` is only a probing hint; the container is detected from the data.
pub fn decode(bytes: Arc<[u8]>, extension: Option<&str>) -> Result<DecodedSound, DecodeError> {
    let source = Cursor::new(bytes);
    let mss = MediaSourceStream::new(Box::new(source), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| DecodeError::Codec(e.to_string()))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoAudioTrack)?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let sample_rate = codec_params
        .sample_rate
        .ok_or(DecodeError::UnknownSampleRate)?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| DecodeError::Codec(e.to_string()))?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(DecodeError::Codec(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            // Corrupt frames are skipped, the rest of the stream is still usable
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(DecodeError::Codec(e.to_string())),
        };

        let spec = *decoded.spec();
        let channels = spec.channels.count();
        let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        push_stereo(&mut samples, sample_buf.samples(), channels);
    }

    if samples.is_empty() {
        return Err(DecodeError::Empty);
    }

    Ok(DecodedSound {
        samples: Arc::new(samples),
        sample_rate,
    })
}

/// Append interleaved frames as stereo: mono is duplicated, extra channels dropped
fn push_stereo(out: &mut Vec<f32>, interleaved: &[f32], channels: usize) {
    match channels {
        0 => {}
        1 => {
            out.reserve(interleaved.len() * 2);
            for &s in interleaved {
                out.push(s);
                out.push(s);
            }
        }
        _ => {
            out.reserve(interleaved.len() / channels * 2);
            for frame in interleaved.chunks_exact(channels) {
                out.push(frame[0]);
                out.push(frame[1]);
            }
        }
    }
}
