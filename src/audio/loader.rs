//! Decoding audio files into sample buffers via Symphonia.
//!
//! The renderer consumes exactly one channel of floats, so the decoded
//! stream stays interleaved here and [`AudioData::channel`] deinterleaves
//! the channel the viewer asks for.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use thiserror::Error;

/// Errors that can occur during audio loading.
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to open audio file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to probe audio format: {0}")]
    Probe(#[from] SymphoniaError),

    #[error("No audio track found in file")]
    NoAudioTrack,

    #[error("Unknown sample rate")]
    UnknownSampleRate,
}

/// A decoded file: interleaved f32 samples in roughly -1.0..1.0 plus the
/// stream parameters needed to interpret them.
#[derive(Debug, Clone)]
pub struct AudioData {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: usize,
}

impl AudioData {
    /// Deinterleave a single channel.
    ///
    /// The waveform view draws one channel only; an out-of-range index
    /// yields an empty buffer rather than a panic.
    pub fn channel(&self, index: usize) -> Vec<f32> {
        if self.channels == 0 || index >= self.channels {
            return Vec::new();
        }
        self.samples
            .iter()
            .skip(index)
            .step_by(self.channels)
            .copied()
            .collect()
    }

    /// Playback length in seconds.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.num_frames() as f64 / self.sample_rate as f64
    }

    /// Frame count (one frame = one sample per channel).
    pub fn num_frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels
    }
}

/// Decode a WAV, MP3, FLAC, or AAC file into an [`AudioData`].
///
/// # Example
///
/// ```no_run
/// use wavescroll::audio::loader::load_audio;
/// use std::path::Path;
///
/// let audio = load_audio(Path::new("song.mp3")).unwrap();
/// let left = audio.channel(0);
/// println!("{:.2}s, {} samples in channel 0", audio.duration(), left.len());
/// ```
pub fn load_audio(path: &Path) -> Result<AudioData, AudioError> {
    let file = File::open(path)?;
    let stream = MediaSourceStream::new(Box::new(file), Default::default());

    // The file extension, when present, speeds up format detection.
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        stream,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut reader = probed.format;

    let track = reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(AudioError::NoAudioTrack)?;
    let track_id = track.id;
    let params = track.codec_params.clone();

    let sample_rate = params.sample_rate.ok_or(AudioError::UnknownSampleRate)?;
    let channels = params.channels.map(|c| c.count()).unwrap_or(2);

    let decoder = symphonia::default::get_codecs().make(&params, &DecoderOptions::default())?;
    let samples = decode_track(reader.as_mut(), decoder, track_id)?;

    Ok(AudioData {
        samples,
        sample_rate,
        channels,
    })
}

/// Pull packets for one track off the reader until end of stream,
/// accumulating interleaved f32 samples.
fn decode_track(
    reader: &mut dyn FormatReader,
    mut decoder: Box<dyn Decoder>,
    track_id: u32,
) -> Result<Vec<f32>, AudioError> {
    let mut samples = Vec::new();
    let mut interleaved: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match reader.next_packet() {
            Ok(packet) => packet,
            // Symphonia signals end of stream as an unexpected EOF.
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // A corrupt packet is dropped, not fatal.
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(e.into()),
        };

        let buf = interleaved.get_or_insert_with(|| {
            SampleBuffer::new(decoded.capacity() as u64, *decoded.spec())
        });
        buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buf.samples());
    }

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo_fixture() -> AudioData {
        AudioData {
            // Two frames: L = [0.5, 1.0], R = [-0.5, 0.0].
            samples: vec![0.5, -0.5, 1.0, 0.0],
            sample_rate: 44100,
            channels: 2,
        }
    }

    #[test]
    fn test_channel_deinterleaves() {
        let audio = stereo_fixture();
        assert_eq!(audio.channel(0), vec![0.5, 1.0]);
        assert_eq!(audio.channel(1), vec![-0.5, 0.0]);
    }

    #[test]
    fn test_channel_out_of_range_is_empty() {
        assert!(stereo_fixture().channel(2).is_empty());
    }

    #[test]
    fn test_channel_mono_passthrough() {
        let audio = AudioData {
            samples: vec![0.1, 0.2, 0.3],
            sample_rate: 44100,
            channels: 1,
        };
        assert_eq!(audio.channel(0), audio.samples);
    }

    #[test]
    fn test_duration_and_frames() {
        let audio = AudioData {
            samples: vec![0.0; 44100 * 2],
            sample_rate: 44100,
            channels: 2,
        };
        assert_eq!(audio.num_frames(), 44100);
        assert!((audio.duration() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_stream_params() {
        let audio = AudioData {
            samples: vec![0.0; 8],
            sample_rate: 0,
            channels: 0,
        };
        assert_eq!(audio.duration(), 0.0);
        assert_eq!(audio.num_frames(), 0);
        assert!(audio.channel(0).is_empty());
    }
}
