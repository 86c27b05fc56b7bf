//! Audio file I/O operations
//!
//! The streaming pair [`WavSource`] / [`RawSink`] feeds the pipeline without
//! holding a whole clip in memory. The whole-file helpers ([`load_wav`],
//! [`save_wav`], [`load_raw`]) back fixtures and the verification pass.

use crate::audio::AudioBuffer;
use crate::error::{ResynthError, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Streaming WAV reader that hands out fixed-size runs of mono frames.
///
/// Multi-channel input is folded down by averaging each frame, so the
/// pipeline always sees a single scalar stream.
pub struct WavSource {
    reader: WavReader<BufReader<File>>,
    path: String,
    channels: u16,
    sample_rate: u32,
    sample_format: SampleFormat,
    /// Scale from stored integer samples to -1.0..1.0 (1.0 for float input)
    norm: f32,
}

impl WavSource {
    /// Open a WAV file for streaming reads
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = WavReader::open(path).map_err(|e| ResynthError::SourceUnavailable {
            path: path.display().to_string(),
            source: e,
        })?;

        let spec = reader.spec();
        let norm = match spec.sample_format {
            SampleFormat::Float => 1.0,
            SampleFormat::Int => 1.0 / (1u32 << (spec.bits_per_sample - 1)) as f32,
        };

        Ok(Self {
            reader,
            path: path.display().to_string(),
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            sample_format: spec.sample_format,
            norm,
        })
    }

    /// Get the sample rate of the underlying file
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the channel count of the underlying file
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Total length of the file in frames
    pub fn duration_frames(&self) -> u32 {
        self.reader.duration()
    }

    /// Read up to `max_frames` downmixed frames, or `None` at end of stream.
    ///
    /// `max_frames` must be positive and is rejected as
    /// `InvalidConfiguration` otherwise, since only a short (or absent)
    /// final run marks the end of the file.
    pub fn read_chunk(&mut self, max_frames: usize) -> Result<Option<Vec<f32>>> {
        if max_frames == 0 {
            return Err(ResynthError::InvalidConfiguration {
                reason: "max_frames must be positive".to_string(),
            });
        }
        let want = max_frames * self.channels as usize;
        let mut interleaved: Vec<f32> = Vec::with_capacity(want);

        match self.sample_format {
            SampleFormat::Float => {
                for sample in self.reader.samples::<f32>().take(want) {
                    let v = sample.map_err(|e| ResynthError::SourceUnavailable {
                        path: self.path.clone(),
                        source: e,
                    })?;
                    interleaved.push(v);
                }
            }
            SampleFormat::Int => {
                for sample in self.reader.samples::<i32>().take(want) {
                    let v = sample.map_err(|e| ResynthError::SourceUnavailable {
                        path: self.path.clone(),
                        source: e,
                    })?;
                    interleaved.push(v as f32 * self.norm);
                }
            }
        }

        if interleaved.is_empty() {
            return Ok(None);
        }

        let channels = self.channels as usize;
        let frames = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect();
        Ok(Some(frames))
    }
}

/// Sink that appends raw little-endian `f32` samples to a file.
///
/// The output carries no header; frame count and sample rate travel out of
/// band, which is all the downstream comparison tooling needs.
#[derive(Debug)]
pub struct RawSink {
    writer: BufWriter<File>,
    path: String,
    samples_written: u64,
}

impl RawSink {
    /// Create (or truncate) the output file
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| ResynthError::SinkUnavailable {
            path: path.display().to_string(),
            source: e.into(),
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
            path: path.display().to_string(),
            samples_written: 0,
        })
    }

    /// Append a run of samples
    pub fn write(&mut self, samples: &[f32]) -> Result<()> {
        for &sample in samples {
            self.writer
                .write_all(&sample.to_le_bytes())
                .map_err(|e| ResynthError::SinkUnavailable {
                    path: self.path.clone(),
                    source: e.into(),
                })?;
        }
        self.samples_written += samples.len() as u64;
        Ok(())
    }

    /// Flush buffered samples out to disk
    pub fn finalize(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| ResynthError::SinkUnavailable {
            path: self.path.clone(),
            source: e.into(),
        })
    }

    /// Number of samples written so far
    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }
}

/// Load a WAV file into an AudioBuffer
pub fn load_wav<P: AsRef<Path>>(path: P) -> Result<AudioBuffer> {
    let path = path.as_ref();
    let reader = WavReader::open(path).map_err(|e| ResynthError::SourceUnavailable {
        path: path.display().to_string(),
        source: e,
    })?;

    let spec = reader.spec();
    let channels = spec.channels;
    let sample_rate = spec.sample_rate;

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| {
                s.map_err(|e| ResynthError::SourceUnavailable {
                    path: path.display().to_string(),
                    source: e,
                })
            })
            .collect::<Result<Vec<f32>>>()?,
        SampleFormat::Int => {
            let bits = spec.bits_per_sample;
            let max_val = (1u32 << (bits - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| {
                    s.map(|v| v as f32 / max_val)
                        .map_err(|e| ResynthError::SourceUnavailable {
                            path: path.display().to_string(),
                            source: e,
                        })
                })
                .collect::<Result<Vec<f32>>>()?
        }
    };

    AudioBuffer::new(samples, channels, sample_rate)
}

/// Save an AudioBuffer to a WAV file (32-bit float)
pub fn save_wav<P: AsRef<Path>>(buffer: &AudioBuffer, path: P) -> Result<()> {
    let path = path.as_ref();
    let spec = WavSpec {
        channels: buffer.channels(),
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec).map_err(|e| ResynthError::SinkUnavailable {
        path: path.display().to_string(),
        source: e.into(),
    })?;

    for &sample in buffer.samples() {
        writer
            .write_sample(sample)
            .map_err(|e| ResynthError::SinkUnavailable {
                path: path.display().to_string(),
                source: e.into(),
            })?;
    }

    writer.finalize().map_err(|e| ResynthError::SinkUnavailable {
        path: path.display().to_string(),
        source: e.into(),
    })?;

    Ok(())
}

/// Save an AudioBuffer to a WAV file with specific bit depth
pub fn save_wav_with_depth<P: AsRef<Path>>(
    buffer: &AudioBuffer,
    path: P,
    bits: u16,
) -> Result<()> {
    let path = path.as_ref();

    if bits == 32 {
        return save_wav(buffer, path);
    }

    let spec = WavSpec {
        channels: buffer.channels(),
        sample_rate: buffer.sample_rate(),
        bits_per_sample: bits,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(|e| ResynthError::SinkUnavailable {
        path: path.display().to_string(),
        source: e.into(),
    })?;

    let max_val = ((1u32 << (bits - 1)) - 1) as f32;

    for &sample in buffer.samples() {
        let clamped = sample.clamp(-1.0, 1.0);
        let int_sample = (clamped * max_val) as i32;
        writer
            .write_sample(int_sample)
            .map_err(|e| ResynthError::SinkUnavailable {
                path: path.display().to_string(),
                source: e.into(),
            })?;
    }

    writer.finalize().map_err(|e| ResynthError::SinkUnavailable {
        path: path.display().to_string(),
        source: e.into(),
    })?;

    Ok(())
}

/// Load a raw little-endian `f32` file, as written by [`RawSink`]
pub fn load_raw<P: AsRef<Path>>(path: P) -> Result<Vec<f32>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| ResynthError::SinkUnavailable {
        path: path.display().to_string(),
        source: e.into(),
    })?;

    if bytes.len() % 4 != 0 {
        return Err(ResynthError::SinkUnavailable {
            path: path.display().to_string(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "file length is not a multiple of 4 bytes",
            )
            .into(),
        });
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_wav_round_trip_float() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.wav");

        let original = AudioBuffer::sine_wave(440.0, 0.5, 44100);
        save_wav(&original, &path).unwrap();

        let loaded = load_wav(&path).unwrap();

        assert_eq!(original.channels(), loaded.channels());
        assert_eq!(original.sample_rate(), loaded.sample_rate());
        assert_eq!(original.num_frames(), loaded.num_frames());
        assert!(original.is_approx_equal(&loaded, 1e-6));
    }

    #[test]
    fn test_wav_round_trip_16bit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test_16bit.wav");

        let original = AudioBuffer::sine_wave(440.0, 0.5, 44100);
        save_wav_with_depth(&original, &path, 16).unwrap();

        let loaded = load_wav(&path).unwrap();

        assert_eq!(original.channels(), loaded.channels());
        assert_eq!(original.sample_rate(), loaded.sample_rate());
        // 16-bit has less precision, allow larger tolerance
        assert!(original.is_approx_equal(&loaded, 1e-4));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = load_wav("nonexistent_file.wav");
        assert!(matches!(result, Err(ResynthError::SourceUnavailable { .. })));
    }

    #[test]
    fn test_streamed_chunks_match_whole_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("streamed.wav");

        let original = AudioBuffer::sine_wave(440.0, 0.25, 8000);
        save_wav(&original, &path).unwrap();

        let mut source = WavSource::open(&path).unwrap();
        assert_eq!(source.sample_rate(), 8000);
        assert_eq!(source.duration_frames() as usize, original.num_frames());

        let mut streamed = Vec::new();
        while let Some(chunk) = source.read_chunk(512).unwrap() {
            assert!(chunk.len() <= 512);
            streamed.extend_from_slice(&chunk);
        }

        let loaded = load_wav(&path).unwrap();
        assert_eq!(streamed, loaded.samples());

        // Exhausted source keeps reporting end of stream
        assert!(source.read_chunk(512).unwrap().is_none());
    }

    #[test]
    fn test_zero_frame_read_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("zero_read.wav");
        save_wav(&AudioBuffer::sine_wave(440.0, 0.01, 8000), &path).unwrap();

        let mut source = WavSource::open(&path).unwrap();
        let err = source.read_chunk(0).unwrap_err();
        assert!(matches!(err, ResynthError::InvalidConfiguration { .. }));
        assert!(err.to_string().contains("max_frames must be positive"));

        // The rejection consumes nothing; the stream is still readable
        let chunk = source.read_chunk(16).unwrap();
        assert_eq!(chunk.map(|c| c.len()), Some(16));
    }

    #[test]
    fn test_source_downmixes_stereo() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stereo.wav");

        let interleaved = vec![0.5, -0.5, 1.0, 0.0, -0.25, -0.75];
        let buffer = AudioBuffer::new(interleaved, 2, 44100).unwrap();
        save_wav(&buffer, &path).unwrap();

        let mut source = WavSource::open(&path).unwrap();
        assert_eq!(source.channels(), 2);

        let frames = source.read_chunk(8).unwrap().unwrap();
        assert_eq!(frames, vec![0.0, 0.5, -0.5]);
        assert!(source.read_chunk(8).unwrap().is_none());
    }

    #[test]
    fn test_streamed_int_samples_match_whole_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("int16.wav");

        let original = AudioBuffer::sine_wave(440.0, 0.1, 8000);
        save_wav_with_depth(&original, &path, 16).unwrap();

        let mut source = WavSource::open(&path).unwrap();
        let mut streamed = Vec::new();
        while let Some(chunk) = source.read_chunk(100).unwrap() {
            streamed.extend_from_slice(&chunk);
        }

        let loaded = load_wav(&path).unwrap();
        assert_eq!(streamed, loaded.samples());
    }

    #[test]
    fn test_raw_sink_writes_little_endian() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.f32");

        let samples = [1.0f32, -0.5, 0.25];
        let mut sink = RawSink::create(&path).unwrap();
        sink.write(&samples).unwrap();
        sink.finalize().unwrap();
        assert_eq!(sink.samples_written(), 3);

        let bytes = std::fs::read(&path).unwrap();
        let expected: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_raw_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("round.f32");

        let samples = vec![0.0f32, 1.0, -1.0, 0.123, f32::MIN_POSITIVE];
        let mut sink = RawSink::create(&path).unwrap();
        sink.write(&samples).unwrap();
        sink.finalize().unwrap();

        assert_eq!(load_raw(&path).unwrap(), samples);
    }

    #[test]
    fn test_load_raw_rejects_ragged_length() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ragged.f32");
        std::fs::write(&path, [0u8; 6]).unwrap();

        let result = load_raw(&path);
        assert!(matches!(result, Err(ResynthError::SinkUnavailable { .. })));
    }

    #[test]
    fn test_sink_create_fails_in_missing_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("out.f32");

        let result = RawSink::create(&path);
        assert!(matches!(result, Err(ResynthError::SinkUnavailable { .. })));
    }
}
