//! RIFF/WAVE container for mono 16-bit PCM.
//!
//! [`encode_wav`] produces the canonical 44-byte header followed by the
//! samples as little-endian `i16`:
//!
//! | Offset | Size | Field         | Value                  |
//! |--------|------|---------------|------------------------|
//! | 0      | 4    | ChunkID       | `"RIFF"`               |
//! | 4      | 4    | ChunkSize     | `36 + data_size`       |
//! | 8      | 4    | Format        | `"WAVE"`               |
//! | 12     | 4    | Subchunk1ID   | `"fmt "`               |
//! | 16     | 4    | Subchunk1Size | `16`                   |
//! | 20     | 2    | AudioFormat   | `1` (PCM)              |
//! | 22     | 2    | NumChannels   | `1`                    |
//! | 24     | 4    | SampleRate    | input rate             |
//! | 28     | 4    | ByteRate      | `sample_rate × 2`      |
//! | 32     | 2    | BlockAlign    | `2`                    |
//! | 34     | 2    | BitsPerSample | `16`                   |
//! | 36     | 4    | Subchunk2ID   | `"data"`               |
//! | 40     | 4    | Subchunk2Size | `sample_count × 2`     |
//! | 44     | …    | Data          | samples, `i16` LE      |
//!
//! [`WavHeader::parse`] reads the same layout back and rejects anything
//! else, which is what the playback sink feeds on.

use thiserror::Error;

/// Size of the canonical header in bytes.
pub const WAV_HEADER_LEN: usize = 44;

/// MIME type of the produced container.
pub const WAV_MIME: &str = "audio/wav";

const NUM_CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;
const BYTES_PER_SAMPLE: u32 = (BITS_PER_SAMPLE / 8) as u32;
const PCM_FORMAT: u16 = 1;
const FMT_CHUNK_LEN: u32 = 16;

// ---------------------------------------------------------------------------
// encode_wav
// ---------------------------------------------------------------------------

/// Wrap mono 16-bit samples in a RIFF/WAVE container.
///
/// Pure and infallible: an empty slice gives a valid 44-byte file with a
/// zero-length data chunk.
///
/// # Example
///
/// ```rust
/// use studio_assist::audio::encode_wav;
///
/// let wav = encode_wav(&[0, 32767, -32768, 100], 24_000);
/// assert_eq!(wav.len(), 52);
/// assert_eq!(&wav[0..4], b"RIFF");
/// assert_eq!(u32::from_le_bytes(wav[24..28].try_into().unwrap()), 24_000);
/// ```
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Vec<u8> {
    // Header fields are 32-bit; sizes wrap the same way a 32-bit writer would.
    let data_size = (samples.len() as u32).wrapping_mul(BYTES_PER_SAMPLE);
    let byte_rate = sample_rate.wrapping_mul(NUM_CHANNELS as u32 * BYTES_PER_SAMPLE);
    let block_align = NUM_CHANNELS * BITS_PER_SAMPLE / 8;

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + samples.len() * 2);

    // RIFF header
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&data_size.wrapping_add(36).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt chunk
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
    out.extend_from_slice(&PCM_FORMAT.to_le_bytes());
    out.extend_from_slice(&NUM_CHANNELS.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data chunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());
    for sample in samples {
        out.extend_from_slice(&sample.to_le_bytes());
    }

    out
}

// ---------------------------------------------------------------------------
// WavError
// ---------------------------------------------------------------------------

/// Reasons a byte buffer is not a container [`encode_wav`] could have made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WavError {
    #[error("buffer too short for a WAV header: {0} bytes")]
    TooShort(usize),

    #[error("expected tag {expected:?} at offset {offset}")]
    BadTag { offset: usize, expected: &'static str },

    #[error("unsupported format: {0}")]
    Unsupported(String),

    #[error("declared {field} size {declared} does not match actual {actual}")]
    SizeMismatch {
        field: &'static str,
        declared: u32,
        actual: u32,
    },
}

// ---------------------------------------------------------------------------
// WavHeader
// ---------------------------------------------------------------------------

/// The fields of a mono 16-bit PCM header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    /// Length of the data chunk in bytes.
    pub data_len: u32,
}

impl WavHeader {
    /// Validate and parse the canonical 44-byte header of `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<Self, WavError> {
        if bytes.len() < WAV_HEADER_LEN {
            return Err(WavError::TooShort(bytes.len()));
        }

        expect_tag(bytes, 0, "RIFF")?;
        expect_tag(bytes, 8, "WAVE")?;
        expect_tag(bytes, 12, "fmt ")?;
        expect_tag(bytes, 36, "data")?;

        let fmt_len = read_u32(bytes, 16);
        let format = read_u16(bytes, 20);
        let channels = read_u16(bytes, 22);
        let sample_rate = read_u32(bytes, 24);
        let byte_rate = read_u32(bytes, 28);
        let block_align = read_u16(bytes, 32);
        let bits_per_sample = read_u16(bytes, 34);
        let data_len = read_u32(bytes, 40);

        if fmt_len != FMT_CHUNK_LEN || format != PCM_FORMAT {
            return Err(WavError::Unsupported(format!(
                "fmt chunk of {fmt_len} bytes with format tag {format}"
            )));
        }
        if channels != NUM_CHANNELS || bits_per_sample != BITS_PER_SAMPLE {
            return Err(WavError::Unsupported(format!(
                "{channels} channel(s) at {bits_per_sample} bits"
            )));
        }
        if sample_rate == 0 {
            return Err(WavError::Unsupported("sample rate 0".into()));
        }
        if block_align != 2 || byte_rate != sample_rate.wrapping_mul(2) {
            return Err(WavError::Unsupported(format!(
                "block align {block_align}, byte rate {byte_rate}"
            )));
        }

        let actual_data = (bytes.len() - WAV_HEADER_LEN) as u32;
        if data_len != actual_data {
            return Err(WavError::SizeMismatch {
                field: "data",
                declared: data_len,
                actual: actual_data,
            });
        }
        let riff_len = read_u32(bytes, 4);
        if riff_len != actual_data.wrapping_add(36) {
            return Err(WavError::SizeMismatch {
                field: "RIFF",
                declared: riff_len,
                actual: actual_data.wrapping_add(36),
            });
        }
        if data_len % 2 != 0 {
            return Err(WavError::Unsupported("odd data chunk length".into()));
        }

        Ok(Self {
            sample_rate,
            channels,
            bits_per_sample,
            data_len,
        })
    }

    /// Number of samples in the data chunk.
    pub fn sample_count(&self) -> usize {
        self.data_len as usize / 2
    }

    /// Playback length.
    pub fn duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(self.sample_count() as f64 / self.sample_rate as f64)
    }
}

/// Parse `bytes` and return its header together with the decoded samples.
pub fn decode_wav(bytes: &[u8]) -> Result<(WavHeader, Vec<i16>), WavError> {
    let header = WavHeader::parse(bytes)?;
    let samples = bytes[WAV_HEADER_LEN..]
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    Ok((header, samples))
}

fn expect_tag(bytes: &[u8], offset: usize, expected: &'static str) -> Result<(), WavError> {
    if &bytes[offset..offset + 4] == expected.as_bytes() {
        Ok(())
    } else {
        Err(WavError::BadTag { offset, expected })
    }
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

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
