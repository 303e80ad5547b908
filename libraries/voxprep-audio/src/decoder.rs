/// Audio decoder implementation using Symphonia
use crate::error::{AudioError, Result};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer as InterleavedBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use voxprep_core::{AudioDecoder, SampleBuffer};

/// Audio decoder using Symphonia
///
/// Supports: MP3, AAC/M4A, FLAC, OGG/Vorbis, WAV, MKV (codec permitting).
///
/// Symphonia has no Opus codec, so WebM or Ogg recordings carrying Opus (the
/// usual browser `MediaRecorder` output) fail with `UnsupportedFormat`.
/// [`AudioDecoder::supports_media_type`] reports `false` when the media type
/// declares such a codec, e.g. `audio/webm;codecs=opus`.
///
/// Decodes a complete in-memory blob and keeps every source channel,
/// interleaved. Downmixing is left to [`ChannelMixer`](crate::ChannelMixer).
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaDecoder;

/// Codecs named in a `codecs=` parameter that Symphonia cannot decode
const UNDECODABLE_CODECS: &[&str] = &["opus"];

/// Demuxer and codec state for one decode call
///
/// Consumed by [`DecodeSession::read_all`], so the reader and codec are
/// dropped when decoding finishes or fails.
struct DecodeSession {
    /// Format reader (container parser)
    format: Box<dyn FormatReader>,
    /// Audio decoder
    decoder: Box<dyn Decoder>,
    /// Track ID
    track_id: u32,
    /// Sample rate from the container, if declared
    sample_rate: Option<u32>,
    /// Channel count from the container, if declared
    channels: Option<u16>,
}

impl SymphoniaDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self
    }

    /// Map a MIME type to the file extension Symphonia probes by
    ///
    /// Parameters such as `;codecs=opus` are ignored.
    pub fn extension_for(media_type: &str) -> Option<&'static str> {
        let essence = media_type.split(';').next().unwrap_or_default().trim();
        let subtype = essence
            .split_once('/')
            .map(|(_, subtype)| subtype)
            .unwrap_or(essence)
            .to_ascii_lowercase();

        match subtype.as_str() {
            "mpeg" | "mp3" | "mpeg3" | "x-mpeg-3" => Some("mp3"),
            "mp4" | "m4a" | "x-m4a" | "aac" | "aacp" => Some("m4a"),
            "ogg" | "vorbis" | "x-vorbis+ogg" => Some("ogg"),
            "wav" | "wave" | "x-wav" | "vnd.wave" => Some("wav"),
            "flac" | "x-flac" => Some("flac"),
            "webm" | "x-matroska" | "matroska" => Some("mkv"),
            _ => None,
        }
    }

    /// Whether the `codecs=` parameter names a codec Symphonia cannot decode
    fn declares_undecodable_codec(media_type: &str) -> bool {
        media_type
            .split(';')
            .skip(1)
            .filter_map(|param| param.split_once('='))
            .filter(|(key, _)| key.trim().eq_ignore_ascii_case("codecs"))
            .flat_map(|(_, value)| value.trim().trim_matches('"').split(','))
            .any(|codec| {
                UNDECODABLE_CODECS
                    .iter()
                    .any(|undecodable| codec.trim().eq_ignore_ascii_case(undecodable))
            })
    }
}

/// Decide whether a `next_packet` error ends the stream cleanly
fn end_of_stream(err: SymphoniaError, decoded_samples: usize) -> Result<()> {
    match err {
        SymphoniaError::IoError(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(()),
        SymphoniaError::ResetRequired => {
            // Chained streams change parameters mid-file; keep the first one
            tracing::warn!(
                decoded_samples,
                "Stream requires a decoder reset, dropping the remainder"
            );
            Ok(())
        }
        e => Err(AudioError::DecodeError(format!(
            "Error reading packet: {}",
            e
        ))),
    }
}

impl DecodeSession {
    /// Probe the blob and set up the codec for its first audio track
    fn open(data: &[u8], media_type: Option<&str>) -> Result<Self> {
        // Create media source
        let mss = MediaSourceStream::new(Box::new(Cursor::new(data.to_vec())), Default::default());

        // Create a hint to help the format registry guess the format
        let mut hint = Hint::new();
        if let Some(media_type) = media_type {
            hint.mime_type(media_type);
            if let Some(ext) = SymphoniaDecoder::extension_for(media_type) {
                hint.with_extension(ext);
            }
        }

        // Probe the media source
        let probed = symphonia::default::get_probe().format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;

        let format = probed.format;

        // First track with a real codec
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| AudioError::DecodeError("No audio tracks found".to_string()))?;

        let track_id = track.id;
        let sample_rate = track.codec_params.sample_rate;
        let channels = track.codec_params.channels.map(|c| c.count() as u16);

        // Create decoder
        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())?;

        Ok(Self {
            format,
            decoder,
            track_id,
            sample_rate,
            channels,
        })
    }

    /// Decode every packet of the selected track
    fn read_all(mut self) -> Result<SampleBuffer> {
        let mut samples = Vec::new();
        let mut skipped_packets = 0_usize;

        loop {
            // Get the next packet
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(e) => {
                    end_of_stream(e, samples.len())?;
                    break;
                }
            };

            // Skip packets that are not for the selected track
            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) => {
                    // A corrupt packet; the rest of the stream is still usable
                    tracing::warn!("Skipping undecodable packet: {}", e);
                    skipped_packets += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let spec = *decoded.spec();
            self.sample_rate.get_or_insert(spec.rate);
            self.channels.get_or_insert(spec.channels.count() as u16);

            if decoded.frames() == 0 {
                continue;
            }

            // Convert any sample format to interleaved f32
            let mut interleaved = InterleavedBuffer::<f32>::new(decoded.capacity() as u64, spec);
            interleaved.copy_interleaved_ref(decoded);
            samples.extend_from_slice(interleaved.samples());
        }

        let sample_rate = self
            .sample_rate
            .filter(|rate| *rate > 0)
            .ok_or_else(|| AudioError::DecodeError("Stream has no sample rate".to_string()))?;
        let channels = self.channels.unwrap_or(1).max(1);

        tracing::debug!(
            sample_rate,
            channels,
            samples = samples.len(),
            skipped_packets,
            "Decoded audio stream"
        );

        Ok(SampleBuffer::new(samples, sample_rate, channels))
    }
}

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&mut self, data: &[u8], media_type: Option<&str>) -> voxprep_core::Result<SampleBuffer> {
        let session = DecodeSession::open(data, media_type)?;
        Ok(session.read_all()?)
    }

    fn supports_media_type(&self, media_type: &str) -> bool {
        Self::extension_for(media_type).is_some() && !Self::declares_undecodable_codec(media_type)
    }
}
