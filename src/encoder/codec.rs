//! Container/codec candidates and negotiation
//!
//! The recorder probes a fixed preference list and takes the first
//! combination the platform encoder reports as supported.

use serde::{Deserialize, Serialize};

use super::traits::EncoderFactory;

/// A container/codec combination the recorder can ask the encoder for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    /// VP9 in WebM
    Vp9,
    /// VP8 in WebM
    Vp8,
    /// WebM with the platform's default codec
    Webm,
    /// MP4 fallback
    Mp4,
}

impl Codec {
    /// Preferred-to-fallback probe order.
    pub const PROBE_ORDER: [Codec; 4] = [Codec::Vp9, Codec::Vp8, Codec::Webm, Codec::Mp4];

    /// MIME type used to configure the encoder and type the final blob
    pub fn mime_type(&self) -> &'static str {
        match self {
            Codec::Vp9 => "video/webm;codecs=vp9",
            Codec::Vp8 => "video/webm;codecs=vp8",
            Codec::Webm => "video/webm",
            Codec::Mp4 => "video/mp4",
        }
    }

    /// File extension for the produced artifact
    pub fn extension(&self) -> &'static str {
        match self {
            Codec::Vp9 | Codec::Vp8 | Codec::Webm => "webm",
            Codec::Mp4 => "mp4",
        }
    }
}

/// Pick the first candidate the factory supports, or `None` when the
/// environment cannot encode any of them.
pub fn negotiate(factory: &dyn EncoderFactory) -> Option<Codec> {
    let chosen = Codec::PROBE_ORDER
        .iter()
        .copied()
        .find(|codec| factory.supports(*codec));

    match chosen {
        Some(codec) => tracing::debug!("negotiated encoder codec: {}", codec.mime_type()),
        None => tracing::warn!("no supported codec among encoder candidates"),
    }

    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::MediaStream;
    use crate::encoder::traits::{EncoderError, EncoderEvent, EncoderSettings, MediaEncoder};
    use tokio::sync::mpsc;

    struct ProbeOnlyFactory {
        supported: Vec<Codec>,
    }

    impl EncoderFactory for ProbeOnlyFactory {
        fn supports(&self, codec: Codec) -> bool {
            self.supported.contains(&codec)
        }

        fn create(
            &self,
            _stream: &MediaStream,
            _settings: EncoderSettings,
            _events: mpsc::UnboundedSender<EncoderEvent>,
        ) -> Result<Box<dyn MediaEncoder>, EncoderError> {
            Err(EncoderError::StartFailed("probe-only factory".to_string()))
        }
    }

    #[test]
    fn prefers_vp9_when_available() {
        let factory = ProbeOnlyFactory {
            supported: Codec::PROBE_ORDER.to_vec(),
        };
        assert_eq!(negotiate(&factory), Some(Codec::Vp9));
    }

    #[test]
    fn falls_back_in_declared_order() {
        let factory = ProbeOnlyFactory {
            supported: vec![Codec::Mp4, Codec::Webm],
        };
        assert_eq!(negotiate(&factory), Some(Codec::Webm));
    }

    #[test]
    fn yields_none_when_nothing_is_supported() {
        let factory = ProbeOnlyFactory { supported: vec![] };
        assert_eq!(negotiate(&factory), None);
    }

    #[test]
    fn webm_candidates_share_the_webm_extension() {
        assert_eq!(Codec::Vp9.extension(), "webm");
        assert_eq!(Codec::Vp8.extension(), "webm");
        assert_eq!(Codec::Webm.extension(), "webm");
        assert_eq!(Codec::Mp4.extension(), "mp4");
    }
}
