//! Encoding seam: codec negotiation and the encoder event contract.

pub mod codec;
pub mod traits;

pub use codec::{negotiate, Codec};
pub use traits::{EncoderError, EncoderEvent, EncoderFactory, EncoderSettings, MediaEncoder};
