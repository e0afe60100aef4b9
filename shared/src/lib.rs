//! HUD Link Shared Protocol Types
//!
//! This crate provides the line protocol spoken between the phone and the
//! heads-up display: byte-to-line framing and decoding of each line into a
//! [`HudMessage`].

pub mod codec;
pub mod message;

pub use codec::{CodecError, LineDecoder};
pub use message::{decode_line, DecodeError, HudMessage};

/// Link timing parameters
pub mod defaults {
    /// Initial delay before retrying a failed connection attempt
    pub const RECONNECT_DELAY_MS: u64 = 2000;

    /// Upper bound for the reconnect delay (5 minutes)
    pub const MAX_RECONNECT_DELAY_MS: u64 = 300_000;

    /// Size of the buffer used for each stream read
    pub const READ_BUFFER_SIZE: usize = 1024;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delays() {
        assert!(defaults::RECONNECT_DELAY_MS > 0);
        assert!(defaults::RECONNECT_DELAY_MS <= defaults::MAX_RECONNECT_DELAY_MS);
    }
}
