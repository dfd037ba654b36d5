//! # Render Module
//!
//! Pulls frames and audio samples from a composed clip in time order and
//! encodes them into an output container through an external `ffmpeg`
//! process.

mod encoder;
mod session;

pub use encoder::{EncodedVideo, Renderer};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// External cancellation signal for a running render.
///
/// The encoder checks the token between frame pulls; once cancelled, the
/// render aborts, releases its resources, and removes any partial output. A
/// cancelled render cannot be resumed, only restarted.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Safe to call from any thread, any number of times.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token_is_sticky_and_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());

        token.cancel();
        assert!(clone.is_cancelled());

        token.cancel();
        assert!(token.is_cancelled());
    }
}
