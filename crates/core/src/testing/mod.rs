//! Testing utilities and mock implementations.
//!
//! The transcoder is the only out-of-process collaborator, so it is the only
//! capability with a mock. Image conversion is fast and deterministic and runs
//! for real in tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use convertino_core::testing::{fixtures, MockTranscoder};
//!
//! let transcoder = Arc::new(MockTranscoder::new());
//! let backends = Backends::with_transcoder(transcoder.clone());
//! let png = fixtures::rgba_png(16, 16);
//! ```

mod mock_transcoder;

pub use mock_transcoder::MockTranscoder;

/// Test fixtures and helper functions.
pub mod fixtures {
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    /// Encodes a red RGBA png whose left half is fully transparent.
    pub fn rgba_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([255, 0, 0, 255])
            }
        });
        let mut bytes = Vec::new();
        // Encoding into memory cannot fail for a valid RGBA buffer.
        let _ = img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png);
        bytes
    }
}
