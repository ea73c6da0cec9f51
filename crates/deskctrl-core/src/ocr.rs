//! Consumed collaborator interfaces: OCR bridge, screen capture, clipboard.
//!
//! The engines behind these live elsewhere (a Tesseract adapter in the
//! Windows crate, scriptable fakes in [`crate::mock`]); the core treats them
//! uniformly with UIA through these traits. Implementations are constructed
//! and injected by the composition root — never a lazy static.

use anyhow::Result;

use crate::element::Point;

/// Engine status code: 0 is success, anything else is an engine/model
/// failure. A successful status can still carry an empty/none payload
/// ("searched fine, found nothing").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OcrStatus(pub i32);

impl OcrStatus {
    pub const OK: OcrStatus = OcrStatus(0);
    /// Generic engine failure.
    pub const ENGINE_ERROR: OcrStatus = OcrStatus(1);

    pub fn is_ok(self) -> bool {
        self.0 == 0
    }
}

/// Text-recognition bridge consumed by the locator fallback chain.
pub trait OcrBridge: Send + Sync {
    /// Recognize all text within a screen region.
    fn extract_text_from_region(&self, x: i32, y: i32, width: i32, height: i32)
        -> (String, OcrStatus);

    /// Recognize all text on the screen.
    fn extract_text_from_screen(&self) -> (String, OcrStatus);

    /// Whether the given text is currently visible anywhere on screen.
    fn find_text_on_screen(&self, text: &str) -> (bool, OcrStatus);

    /// Screen coordinates of the Nth occurrence (1-based) of the given text.
    /// `None` with an OK status means the text was not found.
    fn text_coordinates(&self, text: &str, occurrence: u32) -> (Option<Point>, OcrStatus);
}

/// Screen capture collaborator feeding the OCR adapter. `Ok(None)` means
/// capture is not supported on this host.
pub trait ScreenCapture: Send + Sync {
    /// PNG bytes of the primary screen.
    fn capture_screen(&self) -> Result<Option<Vec<u8>>>;

    /// PNG bytes of a screen region.
    fn capture_region(&self, x: i32, y: i32, width: i32, height: i32) -> Result<Option<Vec<u8>>>;
}

/// Clipboard read access, consumed by assertion evaluation.
pub trait Clipboard: Send + Sync {
    fn read_text(&self) -> Result<String>;
}
