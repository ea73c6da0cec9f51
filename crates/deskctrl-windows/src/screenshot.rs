//! Screen capture using Windows GDI.
//!
//! Stub implementation — returns `None` for now. A full implementation would
//! use `GetDC`/`BitBlt`/`CreateDIBSection` to capture the screen and encode
//! to PNG.

use anyhow::Result;

use deskctrl_core::ScreenCapture;

/// GDI-based screen capture.
///
/// Currently reports capture as unsupported (`Ok(None)`); the OCR adapter
/// degrades to an engine-failure status when fed no image.
pub struct GdiCapture;

impl GdiCapture {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GdiCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenCapture for GdiCapture {
    fn capture_screen(&self) -> Result<Option<Vec<u8>>> {
        log::debug!("screen capture not yet implemented on Windows");
        Ok(None)
    }

    fn capture_region(&self, _x: i32, _y: i32, _width: i32, _height: i32) -> Result<Option<Vec<u8>>> {
        log::debug!("region capture not yet implemented on Windows");
        Ok(None)
    }
}
