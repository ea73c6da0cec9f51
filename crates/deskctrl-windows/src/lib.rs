//! deskctrl-windows — Windows UI Automation provider for deskctrl.
//!
//! Uses the `uiautomation` crate to interact with Windows accessibility APIs.
//! All Windows-specific code is gated behind `#[cfg(windows)]`.

#[cfg(windows)]
mod control_types;
#[cfg(windows)]
mod desktop;
#[cfg(windows)]
mod element;
#[cfg(windows)]
mod ocr;
#[cfg(windows)]
mod screenshot;
#[cfg(windows)]
pub mod sta;

#[cfg(windows)]
pub use desktop::WindowsDesktop;
#[cfg(windows)]
pub use element::UiaElement;
#[cfg(windows)]
pub use ocr::TesseractOcr;
#[cfg(windows)]
pub use screenshot::GdiCapture;

/// Run a closure against a freshly created Windows desktop provider on a
/// dedicated apartment-bound worker thread.
///
/// COM UI Automation objects are apartment-affine, and the live tree must be
/// re-resolved per call anyway, so every call gets its own short-lived
/// worker with its own provider. Returns `Err` on non-Windows hosts.
pub fn with_desktop<T, F>(f: F) -> anyhow::Result<T>
where
    F: FnOnce(&dyn deskctrl_core::Desktop) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    #[cfg(windows)]
    {
        sta::run(move || {
            let desktop = desktop::WindowsDesktop::new()?;
            f(&desktop)
        })
    }
    #[cfg(not(windows))]
    {
        let _ = f;
        anyhow::bail!("the Windows UIA provider is only available on Windows")
    }
}
