//! deskctrl-core — Contract-driven desktop-automation core.
//!
//! A locator contract declares an application's windows, controls (each with
//! up to three locator strategies: UIA selector, OCR text, fixed offset),
//! and assertions. The core validates the contract once at load, then
//! resolves each tool call from scratch against the live accessibility tree:
//! window resolution, exactly-one-or-fail element resolution, capability-
//! gated actions, and the UIA → OCR → fallbackCoords chain.
//!
//! Platform providers (deskctrl-windows) implement the `UiElement`/`Desktop`
//! traits; everything above those traits is platform-neutral and tested
//! against the scripted tree in [`mock`].

pub mod apps;
pub mod assertions;
pub mod chain;
pub mod contract;
pub mod element;
pub mod limits;
pub mod mock;
pub mod ocr;
pub mod resolver;
pub mod result;
pub mod selector;
pub mod validate;
pub mod window;

pub use chain::{Attempt, ChainResolution, LocatorStrategy, ResolvedTarget};
pub use contract::{load_contract, Contract};
pub use element::{ControlType, Desktop, ElementInfo, Point, Rect, UiElement};
pub use limits::Limits;
pub use ocr::{Clipboard, OcrBridge, OcrStatus, ScreenCapture};
pub use result::{ActionResult, TreeNode};
pub use selector::Selector;
pub use validate::{validate, ValidationReport};
pub use window::{find_unique_window, WindowOutcome, WindowQuery};
