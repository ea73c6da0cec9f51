//! Windows desktop provider — entry point to the live UIA tree.

use std::rc::Rc;

use anyhow::{Context, Result};
use uiautomation::UIAutomation;

use deskctrl_core::{Desktop, UiElement};

use crate::element::UiaElement;

/// Desktop provider backed by Windows UI Automation.
///
/// Create one per call, on the apartment worker thread that will use it
/// (see [`crate::sta`]); COM objects must not cross threads. Nothing is
/// cached: every enumeration hits the live tree.
pub struct WindowsDesktop {
    uia: Rc<UIAutomation>,
}

impl WindowsDesktop {
    pub fn new() -> Result<Self> {
        let uia = UIAutomation::new().context("failed to initialize UI Automation")?;
        Ok(Self { uia: Rc::new(uia) })
    }
}

impl Desktop for WindowsDesktop {
    fn top_level_windows(&self) -> Result<Vec<Box<dyn UiElement>>> {
        let root = self
            .uia
            .get_root_element()
            .context("get desktop root element")?;
        let root = UiaElement::new(self.uia.clone(), root);
        root.children()
    }

    fn platform_name(&self) -> &str {
        "windows-uia"
    }
}
