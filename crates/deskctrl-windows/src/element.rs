//! Live-handle adapter: `uiautomation` elements behind the core traits.

use std::rc::Rc;

use anyhow::{Context, Result};
use uiautomation::patterns::{UIInvokePattern, UIValuePattern};
use uiautomation::{UIAutomation, UIElement};

use deskctrl_core::element::{InvokeHandle, ValueHandle};
use deskctrl_core::{ControlType, Rect, UiElement as CoreElement};

use crate::control_types::from_uia_id;

/// A call-scoped wrapper around one UIA element.
///
/// Holds a shared reference to the `UIAutomation` instance that produced it
/// so child walks can reuse the same tree walker. Everything lives and dies
/// on the apartment worker thread of a single call.
pub struct UiaElement {
    uia: Rc<UIAutomation>,
    inner: UIElement,
}

impl UiaElement {
    pub fn new(uia: Rc<UIAutomation>, inner: UIElement) -> Self {
        Self { uia, inner }
    }

    /// Direct children via the control view walker.
    ///
    /// Property errors terminate the sibling loop rather than failing the
    /// call: a vanished sibling means the tail of the list is gone too.
    pub(crate) fn child_elements(&self) -> Result<Vec<UIElement>> {
        let walker = self
            .uia
            .get_control_view_walker()
            .context("get control view walker")?;
        let mut children = Vec::new();
        let first = match walker.get_first_child(&self.inner) {
            Ok(c) => c,
            Err(_) => return Ok(children),
        };
        children.push(first.clone());
        let mut current = first;
        while let Ok(sibling) = walker.get_next_sibling(&current) {
            children.push(sibling.clone());
            current = sibling;
        }
        Ok(children)
    }
}

struct UiaInvoke(UIInvokePattern);

impl InvokeHandle for UiaInvoke {
    fn invoke(&self) -> Result<()> {
        self.0.invoke().context("InvokePattern::Invoke")?;
        Ok(())
    }
}

struct UiaValue(UIValuePattern);

impl ValueHandle for UiaValue {
    fn set_value(&self, value: &str) -> Result<()> {
        self.0.set_value(value).context("ValuePattern::SetValue")?;
        Ok(())
    }

    fn value(&self) -> Result<String> {
        let v = self.0.get_value().context("ValuePattern::Value")?;
        Ok(v)
    }
}

impl CoreElement for UiaElement {
    fn name(&self) -> String {
        self.inner.get_name().unwrap_or_default()
    }

    fn automation_id(&self) -> String {
        self.inner.get_automation_id().unwrap_or_default()
    }

    fn class_name(&self) -> String {
        self.inner.get_classname().unwrap_or_default()
    }

    fn control_type(&self) -> ControlType {
        self.inner
            .get_control_type()
            .ok()
            .map(|ct| from_uia_id(ct as i32))
            .unwrap_or(ControlType::Unknown)
    }

    fn bounding_rect(&self) -> Option<Rect> {
        self.inner.get_bounding_rectangle().ok().map(|r| Rect {
            x: r.get_left() as f64,
            y: r.get_top() as f64,
            width: r.get_width() as f64,
            height: r.get_height() as f64,
        })
    }

    fn is_enabled(&self) -> bool {
        self.inner.is_enabled().unwrap_or(true)
    }

    fn is_offscreen(&self) -> bool {
        self.inner.is_offscreen().unwrap_or(false)
    }

    fn children(&self) -> Result<Vec<Box<dyn CoreElement>>> {
        Ok(self
            .child_elements()?
            .into_iter()
            .map(|el| {
                Box::new(UiaElement::new(self.uia.clone(), el)) as Box<dyn CoreElement>
            })
            .collect())
    }

    fn try_invoke(&self) -> Option<Box<dyn InvokeHandle + '_>> {
        match self.inner.get_pattern::<UIInvokePattern>() {
            Ok(pattern) => Some(Box::new(UiaInvoke(pattern))),
            Err(_) => None,
        }
    }

    fn try_value(&self) -> Option<Box<dyn ValueHandle + '_>> {
        match self.inner.get_pattern::<UIValuePattern>() {
            Ok(pattern) => Some(Box::new(UiaValue(pattern))),
            Err(_) => None,
        }
    }

    fn focus(&self) -> Result<()> {
        self.inner.set_focus().context("UIElement::SetFocus")?;
        Ok(())
    }
}
