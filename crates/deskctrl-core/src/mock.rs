//! Mock desktop, OCR, capture, and clipboard for testing without a real
//! desktop environment.
//!
//! The mock element tree implements the same traits the Windows provider
//! implements, so resolver, chain, and assertion code under test is the real
//! code, not a reimplementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};

use crate::element::{
    ControlType, Desktop, InvokeHandle, Point, Rect, UiElement, ValueHandle,
};
use crate::ocr::{Clipboard, OcrBridge, OcrStatus, ScreenCapture};

/// One node of a scripted UI tree.
pub struct MockNode {
    pub name: String,
    pub automation_id: String,
    pub class_name: String,
    pub control_type: ControlType,
    pub rect: Option<Rect>,
    pub enabled: bool,
    pub offscreen: bool,
    supports_invoke: bool,
    supports_value: bool,
    value: Mutex<String>,
    invoked: AtomicUsize,
    focused: AtomicUsize,
    children: Vec<Arc<MockNode>>,
}

impl MockNode {
    pub fn new(control_type: ControlType, name: &str) -> Self {
        Self {
            name: name.into(),
            automation_id: String::new(),
            class_name: String::new(),
            control_type,
            rect: None,
            enabled: true,
            offscreen: false,
            supports_invoke: false,
            supports_value: false,
            value: Mutex::new(String::new()),
            invoked: AtomicUsize::new(0),
            focused: AtomicUsize::new(0),
            children: Vec::new(),
        }
    }

    pub fn automation_id(mut self, id: &str) -> Self {
        self.automation_id = id.into();
        self
    }

    pub fn class_name(mut self, class: &str) -> Self {
        self.class_name = class.into();
        self
    }

    pub fn rect(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.rect = Some(Rect { x, y, width, height });
        self
    }

    pub fn invokable(mut self) -> Self {
        self.supports_invoke = true;
        self
    }

    pub fn editable(mut self, initial: &str) -> Self {
        self.supports_value = true;
        *self.value.lock().unwrap() = initial.into();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn offscreen(mut self) -> Self {
        self.offscreen = true;
        self
    }

    pub fn child(mut self, child: MockNode) -> Self {
        self.children.push(Arc::new(child));
        self
    }

    pub fn into_element(self) -> MockElement {
        MockElement { node: Arc::new(self) }
    }

    /// Depth-first search by automation id, for test assertions.
    pub fn find(&self, automation_id: &str) -> Option<&MockNode> {
        if self.automation_id == automation_id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(automation_id))
    }

    pub fn invoke_count(&self) -> usize {
        self.invoked.load(Ordering::SeqCst)
    }

    pub fn focus_count(&self) -> usize {
        self.focused.load(Ordering::SeqCst)
    }

    pub fn value_text(&self) -> String {
        self.value.lock().unwrap().clone()
    }
}

/// Live-handle view over a [`MockNode`] tree.
pub struct MockElement {
    node: Arc<MockNode>,
}

impl MockElement {
    pub fn node(&self) -> &MockNode {
        &self.node
    }
}

struct MockInvoke<'a>(&'a MockNode);

impl InvokeHandle for MockInvoke<'_> {
    fn invoke(&self) -> Result<()> {
        self.0.invoked.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct MockValue<'a>(&'a MockNode);

impl ValueHandle for MockValue<'_> {
    fn set_value(&self, value: &str) -> Result<()> {
        *self.0.value.lock().unwrap() = value.into();
        Ok(())
    }

    fn value(&self) -> Result<String> {
        Ok(self.0.value.lock().unwrap().clone())
    }
}

impl UiElement for MockElement {
    fn name(&self) -> String {
        self.node.name.clone()
    }

    fn automation_id(&self) -> String {
        self.node.automation_id.clone()
    }

    fn class_name(&self) -> String {
        self.node.class_name.clone()
    }

    fn control_type(&self) -> ControlType {
        self.node.control_type
    }

    fn bounding_rect(&self) -> Option<Rect> {
        self.node.rect
    }

    fn is_enabled(&self) -> bool {
        self.node.enabled
    }

    fn is_offscreen(&self) -> bool {
        self.node.offscreen
    }

    fn children(&self) -> Result<Vec<Box<dyn UiElement>>> {
        Ok(self
            .node
            .children
            .iter()
            .map(|c| Box::new(MockElement { node: c.clone() }) as Box<dyn UiElement>)
            .collect())
    }

    fn try_invoke(&self) -> Option<Box<dyn InvokeHandle + '_>> {
        if self.node.supports_invoke {
            Some(Box::new(MockInvoke(&self.node)))
        } else {
            None
        }
    }

    fn try_value(&self) -> Option<Box<dyn ValueHandle + '_>> {
        if self.node.supports_value {
            Some(Box::new(MockValue(&self.node)))
        } else {
            None
        }
    }

    fn focus(&self) -> Result<()> {
        self.node.focused.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Scripted desktop with a fixed set of top-level windows.
#[derive(Default)]
pub struct MockDesktop {
    windows: Vec<Arc<MockNode>>,
}

impl MockDesktop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn window(mut self, window: MockNode) -> Self {
        self.windows.push(Arc::new(window));
        self
    }
}

impl Desktop for MockDesktop {
    fn top_level_windows(&self) -> Result<Vec<Box<dyn UiElement>>> {
        Ok(self
            .windows
            .iter()
            .map(|w| Box::new(MockElement { node: w.clone() }) as Box<dyn UiElement>)
            .collect())
    }

    fn platform_name(&self) -> &str {
        "mock"
    }
}

/// Scripted OCR bridge: text placements plus an optional forced failure.
#[derive(Default)]
pub struct MockOcr {
    screen_text: String,
    placements: HashMap<String, Vec<Point>>,
    failing: bool,
}

impl MockOcr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_screen_text(mut self, text: &str) -> Self {
        self.screen_text = text.into();
        self
    }

    /// Add the next occurrence of `text` at `point`.
    pub fn with_text_at(mut self, text: &str, point: Point) -> Self {
        self.placements.entry(text.into()).or_default().push(point);
        self
    }

    /// Every call reports an engine failure.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }
}

impl OcrBridge for MockOcr {
    fn extract_text_from_region(
        &self,
        _x: i32,
        _y: i32,
        _width: i32,
        _height: i32,
    ) -> (String, OcrStatus) {
        self.extract_text_from_screen()
    }

    fn extract_text_from_screen(&self) -> (String, OcrStatus) {
        if self.failing {
            return (String::new(), OcrStatus::ENGINE_ERROR);
        }
        (self.screen_text.clone(), OcrStatus::OK)
    }

    fn find_text_on_screen(&self, text: &str) -> (bool, OcrStatus) {
        if self.failing {
            return (false, OcrStatus::ENGINE_ERROR);
        }
        let found = self.placements.contains_key(text) || self.screen_text.contains(text);
        (found, OcrStatus::OK)
    }

    fn text_coordinates(&self, text: &str, occurrence: u32) -> (Option<Point>, OcrStatus) {
        if self.failing {
            return (None, OcrStatus::ENGINE_ERROR);
        }
        let point = self
            .placements
            .get(text)
            .and_then(|points| points.get(occurrence.saturating_sub(1) as usize))
            .copied();
        (point, OcrStatus::OK)
    }
}

/// Scripted screen capture.
#[derive(Default)]
pub struct MockCapture {
    png: Option<Vec<u8>>,
}

impl MockCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_png(mut self, bytes: Vec<u8>) -> Self {
        self.png = Some(bytes);
        self
    }
}

impl ScreenCapture for MockCapture {
    fn capture_screen(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.png.clone())
    }

    fn capture_region(&self, _x: i32, _y: i32, _width: i32, _height: i32) -> Result<Option<Vec<u8>>> {
        Ok(self.png.clone())
    }
}

/// Scripted clipboard.
pub struct MockClipboard {
    text: Option<String>,
}

impl MockClipboard {
    pub fn with_text(text: &str) -> Self {
        Self { text: Some(text.into()) }
    }

    pub fn unavailable() -> Self {
        Self { text: None }
    }
}

impl Clipboard for MockClipboard {
    fn read_text(&self) -> Result<String> {
        match &self.text {
            Some(t) => Ok(t.clone()),
            None => bail!("clipboard unavailable"),
        }
    }
}
