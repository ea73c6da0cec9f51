//! Tesseract-backed OCR bridge.
//!
//! Thin adapter: capture the screen, hand the PNG to Tesseract through a
//! temp file, and translate word boxes into the `(value, status)` contract
//! the fallback chain consumes. The engine and its models stay external;
//! construction is explicit and injected, never a hidden static.

use std::collections::HashMap;
use std::io::Write;

use anyhow::{bail, Context, Result};
use rusty_tesseract::{image_to_data, image_to_string, Args, Image};

use deskctrl_core::{OcrBridge, OcrStatus, Point, ScreenCapture};

/// One recognized word with its screen box.
struct Word {
    text: String,
    left: i32,
    top: i32,
    width: i32,
    height: i32,
}

/// OCR bridge running the system Tesseract over captured screen images.
pub struct TesseractOcr {
    capture: Box<dyn ScreenCapture>,
    lang: String,
}

impl TesseractOcr {
    pub fn new(capture: Box<dyn ScreenCapture>) -> Self {
        Self { capture, lang: "eng".into() }
    }

    pub fn with_language(mut self, lang: &str) -> Self {
        self.lang = lang.into();
        self
    }

    fn args(&self) -> Args {
        Args {
            lang: self.lang.clone(),
            config_variables: HashMap::new(),
            dpi: Some(150),
            psm: Some(6),
            oem: Some(3),
        }
    }

    /// Write PNG bytes to a temp file and load them as a Tesseract image.
    fn load_image(&self, png: &[u8]) -> Result<(tempfile::NamedTempFile, Image)> {
        let mut file = tempfile::Builder::new()
            .prefix("deskctrl-ocr-")
            .suffix(".png")
            .tempfile()
            .context("create OCR temp file")?;
        file.write_all(png).context("write OCR temp file")?;
        let path = file
            .path()
            .to_str()
            .context("OCR temp path is not valid UTF-8")?
            .to_owned();
        let image = Image::from_path(&path)
            .map_err(|e| anyhow::anyhow!("load OCR image: {e:?}"))?;
        Ok((file, image))
    }

    fn screen_png(&self) -> Result<Vec<u8>> {
        match self.capture.capture_screen()? {
            Some(png) => Ok(png),
            None => bail!("screen capture unavailable on this host"),
        }
    }

    fn region_png(&self, x: i32, y: i32, width: i32, height: i32) -> Result<Vec<u8>> {
        match self.capture.capture_region(x, y, width, height)? {
            Some(png) => Ok(png),
            None => bail!("region capture unavailable on this host"),
        }
    }

    fn text_of(&self, png: &[u8]) -> Result<String> {
        let (_guard, image) = self.load_image(png)?;
        let text = image_to_string(&image, &self.args())
            .map_err(|e| anyhow::anyhow!("tesseract text extraction: {e:?}"))?;
        Ok(text)
    }

    fn words_of(&self, png: &[u8]) -> Result<Vec<Word>> {
        let (_guard, image) = self.load_image(png)?;
        let data = image_to_data(&image, &self.args())
            .map_err(|e| anyhow::anyhow!("tesseract data extraction: {e:?}"))?;
        Ok(data
            .data
            .iter()
            .filter(|d| d.conf > 0.0 && !d.text.trim().is_empty())
            .map(|d| Word {
                text: d.text.trim().to_string(),
                left: d.left,
                top: d.top,
                width: d.width,
                height: d.height,
            })
            .collect())
    }
}

impl OcrBridge for TesseractOcr {
    fn extract_text_from_region(
        &self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> (String, OcrStatus) {
        match self.region_png(x, y, width, height).and_then(|png| self.text_of(&png)) {
            Ok(text) => (text, OcrStatus::OK),
            Err(e) => {
                log::warn!("ocr region extraction failed: {e:#}");
                (String::new(), OcrStatus::ENGINE_ERROR)
            }
        }
    }

    fn extract_text_from_screen(&self) -> (String, OcrStatus) {
        match self.screen_png().and_then(|png| self.text_of(&png)) {
            Ok(text) => (text, OcrStatus::OK),
            Err(e) => {
                log::warn!("ocr screen extraction failed: {e:#}");
                (String::new(), OcrStatus::ENGINE_ERROR)
            }
        }
    }

    fn find_text_on_screen(&self, text: &str) -> (bool, OcrStatus) {
        match self.screen_png().and_then(|png| self.words_of(&png)) {
            Ok(words) => (!occurrences(&words, text).is_empty(), OcrStatus::OK),
            Err(e) => {
                log::warn!("ocr text search failed: {e:#}");
                (false, OcrStatus::ENGINE_ERROR)
            }
        }
    }

    fn text_coordinates(&self, text: &str, occurrence: u32) -> (Option<Point>, OcrStatus) {
        match self.screen_png().and_then(|png| self.words_of(&png)) {
            Ok(words) => {
                let hits = occurrences(&words, text);
                let nth = hits.get(occurrence.saturating_sub(1) as usize).copied();
                (nth, OcrStatus::OK)
            }
            Err(e) => {
                log::warn!("ocr coordinate lookup failed: {e:#}");
                (None, OcrStatus::ENGINE_ERROR)
            }
        }
    }
}

/// Find every occurrence of `needle` as a consecutive word sequence, in
/// reading order, returning the center of each match's bounding box.
fn occurrences(words: &[Word], needle: &str) -> Vec<Point> {
    let target: Vec<String> =
        needle.split_whitespace().map(str::to_lowercase).collect();
    if target.is_empty() {
        return Vec::new();
    }
    let mut points = Vec::new();
    for start in 0..words.len() {
        let window = &words[start..];
        if window.len() < target.len() {
            break;
        }
        let matched = target
            .iter()
            .zip(window)
            .all(|(want, word)| word.text.to_lowercase() == *want);
        if matched {
            let run = &window[..target.len()];
            let left = run.iter().map(|w| w.left).min().unwrap_or(0);
            let top = run.iter().map(|w| w.top).min().unwrap_or(0);
            let right = run.iter().map(|w| w.left + w.width).max().unwrap_or(0);
            let bottom = run.iter().map(|w| w.top + w.height).max().unwrap_or(0);
            points.push(Point { x: (left + right) / 2, y: (top + bottom) / 2 });
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, left: i32) -> Word {
        Word { text: text.into(), left, top: 10, width: 40, height: 20 }
    }

    #[test]
    fn single_word_occurrences() {
        let words = vec![word("Save", 0), word("As", 50), word("Save", 200)];
        let hits = occurrences(&words, "save");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0], Point { x: 20, y: 20 });
        assert_eq!(hits[1], Point { x: 220, y: 20 });
    }

    #[test]
    fn multi_word_sequence() {
        let words = vec![word("Save", 0), word("As", 50), word("Cancel", 120)];
        let hits = occurrences(&words, "Save As");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0], Point { x: 45, y: 20 });
        assert!(occurrences(&words, "As Cancel Save").is_empty());
    }

    #[test]
    fn empty_needle_finds_nothing() {
        let words = vec![word("Save", 0)];
        assert!(occurrences(&words, "  ").is_empty());
    }

    #[test]
    fn capture_unavailable_is_engine_error() {
        struct NoCapture;
        impl ScreenCapture for NoCapture {
            fn capture_screen(&self) -> anyhow::Result<Option<Vec<u8>>> {
                Ok(None)
            }
            fn capture_region(
                &self,
                _x: i32,
                _y: i32,
                _w: i32,
                _h: i32,
            ) -> anyhow::Result<Option<Vec<u8>>> {
                Ok(None)
            }
        }
        let ocr = TesseractOcr::new(Box::new(NoCapture));
        let (text, status) = ocr.extract_text_from_screen();
        assert!(text.is_empty());
        assert!(!status.is_ok());
        let (point, status) = ocr.text_coordinates("Save", 1);
        assert!(point.is_none());
        assert!(!status.is_ok());
    }
}
