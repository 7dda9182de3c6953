//! Inventory item recognition
//!
//! Identifies slot contents by template matching labelled item images
//! against the slot region of a screenshot.

use std::path::Path;

use image::{GrayImage, RgbaImage};
use imageproc::template_matching::{find_extremes, match_template, MatchTemplateMethod};

use super::inventory::{InventoryLayout, InventorySlot};
use super::{ItemRecognizer, VisionError, EMPTY_SLOT};

/// Template-matching item recognizer
pub struct TemplateRecognizer {
    /// Grid the slots are cut from
    layout: InventoryLayout,
    /// Labelled item templates
    templates: Vec<(String, GrayImage)>,
    /// Highest normalized squared error still counted as a match
    max_error: f32,
    /// Current screenshot
    frame: Option<GrayImage>,
}

impl TemplateRecognizer {
    /// Create a recognizer for the given grid
    pub fn new(layout: InventoryLayout) -> Self {
        Self {
            layout,
            templates: Vec::new(),
            max_error: 0.1,
            frame: None,
        }
    }

    /// Set the match threshold
    pub fn with_max_error(mut self, max_error: f32) -> Self {
        self.max_error = max_error;
        self
    }

    /// The grid slots are cut from
    pub fn layout(&self) -> &InventoryLayout {
        &self.layout
    }

    /// Number of loaded templates
    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    /// Register an item template
    pub fn add_template(&mut self, label: impl Into<String>, template: &RgbaImage) {
        self.templates
            .push((label.into(), image::imageops::grayscale(template)));
    }

    /// Load every PNG in a directory, labelled by file stem
    pub fn load_templates(&mut self, dir: impl AsRef<Path>) -> Result<usize, VisionError> {
        let entries = std::fs::read_dir(dir.as_ref())
            .map_err(|e| VisionError::TemplateLoadError(e.to_string()))?;

        let mut loaded = 0;
        for entry in entries {
            let path = entry
                .map_err(|e| VisionError::TemplateLoadError(e.to_string()))?
                .path();

            if path.extension().and_then(|ext| ext.to_str()) != Some("png") {
                continue;
            }
            let Some(label) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };

            let template = image::open(&path)
                .map_err(|e| VisionError::TemplateLoadError(format!("{}: {}", path.display(), e)))?
                .to_luma8();
            self.templates.push((label.to_string(), template));
            loaded += 1;
        }

        log::info!("Loaded {} item templates", loaded);
        Ok(loaded)
    }

    /// Replace the current screenshot
    pub fn update_frame(&mut self, frame: &RgbaImage) -> Result<(), VisionError> {
        let (width, height) = frame.dimensions();
        let (right, bottom) = self.layout.extent();
        if width < right || height < bottom {
            return Err(VisionError::FrameTooSmall { width, height });
        }

        self.frame = Some(image::imageops::grayscale(frame));
        Ok(())
    }

    /// Best-matching template label and its error for a slot region
    fn best_match(&self, region: &GrayImage) -> Option<(&str, f32)> {
        let (width, height) = region.dimensions();

        self.templates
            .iter()
            .filter(|(_, template)| template.width() <= width && template.height() <= height)
            .filter_map(|(label, template)| {
                let scores = match_template(
                    region,
                    template,
                    MatchTemplateMethod::SumOfSquaredErrorsNormalized,
                );
                let error = find_extremes(&scores).min_value;
                error.is_finite().then_some((label.as_str(), error))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

impl ItemRecognizer for TemplateRecognizer {
    fn identify(&self, slot: InventorySlot) -> Result<String, VisionError> {
        let (x, y, w, h) = self.layout.slot_rect(slot)?;
        let frame = self.frame.as_ref().ok_or(VisionError::NoFrame)?;
        let region = image::imageops::crop_imm(frame, x, y, w, h).to_image();

        let label = match self.best_match(&region) {
            Some((label, error)) if error <= self.max_error => {
                log::trace!("Slot ({}, {}) matched {} ({:.3})", slot.row, slot.column, label, error);
                label
            }
            _ => EMPTY_SLOT,
        };

        Ok(label.to_string())
    }
}
