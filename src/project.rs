use image::{Rgba, RgbaImage};
use uuid::Uuid;

use crate::canvas::{CanvasError, validate_dimensions, view_to_canvas};
use crate::color::{ParsedHex, color_to_hex, parse_hex};
use crate::components::history::HistoryManager;
use crate::ops::{FillReport, FillRequest, flood_fill};
use crate::settings::AppSettings;
use crate::store::{PictureStore, SavedPicture, StoreError};

/// One painting session over a loaded photo.
///
/// Holds the pristine image, the snapshot history and the pick-then-click
/// interaction state. All mutation goes through `&mut self`.
pub struct PaintSession {
    pub id: Uuid,
    /// Display name (usually the source file name)
    pub name: String,
    pristine: RgbaImage,
    history: HistoryManager,
    /// Color armed for the next click
    selected: Option<Rgba<u8>>,
    /// True between picking a color and clicking the canvas
    click_mode: bool,
    pub tolerance: u32,
    thumbnail_max_size: u32,
    thumbnail_quality: u8,
}

impl PaintSession {
    pub fn new(name: &str, image: RgbaImage, settings: &AppSettings) -> Result<Self, CanvasError> {
        validate_dimensions(&image)?;
        let mut history = HistoryManager::new(settings.max_undo_steps);
        history.init(image.clone());
        crate::log_info!(
            "Session '{}' started on a {}x{} image",
            name,
            image.width(),
            image.height()
        );
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            pristine: image,
            history,
            selected: None,
            click_mode: false,
            tolerance: settings.tolerance,
            thumbnail_max_size: settings.thumbnail_max_size,
            thumbnail_quality: settings.thumbnail_quality,
        })
    }

    /// Arm a color for the next click. An empty string disarms.
    pub fn select_color(&mut self, hex: &str) -> ParsedHex {
        let parsed = parse_hex(hex);
        match parsed {
            ParsedHex::Empty => {
                self.selected = None;
                self.click_mode = false;
            }
            ParsedHex::Malformed => {
                crate::log_warn!("Color '{}' is not a 6-digit hex code, painting black", hex);
                self.arm(parsed.color());
            }
            ParsedHex::Parsed(color) => self.arm(color),
        }
        parsed
    }

    /// Arm an already-decoded color.
    pub fn arm(&mut self, color: Rgba<u8>) {
        self.selected = Some(color);
        self.click_mode = true;
    }

    pub fn selected_color(&self) -> Option<Rgba<u8>> {
        self.selected
    }

    pub fn is_click_mode(&self) -> bool {
        self.click_mode
    }

    /// Paint the armed color at a pixel, then disarm.
    ///
    /// Returns `None` (and changes nothing) unless a color is armed.
    pub fn paint_at(&mut self, x: u32, y: u32) -> Option<FillReport> {
        if !self.click_mode {
            return None;
        }
        let color = self.selected?;
        let report = self.fill(&FillRequest::new(x, y, color, self.tolerance));
        self.click_mode = false;
        self.selected = None;
        Some(report)
    }

    /// Paint at a point given in display coordinates of a scaled view.
    pub fn paint_at_view(&mut self, view_x: f32, view_y: f32, view_w: f32, view_h: f32) -> Option<FillReport> {
        let (w, h) = self.pristine.dimensions();
        let (x, y) = view_to_canvas(view_x, view_y, view_w, view_h, w, h)?;
        self.paint_at(x, y)
    }

    /// Fill a fresh copy of the active snapshot and commit it.
    pub fn fill(&mut self, req: &FillRequest) -> FillReport {
        let (next, report) = match self.history.current() {
            Some(current) => flood_fill(current, req),
            None => flood_fill(&self.pristine, req),
        };
        crate::log_info!(
            "Fill {} at ({}, {}) tol {}: {} px",
            color_to_hex(req.color),
            req.x,
            req.y,
            req.tolerance,
            report.filled
        );
        self.history.commit(next);
        report
    }

    /// Step back one snapshot. Returns `false` at the start of history.
    pub fn undo(&mut self) -> bool {
        self.history.undo().is_some()
    }

    /// Step forward one snapshot. Returns `false` at the end of history.
    pub fn redo(&mut self) -> bool {
        self.history.redo().is_some()
    }

    /// Back to the loaded photo with a single-entry history.
    pub fn reset(&mut self) {
        self.click_mode = false;
        self.selected = None;
        self.history.reset(self.pristine.clone());
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// The image currently shown.
    pub fn current(&self) -> &RgbaImage {
        self.history.current().unwrap_or(&self.pristine)
    }

    pub fn pristine(&self) -> &RgbaImage {
        &self.pristine
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    /// Persist the current image (with thumbnail) to the saved pictures store.
    pub fn save_to(&self, store: &mut PictureStore) -> Result<SavedPicture, StoreError> {
        store.save(self.current(), self.thumbnail_max_size, self.thumbnail_quality)
    }
}
