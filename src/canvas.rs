use image::RgbaImage;

// ============================================================================
// CANVAS — pixel buffer validation and view-space mapping
// ============================================================================

/// Maximum supported canvas dimension in pixels (per axis).
/// Prevents memory exhaustion from oversized or crafted inputs.
pub const MAX_CANVAS_DIM: u32 = 32_768;

/// Error type for canvas construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasError {
    EmptyCanvas { width: u32, height: u32 },
    TooLarge { width: u32, height: u32 },
}

impl std::fmt::Display for CanvasError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CanvasError::EmptyCanvas { width, height } => {
                write!(f, "Canvas has no pixels ({}x{})", width, height)
            }
            CanvasError::TooLarge { width, height } => write!(
                f,
                "Canvas {}x{} exceeds the {} pixel limit per axis",
                width, height, MAX_CANVAS_DIM
            ),
        }
    }
}

impl std::error::Error for CanvasError {}

/// Reject zero-area and oversized buffers before they enter a session.
pub fn validate_dimensions(image: &RgbaImage) -> Result<(), CanvasError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(CanvasError::EmptyCanvas { width, height });
    }
    if width > MAX_CANVAS_DIM || height > MAX_CANVAS_DIM {
        return Err(CanvasError::TooLarge { width, height });
    }
    Ok(())
}

/// Map a point inside a scaled display rectangle to a canvas pixel.
///
/// `view_w`/`view_h` are the on-screen size of the canvas; the result is
/// floor(view * canvas / view_size). Returns `None` for points outside the
/// view or a degenerate view.
pub fn view_to_canvas(
    view_x: f32,
    view_y: f32,
    view_w: f32,
    view_h: f32,
    canvas_w: u32,
    canvas_h: u32,
) -> Option<(u32, u32)> {
    if !(view_w > 0.0 && view_h > 0.0) || canvas_w == 0 || canvas_h == 0 {
        return None;
    }
    let x = (view_x * (canvas_w as f32 / view_w)).floor();
    let y = (view_y * (canvas_h as f32 / view_h)).floor();
    if !(x >= 0.0 && y >= 0.0) || x >= canvas_w as f32 || y >= canvas_h as f32 {
        return None;
    }
    Some((x as u32, y as u32))
}

/// Bytes held by one RGBA8 buffer.
pub fn buffer_size(image: &RgbaImage) -> usize {
    image.as_raw().len()
}
