use image::{Rgba, RgbaImage};
use std::collections::VecDeque;

use crate::color::colors_match;

/// Tolerance used when the caller has no preference.
pub const DEFAULT_TOLERANCE: u32 = 30;

/// A single click-to-paint action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FillRequest {
    pub x: u32,
    pub y: u32,
    pub color: Rgba<u8>,
    /// Maximum per-channel difference from the seed color.
    pub tolerance: u32,
}

impl FillRequest {
    pub fn new(x: u32, y: u32, color: Rgba<u8>, tolerance: u32) -> Self {
        Self { x, y, color, tolerance }
    }
}

/// What a fill touched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FillReport {
    /// Number of pixels overwritten.
    pub filled: usize,
    /// Inclusive (min_x, min_y, max_x, max_y) of the filled region.
    pub bounds: Option<(u32, u32, u32, u32)>,
}

impl FillReport {
    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    fn include(&mut self, x: u32, y: u32) {
        self.filled += 1;
        self.bounds = Some(match self.bounds {
            None => (x, y, x, y),
            Some((min_x, min_y, max_x, max_y)) => {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            }
        });
    }
}

/// Fill a copy of `image` and return it; the input is left untouched.
pub fn flood_fill(image: &RgbaImage, req: &FillRequest) -> (RgbaImage, FillReport) {
    let mut out = image.clone();
    let report = flood_fill_mut(&mut out, req);
    (out, report)
}

/// Flood fill on a caller-supplied working copy.
///
/// Replaces the 4-connected region of pixels within `req.tolerance` of the
/// seed's original color. Similarity is always measured against the seed
/// color sampled before any pixel is repainted. A seed outside the image is a
/// no-op, as is filling a region with its own exact color.
pub fn flood_fill_mut(image: &mut RgbaImage, req: &FillRequest) -> FillReport {
    let mut report = FillReport::default();
    let (width, height) = image.dimensions();
    if req.x >= width || req.y >= height {
        return report;
    }

    let target = *image.get_pixel(req.x, req.y);
    if colors_match(target, req.color, 0) {
        return report;
    }

    let w = width as usize;
    let mut visited = vec![false; w * height as usize];
    let mut queue: VecDeque<(i64, i64)> = VecDeque::new();
    queue.push_back((i64::from(req.x), i64::from(req.y)));

    // Neighbors are queued unconditionally; membership is decided on dequeue.
    while let Some((x, y)) = queue.pop_front() {
        if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
            continue;
        }
        let (ux, uy) = (x as u32, y as u32);
        let vi = uy as usize * w + ux as usize;
        if visited[vi] {
            continue;
        }
        if !colors_match(*image.get_pixel(ux, uy), target, req.tolerance) {
            continue;
        }

        visited[vi] = true;
        image.put_pixel(ux, uy, req.color);
        report.include(ux, uy);

        queue.push_back((x + 1, y));
        queue.push_back((x - 1, y));
        queue.push_back((x, y + 1));
        queue.push_back((x, y - 1));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn changed(a: &RgbaImage, b: &RgbaImage) -> Vec<(u32, u32)> {
        a.enumerate_pixels()
            .filter(|(x, y, p)| b.get_pixel(*x, *y) != *p)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    /// Left half dark gradient, a one-pixel light wall at x = 4, right half dark again.
    fn gradient_with_wall() -> RgbaImage {
        RgbaImage::from_fn(9, 5, |x, y| {
            if x == 4 {
                WHITE
            } else {
                let v = (x * 10 + y * 3) as u8;
                Rgba([v, v, v, 255])
            }
        })
    }

    #[test]
    fn test_uniform_fill_covers_everything() {
        let img = RgbaImage::from_pixel(4, 4, RED);
        let (out, report) = flood_fill(&img, &FillRequest::new(0, 0, BLUE, 0));
        assert_eq!(report.filled, 16);
        assert_eq!(report.bounds, Some((0, 0, 3, 3)));
        assert!(out.pixels().all(|p| *p == BLUE));
        // Source untouched
        assert!(img.pixels().all(|p| *p == RED));
    }

    #[test]
    fn test_isolated_center_pixel() {
        let mut img = RgbaImage::from_pixel(3, 3, BLACK);
        img.put_pixel(1, 1, WHITE);
        let (out, report) = flood_fill(&img, &FillRequest::new(1, 1, BLUE, 0));
        assert_eq!(report.filled, 1);
        assert_eq!(changed(&img, &out), vec![(1, 1)]);
        assert_eq!(*out.get_pixel(1, 1), BLUE);
    }

    #[test]
    fn test_same_color_is_noop() {
        let img = RgbaImage::from_pixel(5, 5, RED);
        let (out, report) = flood_fill(&img, &FillRequest::new(2, 2, RED, 0));
        assert!(report.is_empty());
        assert_eq!(report.bounds, None);
        assert_eq!(out, img);
    }

    #[test]
    fn test_out_of_bounds_seed_is_noop() {
        let img = RgbaImage::from_pixel(5, 5, RED);
        let (out, report) = flood_fill(&img, &FillRequest::new(5, 0, BLUE, 255));
        assert!(report.is_empty());
        assert_eq!(out, img);
        let (_, report) = flood_fill(&img, &FillRequest::new(0, u32::MAX, BLUE, 255));
        assert!(report.is_empty());
    }

    #[test]
    fn test_zero_area_buffer_is_noop() {
        let img = RgbaImage::new(0, 0);
        let (out, report) = flood_fill(&img, &FillRequest::new(0, 0, BLUE, 255));
        assert!(report.is_empty());
        assert_eq!(out.dimensions(), (0, 0));
    }

    #[test]
    fn test_max_tolerance_fills_any_image() {
        let img = gradient_with_wall();
        let (out, report) = flood_fill(&img, &FillRequest::new(0, 0, BLUE, 255));
        assert_eq!(report.filled, 45);
        assert!(out.pixels().all(|p| *p == BLUE));
    }

    #[test]
    fn test_diagonal_neighbors_are_not_connected() {
        // Checkerboard: only diagonal contact between same-colored pixels
        let img = RgbaImage::from_fn(4, 4, |x, y| if (x + y) % 2 == 0 { WHITE } else { BLACK });
        let (out, report) = flood_fill(&img, &FillRequest::new(0, 0, BLUE, 0));
        assert_eq!(report.filled, 1);
        assert_eq!(changed(&img, &out), vec![(0, 0)]);
    }

    #[test]
    fn test_wall_stops_the_fill() {
        let img = gradient_with_wall();
        let (out, report) = flood_fill(&img, &FillRequest::new(0, 0, BLUE, 60));
        assert!(!report.is_empty());
        for (x, y) in changed(&img, &out) {
            assert!(x < 4, "fill leaked across the wall at ({}, {})", x, y);
        }
        assert_eq!(*out.get_pixel(4, 0), WHITE);
    }

    #[test]
    fn test_similarity_is_measured_against_seed_not_neighbors() {
        // Each step differs by 10 from its neighbor; only the first three are within 20 of the seed.
        let img = RgbaImage::from_fn(6, 1, |x, _| {
            let v = (x * 10) as u8;
            Rgba([v, v, v, 255])
        });
        let (out, report) = flood_fill(&img, &FillRequest::new(0, 0, BLUE, 20));
        assert_eq!(report.filled, 3);
        assert_eq!(changed(&img, &out), vec![(0, 0), (1, 0), (2, 0)]);
    }

    #[test]
    fn test_fill_color_within_tolerance_of_target_terminates() {
        // Fill color is "similar" to the target; visited set must still bound the traversal.
        let img = RgbaImage::from_pixel(8, 8, Rgba([100, 100, 100, 255]));
        let (out, report) = flood_fill(&img, &FillRequest::new(3, 3, Rgba([105, 100, 100, 255]), 30));
        assert_eq!(report.filled, 64);
        assert!(out.pixels().all(|p| *p == Rgba([105, 100, 100, 255])));
    }

    #[test]
    fn test_every_changed_pixel_is_connected_to_seed() {
        let img = gradient_with_wall();
        let seed = (7, 2);
        let tolerance = 25;
        let (out, report) = flood_fill(&img, &FillRequest::new(seed.0, seed.1, BLUE, tolerance));
        let filled = changed(&img, &out);
        assert_eq!(filled.len(), report.filled);
        assert!(filled.len() <= (img.width() * img.height()) as usize);

        // Walk the filled set from the seed; everything must be reachable.
        let target = *img.get_pixel(seed.0, seed.1);
        let mut reached = vec![seed];
        let mut frontier = vec![seed];
        while let Some((x, y)) = frontier.pop() {
            for (nx, ny) in [(x + 1, y), (x.wrapping_sub(1), y), (x, y + 1), (x, y.wrapping_sub(1))] {
                if filled.contains(&(nx, ny)) && !reached.contains(&(nx, ny)) {
                    assert!(colors_match(*img.get_pixel(nx, ny), target, tolerance));
                    reached.push((nx, ny));
                    frontier.push((nx, ny));
                }
            }
        }
        assert_eq!(reached.len(), filled.len());
    }

    #[test]
    fn test_tolerance_monotonicity() {
        let img = gradient_with_wall();
        let mut previous: Vec<(u32, u32)> = Vec::new();
        for tolerance in [0, 5, 15, 30, 60, 120, 255] {
            let (out, _) = flood_fill(&img, &FillRequest::new(1, 1, BLUE, tolerance));
            let region = changed(&img, &out);
            for p in &previous {
                assert!(region.contains(p), "tolerance {} lost pixel {:?}", tolerance, p);
            }
            previous = region;
        }
    }

    #[test]
    fn test_flood_fill_mut_edits_in_place() {
        let mut img = RgbaImage::from_pixel(2, 2, RED);
        img.put_pixel(1, 1, BLACK);
        let report = flood_fill_mut(&mut img, &FillRequest::new(0, 0, BLUE, 0));
        assert_eq!(report.filled, 3);
        assert_eq!(report.bounds, Some((0, 0, 1, 1)));
        assert_eq!(*img.get_pixel(1, 1), BLACK);
        assert_eq!(*img.get_pixel(1, 0), BLUE);
    }
}
