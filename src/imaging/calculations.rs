//! Pure calculation functions for canvas placement.
//!
//! All functions here are pure and testable without any I/O or images.

/// Where a scaled source image lands on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Scaled source width.
    pub width: u32,
    /// Scaled source height.
    pub height: u32,
    /// Left offset on the canvas.
    pub x: u32,
    /// Top offset on the canvas.
    pub y: u32,
}

/// Calculate the size of a source scaled uniformly to fit inside a target.
///
/// The scale factor is `min(target_w / src_w, target_h / src_h)`, so one edge
/// matches the target exactly and the other fits inside it. Each edge is
/// rounded to the nearest pixel and kept within `1..=target`.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height), both non-zero
/// * `target` - Canvas dimensions (width, height), both non-zero
///
/// # Returns
/// * `(width, height)` - Scaled dimensions, never larger than the target
///
/// # Examples
/// ```
/// # use thumbfit::imaging::calculate_fit_dimensions;
/// // 4000x3000 landscape into 112x112 → 112x84
/// assert_eq!(calculate_fit_dimensions((4000, 3000), (112, 112)), (112, 84));
///
/// // Small sources are enlarged until an edge touches the canvas
/// assert_eq!(calculate_fit_dimensions((56, 28), (112, 112)), (112, 56));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let ratio_w = tgt_w as f64 / src_w as f64;
    let ratio_h = tgt_h as f64 / src_h as f64;
    let ratio = ratio_w.min(ratio_h);

    let w = ((src_w as f64 * ratio).round() as u32).clamp(1, tgt_w);
    let h = ((src_h as f64 * ratio).round() as u32).clamp(1, tgt_h);
    (w, h)
}

/// Calculate the scaled size and centered offset of a source on the canvas.
///
/// Offsets are `round((target - scaled) / 2)`, so odd leftover space puts the
/// extra pixel on the leading edge.
pub fn calculate_placement(source: (u32, u32), target: (u32, u32)) -> Placement {
    let (width, height) = calculate_fit_dimensions(source, target);
    let x = ((target.0 - width) as f64 / 2.0).round() as u32;
    let y = ((target.1 - height) as f64 / 2.0).round() as u32;
    Placement {
        width,
        height,
        x,
        y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_fits_width() {
        assert_eq!(calculate_fit_dimensions((4000, 3000), (112, 112)), (112, 84));
    }

    #[test]
    fn portrait_fits_height() {
        assert_eq!(calculate_fit_dimensions((3000, 4000), (112, 112)), (84, 112));
    }

    #[test]
    fn square_fills_canvas() {
        assert_eq!(calculate_fit_dimensions((112, 112), (112, 112)), (112, 112));
        assert_eq!(calculate_fit_dimensions((1000, 1000), (112, 112)), (112, 112));
    }

    #[test]
    fn small_source_is_enlarged_to_fit() {
        assert_eq!(calculate_fit_dimensions((50, 25), (100, 100)), (100, 50));
    }

    #[test]
    fn extreme_aspect_keeps_one_pixel() {
        // 10000x1 would round the height to zero
        assert_eq!(calculate_fit_dimensions((10000, 1), (112, 112)), (112, 1));
    }

    #[test]
    fn non_square_canvas() {
        assert_eq!(calculate_fit_dimensions((800, 800), (200, 100)), (100, 100));
    }

    #[test]
    fn placement_centers_landscape() {
        let p = calculate_placement((4000, 3000), (112, 112));
        assert_eq!(
            p,
            Placement {
                width: 112,
                height: 84,
                x: 0,
                y: 14
            }
        );
    }

    #[test]
    fn placement_rounds_odd_leftover() {
        // 112 - 75 = 37 → 18.5 rounds to 19
        let p = calculate_placement((75, 112), (112, 112));
        assert_eq!(p.width, 75);
        assert_eq!(p.x, 19);
        assert_eq!(p.y, 0);
    }

    #[test]
    fn placement_stays_inside_canvas() {
        for (w, h) in [(1, 1), (3, 7), (640, 480), (481, 640), (10000, 3)] {
            let p = calculate_placement((w, h), (112, 112));
            assert!(p.x + p.width <= 112, "{w}x{h}: {p:?}");
            assert!(p.y + p.height <= 112, "{w}x{h}: {p:?}");
        }
    }
}
