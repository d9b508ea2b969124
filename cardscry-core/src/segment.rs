//! Contour-based card segmentation and perspective correction.
//!
//! A standalone stage: the detection path never invokes it. Contour
//! selection assumes the largest contour is the image's own frame and takes
//! the second-largest as the card boundary. That heuristic is fragile on
//! frameless shots; such inputs produce a GeometryError rather than a bogus
//! crop.

use image::{GrayImage, Rgb, RgbImage};
use imageproc::contours::find_contours;
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;

use crate::error::{Result, ScryError};

/// Canonical crop width, the physical card aspect ratio.
pub const CARD_WIDTH: u32 = 476;
/// Canonical crop height.
pub const CARD_HEIGHT: u32 = 664;

/// Polygon approximation tolerance as a fraction of the contour perimeter.
const APPROX_EPSILON: f64 = 0.01;

/// Select the card boundary from a binarized image.
///
/// Returns the first four points of the polygon approximating the
/// second-largest contour.
pub fn card_contour(binary: &GrayImage) -> Result<[Point<i32>; 4]> {
    let mut contours = find_contours::<i32>(binary);
    if contours.len() < 2 {
        return Err(ScryError::Geometry(format!(
            "expected at least two contours, found {}",
            contours.len()
        )));
    }
    contours.sort_by_key(|c| std::cmp::Reverse(twice_area(&c.points)));
    let card = &contours[1];

    let epsilon = APPROX_EPSILON * arc_length(&card.points, true);
    let polygon = approximate_polygon_dp(&card.points, epsilon, true);
    if polygon.len() < 4 {
        return Err(ScryError::Geometry(format!(
            "card contour reduced to {} corner points, need 4",
            polygon.len()
        )));
    }
    Ok([polygon[0], polygon[1], polygon[2], polygon[3]])
}

/// Perspective-correct `original` so the quadrilateral spanned by `points`
/// fills the canonical 476×664 rectangle.
///
/// Corner ordering: minimum coordinate-sum is top-left, maximum is
/// bottom-right, minimum coordinate-difference (y − x) is top-right,
/// maximum is bottom-left. Collinear or otherwise degenerate points have no
/// perspective solution and produce a GeometryError.
pub fn warp(original: &RgbImage, points: &[Point<i32>; 4]) -> Result<RgbImage> {
    let [tl, tr, br, bl] = order_corners(points);
    let projection = Projection::from_control_points(
        [tl, tr, br, bl],
        [
            (0.0, 0.0),
            ((CARD_WIDTH - 1) as f32, 0.0),
            ((CARD_WIDTH - 1) as f32, (CARD_HEIGHT - 1) as f32),
            (0.0, (CARD_HEIGHT - 1) as f32),
        ],
    )
    .ok_or_else(|| ScryError::Geometry("degenerate corner points".to_string()))?;

    let mut out = RgbImage::new(CARD_WIDTH, CARD_HEIGHT);
    warp_into(
        original,
        &projection,
        Interpolation::Bilinear,
        Rgb([0, 0, 0]),
        &mut out,
    );
    Ok(out)
}

/// Contour selection on the binary image, warp of the original.
///
/// Both images must share dimensions; contour coordinates index into the
/// original.
pub fn segmentation(binary: &GrayImage, original: &RgbImage) -> Result<RgbImage> {
    if binary.dimensions() != original.dimensions() {
        return Err(ScryError::Geometry(format!(
            "binary {}x{} and original {}x{} differ in size",
            binary.width(),
            binary.height(),
            original.width(),
            original.height()
        )));
    }
    let corners = card_contour(binary)?;
    warp(original, &corners)
}

fn order_corners(points: &[Point<i32>; 4]) -> [(f32, f32); 4] {
    let sum = |p: &Point<i32>| p.x + p.y;
    let diff = |p: &Point<i32>| p.y - p.x;

    let mut tl = &points[0];
    let mut br = &points[0];
    let mut tr = &points[0];
    let mut bl = &points[0];
    for p in points {
        if sum(p) < sum(tl) {
            tl = p;
        }
        if sum(p) > sum(br) {
            br = p;
        }
        if diff(p) < diff(tr) {
            tr = p;
        }
        if diff(p) > diff(bl) {
            bl = p;
        }
    }
    [
        (tl.x as f32, tl.y as f32),
        (tr.x as f32, tr.y as f32),
        (br.x as f32, br.y as f32),
        (bl.x as f32, bl.y as f32),
    ]
}

/// Twice the enclosed polygon area (shoelace), exact for integer points.
fn twice_area(points: &[Point<i32>]) -> i64 {
    if points.len() < 3 {
        return 0;
    }
    let mut acc = 0i64;
    for i in 0..points.len() {
        let p = points[i];
        let q = points[(i + 1) % points.len()];
        acc += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    acc.abs()
}
