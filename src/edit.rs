//! Grid-aware editing tools for painting on a pixelated raster.
//!
//! Painting snaps to the pixel grid, so strokes always cover whole blocks.
//! Coordinates passed to [`paint`] and friends may lie outside of the raster
//! (for example, a pointer dragged past the edge); the painted square is clipped.

use crate::{PixelSize, RasterBuffer, RasterError, CHANNELS};
use bitvec::vec::BitVec;
use palette::Srgb;
use std::{collections::VecDeque, num::NonZeroU32};

/// The color painted by [`erase`].
pub const ERASE_COLOR: Srgb<u8> = Srgb::new(u8::MAX, u8::MAX, u8::MAX);

/// The size of the square painted at each point of a stroke.
///
/// A brush of size `n` on a grid of pixel size `p` covers `n × n` blocks,
/// that is `n * p` source pixels along each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Brush {
    /// The number of blocks along each side.
    size: NonZeroU32,
    /// The grid the brush snaps to.
    pixel_size: PixelSize,
}

impl Brush {
    /// Creates a new [`Brush`].
    ///
    /// # Errors
    /// Returns [`RasterError::InvalidParameter`] if `size` or `pixel_size` is zero.
    pub fn new(size: u32, pixel_size: u32) -> Result<Self, RasterError> {
        let size = NonZeroU32::new(size)
            .ok_or(RasterError::InvalidParameter { name: "brush_size", value: 0 })?;
        let pixel_size = PixelSize::try_from(pixel_size)?;
        Ok(Self { size, pixel_size })
    }

    /// The number of blocks along each side.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size.get()
    }

    /// The grid the brush snaps to.
    #[must_use]
    pub const fn pixel_size(&self) -> PixelSize {
        self.pixel_size
    }

    /// The side length of the painted square in source pixels.
    #[must_use]
    pub fn extent(&self) -> i64 {
        i64::from(self.size.get()) * i64::from(self.pixel_size.get())
    }
}

impl From<PixelSize> for Brush {
    /// A one block brush on the given grid.
    fn from(pixel_size: PixelSize) -> Self {
        Self { size: NonZeroU32::MIN, pixel_size }
    }
}

impl Default for Brush {
    fn default() -> Self {
        PixelSize::DEFAULT.into()
    }
}

/// Fills the grid-snapped brush square at `(x, y)` with `rgba`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn stamp(raster: &mut RasterBuffer, x: i64, y: i64, rgba: [u8; 4], brush: Brush) {
    let p = i64::from(brush.pixel_size.get());
    let left = x.div_euclid(p) * p;
    let top = y.div_euclid(p) * p;

    let x0 = left.max(0);
    let y0 = top.max(0);
    let x1 = (left + brush.extent()).min(i64::from(raster.width()));
    let y1 = (top + brush.extent()).min(i64::from(raster.height()));
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    // all four bounds are within 0..=width or 0..=height here
    let (x0, x1, y0, y1) = (x0 as usize, x1 as usize, y0 as usize, y1 as usize);
    let w = raster.w();
    let data = raster.as_raw_mut();
    for y in y0..y1 {
        let row = &mut data[(y * w + x0) * CHANNELS..(y * w + x1) * CHANNELS];
        for pixel in row.chunks_exact_mut(CHANNELS) {
            pixel.copy_from_slice(&rgba);
        }
    }
}

/// Calls `f` for every point on the line from `from` to `to`, both ends included.
fn bresenham((mut x, mut y): (i64, i64), (x1, y1): (i64, i64), mut f: impl FnMut(i64, i64)) {
    let dx = (x1 - x).abs();
    let dy = (y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    loop {
        f(x, y);
        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
}

/// Paints an opaque brush square of `color` at the grid cell containing `(x, y)`.
pub fn paint(raster: &mut RasterBuffer, x: i64, y: i64, color: Srgb<u8>, brush: Brush) {
    let Srgb { red, green, blue, .. } = color;
    stamp(raster, x, y, [red, green, blue, u8::MAX], brush);
}

/// Paints the grid cell containing `(x, y)` opaque white.
pub fn erase(raster: &mut RasterBuffer, x: i64, y: i64, brush: Brush) {
    paint(raster, x, y, ERASE_COLOR, brush);
}

/// Paints every point of the line from `from` to `to`, both ends included.
pub fn paint_line(
    raster: &mut RasterBuffer,
    from: (i64, i64),
    to: (i64, i64),
    color: Srgb<u8>,
    brush: Brush,
) {
    bresenham(from, to, |x, y| paint(raster, x, y, color, brush));
}

/// Erases every point of the line from `from` to `to`, both ends included.
pub fn erase_line(raster: &mut RasterBuffer, from: (i64, i64), to: (i64, i64), brush: Brush) {
    paint_line(raster, from, to, ERASE_COLOR, brush);
}

/// Repaints the 4-connected region around `(x, y)` that has exactly the RGBA value of
/// `(x, y)` with opaque `color`.
///
/// Returns the number of repainted pixels, which is zero if the region already has that color.
///
/// # Errors
/// Returns [`RasterError::InvalidParameter`] if `(x, y)` is outside of the raster.
pub fn flood_fill(
    raster: &mut RasterBuffer,
    x: u32,
    y: u32,
    color: Srgb<u8>,
) -> Result<usize, RasterError> {
    if x >= raster.width() {
        return Err(RasterError::InvalidParameter { name: "x", value: x.into() });
    }
    if y >= raster.height() {
        return Err(RasterError::InvalidParameter { name: "y", value: y.into() });
    }

    let Srgb { red, green, blue, .. } = color;
    let fill = [red, green, blue, u8::MAX];
    let start = raster.rgba(x, y);
    if start == fill {
        return Ok(0);
    }

    let (w, h) = (raster.w(), raster.h());
    let data = raster.as_raw_mut();
    let matches = |data: &[u8], i: usize| data[i * CHANNELS..(i + 1) * CHANNELS] == start;

    let mut visited: BitVec = BitVec::repeat(false, w * h);
    let mut queue = VecDeque::new();

    let first = y as usize * w + x as usize;
    visited.set(first, true);
    queue.push_back(first);

    let mut filled = 0;
    while let Some(i) = queue.pop_front() {
        data[i * CHANNELS..(i + 1) * CHANNELS].copy_from_slice(&fill);
        filled += 1;

        let (cx, cy) = (i % w, i / w);
        let neighbors = [
            (cx + 1 < w).then(|| i + 1),
            (cx > 0).then(|| i - 1),
            (cy + 1 < h).then(|| i + w),
            (cy > 0).then(|| i - w),
        ];

        for j in neighbors.into_iter().flatten() {
            if !visited[j] && matches(data, j) {
                visited.set(j, true);
                queue.push_back(j);
            }
        }
    }

    Ok(filled)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const RED: Srgb<u8> = Srgb::new(255, 0, 0);
    const WHITE: [u8; 4] = [255, 255, 255, 255];
    const CLEAR: [u8; 4] = [0, 0, 0, 0];

    fn brush(size: u32, pixel_size: u32) -> Brush {
        Brush::new(size, pixel_size).unwrap()
    }

    fn painted(raster: &RasterBuffer) -> Vec<(u32, u32)> {
        let mut points = Vec::new();
        for y in 0..raster.height() {
            for x in 0..raster.width() {
                if raster.rgba(x, y) != CLEAR {
                    points.push((x, y));
                }
            }
        }
        points
    }

    #[test]
    fn brush_validation() {
        assert_eq!(
            Brush::new(0, 4),
            Err(RasterError::InvalidParameter { name: "brush_size", value: 0 })
        );
        assert_eq!(
            Brush::new(1, 0),
            Err(RasterError::InvalidParameter { name: "pixel_size", value: 0 })
        );
        assert_eq!(brush(3, 2).extent(), 6);
        assert_eq!(Brush::default(), brush(1, 4));
    }

    #[test]
    fn paint_snaps_to_grid() {
        let mut raster = RasterBuffer::filled(8, 8, CLEAR).unwrap();
        paint(&mut raster, 5, 2, RED, brush(1, 4));
        let expected = (0..4).flat_map(|y| (4..8).map(move |x| (x, y))).collect::<Vec<_>>();
        assert_eq!(painted(&raster), expected);
        assert_eq!(raster.rgba(4, 0), [255, 0, 0, 255]);
    }

    #[test]
    fn paint_is_clipped() {
        let mut raster = RasterBuffer::filled(5, 5, CLEAR).unwrap();
        paint(&mut raster, 4, 4, RED, brush(2, 2));
        assert_eq!(painted(&raster), vec![(4, 4)]);

        let mut raster = RasterBuffer::filled(5, 5, CLEAR).unwrap();
        // -1 snaps to the cell at -2, which covers -2..2 with a two block brush
        paint(&mut raster, -1, 0, RED, brush(2, 2));
        let expected = (0..4).flat_map(|y| (0..2).map(move |x| (x, y))).collect::<Vec<_>>();
        assert_eq!(painted(&raster), expected);

        let mut raster = RasterBuffer::filled(5, 5, CLEAR).unwrap();
        paint(&mut raster, -10, 20, RED, brush(1, 1));
        assert!(painted(&raster).is_empty());
    }

    #[test]
    fn erase_paints_white() {
        let mut raster = RasterBuffer::filled(4, 4, CLEAR).unwrap();
        erase(&mut raster, 1, 1, brush(1, 2));
        assert_eq!(raster.rgba(0, 0), WHITE);
        assert_eq!(raster.rgba(1, 1), WHITE);
        assert_eq!(raster.rgba(2, 2), CLEAR);
    }

    #[test]
    fn line_endpoints_are_inclusive() {
        let mut points = Vec::new();
        bresenham((0, 0), (3, 1), |x, y| points.push((x, y)));
        assert_eq!(points.first(), Some(&(0, 0)));
        assert_eq!(points.last(), Some(&(3, 1)));
        assert_eq!(points.len(), 4);

        let mut points = Vec::new();
        bresenham((2, 2), (2, 2), |x, y| points.push((x, y)));
        assert_eq!(points, vec![(2, 2)]);

        let mut points = Vec::new();
        bresenham((3, 0), (0, 3), |x, y| points.push((x, y)));
        assert_eq!(points, vec![(3, 0), (2, 1), (1, 2), (0, 3)]);
    }

    #[test]
    fn paint_line_covers_diagonal() {
        let mut raster = RasterBuffer::filled(4, 4, CLEAR).unwrap();
        paint_line(&mut raster, (0, 0), (3, 3), RED, brush(1, 1));
        assert_eq!(painted(&raster), vec![(0, 0), (1, 1), (2, 2), (3, 3)]);

        erase_line(&mut raster, (0, 0), (3, 0), brush(1, 1));
        assert!((0..4).all(|x| raster.rgba(x, 0) == WHITE));
        assert_eq!(raster.rgba(1, 1), [255, 0, 0, 255]);
    }

    #[test]
    fn flood_fill_stays_in_region() {
        // a white 5x5 raster split by a black vertical line at x = 2
        let mut raster = RasterBuffer::filled(5, 5, WHITE).unwrap();
        for y in 0..5 {
            raster.set_rgba(2, y, [0, 0, 0, 255]);
        }

        assert_eq!(flood_fill(&mut raster, 0, 0, RED), Ok(10));
        assert_eq!(raster.rgba(1, 4), [255, 0, 0, 255]);
        assert_eq!(raster.rgba(2, 2), [0, 0, 0, 255]);
        assert_eq!(raster.rgba(3, 0), WHITE);
    }

    #[test]
    fn flood_fill_is_four_connected() {
        // diagonal neighbors do not connect
        let mut raster = RasterBuffer::filled(3, 3, WHITE).unwrap();
        raster.set_rgba(1, 0, [0, 0, 0, 255]);
        raster.set_rgba(0, 1, [0, 0, 0, 255]);
        assert_eq!(flood_fill(&mut raster, 0, 0, RED), Ok(1));
        assert_eq!(raster.rgba(1, 1), WHITE);
    }

    #[test]
    fn flood_fill_matches_exact_rgba() {
        let mut raster = RasterBuffer::filled(3, 1, WHITE).unwrap();
        raster.set_rgba(1, 0, [255, 255, 255, 254]);
        assert_eq!(flood_fill(&mut raster, 0, 0, RED), Ok(1));
        assert_eq!(raster.rgba(2, 0), WHITE);
    }

    #[test]
    fn flood_fill_same_color_is_noop() {
        let mut raster = RasterBuffer::filled(4, 4, [255, 0, 0, 255]).unwrap();
        assert_eq!(flood_fill(&mut raster, 1, 1, RED), Ok(0));

        // a transparent red region is still repainted to opaque red
        let mut raster = RasterBuffer::filled(2, 2, [255, 0, 0, 0]).unwrap();
        assert_eq!(flood_fill(&mut raster, 1, 1, RED), Ok(4));
    }

    #[test]
    fn flood_fill_rejects_out_of_bounds() {
        let mut raster = RasterBuffer::filled(4, 3, WHITE).unwrap();
        assert_eq!(
            flood_fill(&mut raster, 4, 0, RED),
            Err(RasterError::InvalidParameter { name: "x", value: 4 })
        );
        assert_eq!(
            flood_fill(&mut raster, 0, 3, RED),
            Err(RasterError::InvalidParameter { name: "y", value: 3 })
        );
    }
}
