//! Size and rectangle value types plus the fixed-point scale arithmetic used
//! when mapping the native game frame onto a display surface.
//!
//! Scale factors are stored as fixed-point integers with `SCALE_SHIFT`
//! fractional bits, so `SCALE_UNIT` means 1x, `2 * SCALE_UNIT` means 2x and
//! `SCALE_UNIT / 2` means 0.5x.

use std::fmt;

/// Number of fractional bits in a fixed-point scale factor.
pub const SCALE_SHIFT: u32 = 10;

/// Fixed-point representation of a 1x scale.
pub const SCALE_UNIT: i32 = 1 << SCALE_SHIFT;

// ==============================================================================
// Size
// ==============================================================================

/// Width and height in pixels.
///
/// The null size (both zero) means "unspecified".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// True when both dimensions are zero.
    pub const fn is_null(&self) -> bool {
        self.width == 0 && self.height == 0
    }

    /// True when either dimension is zero or negative.
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// True if this size is larger than `other` on at least one axis.
    pub const fn exceeds_by_any(&self, other: Size) -> bool {
        self.width > other.width || self.height > other.height
    }

    /// Height-to-width ratio in fixed point, as used for exact aspect ratio
    /// comparisons. Returns `None` for a zero width.
    pub fn fixed_ratio(&self) -> Option<u32> {
        if self.width <= 0 || self.height < 0 {
            return None;
        }
        Some(((self.height as u32) << SCALE_SHIFT) / self.width as u32)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {}", self.width, self.height)
    }
}

// ==============================================================================
// Rect
// ==============================================================================

/// Axis-aligned rectangle with exclusive right and bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle from corner and extent.
    pub const fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Rectangle at the origin covering `size`.
    pub const fn from_size(size: Size) -> Self {
        Self::from_xywh(0, 0, size.width, size.height)
    }

    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub const fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Place `item` in the middle of `place`, keeping the item's extent.
    ///
    /// Offsets are computed from the halved extents of both rectangles, so an
    /// odd leftover pixel goes to the right/bottom side.
    pub const fn center_in(place: Rect, item: Rect) -> Rect {
        Rect::from_xywh(
            place.left + (place.width() >> 1) - (item.width() >> 1),
            place.top + (place.height() >> 1) - (item.height() >> 1),
            item.width(),
            item.height(),
        )
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {} : {} x {})",
            self.left,
            self.top,
            self.right,
            self.bottom,
            self.width(),
            self.height()
        )
    }
}

// ==============================================================================
// Scaling helpers
// ==============================================================================

/// Largest size that fits into `dest` while keeping the proportions of
/// `item`. Integer division rounds down, so the result never exceeds `dest`.
pub fn proportional_stretch(dest: Size, item: Size) -> Size {
    let (dest_w, dest_h) = (dest.width as i64, dest.height as i64);
    let (item_w, item_h) = (item.width as i64, item.height as i64);

    let mut width = if item_w != 0 { dest_w } else { 0 };
    let mut height = if item_w != 0 { dest_w * item_h / item_w } else { 0 };
    if height > dest_h {
        width = if item_h != 0 { dest_h * item_w / item_h } else { 0 };
        height = dest_h;
    }
    Size::new(width as i32, height as i32)
}

/// Multiply a length by a fixed-point scale factor.
pub fn scale_by_fixed(value: i32, scale: i32) -> i32 {
    ((value as i64 * scale as i64) >> SCALE_SHIFT) as i32
}

/// Convert a user-facing scaling number to fixed point.
///
/// Positive values are upscale multipliers, negative values divide
/// (`-2` is half size). Zero stays zero. `None` when the multiplier does
/// not fit in fixed point.
pub fn scaling_to_fixed(scaling: i32) -> Option<i32> {
    if scaling >= 0 {
        scaling.checked_mul(SCALE_UNIT)
    } else {
        let divisor = i32::try_from(scaling.unsigned_abs()).ok()?;
        Some(SCALE_UNIT / divisor)
    }
}

/// Inverse of [`scaling_to_fixed`].
pub fn fixed_to_scaling(scale: i32) -> i32 {
    if scale >= SCALE_UNIT {
        scale >> SCALE_SHIFT
    } else if scale > 0 {
        -(SCALE_UNIT / scale)
    } else {
        0
    }
}

// ==============================================================================
// Game-to-screen transform
// ==============================================================================

/// One-dimensional linear mapping from a source range onto a destination
/// range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisScaling {
    src_offset: i32,
    src_len: i32,
    dst_offset: i32,
    dst_len: i32,
}

impl Default for AxisScaling {
    fn default() -> Self {
        Self {
            src_offset: 0,
            src_len: 1,
            dst_offset: 0,
            dst_len: 1,
        }
    }
}

impl AxisScaling {
    /// Map `src_len` units starting at `src_offset` onto `dst_len` units
    /// starting at `dst_offset`. Empty ranges map 1:1.
    pub fn new(src_offset: i32, src_len: i32, dst_offset: i32, dst_len: i32) -> Self {
        if src_len <= 0 || dst_len <= 0 {
            return Self {
                src_offset,
                dst_offset,
                ..Self::default()
            };
        }
        Self {
            src_offset,
            src_len,
            dst_offset,
            dst_len,
        }
    }

    /// Scale factor in fixed point.
    pub fn scale(&self) -> i32 {
        (((self.dst_len as i64) << SCALE_SHIFT) / self.src_len as i64) as i32
    }

    /// Source coordinate to destination coordinate.
    pub fn scale_pt(&self, x: i32) -> i32 {
        self.scale_distance(x - self.src_offset) + self.dst_offset
    }

    /// Destination coordinate back to source coordinate.
    pub fn unscale_pt(&self, x: i32) -> i32 {
        self.unscale_distance(x - self.dst_offset) + self.src_offset
    }

    /// Source distance to destination distance.
    pub fn scale_distance(&self, d: i32) -> i32 {
        (d as i64 * self.dst_len as i64 / self.src_len as i64) as i32
    }

    /// Destination distance to source distance.
    pub fn unscale_distance(&self, d: i32) -> i32 {
        (d as i64 * self.src_len as i64 / self.dst_len as i64) as i32
    }
}

/// Two-dimensional game-to-screen mapping, initialised from the native game
/// size and the render destination chosen by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaneScaling {
    pub x: AxisScaling,
    pub y: AxisScaling,
    src: Size,
    dst: Rect,
}

impl PlaneScaling {
    pub fn new(src: Size, dst: Rect) -> Self {
        Self {
            x: AxisScaling::new(0, src.width, dst.left, dst.width()),
            y: AxisScaling::new(0, src.height, dst.top, dst.height()),
            src,
            dst,
        }
    }

    pub fn source(&self) -> Size {
        self.src
    }

    pub fn destination(&self) -> Rect {
        self.dst
    }

    /// Game pixel coordinate to screen coordinate.
    pub fn scale_pt(&self, x: i32, y: i32) -> (i32, i32) {
        (self.x.scale_pt(x), self.y.scale_pt(y))
    }

    /// Screen coordinate (e.g. a mouse position) to game pixel coordinate.
    pub fn unscale_pt(&self, x: i32, y: i32) -> (i32, i32) {
        (self.x.unscale_pt(x), self.y.unscale_pt(y))
    }
}
