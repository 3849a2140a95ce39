//! Plain geometry values: sizes, points and rectangles.
//!
//! All three are `Copy` values with no ownership. Coordinates are signed so
//! that a window dragged partly off the left or top edge keeps a meaningful
//! origin; clipping happens where pixels are touched, not here.

/// Width and height in pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const ZERO: Self = Self {
        width: 0,
        height: 0,
    };

    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Number of pixels covered, treating negative extents as empty.
    #[inline]
    pub fn area(self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Element-wise minimum of two sizes.
    #[inline]
    pub fn min(self, other: Self) -> Self {
        Self {
            width: self.width.min(other.width),
            height: self.height.min(other.height),
        }
    }
}

/// A point in some view's coordinate space.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn translated(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Offset from `from` to `self`.
    #[inline]
    pub fn delta_from(self, from: Self) -> (i32, i32) {
        (self.x - from.x, self.y - from.y)
    }
}

/// An origin plus a size. `max_x`/`max_y` are exclusive.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub origin: Coordinate,
    pub size: Size,
}

impl Rect {
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            origin: Coordinate { x, y },
            size: Size { width, height },
        }
    }

    #[inline]
    pub const fn from_parts(origin: Coordinate, size: Size) -> Self {
        Self { origin, size }
    }

    /// A rect of `size` anchored at (0, 0).
    #[inline]
    pub const fn with_size(size: Size) -> Self {
        Self {
            origin: Coordinate::ZERO,
            size,
        }
    }

    #[inline]
    pub fn min_x(&self) -> i32 {
        self.origin.x
    }

    #[inline]
    pub fn min_y(&self) -> i32 {
        self.origin.y
    }

    #[inline]
    pub fn max_x(&self) -> i32 {
        self.origin.x + self.size.width
    }

    #[inline]
    pub fn max_y(&self) -> i32 {
        self.origin.y + self.size.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// Hit test used for window picking. Both edges are inclusive, so a
    /// point on the right or bottom border line still belongs to the rect.
    #[inline]
    pub fn contains(&self, p: Coordinate) -> bool {
        p.x >= self.min_x()
            && p.y >= self.min_y()
            && p.x - self.min_x() <= self.size.width
            && p.y - self.min_y() <= self.size.height
    }

    /// Clip this rect against a `bounds`-sized area anchored at (0, 0).
    ///
    /// Returns the visible part together with the offset of that part
    /// inside the unclipped rect (how many columns and rows were cut from
    /// the top-left). `None` when nothing is visible.
    pub fn clip_to(&self, bounds: Size) -> Option<(Rect, Coordinate)> {
        let x0 = self.min_x().max(0);
        let y0 = self.min_y().max(0);
        let x1 = self.max_x().min(bounds.width);
        let y1 = self.max_y().min(bounds.height);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((
            Rect::new(x0, y0, x1 - x0, y1 - y0),
            Coordinate::new(x0 - self.min_x(), y0 - self.min_y()),
        ))
    }
}
