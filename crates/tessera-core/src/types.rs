//! Core value types for cell-based layout.

use std::fmt;

/// Unique identifier for a view in a view tree.
///
/// Ids are handed out by the tree in increasing order and never reused, so a
/// stale id can always be told apart from a live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewId(pub u64);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One of the two layout axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// Horizontal axis (X and Width)
    Width,
    /// Vertical axis (Y and Height)
    Height,
}

impl Axis {
    /// Both axes, in resolution order.
    pub const ALL: [Axis; 2] = [Axis::Width, Axis::Height];
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Width => f.write_str("Width"),
            Axis::Height => f.write_str("Height"),
        }
    }
}

/// An edge of a view's frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Left,
    Top,
    Right,
    Bottom,
}

impl Side {
    /// The axis this edge lies on.
    pub fn axis(self) -> Axis {
        match self {
            Side::Left | Side::Right => Axis::Width,
            Side::Top | Side::Bottom => Axis::Height,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Side::Left => "Left",
            Side::Top => "Top",
            Side::Right => "Right",
            Side::Bottom => "Bottom",
        };
        f.write_str(name)
    }
}

/// Binary operator joining two layout expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombineOp {
    Add,
    Subtract,
}

impl CombineOp {
    /// Apply the operator to two evaluated operands.
    pub fn apply(self, left: i32, right: i32) -> i32 {
        match self {
            CombineOp::Add => left.saturating_add(right),
            CombineOp::Subtract => left.saturating_sub(right),
        }
    }

    /// The operator symbol used in textual forms.
    pub fn symbol(self) -> char {
        match self {
            CombineOp::Add => '+',
            CombineOp::Subtract => '-',
        }
    }
}

/// A location in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component along an axis.
    pub fn get(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Width => self.x,
            Axis::Height => self.y,
        }
    }
}

/// A size in cells. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// Create a size, flooring negative extents at zero.
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width: width.max(0),
            height: height.max(0),
        }
    }

    /// Extent along an axis.
    pub fn get(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Width => self.width,
            Axis::Height => self.height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{Width={},Height={}}}", self.width, self.height)
    }
}

/// Axis-aligned rectangle in cells.
///
/// Width and height are floored at zero by every constructor and setter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    width: i32,
    height: i32,
}

impl Rect {
    /// Create a rect with position and size.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width: width.max(0),
            height: height.max(0),
        }
    }

    /// Create a rect from a location and a size.
    pub fn from_parts(location: Point, size: Size) -> Self {
        Self::new(location.x, location.y, size.width, size.height)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn set_width(&mut self, width: i32) {
        self.width = width.max(0);
    }

    pub fn set_height(&mut self, height: i32) {
        self.height = height.max(0);
    }

    pub fn location(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Get the right edge (x + width).
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Get the bottom edge (y + height).
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Coordinate of one edge.
    pub fn edge(&self, side: Side) -> i32 {
        match side {
            Side::Left => self.x,
            Side::Top => self.y,
            Side::Right => self.right(),
            Side::Bottom => self.bottom(),
        }
    }

    /// Origin along an axis.
    pub fn origin(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Width => self.x,
            Axis::Height => self.y,
        }
    }

    /// Extent along an axis.
    pub fn extent(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Width => self.width,
            Axis::Height => self.height,
        }
    }

    /// Far edge along an axis (origin + extent).
    pub fn end(&self, axis: Axis) -> i32 {
        self.origin(axis).saturating_add(self.extent(axis))
    }

    /// Set the origin along an axis.
    pub fn set_origin(&mut self, axis: Axis, value: i32) {
        match axis {
            Axis::Width => self.x = value,
            Axis::Height => self.y = value,
        }
    }

    /// Set the extent along an axis, flooring at zero.
    pub fn set_extent(&mut self, axis: Axis, value: i32) {
        match axis {
            Axis::Width => self.set_width(value),
            Axis::Height => self.set_height(value),
        }
    }

    /// Check if a cell is inside the rect.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Compute intersection with another rect.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());

        if x1 < x2 && y1 < y2 {
            Some(Rect::new(x1, y1, x2 - x1, y2 - y1))
        } else {
            None
        }
    }

    /// Compute union (bounding box) with another rect.
    pub fn union(&self, other: &Rect) -> Rect {
        let x1 = self.x.min(other.x);
        let y1 = self.y.min(other.y);
        let x2 = self.right().max(other.right());
        let y2 = self.bottom().max(other.bottom());
        Rect::new(x1, y1, x2 - x1, y2 - y1)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{X={},Y={},Width={},Height={}}}",
            self.x, self.y, self.width, self.height
        )
    }
}
