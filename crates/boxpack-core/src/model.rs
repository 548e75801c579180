use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle with position and size.
///
/// `left`/`top` locate the corner nearest the origin; `right()`/`bottom()`
/// are derived, so `right - left == width` and `bottom - top == height` hold
/// for every rectangle built through the constructors.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rectangle of the given size anchored at the origin.
    pub fn of_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Rectangle spanning the given bounds.
    pub fn from_bounds(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    /// Right edge: `left + width`.
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge: `top + height`.
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Whether this rect fully contains `other`. Edges may coincide, so a
    /// rect contains itself.
    pub fn contains(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Whether the interiors intersect. Rects that only share an edge or a
    /// corner do not touch.
    pub fn touches(&self, other: &Rect) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }

    /// Whether the closed bounds intersect. Unlike [`Rect::touches`], shared
    /// edges count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left <= other.right()
            && other.left <= self.right()
            && self.top <= other.bottom()
            && other.top <= self.bottom()
    }
}

/// A requested box queued for packing.
///
/// Stored in canonical orientation (`width <= height`); the packer picks the
/// final orientation at placement time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxSpec<K = String> {
    /// Caller-supplied key, echoed on the matching [`Placement`].
    pub key: K,
    pub width: f64,
    pub height: f64,
}

impl<K> BoxSpec<K> {
    pub fn new(width: f64, height: f64, key: K) -> Self {
        if width > height {
            Self {
                key,
                width: height,
                height: width,
            }
        } else {
            Self { key, width, height }
        }
    }
}

/// A committed placement inside the container.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement<K = String> {
    /// Key of the box this placement answers.
    pub key: K,
    /// Final bounds inside the container.
    pub rect: Rect,
    /// Whether the swapped orientation of the stored box was used.
    pub rotated: bool,
}

/// Summary of the packer's current state.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct PackStats {
    /// Committed placements.
    pub placed: usize,
    /// Boxes the current free space could not take.
    pub unplaced: usize,
    /// Boxes that can never fit this container.
    pub rejected: usize,
    /// Total area covered by placements.
    pub placed_area: f64,
    /// Free area cut off from the container's outer boundary.
    pub enclosed_waste: f64,
    /// Occupancy ratio in `[0, 1]`.
    pub fullness: f64,
}

impl PackStats {
    /// One-line human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "placed: {}, unplaced: {}, rejected: {}, placed area: {}, enclosed waste: {}, fullness: {:.2}%",
            self.placed,
            self.unplaced,
            self.rejected,
            self.placed_area,
            self.enclosed_waste,
            self.fullness * 100.0,
        )
    }
}
