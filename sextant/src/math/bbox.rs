//! Axis-aligned bounding box for pixel groups and attractor basins.

/// Axis-aligned bounding box with `usize` coordinates.
///
/// Uses inclusive bounds: a pixel at (x, y) is inside if
/// `x_min <= x <= x_max` and `y_min <= y <= y_max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aabb {
    pub x_min: usize,
    pub x_max: usize,
    pub y_min: usize,
    pub y_max: usize,
}

impl Aabb {
    #[inline]
    pub const fn new(x_min: usize, x_max: usize, y_min: usize, y_max: usize) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Box covering the single pixel `(x, y)`.
    #[inline]
    pub const fn point(x: usize, y: usize) -> Self {
        Self::new(x, x, y, y)
    }

    /// Create an empty bounding box (for accumulation).
    ///
    /// The empty box has inverted bounds so that any point
    /// included via `include()` will set the initial bounds.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            x_min: usize::MAX,
            x_max: 0,
            y_min: usize::MAX,
            y_max: 0,
        }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.x_min > self.x_max || self.y_min > self.y_max
    }

    /// Expand this bounding box to include the given point.
    #[inline]
    pub fn include(&mut self, x: usize, y: usize) {
        self.x_min = self.x_min.min(x);
        self.x_max = self.x_max.max(x);
        self.y_min = self.y_min.min(y);
        self.y_max = self.y_max.max(y);
    }

    /// Smallest box containing both `self` and `other`.
    #[inline]
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            x_min: self.x_min.min(other.x_min),
            x_max: self.x_max.max(other.x_max),
            y_min: self.y_min.min(other.y_min),
            y_max: self.y_max.max(other.y_max),
        }
    }

    /// True if the boxes overlap or are within one pixel of each other,
    /// diagonals included.
    #[inline]
    pub const fn touches(&self, other: &Aabb) -> bool {
        self.x_min <= other.x_max + 1
            && other.x_min <= self.x_max + 1
            && self.y_min <= other.y_max + 1
            && other.y_min <= self.y_max + 1
    }

    /// Width of the bounding box (number of columns).
    #[inline]
    pub const fn width(&self) -> usize {
        self.x_max.saturating_sub(self.x_min) + 1
    }

    /// Height of the bounding box (number of rows).
    #[inline]
    pub const fn height(&self) -> usize {
        self.y_max.saturating_sub(self.y_min) + 1
    }

    #[inline]
    pub const fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let bbox = Aabb::empty();
        assert!(bbox.is_empty());
        assert!(!Aabb::point(0, 0).is_empty());
    }

    #[test]
    fn test_include() {
        let mut bbox = Aabb::empty();
        bbox.include(5, 3);
        assert_eq!(bbox, Aabb::new(5, 5, 3, 3));

        bbox.include(2, 7);
        assert_eq!(bbox, Aabb::new(2, 5, 3, 7));

        bbox.include(8, 1);
        assert_eq!(bbox, Aabb::new(2, 8, 1, 7));
    }

    #[test]
    fn test_width_height() {
        let bbox = Aabb::new(2, 5, 3, 8);
        assert_eq!(bbox.width(), 4);
        assert_eq!(bbox.height(), 6);
    }

    #[test]
    fn test_contains() {
        let bbox = Aabb::new(2, 5, 3, 8);
        assert!(bbox.contains(2, 3));
        assert!(bbox.contains(5, 8));
        assert!(!bbox.contains(1, 5));
        assert!(!bbox.contains(6, 5));
        assert!(!bbox.contains(3, 2));
        assert!(!bbox.contains(3, 9));
    }

    #[test]
    fn test_union() {
        let a = Aabb::new(0, 2, 5, 6);
        let b = Aabb::new(4, 9, 1, 3);
        assert_eq!(a.union(&b), Aabb::new(0, 9, 1, 6));
    }

    #[test]
    fn test_touches_adjacent_and_diagonal() {
        let a = Aabb::point(3, 3);
        assert!(a.touches(&Aabb::point(4, 3)));
        assert!(a.touches(&Aabb::point(2, 2)));
        assert!(a.touches(&Aabb::point(4, 4)));
        assert!(a.touches(&Aabb::point(3, 3)));
    }

    #[test]
    fn test_touches_gap() {
        let a = Aabb::point(3, 3);
        assert!(!a.touches(&Aabb::point(5, 3)));
        assert!(!a.touches(&Aabb::point(3, 1)));
        assert!(!Aabb::new(0, 1, 0, 1).touches(&Aabb::new(3, 4, 0, 1)));
    }

    #[test]
    fn test_touches_at_origin_does_not_underflow() {
        let a = Aabb::point(0, 0);
        assert!(a.touches(&Aabb::point(1, 1)));
        assert!(!a.touches(&Aabb::point(2, 0)));
    }
}
