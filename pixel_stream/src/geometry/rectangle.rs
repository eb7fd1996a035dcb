///
/// A rectangle in integer pixel coordinates
///
/// Pixel positions are signed so that producers can describe regions partly outside of an image: the
/// far edges are always calculated with saturating arithmetic so that very large rectangles can't wrap
/// around and appear to be inside the image.
///
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rectangle {
    pub x:      i32,
    pub y:      i32,
    pub width:  i32,
    pub height: i32,
}

impl Rectangle {
    ///
    /// Creates a new rectangle
    ///
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rectangle { x, y, width, height }
    }

    ///
    /// Creates the rectangle covering an image of a particular size (ie, `[0, width) x [0, height)`)
    ///
    #[inline]
    pub const fn with_size(width: i32, height: i32) -> Self {
        Rectangle { x: 0, y: 0, width, height }
    }

    ///
    /// True if this rectangle contains no pixels
    ///
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    ///
    /// The x coordinate just past the right-hand edge of this rectangle
    ///
    #[inline]
    pub fn right(&self) -> i32 {
        saturating_end(self.x, self.width)
    }

    ///
    /// The y coordinate just past the bottom edge of this rectangle
    ///
    #[inline]
    pub fn bottom(&self) -> i32 {
        saturating_end(self.y, self.height)
    }

    ///
    /// Returns the area shared by this rectangle and another one, or None if they do not overlap
    ///
    pub fn intersect(&self, other: &Rectangle) -> Option<Rectangle> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());

        if x1 >= x2 || y1 >= y2 {
            None
        } else {
            Some(Rectangle::new(x1, y1, x2.saturating_sub(x1), y2.saturating_sub(y1)))
        }
    }

    ///
    /// True if the whole of `other` lies inside this rectangle
    ///
    pub fn contains_rectangle(&self, other: &Rectangle) -> bool {
        other.x >= self.x && other.y >= self.y && other.right() <= self.right() && other.bottom() <= self.bottom()
    }

    ///
    /// Moves this rectangle by an offset
    ///
    #[inline]
    pub fn translate(&self, dx: i32, dy: i32) -> Rectangle {
        Rectangle::new(self.x.saturating_add(dx), self.y.saturating_add(dy), self.width, self.height)
    }
}

///
/// Calculates `start + length`, clamping to `i32::MAX` or `i32::MIN` instead of wrapping when the result overflows
///
/// A positive start with a positive length can only overflow upwards, and a negative start with a negative length can
/// only overflow downwards, so this is exactly a saturating addition.
///
#[inline]
pub fn saturating_end(start: i32, length: i32) -> i32 {
    start.saturating_add(length)
}

#[cfg(test)]
mod test {
    use super::*;
    use itertools::*;

    #[test]
    fn saturates_instead_of_wrapping() {
        assert!(saturating_end(i32::MAX - 5, 10) == i32::MAX);
        assert!(saturating_end(i32::MIN + 5, -10) == i32::MIN);
        assert!(saturating_end(-5, 10) == 5);
        assert!(saturating_end(5, -10) == -5);
    }

    #[test]
    fn huge_rectangle_does_not_wrap_into_bounds() {
        let bounds  = Rectangle::with_size(10, 10);
        let huge    = Rectangle::new(i32::MAX - 5, 0, 10, 10);

        assert!(huge.right() == i32::MAX);
        assert!(huge.intersect(&bounds).is_none());
    }

    #[test]
    fn intersections_lie_within_both_rectangles() {
        let bounds = Rectangle::with_size(4, 3);

        for (x, y, w, h) in iproduct!(-3..6, -3..5, 0..7, 0..6) {
            let block = Rectangle::new(x, y, w, h);

            match block.intersect(&bounds) {
                Some(clipped) => {
                    assert!(!clipped.is_empty());
                    assert!(bounds.contains_rectangle(&clipped), "{:?} escapes {:?}", clipped, bounds);
                    assert!(block.contains_rectangle(&clipped), "{:?} escapes {:?}", clipped, block);
                }

                None => {
                    // Every pixel of the block must be outside the bounds
                    for (px, py) in iproduct!(x..(x+w), y..(y+h)) {
                        assert!(px < 0 || py < 0 || px >= 4 || py >= 3, "({}, {}) dropped from {:?}", px, py, block);
                    }
                }
            }
        }
    }
}
