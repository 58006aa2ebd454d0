use crate::geometry::{FloatType, WorldMatrix, WorldPoint, WorldVector};

/// Axis aligned bounding box.
///
/// A freshly constructed box is in a distinct "uninitialized" state
/// (`min = +MAX`, `max = -MAX` per component) that any union folds away;
/// this is not the same thing as a zero-volume box. All queries other than
/// [`BBox::reset`], [`BBox::set`] and the unions require an initialized
/// box, checked by debug assertions only.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BBox {
    pub min: WorldPoint,
    pub max: WorldPoint,
}

impl Default for BBox {
    fn default() -> Self {
        BBox {
            min: WorldPoint::new(FloatType::MAX, FloatType::MAX, FloatType::MAX),
            max: WorldPoint::new(-FloatType::MAX, -FloatType::MAX, -FloatType::MAX),
        }
    }
}

impl BBox {
    /// Box spanning two corner points, in any order.
    pub fn new(a: WorldPoint, b: WorldPoint) -> BBox {
        let mut bbox = BBox::default();
        bbox.set(a, b);
        bbox
    }

    pub fn from_point(point: WorldPoint) -> BBox {
        BBox {
            min: point,
            max: point,
        }
    }

    /// Restores the uninitialized sentinel state.
    pub fn reset(&mut self) {
        *self = BBox::default();
    }

    /// Reinitializes the box from two corner points, in any order.
    pub fn set(&mut self, a: WorldPoint, b: WorldPoint) {
        self.min = a.coords.inf(&b.coords).into();
        self.max = a.coords.sup(&b.coords).into();
    }

    pub fn initialized(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Grows the box to contain `point`. Valid on an uninitialized box.
    pub fn union_point(&mut self, point: &WorldPoint) {
        self.min = self.min.coords.inf(&point.coords).into();
        self.max = self.max.coords.sup(&point.coords).into();
    }

    /// Grows the box to contain `other`. Valid on an uninitialized box.
    pub fn union(&mut self, other: &BBox) {
        self.min = self.min.coords.inf(&other.min.coords).into();
        self.max = self.max.coords.sup(&other.max.coords).into();
    }

    pub fn get_extent(&self) -> WorldVector {
        debug_assert!(self.initialized());
        self.max - self.min
    }

    pub fn get_center(&self) -> WorldPoint {
        debug_assert!(self.initialized());
        self.min + self.get_extent() * 0.5
    }

    /// Index of the longest axis (0 = x, 1 = y, 2 = z), used by
    /// longest-axis BVH splits.
    pub fn max_dimension(&self) -> usize {
        debug_assert!(self.initialized());
        let extent = self.get_extent();
        if extent.x > extent.y {
            if extent.x > extent.z { 0 } else { 2 }
        } else if extent.y > extent.z {
            1
        } else {
            2
        }
    }

    /// Length of the longest axis.
    pub fn get_max_dimension(&self) -> FloatType {
        self.get_extent()[self.max_dimension()]
    }

    /// Total area of the six faces, the quantity minimized by
    /// surface-area-heuristic BVH splits.
    pub fn surface_area(&self) -> FloatType {
        debug_assert!(self.initialized());
        let e = self.get_extent();
        2.0 * (e.x * e.y + e.x * e.z + e.y * e.z)
    }

    pub fn volume(&self) -> FloatType {
        debug_assert!(self.initialized());
        let e = self.get_extent();
        e.x * e.y * e.z
    }

    /// Corner `i` of 8, bit 0 selecting x, bit 1 y, bit 2 z (set = max).
    pub fn corner(&self, i: usize) -> WorldPoint {
        debug_assert!(self.initialized());
        debug_assert!(i < 8);
        WorldPoint::new(
            if i & 1 != 0 { self.max.x } else { self.min.x },
            if i & 2 != 0 { self.max.y } else { self.min.y },
            if i & 4 != 0 { self.max.z } else { self.min.z },
        )
    }

    /// True if the boxes overlap, boundary contact included.
    pub fn intersects(&self, other: &BBox) -> bool {
        debug_assert!(self.initialized());
        debug_assert!(other.initialized());
        let x = (self.max.x >= other.min.x) && (self.min.x <= other.max.x);
        let y = (self.max.y >= other.min.y) && (self.min.y <= other.max.y);
        let z = (self.max.z >= other.min.z) && (self.min.z <= other.max.z);
        x && y && z
    }

    /// True if `point` is in the box, boundary included.
    pub fn inside(&self, point: &WorldPoint) -> bool {
        debug_assert!(self.initialized());
        (point.x >= self.min.x && point.x <= self.max.x)
            && (point.y >= self.min.y && point.y <= self.max.y)
            && (point.z >= self.min.z && point.z <= self.max.z)
    }

    /// Scales the box about its center.
    pub fn scale(&mut self, factor: FloatType) {
        debug_assert!(self.initialized());
        let half = self.get_extent() * (factor * 0.5);
        let center = self.get_center();
        self.min = center - half;
        self.max = center + half;
    }

    /// Nudges every bound one representable float outward; the smallest
    /// possible growth that still guarantees containment after rounding.
    pub fn scale_next_up(&mut self) {
        debug_assert!(self.initialized());
        self.min = self.min.map(|x| x.next_down());
        self.max = self.max.map(|x| x.next_up());
    }

    /// Nudges every bound one representable float inward.
    pub fn scale_next_down(&mut self) {
        debug_assert!(self.initialized());
        self.min = self.min.map(|x| x.next_up());
        self.max = self.max.map(|x| x.next_down());
    }

    /// Transforms all 8 corners and rebuilds the box around them.
    pub fn apply_transformation(&mut self, matrix: &WorldMatrix) {
        debug_assert!(self.initialized());
        let old = *self;
        self.reset();
        for i in 0..8 {
            self.union_point(&matrix.transform_point(&old.corner(i)));
        }
    }

    /// Transform for affine matrices, accumulating per-axis min/max of the
    /// rotated extents directly (Arvo's method) instead of visiting the
    /// corners.
    pub fn apply_transformation_aa(&mut self, matrix: &WorldMatrix) {
        debug_assert!(self.initialized());
        let translation = WorldVector::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)]);
        let mut min = translation;
        let mut max = translation;
        for i in 0..3 {
            for j in 0..3 {
                let a = matrix[(i, j)] * self.min[j];
                let b = matrix[(i, j)] * self.max[j];
                min[i] += a.min(b);
                max[i] += a.max(b);
            }
        }
        self.min = min.into();
        self.max = max.into();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::test::{BBoxWrapper, WorldPointWrapper};
    use assert2::assert;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test]
    fn default_is_uninitialized() {
        let bbox = BBox::default();
        assert!(!bbox.initialized());
    }

    #[test]
    fn union_point_initializes() {
        let mut bbox = BBox::default();
        bbox.union_point(&WorldPoint::new(1.0, 2.0, 3.0));
        assert!(bbox.initialized());
        assert!(bbox.min == WorldPoint::new(1.0, 2.0, 3.0));
        assert!(bbox.max == WorldPoint::new(1.0, 2.0, 3.0));
        assert!(bbox.volume() == 0.0);
    }

    #[test]
    fn new_reorders_corners() {
        let bbox = BBox::new(
            WorldPoint::new(5.0, -1.0, 3.0),
            WorldPoint::new(-5.0, 1.0, 0.0),
        );
        assert!(bbox.min == WorldPoint::new(-5.0, -1.0, 0.0));
        assert!(bbox.max == WorldPoint::new(5.0, 1.0, 3.0));
    }

    #[test]
    fn reset_restores_sentinel() {
        let mut bbox = BBox::new(WorldPoint::origin(), WorldPoint::new(1.0, 1.0, 1.0));
        bbox.reset();
        assert!(!bbox.initialized());
    }

    #[test]
    fn geometric_queries() {
        let bbox = BBox::new(
            WorldPoint::new(0.0, 0.0, 0.0),
            WorldPoint::new(1.0, 2.0, 4.0),
        );
        assert!(bbox.get_extent() == WorldVector::new(1.0, 2.0, 4.0));
        assert!(bbox.get_center() == WorldPoint::new(0.5, 1.0, 2.0));
        assert!(bbox.max_dimension() == 2);
        assert!(bbox.get_max_dimension() == 4.0);
        assert!(bbox.surface_area() == 2.0 * (2.0 + 4.0 + 8.0));
        assert!(bbox.volume() == 8.0);
    }

    #[test_case(0, 0.0, 0.0, 0.0)]
    #[test_case(1, 1.0, 0.0, 0.0)]
    #[test_case(2, 0.0, 2.0, 0.0)]
    #[test_case(7, 1.0, 2.0, 4.0)]
    fn corner_bit_indexing(i: usize, x: FloatType, y: FloatType, z: FloatType) {
        let bbox = BBox::new(
            WorldPoint::new(0.0, 0.0, 0.0),
            WorldPoint::new(1.0, 2.0, 4.0),
        );
        assert!(bbox.corner(i) == WorldPoint::new(x, y, z));
    }

    #[test]
    fn intersects_boundary_contact_counts() {
        let a = BBox::new(WorldPoint::origin(), WorldPoint::new(1.0, 1.0, 1.0));
        let b = BBox::new(WorldPoint::new(1.0, 0.0, 0.0), WorldPoint::new(2.0, 1.0, 1.0));
        let c = BBox::new(WorldPoint::new(1.1, 0.0, 0.0), WorldPoint::new(2.0, 1.0, 1.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn scale_about_center() {
        let mut bbox = BBox::new(
            WorldPoint::new(1.0, 1.0, 1.0),
            WorldPoint::new(3.0, 3.0, 3.0),
        );
        bbox.scale(2.0);
        assert!(bbox.min == WorldPoint::new(0.0, 0.0, 0.0));
        assert!(bbox.max == WorldPoint::new(4.0, 4.0, 4.0));
    }

    #[test]
    fn scale_next_up_strictly_contains() {
        let original = BBox::new(
            WorldPoint::new(-1.0, 0.5, 3.0),
            WorldPoint::new(2.0, 1.5, 4.0),
        );
        let mut grown = original;
        grown.scale_next_up();
        for axis in 0..3 {
            assert!(grown.min[axis] < original.min[axis]);
            assert!(grown.max[axis] > original.max[axis]);
        }

        let mut back = grown;
        back.scale_next_down();
        assert!(back == original);
    }

    #[test]
    fn translation_transforms_shift_exactly() {
        let mut corner_based = BBox::new(
            WorldPoint::new(0.0, 1.0, 2.0),
            WorldPoint::new(1.0, 2.0, 3.0),
        );
        let mut axis_aligned = corner_based;

        let translation = WorldMatrix::new_translation(&WorldVector::new(10.0, -5.0, 0.25));
        corner_based.apply_transformation(&translation);
        axis_aligned.apply_transformation_aa(&translation);

        let expected = BBox::new(
            WorldPoint::new(10.0, -4.0, 2.25),
            WorldPoint::new(11.0, -3.0, 3.25),
        );
        assert!(corner_based == expected);
        assert!(axis_aligned == expected);
    }

    #[test]
    fn rotation_transforms_agree() {
        let mut corner_based = BBox::new(
            WorldPoint::new(-1.0, -2.0, -3.0),
            WorldPoint::new(4.0, 5.0, 6.0),
        );
        let mut axis_aligned = corner_based;

        let matrix = WorldMatrix::new_rotation(WorldVector::new(0.3, -0.7, 0.1))
            .append_translation(&WorldVector::new(1.0, 2.0, 3.0));
        corner_based.apply_transformation(&matrix);
        axis_aligned.apply_transformation_aa(&matrix);

        for axis in 0..3 {
            assert!((corner_based.min[axis] - axis_aligned.min[axis]).abs() < 1e-4);
            assert!((corner_based.max[axis] - axis_aligned.max[axis]).abs() < 1e-4);
        }
    }

    proptest! {
        /// Union contains both inputs and is the smallest box doing so.
        #[test]
        fn union_is_minimal_container(a: BBoxWrapper, b: BBoxWrapper) {
            let mut u = *a;
            u.union(&b);

            for i in 0..8 {
                prop_assert!(u.inside(&a.corner(i)));
                prop_assert!(u.inside(&b.corner(i)));
            }
            for axis in 0..3 {
                prop_assert!(u.min[axis] == a.min[axis].min(b.min[axis]));
                prop_assert!(u.max[axis] == a.max[axis].max(b.max[axis]));
            }
        }

        /// Union is commutative; folding from the sentinel in any order is
        /// associative.
        #[test]
        fn union_commutes_and_associates(a: BBoxWrapper, b: BBoxWrapper, c: BBoxWrapper) {
            let mut ab = *a;
            ab.union(&b);
            let mut ba = *b;
            ba.union(&a);
            prop_assert!(ab == ba);

            let mut ab_c = ab;
            ab_c.union(&c);
            let mut bc = *b;
            bc.union(&c);
            let mut a_bc = *a;
            a_bc.union(&bc);
            prop_assert!(ab_c == a_bc);

            let mut from_sentinel = BBox::default();
            from_sentinel.union(&a);
            from_sentinel.union(&b);
            from_sentinel.union(&c);
            prop_assert!(from_sentinel == ab_c);
        }

        #[test]
        fn intersects_is_symmetric(a: BBoxWrapper, b: BBoxWrapper) {
            prop_assert!(a.intersects(&b) == b.intersects(&a));
        }

        #[test]
        fn inside_after_union_point(bbox: BBoxWrapper, point: WorldPointWrapper) {
            let mut grown = *bbox;
            grown.union_point(&point);
            prop_assert!(grown.inside(&point));
            prop_assert!(grown.intersects(&bbox));
        }
    }
}
