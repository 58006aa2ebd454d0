use crate::geometry::{BBox, Ray, WorldPoint, WorldVector};

/// Four-plane volume spanned by the corner rays of a viewport tile,
/// used to reject bounding boxes for a whole ray packet at once.
///
/// There are no near/far planes; this is deliberately an incomplete,
/// conservative culling volume (see [`Frustum::intersect`]).
#[derive(Copy, Clone, Debug)]
pub struct Frustum {
    /// Plane reference points: the corner ray origins
    /// (top-left, top-right, bottom-right, bottom-left).
    point: [WorldPoint; 4],
    /// Plane normals (top, right, bottom, left), not normalized.
    normal: [WorldVector; 4],
}

impl Frustum {
    /// Builds the frustum from the four corner rays of a tile.
    ///
    /// The plane normals come from cross products of adjacent ray
    /// directions. When the four directions are parallel (orthographic
    /// projection) those cross products vanish, so the normals are derived
    /// from the corner origin differences instead, with the same
    /// orientation convention.
    pub fn from_corner_rays(
        top_left: &Ray,
        top_right: &Ray,
        bottom_left: &Ray,
        bottom_right: &Ray,
    ) -> Frustum {
        let point = [
            top_left.origin,
            top_right.origin,
            bottom_right.origin,
            bottom_left.origin,
        ];

        let normal = if top_right.direction == top_left.direction {
            // Parallel rays: plane normals from the tile edges and the
            // shared direction
            let dir = top_left.direction;
            [
                (top_right.origin - top_left.origin).cross(&dir),
                (bottom_right.origin - top_right.origin).cross(&dir),
                (bottom_left.origin - bottom_right.origin).cross(&dir),
                (top_left.origin - bottom_left.origin).cross(&dir),
            ]
        } else {
            [
                top_right.direction.cross(&top_left.direction),
                bottom_right.direction.cross(&top_right.direction),
                bottom_left.direction.cross(&bottom_right.direction),
                top_left.direction.cross(&bottom_left.direction),
            ]
        };

        Frustum { point, normal }
    }

    pub fn plane(&self, i: usize) -> (WorldPoint, WorldVector) {
        (self.point[i], self.normal[i])
    }

    /// Approximate frustum/box test: a plane "fails" to separate when any
    /// box corner lies on its negative side, and the box is kept only when
    /// every plane fails.
    ///
    /// This is not a sound separating-axis test. Near a frustum corner it
    /// can keep boxes that are entirely outside the volume; traversal
    /// depends on exactly this behavior, so it is preserved as-is.
    pub fn intersect(&self, bbox: &BBox) -> bool {
        debug_assert!(bbox.initialized());

        let mut failed_planes = 0;
        for i in 0..4 {
            for corner in 0..8 {
                if self.normal[i].dot(&(bbox.corner(corner) - self.point[i])) < 0.0 {
                    failed_planes += 1;
                    break;
                }
            }
        }

        failed_planes == 4
    }
}
