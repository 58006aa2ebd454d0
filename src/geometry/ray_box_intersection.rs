//! The two ray/AABB tests used by BVH traversal: a numeric slab test that
//! reports the entry/exit distances, and the slope-classified overlap test
//! (Eisemann, Grosch, Müller, Magnor: "Fast Ray/Axis-Aligned Bounding Box
//! Overlap Tests using Ray Slopes") dispatched over the ray's
//! precomputed sign classification.

use crate::geometry::{BBox, FloatType, Ray, RayClassification};

impl BBox {
    /// Slab-based ray intersection.
    ///
    /// Returns the entry and exit distances along the ray, or None on a
    /// miss. The entry distance is clamped to zero when the origin is
    /// inside the box; a box entirely behind the origin is a miss.
    pub fn intersect(&self, ray: &Ray) -> Option<(FloatType, FloatType)> {
        debug_assert!(self.initialized());

        let bounds = [&self.min, &self.max];

        // The near corner per axis is picked by the precomputed direction
        // sign, no comparison against the direction here.
        // 0 * inf produces NaN when the origin sits exactly on a slab
        // plane of an axis-parallel ray; blend that to an unbounded slab.
        let slab = |axis: usize| {
            let near = (bounds[ray.dir_is_neg[axis]][axis] - ray.origin[axis])
                * ray.inv_direction[axis];
            let far = (bounds[1 - ray.dir_is_neg[axis]][axis] - ray.origin[axis])
                * ray.inv_direction[axis];
            (
                if near.is_nan() { FloatType::NEG_INFINITY } else { near },
                if far.is_nan() { FloatType::INFINITY } else { far },
            )
        };

        let (mut tmin, mut tmax) = slab(0);

        let (tymin, tymax) = slab(1);
        if tmin > tymax || tymin > tmax {
            return None;
        }
        if tymin > tmin {
            tmin = tymin;
        }
        if tymax < tmax {
            tmax = tymax;
        }

        let (tzmin, tzmax) = slab(2);
        if tmin > tzmax || tzmin > tmax {
            return None;
        }
        if tzmin > tmin {
            tmin = tzmin;
        }
        if tzmax < tmax {
            tmax = tzmax;
        }

        if tmax < 0.0 {
            return None;
        }

        Some((tmin.max(0.0), tmax))
    }

    /// Boolean-only slope-classified overlap test.
    ///
    /// Each classification gets its own inequality sequence; rays whose
    /// classification does not match the actual direction signs are a
    /// construction bug, so there is no fallback arm.
    pub fn hit(&self, ray: &Ray) -> bool {
        debug_assert!(self.initialized());

        use RayClassification::*;

        let r = ray;
        let (x, y, z) = (r.origin.x, r.origin.y, r.origin.z);
        let (x0, y0, z0) = (self.min.x, self.min.y, self.min.z);
        let (x1, y1, z1) = (self.max.x, self.max.y, self.max.z);

        match r.classification {
            Mmm => !(x < x0
                || y < y0
                || z < z0
                || r.jbyi * x0 - y1 + r.c_xy > 0.0
                || r.ibyj * y0 - x1 + r.c_yx > 0.0
                || r.jbyk * z0 - y1 + r.c_zy > 0.0
                || r.kbyj * y0 - z1 + r.c_yz > 0.0
                || r.kbyi * x0 - z1 + r.c_xz > 0.0
                || r.ibyk * z0 - x1 + r.c_zx > 0.0),
            Mmp => !(x < x0
                || y < y0
                || z > z1
                || r.jbyi * x0 - y1 + r.c_xy > 0.0
                || r.ibyj * y0 - x1 + r.c_yx > 0.0
                || r.jbyk * z1 - y1 + r.c_zy > 0.0
                || r.kbyj * y0 - z0 + r.c_yz < 0.0
                || r.kbyi * x0 - z0 + r.c_xz < 0.0
                || r.ibyk * z1 - x1 + r.c_zx > 0.0),
            Mpm => !(x < x0
                || y > y1
                || z < z0
                || r.jbyi * x0 - y0 + r.c_xy < 0.0
                || r.ibyj * y1 - x1 + r.c_yx > 0.0
                || r.jbyk * z0 - y0 + r.c_zy < 0.0
                || r.kbyj * y1 - z1 + r.c_yz > 0.0
                || r.kbyi * x0 - z1 + r.c_xz > 0.0
                || r.ibyk * z0 - x1 + r.c_zx > 0.0),
            Mpp => !(x < x0
                || y > y1
                || z > z1
                || r.jbyi * x0 - y0 + r.c_xy < 0.0
                || r.ibyj * y1 - x1 + r.c_yx > 0.0
                || r.jbyk * z1 - y0 + r.c_zy < 0.0
                || r.kbyj * y1 - z0 + r.c_yz < 0.0
                || r.kbyi * x0 - z0 + r.c_xz < 0.0
                || r.ibyk * z1 - x1 + r.c_zx > 0.0),
            Pmm => !(x > x1
                || y < y0
                || z < z0
                || r.jbyi * x1 - y1 + r.c_xy > 0.0
                || r.ibyj * y0 - x0 + r.c_yx < 0.0
                || r.jbyk * z0 - y1 + r.c_zy > 0.0
                || r.kbyj * y0 - z1 + r.c_yz > 0.0
                || r.kbyi * x1 - z1 + r.c_xz > 0.0
                || r.ibyk * z0 - x0 + r.c_zx < 0.0),
            Pmp => !(x > x1
                || y < y0
                || z > z1
                || r.jbyi * x1 - y1 + r.c_xy > 0.0
                || r.ibyj * y0 - x0 + r.c_yx < 0.0
                || r.jbyk * z1 - y1 + r.c_zy > 0.0
                || r.kbyj * y0 - z0 + r.c_yz < 0.0
                || r.kbyi * x1 - z0 + r.c_xz < 0.0
                || r.ibyk * z1 - x0 + r.c_zx < 0.0),
            Ppm => !(x > x1
                || y > y1
                || z < z0
                || r.jbyi * x1 - y0 + r.c_xy < 0.0
                || r.ibyj * y1 - x0 + r.c_yx < 0.0
                || r.jbyk * z0 - y0 + r.c_zy < 0.0
                || r.kbyj * y1 - z1 + r.c_yz > 0.0
                || r.kbyi * x1 - z1 + r.c_xz > 0.0
                || r.ibyk * z0 - x0 + r.c_zx < 0.0),
            Ppp => !(x > x1
                || y > y1
                || z > z1
                || r.jbyi * x1 - y0 + r.c_xy < 0.0
                || r.ibyj * y1 - x0 + r.c_yx < 0.0
                || r.jbyk * z1 - y0 + r.c_zy < 0.0
                || r.kbyj * y1 - z0 + r.c_yz < 0.0
                || r.kbyi * x1 - z0 + r.c_xz < 0.0
                || r.ibyk * z1 - x0 + r.c_zx < 0.0),
            Omm => !(x < x0
                || x > x1
                || y < y0
                || z < z0
                || r.jbyk * z0 - y1 + r.c_zy > 0.0
                || r.kbyj * y0 - z1 + r.c_yz > 0.0),
            Omp => !(x < x0
                || x > x1
                || y < y0
                || z > z1
                || r.jbyk * z1 - y1 + r.c_zy > 0.0
                || r.kbyj * y0 - z0 + r.c_yz < 0.0),
            Opm => !(x < x0
                || x > x1
                || y > y1
                || z < z0
                || r.jbyk * z0 - y0 + r.c_zy < 0.0
                || r.kbyj * y1 - z1 + r.c_yz > 0.0),
            Opp => !(x < x0
                || x > x1
                || y > y1
                || z > z1
                || r.jbyk * z1 - y0 + r.c_zy < 0.0
                || r.kbyj * y1 - z0 + r.c_yz < 0.0),
            Mom => !(y < y0
                || y > y1
                || x < x0
                || z < z0
                || r.kbyi * x0 - z1 + r.c_xz > 0.0
                || r.ibyk * z0 - x1 + r.c_zx > 0.0),
            Mop => !(y < y0
                || y > y1
                || x < x0
                || z > z1
                || r.kbyi * x0 - z0 + r.c_xz < 0.0
                || r.ibyk * z1 - x1 + r.c_zx > 0.0),
            Pom => !(y < y0
                || y > y1
                || x > x1
                || z < z0
                || r.kbyi * x1 - z1 + r.c_xz > 0.0
                || r.ibyk * z0 - x0 + r.c_zx < 0.0),
            Pop => !(y < y0
                || y > y1
                || x > x1
                || z > z1
                || r.kbyi * x1 - z0 + r.c_xz < 0.0
                || r.ibyk * z1 - x0 + r.c_zx < 0.0),
            Mmo => !(z < z0
                || z > z1
                || x < x0
                || y < y0
                || r.jbyi * x0 - y1 + r.c_xy > 0.0
                || r.ibyj * y0 - x1 + r.c_yx > 0.0),
            Mpo => !(z < z0
                || z > z1
                || x < x0
                || y > y1
                || r.jbyi * x0 - y0 + r.c_xy < 0.0
                || r.ibyj * y1 - x1 + r.c_yx > 0.0),
            Pmo => !(z < z0
                || z > z1
                || x > x1
                || y < y0
                || r.jbyi * x1 - y1 + r.c_xy > 0.0
                || r.ibyj * y0 - x0 + r.c_yx < 0.0),
            Ppo => !(z < z0
                || z > z1
                || x > x1
                || y > y1
                || r.jbyi * x1 - y0 + r.c_xy < 0.0
                || r.ibyj * y1 - x0 + r.c_yx < 0.0),
            Moo => !(x < x0 || y < y0 || y > y1 || z < z0 || z > z1),
            Poo => !(x > x1 || y < y0 || y > y1 || z < z0 || z > z1),
            Omo => !(y < y0 || x < x0 || x > x1 || z < z0 || z > z1),
            Opo => !(y > y1 || x < x0 || x > x1 || z < z0 || z > z1),
            Oom => !(z < z0 || x < x0 || x > x1 || y < y0 || y > y1),
            Oop => !(z > z1 || x < x0 || x > x1 || y < y0 || y > y1),
        }
    }

    /// Slope-classified overlap test that also reports the entry distance
    /// (the maximum of the per-axis plane distances; negative when the
    /// origin is inside the box).
    pub fn hit_distance(&self, ray: &Ray) -> Option<FloatType> {
        debug_assert!(self.initialized());

        if !self.hit(ray) {
            return None;
        }

        use RayClassification::*;

        let r = ray;
        let (x, y, z) = (r.origin.x, r.origin.y, r.origin.z);
        let (x0, y0, z0) = (self.min.x, self.min.y, self.min.z);
        let (x1, y1, z1) = (self.max.x, self.max.y, self.max.z);

        // Entry plane per axis: the max face when the direction component
        // is negative, the min face when positive, no term for a zero
        // component.
        let tx_m = || (x1 - x) * r.inv_direction.x;
        let tx_p = || (x0 - x) * r.inv_direction.x;
        let ty_m = || (y1 - y) * r.inv_direction.y;
        let ty_p = || (y0 - y) * r.inv_direction.y;
        let tz_m = || (z1 - z) * r.inv_direction.z;
        let tz_p = || (z0 - z) * r.inv_direction.z;

        let t = match r.classification {
            Mmm => tx_m().max(ty_m()).max(tz_m()),
            Mmp => tx_m().max(ty_m()).max(tz_p()),
            Mpm => tx_m().max(ty_p()).max(tz_m()),
            Mpp => tx_m().max(ty_p()).max(tz_p()),
            Pmm => tx_p().max(ty_m()).max(tz_m()),
            Pmp => tx_p().max(ty_m()).max(tz_p()),
            Ppm => tx_p().max(ty_p()).max(tz_m()),
            Ppp => tx_p().max(ty_p()).max(tz_p()),
            Omm => ty_m().max(tz_m()),
            Omp => ty_m().max(tz_p()),
            Opm => ty_p().max(tz_m()),
            Opp => ty_p().max(tz_p()),
            Mom => tx_m().max(tz_m()),
            Mop => tx_m().max(tz_p()),
            Pom => tx_p().max(tz_m()),
            Pop => tx_p().max(tz_p()),
            Mmo => tx_m().max(ty_m()),
            Mpo => tx_m().max(ty_p()),
            Pmo => tx_p().max(ty_m()),
            Ppo => tx_p().max(ty_p()),
            Moo => tx_m(),
            Poo => tx_p(),
            Omo => ty_m(),
            Opo => ty_p(),
            Oom => tz_m(),
            Oop => tz_p(),
        };

        Some(t)
    }
}
