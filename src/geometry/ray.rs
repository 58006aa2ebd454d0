use crate::geometry::{FloatType, PlanePoint, WorldPoint, WorldVector};

/// Sign-per-axis classification of a ray direction, one letter per axis
/// (x, y, z): M = negative, P = positive, O = zero.
///
/// These are the populated cases of the 3^3 sign enumeration; the all-zero
/// combination cannot occur for a non-zero direction and has no variant, so
/// matches over this enum are exhaustive without a fallback arm.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RayClassification {
    Mmm,
    Mmp,
    Mpm,
    Mpp,
    Pmm,
    Pmp,
    Ppm,
    Ppp,
    Poo,
    Moo,
    Opo,
    Omo,
    Oop,
    Oom,
    Omm,
    Omp,
    Opm,
    Opp,
    Mom,
    Mop,
    Pom,
    Pop,
    Mmo,
    Mpo,
    Pmo,
    Ppo,
}

/// A ray with the precomputed tables used by the box intersection tests:
/// componentwise inverse direction and per-axis sign for the slab test,
/// slope classification plus cross-slope ratios and intercepts for the
/// slope-classified test (Eisemann, Grosch, Müller, Magnor: "Fast Ray/
/// Axis-Aligned Bounding Box Overlap Tests using Ray Slopes").
///
/// All fields are derived once in [`Ray::new`] and never mutated.
#[derive(Copy, Clone, Debug)]
pub struct Ray {
    pub origin: WorldPoint,
    /// Direction of the ray, not necessarily normalized
    pub direction: WorldVector,

    /// Componentwise inverse of the ray direction.
    /// Zeros in direction turn into infinities with the sign of the zero.
    pub inv_direction: WorldVector,

    /// Per axis: 1 if the direction component is negative, else 0.
    /// Indexes the "near" box corner in the slab test without branching.
    pub dir_is_neg: [usize; 3],

    pub classification: RayClassification,

    // Cross-slope ratios between pairs of direction components
    pub ibyj: FloatType,
    pub jbyi: FloatType,
    pub jbyk: FloatType,
    pub kbyj: FloatType,
    pub ibyk: FloatType,
    pub kbyi: FloatType,

    // Precomputed intercepts of the ray projected to the coordinate planes
    pub c_xy: FloatType,
    pub c_xz: FloatType,
    pub c_yx: FloatType,
    pub c_yz: FloatType,
    pub c_zx: FloatType,
    pub c_zy: FloatType,
}

fn classify(direction: &WorldVector) -> RayClassification {
    use RayClassification::*;

    // -0.0 classifies as O, same as +0.0
    let m = |x: FloatType| x < 0.0;
    let o = |x: FloatType| x == 0.0;

    let (i, j, k) = (direction.x, direction.y, direction.z);

    match ((m(i), o(i)), (m(j), o(j)), (m(k), o(k))) {
        ((true, _), (true, _), (true, _)) => Mmm,
        ((true, _), (true, _), (false, false)) => Mmp,
        ((true, _), (true, _), (false, true)) => Mmo,
        ((true, _), (false, false), (true, _)) => Mpm,
        ((true, _), (false, false), (false, false)) => Mpp,
        ((true, _), (false, false), (false, true)) => Mpo,
        ((true, _), (false, true), (true, _)) => Mom,
        ((true, _), (false, true), (false, false)) => Mop,
        ((true, _), (false, true), (false, true)) => Moo,
        ((false, false), (true, _), (true, _)) => Pmm,
        ((false, false), (true, _), (false, false)) => Pmp,
        ((false, false), (true, _), (false, true)) => Pmo,
        ((false, false), (false, false), (true, _)) => Ppm,
        ((false, false), (false, false), (false, false)) => Ppp,
        ((false, false), (false, false), (false, true)) => Ppo,
        ((false, false), (false, true), (true, _)) => Pom,
        ((false, false), (false, true), (false, false)) => Pop,
        ((false, false), (false, true), (false, true)) => Poo,
        ((false, true), (true, _), (true, _)) => Omm,
        ((false, true), (true, _), (false, false)) => Omp,
        ((false, true), (true, _), (false, true)) => Omo,
        ((false, true), (false, false), (true, _)) => Opm,
        ((false, true), (false, false), (false, false)) => Opp,
        ((false, true), (false, false), (false, true)) => Opo,
        ((false, true), (false, true), (true, _)) => Oom,
        ((false, true), (false, true), (false, false)) => Oop,
        ((false, true), (false, true), (false, true)) => {
            unreachable!("ray direction must be non-zero")
        }
    }
}

impl Ray {
    /// Builds a ray and its derived tables.
    ///
    /// `direction` must be non-zero but does not have to be normalized.
    /// Zero direction components are fine; their inverse becomes an
    /// infinity, which both intersection tests are written to handle.
    pub fn new(origin: WorldPoint, direction: WorldVector) -> Ray {
        let inv_direction = direction.map(|x| 1.0 / x);

        // Taken from the inverse so that a -0.0 component (inverse -inf)
        // still picks the correct near corner in the slab test.
        let dir_is_neg = [
            (inv_direction.x < 0.0) as usize,
            (inv_direction.y < 0.0) as usize,
            (inv_direction.z < 0.0) as usize,
        ];

        let (i, j, k) = (direction.x, direction.y, direction.z);

        let ibyj = i * inv_direction.y;
        let jbyi = j * inv_direction.x;
        let jbyk = j * inv_direction.z;
        let kbyj = k * inv_direction.y;
        let ibyk = i * inv_direction.z;
        let kbyi = k * inv_direction.x;

        Ray {
            origin,
            direction,
            inv_direction,
            dir_is_neg,
            classification: classify(&direction),
            ibyj,
            jbyi,
            jbyk,
            kbyj,
            ibyk,
            kbyi,
            c_xy: origin.y - jbyi * origin.x,
            c_xz: origin.z - kbyi * origin.x,
            c_yx: origin.x - ibyj * origin.y,
            c_yz: origin.z - kbyj * origin.y,
            c_zx: origin.x - ibyk * origin.z,
            c_zy: origin.y - jbyk * origin.z,
        }
    }

    /// Point at parameter `t` along the ray.
    pub fn at(&self, t: FloatType) -> WorldPoint {
        self.origin + self.direction * t
    }

    /// The x/y projection of [`Ray::at`], used by 2D containment queries.
    pub fn at_2d(&self, t: FloatType) -> PlanePoint {
        PlanePoint::new(
            self.origin.x + self.direction.x * t,
            self.origin.y + self.direction.y * t,
        )
    }

    /// Quadratic ray/sphere test. Returns the near and far hit distances,
    /// or None if the ray line misses the sphere or the sphere is entirely
    /// behind the origin.
    pub fn intersect_sphere(
        &self,
        center: WorldPoint,
        radius: FloatType,
    ) -> Option<(FloatType, FloatType)> {
        let oc = self.origin - center;
        let a = self.direction.dot(&self.direction);
        let b = oc.dot(&self.direction);
        let c = oc.dot(&oc) - radius * radius;
        let discriminant = b * b - a * c;

        if discriminant < 0.0 {
            return None;
        }

        let sqrt_disc = discriminant.sqrt();
        let t_near = (-b - sqrt_disc) / a;
        let t_far = (-b + sqrt_disc) / a;

        if t_far < 0.0 {
            return None;
        }

        Some((t_near, t_far))
    }
}
