use rand::Rng;
use rand_distr::UnitSphere;

use crate::camera::Camera;
use crate::geometry::{
    FloatType, Frustum, Ray, ScreenPoint, SubPixelPoint, SubPixelVector, WorldVector,
};

/// Packet tile edge length in pixels
pub const RAYPACKET_DIM: u32 = 8;
pub const RAYPACKET_RAYS_PER_PACKET: usize = (RAYPACKET_DIM * RAYPACKET_DIM) as usize;

/// A square tile of camera rays traced together, with a shared culling
/// frustum spanned by the tile's corner rays.
///
/// Rays are stored row-major, row 0 at the top of the tile; `rays[0]`,
/// `rays[7]`, `rays[56]` and `rays[63]` are the corners.
#[derive(Clone, Debug)]
pub struct RayPacket {
    pub rays: [Ray; RAYPACKET_RAYS_PER_PACKET],
    pub frustum: Frustum,
}

impl RayPacket {
    /// Packet anchored at `top_left`, one ray per pixel center.
    ///
    /// The whole tile must lie inside the camera's window.
    pub fn new(camera: &Camera, top_left: ScreenPoint) -> RayPacket {
        Self::from_rays(std::array::from_fn(|i| {
            let (dx, dy) = Self::offsets(i);
            camera.make_ray(ScreenPoint::new(top_left.x + dx, top_left.y + dy))
        }))
    }

    /// Packet whose rays are `stride` pixels apart, covering an
    /// `8 * stride` pixel square with 64 rays for coarse preview passes.
    pub fn with_stride(camera: &Camera, top_left: ScreenPoint, stride: u32) -> RayPacket {
        Self::from_rays(std::array::from_fn(|i| {
            let (dx, dy) = Self::offsets(i);
            camera.make_ray(ScreenPoint::new(
                top_left.x + dx * stride,
                top_left.y + dy * stride,
            ))
        }))
    }

    /// Packet anchored at a sub-pixel position; every ray is bilinearly
    /// interpolated from the camera's pixel tables.
    pub fn from_float_origin(camera: &Camera, top_left: SubPixelPoint) -> RayPacket {
        Self::from_rays(std::array::from_fn(|i| {
            let (dx, dy) = Self::offsets(i);
            camera.make_ray_at(SubPixelPoint::new(
                top_left.x + dx as FloatType,
                top_left.y + dy as FloatType,
            ))
        }))
    }

    /// Packet with the same sub-pixel displacement applied to every ray,
    /// for jittered supersampling with a shared sample pattern.
    pub fn with_pixel_displacement(
        camera: &Camera,
        top_left: ScreenPoint,
        displacement: SubPixelVector,
    ) -> RayPacket {
        Self::from_rays(std::array::from_fn(|i| {
            let (dx, dy) = Self::offsets(i);
            camera.make_ray_at(SubPixelPoint::new(
                top_left.x as FloatType + dx as FloatType + displacement.x,
                top_left.y as FloatType + dy as FloatType + displacement.y,
            ))
        }))
    }

    /// Packet with each ray direction independently perturbed by a random
    /// offset of the given magnitude, for soft depth-of-field style
    /// accumulation passes.
    pub fn with_direction_jitter<R: Rng>(
        camera: &Camera,
        top_left: ScreenPoint,
        jitter: FloatType,
        rng: &mut R,
    ) -> RayPacket {
        Self::from_rays(std::array::from_fn(|i| {
            let (dx, dy) = Self::offsets(i);
            let ray = camera.make_ray(ScreenPoint::new(top_left.x + dx, top_left.y + dy));
            let offset: [FloatType; 3] = rng.sample(UnitSphere);
            let direction = (ray.direction + WorldVector::from(offset) * jitter).normalize();
            Ray::new(ray.origin, direction)
        }))
    }

    fn from_rays(rays: [Ray; RAYPACKET_RAYS_PER_PACKET]) -> RayPacket {
        let frustum = Frustum::from_corner_rays(
            &rays[0],
            &rays[(RAYPACKET_DIM - 1) as usize],
            &rays[RAYPACKET_RAYS_PER_PACKET - RAYPACKET_DIM as usize],
            &rays[RAYPACKET_RAYS_PER_PACKET - 1],
        );
        RayPacket { rays, frustum }
    }

    fn offsets(i: usize) -> (u32, u32) {
        (i as u32 % RAYPACKET_DIM, i as u32 / RAYPACKET_DIM)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::camera::{Camera, Projection};
    use crate::geometry::{BBox, ScreenSize, WorldPoint};
    use assert2::assert;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn test_camera(projection: Projection) -> Camera {
        Camera::builder()
            .distance(10.0)
            .projection(projection)
            .window_size(ScreenSize::new(800, 600))
            .build()
    }

    #[test]
    fn packet_matches_per_pixel_rays() {
        let camera = test_camera(Projection::Perspective);
        let packet = RayPacket::new(&camera, ScreenPoint::new(96, 200));

        for y in 0..RAYPACKET_DIM {
            for x in 0..RAYPACKET_DIM {
                let single = camera.make_ray(ScreenPoint::new(96 + x, 200 + y));
                let packed = &packet.rays[(y * RAYPACKET_DIM + x) as usize];
                assert!(packed.origin == single.origin);
                assert!(packed.direction == single.direction);
            }
        }
    }

    #[test]
    fn strided_packet_skips_pixels() {
        let camera = test_camera(Projection::Perspective);
        let packet = RayPacket::with_stride(&camera, ScreenPoint::new(0, 0), 4);

        for y in 0..RAYPACKET_DIM {
            for x in 0..RAYPACKET_DIM {
                let single = camera.make_ray(ScreenPoint::new(x * 4, y * 4));
                let packed = &packet.rays[(y * RAYPACKET_DIM + x) as usize];
                assert!(packed.origin == single.origin);
            }
        }
    }

    #[test]
    fn float_origin_at_integer_coordinates_matches() {
        let camera = test_camera(Projection::Perspective);
        let exact = RayPacket::new(&camera, ScreenPoint::new(96, 200));
        let float = RayPacket::from_float_origin(&camera, SubPixelPoint::new(96.0, 200.0));

        for (a, b) in exact.rays.iter().zip(float.rays.iter()) {
            assert!((a.origin - b.origin).norm() < 1e-4);
            assert!((a.direction - b.direction).norm() < 1e-4);
        }
    }

    #[test]
    fn displacement_shifts_every_ray_the_same_way() {
        let camera = test_camera(Projection::Perspective);
        let base = RayPacket::new(&camera, ScreenPoint::new(96, 200));
        let shifted = RayPacket::with_pixel_displacement(
            &camera,
            ScreenPoint::new(96, 200),
            SubPixelVector::new(0.5, 0.5),
        );

        for (a, b) in base.rays.iter().zip(shifted.rays.iter()) {
            assert!(b.origin.x > a.origin.x);
            assert!(b.origin.y > a.origin.y);
        }
    }

    #[test]
    fn direction_jitter_stays_close_and_normalized() {
        let camera = test_camera(Projection::Perspective);
        let mut rng = SmallRng::seed_from_u64(7);
        let base = RayPacket::new(&camera, ScreenPoint::new(96, 200));
        let jittered =
            RayPacket::with_direction_jitter(&camera, ScreenPoint::new(96, 200), 0.01, &mut rng);

        for (a, b) in base.rays.iter().zip(jittered.rays.iter()) {
            assert!(a.origin == b.origin);
            assert!((b.direction.norm() - 1.0).abs() < 1e-5);
            assert!((a.direction - b.direction).norm() < 0.03);
        }
    }

    #[test]
    fn frustum_spans_the_packet_corner_rays() {
        let camera = test_camera(Projection::Perspective);
        let packet = RayPacket::new(&camera, ScreenPoint::new(396, 296));

        // A box a short way along the central ray is inside the tile's
        // frustum, a box far off to the side is not.
        let center = packet.rays[0].at(5.0);
        let near = BBox::new(
            WorldPoint::new(center.x - 0.1, center.y - 0.1, center.z - 0.1),
            WorldPoint::new(center.x + 0.1, center.y + 0.1, center.z + 0.1),
        );
        assert!(packet.frustum.intersect(&near));

        let far = BBox::new(
            WorldPoint::new(50.0, 50.0, center.z - 0.1),
            WorldPoint::new(51.0, 51.0, center.z + 0.1),
        );
        assert!(!packet.frustum.intersect(&far));
    }

    #[test]
    fn orthographic_packet_builds_a_frustum() {
        let camera = test_camera(Projection::Orthographic);
        let packet = RayPacket::new(&camera, ScreenPoint::new(396, 296));

        // Spans the whole beam cross-section, crossing all four planes
        let a = packet.rays[0].at(5.0);
        let b = packet.rays[RAYPACKET_RAYS_PER_PACKET - 1].at(5.0);
        let center = WorldPoint::from((a.coords + b.coords) * 0.5);
        let wide = BBox::new(
            WorldPoint::new(center.x - 1.0, center.y - 1.0, center.z - 0.1),
            WorldPoint::new(center.x + 1.0, center.y + 1.0, center.z + 0.1),
        );
        assert!(packet.frustum.intersect(&wide));
    }
}
