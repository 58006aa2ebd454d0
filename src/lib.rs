mod camera;
pub mod geometry;
mod ray_packet;
mod trackball;

pub use camera::{Camera, CameraControl, Interpolation, MAX_ZOOM, MIN_ZOOM, Projection};
pub use ray_packet::{RAYPACKET_DIM, RAYPACKET_RAYS_PER_PACKET, RayPacket};
