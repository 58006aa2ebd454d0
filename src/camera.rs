use assert2::assert;
use bon::bon;
use nalgebra::{Orthographic3, Perspective3, UnitQuaternion};

use crate::geometry::{
    FloatType, Ray, ScreenPoint, ScreenSize, SubPixelPoint, WorldMatrix, WorldPoint, WorldVector,
};
use crate::trackball;

pub const MIN_ZOOM: FloatType = 0.10;
pub const MAX_ZOOM: FloatType = 1.25;

/// Vertical field of view of the perspective projection; the orthographic
/// half-extent is derived from the same angle so toggling projections
/// keeps a comparable footprint at the look-at distance.
const FOV_Y_DEG: FloatType = 45.0;

const NEAR_D: FloatType = 0.10;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Projection {
    Orthographic,
    Perspective,
}

/// Easing applied to the animation parameter of [`CameraControl::interpolate`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Interpolation {
    Linear,
    EasingInOut,
    Bezier,
}

/// The interaction surface the GUI shell drives. There is a single
/// trackball-based implementation; the trait exists so the shell and the
/// renderer depend on the capabilities, not the camera internals.
pub trait CameraControl {
    fn set_look_at_pos(&mut self, pos: WorldPoint);
    fn drag(&mut self, new_mouse_position: ScreenPoint);
    fn pan(&mut self, new_mouse_position: ScreenPoint);
    /// [`CameraControl::pan`], applied to the T1 animation target instead
    /// of the live state.
    fn pan_t1(&mut self, new_mouse_position: ScreenPoint);
    fn reset(&mut self);
    /// Sets the T1 animation target to the reset state.
    fn reset_t1(&mut self);
    /// Blends the live state between the T0 and T1 snapshots,
    /// `t` clamped to [0, 1] and eased by the configured [`Interpolation`].
    ///
    /// The camera itself is stateless about the animation: callers snapshot
    /// via [`Camera::set_t0_and_t1_current_state`], adjust T1, then feed a
    /// growing `t` and stop once it reaches 1.
    fn interpolate(&mut self, t: FloatType);
}

/// One endpoint of an animated camera transition.
#[derive(Copy, Clone, Debug)]
struct CameraState {
    camera_pos: WorldPoint,
    look_at_pos: WorldPoint,
    zoom: FloatType,
    rotation: UnitQuaternion<FloatType>,
    rotate_aux: WorldVector,
}

/// View/projection management and per-pixel ray generation tables.
///
/// All derived state (matrices, frustum geometry, the per-column/per-row
/// contribution vectors that make [`Camera::make_ray`] O(1)) is rebuilt
/// eagerly whenever position, zoom, rotation or window size change, so a
/// momentarily-frozen camera can be read from many worker threads while
/// packets are traced.
#[derive(Clone, Debug)]
pub struct Camera {
    projection: Projection,
    interpolation: Interpolation,

    window_size: ScreenSize,

    camera_pos_init: WorldPoint,
    camera_pos: WorldPoint,
    look_at_pos: WorldPoint,
    zoom: FloatType,
    /// Trackball orientation accumulated by [`CameraControl::drag`]
    rotation: UnitQuaternion<FloatType>,
    /// Auxiliary per-axis angles accumulated by `rotate_x/y/z`
    rotate_aux: WorldVector,

    t0: CameraState,
    t1: CameraState,

    last_position: ScreenPoint,
    parameters_changed: bool,

    // Everything below is derived cache
    view_matrix: WorldMatrix,
    view_matrix_inv: WorldMatrix,
    projection_matrix: WorldMatrix,
    projection_matrix_inv: WorldMatrix,

    ratio: FloatType,
    near_d: FloatType,
    far_d: FloatType,
    /// Near/far plane half extents
    nw: FloatType,
    nh: FloatType,
    fw: FloatType,
    fh: FloatType,

    // World-space camera basis, from the inverse view matrix
    pos: WorldPoint,
    forward: WorldVector,
    up: WorldVector,
    right: WorldVector,
    near_center: WorldPoint,
    far_center: WorldPoint,
    frustum_corners: [WorldPoint; 8],

    /// Normalized device x per pixel column / y per pixel row
    scan_nx: Vec<FloatType>,
    scan_ny: Vec<FloatType>,
    /// World-space contribution of each pixel column / row to the ray
    /// origin on the near plane
    right_nx: Vec<WorldVector>,
    up_ny: Vec<WorldVector>,
}

#[bon]
impl Camera {
    #[builder]
    pub fn new(
        /// Initial distance of the eye from the look-at point, in 3D units
        distance: FloatType,
        #[builder(default = Projection::Perspective)] projection: Projection,
        #[builder(default = Interpolation::Bezier)] interpolation: Interpolation,
        #[builder(default = ScreenSize::zeros())] window_size: ScreenSize,
    ) -> Self {
        assert!(distance > 0.0);

        let camera_pos_init = WorldPoint::new(0.0, 0.0, -distance);
        let initial_state = CameraState {
            camera_pos: camera_pos_init,
            look_at_pos: WorldPoint::origin(),
            zoom: 1.0,
            rotation: UnitQuaternion::identity(),
            rotate_aux: WorldVector::zeros(),
        };

        let mut camera = Camera {
            projection,
            interpolation,
            window_size,
            camera_pos_init,
            camera_pos: camera_pos_init,
            look_at_pos: WorldPoint::origin(),
            zoom: 1.0,
            rotation: UnitQuaternion::identity(),
            rotate_aux: WorldVector::zeros(),
            t0: initial_state,
            t1: initial_state,
            last_position: ScreenPoint::origin(),
            parameters_changed: true,
            view_matrix: WorldMatrix::identity(),
            view_matrix_inv: WorldMatrix::identity(),
            projection_matrix: WorldMatrix::identity(),
            projection_matrix_inv: WorldMatrix::identity(),
            ratio: 1.0,
            near_d: NEAR_D,
            far_d: distance * 2.0,
            nw: 0.0,
            nh: 0.0,
            fw: 0.0,
            fh: 0.0,
            pos: WorldPoint::origin(),
            forward: -WorldVector::z(),
            up: WorldVector::y(),
            right: WorldVector::x(),
            near_center: WorldPoint::origin(),
            far_center: WorldPoint::origin(),
            frustum_corners: [WorldPoint::origin(); 8],
            scan_nx: Vec::new(),
            scan_ny: Vec::new(),
            right_nx: Vec::new(),
            up_ny: Vec::new(),
        };

        camera.update_view_matrix();
        camera.rebuild_projection();
        camera
    }
}

impl Camera {
    pub fn get_projection(&self) -> Projection {
        self.projection
    }

    pub fn get_window_size(&self) -> ScreenSize {
        self.window_size
    }

    pub fn get_view_matrix(&self) -> WorldMatrix {
        self.view_matrix
    }

    pub fn get_view_matrix_inv(&self) -> WorldMatrix {
        self.view_matrix_inv
    }

    pub fn get_projection_matrix(&self) -> WorldMatrix {
        self.projection_matrix
    }

    pub fn get_projection_matrix_inv(&self) -> WorldMatrix {
        self.projection_matrix_inv
    }

    /// World-space eye position
    pub fn get_pos(&self) -> WorldPoint {
        self.pos
    }

    /// World-space forward (viewing) direction, unit length
    pub fn get_dir(&self) -> WorldVector {
        self.forward
    }

    pub fn get_look_at_pos(&self) -> WorldPoint {
        self.look_at_pos
    }

    pub fn get_zoom(&self) -> FloatType {
        self.zoom
    }

    /// Near then far plane corners, tl/tr/bl/br each
    pub fn get_frustum_corners(&self) -> &[WorldPoint; 8] {
        &self.frustum_corners
    }

    /// True if any camera parameter changed since the last call.
    /// The flag is consumed; renderers poll this to restart accumulation.
    pub fn parameters_changed(&mut self) -> bool {
        std::mem::take(&mut self.parameters_changed)
    }

    /// Stores the window size and rebuilds the projection and the
    /// per-pixel ray tables. A zero-area size is accepted; the tables are
    /// just left empty until a real size arrives.
    pub fn set_cur_window_size(&mut self, size: ScreenSize) {
        if self.window_size != size {
            log::trace!(
                target: "boardray::camera",
                "window resize {}x{} -> {}x{}",
                self.window_size.x, self.window_size.y, size.x, size.y,
            );
            self.window_size = size;
            self.parameters_changed = true;
            self.rebuild_projection();
        }
    }

    pub fn set_cur_mouse_position(&mut self, position: ScreenPoint) {
        self.last_position = position;
    }

    pub fn toggle_projection(&mut self) {
        self.projection = match self.projection {
            Projection::Orthographic => Projection::Perspective,
            Projection::Perspective => Projection::Orthographic,
        };
        log::trace!(target: "boardray::camera", "projection now {:?}", self.projection);
        self.parameters_changed = true;
        self.rebuild_projection();
    }

    /// Divides the zoom by `factor` and clamps it to
    /// [[`MIN_ZOOM`], [`MAX_ZOOM`]]. Returns whether anything changed:
    /// a factor of exactly 1, or pushing further past a bound the zoom
    /// already sits on, is a no-op.
    pub fn zoom(&mut self, factor: FloatType) -> bool {
        if factor == 1.0 {
            return false;
        }
        if (self.zoom == MIN_ZOOM && factor > 1.0) || (self.zoom == MAX_ZOOM && factor < 1.0) {
            return false;
        }

        self.zoom = (self.zoom / factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.camera_pos.z = self.camera_pos_init.z * self.zoom;

        self.parameters_changed = true;
        self.update_view_matrix();
        self.rebuild_projection();
        true
    }

    pub fn rotate_x(&mut self, angle: FloatType) {
        self.rotate_aux.x += angle;
        self.rotation_changed();
    }

    pub fn rotate_y(&mut self, angle: FloatType) {
        self.rotate_aux.y += angle;
        self.rotation_changed();
    }

    pub fn rotate_z(&mut self, angle: FloatType) {
        self.rotate_aux.z += angle;
        self.rotation_changed();
    }

    /// Snapshots both animation endpoints at the live state (the Idle
    /// position of the animation state machine, t = 0).
    pub fn set_t0_and_t1_current_state(&mut self) {
        let state = self.current_state();
        self.t0 = state;
        self.t1 = state;
    }

    /// Ray through the given pixel. O(1): both the origin offset on the
    /// near plane and the direction come from the precomputed per-column/
    /// per-row tables.
    pub fn make_ray(&self, pixel: ScreenPoint) -> Ray {
        debug_assert!((pixel.x as usize) < self.right_nx.len());
        debug_assert!((pixel.y as usize) < self.up_ny.len());

        let origin =
            self.near_center + self.right_nx[pixel.x as usize] + self.up_ny[pixel.y as usize];
        Ray::new(origin, self.ray_direction(&origin))
    }

    /// [`Camera::make_ray`] for sub-pixel positions, bilinearly
    /// interpolating between the four neighboring table entries.
    pub fn make_ray_at(&self, pixel: SubPixelPoint) -> Ray {
        debug_assert!(!self.right_nx.is_empty() && !self.up_ny.is_empty());

        let fx = pixel.x - pixel.x.floor();
        let fy = pixel.y - pixel.y.floor();

        let x0 = (pixel.x.floor().max(0.0) as usize).min(self.right_nx.len() - 1);
        let y0 = (pixel.y.floor().max(0.0) as usize).min(self.up_ny.len() - 1);
        let x1 = (x0 + 1).min(self.right_nx.len() - 1);
        let y1 = (y0 + 1).min(self.up_ny.len() - 1);

        let right = self.right_nx[x0].lerp(&self.right_nx[x1], fx);
        let up = self.up_ny[y0].lerp(&self.up_ny[y1], fy);

        let origin = self.near_center + right + up;
        Ray::new(origin, self.ray_direction(&origin))
    }

    fn ray_direction(&self, origin: &WorldPoint) -> WorldVector {
        match self.projection {
            Projection::Perspective => (origin - self.pos).normalize(),
            // All rays parallel
            Projection::Orthographic => self.forward,
        }
    }

    fn current_state(&self) -> CameraState {
        CameraState {
            camera_pos: self.camera_pos,
            look_at_pos: self.look_at_pos,
            zoom: self.zoom,
            rotation: self.rotation,
            rotate_aux: self.rotate_aux,
        }
    }

    fn rotation_changed(&mut self) {
        self.parameters_changed = true;
        self.update_view_matrix();
        self.update_frustum();
    }

    fn aux_rotation(&self) -> UnitQuaternion<FloatType> {
        UnitQuaternion::from_axis_angle(&WorldVector::x_axis(), self.rotate_aux.x)
            * UnitQuaternion::from_axis_angle(&WorldVector::y_axis(), self.rotate_aux.y)
            * UnitQuaternion::from_axis_angle(&WorldVector::z_axis(), self.rotate_aux.z)
    }

    fn update_view_matrix(&mut self) {
        let rotation = self.rotation * self.aux_rotation();

        self.view_matrix = WorldMatrix::new_translation(&self.camera_pos.coords)
            * rotation.to_homogeneous()
            * WorldMatrix::new_translation(&-self.look_at_pos.coords);

        // The view matrix is rigid, invert it from its parts instead of
        // numerically
        self.view_matrix_inv = WorldMatrix::new_translation(&self.look_at_pos.coords)
            * rotation.inverse().to_homogeneous()
            * WorldMatrix::new_translation(&-self.camera_pos.coords);
    }

    /// Recomputes the projection matrix and the per-pixel NDC scan tables
    /// for the current window size, then the world-space frustum.
    fn rebuild_projection(&mut self) {
        if self.window_size.x == 0 || self.window_size.y == 0 {
            self.scan_nx.clear();
            self.scan_ny.clear();
            self.right_nx.clear();
            self.up_ny.clear();
            return;
        }

        let width = self.window_size.x as FloatType;
        let height = self.window_size.y as FloatType;
        self.ratio = width / height;
        self.near_d = NEAR_D;
        self.far_d = self.camera_pos_init.coords.norm() * 2.0;

        let tan_half_fov = (FOV_Y_DEG.to_radians() * 0.5).tan();

        match self.projection {
            Projection::Perspective => {
                let perspective = Perspective3::new(
                    self.ratio,
                    FOV_Y_DEG.to_radians(),
                    self.near_d,
                    self.far_d,
                );
                self.projection_matrix = perspective.to_homogeneous();
                self.projection_matrix_inv = perspective.inverse();

                self.nh = tan_half_fov * self.near_d;
                self.nw = self.nh * self.ratio;
                self.fh = tan_half_fov * self.far_d;
                self.fw = self.fh * self.ratio;
            }
            Projection::Orthographic => {
                // Half extent scaled so the footprint at the look-at
                // distance matches the perspective projection at the same
                // zoom
                let half_h = tan_half_fov * self.camera_pos_init.coords.norm() * self.zoom;
                let half_w = half_h * self.ratio;
                let orthographic = Orthographic3::new(
                    -half_w, half_w, -half_h, half_h, self.near_d, self.far_d,
                );
                self.projection_matrix = orthographic.to_homogeneous();
                self.projection_matrix_inv = orthographic.inverse();

                self.nh = half_h;
                self.nw = half_w;
                self.fh = half_h;
                self.fw = half_w;
            }
        }

        self.scan_nx = (0..self.window_size.x)
            .map(|x| (2 * x) as FloatType / width - 1.0)
            .collect();
        self.scan_ny = (0..self.window_size.y)
            .map(|y| (2 * y) as FloatType / height - 1.0)
            .collect();

        self.update_frustum();
    }

    /// Derives the world-space camera basis and frustum corners from the
    /// inverse view matrix and fills the per-column right / per-row up
    /// contribution tables.
    fn update_frustum(&mut self) {
        self.right = self.view_matrix_inv.transform_vector(&WorldVector::x());
        self.up = self.view_matrix_inv.transform_vector(&WorldVector::y());
        self.forward = self.view_matrix_inv.transform_vector(&-WorldVector::z());
        self.pos = self.view_matrix_inv.transform_point(&WorldPoint::origin());

        self.near_center = self.pos + self.forward * self.near_d;
        self.far_center = self.pos + self.forward * self.far_d;

        let n_up = self.up * self.nh;
        let n_right = self.right * self.nw;
        let f_up = self.up * self.fh;
        let f_right = self.right * self.fw;
        self.frustum_corners = [
            self.near_center - n_right + n_up,
            self.near_center + n_right + n_up,
            self.near_center - n_right - n_up,
            self.near_center + n_right - n_up,
            self.far_center - f_right + f_up,
            self.far_center + f_right + f_up,
            self.far_center - f_right - f_up,
            self.far_center + f_right - f_up,
        ];

        self.right_nx = self
            .scan_nx
            .iter()
            .map(|ndc| self.right * (self.nw * ndc))
            .collect();
        self.up_ny = self
            .scan_ny
            .iter()
            .map(|ndc| self.up * (self.nh * ndc))
            .collect();
    }

    fn normalized_mouse(&self, position: ScreenPoint) -> SubPixelPoint {
        let width = self.window_size.x as FloatType;
        let height = self.window_size.y as FloatType;
        SubPixelPoint::new(
            (2.0 * position.x as FloatType - width) / width,
            (height - 2.0 * position.y as FloatType) / height,
        )
    }

    fn pan_deltas(
        projection: Projection,
        zoom: FloatType,
        camera_pos_z: FloatType,
        window_width: FloatType,
        last: ScreenPoint,
        new: ScreenPoint,
    ) -> (FloatType, FloatType) {
        let dx = last.x as FloatType - new.x as FloatType;
        let dy = new.y as FloatType - last.y as FloatType;
        match projection {
            Projection::Orthographic => {
                // With the orthographic projection there is just the zoom
                let pan_factor = zoom / 37.5;
                (pan_factor * dx, pan_factor * dy)
            }
            Projection::Perspective => {
                // Unproject through the frustum tangent so screen-space
                // panning stays metric-consistent across zoom levels
                let tan_half_fov = (FOV_Y_DEG.to_radians() * 0.5).tan();
                let pan_factor = -camera_pos_z * tan_half_fov * 2.0;
                (pan_factor * dx / window_width, pan_factor * dy / window_width)
            }
        }
    }
}

impl CameraControl for Camera {
    fn set_look_at_pos(&mut self, pos: WorldPoint) {
        if self.look_at_pos != pos {
            self.look_at_pos = pos;
            self.parameters_changed = true;
            self.update_view_matrix();
            self.update_frustum();
        }
    }

    fn drag(&mut self, new_mouse_position: ScreenPoint) {
        if self.window_size.x == 0 || self.window_size.y == 0 {
            return;
        }

        let spin = trackball::drag_rotation(
            self.normalized_mouse(self.last_position),
            self.normalized_mouse(new_mouse_position),
        );
        self.rotation = spin * self.rotation;
        self.last_position = new_mouse_position;

        self.parameters_changed = true;
        self.update_view_matrix();
        self.update_frustum();
    }

    fn pan(&mut self, new_mouse_position: ScreenPoint) {
        if self.window_size.x == 0 {
            return;
        }

        let (dx, dy) = Self::pan_deltas(
            self.projection,
            self.zoom,
            self.camera_pos.z,
            self.window_size.x as FloatType,
            self.last_position,
            new_mouse_position,
        );
        self.camera_pos.x -= dx;
        self.camera_pos.y -= dy;
        self.last_position = new_mouse_position;

        self.parameters_changed = true;
        self.update_view_matrix();
        self.update_frustum();
    }

    fn pan_t1(&mut self, new_mouse_position: ScreenPoint) {
        if self.window_size.x == 0 {
            return;
        }

        let (dx, dy) = Self::pan_deltas(
            self.projection,
            self.t1.zoom,
            self.t1.camera_pos.z,
            self.window_size.x as FloatType,
            self.last_position,
            new_mouse_position,
        );
        self.t1.camera_pos.x -= dx;
        self.t1.camera_pos.y -= dy;
        self.last_position = new_mouse_position;
    }

    fn reset(&mut self) {
        log::trace!(target: "boardray::camera", "reset");
        self.zoom = 1.0;
        self.rotation = UnitQuaternion::identity();
        self.rotate_aux = WorldVector::zeros();
        self.camera_pos = self.camera_pos_init;
        self.look_at_pos = WorldPoint::origin();
        self.t0 = self.current_state();
        self.t1 = self.t0;

        self.parameters_changed = true;
        self.update_view_matrix();
        self.rebuild_projection();
    }

    fn reset_t1(&mut self) {
        self.t1 = CameraState {
            camera_pos: self.camera_pos_init,
            look_at_pos: WorldPoint::origin(),
            zoom: 1.0,
            rotation: UnitQuaternion::identity(),
            rotate_aux: WorldVector::zeros(),
        };
    }

    fn interpolate(&mut self, t: FloatType) {
        let t = t.clamp(0.0, 1.0);
        let t = match self.interpolation {
            Interpolation::Linear => t,
            Interpolation::EasingInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Interpolation::Bezier => t * t * (3.0 - 2.0 * t),
        };

        self.camera_pos = self.t0.camera_pos.coords.lerp(&self.t1.camera_pos.coords, t).into();
        self.look_at_pos = self
            .t0
            .look_at_pos
            .coords
            .lerp(&self.t1.look_at_pos.coords, t)
            .into();
        self.zoom = self.t0.zoom + (self.t1.zoom - self.t0.zoom) * t;
        self.rotation = self.t0.rotation.nlerp(&self.t1.rotation, t);
        self.rotate_aux = self.t0.rotate_aux.lerp(&self.t1.rotate_aux, t);

        self.parameters_changed = true;
        self.update_view_matrix();
        self.rebuild_projection();
    }
}
