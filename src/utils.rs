use glam::{Mat3, Mat4, Quat, Vec3};
use wgpu::util::DeviceExt;
use bytemuck::NoUninit;

#[repr(C)]
#[derive(Debug, Clone, Copy, NoUninit)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
    pub uv: [f32; 2],
}

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// Outward normal and the two in-plane axes (u x v = normal) of each cube face
const CUBE_FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
    ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
];

impl Mesh {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    /// Unit cube centred at the origin, placed by `transform`
    pub fn push_box(&mut self, transform: Mat4, color: [f32; 4]) {
        for (n, u, v) in CUBE_FACES {
            let (n, u, v) = (Vec3::from(n), Vec3::from(u), Vec3::from(v));
            let center = n * 0.5;
            self.push_face(transform, center, u * 0.5, v * 0.5, n, color);
        }
    }

    /// Unit quad in the local XY plane facing +Z
    pub fn push_quad(&mut self, transform: Mat4, color: [f32; 4]) {
        self.push_face(transform, Vec3::ZERO, Vec3::X * 0.5, Vec3::Y * 0.5, Vec3::Z, color);
    }

    fn push_face(&mut self, transform: Mat4, center: Vec3, u: Vec3, v: Vec3, normal: Vec3, color: [f32; 4]) {
        let normal_matrix = Mat3::from_mat4(transform).inverse().transpose();
        let world_normal = (normal_matrix * normal).normalize_or_zero();
        let base = self.vertices.len() as u32;

        let corners = [
            (center - u - v, [0.0, 1.0]),
            (center + u - v, [1.0, 1.0]),
            (center + u + v, [1.0, 0.0]),
            (center - u + v, [0.0, 0.0]),
        ];
        for (p, uv) in corners {
            self.vertices.push(Vertex {
                pos: transform.transform_point3(p).to_array(),
                normal: world_normal.to_array(),
                color,
                uv,
            });
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    pub fn upload(&self, device: &wgpu::Device) -> MeshBuffer {
        let vertices = bytemuck::cast_slice(&self.vertices);
        let indices = bytemuck::cast_slice(&self.indices);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: vertices,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: indices,
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: self.indices.len() as u32,
        }
    }
}

/// Floor plane: a horizontal quad of `size` x `size` at height `y`
pub fn create_ground_mesh(y: f32, size: f32, color: [f32; 3]) -> Mesh {
    let mut mesh = Mesh::empty();
    let transform = Mat4::from_scale_rotation_translation(
        Vec3::new(size, size, 1.0),
        Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2),
        Vec3::new(0.0, y, 0.0),
    );
    mesh.push_quad(transform, [color[0], color[1], color[2], 1.0]);
    mesh
}

/// Fraction of the remaining distance covered this frame by exponential
/// smoothing with the given smooth time. Frame-rate independent.
pub fn damp_factor(smooth_time: f32, dt: f32) -> f32 {
    if smooth_time <= 0.0 {
        return 1.0;
    }
    1.0 - (-dt.max(0.0) / smooth_time).exp()
}

pub fn damp3(current: Vec3, target: Vec3, smooth_time: f32, dt: f32) -> Vec3 {
    current.lerp(target, damp_factor(smooth_time, dt))
}

pub fn damp_quat(current: Quat, target: Quat, smooth_time: f32, dt: f32) -> Quat {
    current.slerp(target, damp_factor(smooth_time, dt)).normalize()
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// 1.0 when `value` is strictly above `edge`, otherwise 0.0
pub fn step_above(value: f32, edge: f32) -> f32 {
    if value > edge { 1.0 } else { 0.0 }
}
