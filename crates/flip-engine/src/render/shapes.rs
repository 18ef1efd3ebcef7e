use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::imdraw::ImVertex;

use super::Color;

const SLICES: u32 = 32;
const STACKS: u32 = 16;
const TORUS_SIDES: u32 = 16;

/// Built-in shapes, all unit sized.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Shape {
    /// 1 × 1 on the XZ plane, facing +Y, centered on the origin.
    Plane,
    /// 1 × 1 × 1, centered on the origin.
    Cube,
    /// Radius 0.5, centered on the origin.
    Sphere,
    /// Radius 0.5, height 1 along +Y, origin at the center of the bottom disk.
    Cylinder,
    /// Radius 0.4 and ring radius 0.1 around the Y axis, centered on the origin.
    Torus,
}

impl Shape {
    pub const ALL: [Shape; 5] = [Shape::Plane, Shape::Cube, Shape::Sphere, Shape::Cylinder, Shape::Torus];
}

/// Triangle-list meshes for every [`Shape`], generated once.
///
/// Vertex colors hold a baked directional shade; draws multiply them by the
/// requested color.
pub struct ShapeMeshes {
    meshes: [Vec<ImVertex>; 5],
}

impl ShapeMeshes {
    pub fn new() -> Self {
        Self { meshes: Shape::ALL.map(build) }
    }

    pub fn mesh(&self, shape: Shape) -> &[ImVertex] {
        &self.meshes[shape as usize]
    }

    /// Mesh vertices with their shade multiplied by `color`.
    pub fn tinted(&self, shape: Shape, color: Color) -> Vec<ImVertex> {
        let tint = color.to_array();
        self.mesh(shape)
            .iter()
            .map(|v| {
                let mut v = *v;
                for (c, t) in v.color.iter_mut().zip(tint) {
                    *c *= t;
                }
                v
            })
            .collect()
    }
}

impl Default for ShapeMeshes {
    fn default() -> Self {
        Self::new()
    }
}

fn build(shape: Shape) -> Vec<ImVertex> {
    let mut mesh = MeshBuilder::default();
    match shape {
        Shape::Plane => mesh.quad(Vec3::ZERO, Vec3::Y, 1.0),
        Shape::Cube => {
            for n in [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z] {
                mesh.quad(n * 0.5, n, 1.0);
            }
        }
        Shape::Sphere => mesh.surface(SLICES, STACKS, |u, v| {
            let (theta, phi) = (v * PI, u * TAU);
            let n = Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
            (n * 0.5, n)
        }),
        Shape::Cylinder => {
            mesh.surface(SLICES, 1, |u, v| {
                let phi = u * TAU;
                let n = Vec3::new(phi.cos(), 0.0, phi.sin());
                (n * 0.5 + Vec3::Y * v, n)
            });
            mesh.disk(Vec3::ZERO, Vec3::NEG_Y, 0.5);
            mesh.disk(Vec3::Y, Vec3::Y, 0.5);
        }
        Shape::Torus => mesh.surface(SLICES, TORUS_SIDES, |u, v| {
            let (phi, theta) = (u * TAU, v * TAU);
            let radial = Vec3::new(phi.cos(), 0.0, phi.sin());
            let n = radial * theta.cos() + Vec3::Y * theta.sin();
            (radial * 0.4 + n * 0.1, n)
        }),
    }
    mesh.vertices
}

#[derive(Default)]
struct MeshBuilder {
    vertices: Vec<ImVertex>,
}

impl MeshBuilder {
    /// Emits a triangle wound counter-clockwise as seen from `outward`.
    /// Degenerate triangles are dropped.
    fn triangle(&mut self, mut corners: [(Vec3, Vec3, Vec2); 3], outward: Vec3) {
        let face = (corners[1].0 - corners[0].0).cross(corners[2].0 - corners[0].0);
        if face.length_squared() < 1e-12 {
            return;
        }
        if face.dot(outward) < 0.0 {
            corners.swap(1, 2);
        }
        for (p, n, uv) in corners {
            self.vertices.push(ImVertex::new(p, shade(n), uv));
        }
    }

    /// Square of side `size` centered at `center`, facing `normal`.
    fn quad(&mut self, center: Vec3, normal: Vec3, size: f32) {
        let u = if normal.y.abs() > 0.5 { Vec3::Z } else { Vec3::Y };
        let v = normal.cross(u);
        let h = size * 0.5;
        let corner = |su: f32, sv: f32| {
            let uv = Vec2::new((su + 1.0) * 0.5, (sv + 1.0) * 0.5);
            (center + (u * su + v * sv) * h, normal, uv)
        };
        let (a, b, c, d) = (corner(-1.0, -1.0), corner(1.0, -1.0), corner(1.0, 1.0), corner(-1.0, 1.0));
        self.triangle([a, b, c], normal);
        self.triangle([a, c, d], normal);
    }

    fn disk(&mut self, center: Vec3, normal: Vec3, radius: f32) {
        let at = |i: u32| {
            let phi = i as f32 / SLICES as f32 * TAU;
            let p = center + Vec3::new(phi.cos(), 0.0, phi.sin()) * radius;
            (p, normal, Vec2::new(0.5 + phi.cos() * 0.5, 0.5 + phi.sin() * 0.5))
        };
        let mid = (center, normal, Vec2::splat(0.5));
        for i in 0..SLICES {
            self.triangle([mid, at(i), at(i + 1)], normal);
        }
    }

    /// Parametric surface over `[0, 1]²`; `f` returns position and normal.
    fn surface(&mut self, slices: u32, stacks: u32, f: impl Fn(f32, f32) -> (Vec3, Vec3)) {
        let at = |i: u32, j: u32| {
            let (u, v) = (i as f32 / slices as f32, j as f32 / stacks as f32);
            let (p, n) = f(u, v);
            (p, n, Vec2::new(u, v))
        };
        for i in 0..slices {
            for j in 0..stacks {
                let (a, b, c, d) = (at(i, j), at(i + 1, j), at(i + 1, j + 1), at(i, j + 1));
                let outward = a.1 + b.1 + c.1 + d.1;
                self.triangle([a, b, c], outward);
                self.triangle([a, c, d], outward);
            }
        }
    }
}

/// Simple directional light baked into vertex colors.
fn shade(normal: Vec3) -> glam::Vec4 {
    let light = Vec3::new(0.3, 1.0, 0.5).normalize();
    let k = 0.35 + 0.65 * normal.normalize_or_zero().dot(light).max(0.0);
    glam::Vec4::new(k, k, k, 1.0)
}
