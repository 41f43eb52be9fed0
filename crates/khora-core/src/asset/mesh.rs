// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Triangle meshes and their bounding volumes.

use super::tagged_document;
use crate::gpu::GpuHandle;
use crate::resource::{ResourceData, ResourceType};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// The corner with the smallest coordinates on all axes.
    pub min: [f32; 3],
    /// The corner with the largest coordinates on all axes.
    pub max: [f32; 3],
}

impl Aabb {
    /// Creates the box tightly enclosing `points`, or `None` if there are none.
    pub fn from_points(points: &[[f32; 3]]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut min = *first;
        let mut max = *first;
        for point in rest {
            for axis in 0..3 {
                min[axis] = min[axis].min(point[axis]);
                max[axis] = max[axis].max(point[axis]);
            }
        }
        Some(Self { min, max })
    }

    /// The center point of the box.
    pub fn center(&self) -> [f32; 3] {
        std::array::from_fn(|axis| (self.min[axis] + self.max[axis]) * 0.5)
    }

    /// The distance from the center to each face.
    pub fn half_extents(&self) -> [f32; 3] {
        std::array::from_fn(|axis| (self.max[axis] - self.min[axis]) * 0.5)
    }

    /// Whether every coordinate is finite and `min <= max` on every axis.
    pub fn is_valid(&self) -> bool {
        (0..3).all(|axis| {
            self.min[axis].is_finite()
                && self.max[axis].is_finite()
                && self.min[axis] <= self.max[axis]
        })
    }
}

/// Vertex and index data of a triangle list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normals: Option<Vec<[f32; 3]>>,
    /// Vertex texture coordinates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tex_coords: Option<Vec<[f32; 2]>>,
    /// Triangle indices. Without them every three vertices form a triangle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indices: Option<Vec<u32>>,
    /// Bounding box of the positions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<Aabb>,
    /// Set once the buffers have been uploaded.
    #[serde(skip)]
    pub gpu: Option<GpuHandle>,
}

impl Mesh {
    /// Creates an unindexed mesh from positions only.
    pub fn from_positions(positions: Vec<[f32; 3]>) -> Self {
        Self {
            positions,
            ..Default::default()
        }
    }

    /// The number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Whether the mesh carries a usable bounding box.
    pub fn has_valid_bounding_box(&self) -> bool {
        self.bounding_box.is_some_and(|aabb| aabb.is_valid())
    }

    /// Recomputes the bounding box from the positions.
    pub fn compute_bounding_box(&mut self) {
        self.bounding_box = Aabb::from_points(&self.positions);
    }

    /// The triangles of the mesh as vertex index triples. Out of range
    /// indices and trailing partial triangles are skipped.
    pub fn triangles(&self) -> Vec<[usize; 3]> {
        let count = self.positions.len();
        let triangles: Vec<[usize; 3]> = match &self.indices {
            Some(indices) => indices
                .chunks_exact(3)
                .map(|t| [t[0] as usize, t[1] as usize, t[2] as usize])
                .collect(),
            None => (0..count / 3).map(|t| [t * 3, t * 3 + 1, t * 3 + 2]).collect(),
        };
        triangles
            .into_iter()
            .filter(|t| t.iter().all(|&i| i < count))
            .collect()
    }

    /// Generates normals from the triangle faces.
    ///
    /// Vertices used by a single triangle get that face's normal, shared
    /// vertices get the area-weighted average. Unused vertices point up.
    pub fn compute_normals(&mut self) {
        let mut normals = vec![[0.0f32; 3]; self.positions.len()];
        for [a, b, c] in self.triangles() {
            let face = face_normal(self.positions[a], self.positions[b], self.positions[c]);
            for vertex in [a, b, c] {
                for axis in 0..3 {
                    normals[vertex][axis] += face[axis];
                }
            }
        }
        for normal in &mut normals {
            *normal = normalize(*normal).unwrap_or([0.0, 1.0, 0.0]);
        }
        self.normals = Some(normals);
    }

    /// Whether the CPU-side buffers are still present.
    pub fn has_data(&self) -> bool {
        !self.positions.is_empty()
    }

    /// Drops the CPU-side buffers, keeping the bounding box and GPU handle.
    pub fn free_data(&mut self) {
        self.positions = Vec::new();
        self.normals = None;
        self.tex_coords = None;
        self.indices = None;
    }
}

fn face_normal(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> [f32; 3] {
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ]
}

fn normalize(v: [f32; 3]) -> Option<[f32; 3]> {
    let length = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if length <= f32::EPSILON || !length.is_finite() {
        return None;
    }
    Some([v[0] / length, v[1] / length, v[2] / length])
}

impl ResourceData for Mesh {
    fn to_document(&self) -> Option<Value> {
        tagged_document(&ResourceType::MESH, self)
    }
}
