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

//! Defines a lane for loading OBJ mesh resources.

use crate::asset_lane::{Decoded, PreProcessor};
use ahash::AHashMap;
use anyhow::Context;
use khora_core::asset::Mesh;
use khora_core::error::DecodeError;
use khora_core::resource::{LoadOptions, Payload, Resource, ResourcePath, ResourceType};

/// Lane for loading Wavefront OBJ meshes.
///
/// All objects of the file are merged into a single indexed mesh. Material
/// libraries are not followed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjLoaderLane;

/// Parses OBJ text into a mesh.
pub fn parse_obj(obj_text: &str) -> Result<Mesh, DecodeError> {
    let (models, _materials) = tobj::load_obj_buf(
        &mut std::io::Cursor::new(obj_text),
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |_| Ok((Vec::new(), AHashMap::new())),
    )
    .context("Failed to parse OBJ file")?;

    let mut mesh = Mesh::default();
    let mut normals = Vec::new();
    let mut tex_coords = Vec::new();
    let mut indices = Vec::new();
    let mut has_normals = true;
    let mut has_tex_coords = true;

    for model in &models {
        let source = &model.mesh;
        let base = mesh.positions.len() as u32;
        let vertex_count = source.positions.len() / 3;

        mesh.positions
            .extend(source.positions.chunks_exact(3).map(|v| [v[0], v[1], v[2]]));

        if source.normals.len() == vertex_count * 3 {
            normals.extend(source.normals.chunks_exact(3).map(|n| [n[0], n[1], n[2]]));
        } else {
            has_normals = false;
        }

        if source.texcoords.len() == vertex_count * 2 {
            tex_coords.extend(source.texcoords.chunks_exact(2).map(|t| [t[0], t[1]]));
        } else {
            has_tex_coords = false;
        }

        indices.extend(source.indices.iter().map(|index| index + base));
    }

    if mesh.positions.is_empty() {
        return Err(DecodeError::Invalid(
            "No vertices found in OBJ file".to_string(),
        ));
    }

    mesh.normals = (has_normals && !normals.is_empty()).then_some(normals);
    mesh.tex_coords = (has_tex_coords && !tex_coords.is_empty()).then_some(tex_coords);
    mesh.indices = Some(indices);
    mesh.compute_bounding_box();
    Ok(mesh)
}

impl PreProcessor for ObjLoaderLane {
    fn process(
        &self,
        _path: &ResourcePath,
        payload: Payload,
        _options: &LoadOptions,
    ) -> Result<Decoded, DecodeError> {
        let mesh = match payload {
            Payload::Text(text) => parse_obj(&text)?,
            other => {
                let text =
                    String::from_utf8(other.into_bytes()).context("OBJ file is not valid UTF-8")?;
                parse_obj(&text)?
            }
        };
        Ok(Decoded::Ready(Resource::new(ResourceType::MESH, mesh)))
    }
}
