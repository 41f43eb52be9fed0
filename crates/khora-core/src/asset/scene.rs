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

//! Scene graph fragments.
//!
//! A fragment is plain data: the scene layer turns it into live nodes. The
//! loader only cares about the meshes and materials it references.

use super::tagged_document;
use crate::resource::{ResourceData, ResourceType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A node of a scene fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneNode {
    /// Node name.
    pub name: String,
    /// Column-major local transform.
    pub transform: [f32; 16],
    /// Path of the mesh drawn by this node.
    pub mesh: Option<String>,
    /// Path of the material used to draw the mesh.
    pub material: Option<String>,
    /// Child nodes.
    pub children: Vec<SceneNode>,
}

impl Default for SceneNode {
    fn default() -> Self {
        Self {
            name: String::new(),
            transform: IDENTITY,
            mesh: None,
            material: None,
            children: Vec::new(),
        }
    }
}

const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// A serialized subtree of the scene graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneFragment {
    /// Fragment name.
    pub name: String,
    /// Root nodes.
    pub nodes: Vec<SceneNode>,
}

impl SceneFragment {
    /// Visits every node depth-first.
    pub fn walk<'a>(&'a self, mut visit: impl FnMut(&'a SceneNode)) {
        let mut stack: Vec<&SceneNode> = self.nodes.iter().rev().collect();
        while let Some(node) = stack.pop() {
            visit(node);
            stack.extend(node.children.iter().rev());
        }
    }
}

impl ResourceData for SceneFragment {
    fn dependencies(&self) -> BTreeMap<String, ResourceType> {
        let mut dependencies = BTreeMap::new();
        self.walk(|node| {
            let referenced = [
                (node.mesh.as_ref(), ResourceType::MESH),
                (node.material.as_ref(), ResourceType::MATERIAL),
            ];
            for (path, resource_type) in referenced {
                if let Some(path) = path.filter(|p| !p.is_empty() && !p.starts_with(':')) {
                    dependencies.insert(path.clone(), resource_type);
                }
            }
        });
        dependencies
    }

    fn to_document(&self) -> Option<Value> {
        tagged_document(&ResourceType::SCENE, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment() -> SceneFragment {
        SceneFragment {
            name: "room".to_string(),
            nodes: vec![SceneNode {
                name: "table".to_string(),
                mesh: Some("meshes/table.obj".to_string()),
                material: Some("materials/wood.json".to_string()),
                children: vec![SceneNode {
                    name: "cup".to_string(),
                    mesh: Some("meshes/cup.obj".to_string()),
                    ..Default::default()
                }],
                ..Default::default()
            }],
        }
    }

    #[test]
    fn walk_is_depth_first() {
        let fragment = fragment();
        let mut names = Vec::new();
        fragment.walk(|node| names.push(node.name.as_str()));
        assert_eq!(names, ["table", "cup"]);
    }

    #[test]
    fn dependencies_cover_nested_nodes() {
        let dependencies = fragment().dependencies();
        assert_eq!(dependencies.len(), 3);
        assert_eq!(dependencies["meshes/cup.obj"], ResourceType::MESH);
        assert_eq!(dependencies["materials/wood.json"], ResourceType::MATERIAL);
    }
}
