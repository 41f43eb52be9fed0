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

//! Shading parameters.

use super::tagged_document;
use crate::resource::{ResourceData, ResourceType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// How the alpha channel of a material is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlphaMode {
    /// Alpha is ignored.
    #[default]
    Opaque,
    /// Fragments below `alpha_cutoff` are discarded.
    Mask,
    /// The surface is blended with what is behind it.
    Blend,
}

/// A metallic-roughness material whose texture maps are referenced by path.
///
/// Every entry of `textures` is a dependency: loading a material also loads
/// the textures it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Display name.
    pub name: String,
    /// Linear RGBA base color.
    pub base_color: [f32; 4],
    /// 0.0 for dielectrics, 1.0 for metals.
    pub metallic: f32,
    /// 0.0 for mirror-like surfaces, 1.0 for fully diffuse ones.
    pub roughness: f32,
    /// Linear RGB emitted color.
    pub emissive: [f32; 3],
    /// Alpha handling.
    pub alpha_mode: AlphaMode,
    /// Threshold used with [`AlphaMode::Mask`].
    pub alpha_cutoff: f32,
    /// Disables back-face culling.
    pub double_sided: bool,
    /// Texture paths by channel (`"color"`, `"normal"`, ...).
    pub textures: BTreeMap<String, String>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            base_color: [0.8, 0.8, 0.8, 1.0],
            metallic: 0.0,
            roughness: 0.5,
            emissive: [0.0; 3],
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            double_sided: false,
            textures: BTreeMap::new(),
        }
    }
}

impl Material {
    /// Assigns a texture to a channel.
    pub fn with_texture(mut self, channel: impl Into<String>, path: impl Into<String>) -> Self {
        self.textures.insert(channel.into(), path.into());
        self
    }
}

impl ResourceData for Material {
    fn dependencies(&self) -> BTreeMap<String, ResourceType> {
        self.textures
            .values()
            // `:`-prefixed names are in-process resources, never fetched.
            .filter(|path| !path.is_empty() && !path.starts_with(':'))
            .map(|path| (path.clone(), ResourceType::TEXTURE))
            .collect()
    }

    fn to_document(&self) -> Option<Value> {
        tagged_document(&ResourceType::MATERIAL, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a_rough_grey_surface() {
        let material = Material::default();
        assert_eq!(material.base_color, [0.8, 0.8, 0.8, 1.0]);
        assert_eq!(material.roughness, 0.5);
        assert_eq!(material.alpha_mode, AlphaMode::Opaque);
        assert!(material.dependencies().is_empty());
    }

    #[test]
    fn textures_are_dependencies() {
        let material = Material::default()
            .with_texture("color", "textures/brick.png")
            .with_texture("normal", "textures/brick_n.png")
            .with_texture("emissive", ":generated");
        let dependencies = material.dependencies();
        assert_eq!(dependencies.len(), 2);
        assert_eq!(
            dependencies.get("textures/brick.png"),
            Some(&ResourceType::TEXTURE)
        );
        assert!(!dependencies.contains_key(":generated"));
    }

    #[test]
    fn partial_documents_use_defaults() {
        let material: Material =
            serde_json::from_str(r#"{ "object_type": "Material", "metallic": 1.0 }"#).unwrap();
        assert_eq!(material.metallic, 1.0);
        assert_eq!(material.roughness, 0.5);
    }
}
