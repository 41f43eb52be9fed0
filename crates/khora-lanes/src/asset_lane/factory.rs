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

//! Builds resources from self-describing payloads.
//!
//! A structured document names its type in `object_type`, a packed container
//! in its header. The tag selects a [`ResourceFactory`] from the
//! [`TypeFactoryRegistry`].

use super::loading::decode_texture;
use khora_core::asset::{document_type, Animation, Material, Mesh, SceneFragment};
use khora_core::error::DecodeError;
use khora_core::resource::{Payload, Resource, ResourceData, ResourceType};
use khora_io::container::{self, ContainerError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// Constructs the payload of one resource type.
pub trait ResourceFactory: Send + Sync {
    /// Builds the payload from a structured document.
    fn from_document(&self, document: Value) -> Result<Box<dyn ResourceData>, DecodeError>;

    /// Builds the payload from the body of a packed container. The body is a
    /// JSON document unless the factory says otherwise.
    fn from_packed(&self, body: &[u8]) -> Result<Box<dyn ResourceData>, DecodeError> {
        let document = serde_json::from_slice(body)
            .map_err(|e| DecodeError::Invalid(format!("container body is not a document: {e}")))?;
        self.from_document(document)
    }
}

/// A factory for payloads that deserialize straight from their document.
pub struct SerdeFactory<T>(PhantomData<fn() -> T>);

impl<T> SerdeFactory<T> {
    /// Creates the factory.
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for SerdeFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned + ResourceData> ResourceFactory for SerdeFactory<T> {
    fn from_document(&self, document: Value) -> Result<Box<dyn ResourceData>, DecodeError> {
        let data: T = serde_json::from_value(document)
            .map_err(|e| DecodeError::Invalid(e.to_string()))?;
        Ok(Box::new(data))
    }
}

/// Textures have no document form, their packed body is an encoded image.
struct TextureFactory;

impl ResourceFactory for TextureFactory {
    fn from_document(&self, _document: Value) -> Result<Box<dyn ResourceData>, DecodeError> {
        Err(DecodeError::Invalid(
            "textures cannot be described by a document".to_string(),
        ))
    }

    fn from_packed(&self, body: &[u8]) -> Result<Box<dyn ResourceData>, DecodeError> {
        Ok(Box::new(decode_texture(body, false)?))
    }
}

/// Type tag to factory table.
#[derive(Clone, Default)]
pub struct TypeFactoryRegistry {
    factories: HashMap<ResourceType, Arc<dyn ResourceFactory>>,
}

impl TypeFactoryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry knowing every built-in payload type.
    pub fn with_builtin() -> Self {
        let mut factories = Self::new();
        factories.register(ResourceType::TEXTURE, TextureFactory);
        factories.register_serde::<Mesh>(ResourceType::MESH);
        factories.register_serde::<Material>(ResourceType::MATERIAL);
        factories.register_serde::<SceneFragment>(ResourceType::SCENE);
        factories.register_serde::<Animation>(ResourceType::ANIMATION);
        factories
    }

    /// Registers the factory for `resource_type`, replacing any previous one.
    pub fn register(
        &mut self,
        resource_type: ResourceType,
        factory: impl ResourceFactory + 'static,
    ) {
        self.factories.insert(resource_type, Arc::new(factory));
    }

    /// Registers a [`SerdeFactory`] for `T`.
    pub fn register_serde<T: DeserializeOwned + ResourceData>(
        &mut self,
        resource_type: ResourceType,
    ) {
        self.register(resource_type, SerdeFactory::<T>::new());
    }

    /// Adds every factory of `other`, replacing factories for the same tags.
    pub fn extend(&mut self, other: TypeFactoryRegistry) {
        self.factories.extend(other.factories);
    }

    /// Whether a factory exists for `resource_type`.
    pub fn contains(&self, resource_type: &ResourceType) -> bool {
        self.factories.contains_key(resource_type)
    }

    fn factory(&self, resource_type: &ResourceType) -> Result<&dyn ResourceFactory, DecodeError> {
        self.factories
            .get(resource_type)
            .map(|factory| factory.as_ref())
            .ok_or_else(|| {
                DecodeError::UnknownFormat(format!("no factory for type '{resource_type}'"))
            })
    }

    /// Builds a resource from a document carrying an `object_type` tag.
    pub fn build_from_document(&self, document: Value) -> Result<Resource, DecodeError> {
        let resource_type = document_type(&document).ok_or_else(|| {
            DecodeError::UnknownFormat("document has no object_type".to_string())
        })?;
        let data = self.factory(&resource_type)?.from_document(document)?;
        Ok(Resource::from_boxed(resource_type, data))
    }

    /// Builds a resource from a packed container.
    pub fn build_from_container(&self, bytes: &[u8]) -> Result<Resource, DecodeError> {
        let (header, body) = container::decode(bytes).map_err(|e| match e {
            ContainerError::MissingMagic => {
                DecodeError::UnknownFormat("not a packed container".to_string())
            }
            other => DecodeError::Invalid(other.to_string()),
        })?;
        let data = self.factory(&header.object_type)?.from_packed(body)?;
        Ok(Resource::from_boxed(header.object_type, data))
    }

    /// Decodes a payload that carries its own type: a packed container, or a
    /// document (possibly still as text or bytes) with an `object_type` tag.
    pub fn decode_self_describing(&self, payload: Payload) -> Result<Resource, DecodeError> {
        let document = match payload {
            Payload::Structured(document) => document,
            Payload::Binary(bytes) if container::is_container(&bytes) => {
                return self.build_from_container(&bytes)
            }
            Payload::Binary(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| DecodeError::Invalid(format!("not a container or document: {e}")))?,
            Payload::Text(text) => serde_json::from_str(&text)
                .map_err(|e| DecodeError::Invalid(format!("not a document: {e}")))?,
        };
        self.build_from_document(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use khora_core::asset::Texture;
    use khora_core::error::LoadError;
    use khora_core::LoadErrorKind;
    use serde_json::json;

    fn kind_of(error: DecodeError) -> LoadErrorKind {
        LoadError::from_decode("test", error).kind()
    }

    #[test]
    fn documents_are_built_by_tag() {
        let factories = TypeFactoryRegistry::with_builtin();
        let resource = factories
            .build_from_document(json!({
                "object_type": "Mesh",
                "positions": [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
            }))
            .unwrap();
        assert_eq!(resource.resource_type(), &ResourceType::MESH);
        assert_eq!(resource.data::<Mesh>().unwrap().vertex_count(), 3);
    }

    #[test]
    fn unknown_tags_are_unknown_formats() {
        let factories = TypeFactoryRegistry::with_builtin();
        let error = factories
            .build_from_document(json!({ "object_type": "Hologram" }))
            .unwrap_err();
        assert_eq!(kind_of(error), LoadErrorKind::UnknownFormat);

        let untagged = factories
            .build_from_document(json!({ "positions": [] }))
            .unwrap_err();
        assert_eq!(kind_of(untagged), LoadErrorKind::UnknownFormat);
    }

    #[test]
    fn malformed_payloads_are_parse_errors() {
        let factories = TypeFactoryRegistry::with_builtin();
        let bad_fields = factories
            .decode_self_describing(Payload::Structured(json!({
                "object_type": "Mesh",
                "positions": "nope"
            })))
            .unwrap_err();
        assert_eq!(kind_of(bad_fields), LoadErrorKind::Parse);

        let garbage = factories
            .decode_self_describing(Payload::Binary(vec![0xde, 0xad]))
            .unwrap_err();
        assert_eq!(kind_of(garbage), LoadErrorKind::Parse);
    }

    #[test]
    fn text_documents_are_parsed() {
        let factories = TypeFactoryRegistry::with_builtin();
        let resource = factories
            .decode_self_describing(Payload::Text(
                r#"{ "object_type": "Material", "name": "wood" }"#.to_string(),
            ))
            .unwrap();
        assert_eq!(resource.data::<Material>().unwrap().name, "wood");
    }

    #[test]
    fn containers_unpack_through_their_factory() {
        let factories = TypeFactoryRegistry::with_builtin();
        let body = serde_json::to_vec(&json!({ "name": "walk", "duration": 1.5 })).unwrap();
        let packed = container::encode(&ResourceType::ANIMATION, &body).unwrap();

        let resource = factories
            .decode_self_describing(Payload::Binary(packed))
            .unwrap();
        assert_eq!(resource.resource_type(), &ResourceType::ANIMATION);
        assert_eq!(resource.data::<Animation>().unwrap().duration, 1.5);
    }

    #[test]
    fn packed_textures_are_decoded_images() {
        let mut png = Vec::new();
        image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let packed = container::encode(&ResourceType::TEXTURE, &png).unwrap();

        let factories = TypeFactoryRegistry::with_builtin();
        let resource = factories.build_from_container(&packed).unwrap();
        let texture = resource.data::<Texture>().unwrap();
        assert_eq!((texture.width, texture.height), (2, 2));
    }

    #[test]
    fn plugin_types_can_be_registered() {
        #[derive(Debug, serde::Deserialize)]
        struct Prefab {
            root: String,
        }
        impl ResourceData for Prefab {}

        let mut factories = TypeFactoryRegistry::new();
        assert!(!factories.contains(&ResourceType::new("Prefab")));
        factories.register_serde::<Prefab>(ResourceType::new("Prefab"));

        let resource = factories
            .build_from_document(json!({ "object_type": "Prefab", "root": "door" }))
            .unwrap();
        assert_eq!(resource.data::<Prefab>().unwrap().root, "door");
    }
}
