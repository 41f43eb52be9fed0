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

//! Lanes for self-describing files: JSON documents and packed containers.

use crate::asset_lane::{Decoded, PreProcessor, TypeFactoryRegistry};
use anyhow::Context;
use khora_core::error::DecodeError;
use khora_core::resource::{LoadOptions, Payload, Resource, ResourcePath};
use std::sync::Arc;

/// Extensions handled by [`DocumentLoaderLane`].
pub const DOCUMENT_EXTENSIONS: [&str; 1] = ["json"];

/// Extensions handled by [`ContainerLoaderLane`].
pub const CONTAINER_EXTENSIONS: [&str; 1] = ["kpak"];

/// Decodes a payload that carries its own type.
///
/// Parsed documents are built in place. Raw bytes may hold a packed texture,
/// so they are decoded on a blocking thread.
pub fn decode_self_describing(
    factories: &Arc<TypeFactoryRegistry>,
    payload: Payload,
) -> Result<Decoded, DecodeError> {
    if let Payload::Structured(_) = payload {
        return factories.decode_self_describing(payload).map(Decoded::Ready);
    }
    let factories = Arc::clone(factories);
    Ok(off_thread(move || factories.decode_self_describing(payload)))
}

fn off_thread<F>(build: F) -> Decoded
where
    F: FnOnce() -> Result<Resource, DecodeError> + Send + 'static,
{
    Decoded::deferred(async move {
        tokio::task::spawn_blocking(build)
            .await
            .context("Decode task failed")?
    })
}

/// Builds resources from documents carrying an `object_type` tag.
#[derive(Clone)]
pub struct DocumentLoaderLane {
    factories: Arc<TypeFactoryRegistry>,
}

impl DocumentLoaderLane {
    /// Creates the lane over a set of type factories.
    pub fn new(factories: Arc<TypeFactoryRegistry>) -> Self {
        Self { factories }
    }
}

impl PreProcessor for DocumentLoaderLane {
    fn process(
        &self,
        _path: &ResourcePath,
        payload: Payload,
        _options: &LoadOptions,
    ) -> Result<Decoded, DecodeError> {
        decode_self_describing(&self.factories, payload)
    }
}

/// Unpacks packed binary containers.
#[derive(Clone)]
pub struct ContainerLoaderLane {
    factories: Arc<TypeFactoryRegistry>,
}

impl ContainerLoaderLane {
    /// Creates the lane over a set of type factories.
    pub fn new(factories: Arc<TypeFactoryRegistry>) -> Self {
        Self { factories }
    }
}

impl PreProcessor for ContainerLoaderLane {
    fn process(
        &self,
        _path: &ResourcePath,
        payload: Payload,
        _options: &LoadOptions,
    ) -> Result<Decoded, DecodeError> {
        let factories = Arc::clone(&self.factories);
        Ok(off_thread(move || {
            factories.build_from_container(&payload.into_bytes())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use khora_core::asset::{Material, SceneFragment, Texture};
    use khora_core::resource::ResourceType;
    use khora_io::container;
    use serde_json::json;
    use std::io::Cursor;

    fn factories() -> Arc<TypeFactoryRegistry> {
        Arc::new(TypeFactoryRegistry::with_builtin())
    }

    fn packed_png() -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(4, 24, image::Rgba([0, 0, 255, 255]));
        let mut png = Cursor::new(Vec::new());
        image
            .write_to(&mut png, image::ImageFormat::Png)
            .unwrap();
        container::encode(&ResourceType::TEXTURE, png.get_ref()).unwrap()
    }

    #[test]
    fn documents_decode_by_tag() {
        let lane = DocumentLoaderLane::new(factories());
        let decoded = lane
            .process(
                &"room.json".into(),
                Payload::Structured(json!({
                    "object_type": "Scene",
                    "nodes": [{ "name": "lamp", "mesh": "lamp.obj" }]
                })),
                &LoadOptions::default(),
            )
            .unwrap();
        let Decoded::Ready(resource) = decoded else {
            panic!("parsed documents are built in place");
        };
        assert_eq!(resource.resource_type(), &ResourceType::SCENE);
        assert_eq!(resource.data::<SceneFragment>().unwrap().nodes.len(), 1);
        assert!(resource.dependencies().contains_key("lamp.obj"));
    }

    #[tokio::test]
    async fn containers_decode_by_header() {
        let lane = ContainerLoaderLane::new(factories());
        let body = serde_json::to_vec(&json!({ "name": "steel", "metallic": 1.0 })).unwrap();
        let packed = container::encode(&ResourceType::MATERIAL, &body).unwrap();

        let resource = lane
            .process(
                &"steel.kpak".into(),
                Payload::Binary(packed),
                &LoadOptions::default(),
            )
            .unwrap()
            .resolve()
            .await
            .unwrap();
        assert_eq!(resource.data::<Material>().unwrap().name, "steel");
    }

    #[tokio::test]
    async fn packed_textures_decode_off_the_runtime() {
        let lane = ContainerLoaderLane::new(factories());
        let decoded = lane
            .process(
                &"sky.kpak".into(),
                Payload::Binary(packed_png()),
                &LoadOptions::default(),
            )
            .unwrap();
        assert!(matches!(decoded, Decoded::Deferred(_)));

        let sky = decoded.resolve().await.unwrap();
        let texture = sky.data::<Texture>().unwrap();
        assert_eq!((texture.width, texture.height), (4, 24));
        assert!(texture.is_cubemap);
    }

    #[tokio::test]
    async fn raw_self_describing_bytes_are_deferred() {
        let decoded = decode_self_describing(&factories(), Payload::Binary(packed_png())).unwrap();
        assert!(matches!(decoded, Decoded::Deferred(_)));
        let sky = decoded.resolve().await.unwrap();
        assert_eq!(sky.resource_type(), &ResourceType::TEXTURE);
    }

    #[tokio::test]
    async fn foreign_bytes_are_not_containers() {
        let lane = ContainerLoaderLane::new(factories());
        let error = lane
            .process(
                &"fake.kpak".into(),
                Payload::Binary(b"PK\x03\x04".to_vec()),
                &LoadOptions::default(),
            )
            .unwrap()
            .resolve()
            .await
            .unwrap_err();
        assert!(matches!(error, DecodeError::UnknownFormat(_)));
    }
}
