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

//! Texture loading.

use crate::asset_lane::{Decoded, PreProcessor};
use anyhow::Context;
use khora_core::asset::Texture;
use khora_core::error::DecodeError;
use khora_core::resource::{LoadOptions, Payload, Resource, ResourcePath, ResourceType};

/// Extensions handled by [`TextureLoaderLane`].
pub const TEXTURE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "bmp", "tga", "gif", "webp"];

/// Decodes an encoded image into an RGBA8 texture.
///
/// `cubemap` forces the result to be treated as a cubemap even when its
/// dimensions are not a vertical strip.
pub fn decode_texture(bytes: &[u8], cubemap: bool) -> Result<Texture, DecodeError> {
    let img = image::load_from_memory(bytes).context("Failed to decode image from memory")?;

    // Convert to RGBA8 (keep in sRGB space)
    let rgba_img = img.to_rgba8();
    let (width, height) = rgba_img.dimensions();

    let mut texture = Texture::from_rgba8(width, height, rgba_img.into_raw());
    texture.is_cubemap |= cubemap;
    Ok(texture)
}

/// A lane dedicated to decoding image files on a blocking worker thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextureLoaderLane;

impl PreProcessor for TextureLoaderLane {
    fn process(
        &self,
        path: &ResourcePath,
        payload: Payload,
        _options: &LoadOptions,
    ) -> Result<Decoded, DecodeError> {
        let bytes = payload.into_bytes();
        let cross = path.filename().contains("CUBECROSS");
        Ok(Decoded::deferred(async move {
            let texture = tokio::task::spawn_blocking(move || decode_texture(&bytes, cross))
                .await
                .context("Texture decode task did not complete")??;
            Ok::<_, DecodeError>(Resource::new(ResourceType::TEXTURE, texture))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn decodes_to_rgba8() {
        let texture = decode_texture(&png(3, 2), false).unwrap();
        assert_eq!((texture.width, texture.height), (3, 2));
        assert_eq!(texture.pixels.as_ref().unwrap()[..4], [10, 20, 30, 255]);
        assert!(!texture.is_cubemap);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(decode_texture(b"definitely not an image", false).is_err());
    }

    #[tokio::test]
    async fn decoding_is_deferred() {
        let decoded = TextureLoaderLane
            .process(
                &"sky/CUBECROSS.png".into(),
                Payload::Binary(png(4, 3)),
                &LoadOptions::default(),
            )
            .unwrap();
        assert!(matches!(decoded, Decoded::Deferred(_)));

        let resource = decoded.resolve().await.unwrap();
        assert_eq!(resource.resource_type(), &ResourceType::TEXTURE);
        assert!(resource.data::<Texture>().unwrap().is_cubemap);
    }

    #[tokio::test]
    async fn vertical_strips_are_cubemaps() {
        let decoded = TextureLoaderLane
            .process(
                &"sky.png".into(),
                Payload::Binary(png(2, 12)),
                &LoadOptions::default(),
            )
            .unwrap();
        let resource = decoded.resolve().await.unwrap();
        assert!(resource.data::<Texture>().unwrap().is_cubemap);
    }
}
