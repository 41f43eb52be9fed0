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

//! CPU-side textures.

use crate::gpu::GpuHandle;
use crate::resource::ResourceData;

/// Size information generated for a texture once it has been decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureMetadata {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// A decoded image in RGBA8, optionally uploaded to the GPU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Tightly packed RGBA8 rows. `None` once the CPU copy has been freed.
    pub pixels: Option<Vec<u8>>,
    /// Whether the image holds the six faces of a cubemap.
    pub is_cubemap: bool,
    /// Filled in by the texture finalizer.
    pub metadata: Option<TextureMetadata>,
    /// Set once the texture has been uploaded.
    pub gpu: Option<GpuHandle>,
}

impl Texture {
    /// Bytes per pixel of the RGBA8 layout.
    pub const BYTES_PER_PIXEL: usize = 4;

    /// Wraps decoded RGBA8 pixels.
    ///
    /// A vertical strip whose height is six times its width is treated as a
    /// cubemap.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels: Some(pixels),
            is_cubemap: width > 0 && u64::from(width) * 6 == u64::from(height),
            metadata: None,
            gpu: None,
        }
    }

    /// The size of one row in bytes.
    pub fn row_size(&self) -> usize {
        self.width as usize * Self::BYTES_PER_PIXEL
    }

    /// Whether the pixel buffer matches the declared size.
    pub fn is_consistent(&self) -> bool {
        match &self.pixels {
            Some(pixels) => pixels.len() == self.row_size() * self.height as usize,
            None => true,
        }
    }

    /// Whether the CPU copy of the pixels is still present.
    pub fn has_data(&self) -> bool {
        self.pixels.is_some()
    }

    /// Drops the CPU copy of the pixels.
    pub fn free_data(&mut self) {
        self.pixels = None;
    }
}

impl ResourceData for Texture {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_vertical_cubemap_strips() {
        let strip = Texture::from_rgba8(2, 12, vec![0; 2 * 12 * 4]);
        assert!(strip.is_cubemap);

        let square = Texture::from_rgba8(4, 4, vec![0; 4 * 4 * 4]);
        assert!(!square.is_cubemap);

        let empty = Texture::from_rgba8(0, 0, Vec::new());
        assert!(!empty.is_cubemap);
    }

    #[test]
    fn free_data_keeps_the_size() {
        let mut texture = Texture::from_rgba8(2, 2, vec![255; 16]);
        assert!(texture.is_consistent());
        texture.free_data();
        assert!(!texture.has_data());
        assert_eq!((texture.width, texture.height), (2, 2));
        assert!(texture.is_consistent());
    }

    #[test]
    fn inconsistent_buffers_are_reported() {
        let texture = Texture::from_rgba8(2, 2, vec![0; 3]);
        assert!(!texture.is_consistent());
    }
}
