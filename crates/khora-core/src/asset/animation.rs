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

//! Keyframed animation data. Playback lives outside the loader.

use super::tagged_document;
use crate::resource::{ResourceData, ResourceType};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The keyframes driving one property of one node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationTrack {
    /// Name of the animated node.
    pub target: String,
    /// Name of the animated property.
    pub property: String,
    /// Keyframe times in seconds.
    pub times: Vec<f32>,
    /// Flattened keyframe values, `values.len() / times.len()` components each.
    pub values: Vec<f32>,
}

impl AnimationTrack {
    /// The number of components per keyframe, or `None` if the values do not
    /// divide evenly between the keyframes.
    pub fn components(&self) -> Option<usize> {
        if self.times.is_empty() || self.values.len() % self.times.len() != 0 {
            return None;
        }
        Some(self.values.len() / self.times.len())
    }
}

/// A named set of tracks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Animation {
    /// Clip name.
    pub name: String,
    /// Length of the clip in seconds.
    pub duration: f32,
    /// Animated properties.
    pub tracks: Vec<AnimationTrack>,
}

impl ResourceData for Animation {
    fn to_document(&self) -> Option<Value> {
        tagged_document(&ResourceType::ANIMATION, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_per_keyframe() {
        let track = AnimationTrack {
            target: "door".to_string(),
            property: "rotation".to_string(),
            times: vec![0.0, 1.0],
            values: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.7, 0.0, 0.7],
        };
        assert_eq!(track.components(), Some(4));

        let broken = AnimationTrack {
            values: vec![1.0, 2.0, 3.0],
            ..track
        };
        assert_eq!(broken.components(), None);
    }
}
