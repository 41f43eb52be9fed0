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

//! Payloads kept as they were fetched.

use crate::resource::{Payload, ResourceData};
use serde_json::Value;

/// A resource whose format has no decoder: the fetched payload itself.
///
/// Shaders, plain text or opaque blobs end up as `RawData` when their
/// extension is registered with a payload shape only.
#[derive(Debug, Clone, PartialEq)]
pub struct RawData(pub Payload);

impl RawData {
    /// The payload as text, if it was fetched as text.
    pub fn as_text(&self) -> Option<&str> {
        match &self.0 {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl ResourceData for RawData {
    fn to_document(&self) -> Option<Value> {
        match &self.0 {
            Payload::Structured(document) => Some(document.clone()),
            Payload::Text(text) => Some(Value::String(text.clone())),
            Payload::Binary(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_payloads_have_no_document() {
        assert_eq!(RawData(Payload::Binary(vec![1, 2])).to_document(), None);
        let text = RawData(Payload::Text("void main() {}".to_string()));
        assert_eq!(text.as_text(), Some("void main() {}"));
        assert_eq!(text.to_document(), Some(Value::from("void main() {}")));
    }
}
