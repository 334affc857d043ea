//! Gallery record type.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::capture::{CaptureResult, ImageFormat};

/// A stored screenshot.
///
/// Serialized into the flat gallery blob; the encoded image rides along as
/// base64 so the whole gallery remains one self-contained JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screenshot {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub timestamp: DateTime<Local>,
    /// Encoded image bytes in the record's `format`.
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl Screenshot {
    /// Wraps a finished capture into a persistable record.
    pub fn from_capture(result: CaptureResult, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            tags: Vec::new(),
            format: result.format,
            width: result.width,
            height: result.height,
            timestamp: Local::now(),
            data: result.data,
        }
    }

    /// File name for exports, `<name>.<ext>`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.format.extension())
    }
}

/// Generate a record name from a chrono format template.
pub fn generate_name(template: &str) -> String {
    Local::now().format(template).to_string()
}

mod base64_bytes {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
