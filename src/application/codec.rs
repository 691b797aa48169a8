//! Codecs between the flat record document and bytes
//!
//! The model only deals in [`TreeDocument`]s; turning them into bytes is the
//! codec's job. JSON and TOML are provided, [`Format`] picks one at runtime.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::TreeDocument;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("{format} encode failed: {message}")]
    Encode { format: Format, message: String },

    #[error("{format} decode failed: {message}")]
    Decode { format: Format, message: String },
}

/// Lossless encoding of ids, payloads and child-id lists.
pub trait Codec {
    fn format(&self) -> Format;

    fn encode<P: Serialize>(&self, doc: &TreeDocument<P>) -> Result<Vec<u8>, CodecError>;

    fn decode<P: DeserializeOwned>(&self, bytes: &[u8]) -> Result<TreeDocument<P>, CodecError>;
}

/// Supported persistence formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Json,
    Toml,
}

impl Format {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Toml => write!(f, "toml"),
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            other => Err(format!("unknown format '{other}', expected json or toml")),
        }
    }
}

impl Codec for Format {
    fn format(&self) -> Format {
        *self
    }

    fn encode<P: Serialize>(&self, doc: &TreeDocument<P>) -> Result<Vec<u8>, CodecError> {
        match self {
            Self::Json => JsonCodec::default().encode(doc),
            Self::Toml => TomlCodec.encode(doc),
        }
    }

    fn decode<P: DeserializeOwned>(&self, bytes: &[u8]) -> Result<TreeDocument<P>, CodecError> {
        match self {
            Self::Json => JsonCodec::default().decode(bytes),
            Self::Toml => TomlCodec.decode(bytes),
        }
    }
}

/// JSON via `serde_json`, pretty-printed by default.
#[derive(Debug, Clone, Copy)]
pub struct JsonCodec {
    pub pretty: bool,
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl Codec for JsonCodec {
    fn format(&self) -> Format {
        Format::Json
    }

    fn encode<P: Serialize>(&self, doc: &TreeDocument<P>) -> Result<Vec<u8>, CodecError> {
        let result = if self.pretty {
            serde_json::to_vec_pretty(doc)
        } else {
            serde_json::to_vec(doc)
        };
        result.map_err(|e| CodecError::Encode {
            format: Format::Json,
            message: e.to_string(),
        })
    }

    fn decode<P: DeserializeOwned>(&self, bytes: &[u8]) -> Result<TreeDocument<P>, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Decode {
            format: Format::Json,
            message: e.to_string(),
        })
    }
}

/// TOML via `toml`; records become an array of `[[nodes]]` tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlCodec;

impl Codec for TomlCodec {
    fn format(&self) -> Format {
        Format::Toml
    }

    fn encode<P: Serialize>(&self, doc: &TreeDocument<P>) -> Result<Vec<u8>, CodecError> {
        toml::to_string_pretty(doc)
            .map(String::into_bytes)
            .map_err(|e| CodecError::Encode {
                format: Format::Toml,
                message: e.to_string(),
            })
    }

    fn decode<P: DeserializeOwned>(&self, bytes: &[u8]) -> Result<TreeDocument<P>, CodecError> {
        let text = std::str::from_utf8(bytes).map_err(|e| CodecError::Decode {
            format: Format::Toml,
            message: e.to_string(),
        })?;
        toml::from_str(text).map_err(|e| CodecError::Decode {
            format: Format::Toml,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeRecord;

    fn doc() -> TreeDocument<String> {
        vec![
            NodeRecord {
                id: 0,
                payload: "Selector".to_string(),
                children: vec![1],
            },
            NodeRecord {
                id: 1,
                payload: "Wait".to_string(),
                children: vec![],
            },
        ]
        .into()
    }

    #[test]
    fn given_document_when_json_round_trip_then_equal() {
        let codec = JsonCodec { pretty: false };
        let bytes = codec.encode(&doc()).unwrap();
        assert_eq!(codec.decode::<String>(&bytes).unwrap(), doc());
    }

    #[test]
    fn given_document_when_toml_round_trip_then_equal() {
        let bytes = TomlCodec.encode(&doc()).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("[[nodes]]"), "{text}");
        assert_eq!(TomlCodec.decode::<String>(&bytes).unwrap(), doc());
    }

    #[test]
    fn given_empty_toml_then_empty_document() {
        let decoded: TreeDocument<String> = TomlCodec.decode(b"").unwrap();
        assert!(decoded.nodes.is_empty());
    }

    #[test]
    fn given_garbage_when_decoding_then_decode_error() {
        let err = Format::Json.decode::<String>(b"{not json").unwrap_err();
        assert!(matches!(err, CodecError::Decode { format: Format::Json, .. }));
    }

    #[test]
    fn given_paths_then_format_from_extension() {
        assert_eq!(Format::from_path(Path::new("a/tree.TOML")), Some(Format::Toml));
        assert_eq!(Format::from_path(Path::new("tree.json")), Some(Format::Json));
        assert_eq!(Format::from_path(Path::new("tree.bin")), None);
        assert_eq!("Toml".parse::<Format>().unwrap(), Format::Toml);
        assert!("yaml".parse::<Format>().is_err());
    }
}
