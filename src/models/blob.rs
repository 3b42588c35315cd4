use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Serialized payload stored alongside a row without being modeled
/// relationally. Only the typed accessors on the owning model decode it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Blob(String);

impl Blob {
    pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Self(serde_json::to_string(value)?))
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.0)?)
    }

    pub fn from_raw(raw: String) -> Self {
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Enclosure;

    #[test]
    fn decodes_what_it_encoded() {
        let enclosures = vec![Enclosure {
            url: "https://example.com/ep1.mp3".to_string(),
            mime_type: Some("audio/mpeg".to_string()),
            length: Some(1024),
        }];
        let blob = Blob::encode(&enclosures).unwrap();
        let back: Vec<Enclosure> = blob.decode().unwrap();
        assert_eq!(back, enclosures);
    }

    #[test]
    fn none_is_stored_as_json_null() {
        let blob = Blob::encode(&Option::<Enclosure>::None).unwrap();
        assert_eq!(blob.as_str(), "null");
    }

    #[test]
    fn garbage_fails_to_decode() {
        let blob = Blob::from_raw("{not json".to_string());
        assert!(blob.decode::<Vec<Enclosure>>().is_err());
    }
}
