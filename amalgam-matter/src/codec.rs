//! Material (de)serialization.
//!
//! Plain materials and composites share one generic entry point. The two
//! forms are told apart by peeking for a `"components"` field on the decoded
//! JSON tree (the same non-destructive look-ahead the substance codec uses
//! for its discriminator) before the real decode into the matched concrete
//! type.

use serde::Deserialize;
use serde_json::Value;

use crate::material::{Composite, Material};

/// Field whose presence marks a composite.
pub const COMPONENTS: &str = "components";

/// Error type for material encoding and decoding.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("expected a JSON object")]
    NotAnObject,
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Either kind of matter, as resolved by the generic decoder.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Matter {
    Material(Material),
    Composite(Composite),
}

impl Matter {
    pub fn is_composite(&self) -> bool {
        matches!(self, Matter::Composite(_))
    }

    /// Total mass in kg.
    pub fn mass(&self) -> f64 {
        match self {
            Matter::Material(m) => m.mass,
            Matter::Composite(c) => c.mass(),
        }
    }
}

impl From<Material> for Matter {
    fn from(material: Material) -> Self {
        Matter::Material(material)
    }
}

impl From<Composite> for Matter {
    fn from(composite: Composite) -> Self {
        Matter::Composite(composite)
    }
}

/// Serializes either kind of matter; composites carry their components
/// array, plain materials never do.
pub fn encode(matter: &Matter) -> Result<String, CodecError> {
    Ok(serde_json::to_string(matter)?)
}

/// Decodes a material or composite, disambiguating by the `"components"`
/// field.
pub fn decode(text: &str) -> Result<Matter, CodecError> {
    decode_value(serde_json::from_str(text)?)
}

/// [`decode`] from a generic JSON tree.
pub fn decode_value(value: Value) -> Result<Matter, CodecError> {
    if !value.is_object() {
        return Err(CodecError::NotAnObject);
    }
    if value.get(COMPONENTS).is_some() {
        Ok(Matter::Composite(serde_json::from_value(value)?))
    } else {
        Ok(Matter::Material(serde_json::from_value(value)?))
    }
}

/// Decodes a plain material.
pub fn decode_material(text: &str) -> Result<Material, CodecError> {
    Ok(serde_json::from_str(text)?)
}

/// Decodes a composite.
pub fn decode_composite(text: &str) -> Result<Composite, CodecError> {
    Ok(serde_json::from_str(text)?)
}

// The generic disambiguation is also the serde entry point, so matter nested
// in larger documents decodes the same way as at top level.
impl<'de> Deserialize<'de> for Matter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        decode_value(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;
    use amalgam_core::reference::HomogeneousReference;

    fn block() -> Material {
        Material::of_substance(
            HomogeneousReference::new("water"),
            Shape::cuboid([0.1, 0.1, 0.1]),
            1.0,
            998.2,
        )
        .with_temperature(293.15)
    }

    #[test]
    fn material_roundtrip() {
        let original = Matter::from(block());
        let text = encode(&original).unwrap();
        let decoded = decode(&text).unwrap();
        assert_eq!(decoded, original);
        assert!(!decoded.is_composite());
    }

    #[test]
    fn composite_roundtrip() {
        let original = Matter::from(block().split(&[0.8]).unwrap());
        let text = encode(&original).unwrap();
        let decoded = decode(&text).unwrap();
        assert_eq!(decoded, original);
        assert!(decoded.is_composite());
    }

    #[test]
    fn disambiguation_peeks_components() {
        let material_text = encode(&Matter::from(block())).unwrap();
        assert!(!material_text.contains(COMPONENTS));
        let composite_text = encode(&Matter::from(block().split(&[]).unwrap())).unwrap();
        assert!(composite_text.contains(COMPONENTS));
    }

    #[test]
    fn constituent_keys_accept_both_prefixes() {
        let text = r#"{
            "constituents": {"HR:water": 0.5, "SR:brass": 0.5},
            "shape": {"type": "Point"},
            "mass": 1.0,
            "density": 4000.0
        }"#;
        let material = decode_material(text).unwrap();
        assert_eq!(material.constituents.len(), 2);
    }

    #[test]
    fn bad_constituent_keys_fail_hard() {
        let text = r#"{
            "constituents": {"XX:water": 1.0},
            "mass": 1.0,
            "density": 1000.0
        }"#;
        assert!(matches!(
            decode_material(text),
            Err(CodecError::Json(_))
        ));
        assert!(decode(text).is_err());
    }

    #[test]
    fn non_object_is_rejected() {
        assert!(matches!(decode("[]"), Err(CodecError::NotAnObject)));
    }

    #[test]
    fn empty_material_decodes_from_empty_object() {
        let decoded = decode("{}").unwrap();
        assert_eq!(decoded, Matter::Material(Material::empty()));
    }
}
