//! Polymorphic substance (de)serialization.
//!
//! Substances travel as JSON objects carrying a `"type"` discriminator whose
//! value is the concrete variant's fixed identifier, independent of Rust
//! type paths, so the wire format survives refactors and cross-language
//! ports. Writing always uses the runtime variant; reading peeks the
//! discriminator with a non-destructive look-ahead (decode to a generic
//! [`Value`] tree, inspect, then decode fully) and dispatches over the
//! closed variant set.
//!
//! An unrecognized discriminator is a hard failure. The one exception is the
//! explicit lenient path for the homogeneous capability, which falls back to
//! the nearest discriminated ancestor ([`decode_homogeneous_lenient`]).

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::substance::{Chemical, HomogeneousSubstance, Mixture, Solution, Substance};

/// Field name carrying the type discriminator.
pub const DISCRIMINATOR: &str = "type";

/// Discriminator for [`Chemical`].
pub const CHEMICAL: &str = "Chemical";
/// Discriminator for [`HomogeneousSubstance`].
pub const HOMOGENEOUS_SUBSTANCE: &str = "HomogeneousSubstance";
/// Discriminator for [`Mixture`].
pub const MIXTURE: &str = "Mixture";
/// Discriminator for [`Solution`].
pub const SOLUTION: &str = "Solution";

/// Error type for substance encoding and decoding.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("expected a JSON object")]
    NotAnObject,
    #[error("missing type discriminator")]
    MissingDiscriminator,
    #[error("unknown type discriminator: {0}")]
    UnknownDiscriminator(String),
    #[error("expected discriminator {expected}, found {found}")]
    UnexpectedDiscriminator {
        expected: &'static str,
        found: String,
    },
    #[error("{0} is not a homogeneous substance type")]
    NotHomogeneous(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Serializes a substance from its runtime variant, discriminator included.
pub fn encode(substance: &Substance) -> Result<String, CodecError> {
    Ok(serde_json::to_string(substance)?)
}

/// [`encode`] to a generic JSON tree.
pub fn encode_value(substance: &Substance) -> Result<Value, CodecError> {
    Ok(serde_json::to_value(substance)?)
}

/// Deserializes any substance, dispatching on the discriminator.
pub fn decode(text: &str) -> Result<Substance, CodecError> {
    decode_value(serde_json::from_str(text)?)
}

/// [`decode`] from a generic JSON tree.
pub fn decode_value(value: Value) -> Result<Substance, CodecError> {
    let tag = peek_discriminator(&value)?.to_string();
    match tag.as_str() {
        CHEMICAL => Ok(Substance::Chemical(serde_json::from_value(value)?)),
        HOMOGENEOUS_SUBSTANCE => Ok(Substance::HomogeneousSubstance(serde_json::from_value(
            value,
        )?)),
        MIXTURE => Ok(Substance::Mixture(serde_json::from_value(value)?)),
        SOLUTION => Ok(Substance::Solution(serde_json::from_value(value)?)),
        _ => Err(CodecError::UnknownDiscriminator(tag)),
    }
}

/// Reads the discriminator without consuming the tree.
pub fn peek_discriminator(value: &Value) -> Result<&str, CodecError> {
    let object = value.as_object().ok_or(CodecError::NotAnObject)?;
    object
        .get(DISCRIMINATOR)
        .and_then(Value::as_str)
        .ok_or(CodecError::MissingDiscriminator)
}

/// Deserializes a substance required to be homogeneous.
///
/// Composite discriminators fail with [`CodecError::NotHomogeneous`];
/// unknown discriminators fail hard as everywhere else.
pub fn decode_homogeneous(text: &str) -> Result<Substance, CodecError> {
    decode_homogeneous_value(serde_json::from_str(text)?)
}

/// [`decode_homogeneous`] from a generic JSON tree.
pub fn decode_homogeneous_value(value: Value) -> Result<Substance, CodecError> {
    let tag = peek_discriminator(&value)?.to_string();
    match tag.as_str() {
        CHEMICAL => Ok(Substance::Chemical(serde_json::from_value(value)?)),
        HOMOGENEOUS_SUBSTANCE => Ok(Substance::HomogeneousSubstance(serde_json::from_value(
            value,
        )?)),
        MIXTURE | SOLUTION => Err(CodecError::NotHomogeneous(tag)),
        _ => Err(CodecError::UnknownDiscriminator(tag)),
    }
}

/// Like [`decode_homogeneous`], but an *unknown* discriminator falls back to
/// the nearest discriminated ancestor and decodes the homogeneous field
/// subset. For targets typed at the homogeneous capability this keeps data
/// written by newer producers loadable; composite discriminators still fail.
pub fn decode_homogeneous_lenient(text: &str) -> Result<Substance, CodecError> {
    let value: Value = serde_json::from_str(text)?;
    let tag = peek_discriminator(&value)?.to_string();
    match tag.as_str() {
        CHEMICAL | HOMOGENEOUS_SUBSTANCE => decode_homogeneous_value(value),
        MIXTURE | SOLUTION => Err(CodecError::NotHomogeneous(tag)),
        _ => {
            log::debug!("falling back to HomogeneousSubstance for discriminator {tag:?}");
            Ok(Substance::HomogeneousSubstance(serde_json::from_value(
                value,
            )?))
        }
    }
}

fn decode_expecting<T: DeserializeOwned>(
    value: Value,
    expected: &'static str,
) -> Result<T, CodecError> {
    let found = peek_discriminator(&value)?.to_string();
    if found != expected {
        return Err(CodecError::UnexpectedDiscriminator { expected, found });
    }
    Ok(serde_json::from_value(value)?)
}

/// Deserializes a [`Chemical`], verifying the discriminator.
pub fn decode_chemical(text: &str) -> Result<Chemical, CodecError> {
    decode_expecting(serde_json::from_str(text)?, CHEMICAL)
}

/// Deserializes a [`HomogeneousSubstance`], verifying the discriminator.
pub fn decode_homogeneous_substance(text: &str) -> Result<HomogeneousSubstance, CodecError> {
    decode_expecting(serde_json::from_str(text)?, HOMOGENEOUS_SUBSTANCE)
}

/// Deserializes a [`Mixture`], verifying the discriminator.
pub fn decode_mixture(text: &str) -> Result<Mixture, CodecError> {
    decode_expecting(serde_json::from_str(text)?, MIXTURE)
}

/// Deserializes a [`Solution`], verifying the discriminator.
pub fn decode_solution(text: &str) -> Result<Solution, CodecError> {
    decode_expecting(serde_json::from_str(text)?, SOLUTION)
}

// Substance deserialization routes through the discriminator dispatch, so
// nested positions (collections, material payloads) get the same semantics
// as the top-level entry points.
impl<'de> Deserialize<'de> for Substance {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        decode_value(value).map_err(serde::de::Error::custom)
    }
}
