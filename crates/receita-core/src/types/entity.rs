//! # Entity Labels
//!
//! The closed set of entity types tracked by the evaluation engine, and the
//! open label type used by annotations and predictions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Entity types tracked by the metrics engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    /// Amounts and units, e.g. "2 xícaras".
    #[serde(rename = "QUANTIDADE")]
    Quantidade,
    /// Food items, e.g. "farinha de trigo".
    #[serde(rename = "INGREDIENTE")]
    Ingrediente,
}

impl EntityType {
    /// Get all tracked entity types in report order.
    pub fn all() -> &'static [EntityType] {
        &[EntityType::Quantidade, EntityType::Ingrediente]
    }

    /// The label string used in corpora and model output.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Quantidade => "QUANTIDADE",
            EntityType::Ingrediente => "INGREDIENTE",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "QUANTIDADE" => Ok(EntityType::Quantidade),
            "INGREDIENTE" => Ok(EntityType::Ingrediente),
            other => Err(format!("unknown entity type: {other}")),
        }
    }
}

/// A span label as it appears in data.
///
/// Labels outside [`EntityType`] are kept so the corpus round-trips, but the
/// metrics engine never counts them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Label {
    Known(EntityType),
    Other(String),
}

impl Label {
    /// The tracked entity type, if any.
    pub fn entity_type(&self) -> Option<EntityType> {
        match self {
            Label::Known(ty) => Some(*ty),
            Label::Other(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Label::Known(ty) => ty.as_str(),
            Label::Other(raw) => raw,
        }
    }

    /// Returns `true` if this label is exactly the given entity type.
    pub fn is(&self, ty: EntityType) -> bool {
        matches!(self, Label::Known(known) if *known == ty)
    }
}

impl From<EntityType> for Label {
    fn from(ty: EntityType) -> Self {
        Label::Known(ty)
    }
}

impl From<String> for Label {
    fn from(raw: String) -> Self {
        match raw.parse::<EntityType>() {
            Ok(ty) => Label::Known(ty),
            Err(_) => Label::Other(raw),
        }
    }
}

impl From<&str> for Label {
    fn from(raw: &str) -> Self {
        Label::from(raw.to_string())
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        match label {
            Label::Known(ty) => ty.as_str().to_string(),
            Label::Other(raw) => raw,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_from_str() {
        for ty in EntityType::all() {
            assert_eq!(ty.as_str().parse::<EntityType>(), Ok(*ty));
        }
        assert!("quantidade".parse::<EntityType>().is_err());
    }

    #[test]
    fn test_label_keeps_unknown_values() {
        let label = Label::from("UTENSILIO");
        assert_eq!(label, Label::Other("UTENSILIO".into()));
        assert_eq!(label.entity_type(), None);
        assert_eq!(label.to_string(), "UTENSILIO");
    }

    #[test]
    fn test_label_is() {
        let label = Label::from("INGREDIENTE");
        assert!(label.is(EntityType::Ingrediente));
        assert!(!label.is(EntityType::Quantidade));
        assert!(!Label::Other("INGREDIENTE_X".into()).is(EntityType::Ingrediente));
    }

    #[test]
    fn test_label_serializes_as_plain_string() {
        let json = serde_json::to_string(&Label::Known(EntityType::Quantidade)).unwrap();
        assert_eq!(json, "\"QUANTIDADE\"");
        let back: Label = serde_json::from_str("\"TEMPERO\"").unwrap();
        assert_eq!(back, Label::Other("TEMPERO".into()));
    }
}
