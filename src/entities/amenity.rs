// 🛁 Amenity Entity

use serde::{Deserialize, Serialize};

use super::{EntityKind, Field, Schema};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Amenity {
    pub name: String,
}

impl Schema for Amenity {
    const KIND: EntityKind = EntityKind::Amenity;
    const FIELDS: &'static [Field] = &[Field::text("name")];
}
