// 🏙️ City Entity - belongs to a State through `state_id`

use serde::{Deserialize, Serialize};

use super::{EntityKind, Field, Schema};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct City {
    /// Id of the owning State. Not checked against the registry.
    pub state_id: String,
    pub name: String,
}

impl Schema for City {
    const KIND: EntityKind = EntityKind::City;
    const FIELDS: &'static [Field] = &[Field::text("state_id"), Field::text("name")];
}
