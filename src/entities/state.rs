// 🗺️ State Entity

use serde::{Deserialize, Serialize};

use super::{EntityKind, Field, Schema};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct State {
    pub name: String,
}

impl Schema for State {
    const KIND: EntityKind = EntityKind::State;
    const FIELDS: &'static [Field] = &[Field::text("name")];
}
