// Plain BaseModel kind - identity and timestamps only, no declared fields

use serde::{Deserialize, Serialize};

use super::{EntityKind, Field, Schema};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseModel {}

impl Schema for BaseModel {
    const KIND: EntityKind = EntityKind::BaseModel;
    const FIELDS: &'static [Field] = &[];
}
