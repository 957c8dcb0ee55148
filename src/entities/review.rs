// ⭐ Review Entity - a User's text about a Place

use serde::{Deserialize, Serialize};

use super::{EntityKind, Field, Schema};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Review {
    pub place_id: String,
    pub user_id: String,
    pub text: String,
}

impl Schema for Review {
    const KIND: EntityKind = EntityKind::Review;
    const FIELDS: &'static [Field] = &[
        Field::text("place_id"),
        Field::text("user_id"),
        Field::text("text"),
    ];
}
