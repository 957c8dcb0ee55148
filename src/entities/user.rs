// 👤 User Entity
//
// Credentials are stored as given. The store doesn't hash or validate them.

use serde::{Deserialize, Serialize};

use super::{EntityKind, Field, Schema};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl Schema for User {
    const KIND: EntityKind = EntityKind::User;
    const FIELDS: &'static [Field] = &[
        Field::text("email"),
        Field::text("password"),
        Field::text("first_name"),
        Field::text("last_name"),
    ];
}
