// 🏠 Place Entity - a listing in a City, owned by a User
//
// The only kind mixing strings, integers, floats and a list in its schema.

use serde::{Deserialize, Serialize};

use super::{EntityKind, Field, Schema};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Place {
    pub city_id: String,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub number_rooms: i64,
    pub number_bathrooms: i64,
    pub max_guest: i64,
    pub price_by_night: i64,
    pub latitude: f64,
    pub longitude: f64,
    /// Ids of Amenity entities
    pub amenity_ids: Vec<String>,
}

impl Schema for Place {
    const KIND: EntityKind = EntityKind::Place;
    const FIELDS: &'static [Field] = &[
        Field::text("city_id"),
        Field::text("user_id"),
        Field::text("name"),
        Field::text("description"),
        Field::integer("number_rooms"),
        Field::integer("number_bathrooms"),
        Field::integer("max_guest"),
        Field::integer("price_by_night"),
        Field::float("latitude"),
        Field::float("longitude"),
        Field::text_list("amenity_ids"),
    ];
}
