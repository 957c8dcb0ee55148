// Entity Models
//
// Every persisted object shares one base shape (see `base.rs`):
// - Stable identity (UUID) assigned once at creation
// - created_at / updated_at timestamps
// - A declared per-kind schema (one struct per kind below)
// - An extension map for attributes the schema doesn't declare
//
// The closed `EntityKind` table is the only way a type tag becomes an entity.

pub mod base;
pub mod base_model;
pub mod user;
pub mod state;
pub mod city;
pub mod amenity;
pub mod place;
pub mod review;

pub use base::{Entity, Record, TIMESTAMP_FORMAT, TYPE_TAG};
pub use base_model::BaseModel;
pub use user::User;
pub use state::State;
pub use city::City;
pub use amenity::Amenity;
pub use place::Place;
pub use review::Review;

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Number, Value};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ENTITY KIND
// ============================================================================

/// Closed set of entity kinds. The string form is the record's type tag and
/// the prefix of every registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    BaseModel,
    User,
    State,
    City,
    Amenity,
    Place,
    Review,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::BaseModel,
        EntityKind::User,
        EntityKind::State,
        EntityKind::City,
        EntityKind::Amenity,
        EntityKind::Place,
        EntityKind::Review,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::BaseModel => "BaseModel",
            EntityKind::User => "User",
            EntityKind::State => "State",
            EntityKind::City => "City",
            EntityKind::Amenity => "Amenity",
            EntityKind::Place => "Place",
            EntityKind::Review => "Review",
        }
    }

    /// Declared schema fields for this kind
    pub fn fields(&self) -> &'static [Field] {
        match self {
            EntityKind::BaseModel => BaseModel::FIELDS,
            EntityKind::User => User::FIELDS,
            EntityKind::State => State::FIELDS,
            EntityKind::City => City::FIELDS,
            EntityKind::Amenity => Amenity::FIELDS,
            EntityKind::Place => Place::FIELDS,
            EntityKind::Review => Review::FIELDS,
        }
    }

    pub fn field(&self, name: &str) -> Option<&'static Field> {
        self.fields().iter().find(|field| field.name == name)
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == tag)
            .ok_or_else(|| Error::UnknownType(tag.to_string()))
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SCHEMA DECLARATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    TextList,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "string",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::TextList => "list of strings",
        }
    }

    /// Whether a JSON value can be stored in a field of this kind
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldKind::Text => value.is_string(),
            FieldKind::Integer => value.is_i64(),
            FieldKind::Float => value.is_number(),
            FieldKind::TextList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
        }
    }

    /// Cast raw text (console input) into a value of this kind.
    /// Returns None when the text doesn't fit.
    pub fn parse(&self, raw: &str) -> Option<Value> {
        match self {
            FieldKind::Text => Some(Value::String(raw.to_string())),
            FieldKind::Integer => raw.trim().parse::<i64>().ok().map(Value::from),
            FieldKind::Float => raw
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
            FieldKind::TextList => serde_json::from_str::<Vec<String>>(raw)
                .ok()
                .map(Value::from),
        }
    }
}

/// One declared field of a kind's schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl Field {
    pub const fn text(name: &'static str) -> Self {
        Field { name, kind: FieldKind::Text }
    }

    pub const fn integer(name: &'static str) -> Self {
        Field { name, kind: FieldKind::Integer }
    }

    pub const fn float(name: &'static str) -> Self {
        Field { name, kind: FieldKind::Float }
    }

    pub const fn text_list(name: &'static str) -> Self {
        Field { name, kind: FieldKind::TextList }
    }
}

/// Per-kind declared fields. Implemented by the plain structs in this module;
/// every field must carry a serde default so partial records load.
pub trait Schema: Serialize + DeserializeOwned + Default + Clone + PartialEq + fmt::Debug {
    const KIND: EntityKind;
    const FIELDS: &'static [Field];

    /// Declared fields as a flat record
    fn to_fields(&self) -> Record {
        // Derived Serialize on structs of strings and numbers cannot fail.
        match serde_json::to_value(self) {
            Ok(Value::Object(fields)) => fields,
            _ => Record::new(),
        }
    }

    /// Build from the declared subset of a record. Absent fields keep their
    /// defaults, mistyped ones are rejected.
    fn from_fields(fields: Record) -> Result<Self> {
        for field in Self::FIELDS {
            if let Some(value) = fields.get(field.name) {
                if !field.kind.accepts(value) {
                    return Err(Error::invalid(
                        field.name,
                        format!("expected {}, got {}", field.kind.as_str(), value),
                    ));
                }
            }
        }
        serde_json::from_value(Value::Object(fields))
            .map_err(|err| Error::invalid(Self::KIND.as_str(), err.to_string()))
    }
}

/// Best-effort typing for attributes outside any schema: integer, then float,
/// then plain string.
pub fn infer_value(raw: &str) -> Value {
    if let Ok(int) = raw.parse::<i64>() {
        return Value::from(int);
    }
    if let Some(number) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(number);
    }
    Value::String(raw.to_string())
}

// ============================================================================
// ENTITY DATA (tagged union of schemas)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum EntityData {
    BaseModel(BaseModel),
    User(User),
    State(State),
    City(City),
    Amenity(Amenity),
    Place(Place),
    Review(Review),
}

macro_rules! with_schema {
    ($data:expr, $schema:ident => $body:expr) => {
        match $data {
            EntityData::BaseModel($schema) => $body,
            EntityData::User($schema) => $body,
            EntityData::State($schema) => $body,
            EntityData::City($schema) => $body,
            EntityData::Amenity($schema) => $body,
            EntityData::Place($schema) => $body,
            EntityData::Review($schema) => $body,
        }
    };
}

impl EntityData {
    /// Schema defaults for a freshly created entity
    pub fn defaults(kind: EntityKind) -> Self {
        match kind {
            EntityKind::BaseModel => EntityData::BaseModel(BaseModel::default()),
            EntityKind::User => EntityData::User(User::default()),
            EntityKind::State => EntityData::State(State::default()),
            EntityKind::City => EntityData::City(City::default()),
            EntityKind::Amenity => EntityData::Amenity(Amenity::default()),
            EntityKind::Place => EntityData::Place(Place::default()),
            EntityKind::Review => EntityData::Review(Review::default()),
        }
    }

    pub fn from_fields(kind: EntityKind, fields: Record) -> Result<Self> {
        Ok(match kind {
            EntityKind::BaseModel => EntityData::BaseModel(BaseModel::from_fields(fields)?),
            EntityKind::User => EntityData::User(User::from_fields(fields)?),
            EntityKind::State => EntityData::State(State::from_fields(fields)?),
            EntityKind::City => EntityData::City(City::from_fields(fields)?),
            EntityKind::Amenity => EntityData::Amenity(Amenity::from_fields(fields)?),
            EntityKind::Place => EntityData::Place(Place::from_fields(fields)?),
            EntityKind::Review => EntityData::Review(Review::from_fields(fields)?),
        })
    }

    pub fn kind(&self) -> EntityKind {
        with_schema!(self, schema => kind_of(schema))
    }

    pub fn to_fields(&self) -> Record {
        with_schema!(self, schema => schema.to_fields())
    }

    pub fn get_field(&self, name: &str) -> Option<Value> {
        self.to_fields().remove(name)
    }

    /// Replace one declared field. The value must match the declared kind.
    pub fn set_field(&mut self, name: &str, value: Value) -> Result<()> {
        with_schema!(self, schema => set_schema_field(schema, name, value))
    }
}

fn kind_of<S: Schema>(_: &S) -> EntityKind {
    S::KIND
}

fn set_schema_field<S: Schema>(schema: &mut S, name: &str, value: Value) -> Result<()> {
    if !S::FIELDS.iter().any(|field| field.name == name) {
        return Err(Error::invalid(
            name,
            format!("not a declared field of {}", S::KIND),
        ));
    }
    let mut fields = schema.to_fields();
    fields.insert(name.to_string(), value);
    *schema = S::from_fields(fields)?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
