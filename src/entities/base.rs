// 🧱 Base Entity - identity, timestamps and the record contract shared by every kind
//
// "id is IDENTITY (never changes), everything else is a VALUE"
//
// Two ways an entity comes to life:
// - fresh: new UUID + timestamps, registered with the storage it was created in
// - reconstructed: rebuilt from a record, NOT registered (the caller is replaying it)

use chrono::{Duration, Local, NaiveDateTime, SubsecRound};
use serde_json::{Map, Value};
use std::fmt;

use super::{infer_value, EntityData, EntityKind};
use crate::error::{Error, Result};
use crate::storage::FileStorage;

/// Flat JSON representation of one entity
pub type Record = Map<String, Value>;

/// Reserved record key naming the entity kind
pub const TYPE_TAG: &str = "__class__";

/// Canonical timestamp format: `YYYY-MM-DDTHH:MM:SS.ffffff`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

// Accepts a missing fraction as well, which older files may contain.
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

const READ_ONLY_ATTRIBUTES: [&str; 4] = ["id", "created_at", "updated_at", TYPE_TAG];

// ============================================================================
// ENTITY
// ============================================================================

/// One persisted domain object.
///
/// Identity: `id` + kind (never change)
/// Values: the declared schema in `data` and free-form attributes in `extra`
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    id: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,

    /// Declared fields for this kind. Plain assignment, no validation.
    pub data: EntityData,

    /// Attributes outside the declared schema
    pub extra: Record,
}

impl Entity {
    /// Fresh identity, not yet registered anywhere.
    pub(crate) fn fresh(kind: EntityKind) -> Self {
        let now = timestamp_now();

        Entity {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            data: EntityData::defaults(kind),
            extra: Record::new(),
        }
    }

    /// Create a new entity and register it with `storage`.
    ///
    /// The returned reference is the registered entity itself; nothing is
    /// written to disk until the storage is saved.
    pub fn create(kind: EntityKind, storage: &mut FileStorage) -> &mut Entity {
        storage.register(Entity::fresh(kind))
    }

    /// Rebuild an entity of `kind` from a record.
    ///
    /// The type tag is ignored (the caller already dispatched on it). `id`,
    /// `created_at` and `updated_at` are required; declared fields are typed
    /// by the kind's schema; everything else lands in `extra` untouched.
    /// The result is NOT registered.
    pub fn from_record(kind: EntityKind, record: &Record) -> Result<Self> {
        let id = match record.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(other) => return Err(Error::invalid("id", format!("expected string, got {other}"))),
            None => return Err(Error::invalid("id", "missing")),
        };
        let created_at = parse_timestamp_field(record, "created_at")?;
        let updated_at = parse_timestamp_field(record, "updated_at")?;

        let mut declared = Record::new();
        let mut extra = Record::new();
        for (name, value) in record {
            if READ_ONLY_ATTRIBUTES.contains(&name.as_str()) {
                continue;
            }
            if kind.field(name).is_some() {
                declared.insert(name.clone(), value.clone());
            } else {
                extra.insert(name.clone(), value.clone());
            }
        }

        Ok(Entity {
            id,
            created_at,
            updated_at,
            data: EntityData::from_fields(kind, declared)?,
            extra,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> EntityKind {
        self.data.kind()
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn updated_at(&self) -> NaiveDateTime {
        self.updated_at
    }

    /// Registry key: `<Kind>.<id>`
    pub fn key(&self) -> String {
        registry_key(self.kind(), &self.id)
    }

    /// Same identity means same id AND same kind.
    pub fn same_identity(&self, other: &Entity) -> bool {
        self.id == other.id && self.kind() == other.kind()
    }

    /// Refresh `updated_at`. Always moves strictly forward.
    pub fn touch(&mut self) {
        let now = timestamp_now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }

    /// Every attribute on the entity plus the type tag.
    ///
    /// ```compile_fail
    /// # use hbnb::{Entity, EntityKind, FileStorage};
    /// let mut storage = FileStorage::new("file.json");
    /// let entity = Entity::create(EntityKind::User, &mut storage);
    /// entity.to_record(5);
    /// ```
    pub fn to_record(&self) -> Record {
        let mut record = self.attributes();
        record.insert(TYPE_TAG.to_string(), Value::from(self.kind().as_str()));
        record
    }

    /// Every attribute on the entity, without the type tag.
    pub fn attributes(&self) -> Record {
        let mut record = self.extra.clone();
        record.extend(self.data.to_fields());
        record.insert("id".to_string(), Value::from(self.id.as_str()));
        record.insert("created_at".to_string(), Value::from(format_timestamp(self.created_at)));
        record.insert("updated_at".to_string(), Value::from(format_timestamp(self.updated_at)));
        record
    }

    pub fn get_attribute(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::from(self.id.as_str())),
            "created_at" => Some(Value::from(format_timestamp(self.created_at))),
            "updated_at" => Some(Value::from(format_timestamp(self.updated_at))),
            _ if self.kind().field(name).is_some() => self.data.get_field(name),
            _ => self.extra.get(name).cloned(),
        }
    }

    /// Set a declared field (value must match its kind) or an extra attribute.
    /// Identity, timestamps and the type tag can't be set.
    pub fn set_attribute(&mut self, name: &str, value: Value) -> Result<()> {
        if READ_ONLY_ATTRIBUTES.contains(&name) {
            return Err(Error::ReadOnlyAttribute(name.to_string()));
        }
        if self.kind().field(name).is_some() {
            self.data.set_field(name, value)
        } else {
            self.extra.insert(name.to_string(), value);
            Ok(())
        }
    }

    /// Like `set_attribute`, casting raw text to the declared field kind.
    /// Undeclared attributes get a best-effort type.
    pub fn set_attribute_from_str(&mut self, name: &str, raw: &str) -> Result<()> {
        let value = match self.kind().field(name) {
            Some(field) => field.kind.parse(raw).ok_or_else(|| {
                Error::invalid(name, format!("expected {}, got '{raw}'", field.kind.as_str()))
            })?,
            None => infer_value(raw),
        };
        self.set_attribute(name, value)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] ({}) {}",
            self.kind(),
            self.id,
            Value::Object(self.attributes())
        )
    }
}

// ============================================================================
// HELPERS
// ============================================================================

pub fn registry_key(kind: EntityKind, id: &str) -> String {
    format!("{}.{}", kind.as_str(), id)
}

/// Local wall-clock time at microsecond precision, so it survives a
/// round-trip through the canonical format unchanged.
pub fn timestamp_now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(6)
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    // Sub-microsecond digits would not survive the next save.
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_PARSE_FORMAT)
        .ok()
        .filter(|ts| ts.trunc_subsecs(6) == *ts)
}

fn parse_timestamp_field(record: &Record, field: &str) -> Result<NaiveDateTime> {
    match record.get(field) {
        Some(Value::String(raw)) => parse_timestamp(raw)
            .ok_or_else(|| Error::invalid(field, format!("'{raw}' is not a {TIMESTAMP_FORMAT} timestamp"))),
        Some(other) => Err(Error::invalid(field, format!("expected timestamp string, got {other}"))),
        None => Err(Error::invalid(field, "missing")),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn scratch_storage() -> FileStorage {
        FileStorage::new("unused.json")
    }

    #[test]
    fn test_fresh_entity_identity() {
        let mut storage = scratch_storage();
        let entity = Entity::create(EntityKind::BaseModel, &mut storage);

        let parsed = uuid::Uuid::parse_str(entity.id()).unwrap();
        assert_eq!(parsed.to_string(), entity.id());
        assert_eq!(entity.created_at(), entity.updated_at());
        assert!(entity.extra.is_empty());
    }

    #[test]
    fn test_fresh_entity_is_registered() {
        let mut storage = scratch_storage();
        let key = Entity::create(EntityKind::User, &mut storage).key();

        assert_eq!(storage.all().len(), 1);
        assert!(key.starts_with("User."));
        assert_eq!(storage.get(&key).unwrap().kind(), EntityKind::User);
    }

    #[test]
    fn test_fresh_ids_are_unique() {
        let mut storage = scratch_storage();
        let a = Entity::create(EntityKind::State, &mut storage).key();
        let b = Entity::create(EntityKind::State, &mut storage).key();

        assert_ne!(a, b);
        assert_eq!(storage.all().len(), 2);
    }

    #[test]
    fn test_timestamps_are_close_to_now() {
        let before = timestamp_now();
        let entity = Entity::fresh(EntityKind::BaseModel);
        let after = timestamp_now();

        assert!(entity.created_at() >= before);
        assert!(entity.created_at() <= after);
    }

    #[test]
    fn test_touch_strictly_increases_updated_at() {
        let mut entity = Entity::fresh(EntityKind::BaseModel);
        let created = entity.created_at();

        for _ in 0..3 {
            let previous = entity.updated_at();
            entity.touch();
            assert!(entity.updated_at() > previous);
        }
        assert_eq!(entity.created_at(), created);
    }

    #[test]
    fn test_to_record_base_model() {
        let entity = Entity::fresh(EntityKind::BaseModel);
        let record = entity.to_record();

        let expected = json!({
            "__class__": "BaseModel",
            "id": entity.id(),
            "created_at": format_timestamp(entity.created_at()),
            "updated_at": format_timestamp(entity.updated_at()),
        });
        assert_eq!(Value::Object(record), expected);
    }

    #[test]
    fn test_to_record_includes_extra_attributes() {
        let mut entity = Entity::fresh(EntityKind::BaseModel);
        entity.set_attribute("name", json!("Tester")).unwrap();
        entity.set_attribute("num", json!(7)).unwrap();

        let record = entity.to_record();
        assert_eq!(record["name"], json!("Tester"));
        assert_eq!(record["num"], json!(7));
        assert_eq!(record.len(), 6);
    }

    #[test]
    fn test_timestamp_format_has_microseconds() {
        let ts = NaiveDate::from_ymd_opt(2017, 9, 28)
            .unwrap()
            .and_hms_micro_opt(21, 5, 54, 119427)
            .unwrap();
        assert_eq!(format_timestamp(ts), "2017-09-28T21:05:54.119427");

        // Whole seconds still render six digits
        let whole = NaiveDate::from_ymd_opt(2017, 9, 28)
            .unwrap()
            .and_hms_opt(21, 5, 54)
            .unwrap();
        assert_eq!(format_timestamp(whole), "2017-09-28T21:05:54.000000");
    }

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("2017-09-28T21:05:54.119427").unwrap();
        assert_eq!(format_timestamp(ts), "2017-09-28T21:05:54.119427");

        let whole = parse_timestamp("2017-09-28T21:05:54").unwrap();
        assert_eq!(format_timestamp(whole), "2017-09-28T21:05:54.000000");

        let padded = parse_timestamp("2017-09-28T21:05:54.119427000").unwrap();
        assert_eq!(padded, ts);
        assert!(parse_timestamp("2017-09-28T21:05:54.119427123").is_none());

        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2017-09-28").is_none());
    }

    #[test]
    fn test_round_trip_is_faithful_and_unregistered() {
        let mut storage = scratch_storage();
        let original = Entity::create(EntityKind::BaseModel, &mut storage).clone();
        let record = original.to_record();

        let rebuilt = Entity::from_record(EntityKind::BaseModel, &record).unwrap();

        assert_eq!(rebuilt.to_record(), record);
        assert_eq!(rebuilt, original);
        assert!(rebuilt.same_identity(&original));
        // Reconstruction didn't add anything to the registry
        assert_eq!(storage.all().len(), 1);
    }

    #[test]
    fn test_from_custom_record() {
        let record = json!({
            "__class__": "BaseModel",
            "name": "Te",
            "updated_at": "2024-03-02T10:00:00.000001",
            "created_at": "2024-03-01T10:00:00.000001",
            "id": "5a1e5d2c-6a04-4b55-9a7f-42f7f0b3f1d3",
        });
        let record = record.as_object().unwrap().clone();

        let entity = Entity::from_record(EntityKind::BaseModel, &record).unwrap();

        assert_eq!(entity.to_record(), record);
        assert!(entity.updated_at() > entity.created_at());
        assert_eq!(entity.get_attribute("name"), Some(json!("Te")));
    }

    #[test]
    fn test_from_record_types_declared_fields() {
        let record = json!({
            "__class__": "Place",
            "id": "p-1",
            "created_at": "2024-03-01T10:00:00.000001",
            "updated_at": "2024-03-01T10:00:00.000001",
            "number_rooms": 3,
            "latitude": 37,
            "note": "2024-03-01T10:00:00.000001",
        });
        let entity = Entity::from_record(EntityKind::Place, record.as_object().unwrap()).unwrap();

        match &entity.data {
            EntityData::Place(place) => {
                assert_eq!(place.number_rooms, 3);
                assert_eq!(place.latitude, 37.0);
                assert_eq!(place.name, "");
            }
            other => panic!("expected place data, got {other:?}"),
        }
        // Extra attributes keep their raw value even if they look like a timestamp
        assert_eq!(entity.extra["note"], json!("2024-03-01T10:00:00.000001"));
    }

    #[test]
    fn test_from_record_rejects_bad_core_fields() {
        let missing_id = json!({
            "created_at": "2024-03-01T10:00:00.000001",
            "updated_at": "2024-03-01T10:00:00.000001",
        });
        let err = Entity::from_record(EntityKind::User, missing_id.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, Error::InvalidRecord { field, .. } if field == "id"));

        let bad_time = json!({
            "id": "u-1",
            "created_at": "last tuesday",
            "updated_at": "2024-03-01T10:00:00.000001",
        });
        let err = Entity::from_record(EntityKind::User, bad_time.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, Error::InvalidRecord { field, .. } if field == "created_at"));
    }

    #[test]
    fn test_from_record_rejects_mistyped_declared_field() {
        let record = json!({
            "id": "u-1",
            "created_at": "2024-03-01T10:00:00.000001",
            "updated_at": "2024-03-01T10:00:00.000001",
            "email": 42,
        });
        let err = Entity::from_record(EntityKind::User, record.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, Error::InvalidRecord { field, .. } if field == "email"));
    }

    #[test]
    fn test_read_only_attributes() {
        let mut entity = Entity::fresh(EntityKind::User);
        for name in ["id", "created_at", "updated_at", TYPE_TAG] {
            let err = entity.set_attribute(name, json!("x")).unwrap_err();
            assert!(matches!(err, Error::ReadOnlyAttribute(_)));
        }
    }

    #[test]
    fn test_set_attribute_from_str_casts() {
        let mut place = Entity::fresh(EntityKind::Place);
        place.set_attribute_from_str("max_guest", "6").unwrap();
        place.set_attribute_from_str("longitude", "-122.41").unwrap();
        place.set_attribute_from_str("name", "Loft").unwrap();
        place.set_attribute_from_str("rating", "4.5").unwrap();

        assert_eq!(place.get_attribute("max_guest"), Some(json!(6)));
        assert_eq!(place.get_attribute("longitude"), Some(json!(-122.41)));
        assert_eq!(place.get_attribute("name"), Some(json!("Loft")));
        assert_eq!(place.extra["rating"], json!(4.5));

        assert!(place.set_attribute_from_str("max_guest", "many").is_err());
    }

    #[test]
    fn test_display() {
        let entity = Entity::fresh(EntityKind::State);
        let shown = entity.to_string();

        assert!(shown.starts_with(&format!("[State] ({}) {{", entity.id())));
        assert!(!shown.contains(TYPE_TAG));
        assert!(shown.contains("\"name\":\"\""));
    }

    #[test]
    fn test_identity_needs_kind_and_id() {
        let user = Entity::fresh(EntityKind::User);
        let mut record = user.to_record();
        record.insert(TYPE_TAG.to_string(), json!("State"));
        let state = Entity::from_record(EntityKind::State, &record).unwrap();

        assert_eq!(state.id(), user.id());
        assert!(!state.same_identity(&user));
        assert_ne!(state.key(), user.key());
    }
}
