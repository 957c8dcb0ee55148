// 🗄️ File Storage - the registry of live entities and its JSON file
//
// One engine value owns:
// - the registry: "<Kind>.<id>" → Entity
// - the path of the backing file
//
// Every save rewrites the whole file (full snapshot). There is no temp file,
// no rename and no lock: two engines sharing one file, or a crash mid-write,
// can lose or corrupt data.

use serde_json::Value;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::StorageConfig;
use crate::entities::{Entity, EntityKind, Record, TYPE_TAG};
use crate::error::{Error, Result};

/// Registry key → live entity, ordered by key
pub type Registry = BTreeMap<String, Entity>;

// ============================================================================
// FILE STORAGE
// ============================================================================

#[derive(Debug)]
pub struct FileStorage {
    file_path: PathBuf,
    objects: Registry,
}

impl FileStorage {
    /// Empty registry backed by `file_path`. Nothing is read until `reload`.
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        FileStorage {
            file_path: file_path.into(),
            objects: Registry::new(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.file_path.clone())
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// The whole registry, unfiltered
    pub fn all(&self) -> &Registry {
        &self.objects
    }

    /// The live registry. Changes made through it are what `save` writes.
    pub fn all_mut(&mut self) -> &mut Registry {
        &mut self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Entity> {
        self.objects.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Entity> {
        self.objects.get_mut(key)
    }

    /// Entities of one kind, in key order
    pub fn by_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.objects.values().filter(move |entity| entity.kind() == kind)
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.by_kind(kind).count()
    }

    /// Insert `entity` under `<Kind>.<id>`, replacing whatever was there.
    /// Nothing is persisted.
    pub fn register(&mut self, entity: Entity) -> &mut Entity {
        let key = entity.key();
        debug!(key = %key, "registering entity");

        match self.objects.entry(key) {
            Entry::Occupied(mut slot) => {
                slot.insert(entity);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(entity),
        }
    }

    /// Remove the entry at `key`. Nothing is persisted.
    pub fn delete(&mut self, key: &str) -> Option<Entity> {
        let removed = self.objects.remove(key);
        if removed.is_some() {
            debug!(key = %key, "deleted entity");
        }
        removed
    }

    /// Overwrite the backing file with every registered entity.
    pub fn save(&self) -> Result<()> {
        let snapshot: Record = self
            .objects
            .iter()
            .map(|(key, entity)| (key.clone(), Value::Object(entity.to_record())))
            .collect();

        let content = serde_json::to_string(&snapshot)?;
        fs::write(&self.file_path, content).map_err(|source| Error::Io {
            path: self.file_path.clone(),
            source,
        })?;

        info!(
            path = %self.file_path.display(),
            count = snapshot.len(),
            "saved registry"
        );
        Ok(())
    }

    /// Refresh `updated_at` on the entity at `key`, then save everything.
    pub fn save_entity(&mut self, key: &str) -> Result<()> {
        self.objects
            .get_mut(key)
            .ok_or_else(|| Error::NotFound(key.to_string()))?
            .touch();
        self.save()
    }

    /// Load every record from the backing file into the registry.
    ///
    /// - No file: registry untouched, Ok
    /// - Empty or invalid JSON: `Error::Parse`
    /// - Unknown or missing type tag: `Error::UnknownType` / `Error::MissingTypeTag`
    ///
    /// Records are inserted under their original keys, alongside whatever is
    /// already registered. On any error the registry is left unchanged.
    pub fn reload(&mut self) -> Result<()> {
        if !self.file_path.is_file() {
            debug!(path = %self.file_path.display(), "no storage file, nothing to reload");
            return Ok(());
        }

        let content = fs::read_to_string(&self.file_path).map_err(|source| Error::Io {
            path: self.file_path.clone(),
            source,
        })?;
        let snapshot: Record = serde_json::from_str(&content).map_err(|source| Error::Parse {
            path: self.file_path.clone(),
            source,
        })?;

        let mut loaded = Registry::new();
        for (key, value) in snapshot {
            let entity = reconstruct(&key, value)?;
            loaded.insert(key, entity);
        }

        info!(
            path = %self.file_path.display(),
            count = loaded.len(),
            "reloaded registry"
        );
        self.objects.extend(loaded);
        Ok(())
    }
}

/// Dispatch one stored record on its type tag.
fn reconstruct(key: &str, value: Value) -> Result<Entity> {
    let Value::Object(record) = value else {
        return Err(Error::invalid(key, "record is not a JSON object"));
    };
    let tag = record
        .get(TYPE_TAG)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::MissingTypeTag(key.to_string()))?;
    let kind: EntityKind = tag.parse()?;

    Entity::from_record(kind, &record)
}

// ============================================================================
// TESTS
// ============================================================================
