// HBNB Entity Store - Core Library
// Entities, the JSON file storage engine and the console that drives them

pub mod config;
pub mod console;
pub mod entities;
pub mod error;
pub mod storage;

// Re-export commonly used types
pub use config::{StorageConfig, DEFAULT_FILE_PATH, FILE_PATH_ENV};
pub use console::Console;
pub use entities::{
    Entity, EntityData, EntityKind, Field, FieldKind, Record, Schema,
    BaseModel, User, State, City, Amenity, Place, Review,
    TIMESTAMP_FORMAT, TYPE_TAG,
};
pub use error::{Error, Result};
pub use storage::{FileStorage, Registry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
