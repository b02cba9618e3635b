//! Protobuf schema generation.
//!
//! Turns a canonical manifest and the enum values aggregated in its lock
//! into proto3 units under `pulse/v1/`:
//! - one `<domain>.proto` per domain holding that domain's enums
//! - fixed `attributes.proto` and `services.proto`
//! - `entities.proto`, whose import list is generated from the domains

pub mod bundle;
pub mod enums;
pub mod error;
pub mod generator;
pub mod naming;

pub use bundle::{SchemaBundle, SchemaUnit};
pub use enums::{enum_types, EnumType, EnumValue, ValueNaming};
pub use error::SchemaError;
pub use generator::SchemaGenerator;

/// Proto package every unit is declared in.
pub const PACKAGE: &str = "pulse.v1";

/// Directory (relative to the output root) matching [`PACKAGE`].
pub const PACKAGE_DIR: &str = "pulse/v1";
