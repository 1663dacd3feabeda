//! # entikit: reusable entity models and business logic over Diesel
//!
//! entikit provides ready-made persistent models (countries, states,
//! addresses, people, organizations, contact details and user accounts),
//! declarative validation schemas for them, and create/show/update actions
//! that validate a plain data dictionary before touching the database.
//!
//! ## Features
//!
//! - **Identity mixins**: surrogate ids plus global UUIDs, timestamps and soft deletion
//! - **Party inheritance**: people and organizations share one party table
//! - **Validation schemas**: required/optional fields, type coercion and validators
//! - **Actions**: `*_create`, `*_show`, `*_update` returning typed errors
//! - **Spreadsheet import**: administrative boundaries and organization trees
//!
//! ## Example
//!
//! ```ignore
//! use entikit::db::make_session;
//! use entikit::logic::action::{country_create, state_create};
//! use entikit::DataDict;
//!
//! let mut conn = make_session(None)?;
//! let country = country_create(
//!     &mut conn,
//!     &DataDict::new().with("code", "NG").with("name", "Nigeria"),
//! )?;
//! let state = state_create(
//!     &mut conn,
//!     &DataDict::new()
//!         .with("code", "AB")
//!         .with("name", "Abia")
//!         .with("country_id", country.uuid.to_string()),
//! )?;
//! ```

// Column types and input values
pub mod types;
pub mod value;

// Database schema, sessions and identity mixins
pub mod schema;
pub mod db;
pub mod mixins;

// Models
pub mod address;
pub mod party;
pub mod auth;

// Validation and actions
pub mod error;
pub mod logic;

// Spreadsheet import
pub mod importer;

pub mod config;

// Re-export key types
pub use error::{ActionError, ActionResult, ErrorDict, ValidationError};
pub use mixins::{Entity, Identified, SoftDelete, Timestamped};
pub use types::{Choice, EntityRef, Guid};
pub use value::{DataDict, FieldValue};

pub use address::{Address, Coordinates, Country, Location, State};
pub use party::{
    ContactDetail, ContactType, Gender, MaritalStatus, Organization, OrganizationType, Party,
    PartyType, Person,
};

pub use config::ToolkitConfig;
pub use db::{Database, DatabaseConfig, DbError, GetOrCreate};
pub use logic::ActionContext;
