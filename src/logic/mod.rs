//! Business logic: validation schemas and the create/show/update actions
//! built on them.

pub mod action;
pub mod schemas;
pub mod validators;

pub use crate::error::{ActionError, ActionResult, ErrorDict, ValidationError};
pub use action::ActionContext;
pub use validators::{node, validate, Cleaned, FieldSpec, FieldType, Schema, Validated};
