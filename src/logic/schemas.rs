//! Default validation schemas for the built-in models.

use super::validators::{node, url, FieldType, Schema};
use crate::party::{Gender, MaritalStatus};

pub const ADDRESS_PREFIX: &str = "addr_";

pub fn default_country_schema() -> Schema {
    Schema::new()
        .field("code", FieldType::Str, [])
        .field("name", FieldType::Str, [])
}

pub fn default_state_schema() -> Schema {
    Schema::new()
        .field("country_id", FieldType::Uuid, [])
        .merge(default_country_schema())
}

/// Address fields; prefixed with `addr_` when embedded in another model.
/// `postal_code` is never prefixed.
pub fn default_address_schema(is_mixin: bool) -> Schema {
    let prefix = if is_mixin { ADDRESS_PREFIX } else { "" };
    Schema::new()
        .field(format!("{}raw", prefix), FieldType::Str, [node::optional(None)])
        .field(format!("{}street", prefix), FieldType::Str, [node::optional(None)])
        .field(format!("{}town", prefix), FieldType::Str, [node::optional(None)])
        .field(format!("{}landmark", prefix), FieldType::Str, [node::optional(None)])
        .field(format!("{}state_id", prefix), FieldType::Uuid, [node::optional(None)])
        .field("postal_code", FieldType::Str, [node::optional(None)])
}

pub fn coordinate_mixin_schema() -> Schema {
    Schema::new()
        .field("latitude", FieldType::Float, [node::optional(None)])
        .field("longitude", FieldType::Float, [node::optional(None)])
        .field("altitude", FieldType::Float, [node::optional(None)])
        .field("gps_error", FieldType::Float, [node::optional(None)])
}

pub fn locatable_mixin_schema() -> Schema {
    default_address_schema(true).merge(coordinate_mixin_schema())
}

fn default_party_schema() -> Schema {
    Schema::new()
        .field("name", FieldType::Str, [])
        .merge(default_address_schema(true))
}

pub fn default_person_schema() -> Schema {
    Schema::new()
        .field("title", FieldType::Str, [node::optional(None)])
        .field("middle_name", FieldType::Str, [node::optional(None)])
        .field("last_name", FieldType::Str, [node::optional(None)])
        .field("gender", FieldType::enumeration::<Gender>(), [node::optional(None)])
        .field("date_born", FieldType::Date, [node::optional(None)])
        .field(
            "marital_status",
            FieldType::enumeration::<MaritalStatus>(),
            [node::optional(None)],
        )
        .field("state_origin_id", FieldType::Uuid, [node::optional(None)])
        .field("nationality_id", FieldType::Uuid, [node::optional(None)])
        .merge(default_party_schema())
}

pub fn default_organization_type_schema() -> Schema {
    Schema::new()
        .field("name", FieldType::Str, [])
        .field("title", FieldType::Str, [])
        .field("is_root", FieldType::Bool, [node::optional(None)])
}

/// Organization fields. `parent_id` is required unless the organization is
/// a root, in which case the field is left out.
pub fn default_organization_schema(for_root: bool) -> Schema {
    let mut schema = Schema::new()
        .field("code", FieldType::Str, [])
        .field("short_name", FieldType::Str, [node::optional(None)])
        .field("description", FieldType::Str, [node::optional(None)])
        .field("type_id", FieldType::Uuid, [])
        .field("parent_id", FieldType::Uuid, [])
        .field("date_established", FieldType::Date, [node::optional(None)])
        .field(
            "website_url",
            FieldType::Str,
            [node::optional(None), node::validator(url())],
        );
    if for_root {
        schema.remove("parent_id");
    }

    schema
        .merge(default_party_schema())
        .merge(coordinate_mixin_schema())
}
