//! Read-only projections of Odoo records.
//!
//! Each struct names the fields it is read with, so callers can pass
//! [`ModuleSummary::FIELDS`] and friends straight to a `read` call.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Deserializes an Odoo scalar that may arrive as `false` when unset.
fn false_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OrFalse<T> {
        Value(T),
        Flag(bool),
    }

    match Option::<OrFalse<T>>::deserialize(deserializer)? {
        Some(OrFalse::Value(v)) => Ok(Some(v)),
        Some(OrFalse::Flag(_)) | None => Ok(None),
    }
}

/// A many-to-one reference as Odoo returns it: `[id, "display name"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Many2One {
    pub id: i64,
    pub name: String,
}

impl<'de> Deserialize<'de> for Many2One {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (id, name) = <(i64, String)>::deserialize(deserializer)?;
        Ok(Self { id, name })
    }
}

impl Serialize for Many2One {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.id, &self.name).serialize(serializer)
    }
}

/// Module list entry (`ir.module.module`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleSummary {
    pub name: String,
    #[serde(default, deserialize_with = "false_as_none")]
    pub shortdesc: Option<String>,
    #[serde(default, deserialize_with = "false_as_none")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "false_as_none")]
    pub installed_version: Option<String>,
}

impl ModuleSummary {
    pub const FIELDS: &'static [&'static str] = &["name", "shortdesc", "state", "installed_version"];
}

/// Full module description used by `get_module_info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDetails {
    pub name: String,
    #[serde(default, deserialize_with = "false_as_none")]
    pub shortdesc: Option<String>,
    #[serde(default, deserialize_with = "false_as_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "false_as_none")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "false_as_none")]
    pub installed_version: Option<String>,
    #[serde(default, deserialize_with = "false_as_none")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "false_as_none")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "false_as_none")]
    pub license: Option<String>,
}

impl ModuleDetails {
    pub const FIELDS: &'static [&'static str] = &[
        "name",
        "shortdesc",
        "description",
        "state",
        "installed_version",
        "author",
        "website",
        "license",
    ];
}

/// A dependency row (`ir.module.module.dependency`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDependency {
    pub name: String,
    #[serde(default, deserialize_with = "false_as_none")]
    pub state: Option<String>,
}

impl ModuleDependency {
    pub const FIELDS: &'static [&'static str] = &["name", "state"];
}

/// User list entry (`res.users`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub login: String,
    #[serde(default, deserialize_with = "false_as_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub active: bool,
}

impl UserSummary {
    pub const FIELDS: &'static [&'static str] = &["name", "login", "email", "active"];
}

/// Detailed user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDetails {
    pub id: i64,
    pub name: String,
    pub login: String,
    #[serde(default, deserialize_with = "false_as_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub groups_id: Vec<i64>,
    #[serde(default, deserialize_with = "false_as_none")]
    pub company_id: Option<Many2One>,
    #[serde(default, deserialize_with = "false_as_none")]
    pub partner_id: Option<Many2One>,
    #[serde(default, deserialize_with = "false_as_none")]
    pub lang: Option<String>,
    #[serde(default, deserialize_with = "false_as_none")]
    pub tz: Option<String>,
}

impl UserDetails {
    pub const FIELDS: &'static [&'static str] = &[
        "name",
        "login",
        "email",
        "active",
        "groups_id",
        "company_id",
        "partner_id",
        "lang",
        "tz",
    ];
}

/// Company record (`res.company`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "false_as_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "false_as_none")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "false_as_none")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "false_as_none")]
    pub currency_id: Option<Many2One>,
}

impl Company {
    pub const FIELDS: &'static [&'static str] =
        &["name", "email", "phone", "website", "currency_id"];
}
