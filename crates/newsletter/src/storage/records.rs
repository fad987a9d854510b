//! Typed rows for the accumulated category files.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Marker written to a cell that has no value.
pub const PLACEHOLDER: &str = "—";

/// Cell values that mean "no value" when read back.
const EMPTY_LIKE: &[&str] = &["", PLACEHOLDER, "-", "n/a", "none", "nan", "null", "#"];

/// Normalize an optional cell: trim, and map empty-like values to `None`.
#[must_use]
pub fn meaningful(value: Option<&str>) -> Option<&str> {
    let value = value?.trim();
    let lower = value.to_lowercase();
    (!EMPTY_LIKE.contains(&lower.as_str())).then_some(value)
}

/// A row type stored in a category file.
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Header row, in column order.
    const HEADERS: &'static [&'static str];

    /// Uniqueness key within a file.
    fn key(&self) -> &str;
}

/// A grant, event or report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opportunity {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Domain", default, with = "sentinel")]
    pub domain: Option<String>,
    #[serde(rename = "Description", default, with = "sentinel")]
    pub description: Option<String>,
    #[serde(rename = "Date Info", default, with = "sentinel")]
    pub date_info: Option<String>,
    #[serde(rename = "URL", default, with = "sentinel")]
    pub url: Option<String>,
}

impl Record for Opportunity {
    const HEADERS: &'static [&'static str] = &["Title", "Domain", "Description", "Date Info", "URL"];

    fn key(&self) -> &str {
        &self.title
    }
}

/// A person worth contacting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expert {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Role", default, with = "sentinel")]
    pub role: Option<String>,
    #[serde(rename = "Organization", default, with = "sentinel")]
    pub organization: Option<String>,
    #[serde(rename = "LinkedIn", default, with = "sentinel")]
    pub profile_url: Option<String>,
}

impl Record for Expert {
    const HEADERS: &'static [&'static str] = &["Name", "Role", "Organization", "LinkedIn"];

    fn key(&self) -> &str {
        &self.name
    }
}

/// Serde adapter between `Option<String>` and a placeholder-bearing cell.
mod sentinel {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{meaningful, PLACEHOLDER};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(meaningful(value.as_deref()).unwrap_or(PLACEHOLDER))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(meaningful(raw.as_deref()).map(ToString::to_string))
    }
}
