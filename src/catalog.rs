//! Asset identifiers and the ordered model catalog
//!
//! Every identifier is normalized to one canonical form on construction so the
//! byte cache, the scene cache and the prefetch visited set all agree on keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewerError};

/// The product line shipped with the viewer, in display order.
pub const PRODUCT_LINE: [&str; 10] = [
    "/super_burguer.glb",
    "/quarteto_fantastico.glb",
    "/Duplo_Cheddar_Bacon.glb",
    "/X_Frango.glb",
    "/X_Bacon.glb",
    "/X_Calabresa.glb",
    "/X_Presunto.glb",
    "/X_Egg.glb",
    "/X_Burguer.glb",
    "/Autobot.glb",
];

/// Canonical path of a model inside the static asset directory.
///
/// Relative and absolute spellings of the same file (`models/a.glb`,
/// `./models/a.glb`, `/models//a.glb`) all normalize to `/models/a.glb`.
/// Full URLs are kept as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetId(String);

impl AssetId {
    /// Parse and normalize an identifier
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ViewerError::InvalidAssetId(raw.to_string()));
        }

        if trimmed.contains("://") {
            return Ok(Self(trimmed.to_string()));
        }

        let unified = trimmed.replace('\\', "/");
        let segments: Vec<&str> = unified
            .split('/')
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .collect();

        if segments.is_empty() {
            return Err(ViewerError::InvalidAssetId(raw.to_string()));
        }

        Ok(Self(format!("/{}", segments.join("/"))))
    }

    /// The canonical string form
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this identifier is a full URL rather than an asset path
    pub fn is_url(&self) -> bool {
        self.0.contains("://")
    }

    /// Path relative to the asset root (no leading slash)
    pub fn relative_path(&self) -> &str {
        self.0.trim_start_matches('/')
    }

    /// Last path segment
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AssetId {
    type Err = ViewerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AssetId {
    type Error = ViewerError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<AssetId> for String {
    fn from(id: AssetId) -> Self {
        id.0
    }
}

impl AsRef<str> for AssetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Ordered list of every prefetchable model.
///
/// Order defines adjacency for prefetch priority. Duplicates are dropped,
/// keeping the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<AssetId>,
}

impl Catalog {
    /// Build a catalog from already-parsed identifiers
    pub fn new(ids: impl IntoIterator<Item = AssetId>) -> Self {
        let mut entries: Vec<AssetId> = Vec::new();
        for id in ids {
            if !entries.contains(&id) {
                entries.push(id);
            }
        }
        Self { entries }
    }

    /// Parse a catalog from raw path strings
    pub fn parse<I, S>(raw: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids = raw
            .into_iter()
            .map(|s| AssetId::parse(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(ids))
    }

    /// The built-in product line
    pub fn product_line() -> Self {
        Self::new(PRODUCT_LINE.iter().map(|path| AssetId((*path).to_string())))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&AssetId> {
        self.entries.get(index)
    }

    /// Index of `id` in catalog order
    pub fn position(&self, id: &AssetId) -> Option<usize> {
        self.entries.iter().position(|entry| entry == id)
    }

    pub fn contains(&self, id: &AssetId) -> bool {
        self.entries.contains(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AssetId> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[AssetId] {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a AssetId;
    type IntoIter = std::slice::Iter<'a, AssetId>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
