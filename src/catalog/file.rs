//! Catalog files: JSON descriptions of connectors that extend the built-in
//! catalog (custom connectors, or schemas exported from the platform).
//!
//! ```json
//! {
//!   "providers": [
//!     {
//!       "name": "acme",
//!       "exhaustive": false,
//!       "requires_connection": true,
//!       "operations": [
//!         {
//!           "name": "create_widget",
//!           "keyword": "action",
//!           "fields": [{ "name": "title", "kind": "string", "required": true }]
//!         }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ProviderSchema, SchemaCatalog};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    pub providers: Vec<ProviderSchema>,
}

impl SchemaCatalog {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::decode(json, "<inline>")
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::decode(&content, &path.display().to_string())
    }

    /// Built-in catalog extended with each file, in order; later files win.
    pub fn builtin_with_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut catalog = Self::builtin();
        for path in paths {
            let extra = Self::load_file(path.as_ref())?;
            tracing::debug!(
                path = %path.as_ref().display(),
                providers = extra.len(),
                "merged catalog file"
            );
            catalog.merge(extra);
        }
        Ok(catalog)
    }

    fn decode(json: &str, origin: &str) -> Result<Self> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|e| Error::catalog(origin, e.to_string()))?;

        let mut catalog = SchemaCatalog::empty();
        for provider in file.providers {
            if provider.name.trim().is_empty() {
                return Err(Error::catalog(origin, "provider with empty name"));
            }
            catalog.insert(provider);
        }
        Ok(catalog)
    }

    pub fn to_file(&self) -> CatalogFile {
        CatalogFile {
            providers: self.providers().cloned().collect(),
        }
    }
}
