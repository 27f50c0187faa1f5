//! Reading catalogs and writing compiled station tables.
//!
//! Both directions support TOML and JSON; [`Format::from_path`] picks one by
//! file extension.

use std::fmt;
use std::path::Path;

pub mod catalog;
pub mod error;
pub mod stations;

pub use catalog::{read_catalog, write_catalog};
pub use error::Error;
pub use stations::{RecipeRecord, StationRecord, StationTableRecord, write_stations};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Toml,
    Json,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("toml") => Ok(Format::Toml),
            Some("json") => Ok(Format::Json),
            _ => Err(Error::UnknownFormat(path.display().to_string())),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Format::Toml => "toml",
            Format::Json => "json",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Toml => write!(f, "TOML"),
            Format::Json => write!(f, "JSON"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_is_inferred_from_extension() {
        assert_eq!(Format::from_path(Path::new("lab.toml")).unwrap(), Format::Toml);
        assert_eq!(Format::from_path(Path::new("out/STATIONS.JSON")).unwrap(), Format::Json);
        assert!(matches!(
            Format::from_path(Path::new("catalog.yaml")),
            Err(Error::UnknownFormat(_))
        ));
    }
}
