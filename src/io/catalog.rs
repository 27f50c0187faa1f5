use std::io::{Read, Write};

use super::{Error, Format};
use crate::forge::Catalog;

pub fn read_catalog<R: Read>(mut reader: R, format: Format) -> Result<Catalog, Error> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;

    match format {
        Format::Toml => toml::from_str(&content).map_err(|e| Error::parse(format, e.to_string())),
        Format::Json => {
            serde_json::from_str(&content).map_err(|e| Error::parse(format, e.to_string()))
        }
    }
}

pub fn write_catalog<W: Write>(mut writer: W, catalog: &Catalog, format: Format) -> Result<(), Error> {
    let content = match format {
        Format::Toml => {
            toml::to_string_pretty(catalog).map_err(|e| Error::serialize(format, e.to_string()))?
        }
        Format::Json => serde_json::to_string_pretty(catalog)
            .map_err(|e| Error::serialize(format, e.to_string()))?,
    };
    writer.write_all(content.as_bytes())?;
    Ok(())
}
