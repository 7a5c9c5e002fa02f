pub mod check;
pub mod generate;
pub mod sample;

use std::error::Error;
use std::fs;
use std::path::Path;

use dimer_core::{ErrorInfo, TilingError};
use dimer_graph::RegionSpec;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, TilingError> {
    let contents = fs::read_to_string(path).map_err(|err| {
        TilingError::Serde(ErrorInfo::new("read", err.to_string()).with_context("path", path.display()))
    })?;
    serde_json::from_str(&contents).map_err(|err| {
        TilingError::Serde(
            ErrorInfo::new("json_deserialize", err.to_string()).with_context("path", path.display()),
        )
    })
}

pub(crate) fn read_region(path: &Path) -> Result<RegionSpec, TilingError> {
    read_json(path)
}

/// Writes pretty JSON to `path`, or to stdout when no path is given.
pub(crate) fn emit_json<T: Serialize>(path: Option<&Path>, value: &T) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, json)?;
        }
        None => println!("{json}"),
    }
    Ok(())
}
