//! I/O 支持：以 JSON、RON 或 TOML 读写网描述，格式由扩展名决定。
use std::fs;
use std::path::{Path, PathBuf};

use ron::ser::PrettyConfig;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::net::spec::NetSpec;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ron error: {0}")]
    Ron(#[from] ron::Error),
    #[error("ron parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),
    #[error("toml parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::ser::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot tell the format of {0:?}; expected .json, .ron or .toml")]
    UnknownFormat(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Ron,
    Toml,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("ron") => Ok(Format::Ron),
            Some("toml") => Ok(Format::Toml),
            _ => Err(IoError::UnknownFormat(path.to_path_buf())),
        }
    }
}

pub fn to_string<T>(value: &T, format: Format) -> Result<String, IoError>
where
    T: Serialize,
{
    Ok(match format {
        Format::Json => serde_json::to_string_pretty(value)?,
        Format::Ron => {
            let mut pretty = PrettyConfig::default();
            pretty.new_line = "\n".into();
            ron::ser::to_string_pretty(value, pretty)?
        }
        Format::Toml => toml::to_string_pretty(value)?,
    })
}

pub fn from_str<T>(s: &str, format: Format) -> Result<T, IoError>
where
    T: DeserializeOwned,
{
    Ok(match format {
        Format::Json => serde_json::from_str(s)?,
        Format::Ron => ron::from_str(s)?,
        Format::Toml => toml::from_str(s)?,
    })
}

pub fn read_spec<P: AsRef<Path>>(path: P) -> Result<NetSpec, IoError> {
    let path = path.as_ref();
    let format = Format::from_path(path)?;
    let content = fs::read_to_string(path)?;
    from_str(&content, format)
}

pub fn write_spec<P: AsRef<Path>>(path: P, spec: &NetSpec) -> Result<(), IoError> {
    let path = path.as_ref();
    let format = Format::from_path(path)?;
    fs::write(path, to_string(spec, format)?)?;
    Ok(())
}
