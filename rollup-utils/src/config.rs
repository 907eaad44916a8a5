use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
#[error("config error {0}: {1}")]
pub struct ConfigError(PathBuf, #[source] Box<dyn std::error::Error + Send + Sync>);

impl ConfigError {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// Read and deserialise a TOML file.
pub async fn read_toml<T, P>(path: P) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let s = tokio::fs::read_to_string(path.as_ref())
        .await
        .map_err(|e| ConfigError(path.as_ref().into(), Box::new(e)))?;
    toml::from_str(&s).map_err(|e| ConfigError(path.as_ref().into(), Box::new(e)))
}

/// Serialise a value and write it as a TOML file.
pub async fn write_toml<T, P>(val: &T, path: P) -> Result<(), ConfigError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let s =
        toml::to_string_pretty(val).map_err(|e| ConfigError(path.as_ref().into(), Box::new(e)))?;
    tokio::fs::write(path.as_ref(), s)
        .await
        .map_err(|e| ConfigError(path.as_ref().into(), Box::new(e)))
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::{read_toml, write_toml};

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case")]
    struct Sample {
        closed_slots: u64,
        label: String,
    }

    #[tokio::test]
    async fn toml_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("rollup-utils-{}.toml", std::process::id()));
        let s = Sample {
            closed_slots: 2,
            label: "auction".into(),
        };
        write_toml(&s, &path).await.unwrap();
        let t: Sample = read_toml(&path).await.unwrap();
        assert_eq!(s, t);
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn missing_file_names_path() {
        let path = std::env::temp_dir().join("rollup-utils-does-not-exist.toml");
        let err = read_toml::<Sample, _>(&path).await.unwrap_err();
        assert_eq!(err.path(), path.as_path());
    }
}
