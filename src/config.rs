use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StorefrontConfig {
    pub database: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("storefront.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from("database.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<StorefrontConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: StorefrontConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &StorefrontConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Store location: explicit flag, then config file, then `database.db`.
pub fn resolve_database_path(flag: Option<PathBuf>, config: Option<&StorefrontConfig>) -> PathBuf {
    flag.or_else(|| config.and_then(|c| c.database.as_ref().map(PathBuf::from)))
        .unwrap_or_else(default_database_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storefront.toml");
        let config = StorefrontConfig {
            database: Some("data/shop.db".into()),
        };

        write_config(&path, &config, false).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap(), Some(config.clone()));

        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &StorefrontConfig::default(), true).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap(), Some(StorefrontConfig::default()));
    }

    #[test]
    fn test_database_path_precedence() {
        let config = StorefrontConfig {
            database: Some("from-config.db".into()),
        };

        assert_eq!(
            resolve_database_path(Some("flag.db".into()), Some(&config)),
            PathBuf::from("flag.db")
        );
        assert_eq!(resolve_database_path(None, Some(&config)), PathBuf::from("from-config.db"));
        assert_eq!(resolve_database_path(None, None), default_database_path());
    }
}
