//! Configuration file loading for docfix.
//!
//! Discovers and loads `docfix.toml` from the working root.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use docfix_core::adapters::DEFAULT_VERSION_FIELD;
use docfix_core::settings::{MigrateSettings, OutputMode};
use docfix_schema::DataVersion;
use fs_err as fs;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "docfix.toml";

/// Top-level configuration from docfix.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DocfixConfig {
    /// Defaults for `docfix migrate`.
    pub migrate: MigrateConfig,
}

/// Migrate section of the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MigrateConfig {
    /// Reference every document is typed as.
    pub reference: Option<String>,

    /// Field holding the stored version.
    pub version_field: String,

    /// Version assumed for documents without a version field.
    pub default_version: Option<VersionValue>,

    /// Stop at this version instead of the newest.
    pub target_version: Option<VersionValue>,

    /// Write the resulting version back into each document.
    pub stamp_version: bool,

    /// Pretty-print migrated JSON.
    pub pretty: bool,

    /// Worker threads.
    pub jobs: Option<usize>,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            reference: None,
            version_field: DEFAULT_VERSION_FIELD.to_string(),
            default_version: None,
            target_version: None,
            stamp_version: true,
            pretty: true,
            jobs: None,
        }
    }
}

/// A version as written in TOML: `12` or `"12.1"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum VersionValue {
    Whole(u32),
    Text(String),
}

impl VersionValue {
    pub fn resolve(&self) -> anyhow::Result<DataVersion> {
        match self {
            VersionValue::Whole(v) => Ok(DataVersion::from(*v)),
            VersionValue::Text(s) => Ok(s.parse::<DataVersion>()?),
        }
    }
}

/// Discover the docfix.toml config file.
///
/// Searches for `docfix.toml` in the given root directory.
/// Returns `None` if no config file is found.
pub fn discover_config(root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a docfix.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<DocfixConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<DocfixConfig> {
    let config: DocfixConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from the root, or return default if not found.
pub fn load_or_default(root: &Utf8Path) -> anyhow::Result<DocfixConfig> {
    match discover_config(root) {
        Some(path) => load_config(&path),
        None => Ok(DocfixConfig::default()),
    }
}

/// Migrate options given on the command line. `None` / `false` means "not given".
#[derive(Debug, Clone, Default)]
pub struct MigrateOverrides {
    pub reference: Option<String>,
    pub version_field: Option<String>,
    pub default_version: Option<DataVersion>,
    pub from_version: Option<DataVersion>,
    pub target_version: Option<DataVersion>,
    pub out_dir: Option<Utf8PathBuf>,
    pub write: bool,
    pub no_stamp: bool,
    pub compact: bool,
    pub jobs: Option<usize>,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: DocfixConfig,
}

impl ConfigMerger {
    /// Create a new merger from a loaded config.
    pub fn new(config: DocfixConfig) -> Self {
        Self { config }
    }

    /// Merge with migrate command CLI arguments.
    ///
    /// Values given on the command line replace config values; `--no-stamp` and
    /// `--compact` switch off what the config enables.
    pub fn merge_migrate_args(self, cli: MigrateOverrides) -> anyhow::Result<MigrateSettings> {
        let file = self.config.migrate;

        let Some(reference) = cli.reference.or(file.reference) else {
            anyhow::bail!(
                "no reference given: pass --reference or set `migrate.reference` in {}",
                CONFIG_FILE_NAME
            );
        };
        if cli.write && cli.out_dir.is_some() {
            anyhow::bail!("--write and --out-dir are mutually exclusive");
        }

        let default_version = match cli.default_version {
            Some(v) => Some(v),
            None => file
                .default_version
                .as_ref()
                .map(VersionValue::resolve)
                .transpose()
                .context("migrate.default_version")?,
        };
        let target_version = match cli.target_version {
            Some(v) => Some(v),
            None => file
                .target_version
                .as_ref()
                .map(VersionValue::resolve)
                .transpose()
                .context("migrate.target_version")?,
        };

        let output = match (cli.write, cli.out_dir) {
            (true, _) => OutputMode::InPlace,
            (false, Some(dir)) => OutputMode::Directory(dir),
            (false, None) => OutputMode::DryRun,
        };

        Ok(MigrateSettings {
            reference,
            version_field: cli.version_field.unwrap_or(file.version_field),
            default_version,
            from_version: cli.from_version,
            target_version,
            stamp_version: file.stamp_version && !cli.no_stamp,
            output,
            pretty: file.pretty && !cli.compact,
            jobs: cli.jobs.or(file.jobs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.migrate.version_field, "DataVersion");
        assert!(config.migrate.stamp_version);
        assert!(config.migrate.reference.is_none());
    }

    #[test]
    fn versions_accept_ints_and_strings() {
        let config = parse_config(
            r#"
[migrate]
reference = "entity"
default_version = 10
target_version = "12.1"
"#,
        )
        .unwrap();
        assert_eq!(
            config.migrate.default_version.unwrap().resolve().unwrap(),
            DataVersion::from(10u32)
        );
        assert_eq!(
            config.migrate.target_version.unwrap().resolve().unwrap(),
            DataVersion::new(12, 1)
        );
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(parse_config("[migrate\nreference = 1").is_err());
    }

    #[test]
    fn cli_wins_over_config() {
        let config = parse_config(
            r#"
[migrate]
reference = "player"
version_field = "v"
jobs = 8
pretty = true
"#,
        )
        .unwrap();
        let settings = ConfigMerger::new(config)
            .merge_migrate_args(MigrateOverrides {
                reference: Some("entity".to_string()),
                jobs: Some(2),
                compact: true,
                no_stamp: true,
                ..MigrateOverrides::default()
            })
            .unwrap();
        assert_eq!(settings.reference, "entity");
        assert_eq!(settings.version_field, "v");
        assert_eq!(settings.jobs, Some(2));
        assert!(!settings.pretty);
        assert!(!settings.stamp_version);
        assert_eq!(settings.output, OutputMode::DryRun);
    }

    #[test]
    fn missing_reference_is_reported() {
        let err = ConfigMerger::new(DocfixConfig::default())
            .merge_migrate_args(MigrateOverrides::default())
            .unwrap_err();
        assert!(err.to_string().contains("--reference"));
    }

    #[test]
    fn write_and_out_dir_conflict() {
        let err = ConfigMerger::new(DocfixConfig::default())
            .merge_migrate_args(MigrateOverrides {
                reference: Some("entity".to_string()),
                write: true,
                out_dir: Some(Utf8PathBuf::from("out")),
                ..MigrateOverrides::default()
            })
            .unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"));
    }

    #[test]
    fn load_or_default_reads_the_root() {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap();
        assert!(load_or_default(&root).unwrap().migrate.reference.is_none());

        std::fs::write(root.join(CONFIG_FILE_NAME), "[migrate]\nreference = \"entity\"\n").unwrap();
        assert_eq!(
            load_or_default(&root).unwrap().migrate.reference.as_deref(),
            Some("entity")
        );
    }
}
