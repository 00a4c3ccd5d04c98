use std::path::PathBuf;

use figment::providers::{Data, Format as _, Json, Toml, Yaml};
use figment::Figment;
use hexcrc::ChecksumOptions;
use serde::{Deserialize, Serialize};

use crate::util::logging::LevelFilter;

/// Settings read from `.hexcrc.{toml,json,yaml}`.
///
/// Command line flags take precedence over these values.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(flatten)]
    pub checksum: ChecksumOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LevelFilter>,
}

/// Loads the configuration from the working directory and the home directory.
///
/// Files in the home directory override those in the working directory.
pub fn load_config() -> anyhow::Result<Config> {
    // Paths to search for the configuration file.
    let mut paths = vec![PathBuf::from(".")];
    if let Some(home) = directories::UserDirs::new().map(|user| user.home_dir().to_path_buf()) {
        paths.push(home);
    }

    load_config_from(&paths)
}

pub fn load_config_from(paths: &[PathBuf]) -> anyhow::Result<Config> {
    // Files to search for, without extension.
    let files = [".hexcrc"];

    let default_config = serde_json::to_string_pretty(&Config::default())?;
    let mut figment = Figment::from(Data::<Json>::string(&default_config));
    for path in paths {
        for file in files {
            figment = figment
                .merge(Toml::file(path.join(format!("{file}.toml"))))
                .merge(Json::file(path.join(format!("{file}.json"))))
                .merge(Yaml::file(path.join(format!("{file}.yaml"))))
                .merge(Yaml::file(path.join(format!("{file}.yml"))));
        }
    }

    let config = figment.extract::<Config>()?;

    Ok(config)
}
