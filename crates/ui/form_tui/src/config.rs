use color_eyre::Result;
use directories::ProjectDirs;
use lazy_static::lazy_static;
use serde::Deserialize;
use std::fs;
use std::{
    env,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub config_dir: PathBuf,
}

/// Settings of the sign-up page.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct FormConfig {
    /// Title of the form container.
    #[serde(default = "default_title")]
    pub title: String,
    /// How long a submission stays pending before the flag is reset.
    #[serde(default = "default_submit_latency_ms")]
    pub submit_latency_ms: u64,
    /// Submitted values are appended here as JSON lines.
    #[serde(default)]
    pub output_file: Option<PathBuf>,
}

fn default_title() -> String {
    "Sign up".to_string()
}

fn default_submit_latency_ms() -> u64 {
    800
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            submit_latency_ms: default_submit_latency_ms(),
            output_file: None,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    #[serde(default)]
    pub form: FormConfig,
}

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref DATA_FOLDER: Option<PathBuf> =
        env::var(format!("{}_DATA", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
    pub static ref LOG_ENV: String = format!("{}_LOGLEVEL", PROJECT_NAME.clone());
    pub static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

impl Config {
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::load(&get_data_dir(), &get_config_dir())
    }

    /// Build the configuration from the files found in `config_dir`.
    pub fn load(data_dir: &Path, config_dir: &Path) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.display().to_string())?
            .set_default("config_dir", config_dir.display().to_string())?;

        let config_files = [
            ("config.json5", config::FileFormat::Json5),
            ("config.toml", config::FileFormat::Toml),
        ];
        let mut found_config = false;
        for (file, format) in &config_files {
            let source = config::File::from(config_dir.join(file))
                .format(*format)
                .required(false);
            builder = builder.add_source(source);
            if config_dir.join(file).exists() {
                found_config = true
            }
        }
        if !found_config {
            warn!("No configuration file found, using defaults");
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        debug!(?cfg, "configuration loaded");

        Ok(cfg)
    }
}

pub fn get_data_dir() -> PathBuf {
    if let Some(s) = DATA_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Some(s) = CONFIG_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "forms", env!("CARGO_PKG_NAME"))
}

pub fn ensure_data_and_config_dirs_exist() -> std::io::Result<()> {
    let data_dir = get_data_dir();
    let config_dir = get_config_dir();

    if !data_dir.exists() {
        fs::create_dir_all(&data_dir)?;
    }
    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("form_tui-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn defaults_without_config_file() {
        let dir = scratch_dir("defaults");
        let cfg = Config::load(&dir, &dir).unwrap();

        assert_eq!(cfg.form, FormConfig::default());
        assert_eq!(cfg.form.title, "Sign up");
        assert_eq!(cfg.form.submit_latency_ms, 800);
        assert_eq!(cfg.config.config_dir, dir);
    }

    #[test]
    fn toml_overrides_form_section() {
        let dir = scratch_dir("toml");
        fs::write(
            dir.join("config.toml"),
            "[form]\ntitle = \"Join\"\nsubmit_latency_ms = 0\noutput_file = \"out.jsonl\"\n",
        )
        .unwrap();

        let cfg = Config::load(&dir, &dir).unwrap();

        assert_eq!(
            cfg.form,
            FormConfig {
                title: "Join".into(),
                submit_latency_ms: 0,
                output_file: Some(PathBuf::from("out.jsonl")),
            }
        );
    }

    #[test]
    fn json5_is_read_too() {
        let dir = scratch_dir("json5");
        fs::write(dir.join("config.json5"), "{ form: { title: 'Hello', } }").unwrap();

        let cfg = Config::load(&dir, &dir).unwrap();

        assert_eq!(cfg.form.title, "Hello");
        assert_eq!(cfg.form.submit_latency_ms, 800);
    }
}
