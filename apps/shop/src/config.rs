use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_CONFIG_FILE: &str = "shop.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: Url,
    pub session_file: PathBuf,
    pub auto_logout_on_auth_error: bool,
}

/// Values given on the command line; they win over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub session_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_url: Option<String>,
    session_file: Option<PathBuf>,
    auto_logout_on_auth_error: Option<bool>,
}

pub fn load_settings(overrides: Overrides) -> Result<Settings> {
    let (path, explicit) = match env::var("SHOP_CONFIG") {
        Ok(path) => (PathBuf::from(path), true),
        Err(_) => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    let raw = read_config_file(&path, explicit)?;
    resolve(
        raw.as_deref(),
        |key| env::var(key).ok(),
        overrides,
        dirs::data_local_dir(),
    )
}

/// A missing `shop.toml` is fine; a missing file named by `SHOP_CONFIG` is not.
fn read_config_file(path: &Path, explicit: bool) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(err) if !explicit && err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err)
            .with_context(|| format!("failed to read config file '{}'", path.display())),
    }
}

/// Layers defaults, file contents, environment and flags, in that order.
fn resolve(
    raw: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
    overrides: Overrides,
    data_dir: Option<PathBuf>,
) -> Result<Settings> {
    let file_cfg = match raw {
        Some(raw) => toml::from_str::<FileSettings>(raw).context("invalid config file")?,
        None => FileSettings::default(),
    };

    let mut api_url = file_cfg
        .api_url
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let mut session_file = file_cfg.session_file;
    let mut auto_logout = file_cfg.auto_logout_on_auth_error.unwrap_or(false);

    if let Some(v) = env("SHOP_API_URL") {
        api_url = v;
    }
    if let Some(v) = env("APP__API_URL") {
        api_url = v;
    }

    if let Some(v) = env("SHOP_SESSION_FILE") {
        session_file = Some(PathBuf::from(v));
    }
    if let Some(v) = env("APP__SESSION_FILE") {
        session_file = Some(PathBuf::from(v));
    }

    if let Some(v) = env("APP__AUTO_LOGOUT_ON_AUTH_ERROR") {
        auto_logout = parse_flag(&v).context("invalid APP__AUTO_LOGOUT_ON_AUTH_ERROR")?;
    }

    if let Some(v) = overrides.api_url {
        api_url = v;
    }
    if let Some(v) = overrides.session_file {
        session_file = Some(v);
    }

    let session_file = match session_file {
        Some(path) => path,
        None => default_session_file(data_dir)?,
    };

    Ok(Settings {
        api_url: parse_api_url(&api_url)?,
        session_file,
        auto_logout_on_auth_error: auto_logout,
    })
}

fn default_session_file(data_dir: Option<PathBuf>) -> Result<PathBuf> {
    let base = data_dir.ok_or_else(|| {
        anyhow!("unable to resolve local app data dir; pass --session-file")
    })?;
    Ok(base.join("storefront").join("session.json"))
}

pub fn parse_api_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let url = Url::parse(raw).with_context(|| format!("invalid api url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("api url '{raw}' must use http or https");
    }
    Ok(url)
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("expected a boolean, got '{other}'"),
    }
}
