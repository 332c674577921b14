use crate::core::ent::{DisplayConfig, NodeConfig};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::ffi::OsString;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failure read file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failure parse file {path}: {source}")]
    Parse { path: PathBuf, source: serde_yaml::Error },
    #[error("{key} must be a number, got {value:?}")]
    InvalidNumber { key: String, value: String },
    #[error("invalid listen address {0:?}")]
    InvalidAddr(String),
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Profiles {
    pub active: String,
}

// 用来接收application.yml解析结果
#[derive(Serialize, Deserialize, Debug)]
pub struct EnvConfig {
    pub profiles: Profiles,
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct Bootstrap {
    pub server: Server,
    pub dashboard: Dashboard,
    pub nodes: Vec<NodeConfig>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(default)]
pub struct Server {
    pub addr: String,
}

impl Default for Server {
    fn default() -> Self {
        Server {
            addr: "0.0.0.0:3000".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(default)]
pub struct Dashboard {
    /// milliseconds
    pub refresh_interval: u64,
    pub site_title: String,
}

impl Default for Dashboard {
    fn default() -> Self {
        let display = DisplayConfig::default();
        Dashboard {
            refresh_interval: display.refresh_interval_millis,
            site_title: display.site_title,
        }
    }
}

/// Everything the server needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub addr: SocketAddr,
    pub nodes: Vec<NodeConfig>,
    pub display: DisplayConfig,
}

// 加载指定配置文件
fn load_config<T>(path: &Path) -> Result<Option<T>, ConfigError>
where
    T: DeserializeOwned,
{
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_yaml::from_str::<T>(&text)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

// application.yml 指定的环境决定加载哪个 application-{}.yml
pub fn load_bootstrap_config(path: &Path) -> Result<Bootstrap, ConfigError> {
    let Some(env_config) = load_config::<EnvConfig>(path)? else {
        info!("{} not found, using defaults", path.display());
        return Ok(Bootstrap::default());
    };
    let profile = path.with_file_name(format!("application-{}.yml", env_config.profiles.active));
    match load_config::<Bootstrap>(&profile)? {
        Some(bootstrap) => {
            info!("loaded profile {}", profile.display());
            Ok(bootstrap)
        }
        None => Err(ConfigError::Read {
            path: profile,
            source: io::Error::new(io::ErrorKind::NotFound, "active profile file missing"),
        }),
    }
}

/// Loads the YAML profile at `path`, then applies the process environment.
pub fn load_app_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let bootstrap = load_bootstrap_config(path)?;
    resolve(bootstrap, unicode_vars(std::env::vars_os()))
}

/// Drops environment entries whose key or value is not valid Unicode.
pub fn unicode_vars<I>(vars: I) -> impl Iterator<Item = (String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter().filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
        (Ok(key), Ok(value)) => Some((key, value)),
        (key, _) => {
            let key = match key {
                Ok(key) => key,
                Err(key) => key.to_string_lossy().into_owned(),
            };
            warn!("ignoring non-unicode environment variable {}", key);
            None
        }
    })
}

/// Applies environment overrides on top of `bootstrap`.
///
/// `PORT`, `REFRESH_INTERVAL` and `SITE_TITLE` replace file settings. Every
/// `<NET>_NODES` variable adds `name|url[|network]` entries to network `<net>`,
/// and the legacy `NODES` variable adds `name|url|network` entries.
pub fn resolve<I>(bootstrap: Bootstrap, vars: I) -> Result<AppConfig, ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut vars: Vec<(String, String)> = vars.into_iter().collect();
    vars.sort();
    let var = |key: &str| vars.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str());

    let mut addr: SocketAddr = bootstrap
        .server
        .addr
        .parse()
        .map_err(|_| ConfigError::InvalidAddr(bootstrap.server.addr.clone()))?;
    if let Some(port) = var("PORT") {
        addr.set_port(parse_number("PORT", port)?);
    }

    let mut display = DisplayConfig {
        refresh_interval_millis: bootstrap.dashboard.refresh_interval,
        site_title: bootstrap.dashboard.site_title,
    };
    if let Some(interval) = var("REFRESH_INTERVAL") {
        display.refresh_interval_millis = parse_number("REFRESH_INTERVAL", interval)?;
    }
    if let Some(title) = var("SITE_TITLE") {
        display.site_title = title.to_string();
    }

    let mut nodes = bootstrap.nodes;
    for (key, value) in &vars {
        if let Some(network) = key.strip_suffix("_NODES") {
            nodes.extend(parse_node_list(key, value, Some(&network.to_lowercase())));
        }
    }
    if let Some(value) = var("NODES") {
        nodes.extend(parse_node_list("NODES", value, None));
    }

    Ok(AppConfig { addr, nodes, display })
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Parses a comma separated node list. Malformed entries are logged and skipped.
pub fn parse_node_list(key: &str, value: &str, default_network: Option<&str>) -> Vec<NodeConfig> {
    value
        .split(',')
        .filter(|entry| !entry.trim().is_empty())
        .filter_map(|entry| {
            let node = parse_node_entry(entry, default_network);
            if node.is_none() {
                warn!("{}: invalid node configuration: {}", key, entry);
            }
            node
        })
        .collect()
}

fn parse_node_entry(entry: &str, default_network: Option<&str>) -> Option<NodeConfig> {
    let parts: Vec<&str> = entry.split('|').map(str::trim).collect();
    let (name, url, network) = match (parts.as_slice(), default_network) {
        ([name, url, network], _) => (*name, *url, *network),
        ([name, url], Some(network)) => (*name, *url, network),
        _ => return None,
    };
    if name.is_empty() || url.is_empty() || network.is_empty() {
        return None;
    }
    Some(NodeConfig {
        name: name.to_string(),
        url: url.to_string(),
        network: network.to_string(),
    })
}
