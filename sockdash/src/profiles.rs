//! Connection profiles: load/save a JSON mapping of profile name -> { url }.
//! Stored under $XDG_CONFIG_HOME/sockdash/profiles.json (fallback ~/.config/sockdash/profiles.json)

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, io, path::PathBuf};

/// Fallback endpoint when neither a URL nor a profile is given.
pub const URL_ENV: &str = "SOCKDASH_WS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProfileEntry {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfilesFile {
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileEntry>,
    #[serde(default)]
    pub version: u32,
}

pub fn config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(xdg).join("sockdash")
    } else {
        dirs_next::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sockdash")
    }
}

pub fn profiles_path() -> PathBuf {
    config_dir().join("profiles.json")
}

// Missing or unreadable file means "no profiles".
pub fn load_profiles() -> ProfilesFile {
    match fs::read_to_string(profiles_path()) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_default(),
        Err(_) => ProfilesFile::default(),
    }
}

pub fn save_profiles(p: &ProfilesFile) -> io::Result<()> {
    let path = profiles_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_vec_pretty(p).map_err(io::Error::other)?;
    fs::write(path, data)
}

/// Accept only ws:// and wss:// endpoints.
pub fn validate_url(raw: &str) -> Result<url::Url, String> {
    let u = url::Url::parse(raw.trim()).map_err(|e| format!("invalid URL '{raw}': {e}"))?;
    match u.scheme() {
        "ws" | "wss" => Ok(u),
        other => Err(format!(
            "unsupported scheme '{other}' in '{raw}' (expected ws:// or wss://)"
        )),
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ResolveProfile {
    /// Use the provided URL (caller may persist it under the profile name)
    Direct(String),
    /// Loaded from an existing profile entry
    Loaded(String),
    /// Taken from the SOCKDASH_WS environment variable
    Env(String),
    /// Should prompt user to select among profile names
    PromptSelect(Vec<String>),
    /// Should prompt user to create a new profile (name)
    PromptCreate(String),
    /// Nothing to connect to
    None,
}

pub struct ProfileRequest {
    pub profile_name: Option<String>,
    pub url: Option<String>,
    pub env_url: Option<String>,
}

impl ProfileRequest {
    pub fn resolve(self, pf: &ProfilesFile) -> ResolveProfile {
        if let Some(u) = self.url {
            return ResolveProfile::Direct(u);
        }
        if let Some(name) = self.profile_name {
            return match pf.profiles.get(&name) {
                Some(entry) => ResolveProfile::Loaded(entry.url.clone()),
                None => ResolveProfile::PromptCreate(name),
            };
        }
        if let Some(u) = self.env_url.filter(|u| !u.trim().is_empty()) {
            return ResolveProfile::Env(u);
        }
        if pf.profiles.is_empty() {
            ResolveProfile::None
        } else {
            ResolveProfile::PromptSelect(pf.profiles.keys().cloned().collect())
        }
    }
}
