use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    metrics: HashMap<String, String>,
    parts: HashMap<String, PartsEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PartsEntry {
    Path(String),
    Detailed { path: String, locale: String },
}

impl PartsEntry {
    fn as_path(&self) -> &str {
        match self {
            PartsEntry::Path(path) => path,
            PartsEntry::Detailed { path, .. } => path,
        }
    }

    fn locale(&self) -> Option<&str> {
        match self {
            PartsEntry::Path(_) => None,
            PartsEntry::Detailed { locale, .. } => Some(locale),
        }
    }
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

/// Glyph width tables captured from real fonts.
pub mod metrics {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.metrics.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.metrics, "metrics", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.metrics, "metrics", name)?;
        super::load_json(rel)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.metrics, "metrics", name)?;
        Ok(resolve_path(rel))
    }
}

/// Recorded `formatToParts` output per locale.
pub mod parts {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.parts.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.parts, "parts", name)?;
        read_to_string(entry.as_path())
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let entry = lookup(&MANIFEST.parts, "parts", name)?;
        super::load_json(entry.as_path())
    }

    pub fn locale(name: &str) -> Result<Option<String>> {
        let entry = lookup(&MANIFEST.parts, "parts", name)?;
        Ok(entry.locale().map(str::to_string))
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let entry = lookup(&MANIFEST.parts, "parts", name)?;
        Ok(resolve_path(entry.as_path()))
    }
}
