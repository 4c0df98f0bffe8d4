//! Where a network comes from: a built-in network or a snapshot file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use gridframe::Network;
use gridframe_engine::{fixtures, MemoryEngine};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkSource {
    Builtin(String),
    Snapshot(PathBuf),
}

impl NetworkSource {
    /// Built-in names take precedence over files of the same name.
    pub fn parse(raw: &str) -> Self {
        if fixtures::FIXTURES.iter().any(|name| *name == raw) {
            NetworkSource::Builtin(raw.to_string())
        } else {
            NetworkSource::Snapshot(PathBuf::from(raw))
        }
    }

    pub fn open(&self, engine: Arc<MemoryEngine>) -> Result<Network<MemoryEngine>> {
        match self {
            NetworkSource::Builtin(name) => {
                let handle = fixtures::by_name(&engine, name)
                    .ok_or_else(|| anyhow!("unknown built-in network '{}'", name))??;
                info!(network = %name, "built-in network created");
                Ok(Network::from_handle(engine, handle))
            }
            NetworkSource::Snapshot(path) => {
                if !path.exists() {
                    bail!(
                        "'{}' is neither a built-in network ({}) nor an existing snapshot file",
                        path.display(),
                        fixtures::FIXTURES.join(", ")
                    );
                }
                let snapshot = fs::read_to_string(path)
                    .with_context(|| format!("reading snapshot {}", path.display()))?;
                let network = Network::load_from_str(engine, &snapshot)
                    .with_context(|| format!("loading snapshot {}", path.display()))?;
                info!(path = %path.display(), "snapshot loaded");
                Ok(network)
            }
        }
    }
}

impl fmt::Display for NetworkSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkSource::Builtin(name) => f.write_str(name),
            NetworkSource::Snapshot(path) => write!(f, "{}", path.display()),
        }
    }
}

pub fn save_snapshot(network: &Network<MemoryEngine>, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let snapshot = network.dump_to_string()?;
    fs::write(path, snapshot).with_context(|| format!("writing snapshot {}", path.display()))?;
    info!(path = %path.display(), "snapshot written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn builtin_names_are_recognised() {
        assert_eq!(
            NetworkSource::parse("dangling_line"),
            NetworkSource::Builtin("dangling_line".into())
        );
        assert_eq!(
            NetworkSource::parse("case.json"),
            NetworkSource::Snapshot(PathBuf::from("case.json"))
        );
    }

    #[test]
    fn snapshot_round_trip_through_a_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("case.json");

        let engine = Arc::new(MemoryEngine::new());
        let network = NetworkSource::parse("eurostag_example")
            .open(Arc::clone(&engine))
            .unwrap();
        save_snapshot(&network, &path).unwrap();

        let reopened = NetworkSource::Snapshot(path).open(engine).unwrap();
        assert_eq!(reopened.metadata().unwrap().id, "sim1");
    }

    #[test]
    fn missing_file_names_the_builtins() {
        let engine = Arc::new(MemoryEngine::new());
        let err = NetworkSource::parse("nowhere.json").open(engine).unwrap_err();
        assert!(err.to_string().contains("four_substations"));
    }
}
