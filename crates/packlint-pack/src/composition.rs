//! # Package-Tree Composition
//!
//! Scans a package tree from disk and models the layered merge that the
//! firmware build tool performs at configuration time: shared packages act
//! as defaults, later layers override earlier ones. The merge here is
//! explicit and immutable — built once per firmware file, used by the
//! cross-file rules, then dropped.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use packlint_core::Layer;

use crate::error::{PackError, PackResult};
use crate::model::PackageFile;

/// The secrets file is where credentials belong; it is never linted.
const SECRETS_FILE: &str = "secrets.yaml";

/// A file that could not be parsed, kept so the checker can report it.
#[derive(Debug, Clone)]
pub struct MalformedFile {
    /// Path relative to the tree root.
    pub path: PathBuf,
    /// The parse error, rendered.
    pub error: String,
}

/// A scanned package tree: every classifiable YAML file, parsed.
#[derive(Debug)]
pub struct PackageTree {
    /// Absolute (or caller-relative) root of the tree.
    pub root: PathBuf,
    /// Successfully parsed package files, in sorted path order.
    pub packages: Vec<PackageFile>,
    /// Files that failed to parse, in sorted path order.
    pub malformed: Vec<MalformedFile>,
    /// Every YAML file seen, with its classification (`None` = outside the
    /// documented layout, skipped by the rules).
    pub listing: Vec<(PathBuf, Option<Layer>)>,
}

impl PackageTree {
    /// Scan and parse a package tree.
    ///
    /// Walks the root recursively (sorted, deterministic), classifies each
    /// `.yaml`/`.yml` file by path, and parses the classified ones. A file
    /// that fails to parse lands in `malformed` rather than aborting the
    /// scan; only an unreadable root is fatal.
    pub fn scan(root: impl Into<PathBuf>) -> PackResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(PackError::InvalidRoot { path: root });
        }

        let mut yaml_files = Vec::new();
        walk_yaml_files(&root, &root, &mut yaml_files)?;
        yaml_files.sort();

        let mut packages = Vec::new();
        let mut malformed = Vec::new();
        let mut listing = Vec::new();

        for rel in yaml_files {
            let layer = Layer::classify(&rel);
            listing.push((rel.clone(), layer));
            let Some(layer) = layer else {
                tracing::debug!(file = %rel.display(), "outside documented layout, skipping");
                continue;
            };
            match PackageFile::load(&root, &rel, layer) {
                Ok(file) => packages.push(file),
                Err(e) if e.is_file_local() => {
                    tracing::warn!(file = %rel.display(), error = %e, "file failed to parse");
                    malformed.push(MalformedFile {
                        path: rel,
                        error: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            packages = packages.len(),
            malformed = malformed.len(),
            "scanned package tree"
        );

        Ok(Self {
            root,
            packages,
            malformed,
            listing,
        })
    }

    /// Number of files the checker looked at (parsed or malformed).
    pub fn files_checked(&self) -> usize {
        self.packages.len() + self.malformed.len()
    }

    /// Look up a parsed package file by its tree-relative path.
    pub fn get(&self, rel_path: &str) -> Option<&PackageFile> {
        self.packages
            .iter()
            .find(|f| f.path == Path::new(rel_path))
    }

    /// Resolve a firmware/example file's include chain to parsed files.
    ///
    /// Returns the locally-resolvable includes sorted by layer (stable, so
    /// same-layer packages keep their include order). Includes that point
    /// outside the tree (remote packages) are skipped.
    pub fn include_chain(&self, file: &PackageFile) -> Vec<&PackageFile> {
        let mut chain: Vec<&PackageFile> = file
            .includes
            .iter()
            .filter_map(|inc| self.get(&inc.path))
            .collect();
        chain.sort_by_key(|f| f.layer);
        chain
    }

    /// Merge substitution bindings for a firmware/example file.
    ///
    /// Bindings from included packages accumulate in layer order, later
    /// layers overriding earlier ones; the file's own substitutions land
    /// last. Each binding remembers the layer that declared it.
    pub fn merged_bindings(&self, file: &PackageFile) -> BTreeMap<String, Layer> {
        let mut bindings = BTreeMap::new();
        for included in self.include_chain(file) {
            for name in included.substitutions.keys() {
                bindings.insert(name.clone(), included.layer);
            }
        }
        for name in file.substitutions.keys() {
            bindings.insert(name.clone(), file.layer);
        }
        bindings
    }
}

fn walk_yaml_files(root: &Path, dir: &Path, acc: &mut Vec<PathBuf>) -> PackResult<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        if path.is_dir() {
            walk_yaml_files(root, &path, acc)?;
        } else if name.ends_with(".yaml") || name.ends_with(".yml") {
            if name == SECRETS_FILE {
                continue;
            }
            if let Ok(rel) = path.strip_prefix(root) {
                acc.push(rel.to_path_buf());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn scan_rejects_missing_root() {
        let err = PackageTree::scan("/tmp/packlint-no-such-tree-xyz").unwrap_err();
        assert!(matches!(err, PackError::InvalidRoot { .. }));
    }

    #[test]
    fn scan_is_sorted_and_skips_secrets() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "common/wifi.yaml", "wifi:\n  ssid: !secret wifi_ssid\n");
        write(dir.path(), "common/base.yaml", "esphome:\n  name: ${device_name}\n");
        write(dir.path(), "secrets.yaml", "wifi_ssid: home-network\n");
        let tree = PackageTree::scan(dir.path()).unwrap();
        let paths: Vec<String> = tree
            .packages
            .iter()
            .map(|f| f.path.display().to_string())
            .collect();
        assert_eq!(paths, ["common/base.yaml", "common/wifi.yaml"]);
        assert_eq!(tree.files_checked(), 2);
    }

    #[test]
    fn malformed_file_is_collected_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "common/base.yaml", "esphome: {}\n");
        write(dir.path(), "common/broken.yaml", "{unbalanced: [\n");
        let tree = PackageTree::scan(dir.path()).unwrap();
        assert_eq!(tree.packages.len(), 1);
        assert_eq!(tree.malformed.len(), 1);
        assert!(tree.malformed[0].path.ends_with("broken.yaml"));
        assert!(tree.malformed[0].error.contains("parse"));
    }

    #[test]
    fn unclassified_files_are_listed_but_not_parsed() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "scripts/release.yaml", "steps: []\n");
        write(dir.path(), "common/base.yaml", "esphome: {}\n");
        let tree = PackageTree::scan(dir.path()).unwrap();
        assert_eq!(tree.packages.len(), 1);
        assert_eq!(tree.listing.len(), 2);
        let unclassified = tree
            .listing
            .iter()
            .find(|(p, _)| p.ends_with("release.yaml"))
            .unwrap();
        assert!(unclassified.1.is_none());
    }

    #[test]
    fn merged_bindings_respect_layer_override_order() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "common/base.yaml",
            "substitutions:\n  friendly_name: Device\n  log_level: INFO\n",
        );
        write(
            dir.path(),
            "devices/acme/relay.yaml",
            "substitutions:\n  firmware_name: acme-relay\n",
        );
        write(
            dir.path(),
            "firmware/acme-relay.yaml",
            concat!(
                "substitutions:\n",
                "  device_name: acme-relay\n",
                "  friendly_name: Acme Relay\n",
                "packages:\n",
                "  base: !include common/base.yaml\n",
                "  device: !include devices/acme/relay.yaml\n",
            ),
        );
        let tree = PackageTree::scan(dir.path()).unwrap();
        let firmware = tree.get("firmware/acme-relay.yaml").unwrap();
        let bindings = tree.merged_bindings(firmware);
        assert_eq!(bindings["log_level"], Layer::Base);
        assert_eq!(bindings["firmware_name"], Layer::Device);
        // Overridden by the firmware file itself.
        assert_eq!(bindings["friendly_name"], Layer::Firmware);
        assert_eq!(bindings["device_name"], Layer::Firmware);
    }

    #[test]
    fn include_chain_sorts_by_layer() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "common/base.yaml", "esphome: {}\n");
        write(dir.path(), "common/esp32.yaml", "esp32:\n  board: esp32dev\n");
        write(dir.path(), "devices/acme/relay.yaml", "output: []\n");
        write(
            dir.path(),
            "firmware/acme-relay.yaml",
            concat!(
                "packages:\n",
                "  device: !include devices/acme/relay.yaml\n",
                "  base: !include common/base.yaml\n",
                "  platform: !include common/esp32.yaml\n",
            ),
        );
        let tree = PackageTree::scan(dir.path()).unwrap();
        let firmware = tree.get("firmware/acme-relay.yaml").unwrap();
        let chain: Vec<Layer> = tree
            .include_chain(firmware)
            .iter()
            .map(|f| f.layer)
            .collect();
        assert_eq!(chain, [Layer::Base, Layer::Platform, Layer::Device]);
    }
}
