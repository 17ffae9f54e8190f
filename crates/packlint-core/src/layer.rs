//! # Configuration Layers
//!
//! The shared-package convention stacks configuration in layers: shared
//! packages under `common/` (base defaults, platform selection, diagnostic
//! entities), per-device GPIO mappings under `devices/`, and the flashable
//! firmware and example files that tie a device to its substitutions.
//!
//! Layer order is the include order: a firmware file must pull in packages
//! base → platform → diagnostics → device. The derived `Ord` on [`Layer`]
//! encodes exactly that ordering.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Chip-family stems that mark a `common/` package as a platform layer.
const PLATFORM_STEMS: &[&str] = &["esp32", "esp8266", "rp2040"];

/// Filename-stem prefixes that mark a `common/` package as diagnostics.
const DIAGNOSTICS_STEMS: &[&str] = &["diagnostics", "debug", "status"];

/// The layer a package file belongs to.
///
/// Ordering matters: `Base < Platform < Diagnostics < Device < Firmware`.
/// [`Layer::Example`] sorts last; example files are checked like firmware
/// files but never appear in an include chain themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// Shared defaults: WiFi, OTA, API, logging packages under `common/`.
    Base,
    /// Chip-family selection (`esp32`, `esp8266`, `rp2040`) under `common/`.
    Platform,
    /// Diagnostic entity packages (`diagnostics`, `debug`, `status`) under `common/`.
    Diagnostics,
    /// Per-device GPIO mapping under `devices/<brand>/<model>.yaml`.
    Device,
    /// Flashable configuration under `firmware/<brand>-<model>.yaml`.
    Firmware,
    /// End-user starting point under `examples/<brand>-<model>.yaml`.
    Example,
}

impl Layer {
    /// Classify a path (relative to the tree root) into its layer.
    ///
    /// Returns `None` for files outside the documented layout; those files
    /// are skipped by the checker rather than rejected. A `common/` file
    /// whose stem matches no platform or diagnostics pattern defaults to
    /// [`Layer::Base`] — shared defaults are the common case.
    pub fn classify(rel_path: &Path) -> Option<Layer> {
        let mut components = rel_path.components();
        let top = components.next()?.as_os_str().to_str()?;
        match top {
            "common" => {
                let stem = rel_path.file_stem()?.to_str()?;
                if PLATFORM_STEMS.iter().any(|p| stem.starts_with(p)) {
                    Some(Layer::Platform)
                } else if DIAGNOSTICS_STEMS.iter().any(|p| stem.starts_with(p)) {
                    Some(Layer::Diagnostics)
                } else {
                    Some(Layer::Base)
                }
            }
            "devices" => Some(Layer::Device),
            "firmware" => Some(Layer::Firmware),
            "examples" => Some(Layer::Example),
            _ => None,
        }
    }

    /// Whether this layer participates in a firmware file's include chain.
    pub fn in_include_chain(self) -> bool {
        matches!(
            self,
            Layer::Base | Layer::Platform | Layer::Diagnostics | Layer::Device
        )
    }

    /// Whether packages of this layer are shared across devices.
    ///
    /// Shared packages are subject to the secrets-hygiene rule: they end up
    /// in every firmware build, so a literal credential in one of them leaks
    /// into every device.
    pub fn is_shared(self) -> bool {
        matches!(self, Layer::Base | Layer::Platform | Layer::Diagnostics)
    }

    /// Stable lowercase name, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Layer::Base => "base",
            Layer::Platform => "platform",
            Layer::Diagnostics => "diagnostics",
            Layer::Device => "device",
            Layer::Firmware => "firmware",
            Layer::Example => "example",
        }
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
