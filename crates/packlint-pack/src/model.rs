//! # Package-File Model
//!
//! Strongly-typed view of one YAML package document: its layer, declared
//! substitutions, package includes (in document order), and the entity
//! declarations the convention rules inspect. Everything here is immutable
//! parse-time data; nothing survives past a checker run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use packlint_core::Layer;

use crate::error::PackResult;
use crate::parser;

/// Component kinds that carry entity declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    /// `sensor:` entries.
    Sensor,
    /// `binary_sensor:` entries.
    BinarySensor,
    /// `button:` entries.
    Button,
    /// `switch:` entries.
    Switch,
    /// `text_sensor:` entries.
    TextSensor,
}

impl ComponentKind {
    /// All kinds, in the order they are scanned.
    pub const ALL: [ComponentKind; 5] = [
        ComponentKind::Sensor,
        ComponentKind::BinarySensor,
        ComponentKind::Button,
        ComponentKind::Switch,
        ComponentKind::TextSensor,
    ];

    /// The YAML key for this component kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ComponentKind::Sensor => "sensor",
            ComponentKind::BinarySensor => "binary_sensor",
            ComponentKind::Button => "button",
            ComponentKind::Switch => "switch",
            ComponentKind::TextSensor => "text_sensor",
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entity declaration inside a package file.
#[derive(Debug, Clone)]
pub struct EntityDeclaration {
    /// Which component list the entity came from.
    pub component: ComponentKind,
    /// The entity's `platform` value.
    pub platform: String,
    /// `entity_category`, if declared.
    pub entity_category: Option<String>,
    /// `id`, if declared. Expected snake_case.
    pub id: Option<String>,
    /// Display `name`, if declared. Expected Title Case.
    pub name: Option<String>,
    /// Keys of the entries in the entity's `filters` list.
    pub filter_keys: Vec<String>,
    /// Location string for messages, e.g. `binary_sensor[0]`.
    pub location: String,
}

/// A reference from a `packages:` block to another package.
#[derive(Debug, Clone)]
pub struct IncludeRef {
    /// The mapping key naming the include, if the block is a mapping.
    pub key: Option<String>,
    /// The included file path as written (relative to the tree root).
    pub path: String,
    /// Layer of the included file, if the path is classifiable.
    pub layer: Option<Layer>,
}

/// A parsed package file plus everything the rules need from it.
#[derive(Debug, Clone)]
pub struct PackageFile {
    /// Path relative to the tree root.
    pub path: PathBuf,
    /// The file's layer.
    pub layer: Layer,
    /// The parsed document (ordered mappings).
    pub doc: Value,
    /// Substitutions declared by the file (name → default, stringified).
    pub substitutions: BTreeMap<String, String>,
    /// Package includes in document order.
    pub includes: Vec<IncludeRef>,
    /// Entity declarations across all component lists.
    pub entities: Vec<EntityDeclaration>,
    /// Every `${x}` reference in the document, in document order.
    pub substitution_refs: Vec<String>,
}

impl PackageFile {
    /// Load and dissect one package file.
    ///
    /// `rel_path` is the path relative to `root`; the caller has already
    /// classified it into `layer`.
    pub fn load(root: &Path, rel_path: &Path, layer: Layer) -> PackResult<Self> {
        let doc = parser::load_yaml_as_value(&root.join(rel_path))?;
        Ok(Self::from_doc(rel_path.to_path_buf(), layer, doc))
    }

    /// Build the model from an already-parsed document.
    pub fn from_doc(path: PathBuf, layer: Layer, doc: Value) -> Self {
        let substitutions = extract_substitutions(&doc);
        let includes = extract_includes(&doc);
        let entities = extract_entities(&doc);
        let substitution_refs = parser::collect_substitution_refs(&doc);
        Self {
            path,
            layer,
            doc,
            substitutions,
            includes,
            entities,
            substitution_refs,
        }
    }

    /// Whether the file declares a substitution with this name.
    pub fn declares_substitution(&self, name: &str) -> bool {
        self.substitutions.contains_key(name)
    }
}

/// Pull the top-level `substitutions` mapping out of a document.
///
/// Non-string scalar defaults (numbers, booleans) are stringified — they
/// still bind the name; the structural schema flags the type separately.
fn extract_substitutions(doc: &Value) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    if let Some(map) = doc.get("substitutions").and_then(Value::as_object) {
        for (name, default) in map {
            let rendered = match default {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => String::new(),
            };
            out.insert(name.clone(), rendered);
        }
    }
    out
}

/// Pull package includes out of the `packages:` block, in document order.
///
/// Handles the mapping form (`base: !include common/base.yaml`), the
/// sequence form, and the remote-package form (`url` + `files`, where each
/// file entry is a string or a mapping with a `path`).
fn extract_includes(doc: &Value) -> Vec<IncludeRef> {
    let mut out = Vec::new();
    let Some(packages) = doc.get("packages") else {
        return out;
    };
    match packages {
        Value::Object(map) => {
            for (key, value) in map {
                push_include(Some(key.clone()), value, &mut out);
            }
        }
        Value::Array(entries) => {
            for value in entries {
                push_include(None, value, &mut out);
            }
        }
        _ => {}
    }
    out
}

fn push_include(key: Option<String>, value: &Value, out: &mut Vec<IncludeRef>) {
    match value {
        Value::String(s) => {
            let path = s.strip_prefix("!include ").unwrap_or(s).trim().to_string();
            let layer = Layer::classify(Path::new(&path));
            out.push(IncludeRef { key, path, layer });
        }
        Value::Object(map) => {
            // Remote package: the files list names what gets merged.
            if let Some(files) = map.get("files").and_then(Value::as_array) {
                for file in files {
                    let path = match file {
                        Value::String(s) => Some(s.clone()),
                        Value::Object(m) => m
                            .get("path")
                            .and_then(Value::as_str)
                            .map(ToString::to_string),
                        _ => None,
                    };
                    if let Some(path) = path {
                        let layer = Layer::classify(Path::new(&path));
                        out.push(IncludeRef {
                            key: key.clone(),
                            path,
                            layer,
                        });
                    }
                }
            }
        }
        _ => {}
    }
}

/// Collect entity declarations from every component list in the document.
fn extract_entities(doc: &Value) -> Vec<EntityDeclaration> {
    let mut out = Vec::new();
    for kind in ComponentKind::ALL {
        let Some(entries) = doc.get(kind.as_str()).and_then(Value::as_array) else {
            continue;
        };
        for (index, entry) in entries.iter().enumerate() {
            let Some(map) = entry.as_object() else {
                continue;
            };
            let Some(platform) = map.get("platform").and_then(Value::as_str) else {
                continue;
            };
            let filter_keys = map
                .get("filters")
                .and_then(Value::as_array)
                .map(|filters| {
                    filters
                        .iter()
                        .flat_map(|f| match f {
                            Value::String(s) => vec![s.clone()],
                            Value::Object(m) => m.keys().cloned().collect(),
                            _ => Vec::new(),
                        })
                        .collect()
                })
                .unwrap_or_default();
            out.push(EntityDeclaration {
                component: kind,
                platform: platform.to_string(),
                entity_category: map
                    .get("entity_category")
                    .and_then(Value::as_str)
                    .map(ToString::to_string),
                id: map.get("id").and_then(Value::as_str).map(ToString::to_string),
                name: map
                    .get("name")
                    .and_then(Value::as_str)
                    .map(ToString::to_string),
                filter_keys,
                location: format!("{}[{index}]", kind.as_str()),
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::yaml_to_json_value;

    fn file(yaml: &str, layer: Layer) -> PackageFile {
        let doc = yaml_to_json_value(serde_yaml::from_str(yaml).unwrap());
        PackageFile::from_doc(PathBuf::from("test.yaml"), layer, doc)
    }

    #[test]
    fn substitutions_are_extracted_and_stringified() {
        let f = file(
            "substitutions:\n  device_name: relay-node\n  update_interval: 60s\n  boot_delay: 5\n",
            Layer::Firmware,
        );
        assert_eq!(f.substitutions["device_name"], "relay-node");
        assert_eq!(f.substitutions["update_interval"], "60s");
        assert_eq!(f.substitutions["boot_delay"], "5");
        assert!(f.declares_substitution("device_name"));
        assert!(!f.declares_substitution("friendly_name"));
    }

    #[test]
    fn includes_preserve_document_order() {
        let f = file(
            "packages:\n  device: !include devices/acme/relay.yaml\n  base: !include common/base.yaml\n",
            Layer::Firmware,
        );
        assert_eq!(f.includes.len(), 2);
        assert_eq!(f.includes[0].path, "devices/acme/relay.yaml");
        assert_eq!(f.includes[0].layer, Some(Layer::Device));
        assert_eq!(f.includes[1].path, "common/base.yaml");
        assert_eq!(f.includes[1].layer, Some(Layer::Base));
    }

    #[test]
    fn includes_sequence_form() {
        let f = file(
            "packages:\n  - !include common/base.yaml\n  - !include common/esp32.yaml\n",
            Layer::Firmware,
        );
        assert_eq!(f.includes.len(), 2);
        assert!(f.includes.iter().all(|i| i.key.is_none()));
        assert_eq!(f.includes[1].layer, Some(Layer::Platform));
    }

    #[test]
    fn remote_package_files_are_collected() {
        let f = file(
            "packages:\n  upstream:\n    url: https://github.com/acme/packages\n    files:\n      - common/base.yaml\n      - path: common/esp32.yaml\n",
            Layer::Firmware,
        );
        assert_eq!(f.includes.len(), 2);
        assert_eq!(f.includes[0].path, "common/base.yaml");
        assert_eq!(f.includes[1].path, "common/esp32.yaml");
    }

    #[test]
    fn entities_are_extracted_with_filters() {
        let f = file(
            concat!(
                "sensor:\n",
                "  - platform: wifi_signal\n",
                "    name: \"WiFi Signal\"\n",
                "    entity_category: diagnostic\n",
                "binary_sensor:\n",
                "  - platform: gpio\n",
                "    id: button_input\n",
                "    name: \"Front Button\"\n",
                "    filters:\n",
                "      - delayed_on: 10ms\n",
                "      - delayed_off: 10ms\n",
            ),
            Layer::Device,
        );
        assert_eq!(f.entities.len(), 2);
        let wifi = &f.entities[0];
        assert_eq!(wifi.platform, "wifi_signal");
        assert_eq!(wifi.entity_category.as_deref(), Some("diagnostic"));
        assert_eq!(wifi.location, "sensor[0]");
        let button = &f.entities[1];
        assert_eq!(button.component, ComponentKind::BinarySensor);
        assert_eq!(button.id.as_deref(), Some("button_input"));
        assert_eq!(button.filter_keys, ["delayed_on", "delayed_off"]);
    }

    #[test]
    fn entries_without_platform_are_skipped() {
        let f = file("sensor:\n  - id: orphan\n", Layer::Device);
        assert!(f.entities.is_empty());
    }
}
