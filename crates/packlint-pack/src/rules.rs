//! # Convention Rules
//!
//! One function per rule, each returning the violations it found. Rules are
//! independent: every rule runs against every eligible file and nothing
//! short-circuits, so one pass reports everything.
//!
//! Rule execution order is fixed (order, secrets, naming, category,
//! debounce, substitutions, adoption, unbound) — the report order for a
//! file must not depend on anything but the file's content.

use std::collections::BTreeSet;

use serde_json::Value;

use packlint_core::{Layer, RuleId, Report, Violation};

use crate::composition::PackageTree;
use crate::model::{ComponentKind, PackageFile};
use packlint_core::naming;

/// Platforms whose entities are diagnostic by nature and must carry
/// `entity_category: diagnostic`.
const DIAGNOSTIC_PLATFORMS: &[&str] = &[
    "wifi_signal",
    "uptime",
    "status",
    "restart",
    "safe_mode",
    "version",
    "wifi_info",
];

/// Credential fields that must never hold a literal value in a shared
/// package. Paths are dot-separated into the document.
const SECRET_FIELDS: &[&str] = &[
    "wifi.ssid",
    "wifi.password",
    "wifi.ap.password",
    "api.encryption.key",
    "ota.password",
];

/// Run every rule against a scanned tree and accumulate the report.
///
/// Violations appear in sorted file order; within a file, in rule order.
/// Malformed files contribute exactly one [`RuleId::MalformedYaml`] error
/// and are skipped by every other rule.
pub fn check_tree(tree: &PackageTree) -> Report {
    let mut report = Report::new();
    report.files_checked = tree.files_checked();

    for (path, layer) in &tree.listing {
        if layer.is_none() {
            continue;
        }
        if let Some(bad) = tree.malformed.iter().find(|m| &m.path == path) {
            report.push(Violation::new(
                bad.path.clone(),
                RuleId::MalformedYaml,
                bad.error.clone(),
            ));
            continue;
        }
        let Some(file) = tree.packages.iter().find(|f| &f.path == path) else {
            continue;
        };
        report.extend(check_file(tree, file));
    }

    report
}

/// Run the per-file rules (everything except MalformedYaml) for one file.
pub fn check_file(tree: &PackageTree, file: &PackageFile) -> Vec<Violation> {
    let mut out = Vec::new();
    out.extend(check_include_order(file));
    out.extend(check_secrets(file));
    out.extend(check_naming(file));
    out.extend(check_entity_categories(file));
    out.extend(check_debounce(file));
    out.extend(check_required_substitutions(file));
    out.extend(check_adoption(file));
    out.extend(check_unbound_substitutions(tree, file));
    out
}

/// OrderViolation: firmware/example `packages:` blocks must include layers
/// in non-decreasing order base → platform → diagnostics → device.
pub fn check_include_order(file: &PackageFile) -> Vec<Violation> {
    if !matches!(file.layer, Layer::Firmware | Layer::Example) {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut highest: Option<Layer> = None;
    for include in &file.includes {
        let Some(layer) = include.layer.filter(|l| l.in_include_chain()) else {
            continue;
        };
        if let Some(prev) = highest {
            if layer < prev {
                out.push(Violation::new(
                    file.path.clone(),
                    RuleId::OrderViolation,
                    format!(
                        "package {:?} ({layer}) is included after a {prev} package; \
                         expected order base -> platform -> diagnostics -> device",
                        include.path
                    ),
                ));
            }
        }
        highest = Some(highest.map_or(layer, |p| p.max(layer)));
    }
    out
}

/// SecretLeak: shared packages must not hardcode credentials.
pub fn check_secrets(file: &PackageFile) -> Vec<Violation> {
    if !file.layer.is_shared() {
        return Vec::new();
    }
    let mut out = Vec::new();
    for field in SECRET_FIELDS {
        if let Some(value) = lookup_path(&file.doc, field) {
            if is_literal_credential(value) {
                out.push(secret_violation(file, field));
            }
        }
    }
    // Newer configurations write `ota:` as a platform list.
    if let Some(entries) = file.doc.get("ota").and_then(Value::as_array) {
        for entry in entries {
            if let Some(password) = entry.get("password") {
                if is_literal_credential(password) {
                    out.push(secret_violation(file, "ota.password"));
                }
            }
        }
    }
    out
}

fn secret_violation(file: &PackageFile, field: &str) -> Violation {
    Violation::new(
        file.path.clone(),
        RuleId::SecretLeak,
        format!(
            "{field} holds a literal value in a shared package; \
             use !secret or a substitution"
        ),
    )
}

/// A credential value is a leak when it is a non-empty literal: neither a
/// `!secret` reference nor a `${...}` substitution.
fn is_literal_credential(value: &Value) -> bool {
    match value {
        Value::String(s) => {
            !s.is_empty() && !s.starts_with("!secret") && !s.contains("${")
        }
        Value::Number(_) | Value::Bool(_) => true,
        _ => false,
    }
}

/// NamingViolation: lowercase-hyphen paths, snake_case substitutions and
/// entity ids, Title Case display names.
pub fn check_naming(file: &PackageFile) -> Vec<Violation> {
    let mut out = Vec::new();
    let push = |out: &mut Vec<Violation>, msg: String| {
        out.push(Violation::new(file.path.clone(), RuleId::NamingViolation, msg));
    };

    let components: Vec<_> = file.path.components().collect();
    for (i, comp) in components.iter().enumerate() {
        let Some(name) = comp.as_os_str().to_str() else {
            continue;
        };
        let is_last = i + 1 == components.len();
        let subject = if is_last {
            name.strip_suffix(".yaml")
                .or_else(|| name.strip_suffix(".yml"))
                .unwrap_or(name)
        } else {
            name
        };
        if !naming::is_lowercase_hyphen(subject) {
            push(
                &mut out,
                format!("path component {subject:?} is not lowercase-hyphen"),
            );
        }
    }

    for name in file.substitutions.keys() {
        if !naming::is_snake_case(name) {
            push(
                &mut out,
                format!("substitution {name:?} is not snake_case"),
            );
        }
    }

    for entity in &file.entities {
        if let Some(id) = &entity.id {
            if !naming::is_snake_case(id) {
                push(
                    &mut out,
                    format!("{}: id {id:?} is not snake_case", entity.location),
                );
            }
        }
        if let Some(name) = &entity.name {
            if !naming::is_title_case(name) {
                push(
                    &mut out,
                    format!("{}: name {name:?} is not Title Case", entity.location),
                );
            }
        }
    }

    out
}

/// MissingCategory: diagnostic-pattern entities need
/// `entity_category: diagnostic`.
pub fn check_entity_categories(file: &PackageFile) -> Vec<Violation> {
    let mut out = Vec::new();
    for entity in &file.entities {
        if !DIAGNOSTIC_PLATFORMS.contains(&entity.platform.as_str()) {
            continue;
        }
        if entity.entity_category.as_deref() != Some("diagnostic") {
            out.push(Violation::new(
                file.path.clone(),
                RuleId::MissingCategory,
                format!(
                    "{}: platform {:?} requires entity_category: diagnostic",
                    entity.location, entity.platform
                ),
            ));
        }
    }
    out
}

/// DebounceMissing (warning): gpio binary_sensors should debounce both
/// edges. `delayed_on_off` covers both at once.
pub fn check_debounce(file: &PackageFile) -> Vec<Violation> {
    let mut out = Vec::new();
    for entity in &file.entities {
        if entity.component != ComponentKind::BinarySensor || entity.platform != "gpio" {
            continue;
        }
        let has = |key: &str| entity.filter_keys.iter().any(|k| k == key);
        if has("delayed_on_off") {
            continue;
        }
        let mut missing = Vec::new();
        if !has("delayed_on") {
            missing.push("delayed_on");
        }
        if !has("delayed_off") {
            missing.push("delayed_off");
        }
        if !missing.is_empty() {
            out.push(Violation::new(
                file.path.clone(),
                RuleId::DebounceMissing,
                format!(
                    "{}: gpio binary_sensor lacks {} debounce filter(s)",
                    entity.location,
                    missing.join(" and ")
                ),
            ));
        }
    }
    out
}

/// MissingSubstitution: each layer's required substitutions.
pub fn check_required_substitutions(file: &PackageFile) -> Vec<Violation> {
    let required: &[&str] = match file.layer {
        Layer::Device => &["firmware_name"],
        Layer::Firmware | Layer::Example => &["device_name", "friendly_name"],
        _ => &[],
    };
    required
        .iter()
        .filter(|name| !file.declares_substitution(name))
        .map(|name| {
            Violation::new(
                file.path.clone(),
                RuleId::MissingSubstitution,
                format!("{} file must define substitution {name:?}", file.layer),
            )
        })
        .collect()
}

/// AdoptionBlocked: firmware files need `dashboard_import` and a project
/// block for the dashboard adoption flow to work.
pub fn check_adoption(file: &PackageFile) -> Vec<Violation> {
    if file.layer != Layer::Firmware {
        return Vec::new();
    }
    let mut out = Vec::new();
    if file.doc.get("dashboard_import").is_none() {
        out.push(Violation::new(
            file.path.clone(),
            RuleId::AdoptionBlocked,
            "firmware file has no dashboard_import; dashboard adoption will not work",
        ));
    }
    let project = file
        .doc
        .pointer("/esphome/project")
        .or_else(|| file.doc.get("project"));
    if !matches!(project, Some(Value::Object(_))) {
        out.push(Violation::new(
            file.path.clone(),
            RuleId::AdoptionBlocked,
            "firmware file has no project block (esphome.project with name and version)",
        ));
    }
    out
}

/// UnboundSubstitution: in the merged include chain of a firmware/example
/// file, every `${x}` must be declared at the same or an earlier layer.
pub fn check_unbound_substitutions(tree: &PackageTree, file: &PackageFile) -> Vec<Violation> {
    if !matches!(file.layer, Layer::Firmware | Layer::Example) {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut bound: BTreeSet<&str> = BTreeSet::new();
    let mut reported: BTreeSet<(String, String)> = BTreeSet::new();

    let mut chain = tree.include_chain(file);
    chain.push(file);

    for member in chain {
        for name in member.substitutions.keys() {
            bound.insert(name);
        }
        for reference in &member.substitution_refs {
            if bound.contains(reference.as_str()) {
                continue;
            }
            let key = (member.path.display().to_string(), reference.clone());
            if !reported.insert(key) {
                continue;
            }
            out.push(Violation::new(
                file.path.clone(),
                RuleId::UnboundSubstitution,
                format!(
                    "${{{reference}}} referenced in {} has no binding at the same or an earlier layer",
                    member.path.display()
                ),
            ));
        }
    }
    out
}

/// Walk a dot-separated path into a JSON object tree.
fn lookup_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}
