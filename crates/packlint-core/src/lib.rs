#![deny(missing_docs)]

//! # packlint-core — Foundational Types for packlint
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies — only `serde` and
//! `serde_json` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **One [`Layer`] enum.** The package layering order (base → platform →
//!    diagnostics → device → firmware) is defined once and derived `Ord`
//!    gives the include-order comparison for free.
//!
//! 2. **One [`RuleId`] enum.** Every convention rule has exactly one
//!    identifier, and its default [`Severity`] lives next to it. No string
//!    rule names that can drift between the checker and the report.
//!
//! 3. **Violations are data.** A [`Violation`] is `{file, rule, severity,
//!    message}`, serializable as-is for the JSON report format. The checker
//!    accumulates them; nothing short-circuits on the first finding.

pub mod layer;
pub mod naming;
pub mod report;

pub use layer::Layer;
pub use report::{Report, RuleId, Severity, Violation};
