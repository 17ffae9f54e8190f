//! # packlint-pack — Package Files and Convention Rules
//!
//! Loads a tree of ESPHome configuration packages and runs the shared-package
//! convention rules over it:
//!
//! - **Parsing** ([`parser`]): YAML → ordered JSON values with path-carrying
//!   errors; custom tags (`!secret`, `!include`) folded into their values.
//! - **Model** ([`model`]): [`PackageFile`] with its layer, substitutions,
//!   includes, and entity declarations.
//! - **Composition** ([`composition`]): deterministic tree scan and the
//!   explicit layered substitution merge.
//! - **Rules** ([`rules`]): include order, secrets hygiene, naming, entity
//!   categories, debounce filters, required substitutions, dashboard
//!   adoption, and substitution binding.
//!
//! Structural schema validation lives in `packlint-schema`; this crate
//! covers everything that needs the parsed model rather than the raw shape.

pub mod composition;
pub mod error;
pub mod model;
pub mod parser;
pub mod rules;

// Re-export primary types.
pub use composition::{MalformedFile, PackageTree};
pub use error::{PackError, PackResult};
pub use model::{ComponentKind, EntityDeclaration, IncludeRef, PackageFile};
pub use rules::{check_file, check_tree};
