//! # packlint-schema — Structural Document Validation
//!
//! Validates parsed package documents against built-in JSON Schemas
//! (Draft 2020-12) before the convention rules run. The schemas pin the
//! shape of a document — substitutions are string→string, `packages` is a
//! mapping or sequence, a project block carries `name` and `version` — and
//! leave everything content-level to the rules in `packlint-pack`.
//!
//! Schemas ship inside the crate; nothing is fetched at runtime. `$ref`
//! URIs under `https://packlint.dev/schemas/` resolve through a local
//! retriever over the embedded set.

mod validate;

pub use validate::{SchemaValidationDetail, SchemaValidationError, SchemaValidator};
