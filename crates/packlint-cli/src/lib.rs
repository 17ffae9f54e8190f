//! # packlint-cli — The `packlint` Command
//!
//! Provides the `packlint` command-line interface over the checker crates.
//!
//! ## Subcommands
//!
//! - `packlint check <ROOT>` — run every convention rule and the structural
//!   schema check over a package tree, print the report, and exit 0/1.
//! - `packlint layers <ROOT>` — print the layer classification of every
//!   YAML file in the tree, for debugging convention layout.
//!
//! ## Exit codes
//!
//! `0` — no error-severity violations (warnings alone stay green).
//! `1` — at least one error, or any violation under `--strict`.
//! `2` — operational failure (unreadable root directory).

pub mod check;
pub mod layers;
