//! # doc-quarry
//!
//! A batch harvester that collects Python docstrings from public
//! repositories into SQLite for later analysis.
//!
//! doc-quarry runs a sequential ETL pipeline per configured repository:
//! provision a working copy (clone or pull), walk the source tree for
//! Python files, parse each file with tree-sitter, extract module, class,
//! and function docstrings, and append them to an append-only table.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────┐   ┌───────────┐
//! │ Provisioner  │──▶│  Extractor  │──▶│  SQLite   │
//! │ clone / pull │   │ tree-sitter │   │ docstrings│
//! └──────────────┘   └─────────────┘   └─────┬─────┘
//!                                            │
//!                                            ▼
//!                                       ┌──────────┐
//!                                       │   CLI    │
//!                                       │   (dq)   │
//!                                       └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! dq init                      # create database
//! dq repos                     # list configured repositories
//! dq harvest                   # harvest every configured repository
//! dq harvest requests          # harvest a single repository
//! dq stats                     # per-project breakdown
//! dq sample --limit 10         # inspect the first stored records
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`provisioner`] | Working-copy clone/pull/teardown |
//! | [`extractor`] | Python docstring extraction via tree-sitter |
//! | [`harvest`] | Pipeline orchestration and reporting |
//! | [`store`] | Append-only record persistence |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod config;
pub mod db;
pub mod extractor;
pub mod harvest;
pub mod migrate;
pub mod models;
pub mod progress;
pub mod provisioner;
pub mod repos;
pub mod sample;
pub mod stats;
pub mod store;
