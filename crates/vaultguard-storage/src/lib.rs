// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the VaultGuard label index.
//!
//! Provides WAL-mode SQLite storage with a `user_version`-tracked schema and a
//! single-writer concurrency model via `tokio-rusqlite`.

pub mod database;
pub mod index;

pub use database::Database;
pub use index::SqliteIndex;
