// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Traits for the external collaborators the workspace consumes.
//!
//! Implementations live outside this workspace (the application's database
//! layer); `latchkey-test-utils` provides an in-memory one.

pub mod profile_store;

pub use profile_store::ProfileStore;
