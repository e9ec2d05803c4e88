// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Latchkey tests.
//!
//! Provides deterministic collaborators so expiry and store interaction can
//! be asserted without sleeping or touching a real database.
//!
//! # Components
//!
//! - [`ManualClock`] - Clock that only moves when told to
//! - [`MemoryProfileStore`] - In-memory profile store with call counting and failure injection

pub mod clock;
pub mod store;

pub use clock::ManualClock;
pub use store::MemoryProfileStore;
