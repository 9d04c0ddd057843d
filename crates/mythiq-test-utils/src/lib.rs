// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Mythiq integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockProvider`] - scripted provider (reply, fail, empty, hang) with call counting
//! - [`FailingStore`] - knowledge store whose reads and/or writes fail on demand
//! - [`TestHarness`] - orchestrator wired to mocks and an in-memory or temp SQLite store

pub mod failing_store;
pub mod harness;
pub mod mock_provider;

pub use failing_store::FailingStore;
pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_provider::{MockOutcome, MockProvider};
