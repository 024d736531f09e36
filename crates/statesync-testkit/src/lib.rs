//! # Statesync Testkit
//!
//! Testing utilities for statesync.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a ready-made store + resolver + registration harness,
//!   plus scripted synchronizers (fixed, failing, gated, recording)
//! - **Generators**: proptest strategies for property names, state values,
//!   and descriptor chains
//!
//! ## Fixtures
//!
//! ```rust
//! use serde_json::json;
//! use statesync::{StateDescriptor, StateValue, SynchronizerRef, SynchronizerRegistry};
//! use statesync_testkit::fixtures::{FixedSynchronizer, TestFixture};
//!
//! # async fn example() {
//! let fixture = TestFixture::new();
//! fixture.register_synchronizer("age-sync", FixedSynchronizer::new(json!(30)));
//!
//! let registry = SynchronizerRegistry::per_property([
//!     ("age", SynchronizerRef::new("age-sync")),
//! ]);
//! let descriptor = StateDescriptor::root("session", StateValue::new(), registry);
//! fixture.register_state(descriptor.clone()).await.unwrap();
//!
//! let selector = fixture.selector(&descriptor).unwrap();
//! # }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{
    FailingSynchronizer, FixedSynchronizer, GateSynchronizer, RecordingWriter, TestFixture,
};
