//! Integration test utilities for the relay hub
//!
//! This crate provides helpers for running end-to-end tests against an
//! in-process hub with framed client channels and a simulated backend.

pub mod helpers;

pub use helpers::*;
