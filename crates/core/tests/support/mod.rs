//! Shared test helpers for `cranepay-core` integration tests.
//!
//! In-memory stand-ins for the backend ports plus fixtures for building
//! periods, raw entries and review aggregates.

#![allow(dead_code)]

pub mod actions;
pub mod fixtures;
pub mod gateway;
