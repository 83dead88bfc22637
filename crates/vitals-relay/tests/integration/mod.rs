//! Integration tests for vitals-relay.
//!
//! These tests run a real collector on a loopback port and drive it over HTTP:
//! - Producer ingestion and snapshot publishing
//! - Dashboard polling against a live collector

pub mod common;
