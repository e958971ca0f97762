//! Consolidated test utilities for barco-bill
//!
//! This module provides unified testing utilities for integration tests,
//! driving the `barco` binary with temporary configuration and scripted
//! console input. Nothing here touches the network.

pub mod assertions;
pub mod fixtures;
