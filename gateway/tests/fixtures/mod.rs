//! Test Fixtures Module
//!
//! Shared fixtures for the gateway integration tests:
//! - Audio fixtures (programmatically generated)
//! - Mock speech model and strategies

// Not every test binary uses every fixture
#![allow(dead_code)]

pub mod audio_fixtures;
pub mod model_fixtures;

pub use audio_fixtures::*;
pub use model_fixtures::*;
