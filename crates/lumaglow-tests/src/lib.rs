//! Integration test crate for Lumaglow.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on every lumaglow crate to verify they work together.

#[cfg(test)]
mod support;

#[cfg(test)]
mod scenario;

#[cfg(test)]
mod topology;

#[cfg(test)]
mod properties;
