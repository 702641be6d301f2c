//! Integration test crate for Splice.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on every splice crate to verify they work together.

#[cfg(test)]
mod export;

#[cfg(test)]
mod properties;

#[cfg(test)]
mod timeline;
