//! Configuration model for lockspool.
//!
//! This module defines the Config struct that represents the optional YAML
//! configuration file. It supports forward-compatible YAML parsing (unknown
//! fields are ignored), defaults for every field, and validation.

mod model;
mod operations;

#[cfg(test)]
mod tests;

pub use model::Config;
