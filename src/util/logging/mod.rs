//! Logging metadata shared by every module.

pub mod standards;
