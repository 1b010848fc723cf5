//! # CUtil - Common Utilities Library
//!
//! Small helpers shared by the workspace crates.
//!
//! ## Features
//!
//! - `fs`: File system utilities (output directory management, sequential file names)
//! - `time`: Time and date utilities (formatting, random calendar dates)
//! - `http`: HTTP client utilities (client construction, headers, error classification)

#[cfg(feature = "fs")]
pub mod fs;

#[cfg(feature = "time")]
pub mod time;

#[cfg(feature = "http")]
pub mod http;
