//! Common utilities for PakFS.
//!
//! This crate provides the primitive decoding layer shared by the other PakFS crates:
//!
//! - [`StreamReader`] - Reads fixed-width integers, VLQ integers and strings from a seekable stream
//! - [`ByteOrder`] - Byte order selection with a runtime comparison against the platform order
//! - [`vlq`] - Variable-length quantity encoding helpers

mod error;
mod reader;

pub mod vlq;

pub use error::{Error, Result};
pub use reader::{ByteOrder, StreamReader};
