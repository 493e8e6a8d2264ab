//! # EMBER Core Primitives
//!
//! Dependency-light building blocks for the EMBER render core:
//! - Generation-checked handle tables with fixed capacity
//! - Binary stream cursors for the frame command/constant protocol
//! - Plain-old-data math types that cross the thread boundary byte-for-byte
//!
//! ## Architecture Rules
//!
//! 1. **No heap allocations in the hot path** - tables and streams reserve
//!    everything up front; `clear()` keeps the memory
//! 2. **Ids are never ambiguous** - a destroyed handle can never pass a
//!    liveness check again, even after its slot is reused
//! 3. **Streams are self-delimiting** - every record's length is determined
//!    by its leading bytes

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod handle;
pub mod math;
pub mod stream;

pub use handle::{HandleTable, RawHandle};
pub use math::{Color4, Mat4, Rect};
pub use stream::{StreamReader, StreamWriter};
