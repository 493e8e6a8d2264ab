//! # Frame Wire Protocol
//!
//! The binary encoding that carries a frame from the simulation thread to
//! the render thread: a command stream (resource lifecycle, terminated by
//! exactly one `End` record) and a constant stream (uniform updates,
//! terminated by the `End` type tag).
//!
//! Producer and consumer are compiled from the same source and agree on a
//! single protocol version; there is no skip-unknown mechanism. Any
//! disagreement observed at decode time aborts.

mod command;
mod constants;

pub use command::{Command, CommandOp};
pub use constants::{finish_constants, write_constant, ConstantReader, ConstantRecord};
