//! Store implementations and helpers shared by backends.

mod memory;
mod sequential;

pub use memory::{Fault, MemoryStore};
pub use sequential::apply_sequentially;
