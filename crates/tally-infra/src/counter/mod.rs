//! Counter store implementations.

mod memory;

pub use memory::InMemoryCounterStore;
