//! In-process storage backend

mod store;

pub use store::MemoryStore;
