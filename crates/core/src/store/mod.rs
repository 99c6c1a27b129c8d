//! Bounded in-memory result store.

mod ring_store;

pub use ring_store::RingStore;
