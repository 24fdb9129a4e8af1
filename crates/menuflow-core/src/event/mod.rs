//! Event distribution for committed session changes.

pub mod bus;

pub use bus::EventBus;
