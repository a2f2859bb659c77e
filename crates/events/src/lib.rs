//! Change-feed mechanics: event trait and publish/subscribe bus.
//!
//! This crate is domain-agnostic. The ledger publishes its stock notifications
//! through these types; transports (websocket, SSE) live outside the workspace.

pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus, DEFAULT_SUBSCRIBER_CAPACITY};
