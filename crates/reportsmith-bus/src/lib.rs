//! Session-scoped change notification bus
//!
//! Stages announce "my slice of the document changed"; derived-artifact
//! producers and the navigation flush protocol subscribe. Delivery is
//! synchronous, best-effort fan-out in subscription order — a failing
//! handler is logged and never breaks the others. Nothing survives a
//! process restart.

pub mod bus;
pub mod event;

pub use bus::{NotificationBus, Subscription};
pub use event::{BusEvent, FieldPatch, Topic};
