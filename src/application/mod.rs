//! Application layer - orchestration of domain logic.
//!
//! This layer coordinates the domain logic and manages the runtime behavior:
//! - Client context resolution (trusted-proxy IP chain, cookie UID)
//! - Per-kind event building and enrichment
//! - The pending-event queue and its flush threshold
//! - The flusher (payload assembly, transport invocation, debug echo)
//! - The tracker itself (configuration, gating, public surface)
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the application layer independent
//! from infrastructure details.

pub mod builder;
pub mod context;
pub mod flusher;
pub mod metrics;
pub mod ports;
pub mod queue;
pub mod tracker;
