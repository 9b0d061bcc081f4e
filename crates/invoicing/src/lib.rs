//! `fiscoerp-invoicing` — outbound fiscal document lifecycle.
//!
//! The invoice here is the transport object the engine acts on: identity,
//! status state machine, and the freeze-on-authorization / read-with-fallback
//! semantics that make authorized tax amounts immutable. Persistence and
//! document rendering live elsewhere; this crate is deterministic domain
//! logic over in-memory data.

pub mod freeze;
pub mod invoice;
pub mod numbering;

pub use invoice::{Invoice, InvoiceId, InvoiceStatus};
pub use numbering::next_available_number;
