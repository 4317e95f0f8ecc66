//! poke.community backend library.
//!
//! The crate follows a hexagonal layout: `domain` holds the entities,
//! ports, and services; `inbound` adapts HTTP onto the driving ports;
//! `outbound` implements the driven ports over PostgreSQL and the Resend
//! mail API; `server` wires the pieces together.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use doc::ApiDoc;
pub use middleware::Trace;
