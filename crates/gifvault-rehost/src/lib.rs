//! Mirroring upstream GIFs onto the durable CDN.
//!
//! [`HttpRehostGateway`] talks to the CDN; [`Rehoster`] applies the upload
//! timeout and the verification retry policy on top of any
//! [`RehostGateway`](gifvault_core::RehostGateway) and decides whether an
//! item ends up usable.

pub mod http;
pub mod rehoster;

pub use http::{GatewayConfig, HttpRehostGateway};
pub use rehoster::Rehoster;
