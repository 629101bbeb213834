//! Two-phase payment settlement
//!
//! Phase one (`issuer`) opens a gateway order for a completed request;
//! phase two (`verifier`) checks the callback signature and settles both
//! the payment row and the request row. Pricing and signature math live in
//! their own submodules so they stay pure and testable.

pub mod gateway;
pub mod issuer;
pub mod pricing;
pub mod signature;
pub mod verifier;

pub use gateway::{GatewayOrder, HttpPaymentGateway, PaymentGateway};
