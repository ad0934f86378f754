#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for the Monetico payment gateway protocol.
//!
//! This crate builds and seals payment requests for the Monetico bank
//! payment gateway. A structured payment description — amount, currency,
//! dates, customer/address/cart context, optional payment options — is
//! turned into an ordered field mapping, and a keyed digest (the *seal*)
//! is computed over its canonical serialization so the gateway can
//! authenticate the request. The actual submission is a browser form POST
//! to the gateway's endpoint; no network I/O happens here.
//!
//! # Overview
//!
//! ```
//! use monetico::gateway::Monetico;
//! use monetico::request::{PaymentRequest, PaymentRequestConfig};
//! use rust_decimal::Decimal;
//! use time::macros::date;
//!
//! # fn main() -> Result<(), monetico::Error> {
//! let request = PaymentRequest::new(PaymentRequestConfig {
//!     reference: "ABCDEF123".into(),
//!     description: "Order 1234".into(),
//!     language: "FR".into(),
//!     email: "john@english.fr".into(),
//!     amount: Decimal::new(4242, 2),
//!     currency: "EUR".into(),
//!     date: date!(2019 - 01 - 01),
//!     success_url: "https://127.0.0.1/success".into(),
//!     error_url: "https://127.0.0.1/error".into(),
//! })?;
//!
//! let gateway = Monetico::new(
//!     "1234567",
//!     "0123456789012345678901234567890123456789",
//!     "acme",
//! )?;
//! let fields = gateway.payment_fields(&request);
//! assert!(fields.contains("MAC"));
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`error`] - Validation and sealing error taxonomy
//! - [`fields`] - Ordered form-field mapping
//! - [`gateway`] - Merchant credentials and one-call sealing
//! - [`request`] - Payment request construction and field assembly
//! - [`resources`] - Order-context value objects (client, addresses, cart)
//! - [`seal`] - Key derivation and seal computation
//! - [`validate`] - Eager validation rules
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod error;
pub mod fields;
pub mod gateway;
pub mod request;
pub mod resources;
pub mod seal;
pub mod validate;

pub use error::Error;
pub use fields::FieldSet;
pub use gateway::Monetico;
pub use request::{Commitment, PaymentRequest, PaymentRequestConfig, ThreeDSecureChallenge};
