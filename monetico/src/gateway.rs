//! Gateway credentials and the one-call sealing entry point.
//!
//! [`Monetico`] holds the merchant-side configuration handed out by the
//! gateway operator — EPT code, security key, company code — and turns a
//! [`PaymentRequest`] into the final form-ready field mapping in one call.

use std::fmt;

use crate::error::Error;
use crate::fields::FieldSet;
use crate::request::PaymentRequest;
use crate::seal::{self, USABLE_KEY_LENGTH};

/// Protocol version spoken with the gateway.
pub const SERVICE_VERSION: &str = "3.0";

/// Merchant credentials for the Monetico gateway.
///
/// The usable binary key is derived once at construction; the raw
/// security key is not retained.
#[derive(Clone)]
pub struct Monetico {
    ept_code: String,
    company_code: String,
    usable_key: [u8; USABLE_KEY_LENGTH],
}

impl Monetico {
    /// Creates a credential set from the values assigned by the gateway
    /// operator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] unless the security key is 40
    /// hexadecimal characters (modulo the gateway's trailing-character
    /// transform).
    pub fn new(
        ept_code: impl Into<String>,
        security_key: &str,
        company_code: impl Into<String>,
    ) -> Result<Self, Error> {
        Ok(Self {
            ept_code: ept_code.into(),
            company_code: company_code.into(),
            usable_key: seal::usable_key(security_key)?,
        })
    }

    /// The merchant terminal identifier.
    #[must_use]
    pub fn ept_code(&self) -> &str {
        &self.ept_code
    }

    /// The company code.
    #[must_use]
    pub fn company_code(&self) -> &str {
        &self.company_code
    }

    /// The derived binary key used for sealing.
    #[must_use]
    pub fn usable_key(&self) -> &[u8] {
        &self.usable_key
    }

    /// Assembles, seals and finalizes a payment request.
    ///
    /// Equivalent to `fields_to_array` + `generate_seal` +
    /// `generate_fields` with this credential set and
    /// [`SERVICE_VERSION`].
    #[must_use]
    pub fn payment_fields(&self, request: &PaymentRequest) -> FieldSet {
        let fields = request.fields_to_array(&self.ept_code, SERVICE_VERSION, &self.company_code);
        let seal = seal::generate(&self.usable_key, &fields);
        PaymentRequest::generate_fields(&seal, fields)
    }
}

// The derived key is secret material; keep it out of debug output.
impl fmt::Debug for Monetico {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monetico")
            .field("ept_code", &self.ept_code)
            .field("company_code", &self.company_code)
            .field("usable_key", &"*** redacted ***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECURITY_KEY: &str = "0123456789012345678901234567890123456789";

    #[test]
    fn test_rejects_malformed_security_key() {
        assert!(matches!(
            Monetico::new("1234567", "FOO", "acme"),
            Err(Error::InvalidKey { .. })
        ));
    }

    #[test]
    fn test_debug_redacts_key() {
        let gateway = Monetico::new("1234567", SECURITY_KEY, "acme").unwrap();
        let rendered = format!("{gateway:?}");
        assert!(rendered.contains("redacted"));
        assert!(!rendered.contains("0123456789"));
    }
}
