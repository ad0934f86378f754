//! Error types for Monetico payment request construction.
//!
//! Every validation rule fails eagerly at the point a value is set
//! (constructor or setter); a failed construction yields no usable
//! request. Variants carry the offending value so callers can report
//! exactly what was rejected — except [`Error::InvalidKey`], which never
//! echoes the secret.

/// Errors raised while building or sealing a payment request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The order reference is not 3 to 19 alphanumeric characters.
    #[error("reference `{0}` must be 3 to 19 alphanumeric characters")]
    InvalidReference(String),

    /// The language code is outside the gateway's supported set.
    #[error("language `{0}` is not supported by the gateway")]
    InvalidLanguage(String),

    /// The currency code is outside the gateway's accepted ISO 4217 subset.
    #[error("currency `{0}` is not accepted by the gateway")]
    InvalidCurrency(String),

    /// The value is not a real calendar date in `DD/MM/YYYY` form.
    #[error("`{0}` is not a valid gateway date")]
    InvalidDatetime(String),

    /// The email address is syntactically invalid.
    #[error("`{0}` is not a valid email address")]
    InvalidEmail(String),

    /// The URL is malformed or uses a scheme other than http/https.
    #[error("`{0}` is not a valid http(s) URL")]
    InvalidUrl(String),

    /// The 3-D Secure challenge preference is not one of the fixed set.
    #[error("`{0}` is not a recognized 3-D Secure challenge preference")]
    InvalidThreeDSecureChallenge(String),

    /// The parameter name is not in the target resource's whitelist.
    #[error("parameter `{name}` is not accepted by the {resource} resource")]
    UnknownParameter {
        /// The resource that rejected the parameter.
        resource: &'static str,
        /// The rejected parameter name.
        name: String,
    },

    /// The security key is not 40 hexadecimal characters.
    #[error("security key must be {expected} hexadecimal characters")]
    InvalidKey {
        /// Required security key length, in hex characters.
        expected: usize,
    },
}
