//! Validation rules for payment request attributes.
//!
//! Each rule is a pure predicate over a candidate value: it either accepts
//! the value unchanged or fails with the [`Error`] variant naming the
//! offending input. Rules run at assignment time (constructor or setter),
//! never at serialization time.

use std::sync::LazyLock;

use regex::Regex;
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use url::Url;

use crate::error::Error;

/// Language codes (ISO 639-1, upper-case) accepted by the gateway.
pub const LANGUAGES: &[&str] = &["DE", "EN", "ES", "FR", "IT", "JA", "NL", "PT", "SV"];

/// ISO 4217 currency codes accepted by the gateway.
pub const CURRENCIES: &[&str] = &["EUR", "CHF", "GBP", "USD", "CAD", "JPY"];

/// Date rendering used across the gateway's form fields.
pub(crate) const GATEWAY_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[day]/[month]/[year]");

static REFERENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{3,19}$").expect("valid reference pattern"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern"));

/// Checks that an order reference is 3 to 19 alphanumeric characters.
///
/// # Errors
///
/// Returns [`Error::InvalidReference`] otherwise.
pub fn reference(value: &str) -> Result<(), Error> {
    if REFERENCE_RE.is_match(value) {
        Ok(())
    } else {
        Err(Error::InvalidReference(value.to_owned()))
    }
}

/// Checks that a language code is in the gateway's supported set.
///
/// # Errors
///
/// Returns [`Error::InvalidLanguage`] otherwise.
pub fn language(value: &str) -> Result<(), Error> {
    if LANGUAGES.contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidLanguage(value.to_owned()))
    }
}

/// Checks that a currency code is in the gateway's accepted ISO 4217 subset.
///
/// # Errors
///
/// Returns [`Error::InvalidCurrency`] otherwise.
pub fn currency(value: &str) -> Result<(), Error> {
    if CURRENCIES.contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidCurrency(value.to_owned()))
    }
}

/// Parses a gateway-format `DD/MM/YYYY` date.
///
/// Rejects anything that is not a real calendar date (`31/02/2019`,
/// bare numbers, arbitrary strings).
///
/// # Errors
///
/// Returns [`Error::InvalidDatetime`] on malformed input.
pub fn date(value: &str) -> Result<Date, Error> {
    Date::parse(value, GATEWAY_DATE_FORMAT).map_err(|_| Error::InvalidDatetime(value.to_owned()))
}

/// Checks that an email address is syntactically valid.
///
/// # Errors
///
/// Returns [`Error::InvalidEmail`] otherwise.
pub fn email(value: &str) -> Result<(), Error> {
    if EMAIL_RE.is_match(value) {
        Ok(())
    } else {
        Err(Error::InvalidEmail(value.to_owned()))
    }
}

/// Checks that a return URL parses and uses an http(s) scheme.
///
/// # Errors
///
/// Returns [`Error::InvalidUrl`] otherwise.
pub fn url(value: &str) -> Result<(), Error> {
    let parsed = Url::parse(value).map_err(|_| Error::InvalidUrl(value.to_owned()))?;
    if matches!(parsed.scheme(), "http" | "https") {
        Ok(())
    } else {
        Err(Error::InvalidUrl(value.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_accepts_alphanumeric() {
        assert!(reference("ABCDEF123").is_ok());
        assert!(reference("abc").is_ok());
        assert!(reference("1234567890123456789").is_ok());
    }

    #[test]
    fn test_reference_rejects_out_of_shape_values() {
        assert!(matches!(
            reference("thisisabigerroryouknow"),
            Err(Error::InvalidReference(_))
        ));
        assert!(matches!(reference("ab"), Err(Error::InvalidReference(_))));
        assert!(matches!(
            reference("ABC-123"),
            Err(Error::InvalidReference(_))
        ));
        assert!(matches!(reference(""), Err(Error::InvalidReference(_))));
    }

    #[test]
    fn test_language_set() {
        assert!(language("FR").is_ok());
        assert!(language("EN").is_ok());
        assert!(matches!(language("WTF"), Err(Error::InvalidLanguage(_))));
        assert!(matches!(language("fr"), Err(Error::InvalidLanguage(_))));
    }

    #[test]
    fn test_currency_set() {
        assert!(currency("EUR").is_ok());
        assert!(matches!(currency("XXX"), Err(Error::InvalidCurrency(_))));
    }

    #[test]
    fn test_date_parses_gateway_format() {
        let parsed = date("06/01/2019").unwrap();
        assert_eq!(parsed.day(), 6);
        assert_eq!(u8::from(parsed.month()), 1);
        assert_eq!(parsed.year(), 2019);
    }

    #[test]
    fn test_date_rejects_non_dates() {
        assert!(matches!(date("42"), Err(Error::InvalidDatetime(_))));
        assert!(matches!(date("31/02/2019"), Err(Error::InvalidDatetime(_))));
        assert!(matches!(date("2019-01-06"), Err(Error::InvalidDatetime(_))));
        assert!(matches!(date(""), Err(Error::InvalidDatetime(_))));
    }

    #[test]
    fn test_email_shape() {
        assert!(email("john@english.fr").is_ok());
        assert!(matches!(email("john"), Err(Error::InvalidEmail(_))));
        assert!(matches!(email("john@"), Err(Error::InvalidEmail(_))));
        assert!(matches!(
            email("jo hn@english.fr"),
            Err(Error::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_url_scheme() {
        assert!(url("https://127.0.0.1/success").is_ok());
        assert!(url("http://shop.example.com/back").is_ok());
        assert!(matches!(
            url("ftp://127.0.0.1/success"),
            Err(Error::InvalidUrl(_))
        ));
        assert!(matches!(url("not a url"), Err(Error::InvalidUrl(_))));
    }
}
