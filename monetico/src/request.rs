//! Payment request construction and field assembly.
//!
//! [`PaymentRequest`] holds the validated mandatory attributes, the
//! optional gateway options, the attached order-context resources and the
//! installment commitments. It exposes the two pipeline operations: field
//! assembly ([`PaymentRequest::fields_to_array`]) and seal generation
//! ([`PaymentRequest::generate_seal`]). Validation happens eagerly at
//! construction and in each setter; assembly and sealing assume validated
//! state and cannot fail.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as b64;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use time::Date;
use url::form_urlencoded;

use crate::error::Error;
use crate::fields::FieldSet;
use crate::resources::{BillingAddress, Cart, Client, ShippingAddress};
use crate::{seal, validate};

/// Production submission endpoint.
pub const PAYMENT_URL: &str = "https://p.monetico-services.com/paiement.cgi";

/// Test-mode submission endpoint.
pub const PAYMENT_TEST_URL: &str = "https://p.monetico-services.com/test/paiement.cgi";

/// Payment ways known to the gateway; unknown entries are silently
/// dropped by [`PaymentRequest::set_disabled_payment_ways`].
pub const PAYMENT_WAYS: &[&str] = &["1euro", "3xcb", "4xcb", "fivory", "paypal"];

/// Form field carrying the seal.
const MAC_FIELD: &str = "MAC";

/// Renders a date in the gateway's `DD/MM/YYYY` form.
fn gateway_date(date: Date) -> String {
    format!(
        "{:02}/{:02}/{:04}",
        date.day(),
        u8::from(date.month()),
        date.year()
    )
}

/// Renders an amount concatenated with its currency code.
///
/// The decimal is normalized first: the gateway seals over the exact
/// rendering, which never forces decimal places (`50` stays `50EUR`).
fn gateway_amount(amount: Decimal, currency: &str) -> String {
    format!("{}{currency}", amount.normalize())
}

/// Cardholder-authentication preference forwarded to the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ThreeDSecureChallenge {
    /// No preference expressed.
    NoPreference,
    /// Challenge preferred but not required.
    ChallengePreferred,
    /// Challenge required.
    ChallengeMandated,
    /// No challenge requested.
    NoChallengeRequested,
    /// No challenge requested; strong authentication already performed.
    NoChallengeRequestedStrongAuthentication,
    /// No challenge requested; trusted-beneficiary exemption.
    NoChallengeRequestedTrustedBeneficiary,
    /// No challenge requested; risk analysis already performed.
    NoChallengeRequestedRiskAnalysis,
}

impl ThreeDSecureChallenge {
    /// Returns the gateway wire value for this preference.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoPreference => "no_preference",
            Self::ChallengePreferred => "challenge_preferred",
            Self::ChallengeMandated => "challenge_mandated",
            Self::NoChallengeRequested => "no_challenge_requested",
            Self::NoChallengeRequestedStrongAuthentication => {
                "no_challenge_requested_strong_authentication"
            }
            Self::NoChallengeRequestedTrustedBeneficiary => {
                "no_challenge_requested_trusted_beneficiary"
            }
            Self::NoChallengeRequestedRiskAnalysis => "no_challenge_requested_risk_analysis",
        }
    }
}

impl FromStr for ThreeDSecureChallenge {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "no_preference" => Ok(Self::NoPreference),
            "challenge_preferred" => Ok(Self::ChallengePreferred),
            "challenge_mandated" => Ok(Self::ChallengeMandated),
            "no_challenge_requested" => Ok(Self::NoChallengeRequested),
            "no_challenge_requested_strong_authentication" => {
                Ok(Self::NoChallengeRequestedStrongAuthentication)
            }
            "no_challenge_requested_trusted_beneficiary" => {
                Ok(Self::NoChallengeRequestedTrustedBeneficiary)
            }
            "no_challenge_requested_risk_analysis" => Ok(Self::NoChallengeRequestedRiskAnalysis),
            other => Err(Error::InvalidThreeDSecureChallenge(other.to_owned())),
        }
    }
}

impl fmt::Display for ThreeDSecureChallenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One installment of a split payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commitment {
    date: Date,
    amount: Decimal,
}

impl Commitment {
    /// Creates a commitment from a typed date and amount.
    #[must_use]
    pub const fn new(date: Date, amount: Decimal) -> Self {
        Self { date, amount }
    }

    /// Creates a commitment from a gateway-format `DD/MM/YYYY` date.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDatetime`] if the date is not a real
    /// calendar date in gateway form.
    pub fn parse(date: &str, amount: Decimal) -> Result<Self, Error> {
        Ok(Self {
            date: validate::date(date)?,
            amount,
        })
    }

    /// The installment due date.
    #[must_use]
    pub const fn date(&self) -> Date {
        self.date
    }

    /// The installment amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }
}

/// Mandatory attributes of a payment request.
///
/// All fields are validated by [`PaymentRequest::new`]; an invalid config
/// yields no request object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequestConfig {
    /// Order reference, 3 to 19 alphanumeric characters.
    pub reference: String,
    /// Free-text order description, URL-escaped on assembly.
    pub description: String,
    /// ISO 639-1 language code in the gateway's supported set.
    pub language: String,
    /// Customer email address.
    pub email: String,
    /// Order amount, in major units of `currency`.
    pub amount: Decimal,
    /// ISO 4217 currency code in the gateway's accepted subset.
    pub currency: String,
    /// Order date.
    pub date: Date,
    /// Return URL on successful payment.
    pub success_url: String,
    /// Return URL on failed payment.
    pub error_url: String,
}

#[derive(Debug, Clone, Default)]
struct RequestOptions {
    card_alias: Option<String>,
    force_card: Option<bool>,
    disable_3ds: Option<bool>,
    sign_label: Option<String>,
    disabled_payment_ways: Option<String>,
    three_ds_challenge: Option<ThreeDSecureChallenge>,
}

/// A single transaction attempt, ready to be assembled and sealed.
///
/// Constructed once per attempt, optionally enriched through setters, then
/// consumed read-only by field assembly and seal generation.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    config: PaymentRequestConfig,
    commitments: Vec<Commitment>,
    options: RequestOptions,
    billing_address: Option<BillingAddress>,
    shipping_address: Option<ShippingAddress>,
    client: Option<Client>,
    cart: Option<Cart>,
}

impl PaymentRequest {
    /// Creates a request after validating every mandatory attribute.
    ///
    /// # Errors
    ///
    /// Returns the first failing validation rule: [`Error::InvalidReference`],
    /// [`Error::InvalidLanguage`], [`Error::InvalidCurrency`],
    /// [`Error::InvalidEmail`] or [`Error::InvalidUrl`].
    pub fn new(config: PaymentRequestConfig) -> Result<Self, Error> {
        validate::reference(&config.reference)?;
        validate::language(&config.language)?;
        validate::currency(&config.currency)?;
        validate::email(&config.email)?;
        validate::url(&config.success_url)?;
        validate::url(&config.error_url)?;

        Ok(Self {
            config,
            commitments: Vec::new(),
            options: RequestOptions::default(),
            billing_address: None,
            shipping_address: None,
            client: None,
            cart: None,
        })
    }

    /// Creates a request carrying installment commitments.
    ///
    /// # Errors
    ///
    /// Same rules as [`PaymentRequest::new`].
    pub fn with_commitments(
        config: PaymentRequestConfig,
        commitments: Vec<Commitment>,
    ) -> Result<Self, Error> {
        let mut request = Self::new(config)?;
        request.commitments = commitments;
        Ok(request)
    }

    /// Returns the submission endpoint for the given mode.
    #[must_use]
    pub const fn url(test_mode: bool) -> &'static str {
        if test_mode { PAYMENT_TEST_URL } else { PAYMENT_URL }
    }

    /// Pre-fills the card form with a registered card alias.
    pub fn set_card_alias(&mut self, alias: impl Into<String>) {
        self.options.card_alias = Some(alias.into());
    }

    /// Forces (or releases) manual card entry.
    pub fn set_force_card(&mut self, force: bool) {
        self.options.force_card = Some(force);
    }

    /// Disables (or re-enables) 3-D Secure for this request.
    pub fn set_disable_3ds(&mut self, disable: bool) {
        self.options.disable_3ds = Some(disable);
    }

    /// Sets the label shown on the cardholder's statement.
    pub fn set_sign_label(&mut self, label: impl Into<String>) {
        self.options.sign_label = Some(label.into());
    }

    /// Disables a set of payment ways for this request.
    ///
    /// Entries outside [`PAYMENT_WAYS`] are silently dropped; input order
    /// of the surviving entries is preserved. If nothing survives, the
    /// field is omitted from the assembled output entirely.
    pub fn set_disabled_payment_ways<I, S>(&mut self, ways: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let known: Vec<&str> = ways
            .into_iter()
            .filter_map(|way| PAYMENT_WAYS.iter().copied().find(|w| *w == way.as_ref()))
            .collect();
        self.options.disabled_payment_ways = if known.is_empty() {
            None
        } else {
            Some(known.join(","))
        };
    }

    /// Sets the 3-D Secure challenge preference from its wire value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidThreeDSecureChallenge`] for values outside
    /// the fixed preference set.
    pub fn set_three_d_secure_challenge(&mut self, challenge: &str) -> Result<(), Error> {
        self.options.three_ds_challenge = Some(challenge.parse()?);
        Ok(())
    }

    /// Attaches the billing address, replacing any previous one.
    pub fn set_billing_address(&mut self, address: BillingAddress) {
        self.billing_address = Some(address);
    }

    /// Attaches the shipping address, replacing any previous one.
    pub fn set_shipping_address(&mut self, address: ShippingAddress) {
        self.shipping_address = Some(address);
    }

    /// Attaches the client context, replacing any previous one.
    pub fn set_client(&mut self, client: Client) {
        self.client = Some(client);
    }

    /// Attaches the cart, replacing any previous one.
    pub fn set_cart(&mut self, cart: Cart) {
        self.cart = Some(cart);
    }

    /// Returns the attached billing address, if any.
    #[must_use]
    pub fn billing_address(&self) -> Option<&BillingAddress> {
        self.billing_address.as_ref()
    }

    /// Returns the attached shipping address, if any.
    #[must_use]
    pub fn shipping_address(&self) -> Option<&ShippingAddress> {
        self.shipping_address.as_ref()
    }

    /// Returns the attached client context, if any.
    #[must_use]
    pub fn client(&self) -> Option<&Client> {
        self.client.as_ref()
    }

    /// Returns the attached cart, if any.
    #[must_use]
    pub fn cart(&self) -> Option<&Cart> {
        self.cart.as_ref()
    }

    /// Returns the installment commitments.
    #[must_use]
    pub fn commitments(&self) -> &[Commitment] {
        &self.commitments
    }

    /// The base64 JSON order context, one section per attached resource.
    ///
    /// `None` when no resource is attached, in which case the field is
    /// omitted from the assembled output.
    fn order_context(&self) -> Option<String> {
        let mut context = Map::new();
        if let Some(billing) = &self.billing_address {
            context.insert("billing".to_owned(), billing.to_json());
        }
        if let Some(shipping) = &self.shipping_address {
            context.insert("shipping".to_owned(), shipping.to_json());
        }
        if let Some(client) = &self.client {
            context.insert("client".to_owned(), client.to_json());
        }
        if let Some(cart) = &self.cart {
            context.insert("shoppingCart".to_owned(), cart.to_json());
        }
        if context.is_empty() {
            return None;
        }
        Some(b64.encode(Value::Object(context).to_string()))
    }

    /// Assembles the ordered field mapping consumed by both the seal and
    /// the outbound form.
    ///
    /// Mandatory fields come first in the gateway's documented order, then
    /// the options that were set, then the commitment fields. The order
    /// carries no cryptographic meaning — the seal re-sorts — but the
    /// names must match the gateway's form contract exactly.
    #[cfg_attr(feature = "telemetry", tracing::instrument(level = "debug", skip_all))]
    #[must_use]
    pub fn fields_to_array(&self, ept_code: &str, version: &str, company_code: &str) -> FieldSet {
        let mut fields = FieldSet::with_capacity(16);

        fields.insert("TPE", ept_code);
        fields.insert("societe", company_code);
        fields.insert("date", gateway_date(self.config.date));
        fields.insert(
            "montant",
            gateway_amount(self.config.amount, &self.config.currency),
        );
        fields.insert("reference", self.config.reference.as_str());
        fields.insert(
            "texte-libre",
            form_urlencoded::byte_serialize(self.config.description.as_bytes())
                .collect::<String>(),
        );
        fields.insert("lgue", self.config.language.as_str());
        fields.insert("mail", self.config.email.as_str());
        if let Some(context) = self.order_context() {
            fields.insert("contexte_commande", context);
        }
        fields.insert("url_retour_ok", self.config.success_url.as_str());
        fields.insert("url_retour_err", self.config.error_url.as_str());
        fields.insert("version", version);

        if let Some(alias) = &self.options.card_alias {
            fields.insert("aliascb", alias.as_str());
        }
        if let Some(force) = self.options.force_card {
            fields.insert("forcesaisiecb", flag(force));
        }
        if let Some(disable) = self.options.disable_3ds {
            fields.insert("3dsdebrayable", flag(disable));
        }
        if let Some(label) = &self.options.sign_label {
            fields.insert("libelleMonetique", label.as_str());
        }
        if let Some(ways) = &self.options.disabled_payment_ways {
            fields.insert("desactivemoyenpaiement", ways.as_str());
        }
        if let Some(challenge) = self.options.three_ds_challenge {
            fields.insert("ThreeDSecureChallenge", challenge.as_str());
        }

        if !self.commitments.is_empty() {
            fields.insert("nbrech", self.commitments.len().to_string());
            for (index, commitment) in self.commitments.iter().enumerate() {
                let rank = index + 1;
                fields.insert(format!("dateech{rank}"), gateway_date(commitment.date));
                fields.insert(
                    format!("montantech{rank}"),
                    gateway_amount(commitment.amount, &self.config.currency),
                );
            }
        }

        fields
    }

    /// Computes the seal over an assembled field mapping.
    ///
    /// Pure in the derived key and the mapping contents; delegates to
    /// [`seal::generate`].
    #[must_use]
    pub fn generate_seal(usable_key: &[u8], fields: &FieldSet) -> String {
        seal::generate(usable_key, fields)
    }

    /// Merges a computed seal into the field mapping under its designated
    /// name, yielding the final form-ready mapping.
    #[must_use]
    pub fn generate_fields(seal: &str, mut fields: FieldSet) -> FieldSet {
        fields.insert(MAC_FIELD, seal);
        fields
    }
}

const fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}
