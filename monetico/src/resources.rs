//! Order-context value objects attached to a payment request.
//!
//! Each resource holds optional named parameters restricted to its own
//! whitelist (the gateway's DSP2 order-context fields). Setting a name
//! outside the whitelist fails with [`Error::UnknownParameter`]; reading
//! an unset name yields the empty string. The attached resources are
//! serialized into the request's `contexte_commande` field, one JSON
//! section per resource, with unset parameters skipped.

use std::num::NonZeroU32;

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::error::Error;

/// Parameters shared by the billing and shipping address resources.
pub const ADDRESS_PARAMETERS: &[&str] = &[
    "name",
    "firstName",
    "lastName",
    "middleName",
    "address",
    "addressLine1",
    "addressLine2",
    "addressLine3",
    "city",
    "postalCode",
    "country",
    "stateOrProvince",
    "countrySubdivision",
    "email",
    "phone",
    "mobilePhone",
];

/// Parameters accepted by the client resource.
pub const CLIENT_PARAMETERS: &[&str] = &[
    "civility",
    "name",
    "firstName",
    "lastName",
    "middleName",
    "birthLastName",
    "birthCity",
    "birthPostalCode",
    "birthCountry",
    "birthdate",
    "email",
    "phone",
    "nationalIDNumber",
    "accountAge",
    "lastYearTransactions",
    "last24HoursTransactions",
    "addCardNbLast24Hours",
    "last6MonthsPurchase",
    "lastPasswordChange",
    "lastAccountModification",
    "suspiciousAccountActivity",
    "authenticationMethod",
    "authenticationTimestamp",
    "priorAuthenticationMethod",
    "priorAuthenticationTimestamp",
    "paymentMeanAge",
];

/// Parameters accepted by the cart resource, besides its item list.
pub const CART_PARAMETERS: &[&str] = &[
    "giftCardAmount",
    "giftCardCount",
    "giftCardCurrency",
    "preOrderDate",
    "preOrderIndicator",
    "reorderIndicator",
];

/// Parameters accepted by a cart item, besides unit price and quantity.
pub const CART_ITEM_PARAMETERS: &[&str] = &[
    "name",
    "description",
    "productCode",
    "imageUrl",
    "unitPrice",
    "quantity",
    "productSKU",
    "productRisk",
];

/// Whitelist-restricted parameter storage shared by every resource.
///
/// Values are kept in insertion order; setting an existing name replaces
/// its value in place.
#[derive(Debug, Clone)]
struct ParameterBag {
    resource: &'static str,
    allowed: &'static [&'static str],
    values: Vec<(&'static str, String)>,
}

impl ParameterBag {
    const fn new(resource: &'static str, allowed: &'static [&'static str]) -> Self {
        Self {
            resource,
            allowed,
            values: Vec::new(),
        }
    }

    fn set(&mut self, name: &str, value: impl ToString) -> Result<(), Error> {
        let canonical = self
            .allowed
            .iter()
            .copied()
            .find(|allowed| *allowed == name)
            .ok_or_else(|| Error::UnknownParameter {
                resource: self.resource,
                name: name.to_owned(),
            })?;
        let value = value.to_string();
        if let Some(entry) = self.values.iter_mut().find(|(n, _)| *n == canonical) {
            entry.1 = value;
        } else {
            self.values.push((canonical, value));
        }
        Ok(())
    }

    fn get(&self, name: &str) -> &str {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map_or("", |(_, v)| v.as_str())
    }

    /// JSON fragment with only the parameters that were set, in whitelist
    /// order.
    fn to_json(&self) -> Map<String, Value> {
        let mut fragment = Map::new();
        for name in self.allowed {
            let value = self.get(name);
            if !value.is_empty() {
                fragment.insert((*name).to_owned(), Value::String(value.to_owned()));
            }
        }
        fragment
    }
}

/// Cardholder identity and account-history context.
#[derive(Debug, Clone)]
pub struct Client {
    params: ParameterBag,
}

impl Client {
    /// Creates an empty client resource.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            params: ParameterBag::new("client", CLIENT_PARAMETERS),
        }
    }

    /// Sets a whitelisted parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownParameter`] for names outside
    /// [`CLIENT_PARAMETERS`].
    pub fn set_parameter(&mut self, name: &str, value: impl ToString) -> Result<(), Error> {
        self.params.set(name, value)
    }

    /// Returns the stored value, or the empty string if unset.
    #[must_use]
    pub fn parameter(&self, name: &str) -> &str {
        self.params.get(name)
    }

    pub(crate) fn to_json(&self) -> Value {
        Value::Object(self.params.to_json())
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

fn address_bag(
    resource: &'static str,
    address_line1: impl ToString,
    city: impl ToString,
    postal_code: impl ToString,
    country: impl ToString,
) -> ParameterBag {
    let mut params = ParameterBag::new(resource, ADDRESS_PARAMETERS);
    // The four constructor fields are whitelisted, so these cannot fail.
    let _ = params.set("addressLine1", address_line1);
    let _ = params.set("city", city);
    let _ = params.set("postalCode", postal_code);
    let _ = params.set("country", country);
    params
}

/// Billing address context.
#[derive(Debug, Clone)]
pub struct BillingAddress {
    params: ParameterBag,
}

impl BillingAddress {
    /// Creates a billing address from its four mandatory components.
    #[must_use]
    pub fn new(
        address_line1: impl ToString,
        city: impl ToString,
        postal_code: impl ToString,
        country: impl ToString,
    ) -> Self {
        Self {
            params: address_bag("billing address", address_line1, city, postal_code, country),
        }
    }

    /// Sets a whitelisted parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownParameter`] for names outside
    /// [`ADDRESS_PARAMETERS`].
    pub fn set_parameter(&mut self, name: &str, value: impl ToString) -> Result<(), Error> {
        self.params.set(name, value)
    }

    /// Returns the stored value, or the empty string if unset.
    #[must_use]
    pub fn parameter(&self, name: &str) -> &str {
        self.params.get(name)
    }

    pub(crate) fn to_json(&self) -> Value {
        Value::Object(self.params.to_json())
    }
}

/// Shipping address context.
#[derive(Debug, Clone)]
pub struct ShippingAddress {
    params: ParameterBag,
}

impl ShippingAddress {
    /// Creates a shipping address from its four mandatory components.
    #[must_use]
    pub fn new(
        address_line1: impl ToString,
        city: impl ToString,
        postal_code: impl ToString,
        country: impl ToString,
    ) -> Self {
        Self {
            params: address_bag(
                "shipping address",
                address_line1,
                city,
                postal_code,
                country,
            ),
        }
    }

    /// Sets a whitelisted parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownParameter`] for names outside
    /// [`ADDRESS_PARAMETERS`].
    pub fn set_parameter(&mut self, name: &str, value: impl ToString) -> Result<(), Error> {
        self.params.set(name, value)
    }

    /// Returns the stored value, or the empty string if unset.
    #[must_use]
    pub fn parameter(&self, name: &str) -> &str {
        self.params.get(name)
    }

    pub(crate) fn to_json(&self) -> Value {
        Value::Object(self.params.to_json())
    }
}

/// One article of the shopping cart.
///
/// Unit price and quantity are mandatory at construction; a zero quantity
/// is unrepresentable by type.
#[derive(Debug, Clone)]
pub struct CartItem {
    params: ParameterBag,
}

impl CartItem {
    /// Creates a cart item from its unit price and quantity.
    #[must_use]
    pub fn new(unit_price: Decimal, quantity: NonZeroU32) -> Self {
        let mut params = ParameterBag::new("cart item", CART_ITEM_PARAMETERS);
        let _ = params.set("unitPrice", unit_price.normalize());
        let _ = params.set("quantity", quantity);
        Self { params }
    }

    /// Sets a whitelisted descriptive parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownParameter`] for names outside
    /// [`CART_ITEM_PARAMETERS`].
    pub fn set_parameter(&mut self, name: &str, value: impl ToString) -> Result<(), Error> {
        self.params.set(name, value)
    }

    /// Returns the stored value, or the empty string if unset.
    #[must_use]
    pub fn parameter(&self, name: &str) -> &str {
        self.params.get(name)
    }

    pub(crate) fn to_json(&self) -> Value {
        Value::Object(self.params.to_json())
    }
}

/// Shopping cart context: an ordered item list plus cart-level parameters.
#[derive(Debug, Clone)]
pub struct Cart {
    params: ParameterBag,
    items: Vec<CartItem>,
}

impl Cart {
    /// Creates an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            params: ParameterBag::new("cart", CART_PARAMETERS),
            items: Vec::new(),
        }
    }

    /// Appends an item to the cart.
    pub fn add_item(&mut self, item: CartItem) {
        self.items.push(item);
    }

    /// Returns the cart items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Sets a whitelisted cart-level parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownParameter`] for names outside
    /// [`CART_PARAMETERS`].
    pub fn set_parameter(&mut self, name: &str, value: impl ToString) -> Result<(), Error> {
        self.params.set(name, value)
    }

    /// Returns the stored value, or the empty string if unset.
    #[must_use]
    pub fn parameter(&self, name: &str) -> &str {
        self.params.get(name)
    }

    pub(crate) fn to_json(&self) -> Value {
        let mut fragment = self.params.to_json();
        if !self.items.is_empty() {
            let items: Vec<Value> = self.items.iter().map(CartItem::to_json).collect();
            fragment.insert("shoppingCartItems".to_owned(), Value::Array(items));
        }
        Value::Object(fragment)
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_address_constructor_fills_mandatory_parameters() {
        let address = BillingAddress::new("7 rue melingue", "Caen", "14000", "France");
        assert_eq!(address.parameter("addressLine1"), "7 rue melingue");
        assert_eq!(address.parameter("city"), "Caen");
        assert_eq!(address.parameter("postalCode"), "14000");
        assert_eq!(address.parameter("country"), "France");
    }

    #[test]
    fn test_unset_parameter_defaults_to_empty() {
        let address = ShippingAddress::new("7 rue melingue", "Caen", "14000", "France");
        assert_eq!(address.parameter("email"), "");
    }

    #[test]
    fn test_unknown_parameter_is_rejected() {
        let mut client = Client::new();
        let err = client.set_parameter("shoeSize", 43).unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownParameter {
                resource: "client",
                ..
            }
        ));

        let mut cart = Cart::new();
        assert!(matches!(
            cart.set_parameter("discount", "10"),
            Err(Error::UnknownParameter { .. })
        ));
    }

    #[test]
    fn test_set_parameter_replaces_value() {
        let mut client = Client::new();
        client.set_parameter("firstName", "Foo").unwrap();
        client.set_parameter("firstName", "Bar").unwrap();
        assert_eq!(client.parameter("firstName"), "Bar");
    }

    #[test]
    fn test_cart_item_carries_price_and_quantity() {
        let quantity = NonZeroU32::new(2).unwrap();
        let mut item = CartItem::new(dec!(10.00), quantity);
        item.set_parameter("name", "Pen").unwrap();

        assert_eq!(item.parameter("unitPrice"), "10");
        assert_eq!(item.parameter("quantity"), "2");
        assert_eq!(item.parameter("name"), "Pen");
    }

    #[test]
    fn test_cart_json_nests_items() {
        let mut cart = Cart::new();
        let mut item = CartItem::new(dec!(10), NonZeroU32::new(2).unwrap());
        item.set_parameter("name", "Pen").unwrap();
        cart.add_item(item);

        let json = cart.to_json();
        let items = json.get("shoppingCartItems").unwrap().as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].get("name").unwrap(), "Pen");
        assert_eq!(items[0].get("unitPrice").unwrap(), "10");
    }

    #[test]
    fn test_json_skips_unset_parameters() {
        let mut client = Client::new();
        client.set_parameter("civility", "MR").unwrap();
        let json = client.to_json();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert!(object.contains_key("civility"));
    }
}
