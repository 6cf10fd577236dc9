//! Placement models: where on the storefront a badge group is rendered.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Group id of the built-in checkout group.
pub const CHECKOUT_GROUP_ID: &str = "checkout";
/// Group id of the built-in product page group.
pub const PRODUCT_PAGE_GROUP_ID: &str = "product_page";
/// Group id of the built-in footer group.
pub const FOOTER_GROUP_ID: &str = "footer";

/// External e-commerce integration a group or placement depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequiredPlugin {
    Woocommerce,
    Edd,
}

impl RequiredPlugin {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredPlugin::Woocommerce => "woocommerce",
            RequiredPlugin::Edd => "edd",
        }
    }
}

impl FromStr for RequiredPlugin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "woocommerce" => Ok(RequiredPlugin::Woocommerce),
            "edd" => Ok(RequiredPlugin::Edd),
            _ => Err(format!("Invalid required plugin: {}", s)),
        }
    }
}

impl fmt::Display for RequiredPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which integrations are currently active on the host site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveIntegrations {
    pub woocommerce: bool,
    pub edd: bool,
}

impl ActiveIntegrations {
    pub fn is_active(&self, plugin: RequiredPlugin) -> bool {
        match plugin {
            RequiredPlugin::Woocommerce => self.woocommerce,
            RequiredPlugin::Edd => self.edd,
        }
    }
}

/// The placement a badge group renders at, derived from its id.
///
/// Placement-specific behaviour (position wrapper, placement flags) is only
/// ever read through a match on this tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Placement {
    Checkout,
    ProductPage,
    Footer,
    /// A user-created group rendered by explicit embed.
    Custom(String),
}

impl Placement {
    pub fn from_group_id(id: &str) -> Self {
        match id {
            CHECKOUT_GROUP_ID => Placement::Checkout,
            PRODUCT_PAGE_GROUP_ID => Placement::ProductPage,
            FOOTER_GROUP_ID => Placement::Footer,
            other => Placement::Custom(other.to_string()),
        }
    }

    pub fn group_id(&self) -> &str {
        match self {
            Placement::Checkout => CHECKOUT_GROUP_ID,
            Placement::ProductPage => PRODUCT_PAGE_GROUP_ID,
            Placement::Footer => FOOTER_GROUP_ID,
            Placement::Custom(id) => id,
        }
    }

    /// Returns true for the three built-in placements.
    pub fn is_builtin(&self) -> bool {
        !matches!(self, Placement::Custom(_))
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.group_id())
    }
}

/// A page-lifecycle signal fired by the host storefront.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlacementSignal {
    /// WooCommerce: after the add-to-cart button.
    ShowAfterAddToCart,
    /// EDD: end of the purchase link.
    EddPurchaseLinkEnd,
    /// WooCommerce: before the checkout order review.
    CheckoutBeforeOrderReview,
    /// EDD: before the checkout purchase form.
    EddCheckoutBeforePurchaseForm,
    /// Anything else, including the site footer.
    Other(String),
}

impl PlacementSignal {
    pub fn parse(name: &str) -> Self {
        match name {
            "showAfterAddToCart" => PlacementSignal::ShowAfterAddToCart,
            "eddPurchaseLinkEnd" => PlacementSignal::EddPurchaseLinkEnd,
            "checkoutBeforeOrderReview" => PlacementSignal::CheckoutBeforeOrderReview,
            "eddCheckoutBeforePurchaseForm" => PlacementSignal::EddCheckoutBeforePurchaseForm,
            other => PlacementSignal::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            PlacementSignal::ShowAfterAddToCart => "showAfterAddToCart",
            PlacementSignal::EddPurchaseLinkEnd => "eddPurchaseLinkEnd",
            PlacementSignal::CheckoutBeforeOrderReview => "checkoutBeforeOrderReview",
            PlacementSignal::EddCheckoutBeforePurchaseForm => "eddCheckoutBeforePurchaseForm",
            PlacementSignal::Other(name) => name,
        }
    }

    /// The integration whose hook fires this signal, if any.
    pub fn integration(&self) -> Option<RequiredPlugin> {
        match self {
            PlacementSignal::ShowAfterAddToCart | PlacementSignal::CheckoutBeforeOrderReview => {
                Some(RequiredPlugin::Woocommerce)
            }
            PlacementSignal::EddPurchaseLinkEnd | PlacementSignal::EddCheckoutBeforePurchaseForm => {
                Some(RequiredPlugin::Edd)
            }
            PlacementSignal::Other(_) => None,
        }
    }
}

impl fmt::Display for PlacementSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
