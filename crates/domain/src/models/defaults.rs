//! Seed definitions for the three built-in badge groups.

use serde_json::{json, Value};

use super::badge_group::NewBadgeGroup;
use super::placement::{CHECKOUT_GROUP_ID, FOOTER_GROUP_ID, PRODUCT_PAGE_GROUP_ID};

/// Ids of the groups that must always exist.
pub const DEFAULT_GROUP_IDS: [&str; 3] = [CHECKOUT_GROUP_ID, PRODUCT_PAGE_GROUP_ID, FOOTER_GROUP_ID];

/// Returns true if `id` names one of the built-in groups.
pub fn is_default_group_id(id: &str) -> bool {
    DEFAULT_GROUP_IDS.contains(&id)
}

fn base_settings(selected_badges: &[&str]) -> Value {
    json!({
        "showHeader": true,
        "headerText": "Secure Checkout With",
        "fontSize": "18",
        "alignment": "center",
        "badgeAlignment": "center",
        "badgeStyle": "original",
        "badgeSizeDesktop": "small",
        "badgeSizeMobile": "small",
        "badgeColor": "#0066FF",
        "textColor": "#000000",
        "customMargin": false,
        "marginTop": "0",
        "marginRight": "0",
        "marginBottom": "0",
        "marginLeft": "0",
        "animation": "fade",
        "position": "center",
        "selectedBadges": selected_badges,
        "badgePadding": "5",
        "badgeGap": "10",
        "containerMargin": "15",
        "borderRadius": "4",
        "hoverTransform": "translateY(-2px)",
        "transition": "all 0.3s ease"
    })
}

fn with_flags(mut settings: Value, flags: &[&str]) -> Value {
    if let Value::Object(map) = &mut settings {
        for flag in flags {
            map.insert((*flag).to_string(), Value::Bool(true));
        }
    }
    settings
}

fn seed(id: &str, name: &str, settings: Value) -> NewBadgeGroup {
    NewBadgeGroup {
        id: id.to_string(),
        name: name.to_string(),
        is_default: true,
        is_active: true,
        required_plugin: None,
        settings,
    }
}

/// The canonical seed rows, in creation order.
pub fn default_groups() -> Vec<NewBadgeGroup> {
    vec![
        seed(
            CHECKOUT_GROUP_ID,
            "Checkout",
            with_flags(
                base_settings(&[
                    "mastercardcolor",
                    "visa1color",
                    "paypal1color",
                    "applepaycolor",
                    "stripecolor",
                    "amazonpay2color",
                    "americanexpress1color",
                ]),
                &["checkoutBeforeOrderReview", "eddCheckoutBeforePurchaseForm"],
            ),
        ),
        seed(
            PRODUCT_PAGE_GROUP_ID,
            "Product Page",
            with_flags(
                base_settings(&["mastercardcolor", "visa1color", "paypal1color"]),
                &["showAfterAddToCart", "eddPurchaseLinkEnd"],
            ),
        ),
        seed(
            FOOTER_GROUP_ID,
            "Footer",
            base_settings(&["mastercardcolor", "visa1color", "paypal1color"]),
        ),
    ]
}
