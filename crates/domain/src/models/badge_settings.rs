//! Badge settings: the styling and placement bag carried by every badge group.
//!
//! Settings are persisted as JSON text written by the admin UI, so parsing is
//! lenient: an unrecognised enum value or a mistyped field becomes "absent"
//! and is filled from the defaults in [`BadgeSettings::resolve`] instead of
//! failing the whole document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shared::validation::{is_hex_color, parse_px};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::placement::PlacementSignal;

pub const DEFAULT_HEADER_TEXT: &str = "Secure Checkout With";
pub const DEFAULT_FONT_SIZE: i64 = 18;
pub const DEFAULT_BADGE_COLOR: &str = "#0066FF";
pub const DEFAULT_TEXT_COLOR: &str = "#000000";
pub const DEFAULT_BADGE_PADDING: i64 = 5;
pub const DEFAULT_BADGE_GAP: i64 = 10;
pub const DEFAULT_CONTAINER_MARGIN: i64 = 15;
pub const DEFAULT_BORDER_RADIUS: i64 = 4;
pub const DEFAULT_HOVER_TRANSFORM: &str = "translateY(-2px)";
pub const DEFAULT_TRANSITION: &str = "all 0.3s ease";

/// Horizontal alignment used for header text, badge rows and the footer position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

impl Alignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }

    /// CSS `justify-content` value for a flex row.
    pub fn justify_content(&self) -> &'static str {
        match self {
            Alignment::Left => "flex-start",
            Alignment::Center => "center",
            Alignment::Right => "flex-end",
        }
    }
}

impl FromStr for Alignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "left" => Ok(Alignment::Left),
            "center" => Ok(Alignment::Center),
            "right" => Ok(Alignment::Right),
            _ => Err(format!("Invalid alignment: {}", s)),
        }
    }
}


/// Visual treatment of each badge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BadgeStyle {
    #[default]
    Original,
    Card,
    Mono,
    MonoCard,
}

impl BadgeStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeStyle::Original => "original",
            BadgeStyle::Card => "card",
            BadgeStyle::Mono => "mono",
            BadgeStyle::MonoCard => "mono-card",
        }
    }

    /// Mono styles render a colour-filled mask instead of the image.
    pub fn is_mono(&self) -> bool {
        matches!(self, BadgeStyle::Mono | BadgeStyle::MonoCard)
    }

    pub fn is_card(&self) -> bool {
        matches!(self, BadgeStyle::Card | BadgeStyle::MonoCard)
    }
}

impl FromStr for BadgeStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "original" => Ok(BadgeStyle::Original),
            "card" => Ok(BadgeStyle::Card),
            "mono" => Ok(BadgeStyle::Mono),
            "mono-card" => Ok(BadgeStyle::MonoCard),
            _ => Err(format!("Invalid badge style: {}", s)),
        }
    }
}

/// Named badge size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BadgeSize {
    ExtraSmall,
    #[default]
    Small,
    Medium,
    Large,
}

impl BadgeSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeSize::ExtraSmall => "extra-small",
            BadgeSize::Small => "small",
            BadgeSize::Medium => "medium",
            BadgeSize::Large => "large",
        }
    }

    pub fn px(&self) -> u32 {
        match self {
            BadgeSize::ExtraSmall => 32,
            BadgeSize::Small => 48,
            BadgeSize::Medium => 64,
            BadgeSize::Large => 80,
        }
    }
}

impl FromStr for BadgeSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "extra-small" => Ok(BadgeSize::ExtraSmall),
            "small" => Ok(BadgeSize::Small),
            "medium" => Ok(BadgeSize::Medium),
            "large" => Ok(BadgeSize::Large),
            _ => Err(format!("Invalid badge size: {}", s)),
        }
    }
}


/// Entrance animation applied to each badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Animation {
    Fade,
    Slide,
    Scale,
    Bounce,
}

impl Animation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Animation::Fade => "fade",
            Animation::Slide => "slide",
            Animation::Scale => "scale",
            Animation::Bounce => "bounce",
        }
    }
}

impl FromStr for Animation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fade" => Ok(Animation::Fade),
            "slide" => Ok(Animation::Slide),
            "scale" => Ok(Animation::Scale),
            "bounce" => Ok(Animation::Bounce),
            _ => Err(format!("Invalid animation: {}", s)),
        }
    }
}

impl fmt::Display for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lenient field deserializers. Every one of them yields `None` on a value
/// it cannot interpret rather than an error.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use std::str::FromStr;

    pub fn parsed<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(s)) => s.parse().ok(),
            _ => None,
        })
    }

    pub fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Bool(b)) => Some(b),
            Some(Value::Number(n)) => n.as_i64().map(|n| n != 0),
            Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Some(true),
                "false" | "0" | "no" | "off" | "" => Some(false),
                _ => None,
            },
            _ => None,
        })
    }

    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(s)) => Some(s),
            _ => None,
        })
    }

    /// Numeric strings arrive as either JSON numbers or strings.
    pub fn numeric<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }

    /// Non-string entries are dropped; order and duplicates are kept.
    pub fn id_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Array(items)) => Some(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => None,
        })
    }
}

/// Settings bag of a badge group, as stored. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeSettings {
    #[serde(default, deserialize_with = "lenient::flag", skip_serializing_if = "Option::is_none")]
    pub show_header: Option<bool>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub header_text: Option<String>,
    #[serde(default, deserialize_with = "lenient::numeric", skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
    #[serde(default, deserialize_with = "lenient::parsed", skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,

    #[serde(default, deserialize_with = "lenient::parsed", skip_serializing_if = "Option::is_none")]
    pub badge_alignment: Option<Alignment>,
    #[serde(default, deserialize_with = "lenient::parsed", skip_serializing_if = "Option::is_none")]
    pub badge_style: Option<BadgeStyle>,
    #[serde(default, deserialize_with = "lenient::parsed", skip_serializing_if = "Option::is_none")]
    pub badge_size_desktop: Option<BadgeSize>,
    #[serde(default, deserialize_with = "lenient::parsed", skip_serializing_if = "Option::is_none")]
    pub badge_size_mobile: Option<BadgeSize>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub badge_color: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,

    #[serde(default, deserialize_with = "lenient::flag", skip_serializing_if = "Option::is_none")]
    pub custom_margin: Option<bool>,
    #[serde(default, deserialize_with = "lenient::numeric", skip_serializing_if = "Option::is_none")]
    pub margin_top: Option<String>,
    #[serde(default, deserialize_with = "lenient::numeric", skip_serializing_if = "Option::is_none")]
    pub margin_right: Option<String>,
    #[serde(default, deserialize_with = "lenient::numeric", skip_serializing_if = "Option::is_none")]
    pub margin_bottom: Option<String>,
    #[serde(default, deserialize_with = "lenient::numeric", skip_serializing_if = "Option::is_none")]
    pub margin_left: Option<String>,

    #[serde(default, deserialize_with = "lenient::parsed", skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,
    /// Footer only: justification of the whole badge block.
    #[serde(default, deserialize_with = "lenient::parsed", skip_serializing_if = "Option::is_none")]
    pub position: Option<Alignment>,
    #[serde(default, deserialize_with = "lenient::id_list", skip_serializing_if = "Option::is_none")]
    pub selected_badges: Option<Vec<String>>,

    #[serde(default, deserialize_with = "lenient::numeric", skip_serializing_if = "Option::is_none")]
    pub badge_padding: Option<String>,
    #[serde(default, deserialize_with = "lenient::numeric", skip_serializing_if = "Option::is_none")]
    pub badge_gap: Option<String>,
    #[serde(default, deserialize_with = "lenient::numeric", skip_serializing_if = "Option::is_none")]
    pub container_margin: Option<String>,
    #[serde(default, deserialize_with = "lenient::numeric", skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub hover_transform: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub transition: Option<String>,

    // Placement flags, meaningful for the checkout and product page groups.
    #[serde(default, deserialize_with = "lenient::flag", skip_serializing_if = "Option::is_none")]
    pub checkout_before_order_review: Option<bool>,
    #[serde(default, deserialize_with = "lenient::flag", skip_serializing_if = "Option::is_none")]
    pub edd_checkout_before_purchase_form: Option<bool>,
    #[serde(default, deserialize_with = "lenient::flag", skip_serializing_if = "Option::is_none")]
    pub show_after_add_to_cart: Option<bool>,
    #[serde(default, deserialize_with = "lenient::flag", skip_serializing_if = "Option::is_none")]
    pub edd_purchase_link_end: Option<bool>,

    /// Keys this version does not know about, kept for round-trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BadgeSettings {
    /// Decodes a stored settings document. Anything that is not a JSON object
    /// decodes to empty settings.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(_) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Unreadable badge settings, using defaults");
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }

    /// Fills every absent field from its documented default, field by field.
    pub fn resolve(&self) -> ResolvedSettings {
        let margin = if self.custom_margin.unwrap_or(false) {
            Some(Margin {
                top: px_or(&self.margin_top, 0),
                right: px_or(&self.margin_right, 0),
                bottom: px_or(&self.margin_bottom, 0),
                left: px_or(&self.margin_left, 0),
            })
        } else {
            None
        };

        ResolvedSettings {
            show_header: self.show_header.unwrap_or(true),
            header_text: self
                .header_text
                .clone()
                .unwrap_or_else(|| DEFAULT_HEADER_TEXT.to_string()),
            font_size: px_or(&self.font_size, DEFAULT_FONT_SIZE).max(0),
            alignment: self.alignment.unwrap_or_default(),
            badge_alignment: self.badge_alignment.unwrap_or_default(),
            badge_style: self.badge_style.unwrap_or_default(),
            size_desktop_px: self.badge_size_desktop.unwrap_or_default().px(),
            size_mobile_px: self.badge_size_mobile.unwrap_or_default().px(),
            badge_color: color_or(&self.badge_color, DEFAULT_BADGE_COLOR),
            text_color: color_or(&self.text_color, DEFAULT_TEXT_COLOR),
            margin,
            animation: self.animation,
            position: self.position.unwrap_or_default(),
            selected_badges: self.selected_badges.clone().unwrap_or_default(),
            badge_padding: px_or(&self.badge_padding, DEFAULT_BADGE_PADDING).max(0),
            badge_gap: px_or(&self.badge_gap, DEFAULT_BADGE_GAP).max(0),
            container_margin: px_or(&self.container_margin, DEFAULT_CONTAINER_MARGIN).max(0),
            border_radius: px_or(&self.border_radius, DEFAULT_BORDER_RADIUS).max(0),
            hover_transform: css_value_or(&self.hover_transform, DEFAULT_HOVER_TRANSFORM),
            transition: css_value_or(&self.transition, DEFAULT_TRANSITION),
            checkout_before_order_review: self.checkout_before_order_review.unwrap_or(false),
            edd_checkout_before_purchase_form: self
                .edd_checkout_before_purchase_form
                .unwrap_or(false),
            show_after_add_to_cart: self.show_after_add_to_cart.unwrap_or(false),
            edd_purchase_link_end: self.edd_purchase_link_end.unwrap_or(false),
        }
    }
}

fn px_or(value: &Option<String>, default: i64) -> i64 {
    value.as_deref().and_then(parse_px).unwrap_or(default)
}

fn color_or(value: &Option<String>, default: &str) -> String {
    match value.as_deref().map(str::trim) {
        Some(color) if is_hex_color(color) => color.to_string(),
        _ => default.to_string(),
    }
}

/// Free-form CSS values must not be able to close the declaration.
fn css_value_or(value: &Option<String>, default: &str) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() && !v.contains([';', '{', '}', '<', '>', '"', '\\']) => {
            v.to_string()
        }
        _ => default.to_string(),
    }
}

/// Per-badge margin in pixels, applied only when custom margins are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Margin {
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
    pub left: i64,
}

/// Badge settings with every default applied. This is what the renderer reads.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub show_header: bool,
    pub header_text: String,
    pub font_size: i64,
    pub alignment: Alignment,
    pub badge_alignment: Alignment,
    pub badge_style: BadgeStyle,
    pub size_desktop_px: u32,
    pub size_mobile_px: u32,
    pub badge_color: String,
    pub text_color: String,
    pub margin: Option<Margin>,
    /// `None` means no entrance animation.
    pub animation: Option<Animation>,
    pub position: Alignment,
    pub selected_badges: Vec<String>,
    pub badge_padding: i64,
    pub badge_gap: i64,
    pub container_margin: i64,
    pub border_radius: i64,
    pub hover_transform: String,
    pub transition: String,
    pub checkout_before_order_review: bool,
    pub edd_checkout_before_purchase_form: bool,
    pub show_after_add_to_cart: bool,
    pub edd_purchase_link_end: bool,
}

impl ResolvedSettings {
    /// Whether the placement flag named after this signal is switched on.
    /// Signals without a flag (footer, custom hooks) are never gated here.
    pub fn placement_enabled(&self, signal: &PlacementSignal) -> bool {
        match signal {
            PlacementSignal::ShowAfterAddToCart => self.show_after_add_to_cart,
            PlacementSignal::EddPurchaseLinkEnd => self.edd_purchase_link_end,
            PlacementSignal::CheckoutBeforeOrderReview => self.checkout_before_order_review,
            PlacementSignal::EddCheckoutBeforePurchaseForm => {
                self.edd_checkout_before_purchase_form
            }
            PlacementSignal::Other(_) => true,
        }
    }
}

/// A settings document rejected on write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsDocumentError {
    #[error("settings must be a JSON object")]
    NotAnObject,

    #[error("settings.{field}: {message}")]
    InvalidField { field: String, message: String },
}

fn invalid(field: &str, message: impl Into<String>) -> SettingsDocumentError {
    SettingsDocumentError::InvalidField {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Strict check applied to settings documents arriving through the API.
///
/// Reads stay lenient; writes reject values the renderer would silently
/// discard so the admin sees the mistake.
pub fn validate_settings_document(value: &Value) -> Result<(), SettingsDocumentError> {
    let Value::Object(map) = value else {
        return Err(SettingsDocumentError::NotAnObject);
    };

    for (field, v) in map {
        match field.as_str() {
            "alignment" | "badgeAlignment" | "position" => {
                check_enum::<Alignment>(field, v)?;
            }
            "badgeStyle" => check_enum::<BadgeStyle>(field, v)?,
            "badgeSizeDesktop" | "badgeSizeMobile" => check_enum::<BadgeSize>(field, v)?,
            "animation" => {
                // An empty string switches the animation off.
                if v.as_str().map(str::trim) != Some("") {
                    check_enum::<Animation>(field, v)?;
                }
            }
            "badgeColor" | "textColor" => match v.as_str() {
                Some(s) if is_hex_color(s.trim()) => {}
                _ => return Err(invalid(field, "must be a hex colour such as #0066FF")),
            },
            "fontSize" | "marginTop" | "marginRight" | "marginBottom" | "marginLeft"
            | "badgePadding" | "badgeGap" | "containerMargin" | "borderRadius" => {
                let numeric = match v {
                    Value::Number(_) => true,
                    Value::String(s) => s.trim().is_empty() || parse_px(s).is_some(),
                    _ => false,
                };
                if !numeric {
                    return Err(invalid(field, "must be numeric"));
                }
            }
            "selectedBadges" => match v {
                Value::Array(items) if items.iter().all(Value::is_string) => {}
                _ => return Err(invalid(field, "must be a list of badge ids")),
            },
            "headerText" | "hoverTransform" | "transition" => {
                if !v.is_string() {
                    return Err(invalid(field, "must be a string"));
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn check_enum<T: FromStr>(field: &str, value: &Value) -> Result<(), SettingsDocumentError> {
    match value.as_str() {
        Some(s) if s.parse::<T>().is_ok() => Ok(()),
        _ => Err(invalid(field, format!("unsupported value {}", value))),
    }
}
