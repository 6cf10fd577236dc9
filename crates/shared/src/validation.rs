//! Common validation utilities.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

/// Maximum length of a badge group identifier.
pub const MAX_GROUP_ID_LENGTH: usize = 64;

lazy_static! {
    static ref GROUP_ID_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
    static ref HEX_COLOR_RE: Regex =
        Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").unwrap();
    static ref ASSET_PATH_RE: Regex =
        Regex::new(r"^[A-Za-z0-9_-][A-Za-z0-9._-]*(?:/[A-Za-z0-9_-][A-Za-z0-9._-]*)*$").unwrap();
}

/// Validates a badge group identifier.
///
/// Identifiers are used in element ids and URLs, so only ASCII letters,
/// digits, `_` and `-` are allowed.
pub fn validate_group_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() || id.len() > MAX_GROUP_ID_LENGTH {
        let mut err = ValidationError::new("group_id_length");
        err.message = Some(
            format!("Group id must be between 1 and {MAX_GROUP_ID_LENGTH} characters").into(),
        );
        return Err(err);
    }

    if !GROUP_ID_RE.is_match(id) {
        let mut err = ValidationError::new("group_id_format");
        err.message =
            Some("Group id may only contain letters, digits, underscores and hyphens".into());
        return Err(err);
    }

    Ok(())
}

/// Returns true if the value is a `#rgb`, `#rrggbb` or `#rrggbbaa` colour.
pub fn is_hex_color(value: &str) -> bool {
    HEX_COLOR_RE.is_match(value)
}

/// Returns true if the value is a relative asset path made of plain file name
/// segments (letters, digits, `.`, `_`, `-`), with no segment starting with `.`.
///
/// Such paths can be placed inside CSS `url('...')` and HTML attributes
/// without escaping concerns.
pub fn is_safe_asset_path(value: &str) -> bool {
    ASSET_PATH_RE.is_match(value)
}

/// Returns true if the value can be used as a URL prefix inside CSS
/// `url('...')`: no quotes, parentheses, backslashes, angle brackets,
/// whitespace or control characters.
pub fn is_css_url_safe(value: &str) -> bool {
    !value.chars().any(|c| {
        matches!(c, '\'' | '"' | '(' | ')' | '\\' | '<' | '>')
            || c.is_whitespace()
            || c.is_control()
    })
}

/// Coerces a numeric string (optionally suffixed with `px`) to an integer.
///
/// Fractional values are truncated toward zero. Returns `None` when the value
/// does not start with a number.
pub fn parse_px(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    let trimmed = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(int);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_group_id_builtin_ids() {
        assert!(validate_group_id("checkout").is_ok());
        assert!(validate_group_id("product_page").is_ok());
        assert!(validate_group_id("footer").is_ok());
        assert!(validate_group_id("1").is_ok());
        assert!(validate_group_id("summer-sale").is_ok());
    }

    #[test]
    fn test_validate_group_id_empty() {
        let err = validate_group_id("").unwrap_err();
        assert_eq!(err.code, "group_id_length");
    }

    #[test]
    fn test_validate_group_id_too_long() {
        let id = "a".repeat(MAX_GROUP_ID_LENGTH + 1);
        assert!(validate_group_id(&id).is_err());
        assert!(validate_group_id(&"a".repeat(MAX_GROUP_ID_LENGTH)).is_ok());
    }

    #[test]
    fn test_validate_group_id_rejects_markup() {
        let err = validate_group_id("foot\"er").unwrap_err();
        assert_eq!(err.code, "group_id_format");
        assert!(validate_group_id("a b").is_err());
        assert!(validate_group_id("<script>").is_err());
    }

    #[test]
    fn test_is_hex_color() {
        assert!(is_hex_color("#fff"));
        assert!(is_hex_color("#0066FF"));
        assert!(is_hex_color("#0066ffcc"));
        assert!(!is_hex_color("0066FF"));
        assert!(!is_hex_color("#0066F"));
        assert!(!is_hex_color("red"));
        assert!(!is_hex_color("#000;background:url(x)"));
    }

    #[test]
    fn test_is_safe_asset_path() {
        assert!(is_safe_asset_path("visa1color.svg"));
        assert!(is_safe_asset_path("payments/visa-1_color.svg"));
        assert!(!is_safe_asset_path(""));
        assert!(!is_safe_asset_path("x');background:url(evil"));
        assert!(!is_safe_asset_path("a b.svg"));
        assert!(!is_safe_asset_path("../secret.svg"));
        assert!(!is_safe_asset_path("/absolute.svg"));
        assert!(!is_safe_asset_path("a//b.svg"));
    }

    #[test]
    fn test_is_css_url_safe() {
        assert!(is_css_url_safe("/assets/badges"));
        assert!(is_css_url_safe("https://cdn.example.com/badges/"));
        assert!(!is_css_url_safe("/assets') ; x"));
        assert!(!is_css_url_safe("/assets\"x"));
        assert!(!is_css_url_safe("/assets badges"));
    }

    #[test]
    fn test_parse_px() {
        assert_eq!(parse_px("18"), Some(18));
        assert_eq!(parse_px(" 12 "), Some(12));
        assert_eq!(parse_px("10px"), Some(10));
        assert_eq!(parse_px("-4"), Some(-4));
        assert_eq!(parse_px("7.9"), Some(7));
        assert_eq!(parse_px(""), None);
        assert_eq!(parse_px("abc"), None);
        assert_eq!(parse_px("NaN"), None);
    }
}
