use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating phone numbers
    /// Digits with optional leading "+", spaces, dashes, dots and parentheses
    /// - Valid: "+63 912 345 6789", "(02) 8123-4567", "09123456789"
    /// - Invalid: "call me", "12", "+63-912-abc"
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9 ().\-]{7,20}$").unwrap();

    /// Regex for validating incident identifiers
    /// - Valid: "GR-20261019-0A1B2C3D", "INC-20261019-FFFFFFFF"
    /// - Invalid: "GR-2026-0A1B", "gr-20261019-0a1b2c3d", "XX-20261019-0A1B2C3D"
    pub static ref INCIDENT_ID_REGEX: Regex =
        Regex::new(r"^(GR|INC)-[0-9]{8}-[0-9A-F]{8}$").unwrap();
}

/// Escape text for safe storage and redisplay in HTML contexts.
///
/// Covers `& < > " '`, which is the set needed for element content and
/// quoted attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Trim then escape; the standard treatment for free-text form fields
pub fn sanitize_text(input: &str) -> String {
    escape_html(input.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_regex_valid() {
        assert!(PHONE_REGEX.is_match("+63 912 345 6789"));
        assert!(PHONE_REGEX.is_match("(02) 8123-4567"));
        assert!(PHONE_REGEX.is_match("09123456789"));
    }

    #[test]
    fn test_phone_regex_invalid() {
        assert!(!PHONE_REGEX.is_match("call me"));
        assert!(!PHONE_REGEX.is_match("12"));
        assert!(!PHONE_REGEX.is_match("+63-912-abc"));
        assert!(!PHONE_REGEX.is_match(""));
    }

    #[test]
    fn test_incident_id_regex() {
        assert!(INCIDENT_ID_REGEX.is_match("GR-20261019-0A1B2C3D"));
        assert!(INCIDENT_ID_REGEX.is_match("INC-20261019-FFFFFFFF"));
        assert!(!INCIDENT_ID_REGEX.is_match("GR-2026-0A1B"));
        assert!(!INCIDENT_ID_REGEX.is_match("gr-20261019-0a1b2c3d"));
        assert!(!INCIDENT_ID_REGEX.is_match("XX-20261019-0A1B2C3D"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x")</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("Tom & Jerry's"), "Tom &amp; Jerry&#039;s");
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn test_sanitize_text_trims_before_escaping() {
        assert_eq!(sanitize_text("  oil spill <near> pier  "), "oil spill &lt;near&gt; pier");
        assert_eq!(sanitize_text("   "), "");
    }
}
