//! Shared helpers for identifiers, text sanitization, and environment parsing.

use color_eyre::eyre::{Report, Result, WrapErr};
use log::warn;
use regex::RegexBuilder;
use uuid::Uuid;

// ----------------------------------------------------------------------------
// Identifiers
// ----------------------------------------------------------------------------

/// Returns a new UUID v4 string, optionally shortened to the first 8 characters.
///
/// ## Examples
///
/// ```rust
/// use brick::utils::create_uuid;
///
/// assert_eq!(create_uuid(false).len(), 36);
/// assert_eq!(create_uuid(true).len(), 8);
/// ```
pub fn create_uuid(short: bool) -> String {
    let uuid = Uuid::new_v4().to_string();
    match short {
        true => uuid[..8].to_string(),
        false => uuid,
    }
}

/// Returns true if the input is a valid UUID v4.
///
/// ## Examples
///
/// ```rust
/// use brick::utils::{create_uuid, is_valid_uuid};
///
/// assert!(is_valid_uuid(&create_uuid(false)));
/// assert!(!is_valid_uuid("not-a-uuid"));
/// ```
pub fn is_valid_uuid(id: &str) -> bool {
    match Uuid::parse_str(id) {
        Ok(uuid) => uuid.get_version_num() == 4,
        Err(_) => false,
    }
}

// ----------------------------------------------------------------------------
// Sanitization
// ----------------------------------------------------------------------------

/// Tags and attributes stripped from text destined for SVG embedding.
const DANGEROUS_TAGS: &[&str] = &["script", "alert", "onclick", "onerror", "onload"];
const DANGEROUS_ATTRS: &[&str] = &["href", "xlink:href", "style"];

/// Sanitize free text destined for SVG tooltips and ring labels.
///
/// Strips dangerous tags and attributes, then escapes the remaining markup
/// characters.
///
/// ## Examples
///
/// ```rust
/// use brick::utils::sanitize_input;
///
/// assert_eq!(sanitize_input("dnaA <script>alert(1)</script>")?, "dnaA ");
/// assert_eq!(sanitize_input("5' region")?, "5&#x27; region");
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn sanitize_input(input: &str) -> Result<String, Report> {
    let mut sanitized = input.to_string();

    for tag in DANGEROUS_TAGS {
        let regex = RegexBuilder::new(&format!("<{tag}.*?>.*?</{tag}>"))
            .case_insensitive(true)
            .build()
            .wrap_err(format!("Failed to build sanitization pattern for tag: {tag}"))?;
        sanitized = regex.replace_all(&sanitized, "").to_string();
    }
    for attr in DANGEROUS_ATTRS {
        let regex = RegexBuilder::new(&format!("{attr}=\".*?\""))
            .case_insensitive(true)
            .build()
            .wrap_err(format!("Failed to build sanitization pattern for attribute: {attr}"))?;
        sanitized = regex.replace_all(&sanitized, "").to_string();
    }

    Ok(escape_markup(&sanitized))
}

/// Escape characters with special meaning in embedded markup.
fn escape_markup(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

// ----------------------------------------------------------------------------
// Environment
// ----------------------------------------------------------------------------

/// Parse an integer from a free-form environment value.
///
/// Configuration may arrive as numeric strings from the environment. Invalid
/// values fall back to the supplied default with a logged warning, they are
/// never fatal.
///
/// ## Examples
///
/// ```rust
/// use brick::utils::parse_env_int;
///
/// assert_eq!(parse_env_int("15000", 30000, "BRICK_TASK_TIMEOUT"), 15000);
/// assert_eq!(parse_env_int("fifteen", 30000, "BRICK_TASK_TIMEOUT"), 30000);
/// ```
pub fn parse_env_int(value: &str, default: u64, name: &str) -> u64 {
    match value.trim().parse::<u64>() {
        Ok(parsed) => parsed,
        Err(_) => {
            warn!("Failed to parse environment variable {name}: {value:?}. Using default value: {default}");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_dangerous_attributes() -> Result<(), Report> {
        let observed = sanitize_input("<a href=\"javascript:run()\">gene</a>")?;
        assert_eq!(observed, "&lt;a &gt;gene&lt;/a&gt;");
        Ok(())
    }

    #[test]
    fn sanitize_keeps_plain_annotation_text() -> Result<(), Report> {
        let observed = sanitize_input("CDS dnaA chromosomal replication initiator")?;
        assert_eq!(observed, "CDS dnaA chromosomal replication initiator");
        Ok(())
    }

    #[test]
    fn short_uuid_is_prefix_of_long_form() {
        let id = create_uuid(true);
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() || c == '-'));
    }
}
