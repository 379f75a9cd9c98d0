//! Calendar identifiers of the form `<namespace>_<8 hex>_<sanitized name>`.

use uuid::Uuid;

pub const TOKEN_LEN: usize = 8;
const MAX_NAME_SEGMENT: usize = 48;

/// Eight lowercase hex characters.
pub fn random_token() -> String {
    let mut token = Uuid::new_v4().simple().to_string();
    token.truncate(TOKEN_LEN);
    token
}

/// Lowercased name reduced to letters, digits, hyphens and underscores,
/// with whitespace runs turned into `_`.
///
/// Total and idempotent; returns an empty string when nothing survives.
pub fn sanitize_name(raw: &str) -> String {
    let kept: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
        .collect();
    kept.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .take(MAX_NAME_SEGMENT)
        .collect()
}

/// Name segment for an id, falling back when `raw` sanitizes to nothing.
pub fn name_segment(raw: &str, fallback: &str) -> String {
    let segment = sanitize_name(raw);
    if !segment.is_empty() {
        return segment;
    }
    let fallback = sanitize_name(fallback);
    if fallback.is_empty() {
        "calendar".to_string()
    } else {
        fallback
    }
}

pub fn generate_calendar_id(namespace: &str, name: &str, fallback: &str) -> String {
    format_calendar_id(namespace, &random_token(), &name_segment(name, fallback))
}

pub fn format_calendar_id(namespace: &str, token: &str, segment: &str) -> String {
    format!("{namespace}_{token}_{segment}")
}

/// Splits an id back into `(token, name segment)` when it has the expected shape.
pub fn parse_calendar_id<'a>(id: &'a str, namespace: &str) -> Option<(&'a str, &'a str)> {
    let rest = id.strip_prefix(namespace)?.strip_prefix('_')?;
    let (token, segment) = rest.split_at_checked(TOKEN_LEN)?;
    let segment = segment.strip_prefix('_')?;
    let is_hex = token
        .chars()
        .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
    (is_hex && !segment.is_empty()).then_some((token, segment))
}
