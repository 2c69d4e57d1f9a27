use crate::common::types::MediaKind;

const FALLBACK_NAME: &str = "video";

/// Reduces a title to letters, digits and whitespace.
///
/// Any Unicode letter or digit survives. The result is trimmed and never
/// empty; applying it twice gives the same string.
pub fn sanitize_title(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    match kept.trim() {
        "" => FALLBACK_NAME.to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// `Content-Disposition` value for an already sanitized name.
pub fn content_disposition(name: &str, kind: MediaKind) -> String {
    let encoded = urlencoding::encode(name);
    let ext = kind.extension();
    format!("attachment; filename=\"{encoded}.{ext}\"; filename*=UTF-8''{encoded}.{ext}")
}
