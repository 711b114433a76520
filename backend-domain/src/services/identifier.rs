// Guest identifier parsing for scanned codes and free-text lookups

use crate::entities::Guest;

/// Identifier carried by a scanned QR payload. URLs resolve to their last
/// non-empty path segment, anything else is used verbatim (trimmed).
pub fn extract_qr_identifier(scanned: &str) -> Option<String> {
    let text = scanned.trim();
    if text.is_empty() {
        return None;
    }
    if !looks_like_url(text) {
        return Some(text.to_string());
    }
    let without_fragment = text.split('#').next().unwrap_or(text);
    let without_query = without_fragment.split('?').next().unwrap_or(without_fragment);
    let path = match without_query.find("://") {
        Some(idx) => {
            let rest = &without_query[idx + 3..];
            match rest.find('/') {
                Some(slash) => &rest[slash..],
                None => "",
            }
        }
        None => without_query,
    };
    path.split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .last()
        .map(ToString::to_string)
}

fn looks_like_url(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Free-text match against the external code (exact, case-insensitive) or name (substring).
pub fn matches_query(guest: &Guest, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return false;
    }
    normalize_code(&guest.guest_code) == normalize_code(&needle)
        || guest.name.to_lowercase().contains(&needle)
        || guest
            .phone
            .as_deref()
            .map(|phone| phone.trim() == needle)
            .unwrap_or(false)
}
