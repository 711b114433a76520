// Small text helpers shared by the layers above

pub fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub fn normalize_required_text(value: &str) -> Option<String> {
    normalize_optional_text(Some(value.to_string()))
}
