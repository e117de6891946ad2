//! Document id derivation for new players.

/// URL-friendly id from a display name: trim, lowercase, whitespace runs become `-`,
/// anything outside `[a-z0-9-]` is dropped.
///
/// Distinct names can map to the same id; the later create overwrites the earlier one.
pub fn derive_player_id(name: &str) -> String {
    let mut id = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.trim().chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() {
            if !in_space {
                id.push('-');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            id.push(c);
        }
    }
    id
}
