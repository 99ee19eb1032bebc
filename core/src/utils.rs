//! Utility functions and helpers

/// String utilities
pub mod string {
    /// Check if a string is a valid IRC nickname
    pub fn is_valid_nickname(nick: &str, max_length: usize) -> bool {
        if nick.is_empty() || nick.len() > max_length {
            return false;
        }

        let mut chars = nick.chars();

        // First character must be letter or special character
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || "[]\\`_^{|}".contains(c) => {}
            _ => return false,
        }

        // Remaining characters must be letter, digit, or special character
        chars.all(|c| c.is_ascii_alphanumeric() || "-[]\\`_^{|}".contains(c))
    }

    /// Check if a string is a valid ident (username)
    pub fn is_valid_ident(ident: &str) -> bool {
        !ident.is_empty()
            && ident.chars().all(|c| c.is_ascii() && !c.is_control() && c != ' ' && c != '@' && c != '!')
    }

    /// Normalized lookup key for nicknames and channel names
    pub fn irc_key(name: &str) -> String {
        name.to_ascii_uppercase()
    }

    /// Split `raw` on whitespace into at most `limit` pieces.
    ///
    /// Leading whitespace is ignored and the final piece keeps its internal
    /// spacing, so `split_args("#chan a,b :bye now", 3)` yields
    /// `["#chan", "a,b", ":bye now"]`.
    pub fn split_args(raw: &str, limit: usize) -> Vec<&str> {
        let mut pieces = Vec::new();
        let mut rest = raw.trim_start();
        while !rest.is_empty() {
            if pieces.len() + 1 == limit {
                pieces.push(rest);
                break;
            }
            match rest.find(char::is_whitespace) {
                Some(end) => {
                    pieces.push(&rest[..end]);
                    rest = rest[end..].trim_start();
                }
                None => {
                    pieces.push(rest);
                    break;
                }
            }
        }
        pieces
    }

    /// Remove a single leading ':' from a trailing parameter
    pub fn strip_colon(text: &str) -> &str {
        text.strip_prefix(':').unwrap_or(text)
    }

    /// Truncate to at most `max` characters without splitting a character
    pub fn truncate_chars(text: &str, max: usize) -> &str {
        match text.char_indices().nth(max) {
            Some((idx, _)) => &text[..idx],
            None => text,
        }
    }

    /// Case-insensitive IRC wildcard match (`*` and `?`)
    pub fn matches_mask(mask: &str, text: &str) -> bool {
        let pattern: Vec<char> = mask.chars().flat_map(char::to_lowercase).collect();
        let text: Vec<char> = text.chars().flat_map(char::to_lowercase).collect();

        let (mut p, mut t) = (0, 0);
        let mut backtrack: Option<(usize, usize)> = None;

        while t < text.len() {
            if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
                p += 1;
                t += 1;
            } else if p < pattern.len() && pattern[p] == '*' {
                backtrack = Some((p, t));
                p += 1;
            } else if let Some((star, matched)) = backtrack {
                // Let the last '*' swallow one more character
                p = star + 1;
                t = matched + 1;
                backtrack = Some((star, matched + 1));
            } else {
                return false;
            }
        }

        pattern[p..].iter().all(|&c| c == '*')
    }
}

/// Time utilities
pub mod time {
    /// Split a duration in seconds into (days, hours, minutes, seconds)
    pub fn duration_parts(seconds: u64) -> (u64, u64, u64, u64) {
        let days = seconds / 86400;
        let hours = (seconds % 86400) / 3600;
        let minutes = (seconds % 3600) / 60;
        (days, hours, minutes, seconds % 60)
    }
}
