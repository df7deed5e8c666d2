/// Cleans untrusted page strings before they are embedded in a prompt.
///
/// Line breaks are collapsed so a page cannot inject extra prompt lines,
/// other control characters are dropped and the result is length-capped.
pub struct PromptSanitizer {
    max_chars: usize,
}

/// Character cap applied to a single sanitized field.
pub const DEFAULT_FIELD_CHARS: usize = 500;

impl Default for PromptSanitizer {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_FIELD_CHARS,
        }
    }
}

impl PromptSanitizer {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Replace each run of CR/LF with one space, strip other control
    /// characters, and keep at most `max_chars` characters.
    pub fn sanitize(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len().min(self.max_chars));
        let mut count = 0;
        let mut in_break = false;

        for c in input.chars() {
            if count >= self.max_chars {
                break;
            }
            if c == '\n' || c == '\r' {
                if !in_break {
                    out.push(' ');
                    count += 1;
                    in_break = true;
                }
                continue;
            }
            in_break = false;
            if c.is_control() && c != '\t' {
                continue;
            }
            out.push(c);
            count += 1;
        }

        out
    }
}

/// Returns the first `max_chars` characters of `input`.
pub fn truncate_chars(input: &str, max_chars: usize) -> &str {
    match input.char_indices().nth(max_chars) {
        Some((idx, _)) => &input[..idx],
        None => input,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_breaks_collapse_to_one_space() {
        let s = PromptSanitizer::default();
        assert_eq!(s.sanitize("Ignore\r\n\nprevious"), "Ignore previous");
    }

    #[test]
    fn control_chars_stripped() {
        let s = PromptSanitizer::default();
        assert_eq!(s.sanitize("Hello\x00\x1b[31mWorld"), "Hello[31mWorld");
        assert_eq!(s.sanitize("tab\tkept"), "tab\tkept");
    }

    #[test]
    fn length_capped_in_chars() {
        let s = PromptSanitizer::new(3);
        assert_eq!(s.sanitize("çğüşö"), "çğü");
        assert_eq!(PromptSanitizer::default().sanitize(&"x".repeat(800)).len(), 500);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("ağaç", 2), "ağ");
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("", 3), "");
    }
}
