/// Post-processing applied to final text before it is committed
///
/// Returning `None` leaves the text unchanged; a hook can decline but never
/// block a commit.
pub trait SegmentFilter: Send + Sync {
    fn apply(&self, text: &str) -> Option<String>;
}

/// Collapses whitespace runs and reattaches stray spaces before punctuation.
///
/// Leaves letter case alone: segment text is committed the way the engine
/// finalized it.
pub struct SpacingNormalizer;

impl SegmentFilter for SpacingNormalizer {
    fn apply(&self, text: &str) -> Option<String> {
        Some(normalize_spacing(text))
    }
}

fn normalize_spacing(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() && !starts_with_closing_punctuation(word) {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

fn starts_with_closing_punctuation(word: &str) -> bool {
    matches!(
        word.chars().next(),
        Some('.' | ',' | '!' | '?' | ';' | ':' | ')')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(normalize_spacing("hello   world"), "hello world");
        assert_eq!(normalize_spacing("  leading and trailing  "), "leading and trailing");
    }

    #[test]
    fn reattaches_punctuation() {
        assert_eq!(normalize_spacing("hello , world ."), "hello, world.");
        assert_eq!(normalize_spacing("wait ! really ?"), "wait! really?");
    }

    #[test]
    fn preserves_case() {
        assert_eq!(normalize_spacing("hello World"), "hello World");
    }
}
