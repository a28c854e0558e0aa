//! Word-substitution rewrite strategy.
//!
//! Two passes over space-separated tokens: a probabilistic
//! capitalize-first/lowercase-rest transform on words longer than 4
//! characters, then deterministic whole-word expansion of `AI` and `ML`.
//! The expansion is idempotent — once expanded, the literal tokens no
//! longer appear as whole words.
//!
//! The RNG is injected so tests can fix a seed.

use rand::Rng;

/// Probability that an eligible word gets the capitalization transform.
const CAPITALIZE_PROBABILITY: f64 = 0.3;

/// Eligible words are strictly longer than this many characters.
const MIN_WORD_CHARS: usize = 4;

pub fn rewrite_words(text: &str, rng: &mut impl Rng) -> String {
    let transformed = text
        .split(' ')
        .map(|word| {
            if word.chars().count() > MIN_WORD_CHARS && rng.gen_bool(CAPITALIZE_PROBABILITY) {
                sentence_case(word)
            } else {
                word.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    let expanded = replace_whole_word(&transformed, "AI", "artificial intelligence");
    replace_whole_word(&expanded, "ML", "machine learning")
}

/// Uppercases the first character and lowercases the rest.
pub(crate) fn sentence_case(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Replaces `needle` with `replacement` wherever it appears as a whole
/// word (neighbors must not be alphanumeric or `_`). Case-sensitive.
pub(crate) fn replace_whole_word(text: &str, needle: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (idx, matched) in text.match_indices(needle) {
        let before_ok = text[..idx].chars().next_back().map_or(true, |c| !is_word_char(c));
        let after_ok = text[idx + matched.len()..]
            .chars()
            .next()
            .map_or(true, |c| !is_word_char(c));
        if before_ok && after_ok {
            out.push_str(&text[last..idx]);
            out.push_str(replacement);
            last = idx + matched.len();
        }
    }
    out.push_str(&text[last..]);
    out
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_expands_ai_and_ml_whole_words() {
        let mut rng = StdRng::seed_from_u64(1);
        let out = rewrite_words("AI and ML.", &mut rng);
        assert_eq!(out, "artificial intelligence and machine learning.");
    }

    #[test]
    fn test_expansion_matches_word_boundaries_only() {
        assert_eq!(
            replace_whole_word("AI, OPENAI, SAID, AI_X, (AI)", "AI", "artificial intelligence"),
            "artificial intelligence, OPENAI, SAID, AI_X, (artificial intelligence)"
        );
    }

    #[test]
    fn test_expansion_is_case_sensitive() {
        assert_eq!(
            replace_whole_word("ai Ai aI AI", "AI", "artificial intelligence"),
            "ai Ai aI artificial intelligence"
        );
    }

    #[test]
    fn test_expansion_is_idempotent() {
        let once = replace_whole_word("the AI wrote AI code", "AI", "artificial intelligence");
        let twice = replace_whole_word(&once, "AI", "artificial intelligence");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_full_strategy_expansion_idempotent_on_own_output() {
        let mut rng = StdRng::seed_from_u64(9);
        let first = rewrite_words("We use AI and ML for everything. AI is everywhere.", &mut rng);
        let again_ai = replace_whole_word(&first, "AI", "artificial intelligence");
        let again_ml = replace_whole_word(&again_ai, "ML", "machine learning");
        assert_eq!(first, again_ml);
    }

    #[test]
    fn test_short_words_never_capitalized() {
        let mut rng = StdRng::seed_from_u64(5);
        // every token has <= 4 chars and no AI/ML
        let text = "we do not own the red car";
        assert_eq!(rewrite_words(text, &mut rng), text);
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let text = "longer words sometimes change their capitalization here";
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        assert_eq!(rewrite_words(text, &mut a), rewrite_words(text, &mut b));
    }

    #[test]
    fn test_capitalized_words_are_sentence_cased() {
        // Whatever the draw, every output token is either the original or
        // its sentence-cased form.
        let mut rng = StdRng::seed_from_u64(77);
        let text = "SHOUTING mixedCase plain";
        let out = rewrite_words(text, &mut rng);
        for (orig, got) in text.split(' ').zip(out.split(' ')) {
            assert!(
                got == orig || got == sentence_case(orig),
                "unexpected token {got:?} from {orig:?}"
            );
        }
    }

    #[test]
    fn test_sentence_case() {
        assert_eq!(sentence_case("hELLO"), "Hello");
        assert_eq!(sentence_case("a"), "A");
        assert_eq!(sentence_case(""), "");
    }

    #[test]
    fn test_spacing_preserved() {
        let mut rng = StdRng::seed_from_u64(2);
        let out = rewrite_words("one two  three", &mut rng);
        // split/join on single spaces keeps the double space intact
        assert!(out.contains("  "));
    }
}
