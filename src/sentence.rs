/// A target sentence: an ordered word sequence, normalized once at load time
/// and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sentence {
    words: Vec<String>,
}

impl Sentence {
    /// Normalize raw text into a sentence: lowercase, strip punctuation
    /// (intra-word apostrophes and hyphens survive), collapse whitespace.
    /// Returns None when nothing word-like remains.
    pub fn parse(raw: &str) -> Option<Self> {
        let words: Vec<String> = raw
            .split_whitespace()
            .filter_map(normalize_word)
            .collect();

        if words.is_empty() {
            None
        } else {
            Some(Self { words })
        }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Space-joined canonical form, used for display and for the stats store.
    pub fn text(&self) -> String {
        self.words.join(" ")
    }
}

fn normalize_word(raw: &str) -> Option<String> {
    let word: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '\'' || *c == '-')
        .flat_map(|c| c.to_lowercase())
        .collect();

    // Bare punctuation tokens ("--", "...") normalize away entirely
    if word.chars().any(|c| c.is_alphanumeric()) {
        Some(word)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_sentence() {
        let s = Sentence::parse("the quick brown fox").unwrap();
        assert_eq!(s.words(), &["the", "quick", "brown", "fox"]);
        assert_eq!(s.word_count(), 4);
        assert_eq!(s.text(), "the quick brown fox");
    }

    #[test]
    fn test_parse_normalizes_case_and_punctuation() {
        let s = Sentence::parse("The Surgeon, repaired (the) artery!").unwrap();
        assert_eq!(s.text(), "the surgeon repaired the artery");
    }

    #[test]
    fn test_parse_keeps_apostrophes_and_hyphens() {
        let s = Sentence::parse("don't cross the well-worn bridge").unwrap();
        assert_eq!(s.words()[0], "don't");
        assert_eq!(s.words()[3], "well-worn");
    }

    #[test]
    fn test_parse_collapses_whitespace() {
        let s = Sentence::parse("  a \t b \n c  ").unwrap();
        assert_eq!(s.words(), &["a", "b", "c"]);
    }

    #[test]
    fn test_parse_empty_input() {
        assert_eq!(Sentence::parse(""), None);
        assert_eq!(Sentence::parse("   "), None);
        assert_eq!(Sentence::parse("!?! ... --"), None);
    }

    #[test]
    fn test_parse_preserves_repeated_words() {
        let s = Sentence::parse("the cat and the hat").unwrap();
        assert_eq!(s.words().iter().filter(|w| *w == "the").count(), 2);
    }
}
