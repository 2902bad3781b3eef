use cgisf_lib::cgisf;
use rand::Rng;

use crate::sentence::Sentence;

/// Generate `num` practice sentences with varied grammatical shape.
pub fn generate_sentences(num: usize) -> Vec<Sentence> {
    let rng = &mut rand::thread_rng();
    let mut sentences = Vec::with_capacity(num);
    while sentences.len() < num {
        let s = cgisf(
            rng.gen_range(1..3),
            rng.gen_range(1..3),
            rng.gen_range(1..5),
            rng.gen_bool(0.5),
            rng.gen_range(1..3),
            rng.gen_bool(0.5),
        );
        if let Some(sentence) = Sentence::parse(&s) {
            sentences.push(sentence);
        }
    }
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_sentences() {
        let sentences = generate_sentences(3);

        assert_eq!(sentences.len(), 3);
        for sentence in &sentences {
            assert!(sentence.word_count() > 0);
            assert!(sentence
                .text()
                .chars()
                .all(|c| !c.is_uppercase()));
        }
    }

    #[test]
    fn test_generate_zero_sentences() {
        assert!(generate_sentences(0).is_empty());
    }
}
