use fake::Fake;
use fake::faker::lorem::en::Word;
use rand::{Rng, RngCore};

const SENTENCE_MIN_WORDS: usize = 4;
const SENTENCE_MAX_WORDS: usize = 10;
const PARAGRAPH_MIN_SENTENCES: usize = 2;
const PARAGRAPH_MAX_SENTENCES: usize = 5;

pub fn words(count: usize, rng: &mut dyn RngCore) -> Vec<String> {
    (0..count)
        .map(|_| {
            let word: String = Word().fake_with_rng(rng);
            word
        })
        .collect()
}

pub fn sentence(rng: &mut dyn RngCore) -> String {
    let count = rng.random_range(SENTENCE_MIN_WORDS..=SENTENCE_MAX_WORDS);
    let mut value = capitalize(&words(count, rng).join(" "));
    value.push('.');
    value
}

pub fn paragraph(rng: &mut dyn RngCore) -> String {
    let count = rng.random_range(PARAGRAPH_MIN_SENTENCES..=PARAGRAPH_MAX_SENTENCES);
    (0..count)
        .map(|_| sentence(rng))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cut `value` to at most `max_chars` characters without a trailing space.
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((idx, _)) => value[..idx].trim_end().to_string(),
        None => value.to_string(),
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
