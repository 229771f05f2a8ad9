use std::collections::BTreeSet;

/// Words that carry no product identity in catalog titles.
const NOISE_WORDS: &[&str] = &[
    "with", "and", "the", "for", "new", "latest", "mobile", "phone", "smartphone", "works",
    "camera", "control", "chip", "boost", "battery", "life", "display", "5g", "4g", "lte", "india",
];

/// Lowercase and drop noise words, keeping original word order.
pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .filter(|w| !NOISE_WORDS.contains(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Distinct words of the normalized title.
pub fn title_words(title: &str) -> BTreeSet<String> {
    normalize_title(title)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Jaccard overlap of two word sets. Two empty sets score 0.
pub fn lexical_overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}
