use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Vocabularies
// ---------------------------------------------------------------------------

/// Brand tokens, matched as plain substrings of the lowercased title.
pub const BRANDS: &[&str] = &[
    // phones
    "apple", "iphone", "samsung", "oneplus", "xiaomi", "redmi", "realme", "oppo", "vivo", "poco",
    "motorola", "google", "pixel", "nothing",
    // tvs
    "mi", "lg", "sony", "toshiba", "tcl", "panasonic", "philips", "haier", "hisense", "vu", "acer",
    "acerpure", "kenstar", "onida", "iffalcon",
    // laptops
    "hp", "dell", "lenovo", "asus", "msi", "macbook", "thinkpad",
    // audio
    "boat", "jbl", "bose", "sennheiser", "noise", "zebronics", "skullcandy",
    // kitchen appliances
    "prestige", "bajaj", "butterfly", "preethi", "pigeon", "havells", "morphy richards", "usha",
    "crompton", "kent", "maharaja", "sujata", "bosch", "wonderchef", "kenwood", "inalsa",
    "hamilton",
];

/// Panel sizes quoted in centimetres that do not round cleanly to the
/// marketed inch size.
const CM_TO_INCH: &[(u32, u32)] = &[
    (80, 32),
    (108, 43),
    (109, 43),
    (126, 50),
    (138, 55),
    (139, 55),
    (164, 65),
    (189, 75),
];

/// Characters inspected on each side of a storage figure for "ram"/"rom".
const STORAGE_CONTEXT_CHARS: usize = 12;

const RESOLUTION_SYNONYMS: &[(&str, &str)] = &[
    ("4k", "4k"),
    ("uhd", "4k"),
    ("ultra hd", "4k"),
    ("2160p", "4k"),
    ("full hd", "fhd"),
    ("fhd", "fhd"),
    ("1080p", "fhd"),
    ("hd ready", "hd"),
    ("720p", "hd"),
];

/// Tags a resolution rule compares.
pub const RESOLUTION_TAGS: &[&str] = &["4k", "fhd", "hd"];

const PANELS: &[&str] = &["qled", "oled", "led", "lcd"];

const APPLIANCE_MODELS: &[&str] = &[
    // prestige
    "apex", "iris", "popular", "deluxe", "teon", "nakshatra", "omega", "manttra",
    // philips
    "viva", "daily", "avance",
    // bajaj
    "gx", "twister", "classic", "bravo", "platini",
    // butterfly
    "jet", "hero", "matchless", "desire", "splendid",
    // preethi
    "zodiac", "blue leaf", "eco", "peppy",
    // generic
    "juicer", "blender", "chopper", "grinder", "mixer",
];

const COLORS: &[&str] = &[
    "black", "white", "silver", "gold", "blue", "red", "green", "yellow", "pink", "purple",
    "orange", "grey", "gray", "brown", "multicolor",
];

/// Normalized tokens that look alphanumeric but never identify a model.
const MODEL_STOPLIST: &[&str] = &[
    "pack", "inch", "with", "from", "best", "india", "500ml", "gen1", "gen2", "gen3",
];

const VARIANTS: &[&str] = &[
    "pro", "max", "plus", "ultra", "mini", "air", "lite", "fe", "promax", "v2", "gen", "generation",
];

/// Variant tags the variant rule compares. `promax` is absent: it always
/// expands to `pro` + `max`.
pub const VARIANT_TAGS: &[&str] = &[
    "pro", "max", "plus", "ultra", "mini", "air", "lite", "fe", "v2", "gen", "generation",
];

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

fn re(pattern: &str) -> Regex {
    // Patterns are compile-time constants; a failure here is a typo in this file.
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid identifier pattern {pattern:?}: {e}"))
}

fn word_patterns(words: &[&'static str]) -> Vec<(&'static str, Regex)> {
    words
        .iter()
        .map(|w| (*w, re(&format!(r"\b{}\b", regex::escape(w)))))
        .collect()
}

static SCREEN_SIZE_RE: Lazy<Regex> = Lazy::new(|| re(r#"([0-9]{2,3})\s*(?:inch|cm|"|')"#));
static STORAGE_RE: Lazy<Regex> = Lazy::new(|| re(r"([0-9]+)\s*(gb|tb)"));
static BARE_HD_RE: Lazy<Regex> = Lazy::new(|| re(r"\bhd\b"));
static WATT_RE: Lazy<Regex> = Lazy::new(|| re(r"([0-9]+)\s*(?:watt|w)\b"));
static JAR_RE: Lazy<Regex> = Lazy::new(|| re(r"([0-9]+)\s*(?:jar|jars)\b"));
static TOKEN_SPLIT_RE: Lazy<Regex> = Lazy::new(|| re(r"[\s/]+"));

static APPLIANCE_RES: Lazy<Vec<(&'static str, Regex)>> =
    Lazy::new(|| word_patterns(APPLIANCE_MODELS));
static COLOR_RES: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| word_patterns(COLORS));
static VARIANT_RES: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| word_patterns(VARIANTS));

static QUANTITY_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\bpack\s*of\s*([0-9]+)\b",
        r"\bset\s*of\s*([0-9]+)\b",
        r"([0-9]+)\s*(?:kg|gram|gm|ml|ltr|litre|pounds|lbs)\b",
        r"([0-9]+)\s*piece(?:s)?\b",
    ]
    .iter()
    .map(|p| re(p))
    .collect()
});

static SERIES_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // tv lines and platforms
        r"\bfx\b",
        r"\bx\s*series\b",
        r"\ba\s*series\b",
        r"\bf\s*series\b",
        r"\bg\s*series\b",
        r"\bfire\s*tv\b",
        r"\bgoogle\s*tv\b",
        r"\bandroid\s*tv\b",
        r"\bwebos\b",
        r"\btizen\b",
        // laptop lines
        r"\bmacbook\s*air\b",
        r"\bmacbook\s*pro\b",
        r"\bthinkpad\b",
        r"\bzenbook\b",
        r"\bvivobook\b",
        r"\brog\b",
        r"\btuf\b",
        r"\baliware\b",
        r"\binspiron\b",
        r"\bvostro\b",
        r"\blatitude\b",
        r"\bxps\b",
        r"\bideapad\b",
        r"\blegion\b",
        r"\byoga\b",
        r"\bpavilion\b",
        r"\benvy\b",
        r"\bspectre\b",
        r"\bomen\b",
    ]
    .iter()
    .map(|p| re(p))
    .collect()
});

static PHONE_MODEL_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"iphone\s*([0-9]+)(?:\s*(pro|plus|max))?",
        r"s([0-9]+)(?:\s*(ultra|plus|\+))?",
        r"galaxy\s*(\w+)",
        r"([0-9]+)\s*pro",
        r"nord\s*(\w+)",
    ]
    .iter()
    .map(|p| re(p))
    .collect()
});

// ---------------------------------------------------------------------------
// IdentifierSet
// ---------------------------------------------------------------------------

/// Namespaced tags derived from one title.
///
/// Ordered so iteration, serialization and debug output are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IdentifierSet {
    tags: BTreeSet<String>,
}

impl IdentifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: impl Into<String>) {
        self.tags.insert(tag.into());
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// All tags in one namespace, prefix included (`"color_"` → `color_black`).
    pub fn with_prefix(&self, prefix: &str) -> BTreeSet<&str> {
        self.iter().filter(|t| t.starts_with(prefix)).collect()
    }

    /// Tags that appear in `vocabulary`.
    pub fn restricted_to(&self, vocabulary: &[&str]) -> BTreeSet<&str> {
        self.iter()
            .filter(|t| vocabulary.iter().any(|v| v == t))
            .collect()
    }

    /// Number of tags shared with `other`.
    pub fn overlap(&self, other: &IdentifierSet) -> usize {
        self.tags.intersection(&other.tags).count()
    }

    /// Screen size in inches, from the `<N>inch` tag.
    pub fn screen_inches(&self) -> Option<u32> {
        self.iter()
            .filter_map(|t| t.strip_suffix("inch"))
            .find_map(|n| n.parse().ok())
    }

    fn has_prefix(&self, prefix: &str) -> bool {
        self.iter().any(|t| t.starts_with(prefix))
    }
}

impl<S: Into<String>> FromIterator<S> for IdentifierSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().map(Into::into).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Derive the identifier set for a title. Pure and total: empty or
/// meaningless titles give an empty or sparse set.
pub fn extract_identifiers(title: &str) -> IdentifierSet {
    let mut ids = IdentifierSet::new();
    if title.is_empty() {
        return ids;
    }
    let text = title.to_lowercase();

    for brand in BRANDS {
        if text.contains(brand) {
            ids.insert(*brand);
        }
    }

    extract_screen_size(&text, &mut ids);
    extract_storage(&text, &mut ids);
    extract_resolution(&text, &mut ids);

    for panel in PANELS {
        if text.contains(panel) {
            ids.insert(*panel);
        }
    }

    if let Some(caps) = WATT_RE.captures(&text) {
        ids.insert(format!("watt_{}", &caps[1]));
    }

    for (name, pattern) in APPLIANCE_RES.iter() {
        if pattern.is_match(&text) {
            ids.insert(format!("appmodel_{name}"));
        }
    }
    if let Some(caps) = JAR_RE.captures(&text) {
        ids.insert(format!("jars_{}", &caps[1]));
    }

    for (name, pattern) in COLOR_RES.iter() {
        if pattern.is_match(&text) {
            ids.insert(format!("color_{name}"));
        }
    }

    for pattern in QUANTITY_RES.iter() {
        if let Some(m) = pattern.find(&text) {
            ids.insert(format!("unit_{}", m.as_str().replace(' ', "")));
        }
    }

    extract_model_tokens(&text, &mut ids);

    for (name, pattern) in VARIANT_RES.iter() {
        if pattern.is_match(&text) {
            ids.insert(*name);
            if *name == "promax" {
                ids.insert("pro");
                ids.insert("max");
            }
        }
    }

    for pattern in SERIES_RES.iter() {
        if let Some(m) = pattern.find(&text) {
            ids.insert(format!("series_{}", m.as_str().replace(' ', "")));
        }
    }

    for pattern in PHONE_MODEL_RES.iter() {
        if let Some(m) = pattern.find(&text) {
            ids.insert(m.as_str().replace(' ', ""));
        }
    }

    ids
}

fn extract_screen_size(text: &str, ids: &mut IdentifierSet) {
    let Some(caps) = SCREEN_SIZE_RE.captures(text) else {
        return;
    };
    let Ok(value) = caps[1].parse::<u32>() else {
        return;
    };
    let inches = if caps[0].contains("cm") {
        CM_TO_INCH
            .iter()
            .find(|(cm, _)| *cm == value)
            .map(|(_, inch)| *inch)
            .unwrap_or_else(|| (f64::from(value) / 2.54).round_ties_even() as u32)
    } else {
        value
    };
    ids.insert(format!("{inches}inch"));
}

fn extract_storage(text: &str, ids: &mut IdentifierSet) {
    // (size in GB, token) for figures not attributed to RAM
    let mut candidates: Vec<(u64, String)> = Vec::new();

    for caps in STORAGE_RE.captures_iter(text) {
        let Ok(value) = caps[1].parse::<u64>() else {
            continue;
        };
        let unit = &caps[2];
        let token = format!("{value}{unit}");
        ids.insert(token.clone());

        let whole = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or_default();
        let window = context_window(text, whole.0, whole.1, STORAGE_CONTEXT_CHARS);

        if window.contains("ram") {
            ids.insert(format!("ram_{token}"));
            continue;
        }
        if window.contains("rom") || window.contains("storage") {
            ids.insert(format!("storage_{token}"));
        }
        let gigabytes = if unit == "tb" { value.saturating_mul(1024) } else { value };
        candidates.push((gigabytes, token));
    }

    if ids.has_prefix("storage_") {
        return;
    }
    let mut largest: Option<&(u64, String)> = None;
    for candidate in &candidates {
        if largest.map_or(true, |best| candidate.0 > best.0) {
            largest = Some(candidate);
        }
    }
    if let Some((_, token)) = largest {
        ids.insert(format!("storage_{token}"));
    }
}

fn extract_resolution(text: &str, ids: &mut IdentifierSet) {
    for (needle, tag) in RESOLUTION_SYNONYMS {
        if text.contains(needle) {
            ids.insert(*tag);
        }
    }
    // Bare "hd" is marketing noise on FHD/4K listings.
    if !ids.contains("hd")
        && !ids.contains("fhd")
        && !ids.contains("4k")
        && BARE_HD_RE.is_match(text)
    {
        ids.insert("hd");
    }
}

fn extract_model_tokens(text: &str, ids: &mut IdentifierSet) {
    for token in TOKEN_SPLIT_RE.split(text) {
        let clean = token.trim_matches(|c: char| "(),.[]\"'".contains(c));
        if clean.chars().count() < 4 {
            continue;
        }
        let has_digit = clean.chars().any(char::is_numeric);
        let has_alpha = clean.chars().any(char::is_alphabetic);
        if !(has_digit && has_alpha) {
            continue;
        }
        let norm: String = clean
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            .collect();
        if norm.len() >= 4 && !MODEL_STOPLIST.contains(&norm.as_str()) {
            ids.insert(format!("model_{norm}"));
        }
    }
}

/// Slice of `text` spanning `radius` characters either side of `start..end`.
fn context_window(text: &str, start: usize, end: usize, radius: usize) -> &str {
    let from = text[..start]
        .char_indices()
        .rev()
        .nth(radius - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let to = text[end..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    &text[from..to]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
