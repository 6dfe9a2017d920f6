use aegistry_core::SimilarityConfig;
use unicode_normalization::UnicodeNormalization;

/// Character-range script heuristic used to pick a stopword table.
/// Mirrors the narrow diacritic-stripping range the original matcher
/// used for NFD marks, extended with a coarse per-script classifier —
/// there is no transliteration here, only table selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Latin,
    Cyrillic,
    Arabic,
    Cjk,
    Unknown,
}

fn detect_script(s: &str) -> Script {
    for c in s.chars() {
        match c {
            'a'..='z' | 'A'..='Z' => return Script::Latin,
            '\u{0400}'..='\u{04FF}' => return Script::Cyrillic,
            '\u{0600}'..='\u{06FF}' => return Script::Arabic,
            '\u{4E00}'..='\u{9FFF}' | '\u{3040}'..='\u{30FF}' => return Script::Cjk,
            _ => continue,
        }
    }
    Script::Unknown
}

const LATIN_STOPWORDS: &[&str] = &["the", "of", "and", "de", "la", "el", "van", "von", "bin", "al"];
const CYRILLIC_STOPWORDS: &[&str] = &["ooo", "zao", "oao"];

fn stopwords_for(script: Script) -> &'static [&'static str] {
    match script {
        Script::Latin => LATIN_STOPWORDS,
        Script::Cyrillic => CYRILLIC_STOPWORDS,
        // Arabic/CJK/Unknown: no stopword table is reconstructible from
        // the retained test vectors, so no words are removed.
        Script::Arabic | Script::Cjk | Script::Unknown => &[],
    }
}

fn is_mark_nonspacing(c: char) -> bool {
    matches!(c, '\u{0300}'..='\u{036F}')
}

fn strip_diacritics(s: &str) -> String {
    s.nfd().filter(|c| !is_mark_nonspacing(*c)).nfc().collect()
}

/// Canonicalizes text for comparison: diacritic-strip, case-fold,
/// replace punctuation with spaces, collapse whitespace, and optionally
/// drop stopwords from a script-detected table.
///
/// `normalize("") == ""`; the function is idempotent —
/// running it twice is the identity of running it once, since every
/// step it performs (case, punctuation, whitespace, stopwords) is
/// already a fixed point on its own output.
pub fn normalize(input: &str, config: &SimilarityConfig) -> String {
    if input.is_empty() {
        return String::new();
    }

    let stripped = strip_diacritics(input);
    let folded: String = stripped
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { ' ' })
        .collect();

    let tokens: Vec<&str> = folded.split_whitespace().collect();

    if config.keep_stopwords {
        return tokens.join(" ");
    }

    let script = detect_script(&folded);
    let stopwords = stopwords_for(script);
    let kept: Vec<&str> = tokens
        .into_iter()
        .filter(|t| !stopwords.contains(t))
        .collect();

    if kept.is_empty() {
        // Every token was a stopword (e.g. input was just "de la"):
        // dropping everything would discard a non-empty query. Fall
        // back to the unfiltered tokens rather than returning "".
        return folded.split_whitespace().collect::<Vec<_>>().join(" ");
    }

    kept.join(" ")
}
