use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

static SMART_QUOTES_RE: Lazy<Regex> = Lazy::new(|| Regex::new("[\u{201C}\u{201D}\u{00AB}\u{00BB}\u{201E}\u{201F}`\u{00B4}]").unwrap());
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+|www\.\S+").unwrap());
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+@\S+").unwrap());
static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<.*?>").unwrap());
static MENTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@\w+").unwrap());
static DISALLOWED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[^0-9A-Za-z\s.,?!:;\-'"]+"#).unwrap());

const PUNCTUATION: &str = "!?.,;:-'\"";

// Normalizes raw posting text into the canonical form used for both
// training and serving. Pure and total: never fails, degrades to an
// empty string, and is idempotent over its own output.
pub fn clean_text(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    // Decode HTML entities, then decompose accented characters so the
    // combining marks can be dropped without losing the base letter
    let text = html_escape::decode_html_entities(raw);
    let text: String = text.nfkd().filter(|c| !is_combining_mark(*c)).collect();

    // Fold quote variants into a straight double-quote
    let text = SMART_QUOTES_RE.replace_all(&text, "\"");

    // Remove structural noise, substituting a space so neighbouring
    // words never fuse together
    let text = URL_RE.replace_all(&text, " ");
    let text = EMAIL_RE.replace_all(&text, " ");
    let text = HTML_TAG_RE.replace_all(&text, " ");
    let text = MENTION_RE.replace_all(&text, " ");
    let text = text.replace('#', " ");

    // Strip everything outside letters, digits, whitespace and basic
    // punctuation; each disallowed run becomes one space
    let text = DISALLOWED_RE.replace_all(&text, " ");

    let text = collapse_repeated_punctuation(&text);
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// Collapses runs of the same punctuation character ("!!!" -> "!").
// The regex crate has no backreferences, so this is a plain scan.
fn collapse_repeated_punctuation(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    for ch in text.chars() {
        if prev == Some(ch) && PUNCTUATION.contains(ch) {
            continue;
        }
        out.push(ch);
        prev = Some(ch);
    }
    out
}
