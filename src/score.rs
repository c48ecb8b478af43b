use regex::Regex;
use std::sync::LazyLock;

static SCORE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\s*[:–-]\s*\d+").expect("score shape regex must compile"));
static SCORE_CAPTURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*[:–-]\s*(\d+)").expect("score capture regex must compile")
});
static LEAKED_STYLES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\s*\.mw-parser-output.*?(?:\n|$)").expect("leaked style regex must compile")
});
static PARENTHESIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(.*?\)").expect("parenthesized regex must compile"));

pub fn is_score_shaped(text: &str) -> bool {
    SCORE_SHAPE.is_match(text)
}

/// Home and away goal digits as written, e.g. `"2:1 (4:3 p.)"` -> `("2", "1")`.
pub fn parse_score(text: Option<&str>) -> Option<(String, String)> {
    let text = text?;
    let without_styles = LEAKED_STYLES.replace_all(text, "");
    let cleaned = PARENTHESIZED.replace_all(&without_styles, "");
    let caps = SCORE_CAPTURE.captures(cleaned.trim())?;
    Some((caps[1].to_string(), caps[2].to_string()))
}
