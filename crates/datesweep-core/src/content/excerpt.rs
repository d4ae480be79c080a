//! Plain-text excerpts for the deletion log

use std::sync::OnceLock;

use regex::Regex;

const MORE: &str = "...";

fn script_style_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>")
            .expect("static regex")
    })
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("static regex"))
}

/// Remove markup, including the bodies of `script` and `style` elements
pub fn strip_tags(html: &str) -> String {
    let without_code = script_style_re().replace_all(html, "");
    tag_re().replace_all(&without_code, "").trim().to_string()
}

/// Keep the first `max_words` words of the text, appending `...` when cut
pub fn trim_words(text: &str, max_words: usize) -> String {
    let plain = strip_tags(text);
    let words: Vec<&str> = plain.split_whitespace().collect();

    if words.len() > max_words {
        format!("{}{}", words[..max_words].join(" "), MORE)
    } else {
        words.join(" ")
    }
}
