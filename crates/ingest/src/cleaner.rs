//! Wiki page cleanup.
//!
//! Confluence exports carry storage-format markup. Every tag is replaced by a
//! single space and the handful of HTML entities the wiki emits for accented
//! vowels and quotes are decoded.

use std::sync::LazyLock;

use buddybot_core::document::Document;
use regex_lite::Regex;

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern compiles"));

const ENTITIES: [(&str, &str); 7] = [
    ("&agrave;", "à"),
    ("&egrave;", "è"),
    ("&igrave;", "ì"),
    ("&ograve;", "ò"),
    ("&ugrave;", "ù"),
    ("&quot;", "\""),
    ("&Egrave;", "È"),
];

/// Clean the content of every page. Metadata is left untouched.
pub fn clean_wiki_pages(pages: Vec<Document>) -> Vec<Document> {
    pages
        .into_iter()
        .map(|mut page| {
            page.content = clean_markup(&page.content);
            page
        })
        .collect()
}

/// Strip tags and decode entities in one page body.
pub fn clean_markup(content: &str) -> String {
    let stripped = strip_tags(content);
    ENTITIES
        .iter()
        .fold(stripped, |text, (entity, plain)| text.replace(entity, plain))
}

/// Replace every `<...>` run with one space.
///
/// A tag runs from a `<` to the next `>` and needs at least one character
/// in between. A `<` with no closing `>` is kept as text.
fn strip_tags(content: &str) -> String {
    TAG.replace_all(content, " ").into_owned()
}
