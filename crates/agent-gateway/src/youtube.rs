//! YouTube links in user text are passed to the model as video references.

use once_cell::sync::Lazy;
use regex::Regex;

static YOUTUBE_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:https?://)?(?:www\.)?(?:youtube\.com/watch\?v=|youtu\.be/)([a-zA-Z0-9_-]{11})")
        .expect("YouTube link pattern is valid")
});

/// Canonical watch URLs for every YouTube video referenced in `text`, in order, without duplicates.
pub fn extract_youtube_links(text: &str) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();
    for captures in YOUTUBE_LINK.captures_iter(text) {
        let url = format!("https://www.youtube.com/watch?v={}", &captures[1]);
        if !links.contains(&url) {
            links.push(url);
        }
    }
    links
}
