/// Domain extraction logic for Tidy Tabs
use std::collections::HashSet;

use url::Url;

/// Grouping key for URLs that cannot be parsed or have no hostname.
pub const FALLBACK_DOMAIN: &str = "other";

/// Extract the grouping domain from a URL.
///
/// Returns the URL's hostname with a leading "www." stripped. Anything that
/// fails to parse, or parses without a hostname (about:, file:, data: ...),
/// falls back to "other" so every tab lands in some group.
///
/// Examples:
/// - https://www.google.com/search → google.com
/// - https://news.bbc.co.uk/article → news.bbc.co.uk
/// - chrome://extensions → extensions
/// - not-a-url → other
pub fn extract_domain(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string))
        .map(|host| host.strip_prefix("www.").unwrap_or(&host).to_string())
        .unwrap_or_else(|| FALLBACK_DOMAIN.to_string())
}

/// Count the distinct domains across a set of URLs.
pub fn count_distinct_domains<'a, I>(urls: I) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    urls.into_iter()
        .map(extract_domain)
        .collect::<HashSet<_>>()
        .len()
}
