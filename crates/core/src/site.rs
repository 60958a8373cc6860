//! Site identity used when rendering: display name, base URL and UTC offset.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use url::Url;

use crate::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteProfile {
    /// Display name, used when the publication name is empty.
    pub name: String,

    /// Base URL that relative permalinks resolve against.
    pub base_url: Url,

    /// Offset publication dates are rendered in.
    pub offset: FixedOffset,
}

impl SiteProfile {
    pub fn new(name: impl Into<String>, base_url: Url, offset: FixedOffset) -> Self {
        Self { name: name.into(), base_url, offset }
    }

    /// Resolve a stored permalink to an absolute URL.
    pub fn permalink(&self, link: &str) -> Result<Url, Error> {
        let link = link.trim();
        if link.is_empty() {
            return Err(Error::InvalidUrl("empty permalink".into()));
        }
        let url = self.base_url.join(link)?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(Error::InvalidUrl(format!("unsupported scheme: {scheme}"))),
        }
    }

    /// ISO 8601 timestamp with the site offset, e.g. `2025-03-01T14:05:00+02:00`.
    pub fn format_date(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset).to_rfc3339_opts(SecondsFormat::Secs, false)
    }
}

/// Parse `Z`, `UTC` or a `+HH:MM` / `-HH:MM` offset.
pub fn parse_utc_offset(input: &str) -> Option<FixedOffset> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("z") || input.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }
    input.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn site(offset: &str) -> SiteProfile {
        SiteProfile::new("Site", Url::parse("https://news.example.com/").unwrap(), parse_utc_offset(offset).unwrap())
    }

    #[test]
    fn test_parse_offsets() {
        assert_eq!(parse_utc_offset("Z"), FixedOffset::east_opt(0));
        assert_eq!(parse_utc_offset(" utc "), FixedOffset::east_opt(0));
        assert_eq!(parse_utc_offset("+02:00"), FixedOffset::east_opt(7200));
        assert_eq!(parse_utc_offset("-05:30"), FixedOffset::east_opt(-19800));
        assert_eq!(parse_utc_offset("02:00"), None);
        assert_eq!(parse_utc_offset("Europe/Paris"), None);
        assert_eq!(parse_utc_offset(""), None);
    }

    #[test]
    fn test_format_date_uses_offset() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 5, 0).unwrap();
        assert_eq!(site("+02:00").format_date(at), "2025-03-01T14:05:00+02:00");
        assert_eq!(site("Z").format_date(at), "2025-03-01T12:05:00+00:00");
        assert_eq!(site("-05:00").format_date(at), "2025-03-01T07:05:00-05:00");
    }

    #[test]
    fn test_permalink_resolution() {
        let site = site("Z");
        assert_eq!(site.permalink("/2025/story/").unwrap().as_str(), "https://news.example.com/2025/story/");
        assert_eq!(site.permalink("https://cdn.example.org/x").unwrap().as_str(), "https://cdn.example.org/x");
        assert!(site.permalink("  ").is_err());
        assert!(site.permalink("javascript:alert(1)").is_err());
    }
}
