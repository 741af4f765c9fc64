// Day filtering across the feed reader and the subscription list

#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDate, Utc};
    use scripts::feeds::{self, fetch, opml};

    const RSS: &[u8] = br#"<?xml version="1.0"?>
<rss version="2.0"><channel>
  <title>Example Blog</title>
  <link>https://example.com/</link>
  <description>posts</description>
  <item><title>Evening</title><link>https://example.com/evening</link>
        <pubDate>Sat, 02 Mar 2024 19:00:00 +0000</pubDate></item>
  <item><title>Yesterday</title><link>https://example.com/yesterday</link>
        <pubDate>Fri, 01 Mar 2024 09:00:00 +0000</pubDate></item>
  <item><title>Morning</title><link>https://example.com/morning</link>
        <pubDate>Sat, 02 Mar 2024 07:30:00 +0000</pubDate></item>
  <item><title>Undated</title><link>https://example.com/undated</link></item>
</channel></rss>"#;

    const ATOM: &[u8] = br#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Site</title>
  <id>urn:example:atom</id>
  <updated>2024-03-02T12:00:00Z</updated>
  <entry>
    <title>Noon</title><id>urn:example:1</id>
    <link href="https://atom.example/noon"/>
    <updated>2024-03-02T12:00:00Z</updated>
  </entry>
</feed>"#;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()
    }

    #[test]
    fn test_mixed_feeds_merge_oldest_first() {
        let mut all = fetch::parse_feed(RSS, "fallback").unwrap();
        all.extend(fetch::parse_feed(ATOM, "fallback").unwrap());

        let kept = scripts::dates::on_day(all, day(), &Utc, |e| e.published);
        let titles: Vec<_> = kept.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Morning", "Noon", "Evening"]);
        assert_eq!(kept[1].feed, "Atom Site");
        assert_eq!(kept[1].link, "https://atom.example/noon");

        let out = feeds::render_entries(&kept, &Utc);
        assert!(out.starts_with("07:30 [Example Blog] Morning\n      https://example.com/morning\n"));
    }

    #[tokio::test]
    async fn test_unreachable_feed_is_skipped() {
        let subs = opml::parse_opml(
            r#"<?xml version="1.0"?>
<opml version="2.0"><head><title>t</title></head><body>
  <outline text="Dead" xmlUrl="http://127.0.0.1:1/feed.xml"/>
</body></opml>"#,
        )
        .unwrap();
        assert_eq!(subs.len(), 1);

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .unwrap();
        let digest = feeds::read_day(&client, &subs, day(), &Utc).await;
        assert!(digest.entries.is_empty());
        assert_eq!(digest.failed, vec!["Dead".to_string()]);
    }

    #[test]
    fn test_opml_file_round_trip_to_listing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feeds.opml");
        std::fs::write(
            &path,
            r#"<?xml version="1.0"?>
<opml version="2.0"><head><title>t</title></head><body>
  <outline text="News">
    <outline text="LWN" xmlUrl="https://lwn.net/headlines/rss" htmlUrl="https://lwn.net/"/>
  </outline>
</body></opml>"#,
        )
        .unwrap();

        let subs = opml::read_opml(&path).unwrap();
        let listing = feeds::render_subscriptions(&subs);
        assert!(listing.starts_with("Found 1 feeds:"));
        assert!(listing.contains("  1. LWN"));
        assert!(listing.contains("Site: https://lwn.net/"));
    }

    #[test]
    fn test_empty_subscription_file_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.opml");
        std::fs::write(
            &path,
            r#"<?xml version="1.0"?>
<opml version="2.0"><head><title>t</title></head><body></body></opml>"#,
        )
        .unwrap();

        let subs = opml::read_opml(&path).unwrap();
        assert!(subs.is_empty());
        assert_eq!(feeds::render_subscriptions(&subs), "No feeds found in the subscription file.\n");
    }

    #[test]
    fn test_published_dates_are_utc() {
        let entries = fetch::parse_feed(RSS, "fallback").unwrap();
        let morning = entries.iter().find(|e| e.title == "Morning").unwrap();
        let expected: DateTime<Utc> = "2024-03-02T07:30:00Z".parse().unwrap();
        assert_eq!(morning.published, Some(expected));
    }
}
