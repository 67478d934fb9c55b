/// Feed fixtures shared by the integration tests
#[allow(dead_code)]
pub const FEED_A_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
    <channel>
        <title>Feed A</title>
        <description>Three posts, newest first</description>
        <link>https://a.example.com</link>

        <item>
            <title>A t3</title>
            <link>https://a.example.com/t3</link>
            <description>Third post from A</description>
            <author>a@example.com (Alice)</author>
            <pubDate>Fri, 15 Mar 2024 03:00:00 GMT</pubDate>
        </item>

        <item>
            <title>A t2</title>
            <link>https://a.example.com/t2</link>
            <description>Second post from A</description>
            <pubDate>Fri, 15 Mar 2024 02:00:00 GMT</pubDate>
        </item>

        <item>
            <title>A t1</title>
            <link>https://a.example.com/t1</link>
            <description>First post from A</description>
            <pubDate>Fri, 15 Mar 2024 01:00:00 GMT</pubDate>
        </item>
    </channel>
</rss>"#;

#[allow(dead_code)]
pub const FEED_B_ATOM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
    <title>Feed B</title>
    <link href="https://b.example.com"/>
    <updated>2024-03-15T04:00:00Z</updated>
    <id>https://b.example.com/</id>

    <entry>
        <title>B t4</title>
        <link href="https://b.example.com/t4"/>
        <id>https://b.example.com/t4</id>
        <published>2024-03-15T04:00:00Z</published>
        <updated>2024-03-15T04:00:00Z</updated>
        <summary>Newest post overall</summary>
        <author>
            <name>Bob</name>
        </author>
    </entry>

    <entry>
        <title>B t0</title>
        <link href="https://b.example.com/t0"/>
        <id>https://b.example.com/t0</id>
        <published>2024-03-15T00:00:00Z</published>
        <updated>2024-03-15T00:00:00Z</updated>
        <summary>Oldest post overall</summary>
        <author>
            <name>Bob</name>
        </author>
    </entry>
</feed>"#;

#[allow(dead_code)]
pub const MALFORMED_FEED: &str = r#"<?xml version="1.0"?>
<rss version="2.0">
    <channel>
        <title>Broken Feed</title>
        <item>
            <title>Unclosed tag
        </item>
    </channel>"#;

/// An RSS document with `count` items, one second apart, starting
/// `start_second` seconds after 2024-03-15 10:00:00 UTC.
#[allow(dead_code)]
pub fn generated_feed(name: &str, count: usize, start_second: usize) -> String {
    let mut feed = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
    <channel>
        <title>{name}</title>
        <link>https://{name}.example.com</link>"#
    );

    for i in 0..count {
        let second = start_second + i;
        feed.push_str(&format!(
            r#"
        <item>
            <title>{name} {i}</title>
            <link>https://{name}.example.com/{i}</link>
            <description>Item {i} of {name}</description>
            <pubDate>Fri, 15 Mar 2024 {hour:02}:{min:02}:{sec:02} GMT</pubDate>
        </item>"#,
            hour = 10 + second / 3600,
            min = (second / 60) % 60,
            sec = second % 60,
        ));
    }

    feed.push_str("\n    </channel>\n</rss>");
    feed
}
