//! RSS 2.0 feed serialization.
//!
//! Written event by event with `quick-xml` so element order is fixed and two
//! identical feeds serialize to identical bytes.

use chrono::{DateTime, Utc};
use plan_config::Config;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

/// Feed file name under the output root.
pub const FEED_FILENAME: &str = "feed.xml";

/// RSS content module namespace, for `content:encoded`.
pub const CONTENT_NAMESPACE: &str = "http://purl.org/rss/1.0/modules/content/";

/// Feed serialization error. `quick-xml` surfaces writer failures as I/O.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One feed entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    /// Short description (the rendered fragment).
    pub description: String,
    /// Full content (the rendered fragment).
    pub content: String,
    pub pub_date: DateTime<Utc>,
    pub guid: String,
}

impl FeedItem {
    /// Item whose description and content are both `fragment`, with the link
    /// doubling as the unique id.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        fragment: &str,
        pub_date: DateTime<Utc>,
    ) -> Self {
        let link = link.into();
        Self {
            title: title.into(),
            guid: link.clone(),
            link,
            description: fragment.to_owned(),
            content: fragment.to_owned(),
            pub_date,
        }
    }
}

/// Channel-level metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Channel {
    pub title: String,
    pub link: String,
    pub description: String,
}

impl Channel {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            title: config.title.clone(),
            link: config.base_url.clone(),
            description: format!("Updates for {}", config.title),
        }
    }
}

/// A complete feed document.
#[derive(Clone, Debug)]
pub struct Feed {
    pub channel: Channel,
    pub items: Vec<FeedItem>,
}

impl Feed {
    /// Serialize as RSS 2.0 with two-space indentation.
    pub fn to_xml(&self) -> Result<Vec<u8>, FeedError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(
            BytesStart::new("rss")
                .with_attributes([("version", "2.0"), ("xmlns:content", CONTENT_NAMESPACE)]),
        ))?;
        writer.write_event(Event::Start(BytesStart::new("channel")))?;

        write_text_element(&mut writer, "title", &self.channel.title)?;
        write_text_element(&mut writer, "link", &self.channel.link)?;
        write_text_element(&mut writer, "description", &self.channel.description)?;

        for item in &self.items {
            writer.write_event(Event::Start(BytesStart::new("item")))?;
            write_text_element(&mut writer, "title", &item.title)?;
            write_text_element(&mut writer, "link", &item.link)?;
            write_text_element(&mut writer, "description", &item.description)?;
            write_text_element(&mut writer, "content:encoded", &item.content)?;
            write_text_element(&mut writer, "pubDate", &item.pub_date.to_rfc2822())?;
            write_text_element(&mut writer, "guid", &item.guid)?;
            writer.write_event(Event::End(BytesEnd::new("item")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("channel")))?;
        writer.write_event(Event::End(BytesEnd::new("rss")))?;

        let mut xml = writer.into_inner();
        xml.push(b'\n');
        Ok(xml)
    }
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
) -> Result<(), FeedError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    fn channel() -> Channel {
        Channel {
            title: "Plan".to_owned(),
            link: "https://plan.example.com".to_owned(),
            description: "Updates for Plan".to_owned(),
        }
    }

    #[test]
    fn test_channel_from_config() {
        let mut config = Config::with_identity("me".to_owned(), "/home/me".to_owned(), None);
        config.title = "My Plan".to_owned();
        config.base_url = "https://example.com".to_owned();

        assert_eq!(
            Channel::from_config(&config),
            Channel {
                title: "My Plan".to_owned(),
                link: "https://example.com".to_owned(),
                description: "Updates for My Plan".to_owned(),
            }
        );
    }

    #[test]
    fn test_empty_feed() {
        let feed = Feed {
            channel: channel(),
            items: vec![],
        };
        let xml = String::from_utf8(feed.to_xml().unwrap()).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(
            "<rss version=\"2.0\" xmlns:content=\"http://purl.org/rss/1.0/modules/content/\">"
        ));
        assert!(xml.contains("<title>Plan</title>"));
        assert!(xml.contains("<description>Updates for Plan</description>"));
        assert!(!xml.contains("<item>"));
        assert!(xml.ends_with("</rss>\n"));
    }

    #[test]
    fn test_item_fields_and_escaping() {
        let date = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        let feed = Feed {
            channel: channel(),
            items: vec![FeedItem::new(
                "2024-01-05",
                "https://plan.example.com/2024/01/05",
                "<h1>Hi & bye</h1>",
                date,
            )],
        };
        let xml = String::from_utf8(feed.to_xml().unwrap()).unwrap();

        assert!(xml.contains("<title>2024-01-05</title>"));
        assert!(xml.contains("<link>https://plan.example.com/2024/01/05</link>"));
        assert!(xml.contains("<description>&lt;h1&gt;Hi &amp; bye&lt;/h1&gt;</description>"));
        assert!(xml.contains("<content:encoded>&lt;h1&gt;Hi &amp; bye&lt;/h1&gt;</content:encoded>"));
        assert!(xml.contains("<pubDate>Fri, 5 Jan 2024 00:00:00 +0000</pubDate>"));
        assert!(xml.contains("<guid>https://plan.example.com/2024/01/05</guid>"));
    }

    #[test]
    fn test_items_keep_order() {
        let date = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        let feed = Feed {
            channel: channel(),
            items: vec![
                FeedItem::new("current", "/", "", date),
                FeedItem::new("2024-01-05", "/2024/01/05", "", date),
            ],
        };
        let xml = String::from_utf8(feed.to_xml().unwrap()).unwrap();

        let current = xml.find("<title>current</title>").unwrap();
        let history = xml.find("<title>2024-01-05</title>").unwrap();
        assert!(current < history);
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let date = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let feed = Feed {
            channel: channel(),
            items: vec![FeedItem::new("a", "/a", "<p>a</p>", date)],
        };
        assert_eq!(feed.to_xml().unwrap(), feed.to_xml().unwrap());
    }
}
