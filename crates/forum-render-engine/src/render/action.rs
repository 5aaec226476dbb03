use serde::Serialize;
use url::Url;

use crate::models::PostId;

use super::options::RenderOptions;

const APP_SCHEME: &str = "mnga";

/// Notifications the renderer and its output send to the host UI.
///
/// All calls are fire-and-forget.
pub trait ActionSink {
    fn record_reply(&self, from: &PostId, to: &PostId);

    fn show_reply_chain(&self, _from: &PostId) {}

    fn navigate_to_topic(&self, _topic_id: &str) {}

    fn navigate_to_post(&self, _post_id: &str) {}

    fn navigate_to_forum(&self, _forum: &ForumId) {}

    fn navigate_to_user_profile(&self, _user: &UserRef) {}

    /// Hands a URL to the system, for external links and media.
    fn open_url(&self, _url: &Url) {}
}

/// Sink that drops everything.
pub struct NoopSink;

impl ActionSink for NoopSink {
    fn record_reply(&self, _from: &PostId, _to: &PostId) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ForumId {
    Fid(String),
    Stid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRef {
    Id(String),
    Name(String),
}

/// What activating a rendered control does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// A link; classified against in-app routes when activated.
    OpenLink { href: String },
    /// Video, audio or attachment.
    OpenMedia { url: String },
    ViewImage { url: String },
    ShowReplyChain { from: PostId },
}

/// In-app destination of a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Topic { id: String, fav: Option<String> },
    Post { id: String },
    Forum(ForumId),
    User(UserRef),
    External(Url),
}

impl Navigation {
    /// Classifies a link, resolving it against the configured base URL.
    ///
    /// Returns `None` when the link is not a valid URL.
    pub fn classify(href: &str, options: &RenderOptions) -> Option<Self> {
        let url = options.resolve_link(href)?;
        Some(Self::of_url(&url, options).unwrap_or(Navigation::External(url)))
    }

    fn of_url(url: &Url, options: &RenderOptions) -> Option<Self> {
        if url.scheme() == APP_SCHEME {
            return Self::of_app_url(url);
        }
        if !options.is_known_host(url.host_str()?) {
            return None;
        }

        let query = |name: &str| {
            url.query_pairs()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
        };

        match url.path() {
            "/read.php" => {
                if let Some(id) = query("tid") {
                    Some(Navigation::Topic {
                        id,
                        fav: query("fav"),
                    })
                } else {
                    query("pid").map(|id| Navigation::Post { id })
                }
            }
            "/thread.php" => query("stid")
                .map(ForumId::Stid)
                .or_else(|| query("fid").map(ForumId::Fid))
                .map(Navigation::Forum),
            "/nuke.php" if query("func").as_deref() == Some("ucp") => query("uid")
                .map(UserRef::Id)
                .or_else(|| query("username").map(UserRef::Name))
                .map(Navigation::User),
            _ => None,
        }
    }

    fn of_app_url(url: &Url) -> Option<Self> {
        let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
        match (url.host_str()?, segments.as_slice()) {
            ("topic", [tid]) => Some(Navigation::Topic {
                id: tid.to_string(),
                fav: url
                    .query_pairs()
                    .find(|(key, _)| key == "fav")
                    .map(|(_, value)| value.into_owned()),
            }),
            ("forum", ["f", fid]) => Some(Navigation::Forum(ForumId::Fid(fid.to_string()))),
            ("forum", ["st", stid]) => Some(Navigation::Forum(ForumId::Stid(stid.to_string()))),
            _ => None,
        }
    }

    pub fn dispatch(&self, sink: &dyn ActionSink) {
        match self {
            Navigation::Topic { id, .. } => sink.navigate_to_topic(id),
            Navigation::Post { id } => sink.navigate_to_post(id),
            Navigation::Forum(forum) => sink.navigate_to_forum(forum),
            Navigation::User(user) => sink.navigate_to_user_profile(user),
            Navigation::External(url) => sink.open_url(url),
        }
    }
}

impl Action {
    pub fn perform(&self, sink: &dyn ActionSink, options: &RenderOptions) {
        match self {
            Action::OpenLink { href } => match Navigation::classify(href, options) {
                Some(navigation) => navigation.dispatch(sink),
                None => log::warn!("Invalid URL: {href}"),
            },
            Action::OpenMedia { url } | Action::ViewImage { url } => match Url::parse(url) {
                Ok(url) => sink.open_url(&url),
                Err(e) => log::warn!("Invalid media URL {url}: {e}"),
            },
            Action::ShowReplyChain { from } => sink.show_reply_chain(from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Calls(RefCell<Vec<String>>);

    impl ActionSink for Calls {
        fn record_reply(&self, _from: &PostId, _to: &PostId) {}

        fn show_reply_chain(&self, from: &PostId) {
            self.0.borrow_mut().push(format!("chain {from}"));
        }

        fn navigate_to_topic(&self, topic_id: &str) {
            self.0.borrow_mut().push(format!("topic {topic_id}"));
        }

        fn open_url(&self, url: &Url) {
            self.0.borrow_mut().push(format!("open {url}"));
        }
    }

    #[rstest]
    #[case("/read.php?tid=123", Navigation::Topic { id: "123".into(), fav: None })]
    #[case("https://bbs.nga.cn/read.php?tid=9&fav=abc", Navigation::Topic { id: "9".into(), fav: Some("abc".into()) })]
    #[case("/read.php?pid=77", Navigation::Post { id: "77".into() })]
    #[case("/thread.php?fid=-7", Navigation::Forum(ForumId::Fid("-7".into())))]
    #[case("/thread.php?stid=42&fid=1", Navigation::Forum(ForumId::Stid("42".into())))]
    #[case("/nuke.php?func=ucp&uid=100", Navigation::User(UserRef::Id("100".into())))]
    #[case("/nuke.php?func=ucp&username=bob", Navigation::User(UserRef::Name("bob".into())))]
    #[case("mnga://topic/55", Navigation::Topic { id: "55".into(), fav: None })]
    #[case("mnga://forum/f/3", Navigation::Forum(ForumId::Fid("3".into())))]
    #[case("mnga://forum/st/4", Navigation::Forum(ForumId::Stid("4".into())))]
    fn test_classify_in_app_links(#[case] href: &str, #[case] expected: Navigation) {
        let options = RenderOptions::default();
        assert_eq!(Navigation::classify(href, &options), Some(expected));
    }

    #[rstest]
    #[case("https://example.com/read.php?tid=1")]
    #[case("/misc/agreement.html")]
    #[case("mnga://unknown/1")]
    fn test_classify_external_links(#[case] href: &str) {
        let options = RenderOptions::default();
        assert!(matches!(
            Navigation::classify(href, &options),
            Some(Navigation::External(_))
        ));
    }

    #[test]
    fn test_classify_invalid_link() {
        let options = RenderOptions::default();
        assert_eq!(Navigation::classify("http://[::1", &options), None);
    }

    #[test]
    fn test_perform_dispatches_to_sink() {
        let options = RenderOptions::default();
        let calls = Calls::default();

        Action::OpenLink {
            href: "/read.php?tid=5".to_string(),
        }
        .perform(&calls, &options);
        Action::OpenLink {
            href: "https://example.com/".to_string(),
        }
        .perform(&calls, &options);
        Action::ShowReplyChain {
            from: PostId::new("1", "2"),
        }
        .perform(&calls, &options);
        Action::OpenMedia {
            url: "not a url".to_string(),
        }
        .perform(&calls, &options);

        assert_eq!(
            calls.0.into_inner(),
            vec![
                "topic 5".to_string(),
                "open https://example.com/".to_string(),
                "chain 1#2".to_string(),
            ]
        );
    }
}
