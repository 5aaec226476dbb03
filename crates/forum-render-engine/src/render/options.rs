use serde::{Deserialize, Serialize};
use url::Url;

use super::style::DEFAULT_FONT_SIZE;

pub const DEFAULT_BASE_URL: &str = "https://nga.178.com/";
pub const DEFAULT_ATTACHMENT_BASE: &str = "https://img.nga.178.com/attachments/";
pub const DEFAULT_HOSTS: &[&str] = &["nga.178.com", "bbs.nga.cn", "ngabbs.com"];

/// User-visible strings the renderer produces on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub collapsed_content: String,
    pub audio: String,
    pub view_video: String,
    pub view_image: String,
    pub view_attachment: String,
    pub album: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            collapsed_content: "Collapsed Content".to_string(),
            audio: "Audio".to_string(),
            view_video: "View Video".to_string(),
            view_image: "View Image".to_string(),
            view_attachment: "View Attachment".to_string(),
            album: "Album".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Base for relative links such as `/read.php?tid=1`.
    pub base_url: String,
    /// Base for image, media and attachment paths.
    pub attachment_base: String,
    /// Hosts whose links are handled in-app.
    pub hosts: Vec<String>,
    /// Body font size; `[size]` percentages scale from here.
    pub base_font_size: f32,
    /// Children kept per stack inside an inline reply-quote preview.
    pub inline_quote_max_blocks: usize,
    /// Line limit of a quote that links to a reply chain.
    pub quote_line_limit: usize,
    pub labels: Labels,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            attachment_base: DEFAULT_ATTACHMENT_BASE.to_string(),
            hosts: DEFAULT_HOSTS.iter().map(|h| h.to_string()).collect(),
            base_font_size: DEFAULT_FONT_SIZE,
            inline_quote_max_blocks: 5,
            quote_line_limit: 5,
            labels: Labels::default(),
        }
    }
}

impl RenderOptions {
    /// Resolves a link target against [`RenderOptions::base_url`].
    pub fn resolve_link(&self, href: &str) -> Option<Url> {
        resolve(&self.base_url, href)
    }

    /// Resolves a media path against [`RenderOptions::attachment_base`].
    pub fn resolve_attachment(&self, path: &str) -> Option<Url> {
        resolve(&self.attachment_base, path)
    }

    pub fn is_known_host(&self, host: &str) -> bool {
        self.hosts.iter().any(|h| h == host)
    }

    /// Font size of quote bodies: one step below the body size, two steps when nested.
    pub fn quote_font_size(&self, parent_size: f32) -> f32 {
        let callout = self.base_font_size * 16.0 / 17.0;
        let subheadline = self.base_font_size * 15.0 / 17.0;
        if parent_size <= callout {
            subheadline
        } else {
            callout
        }
    }

    pub fn footnote_font_size(&self) -> f32 {
        self.base_font_size * 13.0 / 17.0
    }
}

fn resolve(base: &str, href: &str) -> Option<Url> {
    let href = href.trim();
    match Url::parse(href) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(base).ok()?.join(href).ok(),
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_link() {
        let options = RenderOptions::default();
        let url = options.resolve_link(" /read.php?tid=5 ").unwrap();
        assert_eq!(url.as_str(), "https://nga.178.com/read.php?tid=5");
    }

    #[test]
    fn test_resolve_attachment_path() {
        let options = RenderOptions::default();
        let url = options.resolve_attachment("./mon_202101/01/a.jpg").unwrap();
        assert_eq!(
            url.as_str(),
            "https://img.nga.178.com/attachments/mon_202101/01/a.jpg"
        );
    }

    #[test]
    fn test_absolute_link_ignores_base() {
        let options = RenderOptions::default();
        let url = options.resolve_link("https://example.com/x").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_quote_font_steps_down_once_per_level() {
        let options = RenderOptions::default();
        let first = options.quote_font_size(17.0);
        let nested = options.quote_font_size(first);
        assert_eq!(first, 16.0);
        assert_eq!(nested, 15.0);
        assert_eq!(options.quote_font_size(nested), 15.0);
    }
}
