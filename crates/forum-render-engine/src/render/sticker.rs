use std::collections::HashSet;

use super::block::StickerImage;

/// Lookup of bundled sticker images. Pure, no I/O.
pub trait StickerAssets {
    fn lookup(&self, name: &str) -> Option<StickerImage>;
}

/// Asset name for a sticker as written in markup (`ac:blink` -> `ac|blink`).
pub fn asset_name(name: &str) -> String {
    name.replace(':', "|")
}

/// A fixed set of bundled asset names.
#[derive(Debug, Clone, Default)]
pub struct StickerSet {
    names: HashSet<String>,
}

impl StickerSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl StickerAssets for StickerSet {
    fn lookup(&self, name: &str) -> Option<StickerImage> {
        self.names.get(name).map(|name| StickerImage {
            name: name.clone(),
            template: name.starts_with("ac") || name.starts_with("a2"),
        })
    }
}
