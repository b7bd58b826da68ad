use serde::{Deserialize, Serialize};

use super::image::BlockWidth;

/// A card previewing an external link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LinkPreviewAttrs {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Thumbnail shown on the card
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

fn full_width() -> BlockWidth {
    BlockWidth::Full
}

/// An embedded video player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VideoAttrs {
    pub src: String,
    #[serde(default = "full_width")]
    pub width: BlockWidth,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
}
