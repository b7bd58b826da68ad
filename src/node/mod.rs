//! Closed schema for document blocks.
//!
//! Each node kind has a typed attribute struct with explicit required fields
//! and defaults. Attribute bags (`serde_json` maps, as read from and written
//! to markup) are converted with [`Node::from_attrs`] and [`Node::to_attrs`].

mod embed;
mod image;
mod text;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub use self::embed::{LinkPreviewAttrs, VideoAttrs};
pub use self::image::{BlockWidth, ImageAttrs};
pub use self::text::{BlockquoteAttrs, ParagraphAttrs, QuoteVariant, RuleAttrs, RuleVariant};

use crate::error::SchemaError;
use crate::id::BlockId;

/// Newest attribute schema this crate understands
pub const SCHEMA_VERSION: u64 = 1;

const ID_KEY: &str = "id";
const VERSION_KEY: &str = "v";

/// Untyped attributes as stored in markup
pub type AttrMap = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Paragraph(ParagraphAttrs),
    Image(ImageAttrs),
    LinkPreview(LinkPreviewAttrs),
    Video(VideoAttrs),
    Blockquote(BlockquoteAttrs),
    HorizontalRule(RuleAttrs),
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Paragraph(_) => "paragraph",
            Self::Image(_) => "image",
            Self::LinkPreview(_) => "linkPreview",
            Self::Video(_) => "video",
            Self::Blockquote(_) => "blockquote",
            Self::HorizontalRule(_) => "horizontalRule",
        }
    }
}

/// One block of the document, addressed by a stable id
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: BlockId,
    kind: NodeKind,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self::with_id(BlockId::new(), kind)
    }

    pub fn with_id(id: BlockId, kind: NodeKind) -> Self {
        Self { id, kind }
    }

    pub fn image(attrs: ImageAttrs) -> Self {
        Self::new(NodeKind::Image(attrs))
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Paragraph(ParagraphAttrs { text: text.into() }))
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    pub fn as_image(&self) -> Option<&ImageAttrs> {
        match &self.kind {
            NodeKind::Image(attrs) => Some(attrs),
            _ => None,
        }
    }

    pub fn as_image_mut(&mut self) -> Option<&mut ImageAttrs> {
        match &mut self.kind {
            NodeKind::Image(attrs) => Some(attrs),
            _ => None,
        }
    }

    /// Parse an attribute bag for a node of kind `kind`.
    ///
    /// A missing `id` gets a fresh one; a missing version is read as the current one.
    pub fn from_attrs(kind: &str, attrs: &AttrMap) -> Result<Self, SchemaError> {
        let mut attrs = attrs.clone();

        if let Some(version) = attrs.remove(VERSION_KEY) {
            let found = version.as_u64().ok_or_else(|| SchemaError::InvalidField {
                field: VERSION_KEY,
                value: version.to_string(),
            })?;
            if found > SCHEMA_VERSION {
                return Err(SchemaError::UnsupportedVersion {
                    found,
                    supported: SCHEMA_VERSION,
                });
            }
        }

        let id = match attrs.remove(ID_KEY) {
            None | Some(Value::Null) => BlockId::new(),
            Some(Value::String(raw)) => raw.parse::<BlockId>().map_err(|_| SchemaError::InvalidField {
                field: ID_KEY,
                value: raw.clone(),
            })?,
            Some(other) => {
                return Err(SchemaError::InvalidField {
                    field: ID_KEY,
                    value: other.to_string(),
                });
            }
        };

        let kind = match kind {
            "paragraph" => NodeKind::Paragraph(parse(attrs)?),
            "image" => NodeKind::Image(parse(attrs)?),
            "linkPreview" => NodeKind::LinkPreview(parse(attrs)?),
            "video" => NodeKind::Video(parse(attrs)?),
            "blockquote" => NodeKind::Blockquote(parse(attrs)?),
            "horizontalRule" => NodeKind::HorizontalRule(parse(attrs)?),
            other => return Err(SchemaError::UnknownKind(other.to_owned())),
        };
        Ok(Self { id, kind })
    }

    /// Render the attribute bag, including `id` and the schema version
    pub fn to_attrs(&self) -> Result<AttrMap, SchemaError> {
        let mut attrs = match &self.kind {
            NodeKind::Paragraph(a) => render(a)?,
            NodeKind::Image(a) => render(a)?,
            NodeKind::LinkPreview(a) => render(a)?,
            NodeKind::Video(a) => render(a)?,
            NodeKind::Blockquote(a) => render(a)?,
            NodeKind::HorizontalRule(a) => render(a)?,
        };
        attrs.insert(ID_KEY.to_owned(), Value::String(self.id.to_string()));
        attrs.insert(VERSION_KEY.to_owned(), Value::from(SCHEMA_VERSION));
        Ok(attrs)
    }
}

fn parse<T: DeserializeOwned>(attrs: AttrMap) -> Result<T, SchemaError> {
    Ok(serde_json::from_value(Value::Object(attrs))?)
}

fn render<T: Serialize>(attrs: &T) -> Result<AttrMap, SchemaError> {
    match serde_json::to_value(attrs)? {
        Value::Object(map) => Ok(map),
        other => Err(SchemaError::InvalidField {
            field: "attrs",
            value: other.to_string(),
        }),
    }
}
