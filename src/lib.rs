#![warn(clippy::all, rust_2018_idioms)]

pub mod action;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod event;
pub mod export;
pub mod geometry;
pub mod gesture;
pub mod history;
pub mod id;
pub mod merge;
pub mod node;
pub mod renderer;
pub mod source;
pub mod state;
pub mod surface;
pub mod thumbnail;
pub mod tools;

pub use action::{ActionKind, DrawAction};
pub use config::{EditorConfig, ExportFormat};
pub use document::{BlockDocument, DocumentEdit, DocumentHost, EditStep, SharedDocument};
pub use editor::RasterEditor;
pub use error::{ConfigError, EditRejected, ExportError, MergeError, SchemaError, SourceError};
pub use export::{BlobSink, ExportedImage};
pub use gesture::{MergeGesture, MergeRequest};
pub use history::ActionHistory;
pub use id::BlockId;
pub use merge::{MergeOutcome, MergePlan, MergePlanner};
pub use node::{Node, NodeKind};
pub use renderer::Renderer;
pub use source::{ImageRef, ImageSource};
pub use state::EditorState;
pub use thumbnail::ThumbnailRegistry;
pub use tools::ToolMode;
