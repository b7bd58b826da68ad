use futures::FutureExt;
use futures::future::BoxFuture;
use image::DynamicImage;
use log::debug;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::SourceError;

/// Where a bitmap comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageRef {
    File(PathBuf),
    Url(String),
}

impl ImageRef {
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Supplies decoded bitmaps; implemented by the surrounding application.
pub trait ImageSource {
    /// Fetch and decode the image behind `reference`
    fn fetch(&self, reference: &ImageRef) -> BoxFuture<'static, Result<DynamicImage, SourceError>>;

    /// Natural `(width, height)` of the image behind `reference`
    fn dimensions(&self, reference: &ImageRef) -> BoxFuture<'static, Result<(u32, u32), SourceError>> {
        self.fetch(reference)
            .map(|result| result.map(|image| (image.width(), image.height())))
            .boxed()
    }
}

/// Decode an encoded payload (PNG, JPEG, ...)
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, SourceError> {
    Ok(image::load_from_memory(bytes)?)
}

/// Image source over encoded payloads registered by URL
#[derive(Debug, Clone, Default)]
pub struct MemoryImageSource {
    entries: HashMap<String, Arc<Vec<u8>>>,
}

impl MemoryImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(url.into(), Arc::new(bytes));
    }

    pub fn remove(&mut self, url: &str) -> bool {
        self.entries.remove(url).is_some()
    }
}

impl ImageSource for MemoryImageSource {
    fn fetch(&self, reference: &ImageRef) -> BoxFuture<'static, Result<DynamicImage, SourceError>> {
        let entry = match reference {
            ImageRef::Url(url) => self.entries.get(url).cloned(),
            ImageRef::File(_) => None,
        };
        let name = reference.to_string();
        async move {
            let bytes = entry.ok_or_else(|| SourceError(format!("no image registered for {name}")))?;
            debug!("Decoding {} bytes for {}", bytes.len(), name);
            decode(&bytes)
        }
        .boxed()
    }
}

/// Image source reading local files; URLs are not supported
#[derive(Debug, Clone, Default)]
pub struct FileImageSource;

impl ImageSource for FileImageSource {
    fn fetch(&self, reference: &ImageRef) -> BoxFuture<'static, Result<DynamicImage, SourceError>> {
        let reference = reference.clone();
        async move {
            match reference {
                ImageRef::File(path) => {
                    let bytes = std::fs::read(&path)?;
                    debug!("Read {} bytes from {}", bytes.len(), path.display());
                    decode(&bytes)
                }
                ImageRef::Url(url) => Err(SourceError(format!("cannot fetch remote image {url}"))),
            }
        }
        .boxed()
    }
}
