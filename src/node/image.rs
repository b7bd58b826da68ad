use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display width of an image or video block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BlockWidth {
    #[default]
    Auto,
    /// `100%`
    Full,
    /// A share of the container width below 100%
    Percent(u8),
}

impl BlockWidth {
    /// `n%`, collapsing 100 and above to [`BlockWidth::Full`]
    pub fn percent(n: u8) -> Self {
        if n >= 100 { Self::Full } else { Self::Percent(n) }
    }

    /// Share of the container width, `None` for `auto`
    pub fn as_percent(&self) -> Option<u8> {
        match self {
            Self::Auto => None,
            Self::Full => Some(100),
            Self::Percent(n) => Some(*n),
        }
    }
}

impl fmt::Display for BlockWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Full => f.write_str("100%"),
            Self::Percent(n) => write!(f, "{n}%"),
        }
    }
}

impl FromStr for BlockWidth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") || s.is_empty() {
            return Ok(Self::Auto);
        }
        let digits = s.strip_suffix('%').ok_or_else(|| format!("`{s}` is not auto or a percentage"))?;
        let value: f32 = digits.trim().parse().map_err(|_| format!("`{s}` is not a percentage"))?;
        if !(value.is_finite() && value > 0.0) {
            return Err(format!("`{s}` is not a positive percentage"));
        }
        Ok(Self::percent(value.round().min(100.0) as u8))
    }
}

impl TryFrom<String> for BlockWidth {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BlockWidth> for String {
    fn from(width: BlockWidth) -> Self {
        width.to_string()
    }
}

/// Attributes of an inline image block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ImageAttrs {
    pub src: String,
    #[serde(default)]
    pub width: BlockWidth,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl ImageAttrs {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            width: BlockWidth::Auto,
            alt: None,
            title: None,
        }
    }

    pub fn with_width(mut self, width: BlockWidth) -> Self {
        self.width = width;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_parsing() {
        assert_eq!("auto".parse::<BlockWidth>(), Ok(BlockWidth::Auto));
        assert_eq!("100%".parse::<BlockWidth>(), Ok(BlockWidth::Full));
        assert_eq!(" 65% ".parse::<BlockWidth>(), Ok(BlockWidth::Percent(65)));
        assert_eq!("32.6%".parse::<BlockWidth>(), Ok(BlockWidth::Percent(33)));
        assert!("65px".parse::<BlockWidth>().is_err());
        assert!("-5%".parse::<BlockWidth>().is_err());
    }

    #[test]
    fn test_width_display_round_trips() {
        for width in [BlockWidth::Auto, BlockWidth::Full, BlockWidth::Percent(49)] {
            assert_eq!(width.to_string().parse::<BlockWidth>(), Ok(width));
        }
    }
}
