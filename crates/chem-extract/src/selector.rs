//! Selector strategies - turn a (strategy, value) pair into a locator.

use crate::{Error, Result};
use std::fmt;

/// How to address an element on the rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorStrategy {
    /// `id` - element id
    Id,
    /// `class` - one class name
    ClassName,
    /// `xpath` - structural path
    XPath,
    /// `css` - raw CSS selector
    Css,
    /// any other tag - `[tag='value']`
    Attribute(String),
}

impl SelectorStrategy {
    /// Parse a strategy tag, case-insensitive. Reserved tags map to their
    /// variant; any other non-empty tag is taken as an attribute name.
    pub fn parse(tag: &str) -> Result<Self> {
        let tag = tag.trim().to_lowercase();
        match tag.as_str() {
            "" => Err(Error::SelectorUnsupported(tag)),
            "id" => Ok(Self::Id),
            "class" => Ok(Self::ClassName),
            "xpath" => Ok(Self::XPath),
            "css" => Ok(Self::Css),
            _ => Ok(Self::Attribute(tag)),
        }
    }

    /// Bind a value to this strategy.
    pub fn locate(&self, value: impl Into<String>) -> Locator {
        let value = value.into();
        match self {
            Self::Id => Locator::Id(value),
            Self::ClassName => Locator::ClassName(value),
            Self::XPath => Locator::XPath(value),
            Self::Css => Locator::Css(value),
            Self::Attribute(name) => Locator::Attribute {
                name: name.clone(),
                value,
            },
        }
    }
}

/// A concrete element address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Id(String),
    ClassName(String),
    XPath(String),
    Css(String),
    Attribute { name: String, value: String },
}

impl Locator {
    /// CSS selector for this locator. `None` for XPath, which has to be
    /// evaluated in the page.
    pub fn css(&self) -> Option<String> {
        match self {
            Self::Id(v) => Some(format!("[id='{}']", css_quote(v))),
            Self::ClassName(v) => Some(format!("[class~='{}']", css_quote(v))),
            Self::Css(v) => Some(v.clone()),
            Self::Attribute { name, value } => Some(format!("[{}='{}']", name, css_quote(value))),
            Self::XPath(_) => None,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(v) => write!(f, "id '{}'", v),
            Self::ClassName(v) => write!(f, "class '{}'", v),
            Self::XPath(v) => write!(f, "xpath '{}'", v),
            Self::Css(v) => write!(f, "css '{}'", v),
            Self::Attribute { name, value } => write!(f, "[{}='{}']", name, value),
        }
    }
}

/// Escape a value for a single-quoted CSS attribute string.
fn css_quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reserved() {
        assert_eq!(SelectorStrategy::parse("id").unwrap(), SelectorStrategy::Id);
        assert_eq!(
            SelectorStrategy::parse("class").unwrap(),
            SelectorStrategy::ClassName
        );
        assert_eq!(SelectorStrategy::parse("xpath").unwrap(), SelectorStrategy::XPath);
        assert_eq!(SelectorStrategy::parse("css").unwrap(), SelectorStrategy::Css);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(SelectorStrategy::parse("ID").unwrap(), SelectorStrategy::Id);
        assert_eq!(SelectorStrategy::parse("XPath").unwrap(), SelectorStrategy::XPath);
        assert_eq!(
            SelectorStrategy::parse("Data-Atomic").unwrap(),
            SelectorStrategy::Attribute("data-atomic".into())
        );
    }

    #[test]
    fn parse_empty_is_unsupported() {
        for tag in ["", "   "] {
            assert!(matches!(
                SelectorStrategy::parse(tag),
                Err(Error::SelectorUnsupported(_))
            ));
        }
    }

    #[test]
    fn parse_other_tags_are_attributes() {
        for tag in ["data-atomic", "name", "aria-label", "title"] {
            assert_eq!(
                SelectorStrategy::parse(tag).unwrap(),
                SelectorStrategy::Attribute(tag.into())
            );
        }
    }

    #[test]
    fn attribute_locator_css() {
        let loc = SelectorStrategy::parse("data-atomic").unwrap().locate("26");
        assert_eq!(
            loc,
            Locator::Attribute {
                name: "data-atomic".into(),
                value: "26".into()
            }
        );
        assert_eq!(loc.css().as_deref(), Some("[data-atomic='26']"));
    }

    #[test]
    fn css_rendering() {
        assert_eq!(
            Locator::Id("DataRegion".into()).css().as_deref(),
            Some("[id='DataRegion']")
        );
        assert_eq!(
            Locator::ClassName("tile".into()).css().as_deref(),
            Some("[class~='tile']")
        );
        assert_eq!(
            Locator::Css("#DataRegion > div".into()).css().as_deref(),
            Some("#DataRegion > div")
        );
        assert_eq!(Locator::XPath("//div".into()).css(), None);
    }

    #[test]
    fn css_quote_escapes() {
        assert_eq!(
            Locator::Id("it's".into()).css().as_deref(),
            Some(r"[id='it\'s']")
        );
    }

    #[test]
    fn locator_display() {
        assert_eq!(Locator::Id("x".into()).to_string(), "id 'x'");
        assert_eq!(
            SelectorStrategy::parse("data-atomic")
                .unwrap()
                .locate("1")
                .to_string(),
            "[data-atomic='1']"
        );
    }
}
