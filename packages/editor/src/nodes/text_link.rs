//! Link created from a pasted URL, labelled with text derived from the URL.

use super::{ElementFormat, LinkAttributes};
use crate::codec::JsonFields;
use crate::errors::CodecError;
use crate::node_type::{DomConversion, DomConvertible, ImportContext, NodeKind, NodeType, Serializable};
use crate::payload::NodePayload;
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use playground_dom::{DomElement, DomNode};
use regex::Regex;
use serde_json::{Map, Value};
use url::Url;

pub const TEXT_LINK_DATA_TYPE: &str = "textlink";

/// Site-specific path patterns; group 1 is the human-readable slug
static SITE_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("agoda.com", r"/[\w-]+/([\w-]+)/"),
        ("booking.com", r"/hotel/[\w-]+/([\w.-]+)\.[\w-]+\.html"),
        ("klook.com", r"/[\w-]+/[0-9]+-([\w-]+)/"),
        ("google.com", r"/maps/place/([\w%+-]+)/"),
    ]
    .into_iter()
    .filter_map(|(host, pattern)| Regex::new(pattern).ok().map(|re| (host, re)))
    .collect()
});

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextLinkNode {
    pub link: LinkAttributes,
    pub format: ElementFormat,
}

impl TextLinkNode {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            link: LinkAttributes::new(url),
            format: ElementFormat::default(),
        }
    }

    pub fn url(&self) -> &str {
        &self.link.url
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.link.url = url.into();
    }
}

/// Human label for a URL: a slug from the path when there is one, else the site name
pub fn link_text_for(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    let path = url.path();

    let mut slug = String::new();
    for (site, pattern) in SITE_PATTERNS.iter() {
        let on_site = host == *site || host.strip_prefix("www.") == Some(*site);
        if on_site {
            slug = match pattern.captures(path).and_then(|c| c.get(1)) {
                Some(m) => m.as_str().to_string(),
                None => longest_segment(path),
            };
            break;
        }
    }
    if slug.is_empty() {
        slug = longest_segment(path);
    }

    if !slug.is_empty() {
        return capitalize_words(&percent_decode_str(&slug).decode_utf8_lossy());
    }
    match host.strip_prefix("www.").and_then(|h| h.strip_suffix(".com")) {
        Some(name) => capitalize_words(name.split('.').next().unwrap_or(name)),
        None => host.to_string(),
    }
}

/// Longest path segment (first wins on ties); a trailing file extension is
/// dropped from the last segment when the stem is long enough to be a name
fn longest_segment(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').collect();
    let mut longest = "";
    for (i, segment) in segments.iter().enumerate() {
        if segment.len() > longest.len() {
            longest = *segment;
            if i == segments.len() - 1 {
                let mut parts = longest.split('.');
                if let (Some(stem), Some(_)) = (parts.next(), parts.next()) {
                    if stem.len() > 3 {
                        longest = stem;
                    }
                }
            }
        }
    }
    longest.to_string()
}

/// Words are dash separated, or plus separated when there are no dashes
fn capitalize_words(s: &str) -> String {
    let words: Vec<&str> = if s.contains('-') {
        s.split('-').collect()
    } else {
        s.split('+').collect()
    };
    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl Serializable for TextLinkNode {
    fn export_json(&self) -> Map<String, Value> {
        let mut map = Map::new();
        self.format.write_json(&mut map);
        self.link.write_json(&mut map);
        map
    }
}

impl DomConvertible for TextLinkNode {
    fn export_dom(&self) -> DomNode {
        let element = self.link.anchor().with_attr("data-type", TEXT_LINK_DATA_TYPE);
        self.link.with_optional_attrs(element).into()
    }
}

fn convert_text_link_element(element: &DomElement) -> Option<NodePayload> {
    if element.attr("data-type") != Some(TEXT_LINK_DATA_TYPE) {
        return None;
    }
    Some(
        TextLinkNode {
            link: LinkAttributes::from_anchor(element),
            format: ElementFormat::default(),
        }
        .into(),
    )
}

impl NodeType for TextLinkNode {
    const TYPE: &'static str = "textlink";
    const KIND: NodeKind = NodeKind::Element;

    fn import_json(fields: &JsonFields<'_>, _ctx: &ImportContext<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            link: LinkAttributes::read_json(fields)?,
            format: ElementFormat::read_json(fields)?,
        })
    }

    fn import_dom() -> Vec<DomConversion> {
        vec![DomConversion::new("a", 2, convert_text_link_element)]
    }

    fn downcast(payload: &NodePayload) -> Option<&Self> {
        match payload {
            NodePayload::TextLink(node) => Some(node),
            _ => None,
        }
    }

    fn downcast_mut(payload: &mut NodePayload) -> Option<&mut Self> {
        match payload {
            NodePayload::TextLink(node) => Some(node),
            _ => None,
        }
    }
}

impl From<TextLinkNode> for NodePayload {
    fn from(node: TextLinkNode) -> Self {
        NodePayload::TextLink(node)
    }
}
