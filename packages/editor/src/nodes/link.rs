use super::ElementFormat;
use crate::codec::JsonFields;
use crate::errors::CodecError;
use crate::node_type::{DomConversion, DomConvertible, ImportContext, NodeKind, NodeType, Serializable};
use crate::payload::NodePayload;
use playground_dom::{DomElement, DomNode};
use serde_json::{Map, Value};

/// Attributes every link-like node carries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkAttributes {
    pub url: String,
    pub rel: Option<String>,
    pub target: Option<String>,
    pub title: Option<String>,
}

impl LinkAttributes {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub(crate) fn write_json(&self, map: &mut Map<String, Value>) {
        let opt = |v: &Option<String>| v.clone().map(Value::String).unwrap_or(Value::Null);
        map.insert("url".into(), Value::String(self.url.clone()));
        map.insert("rel".into(), opt(&self.rel));
        map.insert("target".into(), opt(&self.target));
        map.insert("title".into(), opt(&self.title));
    }

    pub(crate) fn read_json(fields: &JsonFields<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            url: fields.string("url")?,
            rel: fields.optional_string("rel")?,
            target: fields.optional_string("target")?,
            title: fields.optional_string("title")?,
        })
    }

    /// `<a href=...>` without the optional attributes
    pub(crate) fn anchor(&self) -> DomElement {
        DomElement::new("a").with_attr("href", self.url.clone())
    }

    pub(crate) fn with_optional_attrs(&self, element: DomElement) -> DomElement {
        element
            .with_optional_attr("rel", self.rel.as_deref())
            .with_optional_attr("target", self.target.as_deref())
            .with_optional_attr("title", self.title.as_deref())
    }

    pub(crate) fn from_anchor(element: &DomElement) -> Self {
        Self {
            url: element.attr("href").unwrap_or_default().to_string(),
            rel: element.attr("rel").map(str::to_string),
            target: element.attr("target").map(str::to_string),
            title: element.attr("title").map(str::to_string),
        }
    }
}

/// Plain hyperlink element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkNode {
    pub link: LinkAttributes,
    pub format: ElementFormat,
}

impl LinkNode {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            link: LinkAttributes::new(url),
            format: ElementFormat::default(),
        }
    }

    pub fn with_rel(mut self, rel: impl Into<String>) -> Self {
        self.link.rel = Some(rel.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.link.url
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.link.url = url.into();
    }
}

impl Serializable for LinkNode {
    fn export_json(&self) -> Map<String, Value> {
        let mut map = Map::new();
        self.format.write_json(&mut map);
        self.link.write_json(&mut map);
        map
    }
}

impl DomConvertible for LinkNode {
    fn export_dom(&self) -> DomNode {
        self.link.with_optional_attrs(self.link.anchor()).into()
    }
}

fn convert_anchor_element(element: &DomElement) -> Option<NodePayload> {
    Some(
        LinkNode {
            link: LinkAttributes::from_anchor(element),
            format: ElementFormat::default(),
        }
        .into(),
    )
}

impl NodeType for LinkNode {
    const TYPE: &'static str = "link";
    const KIND: NodeKind = NodeKind::Element;

    fn import_json(fields: &JsonFields<'_>, _ctx: &ImportContext<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            link: LinkAttributes::read_json(fields)?,
            format: ElementFormat::read_json(fields)?,
        })
    }

    fn import_dom() -> Vec<DomConversion> {
        vec![DomConversion::new("a", 1, convert_anchor_element)]
    }

    fn downcast(payload: &NodePayload) -> Option<&Self> {
        match payload {
            NodePayload::Link(node) => Some(node),
            _ => None,
        }
    }

    fn downcast_mut(payload: &mut NodePayload) -> Option<&mut Self> {
        match payload {
            NodePayload::Link(node) => Some(node),
            _ => None,
        }
    }
}

impl From<LinkNode> for NodePayload {
    fn from(node: LinkNode) -> Self {
        NodePayload::Link(node)
    }
}
