use super::ElementFormat;
use crate::codec::JsonFields;
use crate::errors::CodecError;
use crate::node_type::{DomConversion, DomConvertible, ImportContext, NodeKind, NodeType, Serializable};
use crate::payload::NodePayload;
use playground_dom::{DomElement, DomNode};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphNode {
    pub format: ElementFormat,
}

impl ParagraphNode {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Serializable for ParagraphNode {
    fn export_json(&self) -> Map<String, Value> {
        let mut map = Map::new();
        self.format.write_json(&mut map);
        map
    }
}

impl DomConvertible for ParagraphNode {
    fn export_dom(&self) -> DomNode {
        let mut element = DomElement::new("p");
        if !self.format.format.is_empty() {
            element.set_attr("style", format!("text-align: {};", self.format.format));
        }
        if let Some(direction) = &self.format.direction {
            element.set_attr("dir", direction.clone());
        }
        element.into()
    }
}

fn convert_paragraph_element(element: &DomElement) -> Option<NodePayload> {
    let format = ElementFormat {
        direction: element.attr("dir").map(str::to_string),
        format: element
            .attr("style")
            .and_then(text_align)
            .unwrap_or_default(),
        indent: 0,
    };
    Some(ParagraphNode { format }.into())
}

fn text_align(style: &str) -> Option<String> {
    style.split(';').find_map(|decl| {
        let (name, value) = decl.split_once(':')?;
        (name.trim() == "text-align").then(|| value.trim().to_string())
    })
}

impl NodeType for ParagraphNode {
    const TYPE: &'static str = "paragraph";
    const KIND: NodeKind = NodeKind::Element;

    fn import_json(fields: &JsonFields<'_>, _ctx: &ImportContext<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            format: ElementFormat::read_json(fields)?,
        })
    }

    fn import_dom() -> Vec<DomConversion> {
        vec![DomConversion::new("p", 0, convert_paragraph_element)]
    }

    fn downcast(payload: &NodePayload) -> Option<&Self> {
        match payload {
            NodePayload::Paragraph(node) => Some(node),
            _ => None,
        }
    }

    fn downcast_mut(payload: &mut NodePayload) -> Option<&mut Self> {
        match payload {
            NodePayload::Paragraph(node) => Some(node),
            _ => None,
        }
    }
}

impl From<ParagraphNode> for NodePayload {
    fn from(node: ParagraphNode) -> Self {
        NodePayload::Paragraph(node)
    }
}
