use crate::codec::JsonFields;
use crate::errors::CodecError;
use crate::node_type::{DomConvertible, ImportContext, NodeKind, NodeType, Serializable};
use crate::payload::NodePayload;
use playground_dom::{DomElement, DomNode};
use serde_json::{Map, Value};

/// Inline formatting bits, same numbering as the serialized `format` field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TextFormat(u32);

impl TextFormat {
    pub const BOLD: TextFormat = TextFormat(1);
    pub const ITALIC: TextFormat = TextFormat(1 << 1);
    pub const STRIKETHROUGH: TextFormat = TextFormat(1 << 2);
    pub const UNDERLINE: TextFormat = TextFormat(1 << 3);
    pub const CODE: TextFormat = TextFormat(1 << 4);
    pub const SUBSCRIPT: TextFormat = TextFormat(1 << 5);
    pub const SUPERSCRIPT: TextFormat = TextFormat(1 << 6);
    pub const HIGHLIGHT: TextFormat = TextFormat(1 << 7);

    /// Wrapper tags, outermost first
    const TAGS: [(TextFormat, &'static str); 8] = [
        (TextFormat::CODE, "code"),
        (TextFormat::BOLD, "strong"),
        (TextFormat::ITALIC, "em"),
        (TextFormat::STRIKETHROUGH, "s"),
        (TextFormat::UNDERLINE, "u"),
        (TextFormat::SUBSCRIPT, "sub"),
        (TextFormat::SUPERSCRIPT, "sup"),
        (TextFormat::HIGHLIGHT, "mark"),
    ];

    pub fn from_bits(bits: u32) -> Self {
        TextFormat(bits)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: TextFormat) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn with(self, other: TextFormat) -> Self {
        TextFormat(self.0 | other.0)
    }

    pub fn toggle(self, other: TextFormat) -> Self {
        TextFormat(self.0 ^ other.0)
    }

    /// Format implied by an inline markup tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "b" | "strong" => Some(TextFormat::BOLD),
            "i" | "em" => Some(TextFormat::ITALIC),
            "s" | "del" | "strike" => Some(TextFormat::STRIKETHROUGH),
            "u" => Some(TextFormat::UNDERLINE),
            "code" => Some(TextFormat::CODE),
            "sub" => Some(TextFormat::SUBSCRIPT),
            "sup" => Some(TextFormat::SUPERSCRIPT),
            "mark" => Some(TextFormat::HIGHLIGHT),
            _ => None,
        }
    }
}

/// How the text behaves under selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextMode {
    #[default]
    Normal,
    Token,
    Segmented,
}

impl TextMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TextMode::Normal => "normal",
            TextMode::Token => "token",
            TextMode::Segmented => "segmented",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "normal" => Some(TextMode::Normal),
            "token" => Some(TextMode::Token),
            "segmented" => Some(TextMode::Segmented),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextNode {
    pub text: String,
    pub format: TextFormat,
    pub detail: u32,
    pub mode: TextMode,
    pub style: String,
}

impl TextNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: TextFormat) -> Self {
        self.format = format;
        self
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn toggle_format(&mut self, format: TextFormat) {
        self.format = self.format.toggle(format);
    }
}

impl Serializable for TextNode {
    fn export_json(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("detail".into(), Value::from(self.detail));
        map.insert("format".into(), Value::from(self.format.bits()));
        map.insert("mode".into(), Value::String(self.mode.as_str().to_string()));
        map.insert("style".into(), Value::String(self.style.clone()));
        map.insert("text".into(), Value::String(self.text.clone()));
        map
    }
}

impl DomConvertible for TextNode {
    fn export_dom(&self) -> DomNode {
        let mut node = DomNode::text(self.text.clone());
        for (flag, tag) in TextFormat::TAGS.iter().rev() {
            if self.format.contains(*flag) {
                node = DomElement::new(*tag).with_child(node).into();
            }
        }
        node
    }
}

impl NodeType for TextNode {
    const TYPE: &'static str = "text";
    const KIND: NodeKind = NodeKind::Text;

    fn import_json(fields: &JsonFields<'_>, _ctx: &ImportContext<'_>) -> Result<Self, CodecError> {
        let mode = fields.string_or("mode", "normal")?;
        let mode = TextMode::parse(&mode)
            .ok_or_else(|| fields.malformed("mode", format!("unknown text mode '{}'", mode)))?;

        Ok(Self {
            text: fields.string("text")?,
            format: TextFormat::from_bits(fields.u32_or("format", 0)?),
            detail: fields.u32_or("detail", 0)?,
            mode,
            style: fields.string_or("style", "")?,
        })
    }

    fn downcast(payload: &NodePayload) -> Option<&Self> {
        match payload {
            NodePayload::Text(node) => Some(node),
            _ => None,
        }
    }

    fn downcast_mut(payload: &mut NodePayload) -> Option<&mut Self> {
        match payload {
            NodePayload::Text(node) => Some(node),
            _ => None,
        }
    }
}

impl From<TextNode> for NodePayload {
    fn from(node: TextNode) -> Self {
        NodePayload::Text(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playground_dom::{render_html, RenderOptions};

    #[test]
    fn test_format_wrappers_nest_outermost_first() {
        let node = TextNode::new("hi").with_format(TextFormat::BOLD.with(TextFormat::ITALIC));
        let html = render_html(&[node.export_dom()], &RenderOptions::default());
        assert_eq!(html, "<strong><em>hi</em></strong>");
    }

    #[test]
    fn test_plain_text_is_bare() {
        let node = TextNode::new("plain");
        assert_eq!(node.export_dom(), DomNode::text("plain"));
    }

    #[test]
    fn test_toggle_format_is_involution() {
        let mut node = TextNode::new("x");
        node.toggle_format(TextFormat::CODE);
        assert!(node.format.contains(TextFormat::CODE));
        node.toggle_format(TextFormat::CODE);
        assert!(node.format.is_empty());
    }

    #[test]
    fn test_tag_mapping() {
        assert_eq!(TextFormat::from_tag("b"), Some(TextFormat::BOLD));
        assert_eq!(TextFormat::from_tag("em"), Some(TextFormat::ITALIC));
        assert_eq!(TextFormat::from_tag("div"), None);
    }
}
