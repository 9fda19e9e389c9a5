//! HTML export and DOM import of whole documents

use crate::key::NodeKey;
use crate::node_type::{NodeKind, NodeType};
use crate::nodes::{TextFormat, TextNode};
use crate::payload::NodePayload;
use crate::registry::NodeRegistry;
use crate::state::EditorState;
use playground_dom::{render_html, DomNode, RenderOptions};
use tracing::trace;

/// Markup for every top-level node of the document
pub fn generate_html(state: &EditorState) -> Vec<DomNode> {
    state
        .root()
        .children()
        .iter()
        .filter_map(|key| export_node(state, *key))
        .collect()
}

pub fn generate_html_string(state: &EditorState, options: &RenderOptions) -> String {
    render_html(&generate_html(state), options)
}

fn export_node(state: &EditorState, key: NodeKey) -> Option<DomNode> {
    let node = state.node(key)?;
    let Some(mut dom) = node.payload().export_dom() else {
        trace!(key = %key, type_tag = node.type_tag(), "No markup for node");
        return None;
    };
    if node.kind() == NodeKind::Element {
        if let DomNode::Element(element) = &mut dom {
            element
                .children
                .extend(node.children().iter().filter_map(|c| export_node(state, *c)));
        }
    }
    Some(dom)
}

/// A node reconstructed from markup, not yet inserted into a document
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedNode {
    pub payload: NodePayload,
    pub children: Vec<ImportedNode>,
}

impl ImportedNode {
    fn leaf(payload: NodePayload) -> Self {
        Self {
            payload,
            children: Vec::new(),
        }
    }
}

/// Rebuild nodes from markup with the registry's conversions.
///
/// Elements no registered type claims are unwrapped: inline format tags
/// (`<strong>`, `<em>`, ...) apply their format to the text inside, other
/// elements contribute their children.
pub fn import_dom_nodes(registry: &NodeRegistry, roots: &[DomNode]) -> Vec<ImportedNode> {
    let mut out = Vec::new();
    import_siblings(registry, roots, TextFormat::default(), &mut out);
    out
}

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "dl", "fieldset", "figure", "footer",
    "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p",
    "pre", "section", "table", "ul",
];

fn is_block(node: &DomNode) -> bool {
    node.as_element()
        .map_or(false, |element| BLOCK_TAGS.iter().any(|tag| element.is(tag)))
}

/// Line-broken whitespace whose neighbours are all block elements, as left by pretty printing
fn is_layout_whitespace(siblings: &[DomNode], index: usize) -> bool {
    let DomNode::Text { content } = &siblings[index] else {
        return false;
    };
    if !content.contains('\n') || !content.trim().is_empty() {
        return false;
    }
    let before = index.checked_sub(1).and_then(|i| siblings.get(i));
    let after = siblings.get(index + 1);
    let neighbours: Vec<&DomNode> = before.into_iter().chain(after).collect();
    !neighbours.is_empty() && neighbours.into_iter().all(is_block)
}

fn import_siblings(
    registry: &NodeRegistry,
    nodes: &[DomNode],
    format: TextFormat,
    out: &mut Vec<ImportedNode>,
) {
    for (index, node) in nodes.iter().enumerate() {
        if is_layout_whitespace(nodes, index) {
            continue;
        }
        import_into(registry, node, format, out);
    }
}

fn import_into(
    registry: &NodeRegistry,
    node: &DomNode,
    format: TextFormat,
    out: &mut Vec<ImportedNode>,
) {
    match node {
        DomNode::Text { content } => {
            if !content.is_empty() && registry.contains(TextNode::TYPE) {
                out.push(ImportedNode::leaf(TextNode::new(content.clone()).with_format(format).into()));
            }
        }
        DomNode::Element(element) => {
            if let Some(payload) = registry.convert_dom(element) {
                let mut imported = ImportedNode::leaf(payload);
                if imported.payload.kind().has_children() {
                    import_siblings(registry, &element.children, format, &mut imported.children);
                }
                out.push(imported);
                return;
            }

            let format = match TextFormat::from_tag(&element.tag) {
                Some(extra) => format.with(extra),
                None => format,
            };
            if element.is("br") {
                import_into(registry, &DomNode::text(" "), format, out);
                return;
            }
            import_siblings(registry, &element.children, format, out);
        }
    }
}
