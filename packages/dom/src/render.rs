use crate::{DomElement, DomNode};

/// Elements that never have children or a closing tag
const VOID_ELEMENTS: &[&str] = &["area", "br", "col", "embed", "hr", "img", "input", "meta", "source", "wbr"];

/// Options for HTML rendering
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Put each element on its own line
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: "  ".to_string(),
        }
    }
}

struct Context<'a> {
    options: &'a RenderOptions,
    depth: usize,
    buffer: String,
}

impl<'a> Context<'a> {
    fn new(options: &'a RenderOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn start_line(&mut self) {
        if self.options.pretty {
            for _ in 0..self.depth {
                self.buffer.push_str(&self.options.indent);
            }
        }
    }

    fn end_line(&mut self) {
        if self.options.pretty {
            self.add("\n");
        }
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Render markup nodes to an HTML string
pub fn render_html(nodes: &[DomNode], options: &RenderOptions) -> String {
    let mut ctx = Context::new(options);
    for node in nodes {
        render_node(node, &mut ctx);
    }
    ctx.get_output()
}

fn render_node(node: &DomNode, ctx: &mut Context) {
    match node {
        DomNode::Element(element) => render_element(element, ctx),
        DomNode::Text { content } => {
            ctx.start_line();
            ctx.add(&escape_text(content));
            ctx.end_line();
        }
    }
}

fn render_element(element: &DomElement, ctx: &mut Context) {
    ctx.start_line();
    ctx.add("<");
    ctx.add(&element.tag);
    for (name, value) in &element.attributes {
        ctx.add(" ");
        ctx.add(name);
        ctx.add("=\"");
        ctx.add(&escape_attribute(value));
        ctx.add("\"");
    }
    ctx.add(">");

    if VOID_ELEMENTS.contains(&element.tag.as_str()) {
        ctx.end_line();
        return;
    }

    // Text-only elements stay on one line
    let inline = element
        .children
        .iter()
        .all(|child| matches!(child, DomNode::Text { .. }));

    if inline {
        for child in &element.children {
            if let DomNode::Text { content } = child {
                ctx.add(&escape_text(content));
            }
        }
    } else {
        ctx.end_line();
        ctx.indent();
        for child in &element.children {
            render_node(child, ctx);
        }
        ctx.dedent();
        ctx.start_line();
    }

    ctx.add("</");
    ctx.add(&element.tag);
    ctx.add(">");
    ctx.end_line();
}

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_compact() {
        let nodes = vec![DomElement::new("p")
            .with_text("Go to ")
            .with_child(
                DomElement::new("a")
                    .with_attr("href", "https://x")
                    .with_attr("data-amount", "120")
                    .with_text("X"),
            )
            .into()];

        let html = render_html(&nodes, &RenderOptions::default());
        assert_eq!(
            html,
            "<p>Go to <a href=\"https://x\" data-amount=\"120\">X</a></p>"
        );
    }

    #[test]
    fn test_render_escapes() {
        let nodes = vec![DomElement::new("span")
            .with_attr("data-lexical-poll-question", "\"Tom & Jerry\"")
            .with_text("<b>")
            .into()];

        let html = render_html(&nodes, &RenderOptions::default());
        assert_eq!(
            html,
            "<span data-lexical-poll-question=\"&quot;Tom &amp; Jerry&quot;\">&lt;b&gt;</span>"
        );
    }

    #[test]
    fn test_render_void_element() {
        let nodes = vec![DomElement::new("p")
            .with_text("a")
            .with_child(DomElement::new("br"))
            .into()];

        let html = render_html(&nodes, &RenderOptions::default());
        assert_eq!(html, "<p>a<br></p>");
    }

    #[test]
    fn test_render_pretty() {
        let nodes = vec![DomElement::new("div")
            .with_child(DomElement::new("p").with_text("Hello"))
            .into()];

        let options = RenderOptions {
            pretty: true,
            ..Default::default()
        };
        let html = render_html(&nodes, &options);
        assert_eq!(html, "<div>\n  <p>Hello</p>\n</div>\n");
    }
}
