use serde::{Deserialize, Serialize};

/// Markup node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DomNode {
    /// HTML element
    Element(DomElement),

    /// Text node
    Text { content: String },
}

impl DomNode {
    pub fn text(content: impl Into<String>) -> Self {
        DomNode::Text {
            content: content.into(),
        }
    }

    pub fn as_element(&self) -> Option<&DomElement> {
        match self {
            DomNode::Element(element) => Some(element),
            DomNode::Text { .. } => None,
        }
    }

    /// Concatenated text of this node and its descendants
    pub fn text_content(&self) -> String {
        match self {
            DomNode::Element(element) => element.text_content(),
            DomNode::Text { content } => content.clone(),
        }
    }
}

impl From<DomElement> for DomNode {
    fn from(element: DomElement) -> Self {
        DomNode::Element(element)
    }
}

/// Markup element with ordered attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomElement {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<DomNode>,
}

impl DomElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Set the attribute only when a value is present
    pub fn with_optional_attr(self, name: impl Into<String>, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.with_attr(name, value),
            None => self,
        }
    }

    pub fn with_child(mut self, child: impl Into<DomNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_children(mut self, children: Vec<DomNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_text(self, content: impl Into<String>) -> Self {
        self.with_child(DomNode::text(content))
    }

    /// Insert or overwrite an attribute, keeping its original position on overwrite
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_ascii_lowercase();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self
            .attributes
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))?;
        Some(self.attributes.remove(index).1)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            out.push_str(&child.text_content());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_keep_insertion_order() {
        let el = DomElement::new("a")
            .with_attr("href", "https://x")
            .with_attr("data-type", "budgetlink")
            .with_attr("href", "https://y");

        assert_eq!(
            el.attributes,
            vec![
                ("href".to_string(), "https://y".to_string()),
                ("data-type".to_string(), "budgetlink".to_string()),
            ]
        );
    }

    #[test]
    fn test_attribute_lookup_is_case_insensitive() {
        let el = DomElement::new("SPAN").with_attr("Data-Lexical-Poll-Question", "Where?");

        assert!(el.is("span"));
        assert_eq!(el.attr("data-lexical-poll-question"), Some("Where?"));
        assert!(!el.has_attr("data-missing"));
    }

    #[test]
    fn test_text_content_is_recursive() {
        let el = DomElement::new("p")
            .with_text("Hello ")
            .with_child(DomElement::new("strong").with_text("world"));

        assert_eq!(el.text_content(), "Hello world");
    }

    #[test]
    fn test_optional_attr() {
        let el = DomElement::new("a")
            .with_optional_attr("rel", None)
            .with_optional_attr("target", Some("_blank"));

        assert!(!el.has_attr("rel"));
        assert_eq!(el.attr("target"), Some("_blank"));
    }

    #[test]
    fn test_nested_elements_compare_structurally() {
        let build = |inner: &str| {
            DomElement::new("p").with_child(DomElement::new("strong").with_text(inner))
        };

        assert_eq!(build("bold"), build("bold"));
        assert_ne!(build("bold"), build("other"));
        assert_eq!(DomNode::from(build("bold")), DomNode::from(build("bold")));
    }
}
