//! # Node Type Registry
//!
//! Maps a type tag to the behavior needed to bring nodes of that type into
//! a document: JSON decoding (with version migration), the DOM conversions
//! the type claims, and an optional replacement step applied to freshly
//! created nodes.
//!
//! Registries are built per editor configuration. Nothing here is global.

use crate::codec::{read_header, JsonFields};
use crate::errors::{CodecError, RegistryError};
use crate::node_type::{DomConversion, ImportContext, NodeKind, NodeType};
use crate::nodes::{
    BudgetLinkNode, LinkNode, ParagraphNode, PollNode, RootNode, TextLinkNode, TextNode,
    TimelineItemNode, TravelBudgetNode,
};
use crate::payload::NodePayload;
use playground_dom::DomElement;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::HashMap;
use tracing::{debug, trace};

type ImportJsonFn = fn(&JsonFields<'_>, &ImportContext<'_>) -> Result<NodePayload, CodecError>;
type MigrateFn = fn(u64, Map<String, Value>) -> Result<Map<String, Value>, CodecError>;

/// Substitutes an equivalent or upgraded node, or keeps the original with `None`
pub type ReplacementFn = fn(&NodePayload) -> Option<NodePayload>;

fn import_typed<T: NodeType>(
    fields: &JsonFields<'_>,
    ctx: &ImportContext<'_>,
) -> Result<NodePayload, CodecError> {
    T::import_json(fields, ctx).map(Into::into)
}

/// Registration record of one node type
#[derive(Clone)]
pub struct NodeDescriptor {
    type_tag: &'static str,
    kind: NodeKind,
    version: u64,
    import_json: ImportJsonFn,
    migrate: MigrateFn,
    dom_conversions: Vec<DomConversion>,
    replacement: Option<ReplacementFn>,
}

impl NodeDescriptor {
    pub fn of<T: NodeType>() -> Self {
        Self {
            type_tag: T::TYPE,
            kind: T::KIND,
            version: T::VERSION,
            import_json: import_typed::<T>,
            migrate: T::migrate,
            dom_conversions: T::import_dom(),
            replacement: None,
        }
    }

    /// Override the priority of every DOM conversion this type claims
    pub fn with_dom_priority(mut self, priority: u8) -> Self {
        for conversion in &mut self.dom_conversions {
            conversion.priority = priority;
        }
        self
    }

    pub fn with_replacement(mut self, replacement: ReplacementFn) -> Self {
        self.replacement = Some(replacement);
        self
    }

    pub fn type_tag(&self) -> &'static str {
        self.type_tag
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn dom_conversions(&self) -> &[DomConversion] {
        &self.dom_conversions
    }

    /// Decode one serialized node of this type (children are not visited)
    pub fn decode(
        &self,
        map: &Map<String, Value>,
        ctx: &ImportContext<'_>,
    ) -> Result<NodePayload, CodecError> {
        let (found, version) = read_header(map)?;
        if found != self.type_tag {
            return Err(CodecError::SchemaMismatch {
                expected: self.type_tag.to_string(),
                found,
            });
        }

        let fields = if version == self.version {
            Cow::Borrowed(map)
        } else {
            debug!(type_tag = self.type_tag, from = version, to = self.version, "Migrating node");
            Cow::Owned((self.migrate)(version, map.clone())?)
        };

        (self.import_json)(&JsonFields::new(self.type_tag, &fields), ctx)
    }
}

impl std::fmt::Debug for NodeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeDescriptor")
            .field("type_tag", &self.type_tag)
            .field("kind", &self.kind)
            .field("version", &self.version)
            .field("dom_conversions", &self.dom_conversions.len())
            .field("replacement", &self.replacement.is_some())
            .finish()
    }
}

/// Upgrades a plain link whose `rel` holds the legacy budget encoding
pub fn upgrade_legacy_budget_link(payload: &NodePayload) -> Option<NodePayload> {
    match payload {
        NodePayload::Link(link) => BudgetLinkNode::from_legacy_link(link).map(Into::into),
        _ => None,
    }
}

/// Every built-in descriptor, in registration order
pub fn builtin_descriptors() -> Vec<NodeDescriptor> {
    vec![
        NodeDescriptor::of::<RootNode>(),
        NodeDescriptor::of::<ParagraphNode>(),
        NodeDescriptor::of::<TextNode>(),
        NodeDescriptor::of::<LinkNode>().with_replacement(upgrade_legacy_budget_link),
        NodeDescriptor::of::<BudgetLinkNode>(),
        NodeDescriptor::of::<TextLinkNode>(),
        NodeDescriptor::of::<TravelBudgetNode>(),
        NodeDescriptor::of::<PollNode>(),
        NodeDescriptor::of::<TimelineItemNode>(),
    ]
}

#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    descriptors: Vec<NodeDescriptor>,
    index: HashMap<&'static str, usize>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in type
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for descriptor in builtin_descriptors() {
            registry.insert(descriptor);
        }
        registry
    }

    pub fn register(&mut self, descriptor: NodeDescriptor) -> Result<(), RegistryError> {
        if self.contains(descriptor.type_tag) {
            return Err(RegistryError::DuplicateType(descriptor.type_tag.to_string()));
        }
        self.insert(descriptor);
        Ok(())
    }

    pub fn register_type<T: NodeType>(&mut self) -> Result<(), RegistryError> {
        self.register(NodeDescriptor::of::<T>())
    }

    fn insert(&mut self, descriptor: NodeDescriptor) {
        debug!(
            type_tag = descriptor.type_tag,
            version = descriptor.version,
            conversions = descriptor.dom_conversions.len(),
            "Registered node type"
        );
        self.index.insert(descriptor.type_tag, self.descriptors.len());
        self.descriptors.push(descriptor);
    }

    pub fn resolve(&self, type_tag: &str) -> Result<&NodeDescriptor, RegistryError> {
        self.index
            .get(type_tag)
            .map(|&i| &self.descriptors[i])
            .ok_or_else(|| RegistryError::UnknownType(type_tag.to_string()))
    }

    pub fn contains(&self, type_tag: &str) -> bool {
        self.index.contains_key(type_tag)
    }

    /// Registered type tags in registration order
    pub fn type_tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.descriptors.iter().map(|d| d.type_tag)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Run the replacement step of the payload's type.
    /// A replacement whose type is not registered here is ignored.
    pub fn apply_replacement(&self, payload: NodePayload) -> NodePayload {
        let Ok(descriptor) = self.resolve(payload.type_tag()) else {
            return payload;
        };
        match descriptor.replacement.and_then(|replace| replace(&payload)) {
            Some(replaced) if self.contains(replaced.type_tag()) => {
                debug!(
                    from = payload.type_tag(),
                    to = replaced.type_tag(),
                    "Replaced node"
                );
                replaced
            }
            _ => payload,
        }
    }

    /// Convert a DOM element with the highest-priority conversion that accepts it.
    /// Equal priorities go to the type registered first.
    pub fn convert_dom(&self, element: &DomElement) -> Option<NodePayload> {
        let mut candidates: Vec<(u8, &'static str, &DomConversion)> = self
            .descriptors
            .iter()
            .flat_map(|d| {
                d.dom_conversions
                    .iter()
                    .filter(|c| c.tag == element.tag)
                    .map(move |c| (c.priority, d.type_tag, c))
            })
            .collect();
        candidates.sort_by(|a, b| b.0.cmp(&a.0));

        candidates.into_iter().find_map(|(priority, type_tag, conversion)| {
            let payload = (conversion.convert)(element)?;
            trace!(tag = %element.tag, type_tag, priority, "DOM conversion matched");
            Some(self.apply_replacement(payload))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::LinkAttributes;
    use serde_json::json;

    fn registry() -> NodeRegistry {
        NodeRegistry::with_defaults()
    }

    fn decode(value: Value) -> Result<NodePayload, CodecError> {
        let registry = registry();
        let map = value.as_object().unwrap().clone();
        let (tag, _) = read_header(&map)?;
        let ctx = ImportContext { registry: &registry };
        registry.resolve(&tag).unwrap().decode(&map, &ctx)
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = registry();
        assert_eq!(
            registry.register_type::<PollNode>(),
            Err(RegistryError::DuplicateType("poll".to_string()))
        );
    }

    #[test]
    fn test_unknown_type() {
        assert_eq!(
            registry().resolve("youtube").unwrap_err(),
            RegistryError::UnknownType("youtube".to_string())
        );
    }

    #[test]
    fn test_decoder_rejects_foreign_tag() {
        let registry = registry();
        let ctx = ImportContext { registry: &registry };
        let value = json!({"type": "poll", "version": 1, "question": "Q", "options": []});
        let err = registry
            .resolve("timelineitem")
            .unwrap()
            .decode(value.as_object().unwrap(), &ctx)
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::SchemaMismatch { ref expected, ref found } if expected == "timelineitem" && found == "poll"
        ));
    }

    #[test]
    fn test_decoder_rejects_unknown_version() {
        let err = decode(json!({"type": "poll", "version": 7, "question": "Q", "options": []}))
            .unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedVersion { version: 7, .. }));
    }

    #[test]
    fn test_anchor_priorities() {
        let registry = registry();

        let budget = DomElement::new("a")
            .with_attr("href", "https://x")
            .with_attr("data-type", "budgetlink")
            .with_attr("data-amount", "3");
        assert!(matches!(registry.convert_dom(&budget), Some(NodePayload::BudgetLink(_))));

        let text_link = DomElement::new("a").with_attr("data-type", "textlink");
        assert!(matches!(registry.convert_dom(&text_link), Some(NodePayload::TextLink(_))));

        let plain = DomElement::new("a").with_attr("href", "https://x");
        assert!(matches!(registry.convert_dom(&plain), Some(NodePayload::Link(_))));

        assert!(registry.convert_dom(&DomElement::new("blockquote")).is_none());
    }

    #[test]
    fn test_legacy_link_replacement() {
        let registry = registry();
        let link = LinkNode {
            link: LinkAttributes {
                rel: Some("EUR,80,Transportation".to_string()),
                ..LinkAttributes::new("https://train")
            },
            ..Default::default()
        };
        let replaced = registry.apply_replacement(link.into());
        let NodePayload::BudgetLink(budget) = replaced else {
            panic!("expected budget link");
        };
        assert_eq!(budget.currency(), "EUR");
        assert_eq!(budget.amount(), 80.0);
    }

    #[test]
    fn test_replacement_needs_registered_target() {
        let mut registry = NodeRegistry::new();
        registry
            .register(NodeDescriptor::of::<LinkNode>().with_replacement(upgrade_legacy_budget_link))
            .unwrap();
        let link = LinkNode::new("https://x").with_rel("USD,1,Accommodation");
        assert!(matches!(
            registry.apply_replacement(link.into()),
            NodePayload::Link(_)
        ));
    }
}
