//! Link annotated with a travel expense.
//!
//! The budget fields travel as `data-*` attributes in markup. Older documents
//! stored them in the link's `rel` as `CUR,AMOUNT,CATEGORY`; that form is
//! still understood on import and by the link upgrade replacement.

use super::currency::DEFAULT_CURRENCY;
use super::{ElementFormat, LinkAttributes, LinkNode};
use crate::codec::{finite_or_zero, format_amount, json_number, parse_amount, JsonFields};
use crate::errors::CodecError;
use crate::node_type::{DomConversion, DomConvertible, ImportContext, NodeKind, NodeType, Serializable};
use crate::payload::NodePayload;
use playground_dom::{DomElement, DomNode};
use serde_json::{Map, Value};

pub const BUDGET_LINK_DATA_TYPE: &str = "budgetlink";

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetLinkNode {
    pub link: LinkAttributes,
    pub format: ElementFormat,
    currency: String,
    amount: f64,
    category: String,
}

impl BudgetLinkNode {
    pub fn new(
        url: impl Into<String>,
        currency: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
    ) -> Self {
        Self {
            link: LinkAttributes::new(url),
            format: ElementFormat::default(),
            currency: currency.into(),
            amount: finite_or_zero(amount),
            category: category.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.link.url
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.link.url = url.into();
    }

    pub fn set_currency(&mut self, currency: impl Into<String>) {
        self.currency = currency.into();
    }

    pub fn set_amount(&mut self, amount: f64) {
        self.amount = finite_or_zero(amount);
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = category.into();
    }

    /// Legacy `CUR,AMOUNT,CATEGORY` encoding
    pub fn rel_string(&self) -> String {
        format!("{},{},{}", self.currency, format_amount(self.amount), self.category)
    }

    /// Upgrade a plain link whose `rel` carries the legacy budget encoding
    pub fn from_legacy_link(link: &LinkNode) -> Option<Self> {
        let (currency, amount, category) = parse_budget_rel(link.link.rel.as_deref()?)?;
        Some(Self {
            link: LinkAttributes {
                rel: None,
                ..link.link.clone()
            },
            format: link.format.clone(),
            currency,
            amount,
            category,
        })
    }
}

/// Parse `CUR,AMOUNT,CATEGORY`; anything else is an ordinary rel
pub fn parse_budget_rel(rel: &str) -> Option<(String, f64, String)> {
    let mut parts = rel.split(',');
    let currency = parts.next()?.trim();
    let amount = parts.next()?.trim();
    let category = parts.next()?.trim();
    if parts.next().is_some() || currency.is_empty() {
        return None;
    }
    let amount = amount.parse::<f64>().ok().filter(|a| a.is_finite())?;
    Some((currency.to_string(), amount, category.to_string()))
}

impl Serializable for BudgetLinkNode {
    fn export_json(&self) -> Map<String, Value> {
        let mut map = Map::new();
        self.format.write_json(&mut map);
        self.link.write_json(&mut map);
        map.insert("currency".into(), Value::String(self.currency.clone()));
        map.insert("amount".into(), json_number(self.amount));
        map.insert("category".into(), Value::String(self.category.clone()));
        map
    }
}

impl DomConvertible for BudgetLinkNode {
    fn export_dom(&self) -> DomNode {
        let element = self
            .link
            .anchor()
            .with_attr("data-type", BUDGET_LINK_DATA_TYPE)
            .with_attr("data-currency", self.currency.clone())
            .with_attr("data-amount", format_amount(self.amount))
            .with_attr("data-category", self.category.clone());
        self.link.with_optional_attrs(element).into()
    }
}

fn convert_budget_link_element(element: &DomElement) -> Option<NodePayload> {
    match element.attr("data-type") {
        Some(BUDGET_LINK_DATA_TYPE) => Some(
            BudgetLinkNode {
                link: LinkAttributes::from_anchor(element),
                format: ElementFormat::default(),
                currency: element
                    .attr("data-currency")
                    .unwrap_or(DEFAULT_CURRENCY)
                    .to_string(),
                amount: parse_amount(element.attr("data-amount"), 0.0),
                category: element.attr("data-category").unwrap_or_default().to_string(),
            }
            .into(),
        ),
        Some(_) => None,
        None => {
            let link = LinkNode {
                link: LinkAttributes::from_anchor(element),
                format: ElementFormat::default(),
            };
            BudgetLinkNode::from_legacy_link(&link).map(Into::into)
        }
    }
}

impl NodeType for BudgetLinkNode {
    const TYPE: &'static str = "budgetlink";
    const KIND: NodeKind = NodeKind::Element;

    fn import_json(fields: &JsonFields<'_>, _ctx: &ImportContext<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            link: LinkAttributes::read_json(fields)?,
            format: ElementFormat::read_json(fields)?,
            currency: fields.string("currency")?,
            amount: fields.number("amount")?,
            category: fields.string("category")?,
        })
    }

    fn import_dom() -> Vec<DomConversion> {
        vec![DomConversion::new("a", 2, convert_budget_link_element)]
    }

    fn downcast(payload: &NodePayload) -> Option<&Self> {
        match payload {
            NodePayload::BudgetLink(node) => Some(node),
            _ => None,
        }
    }

    fn downcast_mut(payload: &mut NodePayload) -> Option<&mut Self> {
        match payload {
            NodePayload::BudgetLink(node) => Some(node),
            _ => None,
        }
    }
}

impl From<BudgetLinkNode> for NodePayload {
    fn from(node: BudgetLinkNode) -> Self {
        NodePayload::BudgetLink(node)
    }
}
