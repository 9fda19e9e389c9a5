use super::currency::{CATEGORIES, DEFAULT_CURRENCY};
use crate::codec::{finite_or_zero, format_amount, json_number, parse_amount, JsonFields};
use crate::errors::CodecError;
use crate::node_type::{DomConversion, DomConvertible, ImportContext, NodeKind, NodeType, Serializable};
use crate::payload::NodePayload;
use crate::state::EditorState;
use playground_dom::{DomElement, DomNode};
use serde_json::{Map, Value};
use tracing::debug;

pub const TRAVEL_BUDGET_MARKER: &str = "data-lexical-travel-budget";

/// One budget line of a trip
#[derive(Debug, Clone, PartialEq)]
pub struct TravelBudgetOption {
    pub title: String,
    pub time: String,
    pub currency: String,
    pub amt: f64,
    pub category: String,
}

impl Default for TravelBudgetOption {
    fn default() -> Self {
        Self {
            title: String::new(),
            time: String::new(),
            currency: DEFAULT_CURRENCY.to_string(),
            amt: 0.0,
            category: CATEGORIES[0].to_string(),
        }
    }
}

impl TravelBudgetOption {
    fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("title".into(), Value::String(self.title.clone()));
        map.insert("time".into(), Value::String(self.time.clone()));
        map.insert("currency".into(), Value::String(self.currency.clone()));
        map.insert("amt".into(), json_number(self.amt));
        map.insert("category".into(), Value::String(self.category.clone()));
        Value::Object(map)
    }

    fn from_json(map: &Map<String, Value>) -> Result<Self, CodecError> {
        let fields = JsonFields::new(TravelBudgetNode::TYPE, map);
        Ok(Self {
            title: fields.string("title")?,
            time: fields.string("time")?,
            currency: fields.string("currency")?,
            amt: fields.number("amt")?,
            category: fields.string("category")?,
        })
    }
}

/// Decorator block holding one budget option and an optional caption document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TravelBudgetNode {
    option: TravelBudgetOption,
    caption: Option<EditorState>,
}

impl TravelBudgetNode {
    pub fn new(mut option: TravelBudgetOption) -> Self {
        option.amt = finite_or_zero(option.amt);
        Self {
            option,
            caption: None,
        }
    }

    pub fn option(&self) -> &TravelBudgetOption {
        &self.option
    }

    /// The nested caption document, owned exclusively by this node
    pub fn caption(&self) -> Option<&EditorState> {
        self.caption.as_ref()
    }

    pub fn set_option(&mut self, option: TravelBudgetOption) {
        self.option = option;
        self.option.amt = finite_or_zero(self.option.amt);
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.option.title = title.into();
    }

    pub fn set_time(&mut self, time: impl Into<String>) {
        self.option.time = time.into();
    }

    pub fn set_currency(&mut self, currency: impl Into<String>) {
        self.option.currency = currency.into();
    }

    pub fn set_amount(&mut self, amt: f64) {
        self.option.amt = finite_or_zero(amt);
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.option.category = category.into();
    }

    pub fn set_caption(&mut self, caption: Option<EditorState>) {
        self.caption = caption;
    }
}

impl Serializable for TravelBudgetNode {
    fn export_json(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("option".into(), self.option.to_json());
        if let Some(caption) = &self.caption {
            let mut nested = Map::new();
            nested.insert("editorState".into(), caption.to_json());
            map.insert("caption".into(), Value::Object(nested));
        }
        map
    }
}

impl DomConvertible for TravelBudgetNode {
    fn export_dom(&self) -> DomNode {
        DomElement::new("div")
            .with_attr(TRAVEL_BUDGET_MARKER, "true")
            .with_attr("data-title", self.option.title.clone())
            .with_attr("data-time", self.option.time.clone())
            .with_attr("data-currency", self.option.currency.clone())
            .with_attr("data-amount", format_amount(self.option.amt))
            .with_attr("data-category", self.option.category.clone())
            .into()
    }
}

fn convert_travel_budget_element(element: &DomElement) -> Option<NodePayload> {
    if !element.has_attr(TRAVEL_BUDGET_MARKER) {
        return None;
    }
    let defaults = TravelBudgetOption::default();
    let text = |name: &str, default: &str| element.attr(name).unwrap_or(default).to_string();
    let option = TravelBudgetOption {
        title: text("data-title", &defaults.title),
        time: text("data-time", &defaults.time),
        currency: text("data-currency", &defaults.currency),
        amt: parse_amount(element.attr("data-amount"), defaults.amt),
        category: text("data-category", &defaults.category),
    };
    Some(TravelBudgetNode::new(option).into())
}

impl NodeType for TravelBudgetNode {
    const TYPE: &'static str = "travelbudget";
    const KIND: NodeKind = NodeKind::Decorator;

    fn import_json(fields: &JsonFields<'_>, ctx: &ImportContext<'_>) -> Result<Self, CodecError> {
        let option = TravelBudgetOption::from_json(fields.object("option")?)?;

        let caption = match fields.get("caption") {
            None | Some(Value::Null) => None,
            Some(Value::Object(nested)) => {
                let state = nested
                    .get("editorState")
                    .ok_or_else(|| fields.malformed("caption", "missing editorState"))?;
                let (state, report) = EditorState::from_json(state, ctx.registry)
                    .map_err(|e| fields.malformed("caption", e.to_string()))?;
                debug!(
                    nodes = report.nodes,
                    recovered = report.recovered.len(),
                    "Imported travel budget caption"
                );
                Some(state)
            }
            Some(other) => {
                return Err(fields.malformed("caption", format!("expected object, found {}", other)))
            }
        };

        Ok(Self { option, caption })
    }

    fn import_dom() -> Vec<DomConversion> {
        vec![DomConversion::new("div", 2, convert_travel_budget_element)]
    }

    fn downcast(payload: &NodePayload) -> Option<&Self> {
        match payload {
            NodePayload::TravelBudget(node) => Some(node),
            _ => None,
        }
    }

    fn downcast_mut(payload: &mut NodePayload) -> Option<&mut Self> {
        match payload {
            NodePayload::TravelBudget(node) => Some(node),
            _ => None,
        }
    }
}

impl From<TravelBudgetNode> for NodePayload {
    fn from(node: TravelBudgetNode) -> Self {
        NodePayload::TravelBudget(node)
    }
}
