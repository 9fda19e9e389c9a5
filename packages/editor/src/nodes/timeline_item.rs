use crate::codec::JsonFields;
use crate::errors::CodecError;
use crate::node_type::{DomConversion, DomConvertible, ImportContext, NodeKind, NodeType, Serializable};
use crate::payload::NodePayload;
use playground_dom::{DomElement, DomNode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

pub const TIMELINE_ITEM_MARKER: &str = "data-lexical-timeline-item";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineColor {
    #[default]
    Green,
    Yellow,
    Red,
    Blue,
    Black,
    White,
}

impl TimelineColor {
    pub const ALL: [TimelineColor; 6] = [
        TimelineColor::Green,
        TimelineColor::Yellow,
        TimelineColor::Red,
        TimelineColor::Blue,
        TimelineColor::Black,
        TimelineColor::White,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TimelineColor::Green => "green",
            TimelineColor::Yellow => "yellow",
            TimelineColor::Red => "red",
            TimelineColor::Blue => "blue",
            TimelineColor::Black => "black",
            TimelineColor::White => "white",
        }
    }
}

impl fmt::Display for TimelineColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimelineColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimelineColor::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown timeline colour '{}'", s))
    }
}

/// One stop of an itinerary timeline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineItemNode {
    pub time: String,
    /// Icon name, e.g. `bus` or `plane`
    pub icon: String,
    pub color: TimelineColor,
    pub description: String,
}

impl TimelineItemNode {
    pub fn new(
        time: impl Into<String>,
        icon: impl Into<String>,
        color: TimelineColor,
        description: impl Into<String>,
    ) -> Self {
        Self {
            time: time.into(),
            icon: icon.into(),
            color,
            description: description.into(),
        }
    }

    /// `#<time> [<icon>--<color>]: <description>`
    pub fn text_content(&self) -> String {
        format!(
            "#{} [{}--{}]: {}",
            self.time, self.icon, self.color, self.description
        )
    }
}

impl Serializable for TimelineItemNode {
    fn export_json(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("time".into(), Value::String(self.time.clone()));
        map.insert("icon".into(), Value::String(self.icon.clone()));
        map.insert("color".into(), Value::String(self.color.as_str().to_string()));
        map.insert("description".into(), Value::String(self.description.clone()));
        map
    }
}

impl DomConvertible for TimelineItemNode {
    fn export_dom(&self) -> DomNode {
        DomElement::new("div")
            .with_attr(TIMELINE_ITEM_MARKER, "true")
            .with_attr("data-time", self.time.clone())
            .with_attr("data-icon", self.icon.clone())
            .with_attr("data-color", self.color.as_str())
            .with_text(self.description.clone())
            .into()
    }
}

fn convert_timeline_item_element(element: &DomElement) -> Option<NodePayload> {
    if !element.has_attr(TIMELINE_ITEM_MARKER) {
        return None;
    }
    let color = match element.attr("data-color") {
        Some(raw) => raw.parse().unwrap_or_else(|reason: String| {
            warn!(%reason, "Timeline colour attribute ignored");
            TimelineColor::default()
        }),
        None => TimelineColor::default(),
    };
    Some(
        TimelineItemNode {
            time: element.attr("data-time").unwrap_or_default().to_string(),
            icon: element.attr("data-icon").unwrap_or_default().to_string(),
            color,
            description: element.text_content(),
        }
        .into(),
    )
}

impl NodeType for TimelineItemNode {
    const TYPE: &'static str = "timelineitem";
    const KIND: NodeKind = NodeKind::Decorator;

    fn import_json(fields: &JsonFields<'_>, _ctx: &ImportContext<'_>) -> Result<Self, CodecError> {
        let color = fields
            .string_or("color", TimelineColor::default().as_str())?
            .parse()
            .map_err(|reason: String| fields.malformed("color", reason))?;

        Ok(Self {
            time: fields.string("time")?,
            icon: fields.string("icon")?,
            color,
            description: fields.string("description")?,
        })
    }

    fn import_dom() -> Vec<DomConversion> {
        vec![DomConversion::new("div", 2, convert_timeline_item_element)]
    }

    fn downcast(payload: &NodePayload) -> Option<&Self> {
        match payload {
            NodePayload::TimelineItem(node) => Some(node),
            _ => None,
        }
    }

    fn downcast_mut(payload: &mut NodePayload) -> Option<&mut Self> {
        match payload {
            NodePayload::TimelineItem(node) => Some(node),
            _ => None,
        }
    }
}

impl From<TimelineItemNode> for NodePayload {
    fn from(node: TimelineItemNode) -> Self {
        NodePayload::TimelineItem(node)
    }
}
