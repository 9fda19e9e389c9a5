use crate::codec::JsonFields;
use crate::errors::CodecError;
use crate::node_type::{DomConversion, DomConvertible, ImportContext, NodeKind, NodeType, Serializable};
use crate::payload::NodePayload;
use playground_dom::{DomElement, DomNode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use rand::Rng;
use std::collections::BTreeSet;
use tracing::warn;

pub const POLL_QUESTION_ATTR: &str = "data-lexical-poll-question";
pub const POLL_OPTIONS_ATTR: &str = "data-lexical-poll-options";

const UID_LEN: usize = 5;

/// One answer of a poll; voters are identified by their numeric client id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    pub text: String,
    pub uid: String,
    #[serde(default)]
    pub votes: BTreeSet<u64>,
}

impl PollOption {
    fn new(text: impl Into<String>, uid: String) -> Self {
        Self {
            text: text.into(),
            uid,
            votes: BTreeSet::new(),
        }
    }
}

/// Five random lowercase letters
fn random_uid() -> String {
    let mut rng = rand::thread_rng();
    (0..UID_LEN)
        .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollNode {
    question: String,
    options: Vec<PollOption>,
}

impl PollNode {
    /// New poll with two empty options
    pub fn new(question: impl Into<String>) -> Self {
        let mut poll = Self {
            question: question.into(),
            options: Vec::new(),
        };
        poll.add_option("");
        poll.add_option("");
        poll
    }

    pub fn with_options(question: impl Into<String>, options: Vec<PollOption>) -> Self {
        Self {
            question: question.into(),
            options,
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn options(&self) -> &[PollOption] {
        &self.options
    }

    pub fn option(&self, uid: &str) -> Option<&PollOption> {
        self.options.iter().find(|o| o.uid == uid)
    }

    pub fn total_votes(&self) -> usize {
        self.options.iter().map(|o| o.votes.len()).sum()
    }

    pub fn set_question(&mut self, question: impl Into<String>) {
        self.question = question.into();
    }

    /// Append an option and return its uid, unique within this poll
    pub fn add_option(&mut self, text: impl Into<String>) -> String {
        let uid = loop {
            let candidate = random_uid();
            if self.option(&candidate).is_none() {
                break candidate;
            }
        };
        self.options.push(PollOption::new(text, uid.clone()));
        uid
    }

    pub fn delete_option(&mut self, uid: &str) -> bool {
        let before = self.options.len();
        self.options.retain(|o| o.uid != uid);
        self.options.len() != before
    }

    pub fn set_option_text(&mut self, uid: &str, text: impl Into<String>) -> bool {
        match self.options.iter_mut().find(|o| o.uid == uid) {
            Some(option) => {
                option.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Add the client's vote if absent, remove it if present.
    /// Returns whether the client now votes for the option, `None` for an unknown uid.
    pub fn toggle_vote(&mut self, uid: &str, client_id: u64) -> Option<bool> {
        let option = self.options.iter_mut().find(|o| o.uid == uid)?;
        if option.votes.remove(&client_id) {
            Some(false)
        } else {
            option.votes.insert(client_id);
            Some(true)
        }
    }
}

impl Default for PollNode {
    fn default() -> Self {
        Self::new("")
    }
}

fn options_json(options: &[PollOption]) -> Value {
    serde_json::to_value(options).unwrap_or(Value::Array(Vec::new()))
}

impl Serializable for PollNode {
    fn export_json(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("question".into(), Value::String(self.question.clone()));
        map.insert("options".into(), options_json(&self.options));
        map
    }
}

impl DomConvertible for PollNode {
    fn export_dom(&self) -> DomNode {
        DomElement::new("span")
            .with_attr(POLL_QUESTION_ATTR, self.question.clone())
            .with_attr(POLL_OPTIONS_ATTR, options_json(&self.options).to_string())
            .into()
    }
}

fn convert_poll_element(element: &DomElement) -> Option<NodePayload> {
    let question = element.attr(POLL_QUESTION_ATTR)?;
    let poll = match element.attr(POLL_OPTIONS_ATTR) {
        Some(raw) => match serde_json::from_str::<Vec<PollOption>>(raw) {
            Ok(options) => PollNode::with_options(question, options),
            Err(e) => {
                warn!(error = %e, "Malformed poll options attribute - using default options");
                PollNode::new(question)
            }
        },
        None => PollNode::new(question),
    };
    Some(poll.into())
}

impl NodeType for PollNode {
    const TYPE: &'static str = "poll";
    const KIND: NodeKind = NodeKind::Decorator;

    fn import_json(fields: &JsonFields<'_>, _ctx: &ImportContext<'_>) -> Result<Self, CodecError> {
        let options = fields
            .array("options")?
            .iter()
            .map(|raw| serde_json::from_value::<PollOption>(raw.clone()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| fields.malformed("options", e.to_string()))?;

        Ok(Self {
            question: fields.string("question")?,
            options,
        })
    }

    fn import_dom() -> Vec<DomConversion> {
        vec![DomConversion::new("span", 2, convert_poll_element)]
    }

    fn downcast(payload: &NodePayload) -> Option<&Self> {
        match payload {
            NodePayload::Poll(node) => Some(node),
            _ => None,
        }
    }

    fn downcast_mut(payload: &mut NodePayload) -> Option<&mut Self> {
        match payload {
            NodePayload::Poll(node) => Some(node),
            _ => None,
        }
    }
}

impl From<PollNode> for NodePayload {
    fn from(node: PollNode) -> Self {
        NodePayload::Poll(node)
    }
}
