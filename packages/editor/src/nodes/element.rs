use crate::codec::JsonFields;
use crate::errors::CodecError;
use serde_json::{Map, Value};

/// Block formatting shared by every element node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementFormat {
    /// `ltr`, `rtl` or unset
    pub direction: Option<String>,
    /// Alignment (`left`, `center`, ...), empty when unset
    pub format: String,
    pub indent: u32,
}

impl ElementFormat {
    pub(crate) fn write_json(&self, map: &mut Map<String, Value>) {
        map.insert(
            "direction".into(),
            self.direction.clone().map(Value::String).unwrap_or(Value::Null),
        );
        map.insert("format".into(), Value::String(self.format.clone()));
        map.insert("indent".into(), Value::from(self.indent));
    }

    pub(crate) fn read_json(fields: &JsonFields<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            direction: fields.optional_string("direction")?,
            format: fields.string_or("format", "")?,
            indent: fields.u32_or("indent", 0)?,
        })
    }
}
