use indexmap::IndexMap;
use quick_xml::events::BytesStart;

use crate::error::{InputError, InputResult};

/// Attributes of one element, in document order.
pub(crate) struct Attributes {
    element: String,
    values: IndexMap<String, String>,
}

impl Attributes {
    pub(crate) fn of(tag: &BytesStart) -> InputResult<Self> {
        let element = String::from_utf8_lossy(tag.name().as_ref()).into_owned();
        let mut values = IndexMap::new();
        for attribute in tag.attributes() {
            let attribute = attribute?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(InputError::Value)?
                .into_owned();
            values.insert(key, value);
        }
        Ok(Self { element, values })
    }

    pub(crate) fn text(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub(crate) fn required_text(&self, name: &str) -> InputResult<&str> {
        self.text(name).ok_or_else(|| InputError::MissingAttribute {
            element: self.element.clone(),
            attribute: name.to_string(),
        })
    }

    pub(crate) fn number(&self, name: &str) -> InputResult<Option<f64>> {
        match self.text(name) {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| InputError::InvalidNumber {
                    attribute: name.to_string(),
                    value: raw.to_string(),
                }),
        }
    }

    pub(crate) fn number_or_zero(&self, name: &str) -> InputResult<f64> {
        Ok(self.number(name)?.unwrap_or(0.0))
    }
}
