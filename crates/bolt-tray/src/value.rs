//! Property values and their conversion to D-Bus variants.

use tracing::error;
use zbus::zvariant::{ObjectPath, Value};

/// A property value as produced by the dispatcher, before wire conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropValue {
    Str(String),
    Bool(bool),
    I32(i32),
    U32(u32),
    StrList(Vec<String>),
    ObjectPath(String),
    /// `a(ss)`: title/text pairs
    Pairs(Vec<(String, String)>),
}

impl PropValue {
    /// Convert to a wire value.
    ///
    /// # Errors
    ///
    /// Fails when the value has no valid wire form, e.g. a malformed object
    /// path.
    pub fn to_value(&self) -> zbus::zvariant::Result<Value<'static>> {
        Ok(match self {
            PropValue::Str(s) => Value::from(s.clone()),
            PropValue::Bool(b) => Value::from(*b),
            PropValue::I32(n) => Value::from(*n),
            PropValue::U32(n) => Value::from(*n),
            PropValue::StrList(list) => Value::from(list.clone()),
            PropValue::ObjectPath(path) => Value::from(ObjectPath::try_from(path.clone())?),
            PropValue::Pairs(pairs) => Value::from(pairs.clone()),
        })
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::Str(s.to_string())
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

/// Wire value for a property, or `None` (logged) when it cannot be converted.
#[must_use]
pub fn to_wire(name: &str, value: &PropValue) -> Option<Value<'static>> {
    match value.to_value() {
        Ok(value) => Some(value),
        Err(e) => {
            error!("Cannot convert property '{name}' ({value:?}): {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signature(value: &PropValue) -> String {
        value.to_value().unwrap().value_signature().to_string()
    }

    #[test]
    fn test_scalar_signatures() {
        assert_eq!(signature(&PropValue::from("x")), "s");
        assert_eq!(signature(&PropValue::from(true)), "b");
        assert_eq!(signature(&PropValue::U32(3)), "u");
        assert_eq!(signature(&PropValue::StrList(Vec::new())), "as");
    }

    #[test]
    fn test_pairs_and_path_signatures() {
        let tooltip = PropValue::Pairs(vec![("icon".into(), String::new())]);
        assert_eq!(signature(&tooltip), "a(ss)");

        let path = PropValue::ObjectPath("/org/ayatana/NotificationItem/Bolt/Menu".into());
        assert_eq!(signature(&path), "o");
    }

    #[test]
    fn test_unconvertible_value_is_reported_not_raised() {
        let bad = PropValue::ObjectPath("not a path".into());
        assert!(bad.to_value().is_err());
        assert!(to_wire("Menu", &bad).is_none());
    }
}
