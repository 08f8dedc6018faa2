//! Choice fields exposed to clients.
//!
//! A model lists its enumerated fields through [`ChoiceFields`]; each
//! enumerated type implements [`Choice`] so its values and labels can be
//! rendered as `{field: {value: label}}`.

use indexmap::IndexMap;
use restkit_core::{Result, ToolkitError};

/// An enumerated value with a stored value and a human label.
pub trait Choice: Sized + 'static {
    /// Every variant, in display order.
    const ALL: &'static [Self];

    fn value(&self) -> &'static str;

    fn label(&self) -> &'static str;

    /// Parses a stored value.
    fn from_value(value: &str) -> Option<Self>
    where
        Self: Copy,
    {
        Self::ALL.iter().copied().find(|c| c.value() == value)
    }
}

/// `(value, label)` pairs of a choice type.
pub fn pairs<C: Choice>() -> Vec<(&'static str, &'static str)> {
    C::ALL.iter().map(|c| (c.value(), c.label())).collect()
}

/// Models whose fields may carry choices.
pub trait ChoiceFields {
    const MODEL_NAME: &'static str;

    /// `None` when the model has no such field; an empty list when the
    /// field exists but has no choices.
    fn field_choices(field: &str) -> Option<Vec<(&'static str, &'static str)>>;
}

pub type ChoiceMap = IndexMap<String, IndexMap<String, String>>;

/// Collects the choices of `fields` in the given order.
///
/// A missing field list is a configuration error; an unknown field or a
/// field without choices is a validation error.
pub fn choices_for<M: ChoiceFields>(fields: Option<&[&str]>) -> Result<ChoiceMap> {
    let fields = fields.ok_or_else(|| {
        ToolkitError::configuration("The choice_fields attribute must be set.")
    })?;

    let mut map = ChoiceMap::new();
    for field in fields {
        let choices = M::field_choices(field).ok_or_else(|| {
            ToolkitError::validation(
                *field,
                format!("The field '{}' does not exist in model '{}'.", field, M::MODEL_NAME),
            )
        })?;

        if choices.is_empty() {
            return Err(ToolkitError::validation(
                *field,
                format!(
                    "The field '{}' in model '{}' has no choices defined.",
                    field,
                    M::MODEL_NAME
                ),
            ));
        }

        map.insert(
            field.to_string(),
            choices
                .into_iter()
                .map(|(value, label)| (value.to_string(), label.to_string()))
                .collect(),
        );
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Size {
        Small,
        Large,
    }

    impl Choice for Size {
        const ALL: &'static [Self] = &[Size::Small, Size::Large];

        fn value(&self) -> &'static str {
            match self {
                Size::Small => "s",
                Size::Large => "l",
            }
        }

        fn label(&self) -> &'static str {
            match self {
                Size::Small => "Small",
                Size::Large => "Large",
            }
        }
    }

    struct Shirt;

    impl ChoiceFields for Shirt {
        const MODEL_NAME: &'static str = "Shirt";

        fn field_choices(field: &str) -> Option<Vec<(&'static str, &'static str)>> {
            match field {
                "size" => Some(pairs::<Size>()),
                "name" => Some(Vec::new()),
                _ => None,
            }
        }
    }

    #[test]
    fn test_choices_for_declared_fields() {
        let map = choices_for::<Shirt>(Some(&["size"])).unwrap();
        let size = &map["size"];

        assert_eq!(size.get("s").map(String::as_str), Some("Small"));
        assert_eq!(size.keys().collect::<Vec<_>>(), vec!["s", "l"]);
    }

    #[test]
    fn test_field_errors() {
        let unknown = choices_for::<Shirt>(Some(&["color"])).unwrap_err();
        assert!(unknown.to_string().contains("does not exist in model 'Shirt'"));

        let plain = choices_for::<Shirt>(Some(&["name"])).unwrap_err();
        assert!(plain.to_string().contains("has no choices defined"));
    }

    #[test]
    fn test_missing_field_list_is_configuration() {
        assert!(choices_for::<Shirt>(None).unwrap_err().is_configuration());
    }

    #[test]
    fn test_from_value() {
        assert_eq!(Size::from_value("l"), Some(Size::Large));
        assert_eq!(Size::from_value("xl"), None);
    }
}
