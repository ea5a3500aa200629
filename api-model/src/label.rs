use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
#[cfg(feature = "validation")]
use validator::{Validate, ValidationError};

#[cfg(feature = "validation")]
use crate::validation_util::invalid;
use crate::{Kind, Resource};

/// A key/value annotation attached to an account.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct Label {
    #[serde(default)]
    pub kind: Kind<Label>,
    pub id: Option<String>,
    pub href: Option<String>,
    // Internal labels are reserved for service operators.
    pub internal: Option<bool>,
    #[cfg_attr(feature = "validation", validate(custom = "validate_label_key"))]
    pub key: Option<String>,
    #[cfg_attr(feature = "validation", validate(length(max = 1024)))]
    pub value: Option<String>,
}

impl Label {
    /// An abbreviated stub that only locates the label.
    pub fn link(id: impl Into<String>) -> Self {
        let id = id.into();
        Label {
            kind: Kind::link(),
            href: Some(format!("/v1/labels/{id}")),
            id: Some(id),
            ..Default::default()
        }
    }
}

impl Resource for Label {
    const KIND: &'static str = "Label";
    const LINK_KIND: &'static str = "LabelLink";
}

#[cfg(feature = "validation")]
fn validate_label_key(key: &str) -> Result<(), ValidationError> {
    if key.is_empty() || key.len() > 63 {
        return Err(invalid(
            "invalid_label_key",
            "Label keys must be between 1 and 63 characters",
        ));
    }
    if key.chars().any(|c| c.is_whitespace()) {
        return Err(invalid(
            "invalid_label_key",
            format!("Label key '{key}' must not contain whitespace"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn round_trip() -> anyhow::Result<()> {
        let value = json!({
            "kind": "Label",
            "id": "l-3",
            "internal": true,
            "key": "tier",
            "value": "gold",
        });
        let label: Label = serde_json::from_value(value.clone())?;
        assert_eq!(Some("tier"), label.key.as_deref());
        assert_eq!(value, serde_json::to_value(label)?);
        Ok(())
    }

    #[cfg(feature = "validation")]
    #[test]
    fn label_keys_are_checked() {
        use validator::Validate;

        let long_key = "x".repeat(64);
        let bad_keys = vec!["", "has a space", long_key.as_str()];
        for key in bad_keys {
            let label = Label {
                key: Some(key.to_string()),
                ..Default::default()
            };
            assert!(
                label.validate().is_err(),
                "key {key:?} should have been rejected"
            );
        }

        let label = Label {
            key: Some("tier".to_string()),
            value: Some("gold".to_string()),
            ..Default::default()
        };
        assert!(label.validate().is_ok());
    }
}
