use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
#[cfg(feature = "validation")]
use validator::Validate;

use crate::{Kind, Resource};

/// An organization that accounts belong to.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct Organization {
    #[serde(default)]
    pub kind: Kind<Organization>,
    pub id: Option<String>,
    pub href: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    #[cfg_attr(feature = "validation", validate(length(min = 1, max = 64)))]
    pub external_id: Option<String>,
    #[cfg_attr(feature = "validation", validate(range(min = 0)))]
    pub member_count: Option<i64>,
    #[cfg_attr(feature = "validation", validate(length(min = 1, max = 254)))]
    pub name: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Organization {
    /// An abbreviated stub that only locates the organization.
    pub fn link(id: impl Into<String>) -> Self {
        let id = id.into();
        Organization {
            kind: Kind::link(),
            href: Some(format!("/v1/organizations/{id}")),
            id: Some(id),
            ..Default::default()
        }
    }
}

impl Resource for Organization {
    const KIND: &'static str = "Organization";
    const LINK_KIND: &'static str = "OrganizationLink";
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn round_trip() -> anyhow::Result<()> {
        let value = json!({
            "kind": "Organization",
            "id": "o-42",
            "href": "/v1/organizations/o-42",
            "external_id": "ext-000917",
            "member_count": 18,
            "name": "Analytical Engines Ltd",
        });
        let organization: Organization =
            serde_json::from_value(value.clone())?;
        assert_eq!(Some(18), organization.member_count);
        assert_eq!(value, serde_json::to_value(organization)?);
        Ok(())
    }

    #[test]
    fn kind_string_is_declared_first() -> anyhow::Result<()> {
        let text = serde_json::to_string(&Organization::link("o-42"))?;
        assert!(
            text.starts_with("{\"kind\":\"OrganizationLink\""),
            "unexpected field order: {text}"
        );
        Ok(())
    }
}
