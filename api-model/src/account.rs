use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
#[cfg(feature = "validation")]
use validator::Validate;

use crate::{Kind, Label, Organization, Resource};

/// Lifecycle status of an account.
///
/// Servers grow new statuses over time. A string this crate does not
/// recognize decodes into [`AccountStatus::Unknown`] and round-trips
/// unchanged instead of failing the record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Suspended,
    Deprovisioned,
    #[serde(untagged)]
    Unknown(String),
}

impl AccountStatus {
    pub fn as_str(&self) -> &str {
        match self {
            | AccountStatus::Active => "active",
            | AccountStatus::Suspended => "suspended",
            | AccountStatus::Deprovisioned => "deprovisioned",
            | AccountStatus::Unknown(s) => s,
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user account.
///
/// Every attribute besides `kind` is independently optional; absent fields
/// stay off the wire entirely. Timestamps are RFC 3339 and a malformed one
/// aborts the whole record decode with the underlying parse error.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct Account {
    #[serde(default)]
    pub kind: Kind<Account>,
    pub id: Option<String>,
    pub href: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    #[cfg_attr(feature = "validation", validate(email))]
    pub email: Option<String>,
    #[cfg_attr(feature = "validation", validate)]
    pub labels: Option<Vec<Label>>,
    #[cfg_attr(feature = "validation", validate(length(min = 1, max = 254)))]
    pub name: Option<String>,
    #[cfg_attr(feature = "validation", validate)]
    pub organization: Option<Organization>,
    pub service_account: Option<bool>,
    pub status: Option<AccountStatus>,
    pub updated_at: Option<DateTime<Utc>>,
    #[cfg_attr(feature = "validation", validate(length(min = 1, max = 64)))]
    pub username: Option<String>,
}

impl Account {
    /// An abbreviated stub that only locates the account.
    pub fn link(id: impl Into<String>) -> Self {
        let id = id.into();
        Account {
            kind: Kind::link(),
            href: Some(format!("/v1/accounts/{id}")),
            id: Some(id),
            ..Default::default()
        }
    }
}

impl Resource for Account {
    const KIND: &'static str = "Account";
    const LINK_KIND: &'static str = "AccountLink";
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::Representation;

    #[test]
    fn full_record_round_trip() -> anyhow::Result<()> {
        let value = json!({
            "kind": "Account",
            "id": "a-93ddb1",
            "href": "/v1/accounts/a-93ddb1",
            "created_at": "2023-06-02T11:04:09Z",
            "email": "ada@example.com",
            "name": "Ada Lovelace",
            "organization": {
                "kind": "OrganizationLink",
                "id": "o-11",
                "href": "/v1/organizations/o-11",
            },
            "service_account": false,
            "status": "active",
            "username": "ada",
        });

        let account: Account = serde_json::from_value(value.clone())?;
        assert_eq!(Some("a-93ddb1"), account.id.as_deref());
        assert_eq!(Some(AccountStatus::Active), account.status);
        let organization = account.organization.as_ref().unwrap();
        assert!(organization.kind.is_link());

        assert_eq!(value, serde_json::to_value(&account)?);
        Ok(())
    }

    #[test]
    fn absent_fields_stay_off_the_wire() -> anyhow::Result<()> {
        let account = Account {
            id: Some("a-1".to_string()),
            ..Default::default()
        };
        assert_eq!(
            json!({ "kind": "Account", "id": "a-1" }),
            serde_json::to_value(account)?
        );
        Ok(())
    }

    #[test]
    fn link_stub() -> anyhow::Result<()> {
        let link = Account::link("a-5");
        assert_eq!(Representation::Link, link.kind.representation());
        assert_eq!(
            json!({
                "kind": "AccountLink",
                "id": "a-5",
                "href": "/v1/accounts/a-5",
            }),
            serde_json::to_value(link)?
        );
        Ok(())
    }

    #[test]
    fn unknown_fields_are_ignored() -> anyhow::Result<()> {
        let account: Account = serde_json::from_value(json!({
            "kind": "Account",
            "id": "a-7",
            "quota": { "seats": 40 },
            "rhit_account_number": 7912,
            "username": "grace",
        }))?;
        assert_eq!(Some("a-7"), account.id.as_deref());
        assert_eq!(Some("grace"), account.username.as_deref());
        Ok(())
    }

    #[test]
    fn missing_kind_decodes_as_full() -> anyhow::Result<()> {
        let account: Account =
            serde_json::from_value(json!({ "id": "a-2" }))?;
        assert_eq!(Representation::Full, account.kind.representation());
        Ok(())
    }

    #[test]
    fn unknown_status_round_trips() -> anyhow::Result<()> {
        let account: Account = serde_json::from_value(json!({
            "kind": "Account",
            "status": "pending_deletion",
        }))?;
        assert_eq!(
            Some(AccountStatus::Unknown("pending_deletion".to_string())),
            account.status
        );
        assert_eq!(
            json!({ "kind": "Account", "status": "pending_deletion" }),
            serde_json::to_value(account)?
        );
        Ok(())
    }

    #[test]
    fn malformed_timestamp_aborts_decode() {
        let result: Result<Account, _> = serde_json::from_value(json!({
            "kind": "Account",
            "id": "a-9",
            "created_at": "last tuesday",
        }));
        assert!(result.is_err());
    }

    #[cfg(feature = "validation")]
    #[test]
    fn validation_rejects_bad_email() {
        use validator::Validate;

        let account = Account {
            email: Some("not-an-email".to_string()),
            ..Default::default()
        };
        assert!(account.validate().is_err());

        let account = Account {
            email: Some("ada@example.com".to_string()),
            ..Default::default()
        };
        assert!(account.validate().is_ok());
    }

    #[cfg(feature = "validation")]
    #[test]
    fn absent_fields_validate_vacuously() {
        use validator::Validate;

        assert!(Account::default().validate().is_ok());
    }
}
