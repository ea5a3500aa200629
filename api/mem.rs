//! In-memory backends for the service traits.
//!
//! `rosterd` serves from these and the integration tests treat them as the
//! reference implementation. Records live in insertion order behind an
//! async `RwLock`, so listings are deterministic.

use async_trait::async_trait;
use chrono::Utc;
use roster_api_model::{
    Account,
    AccountStatus,
    Kind,
    Label,
    Organization,
    Paginated,
};
use tokio::sync::RwLock;
use ulid::Ulid;

use crate::pagination::ListParams;
use crate::service::{
    AccountsService,
    OrganizationsService,
    Reply,
    ServiceError,
};

#[derive(Default)]
pub struct MemAccounts {
    records: RwLock<Vec<Account>>,
}

#[derive(Default)]
pub struct MemOrganizations {
    records: RwLock<Vec<Organization>>,
}

fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Ulid::new().to_string().to_lowercase())
}

fn account_not_found(id: &str) -> ServiceError {
    ServiceError::NotFound(format!("Account '{id}' does not exist"))
}

fn organization_not_found(id: &str) -> ServiceError {
    ServiceError::NotFound(format!("Organization '{id}' does not exist"))
}

fn contains(field: &Option<String>, needle: &str) -> bool {
    field
        .as_deref()
        .map(|value| value.to_lowercase().contains(needle))
        .unwrap_or(false)
}

fn page_of<T>(filtered: Vec<T>, params: &ListParams) -> Paginated<T> {
    let total = filtered.len() as i64;
    let items = filtered
        .into_iter()
        .skip(params.offset())
        .take(params.size.max(0) as usize)
        .collect();
    params.paginate(items, total)
}

#[async_trait]
impl AccountsService for MemAccounts {
    // Lists in insertion order; `order` expressions are not interpreted by
    // the dev backend.
    async fn list(
        &self,
        params: ListParams,
    ) -> Result<Reply<Paginated<Account>>, ServiceError> {
        let records = self.records.read().await;
        let filtered: Vec<Account> = match params.search.as_deref() {
            | Some(needle) => {
                let needle = needle.to_lowercase();
                records
                    .iter()
                    .filter(|account| {
                        contains(&account.name, &needle)
                            || contains(&account.username, &needle)
                    })
                    .cloned()
                    .collect()
            }
            | None => records.clone(),
        };
        Ok(page_of(filtered, &params).into())
    }

    async fn get(&self, id: String) -> Result<Reply<Account>, ServiceError> {
        let records = self.records.read().await;
        records
            .iter()
            .find(|account| account.id.as_deref() == Some(id.as_str()))
            .cloned()
            .map(Reply::from)
            .ok_or_else(|| account_not_found(&id))
    }

    async fn create(
        &self,
        mut account: Account,
    ) -> Result<Reply<Account>, ServiceError> {
        let mut records = self.records.write().await;
        if let Some(ref username) = account.username {
            let taken = records
                .iter()
                .any(|existing| existing.username.as_ref() == Some(username));
            if taken {
                return Err(ServiceError::Conflict(format!(
                    "Account username '{username}' is already taken"
                )));
            }
        }
        // The backend owns identity; whatever the caller sent is replaced.
        let id = new_id("acc");
        let now = Utc::now();
        account.kind = Kind::full();
        account.href = Some(format!("/v1/accounts/{id}"));
        account.id = Some(id);
        account.created_at = Some(now);
        account.updated_at = Some(now);
        if account.status.is_none() {
            account.status = Some(AccountStatus::Active);
        }
        records.push(account.clone());
        Ok(account.into())
    }

    async fn update(
        &self,
        id: String,
        patch: Account,
    ) -> Result<Reply<Account>, ServiceError> {
        let mut records = self.records.write().await;
        let stored = records
            .iter_mut()
            .find(|account| account.id.as_deref() == Some(id.as_str()))
            .ok_or_else(|| account_not_found(&id))?;
        if let Some(email) = patch.email {
            stored.email = Some(email);
        }
        if let Some(name) = patch.name {
            stored.name = Some(name);
        }
        if let Some(username) = patch.username {
            stored.username = Some(username);
        }
        if let Some(service_account) = patch.service_account {
            stored.service_account = Some(service_account);
        }
        if let Some(status) = patch.status {
            stored.status = Some(status);
        }
        if let Some(organization) = patch.organization {
            stored.organization = Some(organization);
        }
        if let Some(labels) = patch.labels {
            stored.labels = Some(labels);
        }
        stored.updated_at = Some(Utc::now());
        Ok(stored.clone().into())
    }

    async fn delete(&self, id: String) -> Result<Reply<()>, ServiceError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|account| account.id.as_deref() != Some(id.as_str()));
        if records.len() == before {
            return Err(account_not_found(&id));
        }
        Ok(().into())
    }

    async fn list_labels(
        &self,
        id: String,
        params: ListParams,
    ) -> Result<Reply<Paginated<Label>>, ServiceError> {
        let records = self.records.read().await;
        let account = records
            .iter()
            .find(|account| account.id.as_deref() == Some(id.as_str()))
            .ok_or_else(|| account_not_found(&id))?;
        let labels = account.labels.clone().unwrap_or_default();
        let filtered: Vec<Label> = match params.search.as_deref() {
            | Some(needle) => {
                let needle = needle.to_lowercase();
                labels
                    .into_iter()
                    .filter(|label| contains(&label.key, &needle))
                    .collect()
            }
            | None => labels,
        };
        Ok(page_of(filtered, &params).into())
    }

    async fn add_label(
        &self,
        id: String,
        mut label: Label,
    ) -> Result<Reply<Label>, ServiceError> {
        let mut records = self.records.write().await;
        let account = records
            .iter_mut()
            .find(|account| account.id.as_deref() == Some(id.as_str()))
            .ok_or_else(|| account_not_found(&id))?;
        let labels = account.labels.get_or_insert_with(Vec::new);
        if let Some(ref key) = label.key {
            if labels.iter().any(|l| l.key.as_ref() == Some(key)) {
                return Err(ServiceError::Conflict(format!(
                    "Label '{key}' already exists on account '{id}'"
                )));
            }
        }
        let label_id = new_id("lbl");
        label.kind = Kind::full();
        label.href = Some(format!("/v1/accounts/{id}/labels/{label_id}"));
        label.id = Some(label_id);
        if label.internal.is_none() {
            label.internal = Some(false);
        }
        labels.push(label.clone());
        account.updated_at = Some(Utc::now());
        Ok(label.into())
    }
}

#[async_trait]
impl OrganizationsService for MemOrganizations {
    async fn list(
        &self,
        params: ListParams,
    ) -> Result<Reply<Paginated<Organization>>, ServiceError> {
        let records = self.records.read().await;
        let filtered: Vec<Organization> = match params.search.as_deref() {
            | Some(needle) => {
                let needle = needle.to_lowercase();
                records
                    .iter()
                    .filter(|organization| {
                        contains(&organization.name, &needle)
                            || contains(&organization.external_id, &needle)
                    })
                    .cloned()
                    .collect()
            }
            | None => records.clone(),
        };
        Ok(page_of(filtered, &params).into())
    }

    async fn get(
        &self,
        id: String,
    ) -> Result<Reply<Organization>, ServiceError> {
        let records = self.records.read().await;
        records
            .iter()
            .find(|organization| {
                organization.id.as_deref() == Some(id.as_str())
            })
            .cloned()
            .map(Reply::from)
            .ok_or_else(|| organization_not_found(&id))
    }

    async fn create(
        &self,
        mut organization: Organization,
    ) -> Result<Reply<Organization>, ServiceError> {
        let mut records = self.records.write().await;
        let id = new_id("org");
        let now = Utc::now();
        organization.kind = Kind::full();
        organization.href = Some(format!("/v1/organizations/{id}"));
        organization.id = Some(id);
        organization.created_at = Some(now);
        organization.updated_at = Some(now);
        if organization.member_count.is_none() {
            organization.member_count = Some(0);
        }
        records.push(organization.clone());
        Ok(organization.into())
    }

    async fn update(
        &self,
        id: String,
        patch: Organization,
    ) -> Result<Reply<Organization>, ServiceError> {
        let mut records = self.records.write().await;
        let stored = records
            .iter_mut()
            .find(|organization| {
                organization.id.as_deref() == Some(id.as_str())
            })
            .ok_or_else(|| organization_not_found(&id))?;
        if let Some(external_id) = patch.external_id {
            stored.external_id = Some(external_id);
        }
        if let Some(member_count) = patch.member_count {
            stored.member_count = Some(member_count);
        }
        if let Some(name) = patch.name {
            stored.name = Some(name);
        }
        stored.updated_at = Some(Utc::now());
        Ok(stored.clone().into())
    }

    async fn delete(&self, id: String) -> Result<Reply<()>, ServiceError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|organization| {
            organization.id.as_deref() != Some(id.as_str())
        });
        if records.len() == before {
            return Err(organization_not_found(&id));
        }
        Ok(().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_account(username: &str) -> Account {
        Account {
            username: Some(username.to_owned()),
            name: Some(format!("The {username} account")),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_assigns_identity() {
        let accounts = MemAccounts::default();
        let created = accounts
            .create(draft_account("ada"))
            .await
            .unwrap()
            .body;
        let id = created.id.clone().unwrap();
        assert!(id.starts_with("acc_"));
        assert_eq!(Some(format!("/v1/accounts/{id}")), created.href);
        assert_eq!(Some(AccountStatus::Active), created.status);
        assert!(created.created_at.is_some());

        let fetched = accounts.get(id).await.unwrap().body;
        assert_eq!(created, fetched);
    }

    #[tokio::test]
    async fn update_patches_only_populated_fields() {
        let accounts = MemAccounts::default();
        let created = accounts
            .create(draft_account("grace"))
            .await
            .unwrap()
            .body;
        let id = created.id.clone().unwrap();

        let patch = Account {
            email: Some("grace@roster.dev".to_owned()),
            ..Default::default()
        };
        let updated = accounts.update(id, patch).await.unwrap().body;
        assert_eq!(Some("grace@roster.dev"), updated.email.as_deref());
        // Fields left out of the patch keep their stored values.
        assert_eq!(Some("grace"), updated.username.as_deref());
        assert_eq!(created.created_at, updated.created_at);
    }

    #[tokio::test]
    async fn list_filters_and_slices() {
        let accounts = MemAccounts::default();
        for username in ["ada", "adam", "grace"] {
            accounts.create(draft_account(username)).await.unwrap();
        }

        let params = ListParams {
            search: Some("ada".to_owned()),
            size: 1,
            ..Default::default()
        };
        let page = accounts.list(params).await.unwrap().body;
        assert_eq!(2, page.total());
        assert_eq!(1, page.len());
        assert_eq!(Some("ada"), page.items()[0].username.as_deref());

        let params = ListParams {
            search: Some("ada".to_owned()),
            page: 2,
            size: 1,
            ..Default::default()
        };
        let page = accounts.list(params).await.unwrap().body;
        assert_eq!(1, page.len());
        assert_eq!(Some("adam"), page.items()[0].username.as_deref());
    }

    #[tokio::test]
    async fn duplicate_label_keys_conflict() {
        let accounts = MemAccounts::default();
        let created =
            accounts.create(draft_account("ada")).await.unwrap().body;
        let id = created.id.clone().unwrap();

        let label = Label {
            key: Some("tier".to_owned()),
            value: Some("gold".to_owned()),
            ..Default::default()
        };
        accounts.add_label(id.clone(), label.clone()).await.unwrap();
        let err = accounts.add_label(id, label).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn deleting_missing_records_is_not_found() {
        let organizations = MemOrganizations::default();
        let err = organizations
            .delete("org_missing".to_owned())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
