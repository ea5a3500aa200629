use roster_api_model::Paginated;
use serde::Deserialize;
use validator::Validate;

// The query parameters for pagination and filtering
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ListParams {
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "must be 1 or greater"))]
    pub page: i64,
    #[serde(default = "default_size")]
    #[validate(range(
        min = 1,
        max = 1000,
        message = "must be between 1 and 1000"
    ))]
    pub size: i64,
    pub search: Option<String>,
    pub order: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_size() -> i64 {
    100
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            size: default_size(),
            search: None,
            order: None,
        }
    }
}

impl ListParams {
    /// Index of the first item of this page within the filtered collection.
    pub fn offset(&self) -> usize {
        ((self.page - 1) * self.size).max(0) as usize
    }

    /// Wraps one page worth of items in the list envelope, stamping the
    /// requested page and size next to the filtered total.
    pub fn paginate<T>(&self, items: Vec<T>, total: i64) -> Paginated<T> {
        Paginated::new(items, self.page, self.size, total)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn absent_parameters_take_documented_defaults() {
        let params: ListParams = serde_json::from_value(json!({})).unwrap();
        assert_eq!(1, params.page);
        assert_eq!(100, params.size);
        assert_eq!(None, params.search);
        assert_eq!(None, params.order);
    }

    #[test]
    fn explicit_parameters_override_defaults() {
        let params: ListParams =
            serde_json::from_value(json!({ "page": 3, "size": 10 })).unwrap();
        assert_eq!(3, params.page);
        assert_eq!(10, params.size);
        assert_eq!(20, params.offset());
    }

    #[test]
    fn out_of_range_sizes_are_rejected() {
        let params: ListParams =
            serde_json::from_value(json!({ "size": 0 })).unwrap();
        assert!(params.validate().is_err());

        let params: ListParams =
            serde_json::from_value(json!({ "size": 1001 })).unwrap();
        assert!(params.validate().is_err());

        let params: ListParams =
            serde_json::from_value(json!({ "page": 0 })).unwrap();
        assert!(params.validate().is_err());
    }
}
