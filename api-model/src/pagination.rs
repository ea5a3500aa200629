use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// One page of a listed collection.
///
/// `items` preserves server order. The page metadata fields are
/// independently optional on the wire; each one has a zero-defaulting
/// accessor paired with a presence accessor for callers that need to
/// distinguish "absent" from "zero".
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Paginated<T> {
    page: Option<i64>,
    size: Option<i64>,
    total: Option<i64>,
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, page: i64, size: i64, total: i64) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
            total: Some(total),
            items,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of this page, or `0` when the server did not say.
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(0)
    }

    pub fn get_page(&self) -> Option<i64> {
        self.page
    }

    /// Number of items in this page, or `0` when the server did not say.
    pub fn size(&self) -> i64 {
        self.size.unwrap_or(0)
    }

    pub fn get_size(&self) -> Option<i64> {
        self.size
    }

    /// Total collection size, or `0` when the server did not say.
    pub fn total(&self) -> i64 {
        self.total.unwrap_or(0)
    }

    pub fn get_total(&self) -> Option<i64> {
        self.total
    }
}

impl<T> Default for Paginated<T> {
    fn default() -> Self {
        Self {
            page: None,
            size: None,
            total: None,
            items: Vec::new(),
        }
    }
}

impl<T> IntoIterator for Paginated<T> {
    type IntoIter = std::vec::IntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
