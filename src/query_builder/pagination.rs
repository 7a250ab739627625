use crate::constants::NO_LIMIT;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Pagination parameters passed through to the store
///
/// A `limit` of `0` or [`NO_LIMIT`] means unbounded. `sort` names a field,
/// prefixed with `-` for descending order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasePage {
    #[serde(default)]
    pub start: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

impl BasePage {
    /// Create pagination with start offset and limit
    pub fn new(start: u64, limit: u64) -> Self {
        Self {
            start,
            limit,
            sort: None,
        }
    }

    /// Pagination returning every record
    pub fn unbounded() -> Self {
        Self::new(0, NO_LIMIT)
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn is_unbounded(&self) -> bool {
        self.limit == 0 || self.limit == NO_LIMIT
    }

    /// Sort field and direction (`true` for descending)
    pub fn sort_key(&self) -> Option<(&str, bool)> {
        let sort = self.sort.as_deref()?.trim();
        if sort.is_empty() {
            return None;
        }
        match sort.strip_prefix('-') {
            Some(field) => Some((field, true)),
            None => Some((sort, false)),
        }
    }

    /// Order `a` and `b` by direction
    pub fn directed(&self, ordering: Ordering) -> Ordering {
        match self.sort_key() {
            Some((_, true)) => ordering.reverse(),
            _ => ordering,
        }
    }

    /// Apply start/limit to an already ordered result set
    pub fn window<T>(&self, items: Vec<T>) -> Vec<T> {
        let start = usize::try_from(self.start).unwrap_or(usize::MAX);
        let iter = items.into_iter().skip(start);
        if self.is_unbounded() {
            iter.collect()
        } else {
            iter.take(usize::try_from(self.limit).unwrap_or(usize::MAX))
                .collect()
        }
    }
}
