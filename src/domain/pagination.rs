use serde::{Deserialize, Serialize};

const LIMIT_MIN: i64 = 1;
const LIMIT_MAX: i64 = 100;

pub const LIMIT_DEFAULT: i64 = 20;

/// Order to sort results by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl Order {
    pub fn sql(&self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

/// Field whitelist contract for sortable columns. Implementations map each
/// variant to the concrete column the store orders by.
pub trait SortField {
    fn column(&self) -> &'static str;
}

/// Common pagination parameters carried by every list filter.
#[derive(Debug, Clone)]
pub struct PageRequest<S> {
    pub limit: i64,
    pub offset: i64,
    pub order: Order,
    pub sort: Option<S>,
}

impl<S> Default for PageRequest<S> {
    fn default() -> Self {
        Self {
            limit: LIMIT_DEFAULT,
            offset: 0,
            order: Order::Asc,
            sort: None,
        }
    }
}

impl<S> PageRequest<S> {
    pub fn limit_valid(&self) -> bool {
        (LIMIT_MIN..=LIMIT_MAX).contains(&self.limit)
    }

    pub fn offset_valid(&self) -> bool {
        self.offset >= 0
    }
}

/// Paginated response: total number of matching rows plus the requested page.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub total: i64,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            total: 0,
            results: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_bounds() {
        let mut page: PageRequest<()> = PageRequest::default();
        assert!(page.limit_valid());

        page.limit = 0;
        assert!(!page.limit_valid());
        page.limit = 101;
        assert!(!page.limit_valid());
        page.limit = 100;
        assert!(page.limit_valid());
    }

    #[test]
    fn offset_must_be_non_negative() {
        let mut page: PageRequest<()> = PageRequest::default();
        assert!(page.offset_valid());
        page.offset = -1;
        assert!(!page.offset_valid());
    }
}
