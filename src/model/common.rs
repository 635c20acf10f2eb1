use serde::Serialize;

/// Primary key type shared by rules, vendors and sales.
pub type Id = i64;

/// Format used to persist sale dates as text.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Round a monetary amount to whole cents.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(items: Vec<T>) -> Self {
        let total = items.len();
        Self { items, total }
    }
}
