use crate::model::{Id, NewSale, Rule, Sale, Vendor};
use anyhow::Result;

/// Persistence for the commission tables.
///
/// Handlers, the seeder and startup all go through this trait; there is no
/// ambient connection.
#[async_trait::async_trait]
pub trait CommissionStore: Send + Sync {
    /// Create the rules, vendors and sales tables if they do not exist.
    async fn ensure_schema(&self) -> Result<()>;

    /// True when at least one vendor row exists.
    async fn has_vendors(&self) -> Result<bool>;

    /// Insert all rows in a single transaction. Nothing is written on error.
    async fn insert_batch(&self, rules: &[Rule], vendors: &[Vendor], sales: &[Sale]) -> Result<()>;

    async fn list_rules(&self) -> Result<Vec<Rule>>;
    async fn list_vendors(&self) -> Result<Vec<Vendor>>;
    async fn get_vendor(&self, id: Id) -> Result<Option<Vendor>>;
    async fn list_sales(&self) -> Result<Vec<Sale>>;
    async fn list_sales_for_vendor(&self, vendor_id: Id) -> Result<Vec<Sale>>;

    /// Record a sale under the next free id.
    async fn create_sale(&self, sale: NewSale) -> Result<Sale>;
}
