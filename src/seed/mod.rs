pub mod data;

pub use data::*;

use anyhow::{Context, Result};

use crate::store::CommissionStore;

/// What a seeding pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Vendors were already present; nothing was written.
    AlreadySeeded,
    Seeded {
        rules: usize,
        vendors: usize,
        sales: usize,
    },
}

/// Writes the default rule table, vendors and sales to an empty store.
pub async fn seed<S: CommissionStore + ?Sized>(store: &S) -> Result<SeedOutcome> {
    let data = SeedData::default_set()?;
    seed_with(store, &data).await
}

/// Writes `data` in one transaction unless a vendor already exists.
///
/// Only the vendors table is probed: a store with vendors but no rules or
/// sales is left as it is.
pub async fn seed_with<S: CommissionStore + ?Sized>(store: &S, data: &SeedData) -> Result<SeedOutcome> {
    if store.has_vendors().await? {
        log::info!("Store already holds data; skipping seed");
        return Ok(SeedOutcome::AlreadySeeded);
    }

    store
        .insert_batch(&data.rules, &data.vendors, &data.sales)
        .await
        .context("Failed to write seed data")?;

    log::info!(
        "Seeded {} rules, {} vendors and {} sales",
        data.rules.len(),
        data.vendors.len(),
        data.sales.len()
    );

    Ok(SeedOutcome::Seeded {
        rules: data.rules.len(),
        vendors: data.vendors.len(),
        sales: data.sales.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Sale, Vendor};
    use crate::store::SqlStore;
    use chrono::NaiveDate;

    async fn empty_store() -> SqlStore {
        let store = SqlStore::connect("sqlite::memory:", 1).await.unwrap();
        store.ensure_schema().await.unwrap();
        store
    }

    async fn counts(store: &SqlStore) -> (usize, usize, usize) {
        (
            store.list_rules().await.unwrap().len(),
            store.list_vendors().await.unwrap().len(),
            store.list_sales().await.unwrap().len(),
        )
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = empty_store().await;

        let first = seed(&store).await.unwrap();
        assert_eq!(
            first,
            SeedOutcome::Seeded {
                rules: 4,
                vendors: 4,
                sales: 10
            }
        );

        let second = seed(&store).await.unwrap();
        assert_eq!(second, SeedOutcome::AlreadySeeded);
        assert_eq!(counts(&store).await, (4, 4, 10));
    }

    #[tokio::test]
    async fn test_seed_writes_literal_data() {
        let store = empty_store().await;
        seed(&store).await.unwrap();

        let expected = SeedData::default_set().unwrap();
        assert_eq!(store.list_rules().await.unwrap(), expected.rules);
        assert_eq!(store.list_vendors().await.unwrap(), expected.vendors);
        assert_eq!(store.list_sales().await.unwrap(), expected.sales);
    }

    #[tokio::test]
    async fn test_seeded_sales_resolve_to_seeded_vendors() {
        let store = empty_store().await;
        seed(&store).await.unwrap();

        let vendor_ids: Vec<_> = store
            .list_vendors()
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(vendor_ids, vec![1, 2, 3, 4]);

        for sale in store.list_sales().await.unwrap() {
            assert!(vendor_ids.contains(&sale.vendor_id));
        }
    }

    #[tokio::test]
    async fn test_failed_batch_leaves_store_empty() {
        let store = empty_store().await;

        let mut data = SeedData::default_set().unwrap();
        // Last sale points at a vendor that is never inserted.
        data.sales.push(Sale::new(
            11,
            NaiveDate::from_ymd_opt(2025, 7, 9).unwrap(),
            99,
            100.0,
        ));

        assert!(seed_with(&store, &data).await.is_err());
        assert_eq!(counts(&store).await, (0, 0, 0));

        // The guard still sees an empty store, so a clean retry succeeds.
        seed(&store).await.unwrap();
        assert_eq!(counts(&store).await, (4, 4, 10));
    }

    #[tokio::test]
    async fn test_duplicate_id_rolls_back_batch() {
        let store = empty_store().await;

        let mut data = SeedData::default_set().unwrap();
        data.vendors.push(Vendor::new(2, "Zoila B (duplicate)"));

        assert!(seed_with(&store, &data).await.is_err());
        assert_eq!(counts(&store).await, (0, 0, 0));
    }

    #[tokio::test]
    async fn test_partial_state_is_not_repaired() {
        let store = empty_store().await;
        let data = SeedData {
            rules: Vec::new(),
            vendors: vec![Vendor::new(1, "Perico P")],
            sales: Vec::new(),
        };
        seed_with(&store, &data).await.unwrap();

        assert_eq!(seed(&store).await.unwrap(), SeedOutcome::AlreadySeeded);
        assert_eq!(counts(&store).await, (0, 1, 0));
    }
}
