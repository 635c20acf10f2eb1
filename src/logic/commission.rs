use itertools::Itertools;
use std::collections::HashMap;

use crate::model::{round_cents, Rule, Sale, SaleCommission, Vendor, VendorCommission};

/// Commission rules ordered for threshold lookup.
///
/// Rules are kept sorted by minimum amount (highest first) and then by id, so
/// the first rule whose minimum does not exceed an amount is the applicable
/// tier. Equal minimums resolve to the lowest rule id.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>) -> Self {
        let rules = rules
            .into_iter()
            .sorted_by(|a, b| {
                b.minimum_amount
                    .total_cmp(&a.minimum_amount)
                    .then(a.id.cmp(&b.id))
            })
            .collect();
        Self { rules }
    }

    /// Returns the rule with the highest minimum not exceeding `amount`.
    ///
    /// Amounts below every minimum (and NaN) match no rule.
    pub fn lookup(&self, amount: f64) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.minimum_amount <= amount)
    }
}

/// Computes the commission owed on `sale`. Unmatched sales earn nothing.
pub fn commission_for(sale: &Sale, table: &RuleTable, vendor: Option<&Vendor>) -> SaleCommission {
    let rule = table.lookup(sale.quota_amount);
    let commission_rate = rule.map(|r| r.commission_rate).unwrap_or(0.0);

    SaleCommission {
        sale_id: sale.id,
        sale_date: sale.sale_date,
        vendor_id: sale.vendor_id,
        vendor_name: vendor.map(|v| v.name.clone()),
        quota_amount: sale.quota_amount,
        rule_id: rule.map(|r| r.id),
        commission_rate,
        commission: round_cents(sale.quota_amount * commission_rate),
    }
}

/// Computes per-sale commissions, attaching vendor names where known.
pub fn sale_commissions(sales: &[Sale], vendors: &[Vendor], table: &RuleTable) -> Vec<SaleCommission> {
    let by_id: HashMap<_, _> = vendors.iter().map(|v| (v.id, v)).collect();

    sales
        .iter()
        .map(|sale| commission_for(sale, table, by_id.get(&sale.vendor_id).copied()))
        .collect()
}

/// Folds per-sale commissions into one row per vendor, ordered by vendor id.
/// Vendors without sales are reported with zero totals.
pub fn vendor_totals(vendors: &[Vendor], commissions: &[SaleCommission]) -> Vec<VendorCommission> {
    let grouped = commissions.iter().into_group_map_by(|c| c.vendor_id);

    vendors
        .iter()
        .sorted_by_key(|v| v.id)
        .map(|vendor| {
            let rows = grouped.get(&vendor.id).map(Vec::as_slice).unwrap_or(&[]);
            VendorCommission {
                vendor_id: vendor.id,
                vendor_name: vendor.name.clone(),
                sales_count: rows.len(),
                total_amount: round_cents(rows.iter().map(|c| c.quota_amount).sum()),
                total_commission: round_cents(rows.iter().map(|c| c.commission).sum()),
            }
        })
        .collect()
}
