use crate::model::Id;
use chrono::NaiveDate;
use serde::Serialize;

/// Commission owed on a single sale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleCommission {
    pub sale_id: Id,
    pub sale_date: NaiveDate,
    pub vendor_id: Id,
    pub vendor_name: Option<String>,
    pub quota_amount: f64,
    /// None when the amount is below every rule's minimum.
    pub rule_id: Option<Id>,
    pub commission_rate: f64,
    pub commission: f64,
}

/// Commission totals for one vendor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorCommission {
    pub vendor_id: Id,
    pub vendor_name: String,
    pub sales_count: usize,
    pub total_amount: f64,
    pub total_commission: f64,
}
