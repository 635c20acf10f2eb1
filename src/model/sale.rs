use crate::model::Id;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: Id,
    pub sale_date: NaiveDate,
    pub vendor_id: Id,
    pub quota_amount: f64,
}

impl Sale {
    pub fn new(id: Id, sale_date: NaiveDate, vendor_id: Id, quota_amount: f64) -> Self {
        Self {
            id,
            sale_date,
            vendor_id,
            quota_amount,
        }
    }
}

/// Request body for recording a sale; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSale {
    pub sale_date: NaiveDate,
    pub vendor_id: Id,
    pub quota_amount: f64,
}

impl NewSale {
    /// Checks the amount is a usable non-negative number.
    pub fn validate(&self) -> Result<(), String> {
        if !self.quota_amount.is_finite() {
            return Err("quota_amount must be a finite number".to_string());
        }
        if self.quota_amount < 0.0 {
            return Err("quota_amount must not be negative".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_sale(amount: f64) -> NewSale {
        NewSale {
            sale_date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            vendor_id: 1,
            quota_amount: amount,
        }
    }

    #[test]
    fn test_new_sale_validation() {
        assert!(new_sale(0.0).validate().is_ok());
        assert!(new_sale(950.5).validate().is_ok());
        assert!(new_sale(-1.0).validate().is_err());
        assert!(new_sale(f64::NAN).validate().is_err());
        assert!(new_sale(f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_sale_date_serializes_as_iso_date() {
        let sale = Sale::new(1, NaiveDate::from_ymd_opt(2025, 5, 21).unwrap(), 1, 400.0);
        let json = serde_json::to_value(&sale).unwrap();
        assert_eq!(json["sale_date"], "2025-05-21");
        assert_eq!(json["quota_amount"], 400.0);
    }
}
