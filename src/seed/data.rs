use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::model::{Id, Rule, Sale, Vendor, DATE_FORMAT};

/// The records written to an empty store at bootstrap.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedData {
    pub rules: Vec<Rule>,
    pub vendors: Vec<Vendor>,
    pub sales: Vec<Sale>,
}

impl SeedData {
    /// The fixed rule table, vendor list and sale history.
    pub fn default_set() -> Result<Self> {
        Ok(Self {
            rules: default_rules(),
            vendors: default_vendors(),
            sales: default_sales()?,
        })
    }

    pub fn record_count(&self) -> usize {
        self.rules.len() + self.vendors.len() + self.sales.len()
    }
}

fn default_rules() -> Vec<Rule> {
    vec![
        Rule::new(1, 1000.0, 0.15),
        Rule::new(2, 800.0, 0.10),
        Rule::new(3, 600.0, 0.06),
        Rule::new(4, 500.0, 0.08),
    ]
}

fn default_vendors() -> Vec<Vendor> {
    vec![
        Vendor::new(1, "Perico P"),
        Vendor::new(2, "Zoila B"),
        Vendor::new(3, "Aquiles C"),
        Vendor::new(4, "Johny M"),
    ]
}

fn default_sales() -> Result<Vec<Sale>> {
    [
        (1, "2025-05-21", 1, 400.00),
        (2, "2025-05-29", 2, 600.00),
        (3, "2025-06-03", 2, 200.00),
        (4, "2025-06-09", 1, 300.00),
        (5, "2025-06-11", 3, 900.00),
        (6, "2025-06-15", 4, 1000.00),
        (7, "2025-06-20", 1, 1200.00),
        (8, "2025-06-25", 2, 800.00),
        (9, "2025-07-01", 3, 500.00),
        (10, "2025-07-05", 4, 700.00),
    ]
    .into_iter()
    .map(|(id, date, vendor_id, amount)| -> Result<Sale> {
        Ok(Sale::new(id, parse_date(date)?, vendor_id, amount))
    })
    .collect()
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .with_context(|| format!("Invalid seed date '{}'", raw))
}

/// Ids of the vendors in the default set.
pub fn default_vendor_ids() -> Vec<Id> {
    default_vendors().iter().map(|v| v.id).collect()
}
