use crate::model::Id;
use serde::{Deserialize, Serialize};

/// A commission tier: sales at or above `minimum_amount` earn `commission_rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: Id,
    pub minimum_amount: f64,
    /// Fraction in (0, 1], e.g. 0.15 for 15%.
    pub commission_rate: f64,
}

impl Rule {
    pub fn new(id: Id, minimum_amount: f64, commission_rate: f64) -> Self {
        Self {
            id,
            minimum_amount,
            commission_rate,
        }
    }
}
