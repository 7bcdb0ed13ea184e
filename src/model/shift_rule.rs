use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Hour thresholds for one named shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ShiftRule {
    #[schema(example = "General")]
    pub shift_name: String,

    /// Minimum worked hours for `Present`
    #[schema(example = 9.0)]
    pub full_day_hrs: f64,

    /// Minimum worked hours for `Half Day`
    #[schema(example = 4.5)]
    pub half_day_hrs: f64,
}

impl ShiftRule {
    pub fn new(shift_name: impl Into<String>, full_day_hrs: f64, half_day_hrs: f64) -> Self {
        Self {
            shift_name: shift_name.into(),
            full_day_hrs,
            half_day_hrs,
        }
    }

    /// full >= half >= 0
    pub fn is_consistent(&self) -> bool {
        self.full_day_hrs >= self.half_day_hrs && self.half_day_hrs >= 0.0
    }
}
