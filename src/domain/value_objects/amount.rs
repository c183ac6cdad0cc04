use serde::Serialize;

/// Non-negative monetary or unit quantity taken from a sales row.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Amount(f64);

impl Amount {
    pub fn new(value: f64) -> Result<Self, String> {
        if !value.is_finite() {
            return Err("Amount must be finite".to_string());
        }
        if value < 0.0 {
            return Err("Amount must be non-negative".to_string());
        }
        Ok(Amount(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}
