use serde::Serialize;

/// Operating margin stored as a fraction in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Margin(f64);

impl Margin {
    pub fn new(fraction: f64) -> Result<Self, String> {
        if !fraction.is_finite() {
            return Err("Margin must be finite".to_string());
        }
        if !(0.0..=1.0).contains(&fraction) {
            return Err(format!("Margin {} is outside [0, 1]", fraction));
        }
        Ok(Margin(fraction))
    }

    /// Builds a margin from a percentage value such as `12.5` for 12.5%.
    pub fn from_percent(percent: f64) -> Result<Self, String> {
        Self::new(percent / 100.0)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_margin_bounds() {
        assert!(Margin::new(0.0).is_ok());
        assert!(Margin::new(1.0).is_ok());
        assert!(Margin::new(1.01).is_err());
        assert!(Margin::new(-0.01).is_err());
    }

    #[test]
    fn test_margin_from_percent() {
        let margin = Margin::from_percent(12.5).unwrap();
        assert!((margin.value() - 0.125).abs() < 1e-12);
    }

    #[test]
    fn test_margin_from_percent_over_hundred() {
        let result = Margin::from_percent(150.0);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("outside [0, 1]"));
    }
}
