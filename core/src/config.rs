// tukangin/src/config.rs

use crate::error::OrderError;
use chrono::Duration;

/// Longest warranty window accepted, in days.
pub const MAX_WARRANTY_DAYS: i64 = 3_650;

/// Engine settings that shape warranties issued on completion.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
  pub warranty_days: i64,
  pub coverage_type: String,
  pub warranty_terms: String,
}

impl LifecycleConfig {
  pub fn warranty_window(&self) -> Duration {
    Duration::days(self.warranty_days)
  }

  /// A warranty must end strictly after it starts, so the window is at least one day.
  pub fn validate(&self) -> Result<(), OrderError> {
    if !(1..=MAX_WARRANTY_DAYS).contains(&self.warranty_days) {
      return Err(OrderError::Validation(format!(
        "warranty_days must be between 1 and {}, got {}.",
        MAX_WARRANTY_DAYS, self.warranty_days
      )));
    }
    Ok(())
  }
}

impl Default for LifecycleConfig {
  fn default() -> Self {
    Self {
      warranty_days: 30,
      coverage_type: "standard".to_string(),
      warranty_terms: "Covers defects in workmanship for the completed job. Excludes damage from misuse, \
                       third-party modification, and natural disasters."
        .to_string(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn warranty_window_must_be_positive_and_bounded() {
    assert!(LifecycleConfig::default().validate().is_ok());
    for days in [0, -1, MAX_WARRANTY_DAYS + 1] {
      let config = LifecycleConfig {
        warranty_days: days,
        ..LifecycleConfig::default()
      };
      assert!(matches!(config.validate(), Err(OrderError::Validation(_))), "{} days accepted", days);
    }
  }
}
