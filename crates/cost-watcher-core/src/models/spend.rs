//! Spend event model and alert message formatting

use serde::{Deserialize, Serialize};

/// Prefix every alert message carries so recipients can tell where it came from
pub const ALERT_PREFIX: &str = "[finance-cost-watcher]";

/// A single observation of cost incurred by a named service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendEvent {
    /// Service the cost was incurred by (e.g. "EC2")
    pub service: String,

    /// Amount spent, in dollars
    pub cost: f64,
}

impl SpendEvent {
    /// Create a new spend event
    pub fn new(service: impl Into<String>, cost: f64) -> Self {
        Self {
            service: service.into(),
            cost,
        }
    }

    /// Check that the event is usable for threshold evaluation
    pub fn validate(&self) -> Result<(), String> {
        if self.service.trim().is_empty() {
            return Err("service name is empty".to_string());
        }
        if !self.cost.is_finite() {
            return Err(format!("cost {} is not a finite number", self.cost));
        }
        if self.cost < 0.0 {
            return Err(format!("cost {} is negative", self.cost));
        }
        Ok(())
    }

    /// Render the alert message for this event
    pub fn alert_message(&self) -> String {
        format_alert(&self.service, self.cost)
    }
}

/// Format an alert message: `[finance-cost-watcher] <service> spend at $<cost>`
/// with the cost rounded to two decimal places.
pub fn format_alert(service: &str, cost: f64) -> String {
    format!("{ALERT_PREFIX} {service} spend at ${cost:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_message_two_decimals() {
        let event = SpendEvent::new("EC2", 150.0);
        assert_eq!(
            event.alert_message(),
            "[finance-cost-watcher] EC2 spend at $150.00"
        );
    }

    #[test]
    fn test_alert_message_rounds() {
        assert_eq!(
            format_alert("S3", 99.999),
            "[finance-cost-watcher] S3 spend at $100.00"
        );
        assert_eq!(
            format_alert("Lambda", 12.344),
            "[finance-cost-watcher] Lambda spend at $12.34"
        );
        assert_eq!(
            format_alert("RDS", 0.0),
            "[finance-cost-watcher] RDS spend at $0.00"
        );
    }

    #[test]
    fn test_validate() {
        assert!(SpendEvent::new("EC2", 0.0).validate().is_ok());
        assert!(SpendEvent::new("EC2", -1.0).validate().is_err());
        assert!(SpendEvent::new("EC2", f64::NAN).validate().is_err());
        assert!(SpendEvent::new("EC2", f64::INFINITY).validate().is_err());
        assert!(SpendEvent::new("  ", 10.0).validate().is_err());
    }

    #[test]
    fn test_deserialize_from_json() {
        let event: SpendEvent =
            serde_json::from_str(r#"{"service":"EC2","cost":150.5}"#).unwrap();
        assert_eq!(event, SpendEvent::new("EC2", 150.5));
    }
}
