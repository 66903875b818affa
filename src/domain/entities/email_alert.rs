use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::catalog;
use crate::domain::errors::ValidationError;

/// How often a subscriber wants to be notified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertFrequency {
    Hourly,
    Daily,
    Weekly,
    OnUpdate,
}

impl AlertFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertFrequency::Hourly => "hourly",
            AlertFrequency::Daily => "daily",
            AlertFrequency::Weekly => "weekly",
            AlertFrequency::OnUpdate => "on_update",
        }
    }
}

impl fmt::Display for AlertFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hourly" => Ok(AlertFrequency::Hourly),
            "daily" => Ok(AlertFrequency::Daily),
            "weekly" => Ok(AlertFrequency::Weekly),
            "on_update" => Ok(AlertFrequency::OnUpdate),
            other => Err(format!("Unknown alert frequency: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAlertSubscription {
    pub id: i64,
    pub email: String,
    pub commodities: Vec<String>,
    pub frequency: AlertFrequency,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewEmailAlert {
    pub email: String,
    pub commodities: Vec<String>,
    pub frequency: AlertFrequency,
}

impl NewEmailAlert {
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.email = self.email.trim().to_string();
        if !is_valid_email(&self.email) {
            return Err(ValidationError::InvalidEmail(self.email));
        }
        if self.commodities.is_empty() {
            return Err(ValidationError::NoCommodities);
        }
        if let Some(unknown) = self
            .commodities
            .iter()
            .find(|name| catalog::resolve(name).is_none())
        {
            return Err(ValidationError::UnknownCommodity(unknown.clone()));
        }
        Ok(self)
    }
}

/// Structural email check: one `@`, a local part, and a dotted domain
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return false,
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("trader.kim@example.co.kr"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a@.com"));
        assert!(!is_valid_email("a@b.com."));
        assert!(!is_valid_email("a@@b.com"));
        assert!(!is_valid_email("a b@c.com"));
    }

    #[test]
    fn test_frequency_round_trip_names() {
        for freq in [
            AlertFrequency::Hourly,
            AlertFrequency::Daily,
            AlertFrequency::Weekly,
            AlertFrequency::OnUpdate,
        ] {
            assert_eq!(freq.as_str().parse::<AlertFrequency>().unwrap(), freq);
        }
        assert!("monthly".parse::<AlertFrequency>().is_err());
    }

    #[test]
    fn test_new_alert_validation() {
        let ok = NewEmailAlert {
            email: " a@b.com ".into(),
            commodities: vec!["corn".into(), "금".into()],
            frequency: AlertFrequency::Daily,
        };
        assert_eq!(ok.validate().unwrap().email, "a@b.com");

        let empty = NewEmailAlert {
            email: "a@b.com".into(),
            commodities: vec![],
            frequency: AlertFrequency::Daily,
        };
        assert_eq!(empty.validate().unwrap_err(), ValidationError::NoCommodities);

        let unknown = NewEmailAlert {
            email: "a@b.com".into(),
            commodities: vec!["corn".into(), "silver".into()],
            frequency: AlertFrequency::Weekly,
        };
        assert_eq!(
            unknown.validate().unwrap_err(),
            ValidationError::UnknownCommodity("silver".into())
        );
    }

    #[test]
    fn test_frequency_json_uses_snake_case() {
        let alert: NewEmailAlert = serde_json::from_str(
            r#"{"email":"a@b.com","commodities":["corn"],"frequency":"on_update"}"#,
        )
        .unwrap();
        assert_eq!(alert.frequency, AlertFrequency::OnUpdate);
    }
}
