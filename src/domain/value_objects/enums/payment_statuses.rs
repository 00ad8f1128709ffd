use std::{fmt::Display, str::FromStr};

use anyhow::{Error, anyhow};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a payment.
///
/// `New` is the only status with outgoing edges: processing moves it to
/// `Success` or `Fail`, cancellation removes the row. `Error` is assigned once
/// at creation and never changes.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    New,
    Success,
    Fail,
    Error,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::New => "NEW",
            PaymentStatus::Success => "SUCCESS",
            PaymentStatus::Fail => "FAIL",
            PaymentStatus::Error => "ERROR",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::New)
    }

    pub fn is_cancellable(&self) -> bool {
        matches!(self, PaymentStatus::New)
    }

    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::New, PaymentStatus::Success) | (PaymentStatus::New, PaymentStatus::Fail)
        )
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "NEW" => Ok(PaymentStatus::New),
            "SUCCESS" => Ok(PaymentStatus::Success),
            "FAIL" => Ok(PaymentStatus::Fail),
            "ERROR" => Ok(PaymentStatus::Error),
            other => Err(anyhow!("unknown payment status: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_new_has_outgoing_edges() {
        let all = [
            PaymentStatus::New,
            PaymentStatus::Success,
            PaymentStatus::Fail,
            PaymentStatus::Error,
        ];

        for from in all {
            for to in all {
                let expected = from == PaymentStatus::New
                    && matches!(to, PaymentStatus::Success | PaymentStatus::Fail);
                assert_eq!(from.can_transition_to(to), expected, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn terminal_statuses_are_not_cancellable() {
        assert!(PaymentStatus::New.is_cancellable());
        assert!(!PaymentStatus::New.is_terminal());
        for status in [PaymentStatus::Success, PaymentStatus::Fail, PaymentStatus::Error] {
            assert!(status.is_terminal());
            assert!(!status.is_cancellable());
        }
    }

    #[test]
    fn serializes_as_quoted_upper_case() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Success).unwrap(),
            "\"SUCCESS\""
        );
        assert_eq!(
            serde_json::from_str::<PaymentStatus>("\"ERROR\"").unwrap(),
            PaymentStatus::Error
        );
    }

    #[test]
    fn parses_stored_values() {
        assert_eq!("FAIL".parse::<PaymentStatus>().unwrap(), PaymentStatus::Fail);
        assert!("new".parse::<PaymentStatus>().is_err());
    }
}
