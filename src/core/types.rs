use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scenario {
    Sip {
        monthly: f64,
        annual_rate: f64,
        years: f64,
        step_up: f64,
    },
    Swp {
        opening_balance: f64,
        annual_rate: f64,
        monthly_withdrawal: f64,
        years: f64,
    },
    LumpSum {
        amount: f64,
        annual_rate: f64,
        years: f64,
    },
    Goal {
        target: f64,
        annual_rate: f64,
        years: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearPoint {
    pub year: u32,
    pub invested: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub invested: f64,
    pub returns: f64,
    pub final_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_monthly: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<Vec<YearPoint>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScenarioError {
    #[error("{field} must be a finite number")]
    NonNumeric { field: &'static str },
    #[error("{field} is outside the valid range")]
    OutOfDomain { field: &'static str },
}
