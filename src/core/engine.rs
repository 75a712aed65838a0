use super::types::{Projection, Scenario, ScenarioError, YearPoint};

pub fn project(scenario: &Scenario) -> Result<Projection, ScenarioError> {
    match *scenario {
        Scenario::Sip {
            monthly,
            annual_rate,
            years,
            step_up,
        } => project_sip(monthly, annual_rate, years, step_up),
        Scenario::Swp {
            opening_balance,
            annual_rate,
            monthly_withdrawal,
            years,
        } => project_swp(opening_balance, annual_rate, monthly_withdrawal, years),
        Scenario::LumpSum {
            amount,
            annual_rate,
            years,
        } => project_lump_sum(amount, annual_rate, years),
        Scenario::Goal {
            target,
            annual_rate,
            years,
        } => project_goal(target, annual_rate, years),
    }
}

pub fn project_sip(
    monthly: f64,
    annual_rate: f64,
    years: f64,
    step_up: f64,
) -> Result<Projection, ScenarioError> {
    check_non_negative(monthly, "monthly investment")?;
    check_non_negative(annual_rate, "annual return")?;
    check_non_negative(years, "years")?;
    check_non_negative(step_up, "step-up")?;

    let months = month_count(years);
    let monthly_rate = annual_rate / 12.0;

    let (invested, value) = if step_up == 0.0 {
        // Annuity-due closed form; the recurrence below reproduces it only to
        // floating-point tolerance.
        let invested = monthly * months as f64;
        let value = if monthly_rate == 0.0 {
            invested
        } else {
            monthly * (((1.0 + monthly_rate).powi(months as i32) - 1.0) / monthly_rate)
                * (1.0 + monthly_rate)
        };
        (invested, value)
    } else {
        accumulate_sip(monthly, monthly_rate, months, step_up)
    };

    Ok(Projection {
        invested,
        returns: value - invested,
        final_value: value,
        required_monthly: None,
        series: Some(sip_series(monthly, monthly_rate, years, step_up)),
    })
}

pub fn project_swp(
    opening_balance: f64,
    annual_rate: f64,
    monthly_withdrawal: f64,
    years: f64,
) -> Result<Projection, ScenarioError> {
    check_non_negative(opening_balance, "opening balance")?;
    check_non_negative(annual_rate, "annual return")?;
    check_non_negative(monthly_withdrawal, "monthly withdrawal")?;
    check_non_negative(years, "years")?;

    let months = month_count(years);
    let monthly_rate = annual_rate / 12.0;

    let mut balance = opening_balance;
    let mut withdrawn = 0.0;
    for _ in 0..months {
        balance *= 1.0 + monthly_rate;
        let take = monthly_withdrawal.min(balance);
        balance -= take;
        withdrawn += take;
        if balance <= 0.0 {
            balance = 0.0;
            break;
        }
    }

    Ok(Projection {
        invested: opening_balance,
        returns: withdrawn,
        final_value: balance,
        required_monthly: None,
        series: None,
    })
}

pub fn project_lump_sum(
    amount: f64,
    annual_rate: f64,
    years: f64,
) -> Result<Projection, ScenarioError> {
    check_non_negative(amount, "lump-sum amount")?;
    check_non_negative(annual_rate, "annual return")?;
    check_non_negative(years, "years")?;

    let final_value = amount * (1.0 + annual_rate).powf(years);
    let series = (1..=elapsed_years(years))
        .map(|year| YearPoint {
            year,
            invested: amount,
            value: amount * (1.0 + annual_rate).powi(year as i32),
        })
        .collect();

    Ok(Projection {
        invested: amount,
        returns: final_value - amount,
        final_value,
        required_monthly: None,
        series: Some(series),
    })
}

pub fn project_goal(target: f64, annual_rate: f64, years: f64) -> Result<Projection, ScenarioError> {
    check_non_negative(target, "goal amount")?;
    check_non_negative(annual_rate, "annual return")?;
    check_non_negative(years, "years")?;
    if years == 0.0 {
        // The annuity fraction amortizes over zero months.
        return Err(ScenarioError::OutOfDomain { field: "years" });
    }

    let months = years * 12.0;
    let monthly_rate = annual_rate / 12.0;

    let required_monthly = if monthly_rate == 0.0 {
        target / months
    } else {
        target * monthly_rate / (((1.0 + monthly_rate).powf(months) - 1.0) * (1.0 + monthly_rate))
    };
    let invested = required_monthly * months;

    Ok(Projection {
        invested,
        returns: target - invested,
        final_value: target,
        required_monthly: Some(required_monthly),
        series: None,
    })
}

fn check_non_negative(value: f64, field: &'static str) -> Result<(), ScenarioError> {
    if !value.is_finite() {
        return Err(ScenarioError::NonNumeric { field });
    }
    if value < 0.0 {
        return Err(ScenarioError::OutOfDomain { field });
    }
    Ok(())
}

fn month_count(years: f64) -> u32 {
    (years * 12.0).round() as u32
}

fn elapsed_years(years: f64) -> u32 {
    years.floor() as u32
}

fn accumulate_sip(monthly: f64, monthly_rate: f64, months: u32, step_up: f64) -> (f64, f64) {
    let mut contribution = monthly;
    let mut invested = 0.0;
    let mut value = 0.0;
    for month in 1..=months {
        value = (value + contribution) * (1.0 + monthly_rate);
        invested += contribution;
        if month % 12 == 0 {
            contribution *= 1.0 + step_up;
        }
    }
    (invested, value)
}

fn sip_series(monthly: f64, monthly_rate: f64, years: f64, step_up: f64) -> Vec<YearPoint> {
    let full_years = elapsed_years(years);
    let mut points = Vec::with_capacity(full_years as usize);
    let mut contribution = monthly;
    let mut invested = 0.0;
    let mut value = 0.0;
    for year in 1..=full_years {
        for _ in 0..12 {
            value = (value + contribution) * (1.0 + monthly_rate);
            invested += contribution;
        }
        points.push(YearPoint {
            year,
            invested,
            value,
        });
        contribution *= 1.0 + step_up;
    }
    points
}
