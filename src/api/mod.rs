use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{self, Projection, Scenario, YearPoint};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliScenario {
    Sip,
    Swp,
    LumpSum,
    Goal,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
enum ApiScenario {
    #[serde(alias = "SIP")]
    Sip,
    #[serde(alias = "SWP")]
    Swp,
    #[serde(alias = "lumpSum", alias = "lump_sum", alias = "lumpsum")]
    LumpSum,
    Goal,
}

impl From<ApiScenario> for CliScenario {
    fn from(value: ApiScenario) -> Self {
        match value {
            ApiScenario::Sip => CliScenario::Sip,
            ApiScenario::Swp => CliScenario::Swp,
            ApiScenario::LumpSum => CliScenario::LumpSum,
            ApiScenario::Goal => CliScenario::Goal,
        }
    }
}

impl From<CliScenario> for ApiScenario {
    fn from(value: CliScenario) -> Self {
        match value {
            CliScenario::Sip => ApiScenario::Sip,
            CliScenario::Swp => ApiScenario::Swp,
            CliScenario::LumpSum => ApiScenario::LumpSum,
            CliScenario::Goal => ApiScenario::Goal,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    scenario: Option<ApiScenario>,
    monthly_investment: Option<f64>,
    annual_return: Option<f64>,
    years: Option<f64>,
    step_up: Option<f64>,
    initial_investment: Option<f64>,
    monthly_withdrawal: Option<f64>,
    lump_sum_amount: Option<f64>,
    goal_amount: Option<f64>,
}

#[derive(Parser, Debug)]
#[command(
    name = "sipcalc",
    about = "SIP / SWP / lump-sum / goal projection engine with an embedded web calculator"
)]
struct Cli {
    #[arg(long, value_enum, default_value_t = CliScenario::Sip)]
    scenario: CliScenario,
    #[arg(long, default_value_t = 5_000.0, help = "Monthly SIP contribution")]
    monthly_investment: f64,
    #[arg(
        long,
        default_value_t = 12.0,
        help = "Expected annual return in percent, e.g. 12"
    )]
    annual_return: f64,
    #[arg(long, default_value_t = 10.0, help = "Projection horizon in years")]
    years: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Annual SIP contribution step-up in percent"
    )]
    step_up: f64,
    #[arg(
        long,
        default_value_t = 1_000_000.0,
        help = "Opening balance the SWP withdraws from"
    )]
    initial_investment: f64,
    #[arg(
        long,
        default_value_t = 10_000.0,
        help = "Fixed SWP withdrawal per month"
    )]
    monthly_withdrawal: f64,
    #[arg(
        long,
        default_value_t = 100_000.0,
        help = "One-time lump-sum investment"
    )]
    lump_sum_amount: f64,
    #[arg(
        long,
        default_value_t = 1_000_000.0,
        help = "Target corpus for the goal planner"
    )]
    goal_amount: f64,
    #[arg(long, help = "Print the year-by-year projection table")]
    table: bool,
}

#[derive(Debug)]
struct ApiRequest {
    kind: ApiScenario,
    scenario: Scenario,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    scenario: ApiScenario,
    invested: f64,
    returns: f64,
    final_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    required_monthly: Option<f64>,
    chart: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    series: Option<Vec<YearPoint>>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_scenario(cli: &Cli) -> Scenario {
    // Percent-denominated flags become fractions here; nothing downstream
    // sees a percentage.
    match cli.scenario {
        CliScenario::Sip => Scenario::Sip {
            monthly: cli.monthly_investment,
            annual_rate: cli.annual_return / 100.0,
            years: cli.years,
            step_up: cli.step_up / 100.0,
        },
        CliScenario::Swp => Scenario::Swp {
            opening_balance: cli.initial_investment,
            annual_rate: cli.annual_return / 100.0,
            monthly_withdrawal: cli.monthly_withdrawal,
            years: cli.years,
        },
        CliScenario::LumpSum => Scenario::LumpSum {
            amount: cli.lump_sum_amount,
            annual_rate: cli.annual_return / 100.0,
            years: cli.years,
        },
        CliScenario::Goal => Scenario::Goal {
            target: cli.goal_amount,
            annual_rate: cli.annual_return / 100.0,
            years: cli.years,
        },
    }
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    log::info!("projection API listening on http://{addr}");
    log::info!("local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

pub fn run_cli() -> Result<(), String> {
    let cli = Cli::parse();
    let scenario = build_scenario(&cli);
    let projection = core::project(&scenario).map_err(|e| e.to_string())?;
    print_projection(cli.scenario, &projection, cli.table);
    Ok(())
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

async fn project_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

fn project_handler_impl(payload: ProjectPayload) -> Response {
    let request = api_request_from_payload(payload);
    match core::project(&request.scenario) {
        Ok(projection) => json_response(
            StatusCode::OK,
            build_project_response(request.kind, projection),
        ),
        Err(err) => error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    Ok(api_request_from_payload(payload))
}

fn api_request_from_payload(payload: ProjectPayload) -> ApiRequest {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.scenario {
        cli.scenario = v.into();
    }
    if let Some(v) = payload.monthly_investment {
        cli.monthly_investment = v;
    }
    if let Some(v) = payload.annual_return {
        cli.annual_return = v;
    }
    if let Some(v) = payload.years {
        cli.years = v;
    }
    if let Some(v) = payload.step_up {
        cli.step_up = v;
    }
    if let Some(v) = payload.initial_investment {
        cli.initial_investment = v;
    }
    if let Some(v) = payload.monthly_withdrawal {
        cli.monthly_withdrawal = v;
    }
    if let Some(v) = payload.lump_sum_amount {
        cli.lump_sum_amount = v;
    }
    if let Some(v) = payload.goal_amount {
        cli.goal_amount = v;
    }

    ApiRequest {
        kind: cli.scenario.into(),
        scenario: build_scenario(&cli),
    }
}

fn default_cli_for_api() -> Cli {
    Cli {
        scenario: CliScenario::Sip,
        monthly_investment: 5_000.0,
        annual_return: 12.0,
        years: 10.0,
        step_up: 0.0,
        initial_investment: 1_000_000.0,
        monthly_withdrawal: 10_000.0,
        lump_sum_amount: 100_000.0,
        goal_amount: 1_000_000.0,
        table: false,
    }
}

fn build_project_response(kind: ApiScenario, projection: Projection) -> ProjectResponse {
    ProjectResponse {
        scenario: kind,
        invested: projection.invested,
        returns: projection.returns,
        final_value: projection.final_value,
        required_monthly: projection.required_monthly,
        chart: projection.series.is_some(),
        series: projection.series,
    }
}

fn print_projection(kind: CliScenario, projection: &Projection, table: bool) {
    match kind {
        CliScenario::Goal => {
            let required = projection.required_monthly.unwrap_or(0.0);
            println!("Required monthly investment: {}", format_inr(required));
            println!("Total invested:              {}", format_inr(projection.invested));
            println!("Goal amount:                 {}", format_inr(projection.final_value));
        }
        CliScenario::Swp => {
            println!("Invested amount:  {}", format_inr(projection.invested));
            println!("Total withdrawal: {}", format_inr(projection.returns));
            println!("Final value:      {}", format_inr(projection.final_value));
        }
        CliScenario::Sip | CliScenario::LumpSum => {
            println!("Invested amount:   {}", format_inr(projection.invested));
            println!("Estimated returns: {}", format_inr(projection.returns));
            println!("Total value:       {}", format_inr(projection.final_value));
        }
    }

    if table {
        if let Some(series) = &projection.series {
            println!();
            println!("{:>4}  {:>16}  {:>16}", "Year", "Invested", "Value");
            for point in series {
                println!(
                    "{:>4}  {:>16}  {:>16}",
                    point.year,
                    format_inr(point.invested),
                    format_inr(point.value)
                );
            }
        }
    }
}

fn format_inr(value: f64) -> String {
    if !value.is_finite() {
        return "₹0".to_string();
    }

    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());

    // en-IN grouping: the last three digits, then groups of two.
    let (head, tail) = if digits.len() > 3 {
        digits.split_at(digits.len() - 3)
    } else {
        ("", digits.as_str())
    };

    let mut groups = Vec::new();
    let mut idx = head.len();
    while idx > 0 {
        let start = idx.saturating_sub(2);
        groups.push(&head[start..idx]);
        idx = start;
    }
    groups.reverse();
    groups.push(tail);

    format!("₹{sign}{}", groups.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn api_request_from_json_parses_web_keys_and_divides_percentages() {
        let json = r#"{
          "scenario": "sip",
          "monthlyInvestment": 7500,
          "annualReturn": 12,
          "years": 15,
          "stepUp": 10
        }"#;
        let request = api_request_from_json(json).expect("json should parse");

        assert_eq!(request.kind, ApiScenario::Sip);
        match request.scenario {
            Scenario::Sip {
                monthly,
                annual_rate,
                years,
                step_up,
            } => {
                assert_approx(monthly, 7_500.0);
                assert_approx(annual_rate, 0.12);
                assert_approx(years, 15.0);
                assert_approx(step_up, 0.10);
            }
            other => panic!("expected a SIP scenario, got {other:?}"),
        }
    }

    #[test]
    fn api_request_accepts_scenario_aliases() {
        let request = api_request_from_json(r#"{"scenario": "lumpSum"}"#).expect("alias parses");
        assert_eq!(request.kind, ApiScenario::LumpSum);

        let request = api_request_from_json(r#"{"scenario": "SWP"}"#).expect("alias parses");
        assert_eq!(request.kind, ApiScenario::Swp);
    }

    #[test]
    fn api_request_defaults_to_the_sip_scenario() {
        let request = api_request_from_json("{}").expect("empty payload parses");
        assert_eq!(request.kind, ApiScenario::Sip);
        match request.scenario {
            Scenario::Sip {
                monthly,
                annual_rate,
                years,
                step_up,
            } => {
                assert_approx(monthly, 5_000.0);
                assert_approx(annual_rate, 0.12);
                assert_approx(years, 10.0);
                assert_approx(step_up, 0.0);
            }
            other => panic!("expected a SIP scenario, got {other:?}"),
        }
    }

    #[test]
    fn api_request_builds_swp_from_its_own_fields() {
        let json = r#"{
          "scenario": "swp",
          "initialInvestment": 2000000,
          "annualReturn": 8,
          "monthlyWithdrawal": 15000,
          "years": 20
        }"#;
        let request = api_request_from_json(json).expect("json should parse");
        match request.scenario {
            Scenario::Swp {
                opening_balance,
                annual_rate,
                monthly_withdrawal,
                years,
            } => {
                assert_approx(opening_balance, 2_000_000.0);
                assert_approx(annual_rate, 0.08);
                assert_approx(monthly_withdrawal, 15_000.0);
                assert_approx(years, 20.0);
            }
            other => panic!("expected an SWP scenario, got {other:?}"),
        }
    }

    #[test]
    fn build_scenario_maps_goal_fields() {
        let mut cli = default_cli_for_api();
        cli.scenario = CliScenario::Goal;
        cli.goal_amount = 2_500_000.0;
        cli.annual_return = 10.0;
        cli.years = 12.0;

        match build_scenario(&cli) {
            Scenario::Goal {
                target,
                annual_rate,
                years,
            } => {
                assert_approx(target, 2_500_000.0);
                assert_approx(annual_rate, 0.10);
                assert_approx(years, 12.0);
            }
            other => panic!("expected a goal scenario, got {other:?}"),
        }
    }

    #[test]
    fn sip_response_serializes_with_chart_series() {
        let request = api_request_from_json(r#"{"scenario": "sip"}"#).expect("json should parse");
        let projection = core::project(&request.scenario).expect("defaults are valid");
        let response = build_project_response(request.kind, projection);

        assert!(response.chart);
        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"scenario\":\"sip\""));
        assert!(json.contains("\"invested\""));
        assert!(json.contains("\"returns\""));
        assert!(json.contains("\"finalValue\""));
        assert!(json.contains("\"series\""));
        assert!(!json.contains("\"requiredMonthly\""));
    }

    #[test]
    fn goal_response_suppresses_the_chart_and_reports_the_monthly() {
        let request = api_request_from_json(r#"{"scenario": "goal"}"#).expect("json should parse");
        let projection = core::project(&request.scenario).expect("defaults are valid");
        let response = build_project_response(request.kind, projection);

        assert!(!response.chart);
        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"requiredMonthly\""));
        assert!(!json.contains("\"series\""));
    }

    #[test]
    fn swp_response_suppresses_the_chart() {
        let request = api_request_from_json(r#"{"scenario": "swp"}"#).expect("json should parse");
        let projection = core::project(&request.scenario).expect("defaults are valid");
        let response = build_project_response(request.kind, projection);

        assert!(!response.chart);
        assert!(response.series.is_none());
    }

    #[test]
    fn format_inr_groups_digits_the_indian_way() {
        assert_eq!(format_inr(0.0), "₹0");
        assert_eq!(format_inr(123.0), "₹123");
        assert_eq!(format_inr(1_000.0), "₹1,000");
        assert_eq!(format_inr(100_000.0), "₹1,00,000");
        assert_eq!(format_inr(1_161_695.0), "₹11,61,695");
        assert_eq!(format_inr(12_34_56_789.0), "₹12,34,56,789");
    }

    #[test]
    fn format_inr_rounds_to_the_nearest_unit() {
        assert_eq!(format_inr(999.6), "₹1,000");
        assert_eq!(format_inr(999.4), "₹999");
    }

    #[test]
    fn format_inr_falls_back_to_zero_for_non_numeric_values() {
        assert_eq!(format_inr(f64::NAN), "₹0");
        assert_eq!(format_inr(f64::INFINITY), "₹0");
    }
}
