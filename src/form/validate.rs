//! Form validation.

use super::params::hhmm;
use super::{
    EngineParameters, Field, FormState, StrategyParameters, TickerMap, parse_tickers,
};
use crate::credentials::{ApiCredentials, BrokerCredentials};
use chrono::NaiveTime;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const TERMINAL_EXECUTABLE: &str = "terminal64.exe";

/// A problem with a single form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field.label(), self.message)
    }
}

impl std::error::Error for FieldError {}

/// A fully validated configuration, ready to hand to the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidConfig {
    pub broker: BrokerCredentials,
    pub api: ApiCredentials,
    #[serde(rename = "symbols")]
    pub tickers: TickerMap,
    pub strategy: StrategyParameters,
    pub engine: EngineParameters,
}

impl ValidConfig {
    /// Trades allowed per symbol: open positions spread evenly over tickers.
    pub fn max_trades(&self) -> u32 {
        let symbols = self.tickers.len().max(1) as u32;
        (self.strategy.max_positions / symbols).max(1)
    }
}

/// Validate the form, collecting every field error.
pub fn validate(form: &FormState) -> Result<ValidConfig, Vec<FieldError>> {
    let mut errors = Vec::new();

    let login = required(form, Field::Login, &mut errors).and_then(|raw| {
        raw.parse::<u64>()
            .map_err(|_| errors.push(FieldError::new(Field::Login, "must be a whole number")))
            .ok()
    });
    let password = required(form, Field::Password, &mut errors);
    let server = required(form, Field::Server, &mut errors);
    let terminal_path = terminal_path(form, &mut errors);

    let tickers = match parse_tickers(form.get(Field::Tickers)) {
        Ok(map) => Some(map),
        Err(problems) => {
            errors.extend(
                problems
                    .into_iter()
                    .map(|e| FieldError::new(Field::Tickers, e.to_string())),
            );
            None
        }
    };

    let symbol_type = choice(form, Field::SymbolType, &mut errors);
    let threshold = number(form, Field::Threshold, 0.2, &mut errors).and_then(|v: f64| {
        check(
            Field::Threshold,
            v,
            v.is_finite() && (0.0..=1.0).contains(&v),
            "must be between 0 and 1",
            &mut errors,
        )
    });
    let max_positions = number(form, Field::MaxPositions, 100, &mut errors).and_then(|v: u32| {
        check(Field::MaxPositions, v, v >= 1, "must be at least 1", &mut errors)
    });
    let expected_return = number(form, Field::ExpectedReturn, 5.0, &mut errors)
        .and_then(|v: f64| positive(Field::ExpectedReturn, v, &mut errors));

    let timeframe = choice(form, Field::Timeframe, &mut errors);
    let start_time = time_of_day(form, Field::StartTime, &mut errors);
    let finishing_time = time_of_day(form, Field::FinishingTime, &mut errors);
    let ending_time = time_of_day(form, Field::EndingTime, &mut errors);
    let iteration_minutes = number(form, Field::IterationTime, 15, &mut errors).and_then(|v: u32| {
        check(Field::IterationTime, v, v >= 1, "must be at least 1", &mut errors)
    });
    let daily_risk = number(form, Field::DailyRisk, 0.01, &mut errors)
        .and_then(|v: f64| non_negative(Field::DailyRisk, v, &mut errors));
    let max_risk = number(form, Field::MaxRisk, 10.0, &mut errors)
        .and_then(|v: f64| non_negative(Field::MaxRisk, v, &mut errors));
    let period = choice(form, Field::Period, &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    // Every value is Some once no errors were recorded.
    let (
        Some(login),
        Some(password),
        Some(server),
        Some(tickers),
        Some(symbol_type),
        Some(threshold),
        Some(max_positions),
        Some(expected_return),
        Some(timeframe),
        Some(start_time),
        Some(finishing_time),
        Some(ending_time),
        Some(iteration_minutes),
        Some(daily_risk),
        Some(max_risk),
        Some(period),
    ) = (
        login,
        password,
        server,
        tickers,
        symbol_type,
        threshold,
        max_positions,
        expected_return,
        timeframe,
        start_time,
        finishing_time,
        ending_time,
        iteration_minutes,
        daily_risk,
        max_risk,
        period,
    )
    else {
        return Err(vec![FieldError::new(Field::Login, "incomplete form")]);
    };

    Ok(ValidConfig {
        broker: BrokerCredentials {
            login,
            password,
            server,
            terminal_path,
        },
        api: ApiCredentials {
            reddit_client_id: form.get(Field::RedditClientId).trim().to_string(),
            reddit_client_secret: form.get(Field::RedditClientSecret).trim().to_string(),
            reddit_user_agent: form.get(Field::RedditUserAgent).trim().to_string(),
            fmp_api_key: form.get(Field::FmpApiKey).trim().to_string(),
        },
        tickers,
        strategy: StrategyParameters {
            symbol_type,
            threshold,
            max_positions,
            expected_return,
        },
        engine: EngineParameters {
            timeframe,
            start_time,
            finishing_time,
            ending_time,
            iteration_minutes,
            daily_risk,
            max_risk,
            money_management: form.is_on(Field::MoneyManagement),
            auto_trade: form.is_on(Field::AutoTrade),
            debug_mode: form.is_on(Field::DebugMode),
            notify: form.is_on(Field::Notify),
            period,
        },
    })
}

fn required(form: &FormState, field: Field, errors: &mut Vec<FieldError>) -> Option<String> {
    let value = form.get(field).trim();
    if value.is_empty() {
        errors.push(FieldError::new(field, "required"));
        None
    } else {
        Some(value.to_string())
    }
}

/// Parse a numeric field, falling back to `default` when left blank.
fn number<T: FromStr>(
    form: &FormState,
    field: Field,
    default: T,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    let raw = form.get(field).trim();
    if raw.is_empty() {
        return Some(default);
    }
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(FieldError::new(field, format!("'{raw}' is not a number")));
            None
        }
    }
}

fn check<T>(
    field: Field,
    value: T,
    ok: bool,
    message: &str,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    if ok {
        Some(value)
    } else {
        errors.push(FieldError::new(field, message));
        None
    }
}

fn positive(field: Field, value: f64, errors: &mut Vec<FieldError>) -> Option<f64> {
    check(
        field,
        value,
        value.is_finite() && value > 0.0,
        "must be greater than 0",
        errors,
    )
}

fn non_negative(field: Field, value: f64, errors: &mut Vec<FieldError>) -> Option<f64> {
    check(
        field,
        value,
        value.is_finite() && value >= 0.0,
        "must not be negative",
        errors,
    )
}

fn choice<T: FromStr<Err = String>>(
    form: &FormState,
    field: Field,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    form.get(field)
        .parse()
        .map_err(|message| errors.push(FieldError::new(field, message)))
        .ok()
}

fn time_of_day(form: &FormState, field: Field, errors: &mut Vec<FieldError>) -> Option<NaiveTime> {
    let raw = form.get(field).trim();
    let raw = if raw.is_empty() {
        field.default_value()
    } else {
        raw
    };
    let parsed = hhmm::parse(raw);
    if parsed.is_none() {
        errors.push(FieldError::new(field, format!("'{raw}' is not a HH:MM time")));
    }
    parsed
}

fn terminal_path(form: &FormState, errors: &mut Vec<FieldError>) -> Option<PathBuf> {
    let raw = form.get(Field::TerminalPath).trim();
    if raw.is_empty() {
        return None;
    }
    // Windows separators are accepted on every host.
    let file_name = raw
        .rsplit(['\\', '/'])
        .next()
        .unwrap_or(raw);
    if file_name.eq_ignore_ascii_case(TERMINAL_EXECUTABLE) {
        Some(Path::new(raw).to_path_buf())
    } else {
        errors.push(FieldError::new(
            Field::TerminalPath,
            format!("must point to {TERMINAL_EXECUTABLE}"),
        ));
        None
    }
}
