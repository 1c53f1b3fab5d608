use prometheus::{register_counter_vec, register_int_counter};
use prometheus::{CounterVec, IntCounter};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use lazy_static::lazy_static;

lazy_static! {
    pub static ref QUESTIONS_CREATED: IntCounter = register_int_counter!(
        "trivia_questions_created_total",
        "Number of questions added through the API"
    )
    .expect("metric is registered once");
    pub static ref QUESTIONS_DELETED: IntCounter = register_int_counter!(
        "trivia_questions_deleted_total",
        "Number of questions deleted through the API"
    )
    .expect("metric is registered once");
    pub static ref QUIZ_QUESTIONS_SERVED: CounterVec = register_counter_vec!(
        "trivia_quiz_questions_served_total",
        "Number of questions handed out to quiz players",
        &["category"]
    )
    .expect("metric is registered once");
}

/// Used when `LOG_LEVEL` is unset or does not parse.
const DEFAULT_LOG_FILTER: &str = "trivia_api=info,tower_http=info,sqlx=warn";

fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn span_events(setting: Option<String>) -> FmtSpan {
    match setting {
        Some(value) if value.eq_ignore_ascii_case("true") => FmtSpan::NEW | FmtSpan::CLOSE,
        _ => FmtSpan::NONE,
    }
}

/// Installs the global subscriber. `LOG_LEVEL` takes `EnvFilter` directives and
/// `INCLUDE_SPAN_EVENTS=true` logs span open and close, which times each request.
pub fn init_tracing() -> anyhow::Result<()> {
    let fmt_layer =
        fmt::layer().with_span_events(span_events(std::env::var("INCLUDE_SPAN_EVENTS").ok()));
    let filter_layer = log_filter(std::env::var("LOG_LEVEL").ok());

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}
