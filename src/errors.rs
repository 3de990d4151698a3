/// Errors surfaced by the weather engine.
///
/// A request either fully succeeds or fails with the first error
/// encountered — there is no partial-result degradation and no internal
/// retry. The one exception is non-finite precipitation readings, which
/// degrade the affected sum to `None` instead of failing the request
/// (see `helpers::sum_by_or_null`).
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// Upstream payload is missing expected structural nodes or cannot
    /// be decoded at all.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// No forecast/observation/weather-code coverage at a required
    /// bucket-anchor instant.
    #[error("Missing data point: {0}")]
    MissingDataPoint(String),

    /// A weather code has no registered description, icon or translation.
    /// Indicates the static symbol tables are out of date.
    #[error("Unknown weather symbol: {0}")]
    UnknownSymbol(String),

    /// An aggregation window contained zero records where at least one
    /// is required (e.g. min/max over an empty set).
    #[error("Invalid aggregate input: {0}")]
    InvalidAggregateInput(String),

    /// Transport-level or HTTP-level failure talking to a provider.
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// Invariant violation that indicates a bug rather than bad input.
    #[error("Internal error: {0}")]
    InternalError(String),
}
