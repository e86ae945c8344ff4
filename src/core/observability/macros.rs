/// Creates a root span based on the provided sampling rate, so unsampled
/// auctions skip the cost of building span context entirely.
///
/// # Arguments
/// * `sample_percent` - The percent (0.0 to 1.0) of root spans to keep
/// * `span_name` - The name of the span if created (must be a literal)
/// * `fields` - Optional span fields
///
/// # Behavior
/// - If a parent span is active a child span is always created, keeping the trace whole
/// - Otherwise the span is kept at the configured sample rate
///
/// # Returns
/// A real span when attached or sampled, `Span::none()` otherwise
///
/// # Example
/// ```ignore
/// let span = sample_or_attach_root_span!(0.01, "auction", auction_id = %id);
/// pipeline.run(&context).instrument(span).await
/// ```
#[macro_export]
macro_rules! sample_or_attach_root_span {
    ($sample_percent:expr, $span_name:literal) => {{
        let current = ::tracing::Span::current();

        if !current.is_disabled() || ::rand::random::<f32>() < $sample_percent {
            ::tracing::info_span!($span_name)
        } else {
            ::tracing::Span::none()
        }
    }};
    ($sample_percent:expr, $span_name:literal, $($fields:tt)*) => {{
        let current = ::tracing::Span::current();

        if !current.is_disabled() || ::rand::random::<f32>() < $sample_percent {
            ::tracing::info_span!($span_name, $($fields)*)
        } else {
            ::tracing::Span::none()
        }
    }};
}

/// Creates an INFO-level child span only if the parent span is active (sampled).
///
/// When the parent span is disabled this returns `Span::none()`, so
/// tasks can record fields unconditionally.
///
/// # Returns
/// An **un-entered** `Span` - you must call `.entered()` or use `.instrument()`.
///
/// # Example
/// ```ignore
/// let span = child_span_info!("partition_task", s2s_ad_units = tracing::field::Empty);
/// span.record("s2s_ad_units", 2);
/// ```
#[macro_export]
macro_rules! child_span_info {
    ($span_name:literal) => {{
        if !::tracing::Span::current().is_disabled() {
            ::tracing::info_span!($span_name)
        } else {
            ::tracing::Span::none()
        }
    }};
    ($span_name:literal, $($fields:tt)*) => {{
        if !::tracing::Span::current().is_disabled() {
            ::tracing::info_span!($span_name, $($fields)*)
        } else {
            ::tracing::Span::none()
        }
    }};
}
