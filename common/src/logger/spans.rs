use tracing::{Span, field};

use super::TraceId;

/// Root span for one unit of work (a poll cycle, a command).
pub fn root_span(name: &'static str, trace_id: &TraceId) -> Span {
    tracing::info_span!(
        "root",
        name = %name,
        trace_id = %trace_id,
        price = field::Empty
    )
}

/// Child span; inherits the trace id from the current root.
pub fn child_span(name: &'static str) -> Span {
    tracing::info_span!("child", name = %name)
}
