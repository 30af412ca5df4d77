use colored::*;
use indicatif::ProgressStyle;
use tracing::Span;
use tracing_indicatif::span_ext::IndicatifSpanExt;
use vigil_core::discovery::HostCallback;

fn style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} {msg} {elapsed:.dim}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&[
            "▁▁▁▁▁",
            "▁▂▂▂▁",
            "▁▄▂▄▁",
            "▂▄▆▄▂",
            "▄▆█▆▄",
            "▂▄▆▄▂",
            "▁▄▂▄▁",
            "▁▂▂▂▁",
        ])
}

/// Turns `span` into a spinner with `message`. The spinner shows while the span is
/// entered and disappears when it closes.
pub fn attach(span: &Span, message: &str) {
    span.pb_set_style(&style());
    span.pb_set_message(message);
}

/// Callback for discovery that keeps the spinner message current.
pub fn host_counter(span: Span) -> HostCallback {
    Box::new(move |count| {
        span.pb_set_message(&format!(
            "Identified {} host(s) so far...",
            count.to_string().green().bold()
        ));
    })
}
