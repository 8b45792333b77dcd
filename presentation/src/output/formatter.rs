//! Output formatter trait

use conclave_domain::{OrchestrationResult, OutputFormat};

/// Trait for formatting orchestration results
pub trait OutputFormatter {
    /// Final answer plus per-agent detail
    fn format(&self, result: &OrchestrationResult) -> String;

    /// Format as JSON
    fn format_json(&self, result: &OrchestrationResult) -> String;

    /// Only the final answer
    fn format_text_only(&self, result: &OrchestrationResult) -> String;

    /// Dispatch on the requested format.
    fn render(&self, result: &OrchestrationResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => self.format_text_only(result),
            OutputFormat::Full => self.format(result),
            OutputFormat::Json => self.format_json(result),
        }
    }
}
