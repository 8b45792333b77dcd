//! Query complexity scoring

/// Complexity at or above which the master orchestrator joins every
/// consultation round.
pub const COMPLEX_QUERY_THRESHOLD: f64 = 0.7;

/// Characters at which the length component saturates.
const LENGTH_SATURATION: f64 = 1000.0;
/// Context entries at which the context component saturates.
const CONTEXT_SATURATION: f64 = 10.0;
/// Technical terms at which the density component saturates.
const TERM_SATURATION: f64 = 5.0;

const LENGTH_WEIGHT: f64 = 0.4;
const CONTEXT_WEIGHT: f64 = 0.2;
const TERM_WEIGHT: f64 = 0.4;

const TECHNICAL_TERMS: &[&str] = &[
    "algorithm",
    "analysis",
    "api",
    "architecture",
    "benchmark",
    "compliance",
    "concurrency",
    "database",
    "deployment",
    "distributed",
    "framework",
    "implementation",
    "infrastructure",
    "integration",
    "latency",
    "methodology",
    "metrics",
    "optimization",
    "optimize",
    "performance",
    "protocol",
    "regression",
    "scalability",
    "security",
    "statistical",
    "strategy",
    "system",
    "throughput",
];

/// Count whole-word, case-insensitive occurrences of technical vocabulary.
pub fn technical_term_count(text: &str) -> usize {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .filter(|word| {
            let lower = word.to_lowercase();
            TECHNICAL_TERMS.contains(&lower.as_str())
        })
        .count()
}

/// Complexity of a query in [0, 1].
///
/// `0.4·min(1, chars/1000) + 0.2·min(1, context/10) + 0.4·min(1, terms/5)`
pub fn complexity_score(query: &str, context_entries: usize) -> f64 {
    let length = (query.chars().count() as f64 / LENGTH_SATURATION).min(1.0);
    let context = (context_entries as f64 / CONTEXT_SATURATION).min(1.0);
    let terms = (technical_term_count(query) as f64 / TERM_SATURATION).min(1.0);

    (LENGTH_WEIGHT * length + CONTEXT_WEIGHT * context + TERM_WEIGHT * terms).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_scores_zero() {
        assert_eq!(complexity_score("", 0), 0.0);
    }

    #[test]
    fn test_term_count_is_whole_word_and_case_insensitive() {
        assert_eq!(technical_term_count("API design; the Api, apis"), 2);
        assert_eq!(technical_term_count("systematic"), 0);
    }

    #[test]
    fn test_components_add_up() {
        // 5 terms saturate the density component, 10 context entries saturate context.
        let query = "algorithm architecture database latency protocol";
        let expected = 0.4 * (query.chars().count() as f64 / 1000.0) + 0.2 + 0.4;
        assert!((complexity_score(query, 10) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_score_is_capped() {
        let long = "scalability ".repeat(500);
        assert!((complexity_score(&long, 50) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_plain_query_is_simple() {
        assert!(complexity_score("Write a haiku about autumn", 0) < 0.3);
    }
}
