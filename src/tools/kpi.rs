//! Static KPI knowledge base.

use serde_json::{json, Value};

/// Answer for metrics the knowledge base does not cover.
pub const UNKNOWN_METRIC: &str = "Unknown metric. Try MRR or NPS.";

/// Look up a KPI definition. Matching ignores case and surrounding whitespace.
pub fn lookup_kpi(metric: &str) -> &'static str {
    match metric.trim().to_uppercase().as_str() {
        "MRR" => "MRR (Monthly Recurring Revenue): Sum of normalized monthly subscription revenue. Ex: sum(plan_price * seats).",
        "NPS" => "NPS (Net Promoter Score): %Promoters - %Detractors from survey responses.",
        _ => UNKNOWN_METRIC,
    }
}

/// Build the `lookup_kpi` result payload.
pub fn kpi_payload(metric: &str) -> Value {
    json!({
        "metric": metric.trim().to_uppercase(),
        "definition": lookup_kpi(metric),
        "source": "local-kb"
    })
}
