//! Credit pricing. The same functions run at submission time (to reserve
//! credits) and inside the document pipeline (to report consumption), so the
//! two totals can never drift.

/// Base credit cost for a `provider-model` key. Unknown keys price at 1 so a
/// newly added model is never free by accident.
pub fn provider_credits(provider_model_key: &str) -> i32 {
    match provider_model_key {
        "free" => 0,
        "openai-gpt4" => 2,
        "openai-gpt5" => 3,
        "anthropic-claude" => 3,
        "gemini-pro" => 1,
        "gemini-flash" => 1,
        "openrouter" => 2,
        _ => 1,
    }
}

/// Analysis-type scaling applied on top of the base provider cost.
pub fn analysis_type_multiplier(analysis_type: &str) -> f64 {
    match analysis_type {
        "contract" | "legal" => 1.5,
        "compliance" => 2.0,
        "template" => 1.8,
        _ => 1.0,
    }
}

/// Credits for analyzing one document with the given settings, rounded up.
///
/// The free tier prices on the bare `free` key regardless of the model
/// string the client sent with it.
pub fn estimate_credits(provider: &str, model: &str, analysis_type: &str) -> i32 {
    let key = if provider == "free" {
        "free".to_string()
    } else {
        format!("{}-{}", provider, model)
    };
    let base = provider_credits(&key);
    (base as f64 * analysis_type_multiplier(analysis_type)).ceil() as i32
}
