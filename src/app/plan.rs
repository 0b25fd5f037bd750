use crate::api::models::{AvailabilityAssessment, PlanRequest};

pub(crate) const DEFAULT_HORIZON_DAYS: i64 = 30;
pub(crate) const DEFAULT_COUNTRY: &str = "US";

/// Free-text fields the user edits before asking for a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlanInputs {
    pub(crate) country: String,
    pub(crate) horizon_days: String,
    pub(crate) permanent_service_ids: String,
}

/// Trimmed country, `US` when blank. Case is left as typed.
pub(crate) fn effective_country(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        DEFAULT_COUNTRY.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Leading-integer parse: optional sign then digits at the start of the
/// trimmed text. Anything else, including overflow, yields the default.
pub(crate) fn parse_horizon_days(raw: &str) -> i64 {
    let trimmed = raw.trim();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let digits_len = rest
        .bytes()
        .take_while(|byte| byte.is_ascii_digit())
        .count();
    if digits_len == 0 {
        return DEFAULT_HORIZON_DAYS;
    }

    rest[..digits_len]
        .parse::<i64>()
        .ok()
        .and_then(|value| value.checked_mul(sign))
        .unwrap_or(DEFAULT_HORIZON_DAYS)
}

pub(crate) fn parse_service_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn build_plan_request(
    inputs: &PlanInputs,
    assessments: &[AvailabilityAssessment],
) -> PlanRequest {
    PlanRequest {
        country: effective_country(&inputs.country).to_uppercase(),
        horizon_days: parse_horizon_days(&inputs.horizon_days),
        permanent_service_ids: parse_service_ids(&inputs.permanent_service_ids),
        assessments: assessments.to_vec(),
    }
}
