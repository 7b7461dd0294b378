/// Pricing constants for the recognition provider, the display-currency
/// conversion, and the markup applied on top. Carried in configuration and
/// passed in; nothing here reads ambient state.
#[derive(Debug, Clone, Copy)]
pub struct BillingRates {
    /// Provider cost per billable minute, in the provider's currency.
    pub unit_cost_per_minute: f64,
    /// Fixed conversion rate into the display currency.
    pub fx_rate: f64,
    /// Multiplier applied on top of provider cost.
    pub markup: f64,
}

impl Default for BillingRates {
    fn default() -> Self {
        Self {
            unit_cost_per_minute: 0.006,
            fx_rate: 84.0,
            markup: 1.5,
        }
    }
}

/// Whole billable minutes for a measured duration. Non-finite or negative
/// durations count as zero seconds; a submitted file always bills at least
/// one minute.
pub fn billable_minutes(duration_seconds: f64) -> u32 {
    let seconds = if duration_seconds.is_finite() && duration_seconds > 0.0 {
        duration_seconds
    } else {
        0.0
    };
    ((seconds / 60.0).ceil() as u32).max(1)
}

/// Nearest-cent rounding, half away from zero. Non-finite input normalizes
/// to zero so no NaN can reach persistence.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}

/// Display-currency cost for a number of billable minutes.
pub fn cost_for_minutes(minutes: u32, rates: &BillingRates) -> f64 {
    let raw = f64::from(minutes) * rates.unit_cost_per_minute * rates.fx_rate * rates.markup;
    round2(raw)
}
