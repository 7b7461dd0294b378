use speechai::application::services::billing::{
    BillingRates, billable_minutes, cost_for_minutes, round2,
};

#[test]
fn given_125_seconds_when_billing_then_three_minutes_cost_2_27() {
    let minutes = billable_minutes(125.0);
    assert_eq!(minutes, 3);
    assert_eq!(cost_for_minutes(minutes, &BillingRates::default()), 2.27);
}

#[test]
fn given_exact_minute_boundary_when_billing_then_no_extra_minute() {
    assert_eq!(billable_minutes(60.0), 1);
    assert_eq!(billable_minutes(120.0), 2);
    assert_eq!(billable_minutes(120.5), 3);
}

#[test]
fn given_zero_duration_when_billing_then_one_minute_minimum() {
    assert_eq!(billable_minutes(0.0), 1);
    assert_eq!(
        cost_for_minutes(1, &BillingRates::default()),
        0.76,
        "1 * 0.006 * 84 * 1.5 = 0.756 rounds to 0.76"
    );
}

#[test]
fn given_non_finite_duration_when_billing_then_treated_as_zero() {
    assert_eq!(billable_minutes(f64::NAN), 1);
    assert_eq!(billable_minutes(f64::INFINITY), 1);
    assert_eq!(billable_minutes(-5.0), 1);
}

#[test]
fn given_non_finite_value_when_rounding_then_normalized_to_zero() {
    assert_eq!(round2(f64::NAN), 0.0);
    assert_eq!(round2(f64::INFINITY), 0.0);
    assert_eq!(round2(f64::NEG_INFINITY), 0.0);
}

#[test]
fn given_half_cent_when_rounding_then_rounds_away_from_zero() {
    assert_eq!(round2(2.265), 2.27);
    assert_eq!(round2(2.264), 2.26);
    assert_eq!(round2(-2.265), -2.27);
}

#[test]
fn given_any_finite_rate_combination_when_pricing_then_cost_is_finite() {
    let rates = BillingRates {
        unit_cost_per_minute: 0.006,
        fx_rate: 84.0,
        markup: 1.5,
    };
    for minutes in [1, 2, 3, 10, 60, 600] {
        let cost = cost_for_minutes(minutes, &rates);
        assert!(cost.is_finite());
        assert!(cost >= 0.0);
    }
}
