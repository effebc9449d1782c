use approx::assert_relative_eq;
use lunar_logistics::{
    build_efficiency, run_trials, simulate, Configuration, EfficiencyKind, LaunchCadence,
    LearningCurve, RiskConfig,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

proptest! {
    #[test]
    fn debris_alpha_stays_in_unit_interval(
        offset in 0.0f64..600.0,
        incident_rate in 0.0f64..5.0,
        repair_days in 0.0f64..60.0,
        debris_growth in 0.0f64..0.1,
        repair_improvement in 0.0f64..0.5,
    ) {
        let model = build_efficiency(&EfficiencyKind::DebrisGrowth {
            incident_rate,
            repair_days,
            debris_growth,
            repair_improvement,
            maintenance_fraction: 0.05,
        });
        let alpha = model.alpha(offset);
        prop_assert!((0.0..=1.0).contains(&alpha));
    }

    #[test]
    fn knee_alpha_stays_in_unit_interval(offset in 0.0f64..600.0) {
        let alpha = build_efficiency(&EfficiencyKind::knee_decay()).alpha(offset);
        prop_assert!((0.0..=1.0).contains(&alpha));
    }

    #[test]
    fn unit_cost_is_non_increasing_and_floored(
        start in 0.0f64..1.0e7,
        extra in 0.0f64..1.0e7,
        learning_rate in 0.5f64..0.99,
    ) {
        let curve = LearningCurve::new(375_000_000.0, 10_000_000.0, learning_rate);
        let early = curve.unit_cost(start);
        let late = curve.unit_cost(start + extra);
        prop_assert!(late <= early);
        prop_assert!(late >= curve.floor_cost);
    }

    #[test]
    fn capacity_is_monotone_in_year_and_sites(
        year in 2000.0f64..2150.0,
        later in 0.0f64..50.0,
        sites in 1usize..40,
    ) {
        let cadence = LaunchCadence::default();
        let base = cadence.capacity(year, sites, 150.0);
        prop_assert!(cadence.capacity(year + later, sites, 150.0) >= base);
        prop_assert!(cadence.capacity(year, sites + 1, 150.0) > base);
    }

    #[test]
    fn every_period_routes_its_full_demand(
        total_mass in 0.0f64..5.0e8,
        duration in 1usize..120,
        elevator_capacity in 0.0f64..2.0e6,
    ) {
        let config = Configuration {
            total_mass,
            elevator_capacity,
            ..Configuration::default()
        };
        let result = simulate(duration, &config).expect("valid run");
        for period in &result.trajectory {
            assert_relative_eq!(
                period.elevator_cargo + period.rocket_cargo,
                period.demand,
                max_relative = 1e-12
            );
            prop_assert!(period.elevator_cargo <= period.elevator_capacity);
        }
        prop_assert!(result.financial_cost >= config.infrastructure_cost);
    }
}

#[test]
fn cumulative_launches_and_cost_never_decrease() {
    let result = simulate(60, &Configuration::default()).expect("valid run");
    let mut launches = 0.0;
    let mut cost = 0.0;
    for period in &result.trajectory {
        assert!(period.launches >= 0.0);
        assert!(period.cost() >= 0.0);
        launches += period.launches;
        cost += period.cost();
    }
    assert_relative_eq!(launches, result.totals.launches, max_relative = 1e-12);
    assert_relative_eq!(cost, result.totals.financial_cost, max_relative = 1e-12);
}

#[test]
fn shorter_durations_lean_harder_on_rockets() {
    let config = Configuration::default();
    let shares: Vec<f64> = [20, 40, 60, 80, 100]
        .iter()
        .map(|&duration| simulate(duration, &config).expect("valid run").rocket_share)
        .collect();
    assert!(shares.windows(2).all(|pair| pair[0] >= pair[1]));
}

#[test]
fn example_scenario_lands_in_expected_ranges() {
    let result = simulate(60, &Configuration::default()).expect("valid run");
    assert!((0.65..0.75).contains(&result.rocket_share));
    assert!((15.0e12..20.0e12).contains(&result.tax_inclusive_cost));
    assert_relative_eq!(result.emissions, result.totals.rocket_cargo * 2.5, max_relative = 1e-12);
}

#[test]
fn injected_seed_reproduces_risk_summary() {
    let config = Configuration::default();
    let risk = RiskConfig::default();
    let mut a = ChaCha8Rng::seed_from_u64(2050);
    let mut b = ChaCha8Rng::seed_from_u64(2050);
    let first = run_trials(&config, &risk, 25, 48, &mut a).expect("valid batch");
    let second = run_trials(&config, &risk, 25, 48, &mut b).expect("valid batch");
    assert_eq!(first, second);
}
