use proptest::prelude::*;
use volsim_core::{Bindings, VolError};
use volsim_dist::{Distribution, Family};
use volsim_prop::{mean, percentile, risk, Property, Stats};

fn uniform_area(n: usize, seed: u64) -> Property {
    let dist = Distribution::new(Family::Uniform { min: 100.0, max: 200.0 }, n)
        .unwrap()
        .with_seed(seed);
    Property::input("Area", "area", dist)
}

fn bound(name: &str, values: &[f64]) -> Bindings {
    let mut bindings = Bindings::new();
    bindings.insert(name.to_string(), values.to_vec());
    bindings
}

#[test]
fn input_stats_are_ordered_and_bounded() {
    let mut area = uniform_area(10_000, 7);
    let stats = *area.run_calculation(&Bindings::new()).unwrap();
    let values = area.values();
    assert_eq!(values.len(), 10_000);
    let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    assert!(lo <= stats.mean && stats.mean <= hi);
    assert!(stats.p10 <= stats.p50 && stats.p50 <= stats.p90);
    assert!((stats.mean - 150.0).abs() < 2.0);
    // an input never risks, even with a probability configured
    assert!(area.values_probability().is_empty());
}

#[test]
fn seeded_probability_stats_survive_until_risking_replaces_them() {
    let seeded = Stats {
        p10: 1.0,
        p50: 2.0,
        p90: 3.0,
        mean: 2.0,
        std: 0.5,
    };

    let mut area = uniform_area(100, 3).with_probability_stats(seeded);
    area.run_calculation(&Bindings::new()).unwrap();
    assert_eq!(area.probability_stats(), Some(&seeded));
    assert!(area.values_probability().is_empty());

    let mut volume = Property::result("Volume", "vol", "area * 2")
        .with_probability_stats(seeded);
    volume.run_calculation(&bound("area", area.values())).unwrap();
    assert_eq!(volume.probability_stats(), Some(&seeded));

    let mut risked = volume.clone().with_probability(0.5);
    risked.run_calculation(&bound("area", area.values())).unwrap();
    let replaced = risked.probability_stats().unwrap();
    assert_ne!(replaced, &seeded);
    assert_eq!(replaced, &Stats::from_values(risked.values_probability()));
}

#[test]
fn equation_results_are_pure() {
    let mut area = uniform_area(256, 1);
    area.run_calculation(&Bindings::new()).unwrap();
    let bindings = bound("area", area.values());

    let mut volume = Property::result("Volume", "vol", "area * 12.5 - sqrt(area)");
    volume.run_calculation(&bindings).unwrap();
    let first = volume.values().to_vec();
    volume.run_calculation(&bindings).unwrap();
    assert_eq!(first, volume.values());
}

#[test]
fn unknown_identifier_surfaces_as_evaluation_error() {
    let mut volume = Property::result("Volume", "vol", "area * thickness");
    let err = volume
        .run_calculation(&bound("area", &[1.0, 2.0]))
        .unwrap_err();
    assert!(matches!(err, VolError::Evaluation(_)));
}

#[test]
fn risking_rejects_boundary_probabilities() {
    for p in [0.0, 1.0, 1.5, -0.2] {
        let mut prop = Property::result("Risked", "r", "area").with_probability(p);
        let err = prop
            .run_calculation(&bound("area", &[1.0, 2.0, 3.0]))
            .unwrap_err();
        assert!(matches!(err, VolError::InvalidProbabilityRange(_)), "{p}");
    }
}

#[test]
fn risked_area_keeps_about_ninety_percent() {
    let mut area = uniform_area(10_000, 2024);
    area.run_calculation(&Bindings::new()).unwrap();

    let mut risked = Property::result("Risked Area", "risked_area", "area").with_probability(0.9);
    risked
        .run_calculation(&bound("area", area.values()))
        .unwrap();

    let kept: Vec<f64> = risked
        .values_probability()
        .iter()
        .copied()
        .filter(|&x| x != 0.0)
        .collect();
    assert!((8_950..=9_050).contains(&kept.len()), "kept {}", kept.len());

    let stats = risked.probability_stats().unwrap();
    assert!((stats.mean - mean(risked.values_probability())).abs() < 1e-9);
    // the surviving trials are the lower 90% of U(100, 200)
    assert!((mean(&kept) - 145.0).abs() < 1.5);
}

#[test]
fn results_without_probability_are_not_risked() {
    let mut prop = Property::result("Plain", "plain", "area * 2");
    prop.run_calculation(&bound("area", &[1.0, 2.0])).unwrap();
    assert_eq!(prop.values(), &[2.0, 4.0]);
    assert!(prop.values_probability().is_empty());
    assert!(prop.probability_stats().is_none());
}

proptest! {
    #[test]
    fn risking_only_zeroes_above_threshold(
        values in prop::collection::vec(-1e4f64..1e4, 1..400),
        p in 0.01f64..0.99,
    ) {
        let risked = risk(&values, p).unwrap();
        prop_assert_eq!(risked.values.len(), values.len());
        prop_assert_eq!(risked.threshold, percentile(&values, p * 100.0));
        for (&raw, &out) in values.iter().zip(&risked.values) {
            if raw > risked.threshold {
                prop_assert_eq!(out, 0.0);
            } else {
                prop_assert_eq!(out, raw);
            }
        }
    }

    #[test]
    fn zeroed_fraction_tracks_exceedance(
        values in prop::collection::vec(0.0f64..1.0, 200..600),
        p in 0.05f64..0.95,
    ) {
        let risked = risk(&values, p).unwrap();
        let zeroed = values.iter().filter(|&&x| x > risked.threshold).count();
        let fraction = zeroed as f64 / values.len() as f64;
        prop_assert!((fraction - (1.0 - p)).abs() <= 2.0 / values.len() as f64 + 1e-9);
    }

    #[test]
    fn percentiles_are_monotone(values in prop::collection::vec(-1e6f64..1e6, 1..200)) {
        let p10 = percentile(&values, 10.0);
        let p50 = percentile(&values, 50.0);
        let p90 = percentile(&values, 90.0);
        prop_assert!(p10 <= p50 && p50 <= p90);
    }
}
