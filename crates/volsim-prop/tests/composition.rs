use volsim_core::{Bindings, VolError};
use volsim_prop::{compose, BinaryOp, Operand, Property};

fn evaluated(name: &str, variable: &str, values: &[f64]) -> Property {
    let mut bindings = Bindings::new();
    bindings.insert("src".into(), values.to_vec());
    let mut prop = Property::result(name, variable, "src");
    prop.run_calculation(&bindings).unwrap();
    prop
}

#[test]
fn property_pairs_combine_elementwise() {
    let area = evaluated("Area", "area", &[1.0, 2.0, 3.0]);
    let h = evaluated("Thickness", "h", &[10.0, 20.0, 30.0]);

    let product = area.multiply(&h).unwrap();
    assert_eq!(product.name(), "(Area * Thickness)");
    assert_eq!(product.variable(), "area_h");
    assert_eq!(product.equation(), Some("(area * h)"));
    assert_eq!(product.values(), &[10.0, 40.0, 90.0]);
    assert!(product.stats().is_some());

    let diff = h.subtract(&area).unwrap();
    assert_eq!(diff.values(), &[9.0, 18.0, 27.0]);
}

#[test]
fn scalars_apply_on_either_side() {
    let area = evaluated("Area", "area", &[2.0, 4.0]);

    let halved = area.divide(2.0).unwrap();
    assert_eq!(halved.name(), "(Area / 2)");
    assert_eq!(halved.variable(), "area_2");
    assert_eq!(halved.values(), &[1.0, 2.0]);

    let reflected = area.reflected(BinaryOp::Subtract, 10.0).unwrap();
    assert_eq!(reflected.name(), "(10 - Area)");
    assert_eq!(reflected.variable(), "area_10");
    assert_eq!(reflected.values(), &[8.0, 6.0]);

    let sum = area.add(0.5).unwrap();
    assert_eq!(sum.values(), &[2.5, 4.5]);
}

#[test]
fn negation_keeps_the_variable() {
    let area = evaluated("Area", "area", &[2.0, -4.0]);
    let neg = area.negate().unwrap();
    assert_eq!(neg.name(), "(-Area)");
    assert_eq!(neg.variable(), "area");
    assert_eq!(neg.values(), &[-2.0, 4.0]);
}

#[test]
fn mismatched_lengths_are_rejected() {
    let a = evaluated("A", "a", &[1.0, 2.0]);
    let b = evaluated("B", "b", &[1.0, 2.0, 3.0]);
    let err = a.add(&b).unwrap_err();
    assert!(matches!(err, VolError::InvalidInput(_)));
    assert_eq!(err.info().code, "length-mismatch");
}

#[test]
fn unevaluated_operands_and_bare_scalars_are_rejected() {
    let fresh = Property::result("Fresh", "fresh", "1");
    let err = fresh.multiply(3.0).unwrap_err();
    assert_eq!(err.info().code, "not-evaluated");

    let err = compose(BinaryOp::Add, Operand::Scalar(1.0), Operand::Scalar(2.0)).unwrap_err();
    assert_eq!(err.info().code, "no-property-operand");
}
