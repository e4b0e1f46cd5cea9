use lustav_core::step::Step;

#[test]
fn test_step_multiples() {
    let interval = Step::from(30u64);
    assert!(Step(0).is_multiple_of(interval));
    assert!(Step(60).is_multiple_of(interval));
    assert!(!Step(31).is_multiple_of(interval));
    assert!(!Step(30).is_multiple_of(Step(0)));
}

#[test]
fn test_step_arithmetic_and_parse() {
    let mut step = Step(5) + Step(6);
    step += Step(1);
    assert_eq!(step, Step(12));
    assert_eq!("3600".parse::<Step>().unwrap(), Step(3600));
    assert_eq!(Step(7).as_f64(), 7.0);
    assert!("-1".parse::<Step>().is_err());
}
