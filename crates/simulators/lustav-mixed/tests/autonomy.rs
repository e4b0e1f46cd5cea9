use lustav_core::rate::PenetrationRate;
use lustav_mixed::traffic::autonomy::{AutonomySettings, AvDesignator};
use lustav_testutils::traffic::{ScriptedStep, ScriptedTraffic};
use lustav_traci::control::TrafficControl;

fn departures(count: usize) -> (ScriptedTraffic, Vec<String>) {
    let ids: Vec<String> = (0..count).map(|i| format!("veh{}", i)).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let mut traffic = ScriptedTraffic::new(vec![ScriptedStep::new(Vec::new()).departing(&id_refs)]);
    traffic.simulation_step().unwrap();
    let departed = traffic.departed_vehicles().unwrap();
    (traffic, departed)
}

fn designator(rate: f64) -> AvDesignator {
    AvDesignator::new(
        PenetrationRate::new(rate).unwrap(),
        &AutonomySettings::default(),
        42,
    )
}

#[test]
fn test_rate_zero_designates_nothing() {
    let (mut traffic, departed) = departures(50);
    let mut designator = designator(0.0);
    assert_eq!(designator.designate(&mut traffic, &departed).unwrap(), 0);
    assert_eq!(designator.designated(), 0);
    assert!(traffic.type_changes.is_empty());
}

#[test]
fn test_rate_one_designates_everything() {
    let (mut traffic, departed) = departures(50);
    let mut designator = designator(1.0);
    assert_eq!(designator.designate(&mut traffic, &departed).unwrap(), 50);
    assert_eq!(traffic.type_changes.len(), 50);
    assert!(traffic
        .type_changes
        .iter()
        .all(|(_, v_type)| v_type == "autonomous_passenger"));
    assert_eq!(traffic.type_changes[0].0, "veh0");
}

#[test]
fn test_same_seed_same_designations() {
    let (mut first_traffic, departed) = departures(200);
    let (mut second_traffic, _) = departures(200);
    let mut first = designator(0.5);
    let mut second = designator(0.5);
    first.designate(&mut first_traffic, &departed).unwrap();
    second.designate(&mut second_traffic, &departed).unwrap();

    assert_eq!(first_traffic.type_changes, second_traffic.type_changes);
    let count = first.designated();
    assert!(count > 50 && count < 150, "designated {} of 200", count);
}

#[test]
fn test_custom_vehicle_type() {
    let (mut traffic, departed) = departures(3);
    let settings = AutonomySettings {
        vehicle_type: "cav".to_string(),
    };
    let mut designator = AvDesignator::new(PenetrationRate::new(1.0).unwrap(), &settings, 1);
    designator.designate(&mut traffic, &departed).unwrap();
    assert!(traffic.type_changes.iter().all(|(_, v_type)| v_type == "cav"));
}
