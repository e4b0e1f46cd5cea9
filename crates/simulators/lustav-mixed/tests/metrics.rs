use lustav_core::metrics::{MetricKind, StepMetrics};
use lustav_mixed::traffic::metrics::{MetricCollector, MetricSettings};
use lustav_testutils::traffic::{ScriptedStep, ScriptedTraffic, ScriptedVehicle};
use lustav_traci::control::TrafficControl;

#[test]
fn test_empty_network_is_all_zero() {
    let mut traffic = ScriptedTraffic::new(vec![ScriptedStep::default()]);
    traffic.simulation_step().unwrap();
    let collector = MetricCollector::new(&MetricSettings::default());
    assert_eq!(collector.collect(&mut traffic).unwrap(), StepMetrics::empty());
}

#[test]
fn test_metrics_of_two_vehicles() {
    let vehicles = vec![
        ScriptedVehicle::builder()
            .id("slow")
            .speed(2.0)
            .accumulated_waiting_time(10.0)
            .fuel(3.0)
            .stop_state(1)
            .departure(4.0)
            .build(),
        ScriptedVehicle::builder()
            .id("fast")
            .speed(12.0)
            .fuel(5.0)
            .departure(8.0)
            .build(),
    ];
    let mut steps = vec![ScriptedStep::default(); 9];
    steps.push(ScriptedStep::new(vehicles));
    let mut traffic = ScriptedTraffic::new(steps);
    for _ in 0..10 {
        traffic.simulation_step().unwrap();
    }

    let metrics = MetricCollector::new(&MetricSettings::default())
        .collect(&mut traffic)
        .unwrap();
    assert_eq!(metrics.get(MetricKind::NumberOfStops), 1.0);
    assert_eq!(metrics.get(MetricKind::FuelConsumption), 8.0);
    assert_eq!(metrics.get(MetricKind::AverageTravelTime), 5.0);
    assert_eq!(metrics.get(MetricKind::MeanTimeInNetwork), 4.0);
    assert_eq!(metrics.get(MetricKind::TrafficFlowRate), 0.2);
    assert_eq!(metrics.get(MetricKind::CongestionLevels), 1.0);
    assert_eq!(metrics.get(MetricKind::MeanSpeed), 7.0);
}

#[test]
fn test_flow_rate_divides_by_at_least_one() {
    let vehicle = ScriptedVehicle::builder().id("v").speed(10.0).build();
    let mut traffic = ScriptedTraffic::new(vec![ScriptedStep::new(vec![vehicle])]);
    traffic.simulation_step().unwrap();
    let metrics = MetricCollector::new(&MetricSettings::default())
        .collect(&mut traffic)
        .unwrap();
    assert_eq!(metrics.get(MetricKind::TrafficFlowRate), 1.0);
}

#[test]
fn test_congestion_speed_is_configurable() {
    let vehicle = ScriptedVehicle::builder().id("v").speed(7.0).build();
    let mut traffic = ScriptedTraffic::new(vec![ScriptedStep::new(vec![vehicle])]);
    traffic.simulation_step().unwrap();
    let settings = MetricSettings {
        congestion_speed: 8.0,
    };
    let metrics = MetricCollector::new(&settings).collect(&mut traffic).unwrap();
    assert_eq!(metrics.get(MetricKind::CongestionLevels), 1.0);
}
