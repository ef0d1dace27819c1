//! End-to-end runs of the relay net and the bundled net descriptions.

use std::path::PathBuf;

use rust_cpn::net::io::read_spec;
use rust_cpn::net::{Color, Net, NetError, NetSpec, OutputPolicy};
use rust_cpn::parser::parse_places;
use rust_cpn::report::{Silent, TextReporter};
use rust_cpn::simulator::{SimError, Simulator};

fn colors(labels: &[&str]) -> Vec<Color> {
    labels.iter().map(|label| Color::from(*label)).collect()
}

fn plan(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn relay() -> Net {
    let initial = parse_places(&["(red,blue)", "()", "()", "()"]).unwrap();
    NetSpec::relay(initial).build(OutputPolicy::Strict).unwrap()
}

fn bundled(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("nets").join(name)
}

#[test]
fn splitting_fires_once() {
    let mut net = relay();
    assert!(net.fire("t1").unwrap());
    assert_eq!(
        net.snapshot(),
        vec![vec![], colors(&["red"]), colors(&["blue"]), vec![]]
    );
}

#[test]
fn second_split_is_forbidden_and_changes_nothing() {
    let mut net = relay();
    assert!(net.fire("t1").unwrap());
    let before = net.snapshot();
    assert!(!net.fire("t1").unwrap());
    assert_eq!(net.snapshot(), before);
}

#[test]
fn split_then_join_ends_with_blue_back_home() {
    let mut net = relay();
    let report = Simulator::default()
        .run(&mut net, &plan(&["t1", "t2"]), &mut Silent)
        .unwrap();
    assert_eq!(
        report.result,
        vec![colors(&["blue"]), vec![], vec![], colors(&["red"])]
    );
    assert!(report.steps.iter().all(|step| step.executed));
}

#[test]
fn unknown_transition_aborts_the_run() {
    let mut net = relay();
    let mut out = TextReporter::new(Vec::new());
    let err = Simulator::default()
        .run(&mut net, &plan(&["t1", "t7", "t2"]), &mut out)
        .unwrap_err();
    assert!(matches!(
        err,
        SimError::Net(NetError::UnknownTransition(ref name)) if name == "t7"
    ));
    // t1 stays applied, t2 was never attempted
    assert_eq!(
        net.snapshot(),
        vec![vec![], colors(&["red"]), colors(&["blue"]), vec![]]
    );
    let text = String::from_utf8(out.into_inner()).unwrap();
    assert!(text.contains("t1 executed"));
    assert!(!text.contains("t2 executed"));
    assert!(!text.contains("t2 forbidden"));
    assert!(!text.contains("result"));
}

#[test]
fn text_report_matches_console_layout() {
    let mut net = relay();
    let mut out = TextReporter::new(Vec::new());
    Simulator::default()
        .run(&mut net, &plan(&["t1", "t1", "t2"]), &mut out)
        .unwrap();
    let text = String::from_utf8(out.into_inner()).unwrap();
    let expected = "\
Execution plan: t1 => t1 => t2
Initial state:  [[red, blue], [], [], []]

t1 executed
    [[], [red], [blue], []]
t1 forbidden
t2 executed
    [[blue], [], [], [red]]

result [[blue], [], [], [red]]
";
    assert_eq!(text, expected);
}

#[test]
fn bundled_relay_description_matches_built_in_net() {
    let spec = read_spec(bundled("relay.toml")).unwrap();
    let initial = parse_places(&["(red,blue)", "()", "()", "()"]).unwrap();
    assert_eq!(spec, NetSpec::relay(initial));
}

#[test]
fn bundled_mutex_admits_one_worker_at_a_time() {
    let mut net = read_spec(bundled("mutex.ron"))
        .unwrap()
        .build(OutputPolicy::Strict)
        .unwrap();
    let report = Simulator::default()
        .run(
            &mut net,
            &plan(&["enter_a", "enter_b", "leave_a", "enter_b", "leave_b"]),
            &mut Silent,
        )
        .unwrap();
    let outcomes: Vec<bool> = report.steps.iter().map(|step| step.executed).collect();
    assert_eq!(outcomes, vec![true, false, true, true, true]);
    assert_eq!(
        report.result,
        vec![colors(&["a", "b"]), colors(&["key"]), vec![]]
    );
}
