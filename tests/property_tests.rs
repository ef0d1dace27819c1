//! Property-based tests for the firing engine.
//!
//! Nets are generated over a small palette so that guards are met often
//! enough to exercise both outcomes.

use proptest::prelude::*;
use rust_cpn::net::{
    ArcColor, Color, ConsumingArc, Net, Place, PlaceId, ProducingArc, Transition,
};

const PALETTE: [&str; 3] = ["red", "blue", "green"];
const PLACES: usize = 3;

prop_compose! {
    fn arbitrary_color()(idx in 0..PALETTE.len()) -> Color {
        Color::from(PALETTE[idx])
    }
}

prop_compose! {
    fn arbitrary_arc_color()(colored in prop::bool::weighted(0.8), color in arbitrary_color()) -> ArcColor {
        if colored { ArcColor::Color(color) } else { ArcColor::Any }
    }
}

prop_compose! {
    fn arbitrary_marking()(
        places in prop::collection::vec(prop::collection::vec(arbitrary_color(), 0..4), PLACES)
    ) -> Vec<Vec<Color>> {
        places
    }
}

prop_compose! {
    fn arbitrary_arc()(place in 0..PLACES as u32, color in arbitrary_arc_color(), amount in 1..3usize)
        -> (PlaceId, ArcColor, usize) {
        (PlaceId::new(place), color, amount)
    }
}

prop_compose! {
    fn arbitrary_transition()(
        inputs in prop::collection::vec(arbitrary_arc(), 0..3),
        outputs in prop::collection::vec(arbitrary_arc(), 0..3),
    ) -> (Vec<(PlaceId, ArcColor, usize)>, Vec<(PlaceId, ArcColor, usize)>) {
        (inputs, outputs)
    }
}

type ArcDefs = Vec<(PlaceId, ArcColor, usize)>;

fn build(marking: &[Vec<Color>], transitions: &[(ArcDefs, ArcDefs)]) -> Net {
    let mut net = Net::empty();
    for (idx, colors) in marking.iter().enumerate() {
        net.add_place(Place::with_tokens(format!("P{idx}"), colors.iter().cloned()));
    }
    for (idx, (inputs, outputs)) in transitions.iter().enumerate() {
        let mut transition = Transition::new(format!("t{idx}"));
        for (place, color, amount) in inputs {
            transition.add_consuming(ConsumingArc::new(*place, color.clone(), *amount));
        }
        for (place, color, amount) in outputs {
            transition.add_producing(ProducingArc::new(*place, color.clone(), *amount));
        }
        net.insert_transition(transition).unwrap();
    }
    net
}

/// Outputs mirror inputs one to one, so nothing can be dropped.
fn mirrored(inputs: &ArcDefs, targets: &[u32]) -> ArcDefs {
    inputs
        .iter()
        .zip(targets.iter().cycle())
        .map(|((_, color, amount), target)| (PlaceId::new(*target), color.clone(), *amount))
        .collect()
}

proptest! {
    #[test]
    fn counts_stay_consistent(
        marking in arbitrary_marking(),
        transitions in prop::collection::vec(arbitrary_transition(), 1..4),
        sequence in prop::collection::vec(0..4usize, 0..12),
    ) {
        let mut net = build(&marking, &transitions);
        for pick in sequence {
            let _ = net.fire(&format!("t{}", pick % transitions.len()));
            prop_assert!(net.places().iter().all(Place::is_consistent));
            prop_assert!(net.transitions().iter().all(Transition::is_buffer_empty));
        }
    }

    #[test]
    fn refused_firing_changes_nothing(
        marking in arbitrary_marking(),
        transition in arbitrary_transition(),
    ) {
        let mut net = build(&marking, &[transition]);
        let before = net.snapshot();
        match net.fire("t0") {
            Ok(true) => {}
            Ok(false) | Err(_) => prop_assert_eq!(net.snapshot(), before),
        }
    }

    #[test]
    fn guard_matches_color_counts(
        colors in prop::collection::vec(arbitrary_color(), 0..5),
        wanted in arbitrary_color(),
        amount in 1..4usize,
    ) {
        let held = colors.iter().filter(|color| **color == wanted).count();
        let place = Place::with_tokens("P", colors.iter().cloned());
        let arc = ConsumingArc::new(PlaceId::new(0), wanted, amount);
        prop_assert_eq!(arc.is_satisfied(&place), held >= amount);
    }

    #[test]
    fn mirrored_firing_conserves_tokens(
        marking in arbitrary_marking(),
        inputs in prop::collection::vec(arbitrary_arc(), 1..3),
        targets in prop::collection::vec(0..PLACES as u32, 1..3),
    ) {
        let outputs = mirrored(&inputs, &targets);
        let mut net = build(&marking, &[(inputs, outputs)]);
        let before = net.total_tokens();
        let fired = net.fire("t0");
        prop_assert!(fired.is_ok());
        prop_assert_eq!(net.total_tokens(), before);
    }

    #[test]
    fn replay_is_deterministic(
        marking in arbitrary_marking(),
        transitions in prop::collection::vec(arbitrary_transition(), 1..4),
        sequence in prop::collection::vec(0..4usize, 0..12),
    ) {
        let template = build(&marking, &transitions);
        let mut first = template.clone();
        let mut second = template;
        for pick in sequence {
            let name = format!("t{}", pick % transitions.len());
            let a = first.fire(&name).ok();
            let b = second.fire(&name).ok();
            prop_assert_eq!(a, b);
            prop_assert_eq!(first.snapshot(), second.snapshot());
        }
    }
}
