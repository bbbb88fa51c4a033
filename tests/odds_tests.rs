use linebook::domain::odds::{format_display, parse_signed, snap_to_ladder, to_alt, to_primary};
use linebook::domain::PriceLadder;

#[test]
fn signed_round_trip_recovers_value() {
    // -100 and +100 both map to 2.0, which converts back to +100.
    for a in (-5000i64..=-101).chain(100..=5000) {
        let back = to_primary(to_alt(a as f64).unwrap()).unwrap();
        assert!((back - a).abs() <= 1, "{a} came back as {back}");
    }
    assert_eq!(to_primary(to_alt(-100.0).unwrap()).unwrap(), 100);
}

#[test]
fn decimal_round_trip_is_close() {
    let mut d = 1.01;
    while d < 50.0 {
        let signed = to_primary(d).unwrap();
        let back = to_alt(signed as f64).unwrap();
        // Signed prices are whole numbers, so at most half a cent is lost.
        assert!((back - d).abs() <= 0.006, "{d} came back as {back}");
        d += 0.01;
    }
}

#[test]
fn snap_picks_the_nearest_tick() {
    let ladder = [1.5, 1.9, 2.0, 2.1, 3.0];
    let mut x = 1.0;
    while x < 4.0 {
        let snapped = snap_to_ladder(x, &ladder);
        assert!(ladder.contains(&snapped));
        let best = ladder
            .iter()
            .map(|t| (x - t).abs())
            .fold(f64::INFINITY, f64::min);
        assert!(((x - snapped).abs() - best).abs() < 1e-12);
        x += 0.013;
    }
}

#[test]
fn snap_with_empty_ladder_is_identity() {
    assert_eq!(snap_to_ladder(2.37, &[]), 2.37);
    assert_eq!(PriceLadder::default().snap(1.11), 1.11);
}

#[test]
fn display_and_parse_agree() {
    for input in ["+150", "-110", "-200", "+100", "250"] {
        let alt = parse_signed(input).unwrap().to_alt().unwrap();
        let shown = format_display(alt).unwrap();
        let expected = if input.starts_with(['+', '-']) {
            input.to_string()
        } else {
            format!("+{input}")
        };
        assert_eq!(shown, expected);
    }
}
