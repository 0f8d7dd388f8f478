//! Unit tests for EMA helpers

use stocksignal::signals::ema::{check_ema_cross, ema, ema_series};

fn rising(count: usize, base: f64) -> Vec<f64> {
    (0..count).map(|i| base + i as f64 * 0.5).collect()
}

#[test]
fn test_ema_insufficient_data() {
    assert!(ema(&rising(10, 100.0), 20).is_none());
    assert!(ema(&rising(10, 100.0), 0).is_none());
}

#[test]
fn test_ema_seeded_with_sma() {
    let values = [2.0, 4.0, 6.0];
    let series = ema_series(&values, 3);
    assert_eq!(series, vec![None, None, Some(4.0)]);

    let values = [2.0, 4.0, 6.0, 8.0];
    // k = 0.5: (8 - 4) * 0.5 + 4
    assert_eq!(ema(&values, 3), Some(6.0));
}

#[test]
fn test_ema_constant_series() {
    let values = vec![50.0; 40];
    let value = ema(&values, 12).unwrap();
    assert!((value - 50.0).abs() < 1e-9);
}

#[test]
fn test_ema_cross_direction() {
    let up = rising(60, 100.0);
    assert_eq!(check_ema_cross(&up, 12, 26), Some(1));

    let down: Vec<f64> = up.iter().rev().copied().collect();
    assert_eq!(check_ema_cross(&down, 12, 26), Some(-1));

    let flat = vec![10.0; 60];
    assert_eq!(check_ema_cross(&flat, 12, 26), Some(0));

    assert_eq!(check_ema_cross(&up[..20], 12, 26), None);
}
