/// Shipping price for an order: base of 0.01 per kilometer, scaled by a
/// weight coefficient (over 10 kg doubles it, 5-10 kg adds half, 3-4 kg adds
/// 30%) and another 30% for fragile cargo, rounded up to two decimals.
///
/// Factors are carried as thousandths so the two-decimal ceiling stays exact
/// in integer arithmetic.
pub fn shipping_cost(distance_km: u32, weight_kg: u32, fragile_cargo: bool) -> f64 {
    let mut factor: u64 = match weight_kg {
        w if w > 10 => 2000,
        5..=10 => 1500,
        3..=4 => 1300,
        _ => 1000,
    };

    if fragile_cargo {
        factor = factor * 13 / 10;
    }

    let cents = (u64::from(distance_km) * factor).div_ceil(1000);
    cents as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::shipping_cost;

    #[test]
    fn zero_distance_costs_nothing() {
        for weight in [0, 1, 3, 7, 10, 25] {
            assert_eq!(shipping_cost(0, weight, false), 0.0);
            assert_eq!(shipping_cost(0, weight, true), 0.0);
        }
    }

    #[test]
    fn reference_price_moscow_paris() {
        // 632 km, 7 kg, not fragile: 632 * 0.01 * 1.5 = 9.48
        assert_eq!(shipping_cost(632, 7, false), 9.48);
    }

    #[test]
    fn weight_coefficient_boundaries() {
        assert_eq!(shipping_cost(1000, 2, false), 10.0);
        assert_eq!(shipping_cost(1000, 3, false), 13.0);
        assert_eq!(shipping_cost(1000, 4, false), 13.0);
        assert_eq!(shipping_cost(1000, 5, false), 15.0);
        assert_eq!(shipping_cost(1000, 10, false), 15.0);
        assert_eq!(shipping_cost(1000, 11, false), 20.0);
    }

    #[test]
    fn fragile_cargo_adds_thirty_percent() {
        assert_eq!(shipping_cost(1000, 2, true), 13.0);
        assert_eq!(shipping_cost(1000, 11, true), 26.0);
    }

    #[test]
    fn fractional_cents_round_up() {
        // 7 km * 0.01 * 1.3 = 0.091 -> 0.10
        assert_eq!(shipping_cost(7, 3, false), 0.10);
    }

    #[test]
    fn non_decreasing_in_distance() {
        let mut previous = 0.0;
        for distance in 0..2000 {
            let price = shipping_cost(distance, 7, true);
            assert!(price >= previous);
            previous = price;
        }
    }
}
