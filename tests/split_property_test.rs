use bils::domain::money::Money;
use bils::domain::split::{custom_split, even_split, parse_amount};
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn random_total(rng: &mut impl Rng) -> Decimal {
    Decimal::new(rng.gen_range(1..10_000_000), 2)
}

#[test]
fn test_even_split_never_undercharges() {
    let mut rng = rand::thread_rng();
    for _ in 0..2_000 {
        let total = random_total(&mut rng);
        let others = rng.gen_range(0..12usize);
        let split = even_split(Money::new(total), others);

        let covered = split.covered(others).value();
        assert!(covered >= total, "{total} / {others}: covered {covered}");
        // Rounding up adds less than a cent per person.
        assert!(covered - total < Decimal::new(others as i64 + 1, 2));
        assert_eq!(split.your_share.value().scale(), 2);
        assert_eq!(split.other_share.value().scale(), 2);
        if others > 0 {
            assert!(split.other_share >= split.your_share);
        }
    }
}

#[test]
fn test_custom_split_remaining_matches() {
    let mut rng = rand::thread_rng();
    for _ in 0..500 {
        let total = random_total(&mut rng);
        let entries: Vec<(usize, String)> = (0..rng.gen_range(1..6))
            .map(|i| (i, Decimal::new(rng.gen_range(0..50_000), 2).to_string()))
            .collect();

        let split = custom_split(
            Money::new(total),
            entries.iter().map(|(k, s)| (*k, s.as_str())),
        );
        let sum: Decimal = entries.iter().map(|(_, s)| parse_amount(s)).sum();
        assert_eq!(split.allocated.value(), sum);
        assert_eq!(split.remaining.value(), total - sum);
        assert!(split.allocations.iter().all(|a| a.amount.is_positive()));
    }
}

#[test]
fn test_documented_examples() {
    let split = even_split(Money::new(dec!(21.76)), 1);
    assert_eq!(split.your_share, Money::new(dec!(10.88)));
    assert_eq!(split.other_share, Money::new(dec!(10.88)));

    let split = even_split(Money::new(dec!(10.00)), 2);
    assert_eq!(split.your_share, Money::new(dec!(3.33)));
    assert_eq!(split.other_share, Money::new(dec!(3.34)));
}
