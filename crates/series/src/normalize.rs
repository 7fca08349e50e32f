use market_core::{Candle, OhlcPoint};

use crate::dedup::{DedupPolicy, dedup_sorted};
use crate::series::Series;

/// Provider payload -> Series, keeping the first point seen at each timestamp.
pub fn normalize(points: &[OhlcPoint]) -> Series {
    normalize_with(points, DedupPolicy::FirstWins)
}

pub fn normalize_with(points: &[OhlcPoint], policy: DedupPolicy) -> Series {
    let mut candles: Vec<Candle> = points.iter().map(Candle::from_point).collect();

    // sort_by_key стабильный: порядок входа внутри одного timestamp сохраняется
    candles.sort_by_key(|c| c.time);
    dedup_sorted(&mut candles, policy);

    Series::from_sorted(candles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_core::types::{Price, TimestampSec};

    fn times(s: &Series) -> Vec<i64> {
        s.iter().map(|c| c.time.0).collect()
    }

    fn strictly_ascending(s: &Series) -> bool {
        s.as_slice().windows(2).all(|w| w[0].time < w[1].time)
    }

    #[test]
    fn converts_millis_and_maps_fields() {
        let s = normalize(&[[0.0, 10.0, 12.0, 9.0, 11.0], [60_000.0, 11.0, 13.0, 10.0, 12.0]]);

        assert_eq!(times(&s), vec![0, 60]);
        let first = s.first().unwrap();
        assert_eq!(first.open, Price(10.0));
        assert_eq!(first.high, Price(12.0));
        assert_eq!(first.low, Price(9.0));
        assert_eq!(first.close, Price(11.0));
    }

    #[test]
    fn adjacent_duplicates_keep_first_by_default() {
        let s = normalize(&[
            [0.0, 1.0, 1.0, 1.0, 1.0],
            [60_000.0, 2.0, 2.0, 2.0, 2.0],
            [60_000.0, 3.0, 3.0, 3.0, 3.0],
        ]);
        assert_eq!(times(&s), vec![0, 60]);
        assert_eq!(s.last().unwrap().close, Price(2.0));
    }

    #[test]
    fn last_wins_policy_is_selectable() {
        let s = normalize_with(
            &[[60_000.0, 2.0, 2.0, 2.0, 2.0], [60_000.0, 3.0, 3.0, 3.0, 3.0]],
            DedupPolicy::LastWins,
        );
        assert_eq!(s.len(), 1);
        assert_eq!(s.last().unwrap().close, Price(3.0));
    }

    #[test]
    fn sub_second_points_collapse_into_one_second() {
        // 0ms и 500ms попадают в одну секунду
        let s = normalize(&[[0.0, 1.0, 1.0, 1.0, 1.0], [500.0, 2.0, 2.0, 2.0, 2.0]]);
        assert_eq!(times(&s), vec![0]);
        assert_eq!(s.first().unwrap().close, Price(1.0));
    }

    #[test]
    fn any_permutation_is_ascending_and_unique() {
        let base: Vec<OhlcPoint> = vec![
            [0.0, 1.0, 1.0, 1.0, 1.0],
            [60_000.0, 2.0, 2.0, 2.0, 2.0],
            [60_000.0, 2.5, 2.5, 2.5, 2.5],
            [120_000.0, 3.0, 3.0, 3.0, 3.0],
            [180_000.0, 4.0, 4.0, 4.0, 4.0],
        ];

        // все перестановки 5 элементов
        let mut idx = [0usize, 1, 2, 3, 4];
        let mut seen = 0;
        permute(&mut idx, 0, &mut |perm: &[usize; 5]| {
            let input: Vec<OhlcPoint> = perm.iter().map(|&i| base[i]).collect();
            let s = normalize(&input);
            assert!(strictly_ascending(&s));
            assert_eq!(times(&s), vec![0, 60, 120, 180]);

            // first-wins: выживает та точка с t=60, что раньше во входе
            let expected = if perm.iter().position(|&i| i == 1) < perm.iter().position(|&i| i == 2) {
                2.0
            } else {
                2.5
            };
            assert_eq!(s.as_slice()[1].close, Price(expected));
            seen += 1;
        });
        assert_eq!(seen, 120);
    }

    #[test]
    fn empty_input_gives_empty_series() {
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn output_round_trips_through_checked_constructor() {
        let s = normalize(&[[120_000.0, 1.0, 1.0, 1.0, 1.0], [0.0, 1.0, 1.0, 1.0, 1.0]]);
        let again = Series::try_from_vec(s.as_slice().to_vec()).unwrap();
        assert_eq!(again.first().unwrap().time, TimestampSec(0));
    }

    fn permute(v: &mut [usize; 5], k: usize, f: &mut impl FnMut(&[usize; 5])) {
        if k == v.len() {
            f(&*v);
            return;
        }
        for i in k..v.len() {
            v.swap(k, i);
            permute(v, k + 1, f);
            v.swap(k, i);
        }
    }
}
