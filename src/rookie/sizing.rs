//! Rookie division sizes.

use super::config::RookieConfig;

/// Splits `count` rookies into division sizes.
///
/// Below the minimum division size there are no rookie divisions. Up to
/// the maximum size everyone shares one. Otherwise the count starts at
/// `ceil(count / target)`, shrinks while divisions would fall below the
/// minimum, and grows back to `ceil(count / max)` if any division would
/// exceed the maximum. The remainder goes to the first divisions.
pub fn rookie_division_sizes(count: usize, config: &RookieConfig) -> Vec<usize> {
    let min = config.min_division_size;
    let max = config.max_division_size;
    if count < min {
        return Vec::new();
    }
    if count <= max {
        return vec![count];
    }

    let mut k = count.div_ceil(config.target_division_size);
    while k > 1 && count / k < min {
        k -= 1;
    }
    if count.div_ceil(k) > max {
        k = count.div_ceil(max);
    }

    let base = count / k;
    let extra = count % k;
    (0..k).map(|i| base + usize::from(i < extra)).collect()
}
