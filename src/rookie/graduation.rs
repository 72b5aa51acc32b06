//! Graduation out of rookie divisions.

use uuid::Uuid;

/// Splits `count` graduating rookies into rank-ordered groups.
///
/// Group size is `ceil(count / divisor)` and the group count is
/// `ceil(count / group_size)`; the remainder goes to the first groups.
pub fn graduation_group_sizes(count: usize, divisor: usize) -> Vec<usize> {
    if count == 0 || divisor == 0 {
        return Vec::new();
    }
    let group_size = count.div_ceil(divisor);
    let groups = count.div_ceil(group_size);
    let base = count / groups;
    let extra = count % groups;
    (0..groups).map(|i| base + usize::from(i < extra)).collect()
}

/// Target regular division for each rookie, given in final rank order.
///
/// With one regular division (or none) every graduate targets division 1.
/// Otherwise groups target consecutive divisions ending at the lowest one,
/// `lowest - groups + 1` onward, never above division 2 and never below the
/// lowest division.
pub fn graduation_targets(ranked: &[Uuid], lowest_regular: u32, divisor: usize) -> Vec<(Uuid, u32)> {
    if lowest_regular <= 1 {
        return ranked.iter().map(|&id| (id, 1)).collect();
    }
    let sizes = graduation_group_sizes(ranked.len(), divisor);
    let groups = sizes.len() as i64;
    let start = (lowest_regular as i64 - groups + 1).max(2) as u32;

    let mut out = Vec::with_capacity(ranked.len());
    let mut idx = 0;
    for (g, size) in sizes.iter().enumerate() {
        let target = (start + g as u32).min(lowest_regular);
        for &id in &ranked[idx..idx + size] {
            out.push((id, target));
        }
        idx += size;
    }
    out
}
