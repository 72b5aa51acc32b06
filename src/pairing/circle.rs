//! Circle-method rounds.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Seating of `n` players shuffled by `seed`.
///
/// Odd fields get a trailing phantom seat `n`, the bye.
pub fn seeded_order(n: usize, seed: u64) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);
    if n % 2 == 1 {
        order.push(n);
    }
    order
}

/// Opponent of each of the `n` players in `round`, `None` for a bye.
///
/// `order` is the seating from [`seeded_order`]. The first seat is fixed
/// and the others rotate one place per round; seat `i` of the top half
/// meets seat `i` of the reversed bottom half.
pub fn round_opponents(order: &[usize], n: usize, round: usize) -> Vec<Option<usize>> {
    let mut opponents = vec![None; n];
    let seats = order.len();
    if seats < 2 {
        return opponents;
    }

    let rest = &order[1..];
    let l = rest.len();
    let shift = l - (round % l);
    let mut seating = Vec::with_capacity(seats);
    seating.push(order[0]);
    seating.extend_from_slice(&rest[shift % l..]);
    seating.extend_from_slice(&rest[..shift % l]);

    let half = seats / 2;
    for i in 0..half {
        let a = seating[i];
        let b = seating[seats - 1 - i];
        if a < n && b < n {
            opponents[a] = Some(b);
            opponents[b] = Some(a);
        }
    }
    opponents
}
