use crate::domains::world::Coordinate;

/// Expand the hop `a -> b` into single 8-connected steps: all diagonal steps
/// first, then the straight remainder along the dominant axis. `a` itself is
/// not included; the last element is `b`.
pub fn interpolate(a: Coordinate, b: Coordinate) -> Vec<Coordinate> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let (sx, sy) = (dx.signum(), dy.signum());
    let diagonal = dx.abs().min(dy.abs());
    let straight = dx.abs().max(dy.abs()) - diagonal;

    let mut steps = Vec::with_capacity((diagonal + straight) as usize);
    let mut cursor = a;
    for _ in 0..diagonal {
        cursor = cursor.offset(sx, sy);
        steps.push(cursor);
    }
    let (tx, ty) = if dx.abs() > dy.abs() { (sx, 0) } else { (0, sy) };
    for _ in 0..straight {
        cursor = cursor.offset(tx, ty);
        steps.push(cursor);
    }
    steps
}

/// Interpolate every consecutive pair of a sparse node route.
pub fn interpolate_route(nodes: &[Coordinate]) -> Vec<Coordinate> {
    nodes.windows(2).flat_map(|w| interpolate(w[0], w[1])).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_steps_come_first() {
        let steps = interpolate(Coordinate::new(0, 0), Coordinate::new(3, 1));
        assert_eq!(
            steps,
            vec![Coordinate::new(1, 1), Coordinate::new(2, 1), Coordinate::new(3, 1)]
        );
    }

    #[test]
    fn same_point_yields_nothing() {
        assert!(interpolate(Coordinate::new(4, 4), Coordinate::new(4, 4)).is_empty());
    }
}
