/// Distance below which the offset snaps onto its target.
const SNAP_EPSILON: f64 = 1e-4;

/// Circular scroll position of the wheel. Chases the selected index a fixed
/// fraction of the remaining distance per frame, always the short way round.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollAnimator {
    offset: f64,
    smoothing: f64,
}

impl ScrollAnimator {
    pub fn new(smoothing: f64) -> Self {
        Self {
            offset: 0.0,
            smoothing: smoothing.clamp(0.01, 1.0),
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn set_smoothing(&mut self, smoothing: f64) {
        self.smoothing = smoothing.clamp(0.01, 1.0);
    }

    /// Jumps straight to `selected`. Used when the item list is swapped.
    pub fn reset(&mut self, selected: usize) {
        self.offset = selected as f64;
    }

    /// Advances one frame toward `target` on a ring of `count` items. Returns
    /// whether the offset is still moving.
    pub fn update(&mut self, target: usize, count: usize) -> bool {
        if count == 0 {
            self.offset = 0.0;
            return false;
        }
        let n = count as f64;
        let t = target.min(count - 1) as f64;

        let d = t - self.offset;
        let effective = if d > n / 2.0 {
            t - n
        } else if d < -n / 2.0 {
            t + n
        } else {
            t
        };

        let remaining = effective - self.offset;
        let moving = remaining.abs() > SNAP_EPSILON;
        self.offset = if moving {
            self.offset + remaining * self.smoothing
        } else {
            effective
        };

        self.offset = self.offset.rem_euclid(n);
        // rem_euclid can round up to n for tiny negative inputs
        if self.offset >= n {
            self.offset = 0.0;
        }
        moving
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ring_distance(a: f64, b: f64, n: f64) -> f64 {
        let d = (a - b).rem_euclid(n);
        d.min(n - d)
    }

    #[test]
    fn test_wraps_through_shortest_path() {
        let mut animator = ScrollAnimator::new(0.15);
        animator.reset(16);
        animator.update(0, 17);
        // moved forward past the end instead of back through the middle
        let offset = animator.offset();
        assert!(offset > 16.0 && offset < 17.0, "offset {offset}");
        assert!((offset - 16.15).abs() < 1e-9);
    }

    #[test]
    fn test_settles_exactly_on_target() {
        let mut animator = ScrollAnimator::new(0.15);
        let mut frames = 0;
        while animator.update(5, 9) {
            frames += 1;
            assert!(frames < 1000);
        }
        assert_eq!(animator.offset(), 5.0);
        assert!(!animator.update(5, 9));
        assert_eq!(animator.offset(), 5.0);
    }

    #[test]
    fn test_empty_and_single_lists() {
        let mut animator = ScrollAnimator::new(0.15);
        animator.reset(3);
        assert!(!animator.update(0, 0));
        assert_eq!(animator.offset(), 0.0);

        animator.update(0, 1);
        assert_eq!(animator.offset(), 0.0);
    }

    #[test]
    fn test_stale_target_is_clamped() {
        let mut animator = ScrollAnimator::new(1.0);
        animator.update(40, 4);
        assert_eq!(animator.offset(), 3.0);
    }

    proptest! {
        #[test]
        fn prop_offset_stays_normalized(
            count in 1usize..64,
            start in 0usize..64,
            targets in prop::collection::vec(0usize..64, 1..40),
        ) {
            let mut animator = ScrollAnimator::new(0.15);
            animator.reset(start % count);
            for target in targets {
                animator.update(target % count, count);
                let offset = animator.offset();
                prop_assert!((0.0..count as f64).contains(&offset), "offset {} of {}", offset, count);
            }
        }

        #[test]
        fn prop_converges_monotonically(count in 2usize..64, start in 0usize..64, target in 0usize..64) {
            let n = count as f64;
            let target = target % count;
            let mut animator = ScrollAnimator::new(0.15);
            animator.reset(start % count);

            let mut previous = ring_distance(animator.offset(), target as f64, n);
            for _ in 0..400 {
                animator.update(target, count);
                let distance = ring_distance(animator.offset(), target as f64, n);
                prop_assert!(distance <= previous + 1e-9);
                previous = distance;
            }
            prop_assert_eq!(animator.offset(), target as f64);
        }

        #[test]
        fn prop_first_step_takes_short_way(count in 3usize..64, start in 0usize..64, target in 0usize..64) {
            let n = count as f64;
            let (start, target) = (start % count, target % count);
            let mut animator = ScrollAnimator::new(0.15);
            animator.reset(start);

            let before = ring_distance(start as f64, target as f64, n);
            animator.update(target, count);
            let after = ring_distance(animator.offset(), target as f64, n);
            prop_assert!((after - before * 0.85).abs() < 1e-6 || after == 0.0);
        }
    }
}
