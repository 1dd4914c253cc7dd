//! Axis-aligned boxes and the overlap tests everything else is built on
//!
//! Screen coordinates throughout: x grows to the right, y grows downward, and
//! a box's position is its top-left corner. "Up" therefore means negative y.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// 8-way compass direction in screen space (north is up)
///
/// When returned from [`Aabb::direction_of_overlap`] it names the side of the
/// obstacle the mover came from: `West` means the mover travelled east into
/// the obstacle's west face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub fn is_diagonal(self) -> bool {
        matches!(
            self,
            Direction::NorthEast
                | Direction::SouthEast
                | Direction::SouthWest
                | Direction::NorthWest
        )
    }

    /// Collapse a diagonal onto one of its neighbouring cardinals
    ///
    /// `clockwise` picks the cardinal just before the diagonal in clockwise
    /// order (NW -> W), otherwise the one just after (NW -> N). Cardinals are
    /// returned unchanged.
    pub fn collapse(self, clockwise: bool) -> Self {
        use Direction::*;
        match (self, clockwise) {
            (NorthWest, true) => West,
            (NorthWest, false) => North,
            (NorthEast, true) => North,
            (NorthEast, false) => East,
            (SouthEast, true) => East,
            (SouthEast, false) => South,
            (SouthWest, true) => South,
            (SouthWest, false) => West,
            (cardinal, _) => cardinal,
        }
    }

    /// Combine a horizontal and a vertical cardinal into a diagonal
    fn corner(horizontal: Direction, vertical: Direction) -> Self {
        match (horizontal, vertical) {
            (Direction::West, Direction::North) => Direction::NorthWest,
            (Direction::East, Direction::North) => Direction::NorthEast,
            (Direction::East, Direction::South) => Direction::SouthEast,
            _ => Direction::SouthWest,
        }
    }

    /// Closest 8-way direction a movement vector points toward
    ///
    /// Returns `None` for a zero vector.
    pub fn from_vector(v: Vec2) -> Option<Self> {
        if v == Vec2::ZERO {
            return None;
        }
        // Octant of the angle; y is flipped so that north is up on screen
        let angle = (-v.y).atan2(v.x);
        let octant = (angle / std::f32::consts::FRAC_PI_4).round() as i32;
        Some(match octant.rem_euclid(8) {
            0 => Direction::East,
            1 => Direction::NorthEast,
            2 => Direction::North,
            3 => Direction::NorthWest,
            4 => Direction::West,
            5 => Direction::SouthWest,
            6 => Direction::South,
            _ => Direction::SouthEast,
        })
    }
}

/// Overlaps up to this length (pixels) count as touching
///
/// Snapping a box flush against a face computes `face - size`, and adding
/// the size back can land a few ulps past the face.
pub const OVERLAP_EPSILON: f32 = 1e-3;

/// Length of the intersection of the intervals `[a_start, a_start + a_len]`
/// and `[b_start, b_start + b_len]`
///
/// Touching intervals share no length and return 0, as do intersections no
/// longer than [`OVERLAP_EPSILON`].
pub fn overlap_extent(a_start: f32, a_len: f32, b_start: f32, b_len: f32) -> f32 {
    let extent = raw_overlap_extent(a_start, a_len, b_start, b_len);
    if extent <= OVERLAP_EPSILON { 0.0 } else { extent }
}

fn raw_overlap_extent(a_start: f32, a_len: f32, b_start: f32, b_len: f32) -> f32 {
    let a_end = a_start + a_len;
    let b_end = b_start + b_len;

    if a_start <= b_start && a_end >= b_end {
        // a contains b
        b_len
    } else if a_start >= b_start && a_end <= b_end {
        // a contained in b
        a_len
    } else if a_start < b_start && a_end > b_start {
        // a overlaps b's left end
        a_end - b_start
    } else if a_start < b_end && a_end > b_end {
        // a overlaps b's right end
        b_end - a_start
    } else {
        0.0
    }
}

/// An axis-aligned bounding box, the only collision primitive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Top-left corner
    pub pos: Vec2,
    /// Width and height, both strictly positive
    pub size: Vec2,
}

impl Aabb {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        debug_assert!(width > 0.0 && height > 0.0, "box size must be positive");
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.y
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn bottom_right(&self) -> Vec2 {
        self.pos + self.size
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    pub fn area(&self) -> f32 {
        self.size.x * self.size.y
    }

    /// Copy of this box moved to `pos`
    pub fn at(&self, pos: Vec2) -> Self {
        Self {
            pos,
            size: self.size,
        }
    }

    /// Horizontal overlap length with `other`
    pub fn overlap_x(&self, other: &Aabb) -> f32 {
        overlap_extent(self.pos.x, self.size.x, other.pos.x, other.size.x)
    }

    /// Vertical overlap length with `other`
    pub fn overlap_y(&self, other: &Aabb) -> f32 {
        overlap_extent(self.pos.y, self.size.y, other.pos.y, other.size.y)
    }

    /// Overlap test with an optional coverage threshold
    ///
    /// With `min_ratio == 0` any positive covered area counts. Otherwise the
    /// covered area must reach `min_ratio` of `other`'s area.
    pub fn overlap(&self, other: &Aabb, min_ratio: f32) -> bool {
        let covered = self.overlap_x(other) * self.overlap_y(other);
        if min_ratio <= 0.0 {
            covered > 0.0
        } else {
            covered >= min_ratio * other.area()
        }
    }

    /// Shorthand for `overlap(other, 0.0)`
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.overlap(other, 0.0)
    }

    /// Point-inside test, edges inclusive
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.pos.x
            && point.x <= self.right()
            && point.y >= self.pos.y
            && point.y <= self.bottom()
    }

    /// Whether `other` lies fully inside this box, edges inclusive
    pub fn contains(&self, other: &Aabb) -> bool {
        self.contains_point(other.pos) && self.contains_point(other.bottom_right())
    }

    /// Same-center copy scaled by `ratio` on both axes
    ///
    /// Used for reach, blast and aggro volumes.
    pub fn resize_by_ratio(&self, ratio: f32) -> Self {
        let size = self.size * ratio;
        Self {
            pos: self.center() - size / 2.0,
            size,
        }
    }

    /// Snap a moving box against this obstacle
    ///
    /// `candidate` is the mover at its proposed position, `before` the same
    /// mover where it started this step. Returns `None` when the candidate
    /// does not overlap `self`. Otherwise each axis whose overlap is new this
    /// step (no overlap on that axis at `before`) and that has a direction
    /// hint is snapped flush against the near face; the other axis keeps the
    /// candidate's coordinate.
    pub fn check_overlap_and_adjust(
        &self,
        candidate: &Aabb,
        before: &Aabb,
        going_left: Option<bool>,
        going_up: Option<bool>,
    ) -> Option<Vec2> {
        if !self.intersects(candidate) {
            return None;
        }

        let mut adjusted = candidate.pos;

        if let Some(left) = going_left
            && self.overlap_x(before) == 0.0
        {
            adjusted.x = if left {
                self.right()
            } else {
                self.pos.x - candidate.width()
            };
        }

        if let Some(up) = going_up
            && self.overlap_y(before) == 0.0
        {
            adjusted.y = if up {
                self.bottom()
            } else {
                self.pos.y - candidate.height()
            };
        }

        Some(adjusted)
    }

    /// Classify which side of this box `mover_before` hit when moved to
    /// `position_to_check`
    ///
    /// Returns `None` if there is no overlap at the checked position.
    pub fn direction_of_overlap(
        &self,
        mover_before: &Aabb,
        position_to_check: Vec2,
    ) -> Option<Direction> {
        let moved = mover_before.at(position_to_check);
        if !self.intersects(&moved) {
            return None;
        }

        let delta = position_to_check - mover_before.pos;
        let horizontal = if delta.x > 0.0 {
            Direction::West
        } else if delta.x < 0.0 {
            Direction::East
        } else if moved.center().x <= self.center().x {
            Direction::West
        } else {
            Direction::East
        };
        let vertical = if delta.y > 0.0 {
            Direction::North
        } else if delta.y < 0.0 {
            Direction::South
        } else if moved.center().y <= self.center().y {
            Direction::North
        } else {
            Direction::South
        };

        let old_x = self.overlap_x(mover_before);
        let old_y = self.overlap_y(mover_before);

        let direction = match (old_x == 0.0, old_y == 0.0) {
            (true, true) => Direction::corner(horizontal, vertical),
            (true, false) => horizontal,
            (false, true) => vertical,
            (false, false) => {
                // The axis with the larger new overlap arrived second
                let new_x = self.overlap_x(&moved);
                let new_y = self.overlap_y(&moved);
                if new_x > new_y {
                    horizontal
                } else if new_y > new_x {
                    vertical
                } else {
                    Direction::corner(horizontal, vertical)
                }
            }
        };
        Some(direction)
    }

    /// Whether moving this box's position to `next` passes over `waypoint`
    ///
    /// Both axes must bracket the waypoint, bounds inclusive, in either
    /// direction of travel.
    pub fn point_is_crossed(&self, waypoint: Vec2, next: Vec2) -> bool {
        let brackets =
            |from: f32, to: f32, target: f32| from.min(to) <= target && target <= from.max(to);
        brackets(self.pos.x, next.x, waypoint.x) && brackets(self.pos.y, next.y, waypoint.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_overlap_extent_relationships() {
        // contains
        assert_eq!(overlap_extent(0.0, 10.0, 2.0, 3.0), 3.0);
        // contained
        assert_eq!(overlap_extent(2.0, 3.0, 0.0, 10.0), 3.0);
        // overlaps left end
        assert_eq!(overlap_extent(0.0, 10.0, 6.0, 10.0), 4.0);
        // overlaps right end
        assert_eq!(overlap_extent(6.0, 10.0, 0.0, 10.0), 4.0);
        // disjoint and touching
        assert_eq!(overlap_extent(0.0, 5.0, 8.0, 5.0), 0.0);
        assert_eq!(overlap_extent(0.0, 5.0, 5.0, 5.0), 0.0);
    }

    #[test]
    fn test_touching_boxes_do_not_overlap() {
        let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
        let b = Aabb::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&Aabb::new(9.0, 9.0, 10.0, 10.0)));
    }

    #[test]
    fn test_flush_snap_rounding_is_touching() {
        // In f32, (100.1 - 16.3) + 16.3 lands a few ulps past 100.1
        let wall = Aabb::new(100.1, 0.0, 20.0, 400.0);
        let flush = Aabb::new(wall.x() - 16.3, 100.0, 16.3, 16.3);
        assert!(flush.right() > wall.x());
        assert_eq!(wall.overlap_x(&flush), 0.0);
        assert!(!wall.intersects(&flush));
        assert_eq!(overlap_extent(0.0, 10.0, 9.5, 10.0), 0.5);
    }

    #[test]
    fn test_overlap_ratio_threshold() {
        let wall = Aabb::new(0.0, 0.0, 100.0, 100.0);
        // Covers a quarter of the mover
        let mover = Aabb::new(90.0, 0.0, 40.0, 10.0);
        assert!(wall.overlap(&mover, 0.25));
        assert!(!wall.overlap(&mover, 0.26));
    }

    #[test]
    fn test_resize_keeps_center() {
        let b = Aabb::new(10.0, 20.0, 40.0, 20.0);
        let big = b.resize_by_ratio(2.0);
        assert_eq!(big.center(), b.center());
        assert_eq!(big.size, Vec2::new(80.0, 40.0));
        assert_eq!(big.pos, Vec2::new(-10.0, 10.0));
        // Original untouched
        assert_eq!(b.pos, Vec2::new(10.0, 20.0));
    }

    #[test]
    fn test_contains() {
        let bounds = Aabb::new(0.0, 0.0, 100.0, 100.0);
        assert!(bounds.contains(&Aabb::new(0.0, 0.0, 100.0, 100.0)));
        assert!(bounds.contains(&Aabb::new(60.0, 60.0, 40.0, 40.0)));
        assert!(!bounds.contains(&Aabb::new(61.0, 60.0, 40.0, 40.0)));
        assert!(bounds.contains_point(Vec2::new(100.0, 0.0)));
        assert!(!bounds.contains_point(Vec2::new(100.1, 0.0)));
    }

    #[test]
    fn test_adjust_snaps_new_horizontal_overlap() {
        let wall = Aabb::new(150.0, 90.0, 20.0, 40.0);
        let before = Aabb::new(100.0, 100.0, 40.0, 40.0);
        let candidate = before.at(Vec2::new(135.0, 100.0));

        let adjusted = wall.check_overlap_and_adjust(&candidate, &before, Some(false), None);
        assert_eq!(adjusted, Some(Vec2::new(110.0, 100.0)));
    }

    #[test]
    fn test_adjust_moving_left_and_up() {
        let wall = Aabb::new(0.0, 0.0, 50.0, 50.0);
        // Approaches the bottom-right corner diagonally
        let before = Aabb::new(60.0, 60.0, 10.0, 10.0);
        let candidate = before.at(Vec2::new(45.0, 45.0));

        let adjusted = wall.check_overlap_and_adjust(&candidate, &before, Some(true), Some(true));
        assert_eq!(adjusted, Some(Vec2::new(50.0, 50.0)));
    }

    #[test]
    fn test_adjust_defers_axis_that_already_overlapped() {
        let wall = Aabb::new(0.0, 0.0, 50.0, 50.0);
        // Sliding down along the wall's right face, already overlapping vertically
        let before = Aabb::new(55.0, 10.0, 10.0, 10.0);
        let candidate = before.at(Vec2::new(45.0, 15.0));

        let adjusted = wall.check_overlap_and_adjust(&candidate, &before, Some(true), Some(false));
        assert_eq!(adjusted, Some(Vec2::new(50.0, 15.0)));
    }

    #[test]
    fn test_adjust_without_hint_keeps_candidate() {
        let wall = Aabb::new(0.0, 0.0, 50.0, 50.0);
        let before = Aabb::new(60.0, 10.0, 10.0, 10.0);
        let candidate = before.at(Vec2::new(45.0, 10.0));

        let adjusted = wall.check_overlap_and_adjust(&candidate, &before, None, None);
        assert_eq!(adjusted, Some(candidate.pos));
    }

    #[test]
    fn test_corner_hit_is_diagonal() {
        let obstacle = Aabb::new(100.0, 100.0, 50.0, 50.0);
        // Mover sits diagonally off the top-left corner, no overlap on either axis
        let before = Aabb::new(80.0, 80.0, 20.0, 20.0);
        let dir = obstacle.direction_of_overlap(&before, Vec2::new(85.0, 85.0));
        assert_eq!(dir, Some(Direction::NorthWest));
        assert!(dir.is_some_and(Direction::is_diagonal));

        // And from the bottom-right
        let before = Aabb::new(150.0, 150.0, 20.0, 20.0);
        let dir = obstacle.direction_of_overlap(&before, Vec2::new(145.0, 145.0));
        assert_eq!(dir, Some(Direction::SouthEast));
    }

    #[test]
    fn test_direction_single_new_axis() {
        let obstacle = Aabb::new(100.0, 100.0, 50.0, 50.0);
        // Already level with the obstacle vertically, moving right
        let before = Aabb::new(70.0, 110.0, 20.0, 20.0);
        assert_eq!(
            obstacle.direction_of_overlap(&before, Vec2::new(85.0, 110.0)),
            Some(Direction::West)
        );
        // Already level horizontally, moving up into the bottom face
        let before = Aabb::new(110.0, 160.0, 20.0, 20.0);
        assert_eq!(
            obstacle.direction_of_overlap(&before, Vec2::new(110.0, 145.0)),
            Some(Direction::South)
        );
    }

    #[test]
    fn test_direction_compares_new_extents_when_already_overlapping() {
        let obstacle = Aabb::new(100.0, 100.0, 50.0, 50.0);
        // Overlaps on both axes before: deep horizontally, shallow vertically
        let before = Aabb::new(110.0, 95.0, 20.0, 20.0);
        let dir = obstacle.direction_of_overlap(&before, Vec2::new(111.0, 96.0));
        assert_eq!(dir, Some(Direction::West));

        // Equal new extents fall back to the corner
        let before = Aabb::new(92.0, 92.0, 20.0, 20.0);
        let dir = obstacle.direction_of_overlap(&before, Vec2::new(95.0, 95.0));
        assert_eq!(dir, Some(Direction::NorthWest));
    }

    #[test]
    fn test_direction_none_without_overlap() {
        let obstacle = Aabb::new(100.0, 100.0, 50.0, 50.0);
        let before = Aabb::new(0.0, 0.0, 20.0, 20.0);
        assert_eq!(obstacle.direction_of_overlap(&before, Vec2::new(10.0, 10.0)), None);
    }

    #[test]
    fn test_collapse_diagonals() {
        assert_eq!(Direction::NorthWest.collapse(true), Direction::West);
        assert_eq!(Direction::NorthWest.collapse(false), Direction::North);
        assert_eq!(Direction::SouthEast.collapse(true), Direction::East);
        assert_eq!(Direction::SouthWest.collapse(false), Direction::West);
        assert_eq!(Direction::South.collapse(true), Direction::South);
    }

    #[test]
    fn test_from_vector() {
        assert_eq!(Direction::from_vector(Vec2::new(1.0, 0.0)), Some(Direction::East));
        assert_eq!(Direction::from_vector(Vec2::new(0.0, -1.0)), Some(Direction::North));
        assert_eq!(Direction::from_vector(Vec2::new(-1.0, 1.0)), Some(Direction::SouthWest));
        assert_eq!(Direction::from_vector(Vec2::ZERO), None);
    }

    #[test]
    fn test_point_is_crossed_either_direction() {
        let b = Aabb::new(0.0, 0.0, 10.0, 10.0);
        assert!(b.point_is_crossed(Vec2::new(5.0, 0.0), Vec2::new(10.0, 0.0)));
        assert!(b.point_is_crossed(Vec2::new(10.0, 0.0), Vec2::new(10.0, 0.0)));
        assert!(!b.point_is_crossed(Vec2::new(15.0, 0.0), Vec2::new(10.0, 0.0)));
        // Moving back toward the origin
        let b = b.at(Vec2::new(20.0, 20.0));
        assert!(b.point_is_crossed(Vec2::new(15.0, 15.0), Vec2::new(10.0, 10.0)));
        assert!(!b.point_is_crossed(Vec2::new(15.0, 25.0), Vec2::new(10.0, 10.0)));
    }

    fn arb_box() -> impl Strategy<Value = Aabb> {
        (0f32..400.0, 0f32..400.0, 1f32..120.0, 1f32..120.0)
            .prop_map(|(x, y, w, h)| Aabb::new(x, y, w, h))
    }

    proptest! {
        #[test]
        fn overlap_is_symmetric(a in arb_box(), b in arb_box()) {
            prop_assert_eq!(a.intersects(&b), b.intersects(&a));
        }

        #[test]
        fn overlap_ratio_is_monotonic(
            a in arb_box(),
            b in arb_box(),
            r1 in 0f32..1.0,
            r2 in 0f32..1.0,
        ) {
            let (low, high) = if r1 < r2 { (r1, r2) } else { (r2, r1) };
            if a.overlap(&b, high) {
                prop_assert!(a.overlap(&b, low));
            }
        }

        #[test]
        fn adjust_passes_through_without_overlap(
            wall in arb_box(),
            before in arb_box(),
            to in (0f32..400.0, 0f32..400.0),
            left in proptest::option::of(any::<bool>()),
            up in proptest::option::of(any::<bool>()),
        ) {
            let candidate = before.at(Vec2::new(to.0, to.1));
            if !wall.intersects(&candidate) {
                let adjusted = wall.check_overlap_and_adjust(&candidate, &before, left, up);
                prop_assert!(adjusted.is_none());
            }
        }
    }
}
