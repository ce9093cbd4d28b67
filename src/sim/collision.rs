//! Continuous collision detection between the ball and axis-aligned blocks
//!
//! The tricky part of the engine: the ball can travel further than a block is
//! thick in one frame, so instead of testing overlap we sweep the ball's
//! centre along its travel segment and look for the earliest point where it
//! comes within one radius of a block.
//!
//! A block is tested as four border segments pushed out by the radius
//! (left, top, right, bottom) and, only if none of those fire, as four corner
//! circles (top-left, top-right, bottom-left, bottom-right). The first
//! candidate in that order that beats the best fraction found so far wins.

use glam::DVec2;

use super::state::{Ball, Bounds, ObstacleId};
use crate::consts::CORNER_START_EPSILON;

/// A single collision: which obstacle, the contact normal, and how far along
/// the travel segment (0..=1) it happens
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub obstacle: ObstacleId,
    /// Unit axis vector for edges; corner-to-ball vector over the radius for
    /// corners (length close to, but not exactly, 1)
    pub normal: DVec2,
    pub time_fraction: f64,
}

/// The nearest pending collision of one detection pass over all obstacles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionRecord {
    hit: Option<Contact>,
}

impl CollisionRecord {
    /// A fresh record: no collision, whole travel segment still available
    pub fn new() -> Self {
        Self { hit: None }
    }

    pub fn did_collide(&self) -> bool {
        self.hit.is_some()
    }

    /// True only while the goal holds the earliest collision. A later
    /// obstacle that records an earlier hit clears this.
    pub fn is_goal(&self) -> bool {
        self.hit.is_some_and(|c| c.obstacle.is_goal())
    }

    pub fn hit(&self) -> Option<&Contact> {
        self.hit.as_ref()
    }

    /// Fraction of the travel segment at which the recorded collision
    /// happens, or 1.0 when nothing has been recorded
    pub fn time_fraction(&self) -> f64 {
        self.hit.map_or(1.0, |c| c.time_fraction)
    }

    /// Edges accept a hit exactly at the end of the segment while nothing is
    /// recorded; afterwards a strictly earlier hit is required so that the
    /// obstacle checked first keeps a tie.
    fn accepts_edge(&self, t: f64) -> bool {
        match self.hit {
            None => t <= 1.0,
            Some(best) => t < best.time_fraction,
        }
    }

    fn accepts_corner(&self, t: f64) -> bool {
        t < self.time_fraction()
    }

    fn record(&mut self, contact: Contact) {
        self.hit = Some(contact);
    }
}

/// Block border tested as a segment one radius outside the block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Top,
    Right,
    Bottom,
}

impl Edge {
    pub const ORDER: [Edge; 4] = [Edge::Left, Edge::Top, Edge::Right, Edge::Bottom];

    pub fn normal(self) -> DVec2 {
        match self {
            Edge::Left => DVec2::new(-1.0, 0.0),
            Edge::Top => DVec2::new(0.0, -1.0),
            Edge::Right => DVec2::new(1.0, 0.0),
            Edge::Bottom => DVec2::new(0.0, 1.0),
        }
    }

    /// Border segment: pushed out along its normal, spanning the block's
    /// unexpanded extent along the other axis
    fn segment(self, block: &Bounds, border: &Bounds) -> (DVec2, DVec2) {
        match self {
            Edge::Left => (
                DVec2::new(border.x_min, block.y_min),
                DVec2::new(border.x_min, block.y_max),
            ),
            Edge::Top => (
                DVec2::new(block.x_min, border.y_min),
                DVec2::new(block.x_max, border.y_min),
            ),
            Edge::Right => (
                DVec2::new(border.x_max, block.y_min),
                DVec2::new(border.x_max, block.y_max),
            ),
            Edge::Bottom => (
                DVec2::new(block.x_min, border.y_max),
                DVec2::new(block.x_max, border.y_max),
            ),
        }
    }

    /// Fraction of `travel` needed to reach the border line, provided the
    /// ball starts strictly outside it. Touching or inside never counts.
    fn time_to_reach(self, start: DVec2, travel: DVec2, border: &Bounds) -> Option<f64> {
        let (outside, distance, speed) = match self {
            Edge::Left => (start.x < border.x_min, border.x_min - start.x, travel.x),
            Edge::Top => (start.y < border.y_min, border.y_min - start.y, travel.y),
            Edge::Right => (start.x > border.x_max, border.x_max - start.x, travel.x),
            Edge::Bottom => (start.y > border.y_max, border.y_max - start.y, travel.y),
        };
        if !outside || speed == 0.0 {
            return None;
        }
        let t = distance / speed;
        t.is_finite().then_some(t)
    }
}

/// Block corner tested as a circle of the ball's radius
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ORDER: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    fn point(self, block: &Bounds) -> DVec2 {
        match self {
            Corner::TopLeft => DVec2::new(block.x_min, block.y_min),
            Corner::TopRight => DVec2::new(block.x_max, block.y_min),
            Corner::BottomLeft => DVec2::new(block.x_min, block.y_max),
            Corner::BottomRight => DVec2::new(block.x_max, block.y_max),
        }
    }

    /// The ball must start beyond the corner on both axes
    fn is_beyond(self, start: DVec2, block: &Bounds) -> bool {
        match self {
            Corner::TopLeft => start.x < block.x_min && start.y < block.y_min,
            Corner::TopRight => start.x > block.x_max && start.y < block.y_min,
            Corner::BottomLeft => start.x < block.x_min && start.y > block.y_max,
            Corner::BottomRight => start.x > block.x_max && start.y > block.y_max,
        }
    }
}

/// Whether the travel segment can reach the radius-expanded bounds at all.
///
/// Rejects only when start and end are both strictly beyond the same side.
pub fn collision_possible(start: DVec2, end: DVec2, border: &Bounds) -> bool {
    !((start.x < border.x_min && end.x < border.x_min)
        || (start.x > border.x_max && end.x > border.x_max)
        || (start.y < border.y_min && end.y < border.y_min)
        || (start.y > border.y_max && end.y > border.y_max))
}

/// Check whether segments p1-p2 and p3-p4 cross
///
/// Parallel segments only count when they are collinear.
pub fn lines_cross(p1: DVec2, p2: DVec2, p3: DVec2, p4: DVec2) -> bool {
    let denom = (p4.y - p3.y) * (p2.x - p1.x) - (p4.x - p3.x) * (p2.y - p1.y);
    let numer_a = (p4.x - p3.x) * (p1.y - p3.y) - (p4.y - p3.y) * (p1.x - p3.x);
    let numer_b = (p2.x - p1.x) * (p1.y - p3.y) - (p2.y - p1.y) * (p1.x - p3.x);

    if denom == 0.0 {
        return numer_a == 0.0 && numer_b == 0.0;
    }

    let ua = numer_a / denom;
    let ub = numer_b / denom;
    (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub)
}

/// Earliest point along p1-p2 that comes within `radius` of `corner`
///
/// Solves |p1 + t(p2 - p1) - corner| = radius for t. Roots at or before
/// `CORNER_START_EPSILON` are ignored so a corner the ball has just left
/// does not fire again. A zero-length segment never collides.
pub fn line_corner_collide(p1: DVec2, p2: DVec2, corner: DVec2, radius: f64) -> Option<f64> {
    let d = p2 - p1;
    let f = p1 - corner;

    let a = d.length_squared();
    if a == 0.0 || !a.is_finite() {
        return None;
    }
    let b = 2.0 * f.dot(d);
    let c = f.length_squared() - radius * radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant.is_nan() || discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let t1 = (-b + root) / (2.0 * a);
    let t2 = (-b - root) / (2.0 * a);
    let valid = |t: f64| t > CORNER_START_EPSILON && t <= 1.0;

    match (valid(t1), valid(t2)) {
        (true, true) => Some(t1.min(t2)),
        (true, false) => Some(t1),
        (false, true) => Some(t2),
        (false, false) => None,
    }
}

/// Test one obstacle against the ball's travel for `portion` of a frame and
/// record it in `record` if it collides earlier than anything seen so far.
///
/// Returns whether this obstacle replaced the record.
pub fn detect(
    ball: &Ball,
    portion: f64,
    obstacle: ObstacleId,
    bounds: &Bounds,
    record: &mut CollisionRecord,
) -> bool {
    let start = ball.center();
    let travel = ball.vel * portion;
    let end = start + travel;
    let border = bounds.expanded(ball.radius);

    if !collision_possible(start, end, &border) {
        return false;
    }

    let edge_hit = Edge::ORDER.iter().find_map(|&edge| {
        let (a, b) = edge.segment(bounds, &border);
        if !lines_cross(start, end, a, b) {
            return None;
        }
        let t = edge.time_to_reach(start, travel, &border)?;
        record.accepts_edge(t).then(|| Contact {
            obstacle,
            normal: edge.normal(),
            time_fraction: t,
        })
    });

    let hit = edge_hit.or_else(|| {
        Corner::ORDER.iter().find_map(|&corner| {
            if !corner.is_beyond(start, bounds) {
                return None;
            }
            let point = corner.point(bounds);
            let t = line_corner_collide(start, end, point, ball.radius)?;
            if !record.accepts_corner(t) {
                return None;
            }
            let normal = (start + travel * t - point) / ball.radius;
            normal.is_finite().then_some(Contact {
                obstacle,
                normal,
                time_fraction: t,
            })
        })
    });

    match hit {
        Some(contact) => {
            record.record(contact);
            true
        }
        None => false,
    }
}
