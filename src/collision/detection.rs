//! Narrowphase collision routines.
//!
//! One pure function per shape-kind pair, producing a [`Contact`] or `None`.
//! [`collide`] is the jump table: it dispatches on the ordered pair of shape
//! kinds, swapping arguments and flipping the contact for the symmetric
//! cases. The match is exhaustive, so an unhandled shape pairing cannot
//! exist at runtime.

use crate::collision::contact::Contact;
use crate::math::ray::Projection;
use crate::math::vec2::Vec2;
use crate::objects::body::Body;
use crate::shapes::{Polygon, Shape, ShapeKind};

/// Length of the quad an edge is extruded into so SAT can treat it as a
/// polygon.
const EDGE_EXTRUSION: f64 = 30.0;

/// Dispatches the appropriate narrowphase routine for the two bodies'
/// shapes.
pub fn collide(body_a: &Body, a_idx: usize, body_b: &Body, b_idx: usize) -> Option<Contact> {
    match (body_a.shape.kind(), body_b.shape.kind()) {
        (ShapeKind::Circle, ShapeKind::Circle) => {
            collide_circle_circle(body_a, a_idx, body_b, b_idx)
        }
        (ShapeKind::Circle, ShapeKind::Polygon) => {
            collide_circle_polygon(body_a, a_idx, body_b, b_idx)
        }
        (ShapeKind::Polygon, ShapeKind::Circle) => {
            collide_circle_polygon(body_b, b_idx, body_a, a_idx).map(Contact::flip)
        }
        (ShapeKind::Circle, ShapeKind::Edge) => {
            collide_circle_edge(body_a, a_idx, body_b, b_idx)
        }
        (ShapeKind::Edge, ShapeKind::Circle) => {
            collide_circle_edge(body_b, b_idx, body_a, a_idx).map(Contact::flip)
        }
        (ShapeKind::Polygon, ShapeKind::Polygon) => {
            collide_polygon_polygon(body_a, a_idx, body_b, b_idx)
        }
        (ShapeKind::Polygon, ShapeKind::Edge) => {
            collide_polygon_edge(body_a, a_idx, body_b, b_idx)
        }
        (ShapeKind::Edge, ShapeKind::Polygon) => {
            collide_polygon_edge(body_b, b_idx, body_a, a_idx).map(Contact::flip)
        }
        (ShapeKind::Edge, ShapeKind::Edge) => collide_edge_edge(),
    }
}

/// Separating axis test over a set of candidate axes. Returns the axis of
/// minimum overlap scaled by that overlap, or `None` as soon as any axis
/// shows non-positive overlap (the shapes are disjoint).
fn min_overlap_axis(
    axes: impl IntoIterator<Item = Vec2>,
    project_a: impl Fn(Vec2) -> Projection,
    project_b: impl Fn(Vec2) -> Projection,
) -> Option<Vec2> {
    let mut min_overlap = f64::MAX;
    let mut min_axis: Option<Vec2> = None;
    for axis in axes {
        // degenerate axes (zero-length normalization) prove nothing
        if axis.magnitude_squared() < 1e-12 {
            continue;
        }
        let overlap = project_a(axis).overlap(&project_b(axis));
        if overlap <= 0.0 {
            return None;
        }
        if overlap < min_overlap {
            min_overlap = overlap;
            min_axis = Some(axis);
        }
    }
    min_axis.map(|axis| axis.normalize() * min_overlap)
}

pub fn collide_circle_circle(
    body_a: &Body,
    a_idx: usize,
    body_b: &Body,
    b_idx: usize,
) -> Option<Contact> {
    let circle_a = match &body_a.shape {
        Shape::Circle(c) => c,
        _ => return None,
    };
    let circle_b = match &body_b.shape {
        Shape::Circle(c) => c,
        _ => return None,
    };

    let pos_a = circle_a.center();
    let pos_b = circle_b.center();
    let radii = circle_a.radius + circle_b.radius;
    let distance = pos_a.distance(pos_b);
    if distance > radii {
        return None;
    }

    let mut axis = (pos_b - pos_a).normalize();
    if axis == Vec2::ZERO {
        // coincident centers, fall back to a fixed direction
        axis = Vec2::new(0.0, 1.0);
    }

    Some(Contact {
        body_a: a_idx,
        body_b: b_idx,
        mtv: axis * (radii - distance),
        point: circle_a.furthest_point(axis),
        normal: axis,
    })
}

pub fn collide_circle_polygon(
    circle_body: &Body,
    c_idx: usize,
    polygon_body: &Body,
    p_idx: usize,
) -> Option<Contact> {
    let circle = match &circle_body.shape {
        Shape::Circle(c) => c,
        _ => return None,
    };
    let polygon = match &polygon_body.shape {
        Shape::Polygon(p) => p,
        _ => return None,
    };

    // SAT over the polygon's face normals plus one synthetic axis through
    // the polygon's support point closest to the circle's center.
    let poly_center = polygon.center();
    let closest = polygon.furthest_point(circle.center() - poly_center);
    let axes = polygon
        .axes()
        .iter()
        .copied()
        .chain(std::iter::once((circle.center() - closest).normalize()));

    let mut min_axis =
        min_overlap_axis(axes, |axis| circle.project(axis), |axis| polygon.project(axis))?;

    // orient the axis away from the circle toward the polygon
    if min_axis.dot(poly_center - circle.center()) < 0.0 {
        min_axis = -min_axis;
    }

    let point_on_polygon = polygon.furthest_point(-min_axis);
    let point_on_circle = circle.furthest_point(min_axis);
    let mut verts = Vec::with_capacity(2);
    if circle.contains_point(point_on_polygon) {
        verts.push(point_on_polygon);
    }
    if polygon.contains_point(point_on_circle) {
        verts.push(point_on_circle);
    }
    if verts.is_empty() {
        return None;
    }
    let point = if verts.len() == 2 {
        verts[0].average(verts[1])
    } else {
        verts[0]
    };

    Some(Contact {
        body_a: c_idx,
        body_b: p_idx,
        mtv: min_axis,
        point,
        normal: min_axis.normalize(),
    })
}

pub fn collide_circle_edge(
    circle_body: &Body,
    c_idx: usize,
    edge_body: &Body,
    e_idx: usize,
) -> Option<Contact> {
    let circle = match &circle_body.shape {
        Shape::Circle(c) => c,
        _ => return None,
    };
    let edge = match &edge_body.shape {
        Shape::Edge(e) => e,
        _ => return None,
    };

    let cc = circle.center();
    let begin = edge.world_begin();
    let end = edge.world_end();
    let e = end - begin;
    let radius_sq = circle.radius * circle.radius;

    // projections of the center onto the edge direction pick one of three
    // Voronoi regions: before the beginning, past the end, or the band
    // over the segment itself
    let u = e.dot(end - cc);
    let v = e.dot(cc - begin);

    if v <= 0.0 {
        let da = begin - cc;
        let dda = da.dot(da);
        if dda > radius_sq {
            return None;
        }
        let normal = if da == Vec2::ZERO {
            Vec2::new(0.0, 1.0)
        } else {
            da.normalize()
        };
        return Some(Contact {
            body_a: c_idx,
            body_b: e_idx,
            mtv: normal * (circle.radius - dda.sqrt()),
            point: begin,
            normal,
        });
    }

    if u <= 0.0 {
        let db = end - cc;
        let ddb = db.dot(db);
        if ddb > radius_sq {
            return None;
        }
        let normal = if db == Vec2::ZERO {
            Vec2::new(0.0, 1.0)
        } else {
            db.normalize()
        };
        return Some(Contact {
            body_a: c_idx,
            body_b: e_idx,
            mtv: normal * (circle.radius - ddb.sqrt()),
            point: end,
            normal,
        });
    }

    // perpendicular band over the segment
    let den = e.dot(e);
    let point_on_edge = (begin * u + end * v) / den;
    let d = cc - point_on_edge;
    let dd = d.dot(d);
    if dd > radius_sq {
        return None;
    }

    let mut n = e.perpendicular();
    if n.dot(cc - begin) < 0.0 {
        n = -n;
    }
    // n points from the edge toward the circle; the contact convention
    // wants it pointing away from the circle
    let normal = -n.normalize();

    Some(Contact {
        body_a: c_idx,
        body_b: e_idx,
        mtv: normal * (circle.radius - dd.sqrt()).abs(),
        point: point_on_edge,
        normal,
    })
}

pub fn collide_polygon_polygon(
    body_a: &Body,
    a_idx: usize,
    body_b: &Body,
    b_idx: usize,
) -> Option<Contact> {
    let poly_a = match &body_a.shape {
        Shape::Polygon(p) => p,
        _ => return None,
    };
    let poly_b = match &body_b.shape {
        Shape::Polygon(p) => p,
        _ => return None,
    };

    let axes = poly_a.axes().iter().chain(poly_b.axes().iter()).copied();
    let mut min_axis =
        min_overlap_axis(axes, |axis| poly_a.project(axis), |axis| poly_b.project(axis))?;

    // orient the axis from A toward B
    if min_axis.dot(poly_b.center() - poly_a.center()) < 0.0 {
        min_axis = -min_axis;
    }

    let point_a = poly_a.furthest_point(min_axis);
    let point_b = poly_b.furthest_point(-min_axis);
    let mut verts = Vec::with_capacity(2);
    if poly_b.contains_point(point_a) {
        verts.push(point_a);
    }
    if poly_a.contains_point(point_b) {
        verts.push(point_b);
    }
    if verts.is_empty() {
        // no mutual support point, approximate with B's
        verts.push(point_b);
    }
    let point = if verts.len() == 2 {
        verts[0].average(verts[1])
    } else {
        verts[0]
    };

    Some(Contact {
        body_a: a_idx,
        body_b: b_idx,
        mtv: min_axis,
        point,
        normal: min_axis.normalize(),
    })
}

pub fn collide_polygon_edge(
    polygon_body: &Body,
    p_idx: usize,
    edge_body: &Body,
    e_idx: usize,
) -> Option<Contact> {
    let polygon = match &polygon_body.shape {
        Shape::Polygon(p) => p,
        _ => return None,
    };
    let edge = match &edge_body.shape {
        Shape::Edge(e) => e,
        _ => return None,
    };

    let begin = edge.world_begin();
    let end = edge.world_end();
    let mut edge_normal = (end - begin).normal();
    let dir = (edge.center() - polygon.center()).normalize();

    // extrude the segment into a thin quad away from the polygon so the
    // polygon SAT routine applies
    let quad = Polygon::new(vec![
        begin,
        end,
        end + dir * EDGE_EXTRUSION,
        begin + dir * EDGE_EXTRUSION,
    ])
    .ok()?;

    let axes = polygon.axes().iter().chain(quad.axes().iter()).copied();
    let mut min_axis =
        min_overlap_axis(axes, |axis| polygon.project(axis), |axis| quad.project(axis))?;

    // flip the normal and axis toward the edge so collisions are positive
    if edge_normal.dot(dir) < 0.0 {
        edge_normal = -edge_normal;
    }
    if min_axis.dot(dir) < 0.0 {
        min_axis = -min_axis;
    }

    Some(Contact {
        body_a: p_idx,
        body_b: e_idx,
        mtv: min_axis,
        point: polygon.furthest_point(edge_normal),
        normal: edge_normal,
    })
}

/// Two infinitely thin segments are never considered to interpenetrate.
/// A deliberate simplification, preserved as-is.
pub fn collide_edge_edge() -> Option<Contact> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::body::CollisionType;
    use crate::shapes::{Circle, Edge, Polygon};
    const EPSILON: f64 = 1e-9;

    fn circle_body(x: f64, y: f64, radius: f64) -> Body {
        Body::at(
            Vec2::new(x, y),
            Shape::Circle(Circle::new(radius)),
            CollisionType::Active,
        )
    }

    fn box_body(x: f64, y: f64, size: f64) -> Body {
        Body::at(
            Vec2::new(x, y),
            Shape::Polygon(Polygon::from_box(size, size)),
            CollisionType::Active,
        )
    }

    fn edge_body(begin: Vec2, end: Vec2) -> Body {
        Body::at(
            Vec2::ZERO,
            Shape::Edge(Edge::new(begin, end)),
            CollisionType::Fixed,
        )
    }

    // --- shared SAT loop ---

    #[test]
    fn test_sat_early_exit_stops_at_separating_axis() {
        use std::cell::Cell;
        let calls = Cell::new(0);
        // first axis separates; the second would overlap and must never
        // be evaluated
        let axes = vec![Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
        let result = min_overlap_axis(
            axes,
            |axis| {
                calls.set(calls.get() + 1);
                if axis.x == 1.0 {
                    Projection::new(0.0, 1.0)
                } else {
                    Projection::new(0.0, 10.0)
                }
            },
            |axis| {
                if axis.x == 1.0 {
                    Projection::new(2.0, 3.0)
                } else {
                    Projection::new(0.0, 10.0)
                }
            },
        );
        assert!(result.is_none());
        assert_eq!(calls.get(), 1);
    }

    // --- circle x circle ---

    #[test]
    fn test_circle_circle_overlap() {
        // r=5 circles at (0,0) and (8,0) overlap by 2
        let a = circle_body(0.0, 0.0, 5.0);
        let b = circle_body(8.0, 0.0, 5.0);
        let contact = collide(&a, 0, &b, 1).unwrap();

        assert_eq!(contact.body_a, 0);
        assert_eq!(contact.body_b, 1);
        assert!((contact.mtv.magnitude() - 2.0).abs() < EPSILON);
        assert!((contact.normal.x - 1.0).abs() < EPSILON);
        assert!(contact.normal.y.abs() < EPSILON);
        // witness point sits on circle A's rim toward B
        assert!((contact.point.x - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_circle_circle_disjoint() {
        let a = circle_body(0.0, 0.0, 5.0);
        let b = circle_body(11.0, 0.0, 5.0);
        assert!(collide(&a, 0, &b, 1).is_none());
    }

    #[test]
    fn test_circle_circle_symmetry() {
        let a = circle_body(0.0, 0.0, 5.0);
        let b = circle_body(8.0, 0.0, 5.0);
        let ab = collide(&a, 0, &b, 1).unwrap();
        let ba = collide(&b, 1, &a, 0).unwrap();
        // same overlap, opposite normals
        assert!((ab.mtv.magnitude() - ba.mtv.magnitude()).abs() < EPSILON);
        assert!((ab.normal + ba.normal).magnitude() < EPSILON);
    }

    #[test]
    fn test_circle_circle_concentric_fallback_normal() {
        let a = circle_body(0.0, 0.0, 2.0);
        let b = circle_body(0.0, 0.0, 1.0);
        let contact = collide(&a, 0, &b, 1).unwrap();
        assert_eq!(contact.normal, Vec2::new(0.0, 1.0));
        assert!((contact.mtv.magnitude() - 3.0).abs() < EPSILON);
    }

    // --- circle x polygon ---

    #[test]
    fn test_circle_polygon_overlap() {
        // square spanning (-5,-5)..(5,5), circle poking in from the right
        let polygon = box_body(0.0, 0.0, 10.0);
        let circle = circle_body(6.0, 0.0, 2.0);
        let contact = collide(&circle, 0, &polygon, 1).unwrap();

        assert!((contact.mtv.magnitude() - 1.0).abs() < EPSILON);
        // normal points from the circle toward the polygon
        assert!((contact.normal.x + 1.0).abs() < EPSILON);
        assert!(contact.normal.y.abs() < EPSILON);
    }

    #[test]
    fn test_circle_polygon_disjoint() {
        let polygon = box_body(0.0, 0.0, 10.0);
        let circle = circle_body(10.0, 0.0, 2.0);
        assert!(collide(&circle, 0, &polygon, 1).is_none());
    }

    #[test]
    fn test_polygon_circle_dispatch_flips() {
        let polygon = box_body(0.0, 0.0, 10.0);
        let circle = circle_body(6.0, 0.0, 2.0);
        let cp = collide(&circle, 0, &polygon, 1).unwrap();
        let pc = collide(&polygon, 1, &circle, 0).unwrap();

        assert_eq!(pc.body_a, 1);
        assert_eq!(pc.body_b, 0);
        assert!((cp.normal + pc.normal).magnitude() < EPSILON);
        assert!((cp.mtv + pc.mtv).magnitude() < EPSILON);
    }

    // --- circle x edge ---

    #[test]
    fn test_circle_edge_middle_band() {
        let edge = edge_body(Vec2::new(-10.0, 5.0), Vec2::new(10.0, 5.0));
        let circle = circle_body(0.0, 1.0, 5.0);
        let contact = collide(&circle, 0, &edge, 1).unwrap();

        // circle is above the edge; penetration is 1
        assert!((contact.mtv.magnitude() - 1.0).abs() < EPSILON);
        assert!((contact.point.x - 0.0).abs() < EPSILON);
        assert!((contact.point.y - 5.0).abs() < EPSILON);
        // normal points away from the circle, toward the edge
        assert!((contact.normal.y - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_circle_edge_before_begin() {
        let edge = edge_body(Vec2::new(5.0, 0.0), Vec2::new(15.0, 0.0));
        let circle = circle_body(2.0, 0.0, 4.0);
        let contact = collide(&circle, 0, &edge, 1).unwrap();

        // penetration measured to the begin endpoint: 4 - 3 = 1
        assert!((contact.mtv.magnitude() - 1.0).abs() < EPSILON);
        assert_eq!(contact.point, Vec2::new(5.0, 0.0));
        assert!((contact.normal.x - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_circle_edge_past_end() {
        let edge = edge_body(Vec2::new(-15.0, 0.0), Vec2::new(-5.0, 0.0));
        let circle = circle_body(-2.0, 0.0, 4.0);
        let contact = collide(&circle, 0, &edge, 1).unwrap();

        assert!((contact.mtv.magnitude() - 1.0).abs() < EPSILON);
        assert_eq!(contact.point, Vec2::new(-5.0, 0.0));
        assert!((contact.normal.x + 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_circle_edge_miss() {
        let edge = edge_body(Vec2::new(-10.0, 5.0), Vec2::new(10.0, 5.0));
        let circle = circle_body(0.0, -1.0, 5.0);
        assert!(collide(&circle, 0, &edge, 1).is_none());
    }

    // --- polygon x polygon ---

    #[test]
    fn test_polygon_polygon_overlap() {
        // 10x10 boxes centered at (0,0) and (8,0): overlap 2 along x
        let a = box_body(0.0, 0.0, 10.0);
        let b = box_body(8.0, 0.0, 10.0);
        let contact = collide(&a, 0, &b, 1).unwrap();

        assert!((contact.mtv.magnitude() - 2.0).abs() < EPSILON);
        // axis oriented from A toward B
        assert!((contact.normal.x - 1.0).abs() < EPSILON);
        assert!(contact.normal.y.abs() < EPSILON);
    }

    #[test]
    fn test_polygon_polygon_early_exit() {
        let a = box_body(0.0, 0.0, 10.0);
        let b = box_body(20.0, 0.0, 10.0);
        assert!(collide(&a, 0, &b, 1).is_none());
    }

    #[test]
    fn test_polygon_polygon_symmetry() {
        let a = box_body(0.0, 0.0, 10.0);
        let b = box_body(8.0, 6.0, 10.0);
        let ab = collide(&a, 0, &b, 1).unwrap();
        let ba = collide(&b, 1, &a, 0).unwrap();
        assert!((ab.mtv.magnitude() - ba.mtv.magnitude()).abs() < EPSILON);
        assert!((ab.normal + ba.normal).magnitude() < EPSILON);
    }

    #[test]
    fn test_polygon_polygon_shallower_axis_wins() {
        // overlap 2 on x, 6 on y: the x axis must be chosen
        let a = box_body(0.0, 0.0, 10.0);
        let b = box_body(8.0, 4.0, 10.0);
        let contact = collide(&a, 0, &b, 1).unwrap();
        assert!((contact.mtv.magnitude() - 2.0).abs() < EPSILON);
        assert!(contact.normal.y.abs() < EPSILON);
    }

    // --- polygon x edge ---

    #[test]
    fn test_polygon_edge_overlap() {
        // edge crossing the bottom of the box
        let polygon = box_body(0.0, 0.0, 10.0);
        let edge = edge_body(Vec2::new(-20.0, 4.0), Vec2::new(20.0, 4.0));
        let contact = collide(&polygon, 0, &edge, 1).unwrap();

        assert!(contact.mtv.magnitude() > 0.0);
        // normal points from the polygon down toward the edge
        assert!((contact.normal.y - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_polygon_edge_disjoint() {
        let polygon = box_body(0.0, 0.0, 10.0);
        let edge = edge_body(Vec2::new(-20.0, 8.0), Vec2::new(20.0, 8.0));
        assert!(collide(&polygon, 0, &edge, 1).is_none());
    }

    #[test]
    fn test_edge_polygon_dispatch_flips() {
        let polygon = box_body(0.0, 0.0, 10.0);
        let edge = edge_body(Vec2::new(-20.0, 4.0), Vec2::new(20.0, 4.0));
        let pe = collide(&polygon, 0, &edge, 1).unwrap();
        let ep = collide(&edge, 1, &polygon, 0).unwrap();
        assert_eq!(ep.body_a, 1);
        assert!((pe.normal + ep.normal).magnitude() < EPSILON);
    }

    // --- edge x edge ---

    #[test]
    fn test_edge_edge_never_collides() {
        // two crossing segments still produce no contact
        let a = edge_body(Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0));
        let mut b = edge_body(Vec2::new(0.0, -5.0), Vec2::new(0.0, 5.0));
        b.collision_type = CollisionType::Active;
        assert!(collide(&a, 0, &b, 1).is_none());
    }
}
