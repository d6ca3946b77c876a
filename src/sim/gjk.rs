//! GJK convex intersection test (extension point)
//!
//! Works on any pair of convex shapes exposing a support function, by growing
//! a simplex of Minkowski-difference support points (point, segment,
//! triangle, tetrahedron) until it either encloses the origin (intersecting)
//! or a fresh support point fails the origin side-test (disjoint).
//!
//! The sphere-sphere fast path in the collision manager does not go through
//! here; this exists for arbitrary convex bodies and is not wired into the
//! default dispatch.

use glam::Vec3;

/// Farthest point of the shape in the given direction.
pub trait Support: Send {
    fn support(&self, direction: Vec3) -> Vec3;
}

const EPS: f32 = 1e-6;
/// Non-termination guard for adversarial/near-degenerate inputs.
const MAX_ITERATIONS: usize = 64;

fn minkowski_support(a: &dyn Support, b: &dyn Support, direction: Vec3) -> Vec3 {
    a.support(direction) - b.support(-direction)
}

/// `(a x b) x c = b (a . c) - a (b . c)`
fn triple_product(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    b * a.dot(c) - a * b.dot(c)
}

/// True when the two convex shapes intersect.
pub fn gjk(a: &dyn Support, b: &dyn Support) -> bool {
    let mut direction = Vec3::X;
    let first = minkowski_support(a, b, direction);
    let mut simplex = vec![first];
    direction = -first;

    for _ in 0..MAX_ITERATIONS {
        if direction.length_squared() < EPS {
            // The last support point was (numerically) the origin.
            return true;
        }
        let point = minkowski_support(a, b, direction.normalize());
        if point.dot(direction.normalize()) < -EPS {
            // New support point does not pass the origin: shapes are disjoint.
            return false;
        }
        simplex.push(point);
        if advance_simplex(&mut simplex, &mut direction) {
            return true;
        }
    }
    log::warn!("gjk did not converge after {MAX_ITERATIONS} iterations, reporting intersection");
    true
}

/// Updates the simplex and search direction; true when the simplex encloses
/// the origin. The newest support point is always last in the simplex.
fn advance_simplex(simplex: &mut Vec<Vec3>, direction: &mut Vec3) -> bool {
    match simplex.len() {
        2 => {
            let b = simplex[0];
            let a = simplex[1];
            let ab = b - a;
            let ao = -a;
            if ab.dot(ao) > 0.0 {
                // Search orthogonally to the segment, toward the origin. The
                // collinearity test is scale-free (sine of the angle).
                let perp = triple_product(ab, ao, ab);
                if perp.length_squared()
                    < EPS * ab.length_squared() * ab.length_squared() * ao.length_squared()
                {
                    // Origin lies on the segment itself.
                    return true;
                }
                *direction = perp;
            } else {
                // Origin is past `a`; shrink back to a point.
                simplex.remove(0);
                *direction = ao;
            }
            false
        }
        3 => {
            let c = simplex[0];
            let b = simplex[1];
            let a = simplex[2];
            let ab = b - a;
            let ac = c - a;
            let ao = -a;
            let abc = ab.cross(ac);

            if abc.length_squared() < EPS * ab.length_squared() * ac.length_squared() {
                // Degenerate triangle; retry as the most recent segment.
                simplex.remove(0);
                return advance_simplex(simplex, direction);
            }

            if abc.cross(ac).dot(ao) > 0.0 {
                if ac.dot(ao) > 0.0 {
                    // Edge ac region.
                    simplex.remove(1);
                    *direction = triple_product(ac, ao, ac);
                    return false;
                }
                // Behind edge ac; re-test against the ab segment.
                simplex.remove(0);
                return advance_simplex(simplex, direction);
            }
            if ab.cross(abc).dot(ao) > 0.0 {
                // Edge ab region.
                simplex.remove(0);
                return advance_simplex(simplex, direction);
            }

            // Origin projects inside the triangle: above, below, or in-plane.
            let side = abc.dot(ao);
            if side * side < EPS * abc.length_squared() * ao.length_squared() {
                return true;
            }
            if side > 0.0 {
                *direction = abc;
            } else {
                // Flip winding so the kept face's normal points at the origin.
                simplex.swap(0, 1);
                *direction = -abc;
            }
            false
        }
        4 => {
            let d = simplex[0];
            let c = simplex[1];
            let b = simplex[2];
            let a = simplex[3];
            let ao = -a;

            // Face normals oriented away from the remaining vertex.
            let faces = [
                (b, c, d, 0), // drops d when origin is outside abc
                (c, d, b, 2), // drops b when origin is outside acd
                (d, b, c, 1), // drops c when origin is outside adb
            ];
            for (p, q, excluded, drop_index) in faces {
                let mut normal = (p - a).cross(q - a);
                if normal.dot(excluded - a) > 0.0 {
                    normal = -normal;
                }
                if normal.dot(ao) > EPS {
                    simplex.remove(drop_index);
                    *direction = normal;
                    return false;
                }
            }
            // Origin is inside the tetrahedron.
            true
        }
        _ => {
            debug_assert!(false, "simplex size must be 2..=4, got {}", simplex.len());
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct Sphere {
        center: Vec3,
        radius: f32,
    }

    impl Support for Sphere {
        fn support(&self, direction: Vec3) -> Vec3 {
            let dir = direction.try_normalize().unwrap_or(Vec3::X);
            self.center + dir * self.radius
        }
    }

    fn spheres_intersect_closed_form(a: &Sphere, b: &Sphere) -> bool {
        (b.center - a.center).length() <= a.radius + b.radius
    }

    #[test]
    fn test_gjk_matches_closed_form_on_separation_grid() {
        // Separations spanning overlap, tangency (2.0) and clear separation.
        for i in 0..=60 {
            let separation = i as f32 * 0.1;
            let a = Sphere {
                center: Vec3::ZERO,
                radius: 1.0,
            };
            let b = Sphere {
                center: Vec3::new(separation, 0.0, 0.0),
                radius: 1.0,
            };
            assert_eq!(
                gjk(&a, &b),
                spheres_intersect_closed_form(&a, &b),
                "disagreement at separation {separation}"
            );
        }
    }

    #[test]
    fn test_gjk_off_axis_pairs() {
        let a = Sphere {
            center: Vec3::new(1.0, 2.0, 3.0),
            radius: 1.5,
        };
        let hit = Sphere {
            center: Vec3::new(2.0, 3.0, 3.5),
            radius: 0.5,
        };
        let miss = Sphere {
            center: Vec3::new(5.0, 5.0, 5.0),
            radius: 0.5,
        };
        assert!(gjk(&a, &hit));
        assert!(!gjk(&a, &miss));
    }

    #[test]
    fn test_gjk_disjoint_pair_off_the_initial_axis() {
        // Both centers on the y axis, so every support point stays in the
        // z = 0 plane and the simplex is forever coplanar with the origin.
        // The pair is disjoint by a gap of ~0.25.
        let a = Sphere {
            center: Vec3::new(0.0, -2.0749745, 0.0),
            radius: 2.457234,
        };
        let b = Sphere {
            center: Vec3::new(0.0, 3.228068, 0.0),
            radius: 2.593884,
        };
        assert!(!gjk(&a, &b));
        assert!(!spheres_intersect_closed_form(&a, &b));
    }

    #[test]
    fn test_gjk_matches_closed_form_on_y_axis_grid() {
        for i in 0..=60 {
            let separation = i as f32 * 0.1;
            let a = Sphere {
                center: Vec3::ZERO,
                radius: 1.0,
            };
            let b = Sphere {
                center: Vec3::new(0.0, separation, 0.0),
                radius: 1.0,
            };
            assert_eq!(
                gjk(&a, &b),
                spheres_intersect_closed_form(&a, &b),
                "disagreement at separation {separation}"
            );
        }
    }

    #[test]
    fn test_gjk_coincident_centers() {
        let a = Sphere {
            center: Vec3::ONE,
            radius: 0.1,
        };
        let b = Sphere {
            center: Vec3::ONE,
            radius: 0.2,
        };
        assert!(gjk(&a, &b));
    }

    proptest! {
        #[test]
        fn prop_gjk_agrees_with_closed_form(
            ax in -5.0f32..5.0, ay in -5.0f32..5.0, az in -5.0f32..5.0,
            bx in -5.0f32..5.0, by in -5.0f32..5.0, bz in -5.0f32..5.0,
            ra in 0.1f32..3.0, rb in 0.1f32..3.0,
        ) {
            let a = Sphere { center: Vec3::new(ax, ay, az), radius: ra };
            let b = Sphere { center: Vec3::new(bx, by, bz), radius: rb };
            let gap = (b.center - a.center).length() - (ra + rb);
            // Skip razor-thin tangency where f32 rounding decides the answer.
            prop_assume!(gap.abs() > 1e-3);
            prop_assert_eq!(gjk(&a, &b), spheres_intersect_closed_form(&a, &b));
        }
    }
}
