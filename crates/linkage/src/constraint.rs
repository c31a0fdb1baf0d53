//! Geometric constraints between bodies.
//!
//! Each constraint turns the poses of the bodies it references into a short,
//! fixed-length list of residual scalars that vanish when it is satisfied:
//! - `RotationalConstraint`: 2 residuals (anchor points coincide, x and y).
//! - `FixedConstraint`: 3 residuals (pose equals the captured target).
//!
//! Constraints never validate topology themselves; `World::new` does that so
//! every problem is reported at once.

use std::rc::Rc;

use crate::body::{BodyRef, Pose};
use crate::geom::{local_to_global_position, Vec2};

/// Shape of the fixed-pose residual.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResidualForm {
    /// `value - target`.
    #[default]
    Linear,
    /// `(value - target)^5`, sign preserved; flat near the target.
    Flattened,
}

impl ResidualForm {
    #[inline]
    fn apply(self, d: f64) -> f64 {
        match self {
            ResidualForm::Linear => d,
            ResidualForm::Flattened => d.powi(5),
        }
    }
}

/// Pin joint: `anchor_a` on body A and `anchor_b` on body B share one global point.
///
/// Anchors are offsets in each body's local frame, fixed at construction.
#[derive(Clone, Debug)]
pub struct RotationalConstraint {
    pub body_a: BodyRef,
    pub anchor_a: Vec2,
    pub body_b: BodyRef,
    pub anchor_b: Vec2,
}

impl RotationalConstraint {
    pub const EQUATIONS: usize = 2;

    pub fn new(body_a: &BodyRef, anchor_a: Vec2, body_b: &BodyRef, anchor_b: Vec2) -> Self {
        Self {
            body_a: Rc::clone(body_a),
            anchor_a,
            body_b: Rc::clone(body_b),
            anchor_b,
        }
    }

    /// Global anchor of A minus global anchor of B.
    pub fn residuals(&self, a: Pose, b: Pose) -> [f64; 2] {
        let pa = local_to_global_position(self.anchor_a, a.position(), a.theta);
        let pb = local_to_global_position(self.anchor_b, b.position(), b.theta);
        let d = pa - pb;
        [d.x, d.y]
    }

    /// True if both ends name the same body id.
    pub fn is_self_referencing(&self) -> bool {
        self.body_a.borrow().id == self.body_b.borrow().id
    }
}

/// Holds one body at a target pose.
#[derive(Clone, Debug)]
pub struct FixedConstraint {
    pub body: BodyRef,
    pub target: Pose,
    pub form: ResidualForm,
}

impl FixedConstraint {
    pub const EQUATIONS: usize = 3;

    /// Fix `body` at its current pose.
    pub fn new(body: &BodyRef) -> Self {
        let target = body.borrow().pose;
        Self::at(body, target)
    }

    /// Fix `body` at an explicit `target`.
    pub fn at(body: &BodyRef, target: Pose) -> Self {
        Self {
            body: Rc::clone(body),
            target,
            form: ResidualForm::default(),
        }
    }

    pub fn with_form(mut self, form: ResidualForm) -> Self {
        self.form = form;
        self
    }

    pub fn residuals(&self, p: Pose) -> [f64; 3] {
        [
            self.form.apply(p.x - self.target.x),
            self.form.apply(p.y - self.target.y),
            self.form.apply(p.theta - self.target.theta),
        ]
    }
}

/// Either constraint kind; `World` dispatches residual assembly on the variant.
#[derive(Clone, Debug)]
pub enum Constraint {
    Rotational(RotationalConstraint),
    Fixed(FixedConstraint),
}

impl Constraint {
    /// Referenced bodies, in the order `append_residuals` expects their poses.
    pub fn bodies(&self) -> Vec<&BodyRef> {
        match self {
            Constraint::Rotational(c) => vec![&c.body_a, &c.body_b],
            Constraint::Fixed(c) => vec![&c.body],
        }
    }

    #[inline]
    pub fn equation_count(&self) -> usize {
        match self {
            Constraint::Rotational(_) => RotationalConstraint::EQUATIONS,
            Constraint::Fixed(_) => FixedConstraint::EQUATIONS,
        }
    }

    /// Push this constraint's residuals; `poses[k]` belongs to `bodies()[k]`.
    pub fn append_residuals(&self, poses: &[Pose], out: &mut Vec<f64>) {
        match self {
            Constraint::Rotational(c) => out.extend(c.residuals(poses[0], poses[1])),
            Constraint::Fixed(c) => out.extend(c.residuals(poses[0])),
        }
    }
}

impl From<RotationalConstraint> for Constraint {
    fn from(c: RotationalConstraint) -> Self {
        Constraint::Rotational(c)
    }
}

impl From<FixedConstraint> for Constraint {
    fn from(c: FixedConstraint) -> Self {
        Constraint::Fixed(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Body;
    use nalgebra::vector;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn rotational_residual_vanishes_on_coincident_anchors() {
        let a = Body::shared("a", 0.0, 0.0, 0.0);
        let b = Body::shared("b", 2.0, 0.0, 0.0);
        let c = RotationalConstraint::new(&a, vector![1.0, 0.0], &b, vector![-1.0, 0.0]);
        let r = c.residuals(a.borrow().pose, b.borrow().pose);
        assert!(r[0].abs() < 1e-12 && r[1].abs() < 1e-12);
        // Turning A by 90° moves its anchor to (0, 1).
        let r = c.residuals(Pose::new(0.0, 0.0, FRAC_PI_2), b.borrow().pose);
        assert!((r[0] - (0.0 - 1.0)).abs() < 1e-12);
        assert!((r[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn self_reference_detected_by_id_not_handle() {
        let a = Body::shared("same", 0.0, 0.0, 0.0);
        let twin = Body::shared("same", 5.0, 0.0, 0.0);
        let c = RotationalConstraint::new(&a, Vec2::zeros(), &twin, Vec2::zeros());
        assert!(c.is_self_referencing());
    }

    #[test]
    fn fixed_captures_pose_at_construction() {
        let a = Body::shared("a", 1.0, 2.0, 0.3);
        let c = FixedConstraint::new(&a);
        a.borrow_mut().pose = Pose::new(1.5, 2.0, 0.1);
        let r = c.residuals(a.borrow().pose);
        assert!((r[0] - 0.5).abs() < 1e-12);
        assert!(r[1].abs() < 1e-12);
        assert!((r[2] + 0.2).abs() < 1e-12);
    }

    #[test]
    fn flattened_form_keeps_sign() {
        let a = Body::shared("a", 0.0, 0.0, 0.0);
        let c = FixedConstraint::new(&a).with_form(ResidualForm::Flattened);
        let r = c.residuals(Pose::new(-2.0, 0.5, 0.0));
        assert_eq!(r[0], -32.0);
        assert_eq!(r[1], 0.03125);
        assert_eq!(r[2], 0.0);
    }

    #[test]
    fn enum_dispatch_appends_in_order() {
        let a = Body::shared("a", 0.0, 0.0, 0.0);
        let b = Body::shared("b", 3.0, 4.0, 0.0);
        let rot: Constraint =
            RotationalConstraint::new(&a, Vec2::zeros(), &b, Vec2::zeros()).into();
        let fix: Constraint = FixedConstraint::at(&b, Pose::new(3.0, 3.0, 0.0)).into();
        let mut out = Vec::new();
        rot.append_residuals(&[a.borrow().pose, b.borrow().pose], &mut out);
        fix.append_residuals(&[b.borrow().pose], &mut out);
        assert_eq!(out, vec![-3.0, -4.0, 0.0, 1.0, 0.0]);
        assert_eq!(rot.equation_count() + fix.equation_count(), out.len());
        assert_eq!(rot.bodies().len(), 2);
    }
}
