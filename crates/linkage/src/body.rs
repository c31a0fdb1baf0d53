//! Rigid bodies and their poses.
//!
//! A `Body` is owned by the caller and shared through [`BodyRef`] with every
//! constraint that mentions it and with the `World` built from those
//! constraints. Only `World::solve` writes poses, and only after convergence.

use std::cell::RefCell;
use std::rc::Rc;

use crate::geom::Vec2;

/// Planar pose: center-of-mass position and orientation (radians).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

impl Pose {
    #[inline]
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self { x, y, theta }
    }
    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
    /// Pose as the three state-vector scalars `[x, y, theta]`.
    #[inline]
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.theta]
    }
    #[inline]
    pub fn from_array([x, y, theta]: [f64; 3]) -> Self {
        Self::new(x, y, theta)
    }
    /// First three scalars of a state-vector window; `s.len() >= 3`.
    #[inline]
    pub(crate) fn from_slice(s: &[f64]) -> Self {
        Self::new(s[0], s[1], s[2])
    }
}

/// Rigid body with a string identity and a mutable pose.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    pub id: String,
    pub pose: Pose,
}

/// Shared handle to a caller-owned body.
pub type BodyRef = Rc<RefCell<Body>>;

impl Body {
    pub fn new(id: impl Into<String>, x: f64, y: f64, theta: f64) -> Self {
        Self {
            id: id.into(),
            pose: Pose::new(x, y, theta),
        }
    }

    /// Wrap into a shareable handle.
    pub fn into_ref(self) -> BodyRef {
        Rc::new(RefCell::new(self))
    }

    /// Shorthand for `Body::new(..).into_ref()`.
    pub fn shared(id: impl Into<String>, x: f64, y: f64, theta: f64) -> BodyRef {
        Self::new(id, x, y, theta).into_ref()
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.pose.position()
    }
}
