//! JSON scene files: bodies, constraints, optional solver overrides.
//!
//! ```json
//! {
//!   "bodies": [{"id": "ground", "x": 0, "y": 0}, {"id": "arm", "x": 2, "y": 0}],
//!   "constraints": [
//!     {"kind": "fixed", "body": "ground"},
//!     {"kind": "rotational", "body_a": "ground", "anchor_a": [1, 0],
//!      "body_b": "arm", "anchor_b": [0, 0]}
//!   ],
//!   "solver": {"max_iterations": 200}
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use linkage::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Scene {
    pub bodies: Vec<BodySpec>,
    #[serde(default)]
    pub constraints: Vec<ConstraintSpec>,
    #[serde(default)]
    pub solver: SolverSpec,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct BodySpec {
    pub id: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub theta: f64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstraintSpec {
    Fixed {
        body: String,
        /// `[x, y, theta]`; defaults to the body's initial pose.
        #[serde(default)]
        target: Option<[f64; 3]>,
        #[serde(default)]
        flattened: bool,
    },
    Rotational {
        body_a: String,
        anchor_a: [f64; 2],
        body_b: String,
        anchor_b: [f64; 2],
    },
}

/// Partial `SolverCfg`; unset fields keep the library defaults.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SolverSpec {
    pub stop_error: Option<f64>,
    pub max_iterations: Option<usize>,
    pub timeout_ms: Option<u64>,
    pub jacobian_delta: Option<f64>,
    /// Switches the tie-break to a seeded random pick.
    pub seed: Option<u64>,
}

impl SolverSpec {
    pub fn apply(&self, mut cfg: SolverCfg) -> SolverCfg {
        if let Some(v) = self.stop_error {
            cfg.stop_error = v;
        }
        if let Some(v) = self.max_iterations {
            cfg.max_iterations = v;
        }
        if let Some(ms) = self.timeout_ms {
            cfg.timeout = Duration::from_millis(ms);
        }
        if let Some(v) = self.jacobian_delta {
            cfg.jacobian_delta = v;
        }
        if let Some(seed) = self.seed {
            cfg.tie_break = TieBreak::Seeded(seed);
        }
        cfg
    }
}

/// A scene turned into live bodies and a validated world.
pub struct Built {
    /// Scene bodies in file order, including ones no constraint mentions.
    pub bodies: Vec<BodyRef>,
    pub world: World,
}

impl Built {
    pub fn poses(&self) -> Vec<BodySpec> {
        self.bodies
            .iter()
            .map(|b| {
                let b = b.borrow();
                BodySpec {
                    id: b.id.clone(),
                    x: b.pose.x,
                    y: b.pose.y,
                    theta: b.pose.theta,
                }
            })
            .collect()
    }
}

pub fn load(path: &Path) -> Result<Scene> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing scene {}", path.display()))
}

impl Scene {
    /// Build bodies and world; `overrides` is applied after the scene's own solver block.
    pub fn build(&self, overrides: &SolverSpec) -> Result<Built> {
        let mut by_id: HashMap<&str, BodyRef> = HashMap::new();
        let mut bodies = Vec::with_capacity(self.bodies.len());
        for spec in &self.bodies {
            let body = Body::shared(spec.id.clone(), spec.x, spec.y, spec.theta);
            if by_id.insert(spec.id.as_str(), body.clone()).is_some() {
                bail!("duplicate body id '{}'", spec.id);
            }
            bodies.push(body);
        }
        let lookup = |id: &str| -> Result<&BodyRef> {
            by_id
                .get(id)
                .with_context(|| format!("constraint references unknown body '{id}'"))
        };

        let mut constraints: Vec<Constraint> = Vec::with_capacity(self.constraints.len());
        for spec in &self.constraints {
            let c = match spec {
                ConstraintSpec::Fixed {
                    body,
                    target,
                    flattened,
                } => {
                    let body = lookup(body)?;
                    let fixed = match target {
                        Some(target) => FixedConstraint::at(body, Pose::from_array(*target)),
                        None => FixedConstraint::new(body),
                    };
                    let form = if *flattened {
                        ResidualForm::Flattened
                    } else {
                        ResidualForm::Linear
                    };
                    fixed.with_form(form).into()
                }
                ConstraintSpec::Rotational {
                    body_a,
                    anchor_a,
                    body_b,
                    anchor_b,
                } => RotationalConstraint::new(
                    lookup(body_a)?,
                    Vec2::from(*anchor_a),
                    lookup(body_b)?,
                    Vec2::from(*anchor_b),
                )
                .into(),
            };
            constraints.push(c);
        }

        let cfg = overrides.apply(self.solver.apply(SolverCfg::default()));
        let world = World::new(constraints)?.with_solver_cfg(cfg);
        Ok(Built { bodies, world })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const PINNED_PAIR: &str = r#"{
        "bodies": [
            {"id": "a", "x": 0.0, "y": 0.0},
            {"id": "b", "x": 2.0, "y": 0.0, "theta": 0.0},
            {"id": "loose", "x": 5.0, "y": 5.0}
        ],
        "constraints": [
            {"kind": "fixed", "body": "a"},
            {"kind": "rotational", "body_a": "a", "anchor_a": [1.0, 0.0],
             "body_b": "b", "anchor_b": [0.0, 0.0]}
        ],
        "solver": {"max_iterations": 50}
    }"#;

    #[test]
    fn load_build_and_solve_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scene.json");
        fs::write(&path, PINNED_PAIR).unwrap();

        let scene = load(&path).unwrap();
        let mut built = scene.build(&SolverSpec::default()).unwrap();
        assert_eq!(built.world.solver_cfg().max_iterations, 50);
        assert_eq!(built.world.dof(), 1);
        built.world.solve().unwrap();

        let poses = built.poses();
        assert_eq!(poses.len(), 3);
        assert!((poses[1].x - 1.0).abs() < 1e-6);
        assert_eq!(poses[2], BodySpec { id: "loose".into(), x: 5.0, y: 5.0, theta: 0.0 });
    }

    #[test]
    fn overrides_win_over_scene_block() {
        let scene: Scene = serde_json::from_str(PINNED_PAIR).unwrap();
        let overrides = SolverSpec {
            max_iterations: Some(7),
            seed: Some(1),
            ..SolverSpec::default()
        };
        let built = scene.build(&overrides).unwrap();
        assert_eq!(built.world.solver_cfg().max_iterations, 7);
        assert_eq!(built.world.solver_cfg().tie_break, TieBreak::Seeded(1));
    }

    #[test]
    fn unknown_body_is_an_error() {
        let scene: Scene = serde_json::from_str(
            r#"{"bodies": [{"id": "a", "x": 0, "y": 0}],
                "constraints": [{"kind": "fixed", "body": "ghost"}]}"#,
        )
        .unwrap();
        let err = scene.build(&SolverSpec::default()).err().unwrap();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn explicit_target_and_flattened_form() {
        let scene: Scene = serde_json::from_str(
            r#"{"bodies": [{"id": "a", "x": 0, "y": 0}],
                "constraints": [{"kind": "fixed", "body": "a", "target": [0.5, 0, 0], "flattened": true}]}"#,
        )
        .unwrap();
        let built = scene.build(&SolverSpec::default()).unwrap();
        match &built.world.constraints()[0] {
            Constraint::Fixed(c) => {
                assert_eq!(c.target, Pose::new(0.5, 0.0, 0.0));
                assert_eq!(c.form, ResidualForm::Flattened);
            }
            other => panic!("unexpected constraint {other:?}"),
        }
    }

    #[test]
    fn missing_file_has_context() {
        let dir = tempdir().unwrap();
        let err = load(&dir.path().join("nope.json")).unwrap_err();
        assert!(format!("{err:#}").contains("nope.json"));
    }
}
