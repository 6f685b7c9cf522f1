use std::f32::consts::PI;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::curve::SmoothCurve;
use crate::error::Result;
use crate::growing::generation::{DepthDefinition, Settings};
use crate::growing::Skeleton;
use crate::meshing::{LeafSettings, MeshSettings, TreeMeshes};
use crate::utils::ensure_finite;
use crate::{Grow, Seed};

/// One placement of the generated tree, drawn by the renderer with its own growth.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub position: Vec3,
    pub growth: f32,
}

/// Everything needed to produce a forest, as stored in a configuration file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    pub settings: Settings,
    pub mesh: MeshSettings,
    #[serde(default)]
    pub instances: Vec<Instance>,
}

impl TreeConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TreeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.settings.validate()?;
        self.mesh.validate()?;
        for (i, instance) in self.instances.iter().enumerate() {
            ensure_finite(&format!("instances[{i}].growth"), instance.growth)?;
            for c in instance.position.to_array() {
                ensure_finite(&format!("instances[{i}].position"), c)?;
            }
        }
        Ok(())
    }

    pub fn generate(&self) -> Result<TreeMeshes> {
        Seed.grow::<Skeleton>(&self.settings)?
            .grow::<TreeMeshes>(&self.mesh)
    }

    /// Broad leafed tree with three levels of branches and leaves on the fourth.
    pub fn deciduous() -> Self {
        let degrees = |d: f32| d / 180. * PI;
        let depth = |split_amount, flatness, size, pitch, y_values: &[f32], x_max| DepthDefinition {
            split_amount,
            flatness,
            size,
            height_spread: 0.8,
            branch_pitch: degrees(pitch),
            branch_roll: degrees(90.),
            height_to_growth: SmoothCurve::new(y_values.to_vec(), (0., x_max)),
        };
        let settings = Settings::new(1., 1.)
            .with_depth("Branch-A", depth(10., 0., 0.3, 50., &[0., 1.], 0.25))
            .with_depth("Branch-B", depth(6., 0.6, 0.4, 60., &[0.5, 0.9, 1.], 0.5))
            .with_depth("Branch-C", depth(10., 0., 0.4, 40., &[0.5, 0.8, 1., 0.8, 0.5], 0.5))
            .with_depth("Leaf", depth(10., 0., 0.7, 40., &[0.5, 0.8, 1., 0.8, 0.5], 0.5));

        let offset = Vec3::new(16., 16., 0.);
        let instances = [
            (Vec3::new(0., 0., 0.), 1.),
            (Vec3::new(4., 0., 0.), 0.2),
            (Vec3::new(0., 4., 0.), 0.6),
            (Vec3::new(4., 4., 0.), 0.4),
        ]
        .into_iter()
        .map(|(position, growth)| Instance {
            position: position + offset,
            growth,
        })
        .collect();

        Self {
            settings,
            mesh: MeshSettings {
                thickness: 0.05,
                leaves: LeafSettings {
                    split_depth: 4,
                    length: 1.,
                    breadth: 0.3,
                },
            },
            instances,
        }
    }
}
