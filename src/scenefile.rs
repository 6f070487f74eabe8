//! TOML scene descriptions.
//!
//! ```toml
//! [output]
//! shader = "main"
//! width = 512
//! height = 512
//!
//! [[scalars]]
//! kind = "noise"
//! name = "grain"
//! params = { frequency = 8.0 }
//!
//! [[shaders]]
//! kind = "scalarcolor"
//! name = "main"
//! params = { scalar = "@scalar:grain", low = [0.2, 0.1, 0.0], high = [0.9, 0.7, 0.4] }
//! ```
//!
//! Parameter values map onto [`Value`]s: numbers become floats, three and
//! six element number arrays become points and transforms, strings prefixed
//! with `@scalar:`, `@shader:` or `@texture:` become references, and any
//! other array is appended entry by entry to form a repeated key. Nodes are
//! created in file order, scalars before shaders, so a reference must name
//! a node defined above it.

use crate::color::Rgb;
use crate::error::NodeError;
use crate::geometry::{Plane, Sphere};
use crate::light::{DirectionalLight, Light, Occluder, PointLight, SphereOccluder};
use crate::node::NodeRegistry;
use crate::render::RenderSettings;
use crate::texture::Texture;
use crate::value::{Value, ValueContainer};
use log::{info, warn};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vek::Vec3;

/// A node, light or geometry entry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct NodeDef {
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub params: toml::Table,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct TextureDef {
    pub name: String,
    /// Image file, relative to the scene file.
    pub path: Option<PathBuf>,
    /// Colours of a one row lookup table.
    pub ramp: Option<Vec<[f32; 3]>>,
    /// `[size, square_size]` of a black and white checkerboard.
    pub checkerboard: Option<[usize; 2]>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct OccluderDef {
    pub name: String,
    /// `[x, y, z, radius]` per sphere.
    pub spheres: Vec<[f32; 4]>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SceneFile {
    #[serde(default)]
    pub output: RenderSettings,
    pub geometry: Option<NodeDef>,
    #[serde(default)]
    pub textures: Vec<TextureDef>,
    #[serde(default)]
    pub occluders: Vec<OccluderDef>,
    #[serde(default)]
    pub lights: Vec<NodeDef>,
    #[serde(default)]
    pub scalars: Vec<NodeDef>,
    #[serde(default)]
    pub shaders: Vec<NodeDef>,

    /// Directory relative texture paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// A registry built from a scene file, plus the problems that did not stop
/// the build.
pub struct LoadedScene {
    pub registry: NodeRegistry,
    pub output: RenderSettings,
    /// Nodes defined with missing required children.
    pub warnings: Vec<NodeError>,
}

impl SceneFile {
    pub fn parse(toml_content: &str) -> Result<Self, NodeError> {
        toml::from_str(toml_content).map_err(|err| NodeError::SceneFile(err.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut scene = Self::parse(&content)?;
        scene.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(scene)
    }

    /// Creates a registry holding every resource and node of the scene.
    pub fn build(&self) -> Result<LoadedScene, NodeError> {
        let mut registry = NodeRegistry::new();
        let mut warnings = vec![];

        if let Some(geometry) = &self.geometry {
            let params = to_container(&geometry.params)?;
            match geometry.kind.as_str() {
                "plane" => registry.set_geometry(Arc::new(Plane::new(
                    params.get_vec3_default("origin", Vec3::zero()),
                    params.get_vec3_default("edge_u", Vec3::unit_x()),
                    params.get_vec3_default("edge_v", Vec3::unit_y()),
                ))),
                "sphere" => registry.set_geometry(Arc::new(Sphere::new(
                    params.get_vec3_default("center", Vec3::zero()),
                    params.get_float_default("radius", 1.0),
                ))),
                kind => {
                    return Err(NodeError::UnknownKind {
                        kind: kind.to_string(),
                    });
                }
            }
        }

        for def in &self.textures {
            registry.add_texture(&def.name, self.texture(def)?);
        }

        let mut occluders: FxHashMap<&str, Arc<dyn Occluder>> = FxHashMap::default();
        for def in &self.occluders {
            let spheres = def
                .spheres
                .iter()
                .map(|[x, y, z, r]| (Vec3::new(*x, *y, *z), *r))
                .collect();
            occluders.insert(&def.name, Arc::new(SphereOccluder::new(spheres)));
        }

        for def in &self.lights {
            let params = to_container(&def.params)?;
            let occluder = match params.get_str("occluder") {
                Some(name) => Some(occluders.get(name).cloned().ok_or_else(|| {
                    NodeError::SceneFile(format!("light references unknown occluder '{}'", name))
                })?),
                None => None,
            };
            let light: Arc<dyn Light> = match def.kind.as_str() {
                "point" => {
                    let light = PointLight::from_params(&params);
                    Arc::new(match occluder {
                        Some(o) => light.with_occluder(o),
                        None => light,
                    })
                }
                "directional" => {
                    let light = DirectionalLight::from_params(&params);
                    Arc::new(match occluder {
                        Some(o) => light.with_occluder(o),
                        None => light,
                    })
                }
                kind => {
                    return Err(NodeError::UnknownKind {
                        kind: kind.to_string(),
                    });
                }
            };
            registry.add_light(light);
        }

        for def in &self.scalars {
            let params = to_container(&def.params)?;
            match registry.define_scalar(&def.kind, &def.name, &params) {
                Err(err @ NodeError::MissingChild { .. }) => warnings.push(err),
                other => other?,
            }
        }
        for def in &self.shaders {
            let params = to_container(&def.params)?;
            match registry.define_shader(&def.kind, &def.name, &params) {
                Err(err @ NodeError::MissingChild { .. }) => warnings.push(err),
                other => other?,
            }
        }

        info!(
            "scene: {} scalars, {} shaders, {} lights",
            self.scalars.len(),
            self.shaders.len(),
            self.lights.len()
        );
        Ok(LoadedScene {
            registry,
            output: self.output.clone(),
            warnings,
        })
    }

    fn texture(&self, def: &TextureDef) -> Result<Texture, NodeError> {
        if let Some(path) = &def.path {
            return Texture::from_image(self.base_dir.join(path));
        }
        if let Some(ramp) = &def.ramp {
            let colors: Vec<Rgb> = ramp.iter().map(|c| Vec3::from(*c)).collect();
            return Ok(Texture::ramp(&colors));
        }
        if let Some([size, square]) = def.checkerboard {
            return Ok(Texture::checkerboard(size, square));
        }
        warn!("texture '{}' has no source, using plain white", def.name);
        Ok(Texture::default())
    }
}

/// Converts one TOML parameter value.
pub fn to_value(value: &toml::Value) -> Result<Value, NodeError> {
    match value {
        toml::Value::Boolean(b) => Ok(Value::Bool(*b)),
        toml::Value::Integer(i) => Ok(Value::Float(*i as f32)),
        toml::Value::Float(f) => Ok(Value::Float(*f as f32)),
        toml::Value::String(s) => Ok(reference(s)),
        toml::Value::Array(array) => {
            let numbers: Option<Vec<f32>> = array.iter().map(number).collect();
            match numbers.as_deref() {
                Some([x, y, z]) => Ok(Value::Vec3([*x, *y, *z])),
                Some([a, b, c, d, e, f]) => Ok(Value::Transform([*a, *b, *c, *d, *e, *f])),
                Some([v]) => Ok(Value::Float(*v)),
                _ => Ok(Value::List(
                    array.iter().map(to_value).collect::<Result<_, _>>()?,
                )),
            }
        }
        other => Err(NodeError::SceneFile(format!(
            "unsupported parameter value '{}'",
            other
        ))),
    }
}

/// Converts a parameter table. Arrays that are not points or transforms
/// become repeated keys.
pub fn to_container(table: &toml::Table) -> Result<ValueContainer, NodeError> {
    let mut params = ValueContainer::new();
    for (key, value) in table {
        match to_value(value)? {
            Value::List(entries) => {
                for entry in entries {
                    params.append(key, entry);
                }
            }
            value => params.set(key, value),
        }
    }
    Ok(params)
}

fn number(value: &toml::Value) -> Option<f32> {
    match value {
        toml::Value::Integer(i) => Some(*i as f32),
        toml::Value::Float(f) => Some(*f as f32),
        _ => None,
    }
}

fn reference(s: &str) -> Value {
    if let Some(name) = s.strip_prefix("@scalar:") {
        Value::Scalar(name.into())
    } else if let Some(name) = s.strip_prefix("@shader:") {
        Value::Shader(name.into())
    } else if let Some(name) = s.strip_prefix("@texture:") {
        Value::Texture(name.into())
    } else {
        Value::Str(s.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render_plane;

    const SCENE: &str = r#"
[output]
shader = "main"
width = 4
height = 4

[[textures]]
name = "lut"
ramp = [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]

[[occluders]]
name = "ball"
spheres = [[0.0, 0.0, 5.0, 1.0]]

[[lights]]
kind = "directional"
params = { direction = [0.0, 0.0, -1.0], occluder = "ball" }

[[scalars]]
kind = "check"
name = "board"
params = { sfreq = 4, tfreq = 4 }

[[shaders]]
kind = "color"
name = "red"
params = { color = [1.0, 0.0, 0.0] }

[[shaders]]
kind = "color"
name = "blue"
params = { color = [0.0, 0.0, 1.0] }

[[shaders]]
kind = "select"
name = "main"
params = { selector = "@scalar:board", shader = ["@shader:red", "@shader:blue"] }
"#;

    #[test]
    fn test_parameter_conversion() {
        let table: toml::Table = toml::from_str(
            r#"
            freq = 3
            flag = "yes"
            on = true
            center = [0.5, 0.5, 0]
            xf = [1, 0, 0, 0, 1, 0]
            child = "@scalar:noise"
            colors = [[1, 0, 0], [0, 1, 0]]
            shader = ["@shader:a", "@shader:b"]
            "#,
        )
        .unwrap();
        let params = to_container(&table).unwrap();
        assert_eq!(params.get_float("freq"), Some(3.0));
        assert_eq!(params.get_bool("flag"), Some(true));
        assert_eq!(params.get_bool("on"), Some(true));
        assert_eq!(params.get_vec3("center"), Some(Vec3::new(0.5, 0.5, 0.0)));
        assert_eq!(params.get_transform("xf"), Some([1.0, 0.0, 0.0, 0.0, 1.0, 0.0]));
        assert_eq!(params.get_scalar_ref("child"), Some("noise"));
        assert_eq!(params.get_list("colors").len(), 2);
        assert_eq!(
            params.get_list("shader"),
            vec![&Value::Shader("a".into()), &Value::Shader("b".into())]
        );
    }

    #[test]
    fn test_build_and_render() {
        let scene = SceneFile::parse(SCENE).unwrap();
        assert_eq!(scene.output, RenderSettings::new("main", 4, 4));
        let loaded = scene.build().unwrap();
        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.registry.lights().len(), 1);
        assert!(loaded.registry.texture("lut").is_some());

        let buffer = render_plane(&loaded.registry, &loaded.output).unwrap();
        // Bottom-left pixel is tile (0, 0): selector 0 picks red.
        let i = 3 * 4 * 4;
        assert_eq!(&buffer[i..i + 4], &[255, 0, 0, 255]);
        // Its right neighbour is tile (1, 0): selector 1 picks blue.
        assert_eq!(&buffer[i + 4..i + 8], &[0, 0, 255, 255]);
    }

    #[test_log::test]
    fn test_demo_scene_builds() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/snr/scenes/demo.toml");
        let scene = SceneFile::load(path).unwrap();
        let loaded = scene.build().unwrap();
        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.registry.lights().len(), 2);

        let settings = RenderSettings::new(&loaded.output.shader, 8, 8);
        let buffer = render_plane(&loaded.registry, &settings).unwrap();
        assert!(buffer.chunks_exact(4).all(|p| p[3] == 255));
    }

    #[test_log::test]
    fn test_missing_child_is_a_warning() {
        let scene = SceneFile::parse(
            r#"
            [[scalars]]
            kind = "quantized"
            name = "q"
            "#,
        )
        .unwrap();
        let loaded = scene.build().unwrap();
        assert_eq!(loaded.warnings.len(), 1);
        assert!(matches!(loaded.warnings[0], NodeError::MissingChild { .. }));
        assert!(loaded.registry.scalar("q").is_some());
    }

    #[test]
    fn test_fatal_errors() {
        let unknown = SceneFile::parse(
            r#"
            [[shaders]]
            kind = "teapot"
            name = "x"
            "#,
        )
        .unwrap();
        assert!(matches!(unknown.build(), Err(NodeError::UnknownKind { .. })));

        let occluder = SceneFile::parse(
            r#"
            [[lights]]
            kind = "point"
            params = { occluder = "nowhere" }
            "#,
        )
        .unwrap();
        assert!(matches!(occluder.build(), Err(NodeError::SceneFile(_))));

        assert!(matches!(
            SceneFile::parse("output = 3"),
            Err(NodeError::SceneFile(_))
        ));
    }
}
