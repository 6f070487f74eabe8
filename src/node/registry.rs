use crate::error::NodeError;
use crate::geometry::Geometry;
use crate::light::Light;
use crate::node::{ScalarNode, ShaderNode};
use crate::texture::Texture;
use crate::value::{Value, ValueContainer};
use indexmap::IndexMap;
use log::{debug, warn};
use rustc_hash::FxHashMap;
use std::sync::Arc;

pub type ScalarFactory = fn() -> Box<dyn ScalarNode>;
pub type ShaderFactory = fn() -> Box<dyn ShaderNode>;

/// Owns every configured node of a scene together with the shared scene
/// resources (textures, lights, default geometry).
///
/// Nodes are looked up by name. Lookups hand out clones of the canonical
/// instance, so every consumer owns a private copy it can evaluate without
/// coordinating with anybody else. Definitions must come after the nodes they
/// reference, which keeps the graph acyclic.
pub struct NodeRegistry {
    scalar_kinds: IndexMap<&'static str, ScalarFactory>,
    shader_kinds: IndexMap<&'static str, ShaderFactory>,

    scalars: IndexMap<String, Box<dyn ScalarNode>>,
    shaders: IndexMap<String, Box<dyn ShaderNode>>,

    textures: FxHashMap<String, Arc<Texture>>,
    lights: Vec<Arc<dyn Light>>,
    geometry: Option<Arc<dyn Geometry>>,
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeRegistry {
    /// A registry with all built-in node kinds registered.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        crate::scalar::register_builtins(&mut registry);
        crate::shader::register_builtins(&mut registry);
        registry
    }

    /// A registry without any node kinds.
    pub fn empty() -> Self {
        Self {
            scalar_kinds: IndexMap::new(),
            shader_kinds: IndexMap::new(),
            scalars: IndexMap::new(),
            shaders: IndexMap::new(),
            textures: FxHashMap::default(),
            lights: vec![],
            geometry: None,
        }
    }

    pub fn register_scalar_kind(&mut self, kind: &'static str, factory: ScalarFactory) {
        self.scalar_kinds.insert(kind, factory);
    }

    pub fn register_shader_kind(&mut self, kind: &'static str, factory: ShaderFactory) {
        self.shader_kinds.insert(kind, factory);
    }

    /// Names of all registered scalar kinds, in registration order.
    pub fn scalar_kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.scalar_kinds.keys().copied()
    }

    /// Names of all registered shader kinds, in registration order.
    pub fn shader_kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.shader_kinds.keys().copied()
    }

    /// A fresh, unconfigured scalar node of the given kind.
    pub fn create_scalar(&self, kind: &str) -> Result<Box<dyn ScalarNode>, NodeError> {
        self.scalar_kinds
            .get(kind)
            .map(|factory| factory())
            .ok_or_else(|| NodeError::UnknownKind { kind: kind.into() })
    }

    /// A fresh, unconfigured shader node of the given kind.
    pub fn create_shader(&self, kind: &str) -> Result<Box<dyn ShaderNode>, NodeError> {
        self.shader_kinds
            .get(kind)
            .map(|factory| factory())
            .ok_or_else(|| NodeError::UnknownKind { kind: kind.into() })
    }

    /// Creates, configures and stores a scalar node under `name`.
    ///
    /// A node with unresolved required children is still stored, so that a
    /// render can proceed with the node's fallback, but the first missing
    /// child is reported as [`NodeError::MissingChild`].
    pub fn define_scalar(
        &mut self,
        kind: &str,
        name: &str,
        params: &ValueContainer,
    ) -> Result<(), NodeError> {
        self.check_free(name)?;
        let mut node = self.create_scalar(kind)?;
        node.set(params, self);
        let missing = node.missing_children();
        debug!("defined scalar '{}' ({})", name, kind);
        self.scalars.insert(name.to_string(), node);
        Self::report_missing(name, missing)
    }

    /// Creates, configures and stores a shader node under `name`. See
    /// [`NodeRegistry::define_scalar`] for the handling of missing children.
    pub fn define_shader(
        &mut self,
        kind: &str,
        name: &str,
        params: &ValueContainer,
    ) -> Result<(), NodeError> {
        self.check_free(name)?;
        let mut node = self.create_shader(kind)?;
        node.set(params, self);
        let missing = node.missing_children();
        debug!("defined shader '{}' ({})", name, kind);
        self.shaders.insert(name.to_string(), node);
        Self::report_missing(name, missing)
    }

    /// Stores an already configured scalar node.
    pub fn insert_scalar(&mut self, name: &str, node: Box<dyn ScalarNode>) {
        self.scalars.insert(name.to_string(), node);
    }

    /// Stores an already configured shader node.
    pub fn insert_shader(&mut self, name: &str, node: Box<dyn ShaderNode>) {
        self.shaders.insert(name.to_string(), node);
    }

    /// A private clone of the named scalar node.
    pub fn scalar(&self, name: &str) -> Option<Box<dyn ScalarNode>> {
        self.scalars.get(name).cloned()
    }

    /// A private clone of the named shader node.
    pub fn shader(&self, name: &str) -> Option<Box<dyn ShaderNode>> {
        self.shaders.get(name).cloned()
    }

    pub fn scalar_names(&self) -> impl Iterator<Item = &str> {
        self.scalars.keys().map(|k| k.as_str())
    }

    pub fn shader_names(&self) -> impl Iterator<Item = &str> {
        self.shaders.keys().map(|k| k.as_str())
    }

    pub fn add_texture(&mut self, name: &str, texture: Texture) {
        self.textures.insert(name.to_string(), Arc::new(texture));
    }

    pub fn texture(&self, name: &str) -> Option<Arc<Texture>> {
        self.textures.get(name).cloned()
    }

    pub fn add_light(&mut self, light: Arc<dyn Light>) {
        self.lights.push(light);
    }

    pub fn lights(&self) -> &[Arc<dyn Light>] {
        &self.lights
    }

    pub fn set_geometry(&mut self, geometry: Arc<dyn Geometry>) {
        self.geometry = Some(geometry);
    }

    pub fn geometry(&self) -> Option<Arc<dyn Geometry>> {
        self.geometry.clone()
    }

    /// Resolves a scalar reference stored under `key`.
    pub fn resolve_scalar(
        &self,
        params: &ValueContainer,
        key: &str,
    ) -> Option<Box<dyn ScalarNode>> {
        let name = params.get_scalar_ref(key)?;
        let node = self.scalar(name);
        if node.is_none() {
            warn!("'{}' references unknown scalar '{}'", key, name);
        }
        node
    }

    /// Resolves a shader reference stored under `key`.
    pub fn resolve_shader(
        &self,
        params: &ValueContainer,
        key: &str,
    ) -> Option<Box<dyn ShaderNode>> {
        let name = params.get_shader_ref(key)?;
        let node = self.shader(name);
        if node.is_none() {
            warn!("'{}' references unknown shader '{}'", key, name);
        }
        node
    }

    /// Resolves every shader reference of a repeated key, in order.
    /// Unknown names and non-shader entries are skipped.
    pub fn resolve_shader_list(
        &self,
        params: &ValueContainer,
        key: &str,
    ) -> Vec<Box<dyn ShaderNode>> {
        params
            .get_list(key)
            .into_iter()
            .filter_map(|v| match v {
                Value::Shader(name) => {
                    let node = self.shader(name);
                    if node.is_none() {
                        warn!("'{}' references unknown shader '{}'", key, name);
                    }
                    node
                }
                _ => None,
            })
            .collect()
    }

    /// Resolves a texture reference stored under `key`.
    pub fn resolve_texture(&self, params: &ValueContainer, key: &str) -> Option<Arc<Texture>> {
        let name = params.get_texture_ref(key)?;
        let texture = self.texture(name);
        if texture.is_none() {
            warn!("'{}' references unknown texture '{}'", key, name);
        }
        texture
    }

    fn check_free(&self, name: &str) -> Result<(), NodeError> {
        if self.scalars.contains_key(name) || self.shaders.contains_key(name) {
            return Err(NodeError::DuplicateName { name: name.into() });
        }
        Ok(())
    }

    fn report_missing(name: &str, missing: Vec<&'static str>) -> Result<(), NodeError> {
        match missing.first() {
            Some(key) => {
                warn!("node '{}' is missing required child '{}'", name, key);
                Err(NodeError::MissingChild {
                    node: name.into(),
                    key: (*key).into(),
                })
            }
            None => Ok(()),
        }
    }
}
