//! The transform hierarchy of the scene.
//!
//! Every body gets an orbit pivot placed on its orbit, and a spinning body
//! node under that pivot. Rings and satellite pivots hang off the body node.
//! Relations are index tables, children never hold references to parents.
//! The structure is fixed once composed, only local transforms change.

use std::fmt;

use bevy::{
    ecs::system::Resource,
    math::Vec3,
    transform::components::{GlobalTransform, Transform},
};
use hashbrown::HashMap;

use crate::physics::orbits::{
    kinematics::{orbital_position, SpinState},
    paths::OrbitPath,
};

use super::celestial::{BodyId, CelestialBody};

/// Index of a node in the [`SceneGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    OrbitPivot(BodyId),
    Body(BodyId),
    Ring(BodyId),
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    kind: NodeKind,
    parent: Option<NodeId>,
    local: Transform,
    world: GlobalTransform,
}

impl SceneNode {
    pub fn get_kind(&self) -> NodeKind {
        self.kind
    }
    pub fn get_parent(&self) -> Option<NodeId> {
        self.parent
    }
    pub fn get_local(&self) -> &Transform {
        &self.local
    }
    pub fn get_world(&self) -> &GlobalTransform {
        &self.world
    }
}

/// Everything the graph knows about one body
#[derive(Debug, Clone)]
pub struct BodyEntry {
    descriptor: CelestialBody,
    pivot: NodeId,
    node: NodeId,
    ring: Option<NodeId>,
    guide: Option<OrbitPath>,
    spin: SpinState,
    primary: Option<BodyId>,
}

impl BodyEntry {
    pub fn get_descriptor(&self) -> &CelestialBody {
        &self.descriptor
    }
    pub fn get_name(&self) -> &str {
        &self.descriptor.name
    }
    pub fn get_pivot(&self) -> NodeId {
        self.pivot
    }
    pub fn get_node(&self) -> NodeId {
        self.node
    }
    pub fn get_ring(&self) -> Option<NodeId> {
        self.ring
    }
    pub fn get_guide(&self) -> Option<&OrbitPath> {
        self.guide.as_ref()
    }
    pub fn get_primary(&self) -> Option<BodyId> {
        self.primary
    }
}

/// Problems with a scene description
#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    DuplicateName(String),
    /// The primary doesn't exist, or is declared after its satellite
    UnknownPrimary {
        body: String,
        primary: String,
    },
    NonPositiveRadius(String),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SceneError::DuplicateName(name) => {
                write!(f, "a body named '{}' already exists", name)
            }
            SceneError::UnknownPrimary { body, primary } => write!(
                f,
                "'{}' orbits '{}', which is not declared before it",
                body, primary
            ),
            SceneError::NonPositiveRadius(name) => {
                write!(f, "'{}' must have a positive radius", name)
            }
        }
    }
}

impl std::error::Error for SceneError {}

#[derive(Resource, Debug, Clone)]
pub struct SceneGraph {
    /// Stored parents first, so one forward pass propagates transforms
    nodes: Vec<SceneNode>,
    children: HashMap<NodeId, Vec<NodeId>>,
    bodies: Vec<BodyEntry>,
    satellites: HashMap<BodyId, Vec<BodyId>>,
    names: HashMap<String, BodyId>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub const ROOT: NodeId = NodeId(0);

    /// An empty scene with only the world root
    pub fn new() -> Self {
        Self {
            nodes: vec![SceneNode {
                kind: NodeKind::Root,
                parent: None,
                local: Transform::IDENTITY,
                world: GlobalTransform::IDENTITY,
            }],
            children: HashMap::new(),
            bodies: Vec::new(),
            satellites: HashMap::new(),
            names: HashMap::new(),
        }
    }

    /// Build the hierarchy for all bodies, in order.
    /// Satellites must come after their primary.
    pub fn compose(
        bodies: impl IntoIterator<Item = CelestialBody>,
    ) -> Result<Self, SceneError> {
        let mut graph = Self::new();
        for body in bodies {
            graph.add_body(body)?;
        }
        graph.propagate();
        Ok(graph)
    }

    fn add_node(&mut self, kind: NodeKind, parent: NodeId, local: Transform) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode {
            kind,
            parent: Some(parent),
            local,
            world: GlobalTransform::IDENTITY,
        });
        self.children.entry(parent).or_default().push(id);
        id
    }

    fn add_body(&mut self, descriptor: CelestialBody) -> Result<BodyId, SceneError> {
        if self.names.contains_key(&descriptor.name) {
            return Err(SceneError::DuplicateName(descriptor.name));
        }
        if descriptor.radius.0 <= 0.0 {
            return Err(SceneError::NonPositiveRadius(descriptor.name));
        }
        let primary = match &descriptor.primary {
            Some(primary) => Some(*self.names.get(primary).ok_or_else(|| {
                SceneError::UnknownPrimary {
                    body: descriptor.name.clone(),
                    primary: primary.clone(),
                }
            })?),
            None => None,
        };
        let parent = match primary {
            Some(primary) => self.bodies[primary.0].node,
            None => Self::ROOT,
        };

        let id = BodyId(self.bodies.len());
        let pivot_translation = match &descriptor.orbit {
            Some(orbit) => orbital_position(orbit, 0.0),
            None => descriptor.position,
        };
        let pivot = self.add_node(
            NodeKind::OrbitPivot(id),
            parent,
            Transform::from_translation(pivot_translation),
        );
        let node = self.add_node(NodeKind::Body(id), pivot, Transform::IDENTITY);
        let ring = descriptor
            .ring
            .map(|_| self.add_node(NodeKind::Ring(id), node, Transform::IDENTITY));
        let guide = descriptor.orbit.as_ref().map(OrbitPath::from_orbit);

        if let Some(primary) = primary {
            self.satellites.entry(primary).or_default().push(id);
        }
        self.names.insert(descriptor.name.clone(), id);
        self.bodies.push(BodyEntry {
            descriptor,
            pivot,
            node,
            ring,
            guide,
            spin: SpinState::default(),
            primary,
        });
        Ok(id)
    }

    /// Advance every body by one logic step and recompute world transforms.
    /// `time` is the total simulation time in seconds, `dt` the step length.
    pub fn update(&mut self, time: f64, dt: f32) {
        for body in self.bodies.iter_mut() {
            body.spin.advance(body.descriptor.spin, dt);
            self.nodes[body.node.0].local.rotation = body.spin.rotation();
            if let Some(orbit) = &body.descriptor.orbit {
                self.nodes[body.pivot.0].local.translation = orbital_position(orbit, time);
            }
        }
        self.propagate();
    }

    fn propagate(&mut self) {
        for i in 1..self.nodes.len() {
            let parent = self.nodes[i].parent.unwrap_or(Self::ROOT);
            let world = self.nodes[parent.0].world.mul_transform(self.nodes[i].local);
            self.nodes[i].world = world;
        }
    }
}

/// Getters
impl SceneGraph {
    pub fn get_node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    /// All nodes paired with their ids, parents before children
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (NodeId(idx), node))
    }

    pub fn get_children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get_num_bodies(&self) -> usize {
        self.bodies.len()
    }

    pub fn get_body(&self, id: BodyId) -> Option<&BodyEntry> {
        self.bodies.get(id.0)
    }

    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &BodyEntry)> {
        self.bodies
            .iter()
            .enumerate()
            .map(|(idx, body)| (BodyId(idx), body))
    }

    pub fn find_body(&self, name: &str) -> Option<BodyId> {
        self.names.get(name).copied()
    }

    pub fn get_satellites(&self, id: BodyId) -> &[BodyId] {
        self.satellites.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Where the body currently is in world space
    pub fn body_world_position(&self, id: BodyId) -> Option<Vec3> {
        let body = self.bodies.get(id.0)?;
        Some(self.nodes[body.node.0].world.translation())
    }

    /// The world transform of the space the body's orbit guide is drawn in
    pub fn guide_space(&self, id: BodyId) -> Option<GlobalTransform> {
        let body = self.bodies.get(id.0)?;
        let parent = self.nodes[body.pivot.0].parent.unwrap_or(Self::ROOT);
        Some(self.nodes[parent.0].world)
    }
}
