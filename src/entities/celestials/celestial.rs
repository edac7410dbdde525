use bevy::app::{App, Plugin, Startup, Update};
use bevy::asset::Assets;
use bevy::ecs::component::Component;
use bevy::ecs::entity::Entity;
use bevy::ecs::schedule::IntoSystemConfigs;
use bevy::ecs::system::{Commands, Query, Res, ResMut};
use bevy::prelude::*;
use bevy::render::mesh::{shape, Mesh};
use bevy_eventlistener::callbacks::ListenerInput;
use bevy_eventlistener::event_listener::On;
use bevy_mod_picking::events::{Click, Pointer};
use bevy_mod_picking::PickableBundle;
use hashbrown::HashMap;

use crate::physics::orbits::components::{Length, OrbitDescriptor, RingDescriptor, Spin};
use crate::physics::util::clock::{FrameSet, LogicSet, LogicStep, LogicTick};

use super::builder::SolarSystemConfig;
use super::scene_graph::{NodeId, NodeKind, SceneGraph};

/// Index of a body in composition order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub usize);

impl BodyId {
    /// Gets the next index, wrapping around
    pub fn next(&self, nb_bodies: usize) -> BodyId {
        if nb_bodies == 0 {
            return *self;
        }
        BodyId((self.0 + 1) % nb_bodies)
    }

    /// Gets the previous index, wrapping around
    pub fn prev(&self, nb_bodies: usize) -> BodyId {
        if nb_bodies == 0 {
            return *self;
        }
        if self.0 == 0 || self.0 >= nb_bodies {
            BodyId(nb_bodies - 1)
        } else {
            BodyId(self.0 - 1)
        }
    }
}

/// Static description of a body.
/// Built with [`super::builder::CelestialBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct CelestialBody {
    pub name: String,
    pub radius: Length,
    pub spin: Spin,
    /// Bodies without an orbit sit at `position` forever
    pub orbit: Option<OrbitDescriptor>,
    pub ring: Option<RingDescriptor>,
    /// Name of the body this one is a satellite of
    pub primary: Option<String>,
    pub position: Vec3,
    pub color: Color,
    /// Emissive bodies are unlit and carry a point light
    pub emissive: bool,
}

/// Links an entity to the scene graph node it mirrors
#[derive(Component, Debug, Clone, Copy)]
pub struct SceneNodeLink(pub NodeId);

/// Put this alongside the mesh of a body
#[derive(Component, Debug, Clone, Copy)]
pub struct BodyLink(pub BodyId);

/// The top of the mirrored hierarchy
#[derive(Component, Debug, Clone, Copy)]
pub struct SceneRoot;

/// A body mesh was clicked. Holds the entity carrying the [`BodyLink`].
/// Clicks bubble up the hierarchy, so a satellite click is followed by one for its primary.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyClicked(pub Entity);

impl From<ListenerInput<Pointer<Click>>> for BodyClicked {
    fn from(event: ListenerInput<Pointer<Click>>) -> Self {
        Self(event.listener())
    }
}

/// Composes the [`SceneGraph`] from the [`SolarSystemConfig`] and mirrors it into the world
pub struct CelestialPlugin;

impl Plugin for CelestialPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world
            .get_resource::<SolarSystemConfig>()
            .cloned()
            .unwrap_or_default();
        let scene = match SceneGraph::compose(config.bodies) {
            Ok(scene) => {
                info!("Composed scene with {} bodies", scene.get_num_bodies());
                scene
            }
            Err(err) => {
                error!("Invalid solar system: {}", err);
                SceneGraph::new()
            }
        };
        app.insert_resource(scene);
        app.add_event::<BodyClicked>();
        app.add_systems(Startup, Self::spawn_scene_system);
        app.add_systems(
            LogicTick,
            Self::advance_scene_system.in_set(LogicSet::Kinematics),
        );
        app.add_systems(
            Update,
            (Self::sync_transforms_system, Self::draw_orbit_guides_system)
                .in_set(FrameSet::Present),
        );
    }
}

/// Bevy Systems
impl CelestialPlugin {
    /// Spawns one entity per scene node, parented the same way as in the graph
    pub fn spawn_scene_system(
        mut commands: Commands,
        scene: Res<SceneGraph>,
        mut meshes: ResMut<Assets<Mesh>>,
        mut materials: ResMut<Assets<StandardMaterial>>,
    ) {
        let mut entities: HashMap<NodeId, Entity> = HashMap::new();
        for (node_id, node) in scene.nodes() {
            let transform = *node.get_local();
            let entity = match node.get_kind() {
                NodeKind::Root => commands
                    .spawn((SpatialBundle::default(), SceneRoot, Name::new("scene root")))
                    .id(),
                NodeKind::OrbitPivot(body_id) => {
                    let name = scene
                        .get_body(body_id)
                        .map(|body| body.get_name())
                        .unwrap_or_default();
                    commands
                        .spawn((
                            SpatialBundle {
                                transform,
                                ..Default::default()
                            },
                            Name::new(format!("{} pivot", name)),
                        ))
                        .id()
                }
                NodeKind::Body(body_id) => {
                    let Some(body) = scene.get_body(body_id) else {
                        continue;
                    };
                    let descriptor = body.get_descriptor();
                    let material = StandardMaterial {
                        base_color: descriptor.color,
                        emissive: if descriptor.emissive {
                            descriptor.color
                        } else {
                            Color::BLACK
                        },
                        unlit: descriptor.emissive,
                        ..Default::default()
                    };
                    let mut body_entity = commands.spawn((
                        PbrBundle {
                            mesh: meshes.add(Mesh::from(shape::UVSphere {
                                radius: descriptor.radius.0,
                                sectors: 48,
                                stacks: 24,
                            })),
                            material: materials.add(material),
                            transform,
                            ..Default::default()
                        },
                        BodyLink(body_id),
                        Name::new(descriptor.name.clone()),
                        PickableBundle::default(),
                        On::<Pointer<Click>>::send_event::<BodyClicked>(),
                    ));
                    if descriptor.emissive {
                        body_entity.with_children(|parent| {
                            parent.spawn(PointLightBundle {
                                point_light: PointLight {
                                    intensity: 2_000_000.0,
                                    range: 1_000.0,
                                    shadows_enabled: false,
                                    ..Default::default()
                                },
                                ..Default::default()
                            });
                        });
                    }
                    body_entity.id()
                }
                NodeKind::Ring(body_id) => {
                    let Some(body) = scene.get_body(body_id) else {
                        continue;
                    };
                    let Some(ring) = body.get_descriptor().ring else {
                        continue;
                    };
                    // Flatten the torus into a disc-like ring
                    let transform = transform.with_scale(Vec3::new(1.0, 0.05, 1.0));
                    commands
                        .spawn((
                            PbrBundle {
                                mesh: meshes.add(Mesh::from(shape::Torus {
                                    radius: ring.mid_radius().0,
                                    ring_radius: ring.half_width().0,
                                    subdivisions_segments: 64,
                                    subdivisions_sides: 16,
                                })),
                                material: materials.add(StandardMaterial {
                                    base_color: body.get_descriptor().color.with_a(0.7),
                                    alpha_mode: AlphaMode::Blend,
                                    double_sided: true,
                                    cull_mode: None,
                                    ..Default::default()
                                }),
                                transform,
                                ..Default::default()
                            },
                            Name::new(format!("{} ring", body.get_name())),
                        ))
                        .id()
                }
            };
            commands.entity(entity).insert(SceneNodeLink(node_id));
            if let Some(parent_entity) = node.get_parent().and_then(|parent| entities.get(&parent)) {
                commands.entity(entity).set_parent(*parent_entity);
            }
            entities.insert(node_id, entity);
        }
        debug!("Spawned {} scene entities", entities.len());
    }

    /// Moves every body by one logic step
    pub fn advance_scene_system(step: Res<LogicStep>, mut scene: ResMut<SceneGraph>) {
        if !step.simulating {
            return;
        }
        scene.update(step.time_secs(), step.dt);
    }

    /// Copies the graph's local transforms onto the mirrored entities.
    /// Scale is left alone so meshes can be flattened or resized.
    pub fn sync_transforms_system(
        scene: Res<SceneGraph>,
        mut nodes: Query<(&SceneNodeLink, &mut Transform)>,
    ) {
        if !scene.is_changed() {
            return;
        }
        for (link, mut transform) in nodes.iter_mut() {
            if let Some(node) = scene.get_node(link.0) {
                let local = node.get_local();
                transform.translation = local.translation;
                transform.rotation = local.rotation;
            }
        }
    }

    /// Draws each orbit guide in the space of the body's orbit pivot parent
    pub fn draw_orbit_guides_system(scene: Res<SceneGraph>, mut gizmos: Gizmos) {
        let color = Color::rgba(1.0, 1.0, 1.0, 0.2);
        for (body_id, body) in scene.bodies() {
            let (Some(guide), Some(space)) = (body.get_guide(), scene.guide_space(body_id)) else {
                continue;
            };
            for (start, end) in guide.segments() {
                gizmos.line(space.transform_point(start), space.transform_point(end), color);
            }
        }
    }
}
