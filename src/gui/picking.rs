//! Clicking on bodies.
//!
//! Hit testing is done by `bevy_mod_picking`'s raycast backend. Body meshes
//! send a [`BodyClicked`] from their click listener. A left click that hits
//! nothing clears the selection.

use bevy::{
    app::{App, Plugin, Update},
    asset::{Assets, Handle},
    ecs::{
        component::Component,
        entity::Entity,
        event::{Event, EventReader, EventWriter},
        query::Added,
        removal_detection::RemovedComponents,
        schedule::IntoSystemConfigs,
        system::{Commands, Local, Query, Res, ResMut, Resource},
    },
    input::{mouse::MouseButton, Input},
    log::debug,
    math::Vec2,
    pbr::StandardMaterial,
    render::color::Color,
};
use bevy_mod_picking::{focus::HoverMap, pointer::PointerId};

use crate::{
    entities::celestials::{
        celestial::{BodyClicked, BodyId, BodyLink},
        scene_graph::SceneGraph,
    },
    physics::util::clock::FrameSet,
};

use super::{
    camera::input::{InputSnapshot, InputState},
    events::SelectionChanged,
};

/// A press and release further apart than this, in pixels, is a drag
const CLICK_SLOP: f32 = 4.0;

const HIGHLIGHT_EMISSIVE: Color = Color::rgb(0.35, 0.35, 0.35);

/// A left click that didn't land on anything pickable
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptySpaceClicked;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Deselected(BodyId),
    Selected(BodyId),
}

/// The currently picked body
#[derive(Resource, Debug, Default)]
pub struct Selection {
    selected: Option<BodyId>,
}

impl Selection {
    pub fn get(&self) -> Option<BodyId> {
        self.selected
    }

    /// Replaces the selection. Returns what changed, deselection first.
    pub fn select(&mut self, body: Option<BodyId>) -> Vec<SelectionChange> {
        if body == self.selected {
            return Vec::new();
        }
        let mut changes = Vec::with_capacity(2);
        if let Some(previous) = self.selected {
            changes.push(SelectionChange::Deselected(previous));
        }
        if let Some(next) = body {
            changes.push(SelectionChange::Selected(next));
        }
        self.selected = body;
        changes
    }
}

/// Marks the mesh of the selected body
#[derive(Component, Debug, Default)]
pub struct Highlighted;

/// Keeps [`Selection`] in step with clicks and highlights the selected mesh
pub struct PickingPlugin;

impl Plugin for PickingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Selection>();
        app.add_event::<EmptySpaceClicked>();
        app.add_systems(
            Update,
            (
                Self::empty_space_click_system,
                Self::select_on_click_system,
                Self::highlight_selection_system,
            )
                .chain()
                .in_set(FrameSet::Present),
        );
    }
}

/// Bevy Systems
impl PickingPlugin {
    /// Sends [`EmptySpaceClicked`] when a left click without drag hovered nothing.
    /// Pointer input egui took is already dropped from the [`InputSnapshot`].
    fn empty_space_click_system(
        buttons: Res<Input<MouseButton>>,
        snapshot: Res<InputSnapshot>,
        hover_map: Res<HoverMap>,
        mut pressed_at: Local<Option<Vec2>>,
        mut empty_evw: EventWriter<EmptySpaceClicked>,
    ) {
        if buttons.just_pressed(MouseButton::Left) {
            *pressed_at = snapshot.pointer_position();
        }
        if !buttons.just_released(MouseButton::Left) {
            return;
        }
        let (Some(pressed), Some(released)) = (pressed_at.take(), snapshot.pointer_position())
        else {
            return;
        };
        if pressed.distance(released) > CLICK_SLOP {
            return;
        }
        let over_nothing = hover_map
            .get(&PointerId::Mouse)
            .map_or(true, |hits| hits.is_empty());
        if over_nothing {
            empty_evw.send(EmptySpaceClicked);
        }
    }

    /// The first body clicked this frame wins, which is the innermost one.
    /// Clicks released over egui are dropped.
    fn select_on_click_system(
        mut commands: Commands,
        snapshot: Res<InputSnapshot>,
        mut click_evr: EventReader<BodyClicked>,
        mut empty_evr: EventReader<EmptySpaceClicked>,
        bodies: Query<(Entity, &BodyLink)>,
        mut selection: ResMut<Selection>,
        mut selection_evw: EventWriter<SelectionChanged>,
    ) {
        let clicked = click_evr.read().next().copied();
        click_evr.clear();
        let clicked_nothing = empty_evr.read().count() > 0;
        if snapshot.pointer_position().is_none() {
            return;
        }
        let picked = match clicked {
            Some(BodyClicked(entity)) => match bodies.get(entity) {
                Ok((_, link)) => Some(link.0),
                Err(_) => return,
            },
            None if clicked_nothing => None,
            None => return,
        };

        let changes = selection.select(picked);
        if changes.is_empty() {
            return;
        }
        debug!("Picked {:?}", picked);
        for change in changes {
            let (body_id, highlight) = match change {
                SelectionChange::Deselected(body_id) => (body_id, false),
                SelectionChange::Selected(body_id) => (body_id, true),
            };
            for (entity, link) in bodies.iter() {
                if link.0 != body_id {
                    continue;
                }
                if highlight {
                    commands.entity(entity).insert(Highlighted);
                } else {
                    commands.entity(entity).remove::<Highlighted>();
                }
            }
        }
        selection_evw.send(SelectionChanged(picked));
    }

    /// Brightens newly highlighted meshes and restores the rest
    fn highlight_selection_system(
        scene: Res<SceneGraph>,
        added: Query<&Handle<StandardMaterial>, Added<Highlighted>>,
        mut removed: RemovedComponents<Highlighted>,
        bodies: Query<(&BodyLink, &Handle<StandardMaterial>)>,
        mut materials: ResMut<Assets<StandardMaterial>>,
    ) {
        for entity in removed.read() {
            let Ok((link, handle)) = bodies.get(entity) else {
                continue;
            };
            let resting = scene
                .get_body(link.0)
                .filter(|body| body.get_descriptor().emissive)
                .map(|body| body.get_descriptor().color)
                .unwrap_or(Color::BLACK);
            if let Some(material) = materials.get_mut(handle) {
                material.emissive = resting;
            }
        }
        for handle in added.iter() {
            if let Some(material) = materials.get_mut(handle) {
                material.emissive = HIGHLIGHT_EMISSIVE;
            }
        }
    }
}
