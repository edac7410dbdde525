use bevy::{
    app::App,
    diagnostic::FrameTimeDiagnosticsPlugin,
    log::{Level, LogPlugin},
    pbr::AmbientLight,
    prelude::{ClearColor, Color, DefaultPlugins, PluginGroup},
    window::{Window, WindowPlugin},
};
use bevy_egui::EguiPlugin;
use bevy_mod_picking::{highlight::DefaultHighlightingPlugin, DefaultPickingPlugins};
use orrery::{
    entities::EntitiesPluginGroup, gui::GuiPluginGroup, physics::PhysicsPluginGroup,
};

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(LogPlugin {
                    level: Level::INFO,
                    filter: "wgpu=error,naga=warn,orrery=debug".to_owned(),
                    ..Default::default()
                })
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Orrery".to_owned(),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
        )
        .add_plugins(EguiPlugin)
        // Selection is highlighted by our own picking plugin
        .add_plugins(DefaultPickingPlugins.build().disable::<DefaultHighlightingPlugin>())
        .add_plugins(FrameTimeDiagnosticsPlugin)
        .insert_resource(ClearColor(Color::BLACK))
        .insert_resource(AmbientLight {
            color: Color::WHITE,
            brightness: 0.05,
        })
        .add_plugins(PhysicsPluginGroup)
        .add_plugins(EntitiesPluginGroup)
        .add_plugins(GuiPluginGroup)
        .run();
}
