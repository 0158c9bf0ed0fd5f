use galaxy_generator::app::AppState;
use galaxy_generator::config::GalaxyConfig;
use galaxy_generator::galaxy::GalaxyGenerator;
use galaxy_generator::panel::{Field, ParameterPanel};
use galaxy_generator::scene::PointScene;

fn app_from_config(source: &str) -> (AppState, PointScene) {
    let config = GalaxyConfig::from_toml_str(source).unwrap();
    let app = AppState::new(config.galaxy, GalaxyGenerator::new(config.seed));
    (app, PointScene::new())
}

#[test]
fn test_config_to_scene() {
    let (mut app, mut scene) = app_from_config("seed = 3\n[galaxy]\ncount = 400\n");
    let id = app.regenerate(&mut scene);

    let cloud = scene.get(id).unwrap();
    assert_eq!(cloud.field.len(), 400);
    assert_eq!(cloud.field.positions().len(), 1_200);
    assert_eq!(cloud.field.colors().len(), 1_200);
}

#[test]
fn test_seeded_runs_match() {
    let source = "seed = 11\n[galaxy]\ncount = 300\n";
    let (mut app_a, mut scene_a) = app_from_config(source);
    let (mut app_b, mut scene_b) = app_from_config(source);

    let a = app_a.regenerate(&mut scene_a);
    let b = app_b.regenerate(&mut scene_b);

    assert_eq!(scene_a.get(a).unwrap().field, scene_b.get(b).unwrap().field);
}

#[test]
fn test_panel_edit_cycle() {
    let (mut app, mut scene) = app_from_config("seed = 5\n[galaxy]\ncount = 1000\n");
    let mut panel = ParameterPanel::new();
    app.regenerate(&mut scene);

    while panel.selected().field != Field::Count {
        panel.select_next();
    }

    // Simulate a held key: several intermediate edits, one commit.
    for _ in 0..4 {
        panel.adjust(&mut app.params, 1);
    }
    let before = app.current();
    panel.finish_change(|| {
        app.regenerate(&mut scene);
    });

    assert_ne!(app.current(), before);
    assert_eq!(scene.attached_count(), 1);
    let current = app.current().unwrap();
    assert_eq!(scene.get(current).unwrap().field.len(), 1_400);
}

#[test]
fn test_many_frames_keep_single_drawable() {
    let (mut app, mut scene) = app_from_config("[galaxy]\ncount = 200\n");
    app.regenerate(&mut scene);

    for frame in 0..120 {
        app.tick(&mut scene, frame as f32 / 60.0);
        if frame % 30 == 0 {
            app.regenerate(&mut scene);
        }
    }

    assert_eq!(scene.attached_count(), 1);
    assert_eq!(scene.live_count(), 1);
    let rotation = scene.get(app.current().unwrap()).unwrap().rotation;
    assert!(rotation.y < 0.0, "positive spin rotates toward negative y");
}
