use std::fs;
use std::path::Path;
use std::time::Duration;

use agent_runtime::{Archetype, EngineConfig, GroupId};
use nav_content::{ConfigLoader, ContentFactory, GridLoader, ScenarioLoader};
use nav_core::{Heuristic, Position};
use tempfile::tempdir;

fn write(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn text_and_ron_maps_describe_the_same_grid() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", "....\n.##.\n....\n");
    write(
        dir.path(),
        "b.ron",
        "(dimensions: (4, 3), blocked: [(1, 1), (2, 1)])",
    );

    let text = GridLoader::load(&dir.path().join("a.txt")).unwrap();
    let ron = GridLoader::load(&dir.path().join("b.ron")).unwrap();

    assert_eq!(text, ron);
    assert_eq!(text.walkable_count(), 10);
    assert!(!ron.is_walkable(Position::new(2, 1)));
}

#[test]
fn map_errors_name_the_file() {
    let dir = tempdir().unwrap();
    write(dir.path(), "ragged.txt", "...\n..\n");
    write(dir.path(), "outside.ron", "(dimensions: (2, 2), blocked: [(5, 0)])");

    let ragged = GridLoader::load(&dir.path().join("ragged.txt")).unwrap_err();
    assert!(ragged.to_string().contains("ragged.txt"), "{ragged}");

    let outside = GridLoader::load(&dir.path().join("outside.ron")).unwrap_err();
    assert!(outside.to_string().contains("outside.ron"), "{outside}");

    let missing = GridLoader::load(&dir.path().join("nope.txt")).unwrap_err();
    assert!(missing.to_string().contains("nope.txt"), "{missing}");
}

#[test]
fn partial_config_keeps_defaults() {
    let config = ConfigLoader::from_toml(
        r#"
        smooth_paths = false
        seed = 7

        [search]
        heuristic = "euclidean"
        allow_diagonals = false

        [cache]
        ttl_ms = 1000

        [guard]
        detection_radius = 12.5
        think_interval_ms = 50
        "#,
    )
    .unwrap();

    assert!(!config.smooth_paths);
    assert_eq!(config.seed, 7);
    assert_eq!(config.search.heuristic, Heuristic::Euclidean);
    assert!(!config.search.allow_diagonals);
    assert_eq!(config.cache.ttl(), Duration::from_millis(1000));
    assert_eq!(config.cache.max_entries, 256);
    assert_eq!(config.guard.detection_radius, 12.5);
    assert_eq!(config.guard.think_interval(), Duration::from_millis(50));
    assert_eq!(config.hunter.detection_radius, 10.0);
}

#[test]
fn config_errors_name_the_file() {
    let dir = tempdir().unwrap();
    write(dir.path(), "bad.toml", "seed = \"lots\"");
    let error = ConfigLoader::load(&dir.path().join("bad.toml")).unwrap_err();
    assert!(error.to_string().contains("bad.toml"), "{error}");
}

#[test]
fn scenario_parses_spawn_options() {
    let scenario = ScenarioLoader::from_ron(
        r#"(
            map: Some("yard"),
            spawns: [
                (archetype: guard, position: (1, 1), group: Some(2), route: [(1, 1), (5, 1)]),
                (archetype: preserver, position: (6, 6), speed: Some(3.0), anchor: Some((7, 7))),
                (archetype: custom(4), position: (0, 0)),
            ],
            subject: Some((position: (4.5, 2.0), dangerous: true)),
        )"#,
    )
    .unwrap();

    assert_eq!(scenario.map.as_deref(), Some("yard"));
    assert_eq!(scenario.spawns.len(), 3);

    let guard = scenario.spawns[0].options();
    assert_eq!(guard.group, Some(GroupId(2)));
    assert_eq!(guard.route, vec![Position::new(1, 1), Position::new(5, 1)]);

    let preserver = &scenario.spawns[1];
    assert_eq!(preserver.archetype, Archetype::Preserver);
    assert_eq!(preserver.options().speed, Some(3.0));
    assert_eq!(preserver.options().anchor, Some(Position::new(7, 7)));

    assert_eq!(scenario.spawns[2].archetype, Archetype::Custom(4));
    assert!(scenario.subject.is_some_and(|subject| subject.dangerous));
}

#[test]
fn factory_builds_a_running_controller() {
    let dir = tempdir().unwrap();
    write(dir.path(), "maps/yard.txt", &"..........\n".repeat(10));
    write(dir.path(), "config.toml", "[merchant]\nthink_interval_ms = 100\n");
    write(
        dir.path(),
        "scenarios/market.ron",
        r#"(
            map: Some("yard"),
            spawns: [
                (archetype: merchant, position: (2, 2), route: [(2, 2), (7, 7)]),
                (archetype: guard, position: (8, 1)),
                (archetype: custom(9), position: (5, 5)),
            ],
        )"#,
    );

    let factory = ContentFactory::new(dir.path());
    let mut controller = factory.build("market").unwrap();

    // The custom archetype has no behavior and is skipped.
    assert_eq!(controller.len(), 2);
    assert_eq!(controller.config().merchant.think_interval_ms, 100);
    assert!(controller.subject().is_none());

    for _ in 0..20 {
        controller.update(Duration::from_millis(100));
    }
    assert_eq!(controller.now(), Duration::from_secs(2));
}

#[test]
fn factory_prefers_ron_maps_and_tolerates_missing_config() {
    let dir = tempdir().unwrap();
    write(dir.path(), "maps/arena.ron", "(dimensions: (6, 4))");
    write(dir.path(), "maps/arena.txt", "..\n..");

    let factory = ContentFactory::new(dir.path());
    let grid = factory.load_map("arena").unwrap();
    assert_eq!((grid.width(), grid.height()), (6, 4));
    assert_eq!(factory.load_config().unwrap(), EngineConfig::default());
}

#[test]
fn scenario_without_map_cannot_be_built_by_name() {
    let dir = tempdir().unwrap();
    write(dir.path(), "scenarios/empty.ron", "(spawns: [])");
    let factory = ContentFactory::new(dir.path());
    assert!(factory.build("empty").is_err());
}
