use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use agent_runtime::{
    Archetype, ArchetypeBehavior, Behavior, BehaviorRegistry, EngineConfig, Entity,
    EntityController, EntityEvent, Event, RuntimeError, SpawnOptions, Topic, World,
};
use nav_core::{Grid, Position, Vec2};
use state_machine::builder::from_fn;
use state_machine::{State, Transition};

const WALKER: Archetype = Archetype::Custom(1);
const LOST: Archetype = Archetype::Custom(2);
const COUNTER: Archetype = Archetype::Custom(3);
const CORNER_WALKER: Archetype = Archetype::Custom(4);

/// Walks to the far end of the top row on spawn, then idles.
struct WalkEast;

impl State<Entity, World> for WalkEast {
    fn on_enter(&self, agent: &mut Entity, world: &mut World) {
        let goal = Position::new(world.grid().width() as i32 - 1, 0);
        world.move_to(agent, goal);
    }

    fn update(&self, _agent: &mut Entity, _world: &mut World) -> Transition {
        Transition::Stay
    }
}

/// Walks to the bottom-right cell on spawn, then idles.
struct WalkToFarCorner;

impl State<Entity, World> for WalkToFarCorner {
    fn on_enter(&self, agent: &mut Entity, world: &mut World) {
        let grid = world.grid();
        let goal = Position::new(grid.width() as i32 - 1, grid.height() as i32 - 1);
        world.move_to(agent, goal);
    }

    fn update(&self, _agent: &mut Entity, _world: &mut World) -> Transition {
        Transition::Stay
    }
}

fn registry(counter: Arc<AtomicUsize>) -> BehaviorRegistry {
    let mut registry = BehaviorRegistry::new();

    let walker = Behavior::new("walker", "walk", Duration::from_millis(100)).with_state("walk", WalkEast);
    registry
        .register(WALKER, ArchetypeBehavior::new(walker, 1.0))
        .unwrap();

    let corner = Behavior::new("corner", "walk", Duration::from_millis(100))
        .with_state("walk", WalkToFarCorner);
    registry
        .register(CORNER_WALKER, ArchetypeBehavior::new(corner, 1.0))
        .unwrap();

    let lost = Behavior::new("lost", "idle", Duration::from_millis(100)).with_state(
        "idle",
        from_fn(|_: &mut Entity, _: &mut World| Transition::To("nowhere")),
    );
    registry
        .register(LOST, ArchetypeBehavior::new(lost, 1.0))
        .unwrap();

    let counting = Behavior::new("counter", "count", Duration::from_millis(100)).with_state(
        "count",
        from_fn(move |_: &mut Entity, _: &mut World| {
            counter.fetch_add(1, Ordering::SeqCst);
            Transition::Stay
        }),
    );
    registry
        .register(COUNTER, ArchetypeBehavior::new(counting, 0.0))
        .unwrap();

    registry
}

fn controller(grid: Grid) -> (EntityController, Arc<AtomicUsize>) {
    let counter = Arc::new(AtomicUsize::new(0));
    let controller = EntityController::builder()
        .grid(grid)
        .config(EngineConfig::default())
        .registry(registry(Arc::clone(&counter)))
        .build()
        .unwrap();
    (controller, counter)
}

fn drain(receiver: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

#[test]
fn builder_requires_a_grid() {
    let result = EntityController::builder().build();
    assert!(matches!(result, Err(RuntimeError::MissingGrid)));
}

#[test]
fn unknown_archetype_cannot_spawn() {
    let (mut controller, _) = controller(Grid::new(4, 4).unwrap());
    let result = controller.spawn(Archetype::Guard, Position::new(0, 0), SpawnOptions::default());
    assert!(matches!(
        result,
        Err(RuntimeError::UnknownArchetype(Archetype::Guard))
    ));
}

#[test]
fn spawn_snaps_to_walkable_and_keeps_insertion_order() {
    let grid: Grid = "#...\n....".parse().unwrap();
    let (mut controller, _) = controller(grid);

    let a = controller
        .spawn(COUNTER, Position::new(0, 0), SpawnOptions::default())
        .unwrap();
    let b = controller
        .spawn(COUNTER, Position::new(3, 1), SpawnOptions::default())
        .unwrap();

    let ids: Vec<_> = controller.entities().map(|entity| entity.id).collect();
    assert_eq!(ids, vec![a, b]);
    let first = controller.entity(a).unwrap();
    assert_ne!(first.cell(), Position::new(0, 0));
    assert!(controller.world().grid().is_walkable(first.cell()));
    assert_eq!(first.state, "count");
}

#[test]
fn remove_returns_entity_once() {
    let (mut controller, _) = controller(Grid::new(4, 4).unwrap());
    let id = controller
        .spawn(COUNTER, Position::new(1, 1), SpawnOptions::default())
        .unwrap();

    assert_eq!(controller.remove(id).unwrap().id, id);
    assert!(matches!(
        controller.remove(id),
        Err(RuntimeError::EntityNotFound(missing)) if missing == id
    ));
    assert!(controller.is_empty());
}

#[test]
fn think_runs_on_its_own_cadence() {
    let (mut controller, counter) = controller(Grid::new(4, 4).unwrap());
    controller
        .spawn(COUNTER, Position::new(1, 1), SpawnOptions::default())
        .unwrap();

    for _ in 0..4 {
        controller.update(Duration::from_millis(50));
    }

    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[test]
fn unknown_state_keeps_entity_in_place_and_is_reported() {
    let (mut controller, _) = controller(Grid::new(4, 4).unwrap());
    let mut events = controller.subscribe(Topic::Entity);
    let id = controller
        .spawn(LOST, Position::new(1, 1), SpawnOptions::default())
        .unwrap();

    controller.update(Duration::from_millis(100));

    assert_eq!(controller.entity(id).unwrap().state, "idle");
    let events = drain(&mut events);
    assert!(events.contains(&Event::Entity(EntityEvent::UnknownState {
        entity: id,
        current: "idle",
        requested: "nowhere",
    })));
}

#[test]
fn entities_follow_their_path_every_tick() {
    let (mut controller, _) = controller(Grid::new(5, 1).unwrap());
    let mut events = controller.subscribe(Topic::Entity);
    let id = controller
        .spawn(WALKER, Position::new(0, 0), SpawnOptions::default())
        .unwrap();
    assert!(controller.entity(id).unwrap().is_moving);

    // 1 cell/s; movement runs even between think updates.
    for _ in 0..10 {
        controller.update(Duration::from_millis(20));
    }
    let x = controller.entity(id).unwrap().position.x;
    assert!((x - 0.2).abs() < 1e-3, "x = {x}");

    for _ in 0..40 {
        controller.update(Duration::from_millis(100));
    }
    let walker = controller.entity(id).unwrap();
    assert_eq!(walker.cell(), Position::new(4, 0));
    assert!(!walker.is_moving);
    assert!(drain(&mut events).contains(&Event::Entity(EntityEvent::Arrived {
        entity: id,
        position: Position::new(4, 0),
    })));
}

#[test]
fn smoothed_path_past_a_wall_corner_is_walkable() {
    let grid: Grid = "..\n#.\n..".parse().unwrap();
    let (mut controller, _) = controller(grid);
    let mut events = controller.subscribe(Topic::Entity);
    let id = controller
        .spawn(CORNER_WALKER, Position::new(0, 0), SpawnOptions::default())
        .unwrap();

    for _ in 0..60 {
        controller.update(Duration::from_millis(100));
    }

    let walker = controller.entity(id).unwrap();
    assert_eq!(walker.cell(), Position::new(1, 2));
    assert!(!walker.is_moving);
    let events = drain(&mut events);
    assert!(events.contains(&Event::Entity(EntityEvent::Arrived {
        entity: id,
        position: Position::new(1, 2),
    })));
    assert!(!events.iter().any(|event| matches!(
        event,
        Event::Entity(EntityEvent::PathBlocked { .. })
    )));
}

#[test]
fn grid_change_under_a_moving_entity_stops_it() {
    let (mut controller, _) = controller(Grid::new(10, 1).unwrap());
    let mut events = controller.subscribe(Topic::Entity);
    let id = controller
        .spawn(WALKER, Position::new(0, 0), SpawnOptions::default())
        .unwrap();

    controller.update(Duration::from_millis(500));
    controller.set_walkable(Position::new(5, 0), false).unwrap();
    for _ in 0..60 {
        controller.update(Duration::from_millis(100));
    }

    let walker = controller.entity(id).unwrap();
    assert!(!walker.is_moving);
    assert!(walker.position.x < 4.6);
    assert!(drain(&mut events).iter().any(|event| matches!(
        event,
        Event::Entity(EntityEvent::PathBlocked { entity, .. }) if *entity == id
    )));
}

#[test]
fn grid_edits_outside_bounds_fail() {
    let (mut controller, _) = controller(Grid::new(3, 3).unwrap());
    let result = controller.set_walkable(Position::new(3, 0), false);
    assert!(matches!(result, Err(RuntimeError::Grid(_))));
}

#[test]
fn state_counts_and_subject() {
    let (mut controller, _) = controller(Grid::new(6, 6).unwrap());
    for x in 0..3 {
        controller
            .spawn(COUNTER, Position::new(x, 0), SpawnOptions::default())
            .unwrap();
    }
    controller
        .spawn(LOST, Position::new(5, 5), SpawnOptions::default())
        .unwrap();

    let counts = controller.state_counts();
    assert_eq!(counts.get("count"), Some(&3));
    assert_eq!(counts.get("idle"), Some(&1));

    controller.set_subject(Vec2::new(2.0, 2.0), true);
    assert!(controller.subject().is_some_and(|subject| subject.dangerous));
    controller.clear_subject();
    assert!(controller.subject().is_none());
}

#[test]
fn perception_helpers() {
    let (mut controller, _) = controller(Grid::new(10, 10).unwrap());
    let near = controller
        .spawn(COUNTER, Position::new(1, 1), SpawnOptions::default())
        .unwrap();
    let far = controller
        .spawn(LOST, Position::new(8, 8), SpawnOptions::default())
        .unwrap();

    let world = controller.world();
    let origin = Vec2::new(0.0, 0.0);
    assert_eq!(world.find_entities_near(origin, 3.0, None), vec![near]);
    assert_eq!(world.find_entities_near(origin, 20.0, Some(LOST)), vec![far]);
    assert_eq!(world.find_nearest_entity(origin, None), Some(near));
    assert_eq!(world.find_nearest_entity(origin, Some(WALKER)), None);

    let world = controller.world_mut();
    let cell = world.find_random_walkable_position().unwrap();
    assert!(world.grid().is_walkable(cell));
    assert_eq!(
        world.find_walkable_position_near(Position::new(-4, 20), 2),
        Some(Position::new(0, 9))
    );
}
