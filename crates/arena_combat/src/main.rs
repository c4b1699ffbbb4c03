//! Headless симуляция арены
//!
//! Игрок (rifle) против двух ботов: стик вперёд → отпускание → очередь,
//! боты отвечают сами. Запускает Bevy App без рендера.

use arena_combat::combat::WeaponCatalog;
use arena_combat::{
    create_headless_app, init_logger, log_error, log_info, AiGunner, AimInput, Combatant, EquippedWeapon, Health, Player,
};
use bevy::prelude::*;

const WEAPONS_JSON: &str = include_str!("../assets/weapons.json");

fn main() {
    init_logger();
    let seed = 42;
    log_info(&format!("🚀 Starting arena headless simulation (seed: {})", seed));

    let mut app = create_headless_app(seed);

    let catalog = match WeaponCatalog::from_json_str(WEAPONS_JSON) {
        Ok(catalog) => catalog,
        Err(err) => {
            log_error(&format!("Failed to load weapon catalog: {}", err));
            return;
        }
    };
    log_info(&format!("📦 Loaded {} weapons", catalog.len()));

    let loadout = ["rifle", "shotgun", "grenade"].map(|name| catalog.by_name(name));
    let [Ok(rifle), Ok(shotgun), Ok(grenade)] = loadout else {
        log_error("Weapon catalog is missing the demo loadout");
        return;
    };
    app.insert_resource(catalog);

    let player = app
        .world_mut()
        .spawn((
            Player,
            Combatant::new(0),
            EquippedWeapon(rifle),
            Transform::from_xyz(0.0, 0.0, 0.0),
        ))
        .id();

    let bots = [
        (shotgun, Vec3::new(0.0, 0.0, 7.0)),
        (grenade, Vec3::new(4.0, 0.0, 8.0)),
    ]
    .map(|(weapon, position)| {
        app.world_mut()
            .spawn((
                Combatant::new(1),
                AiGunner::default(),
                EquippedWeapon(weapon),
                Transform::from_translation(position),
            ))
            .id()
    });

    for tick in 0..600 {
        // Стик вперёд 10 тиков, затем отпускание → выстрел
        let input = if tick % 60 < 10 { Vec2::new(0.0, 1.0) } else { Vec2::ZERO };
        if let Some(mut aim) = app.world_mut().get_mut::<AimInput>(player) {
            aim.0 = input;
        }

        app.update();

        if tick % 100 == 0 {
            let world = app.world();
            let hp = |entity: Entity| world.get::<Health>(entity).map_or(0.0, |h| h.current);
            log_info(&format!(
                "Tick {}: {} entities, player hp {:.1}, bots hp {:.1} / {:.1}",
                tick,
                world.entities().len(),
                hp(player),
                hp(bots[0]),
                hp(bots[1])
            ));
        }
    }

    log_info("✅ Simulation complete!");
}
