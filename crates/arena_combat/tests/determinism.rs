//! Тесты детерминизма
//!
//! Одинаковый seed → идентичный исход боя (разброс дроби, гранаты, очереди).

use arena_combat::{
    create_headless_app, world_snapshot, AiGunner, Combatant, EquippedWeapon, Health, WeaponProfile,
};
use bevy::prelude::*;

/// Две команды ботов с разным оружием
fn run_skirmish(seed: u64, tick_count: usize) -> Vec<u8> {
    let mut app = create_headless_app(seed);

    let loadout = [
        (0, WeaponProfile::shotgun(), Vec3::new(0.0, 0.0, 0.0)),
        (0, WeaponProfile::rifle(), Vec3::new(2.0, 0.0, -1.0)),
        (0, WeaponProfile::grenade(), Vec3::new(-2.0, 0.0, -1.0)),
        (1, WeaponProfile::shotgun(), Vec3::new(0.0, 0.0, 6.0)),
        (1, WeaponProfile::rocket_launcher(), Vec3::new(3.0, 0.0, 8.0)),
        (1, WeaponProfile::pistol(), Vec3::new(-3.0, 0.0, 7.0)),
    ];

    for (team, weapon, position) in loadout {
        app.world_mut().spawn((
            Combatant::new(team),
            AiGunner::default(),
            EquippedWeapon::new(weapon),
            Transform::from_translation(position),
        ));
    }

    for _ in 0..tick_count {
        app.update();
    }

    world_snapshot::<Health>(app.world_mut())
}

#[test]
fn test_determinism_same_seed() {
    const SEED: u64 = 12345;
    const TICK_COUNT: usize = 600;

    let snapshot1 = run_skirmish(SEED, TICK_COUNT);
    let snapshot2 = run_skirmish(SEED, TICK_COUNT);

    assert_eq!(
        snapshot1, snapshot2,
        "Симуляция с одинаковым seed ({}) дала разные результаты!",
        SEED
    );
}

#[test]
fn test_determinism_multiple_runs() {
    const SEED: u64 = 42;
    const TICK_COUNT: usize = 400;

    let snapshots: Vec<_> = (0..3).map(|_| run_skirmish(SEED, TICK_COUNT)).collect();

    for (i, snapshot) in snapshots.iter().enumerate().skip(1) {
        assert_eq!(snapshots[0], *snapshot, "Прогон {} дал результат отличный от прогона 0", i);
    }
}

#[test]
fn test_skirmish_deals_damage() {
    let mut app = create_headless_app(42);
    let shooter = app
        .world_mut()
        .spawn((
            Combatant::new(0),
            AiGunner::default(),
            EquippedWeapon::new(WeaponProfile::shotgun()),
            Transform::default(),
        ))
        .id();
    let target = app
        .world_mut()
        .spawn((Combatant::new(1), Transform::from_xyz(0.0, 0.0, 5.0)))
        .id();

    for _ in 0..400 {
        app.update();
    }

    let hp = app.world().get::<Health>(target).map(|h| h.current);
    assert!(hp.is_some_and(|hp| hp < 100.0), "Бот {:?} должен попасть дробью", shooter);
}
