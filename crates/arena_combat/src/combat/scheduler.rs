//! Отложенные действия: подвыстрелы очереди и включение коллайдеров дроби.
//!
//! Очередь с приоритетом по due-time, разгребается каждый fixed tick.
//! Перед исполнением действие проверяет, жив ли его владелец; если нет,
//! тихо отменяется.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::Arc;

use bevy::prelude::*;

use crate::combat::weapon_profile::WeaponProfile;

#[derive(Debug, Clone)]
pub enum ScheduledAction {
    /// Следующий выстрел очереди (`remaining` включая этот)
    BurstShot {
        shooter: Entity,
        profile: Arc<WeaponProfile>,
        direction: Vec3,
        remaining: u32,
    },
    /// Включить коллайдер снаряда
    ArmCollider { projectile: Entity },
}

impl ScheduledAction {
    /// Entity, от жизни которой зависит действие.
    pub fn owner(&self) -> Entity {
        match self {
            ScheduledAction::BurstShot { shooter, .. } => *shooter,
            ScheduledAction::ArmCollider { projectile } => *projectile,
        }
    }
}

#[derive(Debug)]
struct Pending {
    due: f64,
    sequence: u64,
    action: ScheduledAction,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .total_cmp(&other.due)
            .then(self.sequence.cmp(&other.sequence))
    }
}

/// Допуск сравнения due-time (накопление fixed шагов в f64)
const DUE_EPSILON: f64 = 1e-6;

/// Часы fixed-прохода + очередь отложенных действий.
#[derive(Resource, Debug, Default)]
pub struct ActionScheduler {
    now: f64,
    next_sequence: u64,
    queue: BinaryHeap<Reverse<Pending>>,
}

impl ActionScheduler {
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Возвращает due-time действия.
    pub fn schedule(&mut self, delay: f32, action: ScheduledAction) -> f64 {
        let due = self.now + f64::from(delay.max(0.0));
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.queue.push(Reverse(Pending { due, sequence, action }));
        due
    }

    pub fn advance(&mut self, delta: f64) {
        self.now += delta;
    }

    /// Забирает все созревшие действия в порядке (due, порядок постановки).
    pub fn drain_due(&mut self) -> Vec<ScheduledAction> {
        let mut ready = Vec::new();
        while let Some(Reverse(next)) = self.queue.peek() {
            if next.due > self.now + DUE_EPSILON {
                break;
            }
            if let Some(Reverse(pending)) = self.queue.pop() {
                ready.push(pending.action);
            }
        }
        ready
    }

    pub fn pending_due_times(&self) -> Vec<f64> {
        let mut times: Vec<f64> = self.queue.iter().map(|Reverse(p)| p.due).collect();
        times.sort_by(f64::total_cmp);
        times
    }
}
