//! Battle progress derived from successive snapshots.

use protocol::ArenaSnapshot;
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleEvent {
    /// Empty arena while a match gathers players.
    Waiting,
    Joined(String),
    Eliminated(String),
    Winner(String),
}

/// Remembers just enough of the previous snapshot to report changes.
#[derive(Debug, Default)]
pub struct BattleLog {
    /// Robot name to "alive in the last snapshot".
    roster: HashMap<String, bool>,
    winner: Option<String>,
    waiting: bool,
    snapshots: u64,
}

impl BattleLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> u64 {
        self.snapshots
    }

    /// Diff `snapshot` against the last one, log and return what changed.
    pub fn observe(&mut self, snapshot: &ArenaSnapshot) -> Vec<BattleEvent> {
        self.snapshots += 1;
        let mut events = Vec::new();

        if snapshot.is_placeholder() {
            if !self.waiting {
                // A new match is being set up; forget the previous one
                self.waiting = true;
                self.roster.clear();
                self.winner = None;
                info!(remaining = ?snapshot.remaining, "Waiting for players");
                events.push(BattleEvent::Waiting);
            }
            return events;
        }
        self.waiting = false;

        for robot in &snapshot.robots {
            let alive = robot.is_alive();
            match self.roster.insert(robot.name.clone(), alive) {
                None => {
                    info!(robot = %robot.name, health = robot.health, "Robot joined");
                    events.push(BattleEvent::Joined(robot.name.clone()));
                }
                Some(true) if !alive => {
                    info!(robot = %robot.name, "Robot eliminated");
                    events.push(BattleEvent::Eliminated(robot.name.clone()));
                }
                Some(_) => {}
            }
        }

        if let Some(winner) = &snapshot.winner {
            if self.winner.as_ref() != Some(winner) {
                info!(winner = %winner, remaining = ?snapshot.remaining, "Battle over");
                self.winner = Some(winner.clone());
                events.push(BattleEvent::Winner(winner.clone()));
            }
        }

        events
    }
}
