use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TimerRole {
    ConnectTimeout,
    Supervision,
    ScanCycle,
    Shutdown,
}

/// Single-shot deadlines, at most one per role. Checked by the thread that
/// drives the reactor, so expiry is serialized with event handling.
#[derive(Debug, Default)]
pub struct Timers {
    deadlines: HashMap<TimerRole, Instant>,
}

impl Timers {
    /// Arms `role` to expire `after` from `now`, replacing an armed deadline.
    pub fn start(&mut self, role: TimerRole, after: Duration, now: Instant) {
        self.deadlines.insert(role, now + after);
    }

    /// Disarms `role`. Returns whether it was armed.
    pub fn cancel(&mut self, role: TimerRole) -> bool {
        self.deadlines.remove(&role).is_some()
    }

    pub fn is_active(&self, role: TimerRole) -> bool {
        self.deadlines.contains_key(&role)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    /// Disarms and returns every role due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<TimerRole> {
        let mut due: Vec<(Instant, TimerRole)> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(role, deadline)| (*deadline, *role))
            .collect();
        due.sort_by_key(|(deadline, _)| *deadline);

        for (_, role) in &due {
            self.deadlines.remove(role);
        }
        due.into_iter().map(|(_, role)| role).collect()
    }
}
