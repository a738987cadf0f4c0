//! Q-table implementation for temporal difference learning

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{Action, DiscreteState};

/// One persisted (state, action) entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableEntry {
    pub state: DiscreteState,
    pub action: Action,
    pub value: f64,
    /// Learning updates applied to this pair
    pub visits: u32,
}

/// Value table and visit counts keyed by (discretized state, action).
///
/// Unseen pairs read as 0.0. A pair gains a visit count exactly when it
/// receives its first learning update, so both maps share one key set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QTable {
    /// Q-values: (state, action) -> expected discounted return
    q_values: HashMap<(DiscreteState, Action), f64>,
    /// Visit counts: (state, action) -> learning updates applied
    visits: HashMap<(DiscreteState, Action), u32>,
}

impl QTable {
    /// Create an empty Q-table
    pub fn new() -> Self {
        Self::default()
    }

    /// Get Q-value for a state-action pair
    pub fn get(&self, state: &DiscreteState, action: Action) -> f64 {
        self.q_values
            .get(&(*state, action))
            .copied()
            .unwrap_or(0.0)
    }

    /// Learning updates applied to a state-action pair so far
    pub fn visit_count(&self, state: &DiscreteState, action: Action) -> u32 {
        self.visits.get(&(*state, action)).copied().unwrap_or(0)
    }

    /// Values of all actions in `state`, in tie-break order
    pub fn action_values(&self, state: &DiscreteState) -> [f64; Action::COUNT] {
        Action::ALL.map(|action| self.get(state, action))
    }

    /// Maximum Q-value over all actions in a state
    pub fn max_q(&self, state: &DiscreteState) -> f64 {
        self.action_values(state)
            .into_iter()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Greedy action; ties go to the earliest action in [`Action::ALL`].
    pub fn greedy_action(&self, state: &DiscreteState) -> Action {
        let values = self.action_values(state);
        let mut best = 0;
        for (i, &value) in values.iter().enumerate().skip(1) {
            if value > values[best] {
                best = i;
            }
        }
        Action::ALL[best]
    }

    /// Apply one TD update toward `target` and return the new value.
    ///
    /// Q(s,a) ← Q(s,a) + α(target − Q(s,a))
    pub fn update(&mut self, state: DiscreteState, action: Action, alpha: f64, target: f64) -> f64 {
        let current = self.get(&state, action);
        let new_q = current + alpha * (target - current);
        self.q_values.insert((state, action), new_q);
        new_q
    }

    /// Count a learning visit and return the new total.
    pub fn record_visit(&mut self, state: DiscreteState, action: Action) -> u32 {
        let count = self.visits.entry((state, action)).or_insert(0);
        *count += 1;
        *count
    }

    /// Reset all Q-values and visit counts
    pub fn reset(&mut self) {
        self.q_values.clear();
        self.visits.clear();
    }

    /// Get total number of Q-values stored
    pub fn size(&self) -> usize {
        self.q_values.len()
    }

    /// Number of distinct states with at least one stored value
    pub fn state_count(&self) -> usize {
        let mut states: Vec<&DiscreteState> = self.q_values.keys().map(|(s, _)| s).collect();
        states.sort_unstable();
        states.dedup();
        states.len()
    }

    /// Total learning updates applied across all pairs
    pub fn total_visits(&self) -> u64 {
        self.visits.values().map(|&v| u64::from(v)).sum()
    }

    /// Flatten the table in a stable order for persistence.
    pub fn entries(&self) -> Vec<TableEntry> {
        let mut entries: Vec<TableEntry> = self
            .q_values
            .iter()
            .map(|(&(state, action), &value)| TableEntry {
                state,
                action,
                value,
                visits: self.visit_count(&state, action),
            })
            .collect();
        entries.sort_by(|a, b| (a.state, a.action).cmp(&(b.state, b.action)));
        entries
    }

    /// Rebuild a table from persisted entries.
    ///
    /// Entries with zero visits restore only their value.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = TableEntry>,
    {
        let mut table = Self::new();
        for entry in entries {
            table.q_values.insert((entry.state, entry.action), entry.value);
            if entry.visits > 0 {
                table.visits.insert((entry.state, entry.action), entry.visits);
            }
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> DiscreteState {
        DiscreteState::new([6, 6, 0, 0, 4, 4])
    }

    #[test]
    fn test_qtable_initialization() {
        let qtable = QTable::new();
        assert_eq!(qtable.get(&state(), Action::Stay), 0.0);
        assert_eq!(qtable.visit_count(&state(), Action::Stay), 0);
    }

    #[test]
    fn test_max_q() {
        let mut qtable = QTable::new();
        qtable.update(state(), Action::Stay, 1.0, 0.5);
        qtable.update(state(), Action::MoveUp, 1.0, 1.5);
        qtable.update(state(), Action::MoveDown, 1.0, 0.8);
        assert_eq!(qtable.max_q(&state()), 1.5);
    }

    #[test]
    fn test_greedy_action() {
        let mut qtable = QTable::new();
        qtable.update(state(), Action::MoveDown, 1.0, 0.8);
        assert_eq!(qtable.greedy_action(&state()), Action::MoveDown);
    }

    #[test]
    fn test_greedy_tie_break_takes_first() {
        let mut qtable = QTable::new();
        assert_eq!(qtable.greedy_action(&state()), Action::Stay);

        qtable.update(state(), Action::MoveUp, 1.0, 2.0);
        qtable.update(state(), Action::MoveDown, 1.0, 2.0);
        assert_eq!(qtable.greedy_action(&state()), Action::MoveUp);
    }

    #[test]
    fn test_negative_values_prefer_unseen_action() {
        let mut qtable = QTable::new();
        qtable.update(state(), Action::Stay, 1.0, -1.0);
        assert_eq!(qtable.greedy_action(&state()), Action::MoveUp);
    }

    #[test]
    fn test_update_moves_toward_target() {
        let mut qtable = QTable::new();
        let new_q = qtable.update(state(), Action::Stay, 0.5, 2.0);
        assert!((new_q - 1.0).abs() < 1e-12);
        let new_q = qtable.update(state(), Action::Stay, 0.5, 2.0);
        assert!((new_q - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_entries_roundtrip() {
        let mut qtable = QTable::new();
        qtable.record_visit(state(), Action::MoveUp);
        qtable.update(state(), Action::MoveUp, 0.5, 1.0);
        qtable.record_visit(state(), Action::Stay);
        qtable.record_visit(state(), Action::Stay);
        qtable.update(state(), Action::Stay, 0.5, -1.0);

        let restored = QTable::from_entries(qtable.entries());
        assert_eq!(restored, qtable);
        assert_eq!(restored.visit_count(&state(), Action::Stay), 2);
        assert_eq!(restored.total_visits(), 3);
        assert_eq!(restored.state_count(), 1);
    }
}
