use crate::*;

/// Receives the record of every finished match.
pub trait HistoryStore {
    fn record(&mut self, record: GameRecord);
}

/// Append-only history kept in memory.
#[derive(Clone, Debug, Default)]
pub struct InMemoryHistory {
    records: Vec<GameRecord>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[GameRecord] {
        &self.records
    }

    pub fn wins(&self) -> usize {
        self.records.iter().filter(|record| record.won).count()
    }

    pub fn best_points(&self) -> Option<i32> {
        self.records.iter().map(|record| record.points).max()
    }
}

impl HistoryStore for InMemoryHistory {
    fn record(&mut self, record: GameRecord) {
        log::debug!(
            "Recorded {} match for {} and {}",
            record.difficulty.name(),
            record.players[0],
            record.players[1]
        );
        self.records.push(record);
    }
}

impl<T: HistoryStore + ?Sized> HistoryStore for std::sync::Arc<std::sync::Mutex<T>> {
    fn record(&mut self, record: GameRecord) {
        match self.lock() {
            Ok(mut store) => store.record(record),
            Err(poisoned) => poisoned.into_inner().record(record),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn record(points: i32, won: bool) -> GameRecord {
        GameRecord {
            players: ["a".into(), "b".into()],
            difficulty: DifficultyLevel::Easy,
            lives: 0,
            points,
            won,
            elapsed_secs: 10,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn keeps_records_in_order() {
        let mut history = InMemoryHistory::new();
        history.record(record(10, true));
        history.record(record(-4, false));

        assert_eq!(history.records().len(), 2);
        assert_eq!(history.wins(), 1);
        assert_eq!(history.best_points(), Some(10));
    }

    #[test]
    fn shared_store_forwards() {
        let shared = std::sync::Arc::new(std::sync::Mutex::new(InMemoryHistory::new()));
        let mut handle = shared.clone();
        handle.record(record(3, true));

        assert_eq!(shared.lock().unwrap().records().len(), 1);
    }
}
