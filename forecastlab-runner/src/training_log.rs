//! Per-epoch loss reported by the external trainer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochLoss {
    /// 1-based.
    pub epoch: usize,
    pub loss: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingLog {
    entries: Vec<EpochLoss>,
}

impl TrainingLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the loss of the next epoch and return its number.
    pub fn record(&mut self, loss: f64) -> usize {
        let epoch = self.entries.len() + 1;
        self.entries.push(EpochLoss { epoch, loss });
        epoch
    }

    pub fn entries(&self) -> &[EpochLoss] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<EpochLoss> {
        self.entries.last().copied()
    }

    /// Epoch with the lowest finite loss. Ties go to the earlier epoch.
    pub fn best(&self) -> Option<EpochLoss> {
        self.entries
            .iter()
            .filter(|e| e.loss.is_finite())
            .fold(None, |best: Option<EpochLoss>, e| match best {
                Some(b) if b.loss <= e.loss => Some(b),
                _ => Some(*e),
            })
    }
}

impl FromIterator<f64> for TrainingLog {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut log = TrainingLog::new();
        for loss in iter {
            log.record(loss);
        }
        log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epochs_are_one_based() {
        let mut log = TrainingLog::new();
        assert_eq!(log.record(0.9), 1);
        assert_eq!(log.record(0.5), 2);
        assert_eq!(log.len(), 2);
        assert_eq!(log.last(), Some(EpochLoss { epoch: 2, loss: 0.5 }));
    }

    #[test]
    fn best_skips_nan_and_prefers_earlier() {
        let log: TrainingLog = [0.8, f64::NAN, 0.3, 0.3, 0.4].into_iter().collect();
        assert_eq!(log.best(), Some(EpochLoss { epoch: 3, loss: 0.3 }));
        assert_eq!(log.last().map(|e| e.epoch), Some(5));
    }

    #[test]
    fn empty_log() {
        let log = TrainingLog::new();
        assert!(log.is_empty());
        assert_eq!(log.best(), None);
        assert_eq!(log.last(), None);
    }
}
