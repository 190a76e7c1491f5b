//! data_source::memory — in-memory [`DataSource`] over labelled scores.
use std::sync::Mutex;

use anyhow::{Context, anyhow};

use crate::data_source::{DataSource, PartitionId, ScoreInterval};
use crate::kappa::range::CategoryRange;

/// One labelled prediction: true category, model score and row weight.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Observation {
    category: i64,
    score: f64,
    weight: f64,
}

/// StaticDataSource — labelled predictions held in memory.
///
/// Partitions are recorded as the interval that created them and resolved
/// on every distribution fetch; ids are `"partition-<n>"` in creation
/// order.
#[derive(Debug)]
pub struct StaticDataSource {
    range: CategoryRange,
    observations: Vec<Observation>,
    partitions: Mutex<Vec<ScoreInterval>>,
}

impl StaticDataSource {
    pub fn new(range: CategoryRange) -> Self {
        StaticDataSource { range, observations: Vec::new(), partitions: Mutex::new(Vec::new()) }
    }

    /// Build a source from `(category, score)` pairs with unit weight.
    pub fn from_scores<I>(range: CategoryRange, scores: I) -> Self
    where
        I: IntoIterator<Item = (i64, f64)>,
    {
        let mut source = StaticDataSource::new(range);
        for (category, score) in scores {
            source.push(category, score, 1.0);
        }
        source
    }

    /// Add one observation with the given weight.
    pub fn push(&mut self, category: i64, score: f64, weight: f64) {
        self.observations.push(Observation { category, score, weight });
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    fn interval_of(&self, partition: &PartitionId) -> anyhow::Result<ScoreInterval> {
        let ordinal: usize = partition
            .0
            .strip_prefix("partition-")
            .ok_or_else(|| anyhow!("unknown partition id {partition}"))?
            .parse()
            .with_context(|| format!("malformed partition id {partition}"))?;
        let partitions =
            self.partitions.lock().map_err(|_| anyhow!("partition registry poisoned"))?;
        partitions.get(ordinal).copied().ok_or_else(|| anyhow!("unknown partition id {partition}"))
    }
}

impl DataSource for StaticDataSource {
    fn category_range(&self) -> anyhow::Result<CategoryRange> {
        Ok(self.range)
    }

    fn category_distribution(&self, partition: &PartitionId) -> anyhow::Result<Vec<(i64, f64)>> {
        let interval = self.interval_of(partition)?;
        let mut distribution: Vec<(i64, f64)> = Vec::new();
        for obs in self.observations.iter().filter(|o| interval.contains(o.score)) {
            match distribution.iter_mut().find(|(category, _)| *category == obs.category) {
                Some((_, count)) => *count += obs.weight,
                None => distribution.push((obs.category, obs.weight)),
            }
        }
        distribution.sort_by_key(|&(category, _)| category);
        Ok(distribution)
    }

    fn create_partition(&self, interval: ScoreInterval) -> anyhow::Result<Option<PartitionId>> {
        if !self.observations.iter().any(|o| interval.contains(o.score)) {
            return Ok(None);
        }
        let mut partitions =
            self.partitions.lock().map_err(|_| anyhow!("partition registry poisoned"))?;
        partitions.push(interval);
        Ok(Some(PartitionId(format!("partition-{}", partitions.len() - 1))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> StaticDataSource {
        let range = CategoryRange::new(0, 2).unwrap();
        StaticDataSource::from_scores(range, vec![(0, 0.1), (0, 0.4), (1, 0.7), (2, 1.5), (1, 1.2)])
    }

    #[test]
    fn empty_interval_creates_no_partition() {
        let src = source();

        let created = src.create_partition(ScoreInterval::new(5.0, 6.0).unwrap()).unwrap();

        assert_eq!(created, None);
    }

    #[test]
    fn distribution_counts_each_category_in_interval() {
        let src = source();
        let id = src.create_partition(ScoreInterval::new(0.0, 1.0).unwrap()).unwrap().unwrap();

        let distribution = src.category_distribution(&id).unwrap();

        assert_eq!(id, PartitionId("partition-0".to_string()));
        assert_eq!(distribution, vec![(0, 2.0), (1, 1.0)]);
    }

    #[test]
    fn unknown_partition_is_an_error() {
        let src = source();

        assert!(src.category_distribution(&PartitionId("partition-7".into())).is_err());
        assert!(src.category_distribution(&PartitionId("elsewhere".into())).is_err());
    }
}
