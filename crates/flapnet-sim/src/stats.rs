use serde::Serialize;

/// Summary of a cohort's fitness values.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct FitnessStats {
    /// The smallest fitness.
    pub min: u64,
    /// The largest fitness.
    pub max: u64,
    /// The arithmetic mean.
    pub mean: f64,
    /// The upper median (`sorted[len / 2]`).
    pub median: u64,
    /// The population standard deviation.
    pub std_dev: f64,
}

impl FitnessStats {
    /// Computes the summary, or `None` for an empty cohort.
    ///
    /// # Examples
    ///
    /// ```
    /// # use flapnet_sim::FitnessStats;
    /// let stats = FitnessStats::new([5, 1, 4, 2, 3]).unwrap();
    /// assert_eq!(stats.min, 1);
    /// assert_eq!(stats.max, 5);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = u64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_unstable();

        let min = *values.first()?;
        let max = *values.last()?;
        let n = values.len() as f64;
        let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
        let median = values[values.len() / 2];
        let variance = values
            .iter()
            .map(|&v| (v as f64 - mean).powi(2))
            .sum::<f64>()
            / n;

        Some(Self {
            min,
            max,
            mean,
            median,
            std_dev: variance.sqrt(),
        })
    }
}
