//! Statistics Accumulator

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

/// Return the global statistics accumulator.
pub fn stats_accumulator() -> &'static Mutex<StatsAccumulator> {
    static DATA: OnceLock<Mutex<StatsAccumulator>> = OnceLock::new();
    DATA.get_or_init(|| Mutex::new(StatsAccumulator::new()))
}

/// Aggregate different types of statistics.
#[derive(Default)]
pub struct StatsAccumulator {
    /// Counters.
    counters: HashMap<String, i64>,

    /// Percentages.
    percentages: HashMap<String, (i64, i64)>,
}

impl StatsAccumulator {
    /// Create a new instance of `StatsAccumulator`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulates a counter value.
    ///
    /// * `name` - Statistic name.
    /// * `val`  - Counter value.
    pub fn report_counter(&mut self, name: &str, val: i64) {
        *self.counters.entry(name.to_string()).or_insert(0) += val;
    }

    /// Accumulates a percentage value.
    ///
    /// * `name`  - Statistic name.
    /// * `num`   - Numerator (actual count).
    /// * `denom` - Denominator (total count).
    pub fn report_percentage(&mut self, name: &str, num: i64, denom: i64) {
        let v = self.percentages.entry(name.to_string()).or_insert((0, 0));
        v.0 += num;
        v.1 += denom;
    }

    /// Returns the accumulated value of a counter.
    ///
    /// * `name` - Statistic name.
    pub fn counter(&self, name: &str) -> Option<i64> {
        self.counters.get(name).copied()
    }

    /// Returns the accumulated numerator and denominator of a percentage.
    ///
    /// * `name` - Statistic name.
    pub fn percentage(&self, name: &str) -> Option<(i64, i64)> {
        self.percentages.get(name).copied()
    }

    /// Formats the report grouped by category.
    pub fn report(&self) -> String {
        let mut to_print: HashMap<String, Vec<String>> = HashMap::new();

        for (k, v) in self.counters.iter().filter(|(_, v)| **v != 0) {
            let (category, title) = get_category_and_title(k);
            to_print
                .entry(category)
                .or_default()
                .push(format!("{title:-42}               {v:12}"));
        }

        for (k, &(num, denom)) in self.percentages.iter().filter(|(_, v)| v.1 != 0) {
            let (category, title) = get_category_and_title(k);
            to_print.entry(category).or_default().push(format!(
                "{title:-42}{num:12} / {denom:12} ({:.2}%)",
                (100.0 * num as f64) / denom as f64,
            ));
        }

        let mut categories: Vec<_> = to_print.into_iter().collect();
        categories.sort_by(|a, b| a.0.cmp(&b.0));

        let mut s = String::from("Statistics:\n");
        for (category, mut items) in categories {
            items.sort();
            s.push_str(&format!("  {category}\n"));
            for item in items {
                s.push_str(&format!("    {item}\n"));
            }
        }
        s
    }

    /// Prints the report.
    pub fn print(&self) {
        print!("{}", self.report());
    }

    /// Clear the accumulated statistics.
    pub fn clear(&mut self) {
        self.counters.clear();
        self.percentages.clear();
    }
}

/// Splits a statistic name at the first `/` as the separator and returns category and title. If there is no `/`, then
/// category is the empty string.
///
/// * `s` - The statistic name to split.
fn get_category_and_title(s: &str) -> (String, String) {
    match s.split_once('/') {
        Some((category, title)) => (category.to_string(), title.to_string()),
        None => (String::new(), s.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_by_name() {
        let mut accum = StatsAccumulator::new();
        accum.report_counter("Instance/Batches", 2);
        accum.report_counter("Instance/Batches", 3);
        accum.report_percentage("Instance/Divergent", 1, 4);
        accum.report_percentage("Instance/Divergent", 1, 4);

        assert_eq!(accum.counter("Instance/Batches"), Some(5));
        assert_eq!(accum.percentage("Instance/Divergent"), Some((2, 8)));
        assert!(accum.report().contains("  Instance\n"));

        accum.clear();
        assert_eq!(accum.counter("Instance/Batches"), None);
    }

    #[test]
    fn category_split() {
        assert_eq!(
            get_category_and_title("Curves/Bounds"),
            (String::from("Curves"), String::from("Bounds"))
        );
        assert_eq!(
            get_category_and_title("Bounds"),
            (String::new(), String::from("Bounds"))
        );
    }
}
