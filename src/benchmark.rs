//! Benchmarking module.
//!
//! Runs every tour builder on a set of instances, collects per-run results
//! and aggregates them per algorithm.

use crate::approximation::{Christofides, TourConstruction, TwiceAroundTheTree};
use crate::error::Result;
use crate::exact::{BranchAndBound, BranchAndBoundConfig};
use crate::graph::ExactMatching;
use crate::instance::TspInstance;
use crate::solution::Solution;

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Result of running a single algorithm on an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmResult {
    /// Algorithm name
    pub algorithm: String,
    /// Instance name
    pub instance: String,
    /// Instance dimension
    pub dimension: usize,
    /// Tour weight, absent when no tour was produced
    pub cost: Option<f64>,
    /// Whether the tour is a Hamiltonian cycle over existing edges
    pub valid: bool,
    /// Computation time in seconds
    pub time: f64,
    /// Search nodes expanded (exact solver only)
    pub nodes_explored: Option<usize>,
    /// Gap to best known in percent (if available)
    pub gap_to_best: Option<f64>,
    /// Minimum spanning tree weight of the instance
    pub lower_bound: Option<f64>,
}

/// Aggregated statistics for an algorithm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmStatistics {
    pub algorithm: String,
    /// Number of instances attempted
    pub num_instances: usize,
    /// Number of valid tours
    pub num_valid: usize,
    pub avg_cost: f64,
    pub best_cost: f64,
    pub worst_cost: f64,
    /// Sample standard deviation of cost
    pub std_cost: f64,
    pub avg_time: f64,
    pub total_time: f64,
    /// Average gap to best known
    pub avg_gap: Option<f64>,
    /// Average ratio of cost to MST weight
    pub avg_mst_ratio: Option<f64>,
}

/// One row of a best-known tour weight file (`instance,cost`)
#[derive(Debug, Clone, Deserialize)]
struct BestKnownRecord {
    instance: String,
    cost: f64,
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Branch-and-bound budget per instance
    pub time_limit: Duration,
    /// Run the exact solver
    pub run_exact: bool,
    /// Largest instance handed to the exact solver
    pub exact_max_dimension: usize,
    /// Show a progress bar
    pub progress: bool,
    /// Output directory
    pub output_dir: String,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            time_limit: Duration::from_secs(60),
            run_exact: false,
            exact_max_dimension: 15,
            progress: true,
            output_dir: "results".to_string(),
        }
    }
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<AlgorithmResult>,
    best_known: HashMap<String, f64>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            results: Vec::new(),
            best_known: HashMap::new(),
        }
    }

    /// Set best known tour weight for an instance
    pub fn set_best_known(&mut self, instance_name: &str, cost: f64) {
        self.best_known.insert(instance_name.to_string(), cost);
    }

    /// Read best known tour weights from CSV with an `instance,cost` header.
    /// Returns the number of entries loaded.
    pub fn load_best_known<R: Read>(&mut self, reader: R) -> Result<usize> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut loaded = 0;
        for record in csv_reader.deserialize() {
            let record: BestKnownRecord = record.map_err(std::io::Error::from)?;
            self.set_best_known(&record.instance, record.cost);
            loaded += 1;
        }
        log::info!("loaded {} best known values", loaded);
        Ok(loaded)
    }

    /// Same as [`Benchmark::load_best_known`], from a file
    pub fn load_best_known_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        self.load_best_known(File::open(path)?)
    }

    /// Run the exact solver first when enabled, so the approximations get a
    /// gap to the proven optimum.
    pub fn run_instance(&mut self, instance: &TspInstance) {
        log::info!("Running benchmark on instance: {}", instance.name);
        let lower_bound = instance.statistics().mst_weight;

        if self.config.run_exact && instance.dimension <= self.config.exact_max_dimension {
            let solver = BranchAndBound::new(BranchAndBoundConfig {
                time_limit: self.config.time_limit,
            });
            let solution = solver.construct(instance);
            if solution.valid {
                let best = self.best_known.entry(instance.name.clone()).or_insert(solution.cost);
                *best = best.min(solution.cost);
            }
            self.record_result(instance, &solution, lower_bound);
        } else if self.config.run_exact {
            log::info!(
                "skipping exact solver on {} ({} > {} cities)",
                instance.name,
                instance.dimension,
                self.config.exact_max_dimension
            );
        }

        let builders: Vec<Box<dyn TourConstruction>> = vec![
            Box::new(TwiceAroundTheTree::new()),
            Box::new(Christofides::new()),
            Box::new(Christofides::with_matching(ExactMatching::new())),
        ];

        for builder in builders {
            let solution = builder.construct(instance);
            self.record_result(instance, &solution, lower_bound);
        }
    }

    /// Run benchmark on multiple instances
    pub fn run_on_instances(&mut self, instances: &[TspInstance]) {
        let bar = if self.config.progress {
            let bar = ProgressBar::new(instances.len() as u64);
            let style = ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            bar.set_style(style);
            bar
        } else {
            ProgressBar::hidden()
        };

        for instance in instances {
            bar.set_message(instance.name.clone());
            self.run_instance(instance);
            bar.inc(1);
        }
        bar.finish_with_message("done");
    }

    /// Record a result
    fn record_result(&mut self, instance: &TspInstance, solution: &Solution, lower_bound: f64) {
        let cost = (!solution.is_empty()).then_some(solution.cost);
        let gap_to_best = self
            .best_known
            .get(&instance.name)
            .and_then(|&best| solution.gap_to(best));

        self.results.push(AlgorithmResult {
            algorithm: solution.algorithm.clone(),
            instance: instance.name.clone(),
            dimension: instance.dimension,
            cost,
            valid: solution.valid,
            time: solution.computation_time,
            nodes_explored: solution.nodes_explored,
            gap_to_best,
            lower_bound: lower_bound.is_finite().then_some(lower_bound),
        });
    }

    /// Compute statistics for each algorithm
    pub fn compute_statistics(&self) -> Vec<AlgorithmStatistics> {
        let mut stats_map: HashMap<&str, Vec<&AlgorithmResult>> = HashMap::new();
        for result in &self.results {
            stats_map.entry(result.algorithm.as_str()).or_default().push(result);
        }

        let mut statistics = Vec::new();

        for (algo, results) in stats_map {
            let valid: Vec<&AlgorithmResult> = results.iter().copied().filter(|r| r.valid).collect();
            if valid.is_empty() {
                continue;
            }

            let costs: Vec<f64> = valid.iter().filter_map(|r| r.cost).collect();
            let times: Vec<f64> = results.iter().map(|r| r.time).collect();
            let gaps: Vec<f64> = valid.iter().filter_map(|r| r.gap_to_best).collect();
            let ratios: Vec<f64> = valid
                .iter()
                .filter_map(|r| match (r.cost, r.lower_bound) {
                    (Some(cost), Some(lb)) if lb > 0.0 => Some(cost / lb),
                    _ => None,
                })
                .collect();

            let std_cost = if costs.len() > 1 { costs.iter().std_dev() } else { 0.0 };

            statistics.push(AlgorithmStatistics {
                algorithm: algo.to_string(),
                num_instances: results.len(),
                num_valid: valid.len(),
                avg_cost: costs.iter().mean(),
                best_cost: Statistics::min(costs.iter()),
                worst_cost: Statistics::max(costs.iter()),
                std_cost,
                avg_time: times.iter().mean(),
                total_time: times.iter().sum(),
                avg_gap: (!gaps.is_empty()).then(|| gaps.iter().mean()),
                avg_mst_ratio: (!ratios.is_empty()).then(|| ratios.iter().mean()),
            });
        }

        statistics.sort_by(|a, b| a.avg_cost.total_cmp(&b.avg_cost).then_with(|| a.algorithm.cmp(&b.algorithm)));
        statistics
    }

    /// Export results to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for result in &self.results {
            writer.serialize(result)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export statistics to CSV
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for stat in self.compute_statistics() {
            writer.serialize(stat)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Write `results.csv`, `statistics.csv` and `report.txt` into the
    /// configured output directory.
    pub fn save(&self) -> Result<()> {
        let dir = Path::new(&self.config.output_dir);
        std::fs::create_dir_all(dir)?;
        self.export_to_csv(dir.join("results.csv"))?;
        self.export_statistics_csv(dir.join("statistics.csv"))?;
        std::fs::write(dir.join("report.txt"), self.generate_report())?;
        log::info!("benchmark results written to {}", dir.display());
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("         TSP Benchmark Report\n");
        report.push_str("========================================\n");
        report.push_str(&format!(
            "Generated: {}\n\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));

        let stats = self.compute_statistics();

        report.push_str("Algorithm Performance Summary:\n");
        report.push_str("-".repeat(92).as_str());
        report.push('\n');
        report.push_str(&format!(
            "{:<20} {:>8} {:>12} {:>12} {:>10} {:>10} {:>12}\n",
            "Algorithm", "Valid", "Avg Cost", "Best Cost", "Avg Gap%", "Cost/MST", "Avg Time"
        ));
        report.push_str("-".repeat(92).as_str());
        report.push('\n');

        for stat in &stats {
            let gap_str = stat
                .avg_gap
                .map(|g| format!("{:.2}%", g))
                .unwrap_or_else(|| "-".to_string());
            let ratio_str = stat
                .avg_mst_ratio
                .map(|r| format!("{:.3}", r))
                .unwrap_or_else(|| "-".to_string());

            report.push_str(&format!(
                "{:<20} {:>8} {:>12.2} {:>12.2} {:>10} {:>10} {:>12.4}\n",
                stat.algorithm,
                format!("{}/{}", stat.num_valid, stat.num_instances),
                stat.avg_cost,
                stat.best_cost,
                gap_str,
                ratio_str,
                stat.avg_time
            ));
        }

        report.push_str("-".repeat(92).as_str());
        report.push('\n');

        let unsolved: Vec<&AlgorithmResult> = self.results.iter().filter(|r| r.cost.is_none()).collect();
        if !unsolved.is_empty() {
            report.push_str("\nNo solution found:\n");
            for result in unsolved {
                report.push_str(&format!("  {}: {} ({:.1}s)\n", result.instance, result.algorithm, result.time));
            }
        }

        report.push_str("\nBest Solutions per Instance:\n");

        let mut instance_best: HashMap<&str, (&AlgorithmResult, f64)> = HashMap::new();
        for result in &self.results {
            let Some(cost) = result.cost.filter(|_| result.valid) else {
                continue;
            };
            let entry = instance_best.entry(result.instance.as_str()).or_insert((result, cost));
            if cost < entry.1 {
                *entry = (result, cost);
            }
        }

        let mut best: Vec<_> = instance_best.into_iter().collect();
        best.sort_by(|a, b| a.0.cmp(b.0));
        for (instance, (result, cost)) in best {
            report.push_str(&format!("  {}: {:.2} ({})\n", instance, cost, result.algorithm));
        }

        report
    }

    /// Get all results
    pub fn results(&self) -> &[AlgorithmResult] {
        &self.results
    }

    /// Get best known values
    pub fn best_known(&self) -> &HashMap<String, f64> {
        &self.best_known
    }
}

/// Load every `.tsp` file of a directory, sorted by dimension. Files that
/// fail to parse are logged and skipped.
pub fn load_instances_from_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<TspInstance>> {
    let mut instances = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().map(|e| e == "tsp").unwrap_or(false) {
            match TspInstance::from_file(&path) {
                Ok(instance) => instances.push(instance),
                Err(e) => log::warn!("skipping {}: {}", path.display(), e),
            }
        }
    }

    instances.sort_by(|a, b| a.dimension.cmp(&b.dimension).then_with(|| a.name.cmp(&b.name)));
    Ok(instances)
}
