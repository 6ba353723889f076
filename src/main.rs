//! TSP Solver - Command Line Interface

use clap::{Parser, Subcommand, ValueEnum};
use tsp_solver::approximation::{Christofides, TourConstruction, TwiceAroundTheTree};
use tsp_solver::benchmark::{load_instances_from_dir, Benchmark, BenchmarkConfig};
use tsp_solver::exact::{BranchAndBound, BranchAndBoundConfig, SearchStatus};
use tsp_solver::graph::ExactMatching;
use tsp_solver::instance::TspInstance;
use tsp_solver::solution::Solution;
use tsp_solver::visualization::Visualizer;

use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "tsp-solver")]
#[command(version = "1.0")]
#[command(about = "Approximate and exact solvers for the symmetric TSP")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a single instance
    Solve {
        /// Path to a TSPLIB instance file
        #[arg(short, long)]
        instance: PathBuf,

        /// Algorithm to use
        #[arg(short, long, value_enum, default_value = "christofides")]
        algorithm: Algorithm,

        /// Branch-and-bound time limit in seconds
        #[arg(short, long, default_value = "1800")]
        time_limit: u64,

        /// Output solution to file (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Generate a tour drawing next to the instance
        #[arg(long)]
        visualize: bool,

        /// Overlay the minimum spanning tree on the drawing
        #[arg(long)]
        draw_tree: bool,

        /// Write plain-text plot data (cities, tours, comparison) to file
        #[arg(long)]
        plot_data: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run benchmarks on a directory of instances
    Benchmark {
        /// Directory containing instance files
        #[arg(short, long)]
        dir: PathBuf,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Branch-and-bound time limit per instance in seconds
        #[arg(short, long, default_value = "60")]
        time_limit: u64,

        /// Run the exact solver
        #[arg(long)]
        exact: bool,

        /// Largest instance handed to the exact solver
        #[arg(long, default_value = "15")]
        exact_max_size: usize,

        /// Maximum instance size
        #[arg(long)]
        max_size: Option<usize>,

        /// CSV of best known tour weights (`instance,cost`) for gap columns
        #[arg(long)]
        best_known: Option<PathBuf>,
    },

    /// Analyze an instance
    Analyze {
        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,
    },

    /// Write a random Euclidean instance in TSPLIB format
    Generate {
        /// Number of cities
        #[arg(short = 'n', long)]
        size: usize,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Coordinates are drawn from [0, extent)
        #[arg(short, long, default_value = "1000")]
        extent: f64,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Algorithm {
    /// MST preorder walk (2-approximation)
    TwiceAround,
    /// Christofides with greedy matching
    Christofides,
    /// Christofides with exact matching on small odd sets
    ChristofidesExact,
    /// Exact branch-and-bound
    BranchAndBound,
    /// Run everything
    All,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            instance,
            algorithm,
            time_limit,
            output,
            visualize,
            draw_tree,
            plot_data,
            verbose,
        } => {
            let outputs = SolveOutputs { json: output, visualize, draw_tree, plot_data };
            solve_instance(&instance, algorithm, time_limit, outputs, verbose);
        }

        Commands::Benchmark { dir, output, time_limit, exact, exact_max_size, max_size, best_known } => {
            run_benchmark(&dir, &output, time_limit, exact, exact_max_size, max_size, best_known.as_deref());
        }

        Commands::Analyze { instance } => {
            analyze_instance(&instance);
        }

        Commands::Generate { size, seed, extent, output } => {
            generate_instance(size, seed, extent, &output);
        }
    }
}

fn load_or_exit(path: &Path) -> TspInstance {
    match TspInstance::from_file(path) {
        Ok(inst) => inst,
        Err(e) => {
            eprintln!("Error loading instance: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_exact(instance: &TspInstance, time_limit: u64, verbose: bool) -> Solution {
    let solver = BranchAndBound::new(BranchAndBoundConfig {
        time_limit: Duration::from_secs(time_limit),
    });
    let outcome = solver.solve(&instance.distances);

    match outcome.status {
        SearchStatus::Optimal => {}
        SearchStatus::TimedOut => println!("Branch and bound: time limit of {}s reached", time_limit),
        SearchStatus::Infeasible => println!("Branch and bound: the instance has no Hamiltonian cycle"),
    }
    if verbose {
        let stats = &outcome.statistics;
        println!(
            "Nodes: {} pushed, {} expanded, {} pruned, peak frontier {}",
            stats.nodes_pushed, stats.nodes_expanded, stats.nodes_pruned, stats.peak_frontier
        );
    }

    let mut solution = Solution::from_tour(&instance.distances, outcome.tour, solver.name());
    solution.computation_time = outcome.statistics.elapsed;
    solution.nodes_explored = Some(outcome.statistics.nodes_expanded);
    solution
}

fn print_solution(solution: &Solution, verbose: bool) {
    print!("\n{}", solution);
    if verbose && !solution.is_empty() {
        println!("  Tour: {:?}", solution.tour);
    }
}

/// Files produced by `solve` besides the console summary
struct SolveOutputs {
    json: Option<PathBuf>,
    visualize: bool,
    draw_tree: bool,
    plot_data: Option<PathBuf>,
}

fn solve_instance(path: &Path, algorithm: Algorithm, time_limit: u64, outputs: SolveOutputs, verbose: bool) {
    println!("Loading instance from {:?}...", path);
    let instance = load_or_exit(path);

    if verbose {
        println!("{}", instance.statistics());
    }

    let mut solutions = Vec::new();
    if matches!(algorithm, Algorithm::TwiceAround | Algorithm::All) {
        solutions.push(TwiceAroundTheTree::new().construct(&instance));
    }
    if matches!(algorithm, Algorithm::Christofides | Algorithm::All) {
        solutions.push(Christofides::new().construct(&instance));
    }
    if matches!(algorithm, Algorithm::ChristofidesExact | Algorithm::All) {
        solutions.push(Christofides::with_matching(ExactMatching::new()).construct(&instance));
    }
    if matches!(algorithm, Algorithm::BranchAndBound | Algorithm::All) {
        solutions.push(run_exact(&instance, time_limit, verbose));
    }

    for solution in &solutions {
        print_solution(solution, verbose);
    }

    if let Some(out_path) = outputs.json {
        let json = if solutions.len() == 1 {
            serde_json::to_string_pretty(&solutions[0])
        } else {
            serde_json::to_string_pretty(&solutions)
        };
        let written = json
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(&out_path, json).map_err(|e| e.to_string()));
        match written {
            Ok(()) => println!("\nSolution saved to {:?}", out_path),
            Err(e) => {
                eprintln!("Failed to write output: {}", e);
                std::process::exit(1);
            }
        }
    }

    let viz = Visualizer { draw_tree: outputs.draw_tree, ..Visualizer::new() };

    if let Some(data_path) = outputs.plot_data {
        match std::fs::write(&data_path, viz.export_run_data(&instance, &solutions)) {
            Ok(()) => println!("Plot data saved to {:?}", data_path),
            Err(e) => {
                eprintln!("Failed to write plot data: {}", e);
                std::process::exit(1);
            }
        }
    }

    if outputs.visualize {
        for solution in solutions.iter().filter(|s| !s.is_empty()) {
            let Some(svg) = viz.generate_svg(&instance, solution) else {
                println!("Instance has no coordinates, skipping visualization");
                break;
            };
            let stem = solution.algorithm.to_lowercase();
            let png_path = path.with_extension(format!("{}.png", stem));
            match viz.save_png(&svg, &png_path) {
                Ok(()) => println!("Visualization saved to {:?}", png_path),
                Err(e) => {
                    let svg_path = path.with_extension(format!("{}.svg", stem));
                    match viz.save_svg(&svg, &svg_path) {
                        Ok(()) => println!("PNG conversion failed ({}). Saved SVG to {:?}", e, svg_path),
                        Err(e) => eprintln!("Failed to save SVG: {}", e),
                    }
                }
            }
        }
    }
}

fn run_benchmark(
    dir: &Path,
    output: &Path,
    time_limit: u64,
    exact: bool,
    exact_max_size: usize,
    max_size: Option<usize>,
    best_known: Option<&Path>,
) {
    println!("Loading instances from {:?}...", dir);

    let mut instances = match load_instances_from_dir(dir) {
        Ok(instances) => instances,
        Err(e) => {
            eprintln!("Error reading {:?}: {}", dir, e);
            std::process::exit(1);
        }
    };

    if let Some(max) = max_size {
        instances.retain(|i| i.dimension <= max);
    }

    println!("Found {} instances", instances.len());

    if instances.is_empty() {
        eprintln!("No instances found!");
        return;
    }

    let config = BenchmarkConfig {
        time_limit: Duration::from_secs(time_limit),
        run_exact: exact,
        exact_max_dimension: exact_max_size,
        output_dir: output.to_string_lossy().to_string(),
        ..Default::default()
    };

    let mut benchmark = Benchmark::new(config);
    if let Some(best_path) = best_known {
        match benchmark.load_best_known_file(best_path) {
            Ok(count) => println!("Loaded {} best known values from {:?}", count, best_path),
            Err(e) => {
                eprintln!("Error reading best known values {:?}: {}", best_path, e);
                std::process::exit(1);
            }
        }
    }
    benchmark.run_on_instances(&instances);

    if let Err(e) = benchmark.save() {
        eprintln!("Failed to save results: {}", e);
        std::process::exit(1);
    }
    println!("\n{}", benchmark.generate_report());
    println!("Results saved to {:?}", output);
}

fn analyze_instance(path: &Path) {
    let instance = load_or_exit(path);

    println!("========== Instance Analysis ==========\n");
    let stats = instance.statistics();
    println!("{}", stats);

    let twice = TwiceAroundTheTree::new().construct(&instance);
    let christofides = Christofides::new().construct(&instance);

    println!("\nQuick Solution Estimates:");
    for solution in [&twice, &christofides] {
        let ratio = if stats.mst_weight > 0.0 {
            format!("{:.3}", solution.cost / stats.mst_weight)
        } else {
            "-".to_string()
        };
        println!(
            "  {}: {:.2} (valid: {}, cost/MST: {})",
            solution.algorithm, solution.cost, solution.valid, ratio
        );
    }
}

fn generate_instance(size: usize, seed: u64, extent: f64, output: &Path) {
    let instance = match TspInstance::random_euclidean(size, seed, extent) {
        Ok(instance) => instance,
        Err(e) => {
            eprintln!("Error generating instance: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = std::fs::write(output, instance.to_tsplib()) {
        eprintln!("Failed to write {:?}: {}", output, e);
        std::process::exit(1);
    }
    println!("Wrote {} ({} cities) to {:?}", instance.name, size, output);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_tree_is_independent_of_verbose() {
        let cli = Cli::try_parse_from(["tsp-solver", "solve", "-i", "a.tsp", "--visualize", "--draw-tree"]).unwrap();
        let Commands::Solve { draw_tree, verbose, plot_data, .. } = cli.command else {
            panic!("expected solve");
        };
        assert!(draw_tree && !verbose);
        assert!(plot_data.is_none());

        let cli = Cli::try_parse_from(["tsp-solver", "solve", "-i", "a.tsp", "-v", "--plot-data", "run.txt"]).unwrap();
        let Commands::Solve { draw_tree, verbose, plot_data, .. } = cli.command else {
            panic!("expected solve");
        };
        assert!(!draw_tree && verbose);
        assert_eq!(plot_data, Some(PathBuf::from("run.txt")));
    }

    #[test]
    fn test_benchmark_best_known_flag() {
        let cli = Cli::try_parse_from(["tsp-solver", "benchmark", "-d", "data", "--best-known", "opt.csv"]).unwrap();
        let Commands::Benchmark { best_known, .. } = cli.command else {
            panic!("expected benchmark");
        };
        assert_eq!(best_known, Some(PathBuf::from("opt.csv")));
    }
}
