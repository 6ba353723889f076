//! Visualization utilities for TSP tours.
//!
//! Generates SVG drawings of tours over instance coordinates and plain-text
//! exports for external plotting. Instances given as bare matrices have no
//! coordinates and cannot be drawn.

use crate::graph::minimum_spanning_tree;
use crate::instance::{Point, TspInstance};
use crate::solution::Solution;
use std::fs::File;
use std::io::Write;
use std::path::Path;
#[cfg(not(feature = "resvg"))]
use std::process::Command;
#[cfg(feature = "resvg")]
use resvg::usvg;
#[cfg(feature = "resvg")]
use resvg::render;
#[cfg(feature = "resvg")]
use resvg::FitTo;
#[cfg(feature = "resvg")]
use resvg::tiny_skia::{Pixmap, Transform};
#[cfg(feature = "resvg")]
use resvg::usvg::TreeParsing;

/// SVG visualization generator
#[derive(Debug, Clone)]
pub struct Visualizer {
    /// Canvas width
    pub width: f64,
    /// Canvas height
    pub height: f64,
    /// Margin
    pub margin: f64,
    /// Node radius
    pub node_radius: f64,
    /// Overlay the minimum spanning tree as dashed edges
    pub draw_tree: bool,
    /// Label cities with their index
    pub labels: bool,
}

impl Default for Visualizer {
    fn default() -> Self {
        Visualizer {
            width: 800.0,
            height: 800.0,
            margin: 50.0,
            node_radius: 5.0,
            draw_tree: false,
            labels: true,
        }
    }
}

impl Visualizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate SVG visualization of a solution, `None` without coordinates
    pub fn generate_svg(&self, instance: &TspInstance, solution: &Solution) -> Option<String> {
        if instance.points.len() != instance.dimension || instance.points.is_empty() {
            return None;
        }
        let points = &instance.points;
        let mut svg = String::new();

        let (min_x, max_x, min_y, max_y) = self.get_bounds(points);

        let scale_x = (self.width - 2.0 * self.margin) / (max_x - min_x).max(1e-9);
        let scale_y = (self.height - 2.0 * self.margin) / (max_y - min_y).max(1e-9);
        let scale = scale_x.min(scale_y);

        svg.push_str(&format!(
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<style>
    .city {{ fill: #3498db; stroke: #2c3e50; stroke-width: 1; }}
    .start {{ fill: #e74c3c; stroke: #c0392b; stroke-width: 1; }}
    .edge {{ stroke: #34495e; stroke-width: 2; fill: none; }}
    .tree {{ stroke: #27ae60; stroke-width: 1; stroke-dasharray: 4,3; fill: none; }}
    .label {{ font-family: Arial; font-size: 10px; fill: #2c3e50; }}
    .title {{ font-family: Arial; font-size: 14px; fill: #2c3e50; font-weight: bold; }}
</style>
<rect width="100%" height="100%" fill="#ecf0f1"/>
"##,
            self.width, self.height, self.width, self.height
        ));

        let summary = if solution.is_empty() {
            "no solution found".to_string()
        } else {
            format!("Cost: {:.2} | Valid: {}", solution.cost, solution.valid)
        };
        svg.push_str(&format!(
            r##"<text x="{}" y="25" class="title">{} | {} | {}</text>
"##,
            self.margin, instance.name, solution.algorithm, summary
        ));

        let transform = |p: &Point| -> (f64, f64) {
            let tx = self.margin + (p.x - min_x) * scale;
            let ty = self.height - self.margin - (p.y - min_y) * scale;
            (tx, ty)
        };

        if self.draw_tree {
            let tree = minimum_spanning_tree(&instance.distances);
            for u in 0..tree.len() {
                for v in tree.neighbors(u).filter(|&v| v > u) {
                    let (x1, y1) = transform(&points[u]);
                    let (x2, y2) = transform(&points[v]);
                    svg.push_str(&format!(
                        r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" class="tree"/>
"#,
                        x1, y1, x2, y2
                    ));
                }
            }
        }

        for leg in solution.tour.windows(2) {
            let (x1, y1) = transform(&points[leg[0]]);
            let (x2, y2) = transform(&points[leg[1]]);
            svg.push_str(&format!(
                r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" class="edge"/>
"#,
                x1, y1, x2, y2
            ));
        }

        let start = solution.tour.first().copied().unwrap_or(0);
        for (id, point) in points.iter().enumerate() {
            let (x, y) = transform(point);
            let class = if id == start { "start" } else { "city" };

            svg.push_str(&format!(
                r##"<circle cx="{:.2}" cy="{:.2}" r="{}" class="{}"/>
"##,
                x, y, self.node_radius, class
            ));

            if self.labels {
                svg.push_str(&format!(
                    r##"<text x="{:.2}" y="{:.2}" class="label" text-anchor="middle">{}</text>
"##,
                    x,
                    y - self.node_radius - 3.0,
                    id
                ));
            }
        }

        let legend_y = self.height - 30.0;
        svg.push_str(&format!(
            r##"
<rect x="{}" y="{}" width="15" height="15" class="start"/>
<text x="{}" y="{}" class="label">Start</text>
<rect x="{}" y="{}" width="15" height="15" class="city"/>
<text x="{}" y="{}" class="label">City</text>
"##,
            self.margin,
            legend_y,
            self.margin + 20.0,
            legend_y + 12.0,
            self.margin + 80.0,
            legend_y,
            self.margin + 100.0,
            legend_y + 12.0
        ));

        svg.push_str("</svg>");

        Some(svg)
    }

    /// Save SVG to file
    pub fn save_svg<P: AsRef<Path>>(&self, svg: &str, path: P) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(svg.as_bytes())?;
        Ok(())
    }

    /// Save SVG as PNG. Uses the native renderer with the `resvg` feature,
    /// otherwise tries `rsvg-convert`, then `magick convert`, then `inkscape`.
    pub fn save_png<P: AsRef<Path>>(&self, svg: &str, path: P) -> std::io::Result<()> {
        self.render_png(svg, path.as_ref())
    }

    #[cfg(feature = "resvg")]
    fn render_png(&self, svg: &str, path: &Path) -> std::io::Result<()> {
        let other = |msg: String| std::io::Error::new(std::io::ErrorKind::Other, msg);

        let opt = usvg::Options::default();
        let rtree = usvg::Tree::from_str(svg, &opt).map_err(|e| other(format!("usvg parse error: {}", e)))?;
        let mut pixmap = Pixmap::new(self.width.max(1.0) as u32, self.height.max(1.0) as u32)
            .ok_or_else(|| other("Failed to create pixmap".to_string()))?;
        render(&rtree, FitTo::Original, Transform::default(), pixmap.as_mut())
            .ok_or_else(|| other("resvg render failed".to_string()))?;
        pixmap.save_png(path).map_err(|e| other(format!("save_png failed: {}", e)))
    }

    #[cfg(not(feature = "resvg"))]
    fn render_png(&self, svg: &str, path: &Path) -> std::io::Result<()> {
        let tmp_svg = path.with_extension("svg.tmp");
        self.save_svg(svg, &tmp_svg)?;

        let out = path.to_string_lossy().into_owned();
        let out = out.as_str();
        let input = tmp_svg.to_string_lossy().into_owned();
        let input = input.as_str();
        let attempts: [(&str, Vec<&str>); 3] = [
            ("rsvg-convert", vec!["-o", out, input]),
            ("magick", vec!["convert", input, out]),
            ("inkscape", vec![input, "--export-type=png", "--export-filename", out]),
        ];

        for (program, args) in attempts.iter() {
            match Command::new(program).args(args).status() {
                Ok(status) if status.success() => {
                    let _ = std::fs::remove_file(&tmp_svg);
                    return Ok(());
                }
                Ok(status) => log::debug!("{} exited with {}", program, status),
                Err(e) => log::debug!("{} unavailable: {}", program, e),
            }
        }

        let _ = std::fs::remove_file(&tmp_svg);
        Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            "No SVG->PNG converter succeeded (tried rsvg-convert, magick, inkscape)",
        ))
    }

    /// Get coordinate bounds
    fn get_bounds(&self, points: &[Point]) -> (f64, f64, f64, f64) {
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for p in points {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }

        (min_x, max_x, min_y, max_y)
    }

    /// Export data for external plotting (e.g., matplotlib)
    pub fn export_plot_data(&self, instance: &TspInstance, solution: &Solution) -> String {
        let mut data = String::new();

        data.push_str("# TSP Solution Data\n");
        data.push_str(&format!("# Instance: {}\n", instance.name));
        data.push_str(&format!("# Algorithm: {}\n", solution.algorithm));
        if solution.is_empty() {
            data.push_str("# Cost: none\n");
        } else {
            data.push_str(&format!("# Cost: {:.2}\n", solution.cost));
        }
        data.push_str(&format!("# Valid: {}\n\n", solution.valid));

        data.push_str("# Cities: id, x, y\n");
        for (id, p) in instance.points.iter().enumerate() {
            data.push_str(&format!("{},{},{}\n", id, p.x, p.y));
        }

        data.push_str("\n# Tour: sequence of city ids\n");
        let tour_str: Vec<String> = solution.tour.iter().map(|n| n.to_string()).collect();
        data.push_str(&tour_str.join(","));
        data.push('\n');

        data
    }

    /// Plot data for every solution of one run, followed by the comparison
    /// table when more than one algorithm ran
    pub fn export_run_data(&self, instance: &TspInstance, solutions: &[Solution]) -> String {
        let mut data: Vec<String> = solutions
            .iter()
            .map(|solution| self.export_plot_data(instance, solution))
            .collect();
        if solutions.len() > 1 {
            data.push(generate_comparison_data(solutions));
        }
        data.join("\n")
    }
}

/// Generate comparison plot data for multiple solutions
pub fn generate_comparison_data(solutions: &[Solution]) -> String {
    let mut data = String::new();

    data.push_str("# Algorithm Comparison\n");
    data.push_str("algorithm,cost,time,valid\n");

    for sol in solutions {
        let cost = if sol.is_empty() { String::new() } else { format!("{:.2}", sol.cost) };
        data.push_str(&format!(
            "{},{},{:.4},{}\n",
            sol.algorithm, cost, sol.computation_time, sol.valid
        ));
    }

    data
}
