//! Module for parsing and representing TSP instances.
//!
//! This module handles the TSPLIB format files. It supports Euclidean 2D
//! coordinates (`EUC_2D`) and explicit weight matrices (`EXPLICIT` with
//! `FULL_MATRIX`, `UPPER_ROW` or `LOWER_DIAG_ROW`), and turns either into a
//! validated [`DistanceMatrix`].

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TspError};
use crate::graph::minimum_spanning_tree;
use crate::matrix::DistanceMatrix;

/// A point in the plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Euclidean distance (not rounded)
    #[inline]
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeWeightType {
    Euclidean2D,
    Explicit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeWeightFormat {
    FullMatrix,
    UpperRow,
    LowerDiagRow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Coords,
    Display,
    Weights,
}

/// Represents a complete TSP instance
#[derive(Debug, Clone)]
pub struct TspInstance {
    /// Name of the instance
    pub name: String,
    /// Comment/description
    pub comment: String,
    /// Number of cities
    pub dimension: usize,
    /// City coordinates, empty for explicit instances without display data
    pub points: Vec<Point>,
    /// Validated distance matrix
    pub distances: DistanceMatrix,
}

impl TspInstance {
    /// Build an instance from coordinates
    pub fn from_points(name: &str, points: Vec<Point>) -> Result<Self> {
        let distances = DistanceMatrix::from_points(&points)?;
        Ok(TspInstance {
            name: name.to_string(),
            comment: String::new(),
            dimension: points.len(),
            points,
            distances,
        })
    }

    /// Build an instance from a dense matrix (off-diagonal zero = no edge)
    pub fn from_matrix(name: &str, rows: Vec<Vec<f64>>) -> Result<Self> {
        let distances = DistanceMatrix::from_rows(rows)?;
        Ok(TspInstance {
            name: name.to_string(),
            comment: String::new(),
            dimension: distances.len(),
            points: Vec::new(),
            distances,
        })
    }

    /// Uniformly random points in `[0, extent)^2`. Deterministic via seed.
    pub fn random_euclidean(n: usize, seed: u64, extent: f64) -> Result<Self> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let points = (0..n)
            .map(|_| Point::new(rng.gen::<f64>() * extent, rng.gen::<f64>() * extent))
            .collect();
        let mut instance = Self::from_points(&format!("random{}-{}", n, seed), points)?;
        instance.comment = format!("{} uniform random points, seed {}", n, seed);
        Ok(instance)
    }

    /// Parse a TSP instance from a TSPLIB format file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        Self::parse(BufReader::new(file))
    }

    /// Parse TSPLIB text held in memory
    pub fn parse_str(text: &str) -> Result<Self> {
        Self::parse(Cursor::new(text))
    }

    /// Parse TSPLIB content from any buffered reader
    pub fn parse<R: BufRead>(reader: R) -> Result<Self> {
        let mut name = String::new();
        let mut comment = String::new();
        let mut dimension: Option<usize> = None;
        let mut weight_type = EdgeWeightType::Euclidean2D;
        let mut weight_format = EdgeWeightFormat::FullMatrix;
        let mut coords: Vec<Point> = Vec::new();
        let mut weights: Vec<f64> = Vec::new();
        let mut section = Section::None;

        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line?;
            let line = line.trim();

            if line.is_empty() {
                continue;
            }
            if line == "EOF" {
                break;
            }

            if line.ends_with("_SECTION") {
                section = match line {
                    "NODE_COORD_SECTION" => Section::Coords,
                    "DISPLAY_DATA_SECTION" => Section::Display,
                    "EDGE_WEIGHT_SECTION" => Section::Weights,
                    other => {
                        return Err(TspError::Unsupported { key: "section", value: other.to_string() })
                    }
                };
                continue;
            }

            if let Some((key, value)) = line.split_once(':') {
                let value = value.trim();
                match key.trim() {
                    "NAME" => name = value.to_string(),
                    "COMMENT" => comment = value.to_string(),
                    "TYPE" => {
                        if value != "TSP" {
                            return Err(TspError::Unsupported { key: "TYPE", value: value.to_string() });
                        }
                    }
                    "DIMENSION" => {
                        dimension = Some(
                            value
                                .parse()
                                .map_err(|_| TspError::parse(line_no, "invalid dimension"))?,
                        )
                    }
                    "EDGE_WEIGHT_TYPE" => {
                        weight_type = match value {
                            "EUC_2D" => EdgeWeightType::Euclidean2D,
                            "EXPLICIT" => EdgeWeightType::Explicit,
                            other => {
                                return Err(TspError::Unsupported {
                                    key: "EDGE_WEIGHT_TYPE",
                                    value: other.to_string(),
                                })
                            }
                        }
                    }
                    "EDGE_WEIGHT_FORMAT" => {
                        weight_format = match value {
                            "FULL_MATRIX" => EdgeWeightFormat::FullMatrix,
                            "UPPER_ROW" => EdgeWeightFormat::UpperRow,
                            "LOWER_DIAG_ROW" => EdgeWeightFormat::LowerDiagRow,
                            other => {
                                return Err(TspError::Unsupported {
                                    key: "EDGE_WEIGHT_FORMAT",
                                    value: other.to_string(),
                                })
                            }
                        }
                    }
                    // DISPLAY_DATA_TYPE, NODE_COORD_TYPE, ...
                    _ => {}
                }
                continue;
            }

            match section {
                Section::Coords | Section::Display => {
                    let parts: Vec<&str> = line.split_whitespace().collect();
                    if parts.len() < 3 {
                        return Err(TspError::parse(line_no, "expected `id x y`"));
                    }
                    let x: f64 = parts[1]
                        .parse()
                        .map_err(|_| TspError::parse(line_no, "invalid x coordinate"))?;
                    let y: f64 = parts[2]
                        .parse()
                        .map_err(|_| TspError::parse(line_no, "invalid y coordinate"))?;
                    coords.push(Point::new(x, y));
                }
                Section::Weights => {
                    for token in line.split_whitespace() {
                        let w: f64 = token
                            .parse()
                            .map_err(|_| TspError::parse(line_no, format!("invalid weight `{}`", token)))?;
                        weights.push(w);
                    }
                }
                Section::None => {
                    return Err(TspError::parse(line_no, "data outside of any section"));
                }
            }
        }

        let dimension = dimension.ok_or_else(|| TspError::parse(0, "missing DIMENSION"))?;
        if dimension == 0 {
            return Err(TspError::EmptyMatrix);
        }

        let (points, distances) = match weight_type {
            EdgeWeightType::Euclidean2D => {
                if coords.len() != dimension {
                    return Err(TspError::DimensionMismatch {
                        what: "coordinates",
                        expected: dimension,
                        found: coords.len(),
                    });
                }
                let distances = DistanceMatrix::from_points(&coords)?;
                (coords, distances)
            }
            EdgeWeightType::Explicit => {
                let rows = Self::expand_weights(&weights, dimension, weight_format)?;
                let distances = DistanceMatrix::from_rows(rows)?;
                // display coordinates are optional and only used for drawing
                let points = if coords.len() == dimension { coords } else { Vec::new() };
                (points, distances)
            }
        };

        Ok(TspInstance { name, comment, dimension, points, distances })
    }

    fn expand_weights(
        weights: &[f64],
        n: usize,
        format: EdgeWeightFormat,
    ) -> Result<Vec<Vec<f64>>> {
        let expected = match format {
            EdgeWeightFormat::FullMatrix => n * n,
            EdgeWeightFormat::UpperRow => n * (n - 1) / 2,
            EdgeWeightFormat::LowerDiagRow => n * (n + 1) / 2,
        };
        if weights.len() != expected {
            return Err(TspError::DimensionMismatch {
                what: "edge weights",
                expected,
                found: weights.len(),
            });
        }

        let mut rows = vec![vec![0.0; n]; n];
        let mut values = weights.iter().copied();
        match format {
            EdgeWeightFormat::FullMatrix => {
                for row in rows.iter_mut() {
                    for cell in row.iter_mut() {
                        *cell = values.next().unwrap_or(0.0);
                    }
                }
            }
            EdgeWeightFormat::UpperRow => {
                for i in 0..n {
                    for j in (i + 1)..n {
                        let w = values.next().unwrap_or(0.0);
                        rows[i][j] = w;
                        rows[j][i] = w;
                    }
                }
            }
            EdgeWeightFormat::LowerDiagRow => {
                for i in 0..n {
                    for j in 0..=i {
                        let w = values.next().unwrap_or(0.0);
                        rows[i][j] = w;
                        rows[j][i] = w;
                    }
                }
            }
        }
        Ok(rows)
    }

    /// Serialise back to TSPLIB. Instances with coordinates are written as
    /// `EUC_2D`, the others as an explicit full matrix.
    pub fn to_tsplib(&self) -> String {
        let mut out = format!("NAME: {}\n", self.name);
        if !self.comment.is_empty() {
            out.push_str(&format!("COMMENT: {}\n", self.comment));
        }
        out.push_str("TYPE: TSP\n");
        out.push_str(&format!("DIMENSION: {}\n", self.dimension));

        if self.points.len() == self.dimension {
            out.push_str("EDGE_WEIGHT_TYPE: EUC_2D\n");
            out.push_str("NODE_COORD_SECTION\n");
            for (i, p) in self.points.iter().enumerate() {
                out.push_str(&format!("{} {} {}\n", i + 1, p.x, p.y));
            }
        } else {
            out.push_str("EDGE_WEIGHT_TYPE: EXPLICIT\n");
            out.push_str("EDGE_WEIGHT_FORMAT: FULL_MATRIX\n");
            out.push_str("EDGE_WEIGHT_SECTION\n");
            for row in self.distances.to_rows() {
                let line: Vec<String> = row.iter().map(|w| w.to_string()).collect();
                out.push_str(&line.join(" "));
                out.push('\n');
            }
        }
        out.push_str("EOF\n");
        out
    }

    /// Get the distance between two cities (infinity if not connected)
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distances.weight(i, j)
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let mut distances: Vec<f64> = Vec::new();
        for i in 0..self.dimension {
            for (j, w) in self.distances.neighbors(i) {
                if j > i {
                    distances.push(w);
                }
            }
        }

        let possible = self.dimension * (self.dimension - 1) / 2;
        let avg_distance = if distances.is_empty() {
            0.0
        } else {
            distances.iter().sum::<f64>() / distances.len() as f64
        };
        let min_distance = distances.iter().cloned().fold(f64::INFINITY, f64::min);
        let max_distance = distances.iter().cloned().fold(0.0, f64::max);
        let tree = minimum_spanning_tree(&self.distances);

        InstanceStatistics {
            name: self.name.clone(),
            dimension: self.dimension,
            num_edges: distances.len(),
            complete: distances.len() == possible,
            has_coordinates: self.points.len() == self.dimension,
            avg_distance,
            min_distance: if distances.is_empty() { 0.0 } else { min_distance },
            max_distance,
            mst_weight: tree.total_weight(),
            connected: tree.edge_count() + 1 == self.dimension,
        }
    }
}

/// Statistics about a TSP instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub dimension: usize,
    pub num_edges: usize,
    pub complete: bool,
    pub has_coordinates: bool,
    pub avg_distance: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    /// Weight of a minimum spanning tree, a lower bound on any tour
    pub mst_weight: f64,
    pub connected: bool,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Cities: {}", self.dimension)?;
        writeln!(f, "  Edges: {} (complete: {})", self.num_edges, self.complete)?;
        writeln!(f, "  Coordinates: {}", self.has_coordinates)?;
        writeln!(f, "  Connected: {}", self.connected)?;
        writeln!(f, "  Min distance: {:.2}", self.min_distance)?;
        writeln!(f, "  Avg distance: {:.2}", self.avg_distance)?;
        writeln!(f, "  Max distance: {:.2}", self.max_distance)?;
        writeln!(f, "  MST weight (lower bound): {:.2}", self.mst_weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EUC: &str = "NAME : square
COMMENT : unit square plus centre
TYPE : TSP
DIMENSION : 5
EDGE_WEIGHT_TYPE : EUC_2D
NODE_COORD_SECTION
1 0 0
2 3 0
3 3 4
4 0 4
5 1.5 2
EOF
";

    #[test]
    fn test_parse_euclidean() {
        let instance = TspInstance::parse_str(EUC).unwrap();
        assert_eq!(instance.name, "square");
        assert_eq!(instance.dimension, 5);
        assert_eq!(instance.points.len(), 5);
        assert!((instance.distance(0, 2) - 5.0).abs() < 1e-12);
        assert!((instance.distance(1, 0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_parse_explicit_formats() {
        let full = "NAME: four\nTYPE: TSP\nDIMENSION: 4\nEDGE_WEIGHT_TYPE: EXPLICIT\n\
EDGE_WEIGHT_FORMAT: FULL_MATRIX\nEDGE_WEIGHT_SECTION\n\
0 10 15 20\n10 0 35 25\n15 35 0 30\n20 25 30 0\nEOF\n";
        let upper = "NAME: four\nTYPE: TSP\nDIMENSION: 4\nEDGE_WEIGHT_TYPE: EXPLICIT\n\
EDGE_WEIGHT_FORMAT: UPPER_ROW\nEDGE_WEIGHT_SECTION\n10 15 20\n35 25\n30\nEOF\n";
        let lower = "NAME: four\nTYPE: TSP\nDIMENSION: 4\nEDGE_WEIGHT_TYPE: EXPLICIT\n\
EDGE_WEIGHT_FORMAT: LOWER_DIAG_ROW\nEDGE_WEIGHT_SECTION\n0\n10 0\n15 35 0\n20 25 30 0\nEOF\n";

        let a = TspInstance::parse_str(full).unwrap();
        let b = TspInstance::parse_str(upper).unwrap();
        let c = TspInstance::parse_str(lower).unwrap();
        assert_eq!(a.distances, b.distances);
        assert_eq!(a.distances, c.distances);
        assert_eq!(a.distance(1, 3), 25.0);
        assert!(a.points.is_empty());
    }

    #[test]
    fn test_parse_errors() {
        let missing = "NAME: x\nTYPE: TSP\nDIMENSION: 3\nEDGE_WEIGHT_TYPE: EUC_2D\nNODE_COORD_SECTION\n1 0 0\n2 1 1\nEOF\n";
        assert!(matches!(
            TspInstance::parse_str(missing),
            Err(TspError::DimensionMismatch { expected: 3, found: 2, .. })
        ));

        let geo = "NAME: x\nTYPE: TSP\nDIMENSION: 3\nEDGE_WEIGHT_TYPE: GEO\n";
        assert!(matches!(TspInstance::parse_str(geo), Err(TspError::Unsupported { .. })));

        let garbage = "NAME: x\nDIMENSION: 2\nNODE_COORD_SECTION\n1 a 0\n";
        assert!(matches!(TspInstance::parse_str(garbage), Err(TspError::Parse { line: 4, .. })));

        assert!(TspInstance::parse_str("NAME: empty\nEOF\n").is_err());
    }

    #[test]
    fn test_tsplib_round_trip_keeps_distances() {
        let instance = TspInstance::random_euclidean(12, 3, 100.0).unwrap();
        let reparsed = TspInstance::parse_str(&instance.to_tsplib()).unwrap();
        assert_eq!(reparsed.dimension, 12);
        for i in 0..12 {
            for j in 0..12 {
                assert!((instance.distance(i, j) - reparsed.distance(i, j)).abs() < 1e-9 || i == j);
            }
        }
    }

    #[test]
    fn test_to_tsplib_explicit_with_comment() {
        let rows = vec![
            vec![0.0, 2.0, 3.0],
            vec![2.0, 0.0, 4.0],
            vec![3.0, 4.0, 0.0],
        ];
        let mut instance = TspInstance::from_matrix("tri", rows).unwrap();
        instance.comment = "three cities".to_string();

        let text = instance.to_tsplib();
        assert!(text.starts_with("NAME: tri\nCOMMENT: three cities\nTYPE: TSP\nDIMENSION: 3\n"));
        assert!(text.contains("EDGE_WEIGHT_FORMAT: FULL_MATRIX\n"));
        assert!(text.ends_with("EOF\n"));

        let reparsed = TspInstance::parse_str(&text).unwrap();
        assert_eq!(reparsed.distances, instance.distances);
    }

    #[test]
    fn test_statistics() {
        let instance = TspInstance::parse_str(EUC).unwrap();
        let stats = instance.statistics();
        assert_eq!(stats.num_edges, 10);
        assert!(stats.complete && stats.connected && stats.has_coordinates);
        assert!(stats.mst_weight > 0.0);
        assert!(stats.to_string().contains("square"));
    }
}
