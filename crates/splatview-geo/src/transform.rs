//! The local-to-ECEF scene transform.

use std::path::Path;

use glam::{DMat4, DVec3};
use splatview_core::{Result, SplatviewError};

use crate::geodetic::{ecef_to_geodetic_with, Ellipsoid, Geodetic, GeodeticSolution};

/// Maps scene-local coordinates into ECEF. Geodetic readouts are on WGS84.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EcefTransform {
    matrix: DMat4,
}

impl EcefTransform {
    /// Wraps a column-major local-to-ECEF matrix.
    pub fn new(matrix: DMat4) -> Result<Self> {
        if !matrix.is_finite() {
            return Err(SplatviewError::InvalidTransform(
                "matrix has non-finite entries".into(),
            ));
        }
        Ok(Self { matrix })
    }

    /// Parses the transform file format: 16 whitespace-separated numbers, row-major.
    pub fn parse(text: &str) -> Result<Self> {
        let values = text
            .split_whitespace()
            .enumerate()
            .map(|(i, token)| {
                token.parse::<f64>().map_err(|_| {
                    SplatviewError::InvalidTransform(format!("value {i} is not a number: {token:?}"))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        let rows: [f64; 16] = values.as_slice().try_into().map_err(|_| {
            SplatviewError::InvalidTransform(format!("expected 16 values, found {}", values.len()))
        })?;
        Self::new(DMat4::from_cols_array(&rows).transpose())
    }

    /// Reads and parses a transform file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let transform = Self::parse(&text)?;
        log::info!("loaded ECEF transform from {}", path.display());
        Ok(transform)
    }

    /// Returns the local-to-ECEF matrix.
    pub fn matrix(&self) -> DMat4 {
        self.matrix
    }

    /// Maps a scene-local point into ECEF.
    pub fn local_to_ecef(&self, local: DVec3) -> DVec3 {
        self.matrix.transform_point3(local)
    }

    /// Geodetic position of a scene-local point.
    pub fn geodetic_at(&self, local: DVec3) -> Geodetic {
        self.solve_at(local).geodetic
    }

    /// Geodetic position of a scene-local point with solver diagnostics.
    pub fn solve_at(&self, local: DVec3) -> GeodeticSolution {
        ecef_to_geodetic_with(self.local_to_ecef(local), &Ellipsoid::WGS84)
    }

    /// Metric distance between two scene-local points, measured in ECEF.
    pub fn measure_distance(&self, p1: DVec3, p2: DVec3) -> f64 {
        self.local_to_ecef(p1).distance(self.local_to_ecef(p2))
    }
}
