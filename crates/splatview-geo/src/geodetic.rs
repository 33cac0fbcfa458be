//! ECEF to geodetic conversion.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Maximum number of fixed-point iterations.
pub const MAX_ITERATIONS: usize = 100;

/// Latitude change (radians) below which the solver stops.
pub const CONVERGENCE_EPSILON: f64 = 1e-12;

/// A reference ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    /// Equatorial radius in meters.
    pub semi_major_axis: f64,
    /// First eccentricity squared.
    pub eccentricity_squared: f64,
}

impl Ellipsoid {
    /// The WGS84 ellipsoid.
    pub const WGS84: Ellipsoid = Ellipsoid {
        semi_major_axis: 6_378_137.0,
        eccentricity_squared: 0.006_694_379_990_14,
    };

    /// Prime-vertical radius of curvature at `lat` (radians).
    pub fn prime_vertical_radius(&self, lat: f64) -> f64 {
        let sin_lat = lat.sin();
        self.semi_major_axis / (1.0 - self.eccentricity_squared * sin_lat * sin_lat).sqrt()
    }

    /// Polar radius in meters.
    pub fn semi_minor_axis(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity_squared).sqrt()
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::WGS84
    }
}

/// A geographic position: degrees and ellipsoidal height in meters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Geodetic {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
}

/// The solver's answer together with how it got there.
///
/// An unconverged solution is still the best estimate after
/// [`MAX_ITERATIONS`] steps, not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodeticSolution {
    pub geodetic: Geodetic,
    pub iterations: usize,
    pub converged: bool,
}

/// Converts an ECEF position on WGS84 to latitude, longitude and altitude.
pub fn ecef_to_geodetic(ecef: DVec3) -> Geodetic {
    ecef_to_geodetic_with(ecef, &Ellipsoid::WGS84).geodetic
}

/// Fixed-point ECEF to geodetic conversion on an arbitrary ellipsoid.
///
/// Longitude is closed-form. Latitude and altitude are refined from
/// `lat = atan2(z, r)`, `alt = 0` until both settle or the iteration budget runs
/// out. Altitude is recovered through whichever of `cos(lat)` and `sin(lat)`
/// is larger, which keeps the poles well conditioned.
pub fn ecef_to_geodetic_with(ecef: DVec3, ellipsoid: &Ellipsoid) -> GeodeticSolution {
    let e2 = ellipsoid.eccentricity_squared;
    let radius_xy = ecef.x.hypot(ecef.y);
    let lon = ecef.y.atan2(ecef.x);
    // Altitude settles to within a few ulps of the radius, not of zero
    let alt_epsilon = CONVERGENCE_EPSILON * ellipsoid.semi_major_axis;

    let mut lat = ecef.z.atan2(radius_xy);
    let mut alt = 0.0;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < MAX_ITERATIONS {
        iterations += 1;
        let n = ellipsoid.prime_vertical_radius(lat);
        let (sin_lat, cos_lat) = lat.sin_cos();
        let prev_lat = lat;
        let prev_alt = alt;

        alt = if cos_lat.abs() >= sin_lat.abs() {
            radius_xy / cos_lat - n
        } else {
            ecef.z / sin_lat - n * (1.0 - e2)
        };
        lat = ecef.z.atan2(radius_xy * (1.0 - e2 * n / (n + alt)));

        if (alt - prev_alt).abs() < alt_epsilon && (lat - prev_lat).abs() < CONVERGENCE_EPSILON {
            converged = true;
            break;
        }
    }

    if !converged {
        log::debug!("ECEF conversion of {ecef} did not converge in {iterations} iterations");
    }

    GeodeticSolution {
        geodetic: Geodetic {
            lat: lat.to_degrees(),
            lon: lon.to_degrees(),
            alt,
        },
        iterations,
        converged,
    }
}

/// Closed-form geodetic to ECEF conversion.
pub fn geodetic_to_ecef(geodetic: &Geodetic, ellipsoid: &Ellipsoid) -> DVec3 {
    let lat = geodetic.lat.to_radians();
    let lon = geodetic.lon.to_radians();
    let n = ellipsoid.prime_vertical_radius(lat);
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();

    DVec3::new(
        (n + geodetic.alt) * cos_lat * cos_lon,
        (n + geodetic.alt) * cos_lat * sin_lon,
        (n * (1.0 - ellipsoid.eccentricity_squared) + geodetic.alt) * sin_lat,
    )
}
