//! # Spherical Projection
//!
//! Maps latitude/longitude to points on the unit sphere and samples 3D
//! fields there. A planet surface sampled this way has no seam at the
//! antimeridian and no pinching at the poles, because the field itself is
//! continuous in 3D and both sides of the seam land on the same 3D point.
//!
//! ```text
//! x = cos(lat) * cos(lon)
//! y = cos(lat) * sin(lon)
//! z = sin(lat)
//! ```

use bytemuck::{Pod, Zeroable};
use rayon::prelude::*;

use crate::error::{GenError, GenResult};
use crate::fractal::Fbm;
use crate::warp::DomainWarp;

/// A point on (or near) the unit sphere.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct SpherePoint {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component (towards the north pole).
    pub z: f64,
}

impl SpherePoint {
    /// Euclidean length.
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Latitude and longitude in degrees, longitude in `(-180, 180]`.
    #[must_use]
    pub fn to_lat_lon(&self) -> (f64, f64) {
        let len = self.length();
        if len == 0.0 {
            return (0.0, 0.0);
        }
        let lat = (self.z / len).clamp(-1.0, 1.0).asin().to_degrees();
        let lon = self.y.atan2(self.x).to_degrees();
        (lat, lon)
    }

    /// Scales the point by `factor`.
    #[inline]
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
            z: self.z * factor,
        }
    }
}

/// Wraps a longitude into `[-180, 180)`.
#[inline]
fn wrap_longitude(lon_deg: f64) -> f64 {
    (lon_deg + 180.0).rem_euclid(360.0) - 180.0
}

/// Projects latitude/longitude in degrees onto the unit sphere.
///
/// Longitude is wrapped first, so `lon = 180` and `lon = -180` produce the
/// identical point.
///
/// # Errors
///
/// Returns [`GenError::InvalidCoordinate`] for non-finite input or a latitude
/// outside `[-90, 90]`.
pub fn to_unit_sphere(lat_deg: f64, lon_deg: f64) -> GenResult<SpherePoint> {
    if !lat_deg.is_finite() || !(-90.0..=90.0).contains(&lat_deg) {
        return Err(GenError::InvalidCoordinate {
            axis: 0,
            value: lat_deg,
        });
    }
    if !lon_deg.is_finite() {
        return Err(GenError::InvalidCoordinate {
            axis: 1,
            value: lon_deg,
        });
    }
    let (sin_lat, cos_lat) = lat_deg.to_radians().sin_cos();
    let (sin_lon, cos_lon) = wrap_longitude(lon_deg).to_radians().sin_cos();
    Ok(SpherePoint {
        x: cos_lat * cos_lon,
        y: cos_lat * sin_lon,
        z: sin_lat,
    })
}

/// The 3D field a heightfield samples.
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceSource {
    /// Plain fractal noise.
    Fbm(Fbm),
    /// Domain-warped fractal noise.
    Warped(Box<DomainWarp>),
}

impl SurfaceSource {
    #[inline]
    fn sample3(&self, p: SpherePoint) -> f64 {
        match self {
            Self::Fbm(f) => f.sample3(p.x, p.y, p.z),
            Self::Warped(w) => w.sample3(p.x, p.y, p.z),
        }
    }
}

impl From<Fbm> for SurfaceSource {
    fn from(fbm: Fbm) -> Self {
        Self::Fbm(fbm)
    }
}

impl From<DomainWarp> for SurfaceSource {
    fn from(warp: DomainWarp) -> Self {
        Self::Warped(Box::new(warp))
    }
}

/// A height field wrapped around a sphere.
#[derive(Clone, Debug, PartialEq)]
pub struct SphericalHeightfield {
    source: SurfaceSource,
    frequency: f64,
}

impl SphericalHeightfield {
    /// Wraps a field; `frequency` scales the unit sphere before sampling.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::InvalidParameter`] unless `frequency` is finite
    /// and positive.
    pub fn new(source: impl Into<SurfaceSource>, frequency: f64) -> GenResult<Self> {
        if !(frequency > 0.0 && frequency.is_finite()) {
            return Err(GenError::invalid(
                "frequency",
                format!("{frequency} must be finite and positive"),
            ));
        }
        Ok(Self {
            source: source.into(),
            frequency,
        })
    }

    /// Sphere scale applied before sampling.
    #[must_use]
    pub const fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Samples at a point already on the sphere.
    #[inline]
    #[must_use]
    pub fn sample_point(&self, p: SpherePoint) -> f64 {
        self.source.sample3(p.scaled(self.frequency))
    }

    /// Samples at latitude/longitude in degrees.
    ///
    /// # Errors
    ///
    /// See [`to_unit_sphere`].
    pub fn sample(&self, lat_deg: f64, lon_deg: f64) -> GenResult<f64> {
        Ok(self.sample_point(to_unit_sphere(lat_deg, lon_deg)?))
    }

    /// Fills a row-major `width * height` equirectangular map.
    ///
    /// Row 0 is latitude 90, the last row latitude -90; column 0 is
    /// longitude -180 and columns step east by `360 / width`.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::InvalidParameter`] for a zero dimension.
    pub fn equirectangular(&self, width: usize, height: usize) -> GenResult<Vec<f64>> {
        let points = equirectangular_points(width, height)?;
        Ok(points.iter().map(|&p| self.sample_point(p)).collect())
    }

    /// Parallel [`SphericalHeightfield::equirectangular`] with identical
    /// output.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::InvalidParameter`] for a zero dimension.
    pub fn par_equirectangular(&self, width: usize, height: usize) -> GenResult<Vec<f64>> {
        let points = equirectangular_points(width, height)?;
        Ok(points.par_iter().map(|&p| self.sample_point(p)).collect())
    }
}

/// Unit sphere points of an equirectangular map, row-major.
///
/// # Errors
///
/// Returns [`GenError::InvalidParameter`] for a zero dimension.
pub fn equirectangular_points(width: usize, height: usize) -> GenResult<Vec<SpherePoint>> {
    if width == 0 || height == 0 {
        return Err(GenError::invalid(
            "dimensions",
            format!("{width}x{height} map has no pixels"),
        ));
    }
    let lat_step = if height > 1 {
        180.0 / (height - 1) as f64
    } else {
        0.0
    };
    let lon_step = 360.0 / width as f64;
    let mut points = Vec::with_capacity(width * height);
    for row in 0..height {
        let lat = if height > 1 {
            90.0 - row as f64 * lat_step
        } else {
            0.0
        };
        for col in 0..width {
            points.push(to_unit_sphere(lat, -180.0 + col as f64 * lon_step)?);
        }
    }
    tracing::debug!(width, height, "projected equirectangular grid");
    Ok(points)
}
