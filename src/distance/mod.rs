//! Distance metrics for graph construction and search.
//!
//! Two metrics are supported: squared Euclidean (L2²) and inner-product
//! distance (`1 − dot`). Both operate on raw f32 vectors; the storage
//! transform is the identity copy. [`Distance`] bundles a metric with the
//! vector dimension and knows how to persist its own state.

/// SIMD kernels: NEON (aarch64) and AVX2+FMA (x86_64) with scalar fallback.
pub mod simd;

use serde::{Deserialize, Serialize};
use std::io::{self, Read, Write};

/// Distance metric used for vector similarity computation.
///
/// All metrics return a value where **lower is better** (more similar).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Squared Euclidean distance (L2²). Range: \[0, ∞).
    SquaredL2,
    /// Inner-product distance: `1 − dot(a, b)`. Lower = higher similarity.
    InnerProduct,
}

impl DistanceMetric {
    /// Stable numeric tag used in the binary index format.
    pub fn id(self) -> i32 {
        match self {
            DistanceMetric::SquaredL2 => 0,
            DistanceMetric::InnerProduct => 1,
        }
    }

    /// Inverse of [`DistanceMetric::id`]. Returns `None` for unknown tags.
    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            0 => Some(DistanceMetric::SquaredL2),
            1 => Some(DistanceMetric::InnerProduct),
            _ => None,
        }
    }
}

/// Distance capability consumed by the index: a metric plus the fixed vector
/// dimension it operates over.
///
/// The stored form of a vector is its raw f32 representation, so
/// [`Distance::transform`] is a copy and [`Distance::data_size`] is
/// `dimension * 4` bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distance {
    metric: DistanceMetric,
    dimension: usize,
}

impl Distance {
    /// Create a distance capability for the given metric and dimension.
    pub fn new(metric: DistanceMetric, dimension: usize) -> Self {
        assert!(dimension > 0, "dimension must be positive");
        assert!(
            dimension <= crate::config::MAX_DIMENSION,
            "dimension {dimension} exceeds MAX_DIMENSION"
        );
        Self { metric, dimension }
    }

    /// Squared-L2 capability for `dimension`-element vectors.
    pub fn squared_l2(dimension: usize) -> Self {
        Self::new(DistanceMetric::SquaredL2, dimension)
    }

    /// Inner-product capability for `dimension`-element vectors.
    pub fn inner_product(dimension: usize) -> Self {
        Self::new(DistanceMetric::InnerProduct, dimension)
    }

    /// The metric this capability computes.
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// The fixed vector dimension.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Size in bytes of one stored vector.
    pub fn data_size(&self) -> usize {
        self.dimension * std::mem::size_of::<f32>()
    }

    /// Convert one raw vector into storage form. Identity copy for both
    /// metrics.
    #[inline]
    pub fn transform(&self, dst: &mut [f32], src: &[f32]) {
        dst.copy_from_slice(src);
    }

    /// Distance between two stored vectors. Non-negative for squared L2;
    /// inner-product distance may go negative for vectors with norm > 1.
    #[inline]
    pub fn compute(&self, x: &[f32], y: &[f32]) -> f32 {
        match self.metric {
            DistanceMetric::SquaredL2 => simd::euclidean_sq_f32(x, y),
            DistanceMetric::InnerProduct => 1.0 - simd::dot_product_f32(x, y),
        }
    }

    /// Write the capability's state: `i32` metric id, `u64` dimension, both
    /// little-endian.
    pub(crate) fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.metric.id().to_le_bytes())?;
        writer.write_all(&(self.dimension as u64).to_le_bytes())?;
        Ok(())
    }

    /// Read a capability previously written by [`Distance::write_to`].
    pub(crate) fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut id_buf = [0u8; 4];
        reader.read_exact(&mut id_buf)?;
        let id = i32::from_le_bytes(id_buf);
        let metric = DistanceMetric::from_id(id).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unknown distance metric id {id}"),
            )
        })?;
        let mut dim_buf = [0u8; 8];
        reader.read_exact(&mut dim_buf)?;
        let dimension = u64::from_le_bytes(dim_buf) as usize;
        if dimension == 0 || dimension > crate::config::MAX_DIMENSION {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("distance dimension {dimension} out of range"),
            ));
        }
        Ok(Self { metric, dimension })
    }
}
