//! SIMD-accelerated distance kernels.
//!
//! Provides NEON (aarch64) and AVX2+FMA (x86_64) implementations of f32
//! dot product and squared Euclidean distance. Falls back to scalar on
//! unsupported platforms or when AVX2 is unavailable at runtime.
//!
//! Kernels tile the input as slices via `chunks_exact` and keep the
//! remainder as a scalar tail, so the only raw-pointer use is the lane load
//! itself. NEON kernels process 8 lanes per iteration with two independent
//! accumulators; the AVX2 kernels use one 8-lane accumulator and reduce with
//! a store-and-sum.

// ============================================================================
// Public dispatch functions
// ============================================================================

/// Dot product between two f32 slices.
#[inline]
#[allow(unreachable_code)]
pub fn dot_product_f32(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    #[cfg(target_arch = "aarch64")]
    {
        return unsafe { neon_dot_product_f32(a, b) };
    }
    #[cfg(target_arch = "x86_64")]
    {
        if std::arch::is_x86_feature_detected!("avx2") && std::arch::is_x86_feature_detected!("fma")
        {
            return unsafe { avx2_dot_product_f32(a, b) };
        }
    }
    scalar_dot_product_f32(a, b)
}

/// Squared Euclidean distance between two f32 slices.
#[inline]
#[allow(unreachable_code)]
pub fn euclidean_sq_f32(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    #[cfg(target_arch = "aarch64")]
    {
        return unsafe { neon_euclidean_sq_f32(a, b) };
    }
    #[cfg(target_arch = "x86_64")]
    {
        if std::arch::is_x86_feature_detected!("avx2") && std::arch::is_x86_feature_detected!("fma")
        {
            return unsafe { avx2_euclidean_sq_f32(a, b) };
        }
    }
    scalar_euclidean_sq_f32(a, b)
}

// ============================================================================
// Scalar fallbacks
// ============================================================================

fn scalar_dot_product_f32(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn scalar_euclidean_sq_f32(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Largest multiple of `lanes` that fits in `len`; the split point between
/// the vectorized head and the scalar tail.
#[cfg(any(target_arch = "aarch64", target_arch = "x86_64"))]
#[inline]
fn vector_head(len: usize, lanes: usize) -> usize {
    len - len % lanes
}

// ============================================================================
// NEON implementations (aarch64)
// ============================================================================

#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::*;

#[cfg(target_arch = "aarch64")]
unsafe fn neon_dot_product_f32(a: &[f32], b: &[f32]) -> f32 {
    let split = vector_head(a.len(), 8);
    let (a_head, a_tail) = a.split_at(split);
    let (b_head, b_tail) = b.split_at(split);

    let mut acc_lo = vdupq_n_f32(0.0);
    let mut acc_hi = vdupq_n_f32(0.0);
    for (xa, xb) in a_head.chunks_exact(8).zip(b_head.chunks_exact(8)) {
        acc_lo = vfmaq_f32(acc_lo, vld1q_f32(xa.as_ptr()), vld1q_f32(xb.as_ptr()));
        acc_hi = vfmaq_f32(
            acc_hi,
            vld1q_f32(xa.as_ptr().add(4)),
            vld1q_f32(xb.as_ptr().add(4)),
        );
    }

    let mut sum = vaddvq_f32(vaddq_f32(acc_lo, acc_hi));
    for (x, y) in a_tail.iter().zip(b_tail) {
        sum += x * y;
    }
    sum
}

#[cfg(target_arch = "aarch64")]
unsafe fn neon_euclidean_sq_f32(a: &[f32], b: &[f32]) -> f32 {
    let split = vector_head(a.len(), 8);
    let (a_head, a_tail) = a.split_at(split);
    let (b_head, b_tail) = b.split_at(split);

    let mut acc_lo = vdupq_n_f32(0.0);
    let mut acc_hi = vdupq_n_f32(0.0);
    for (xa, xb) in a_head.chunks_exact(8).zip(b_head.chunks_exact(8)) {
        let d_lo = vsubq_f32(vld1q_f32(xa.as_ptr()), vld1q_f32(xb.as_ptr()));
        let d_hi = vsubq_f32(
            vld1q_f32(xa.as_ptr().add(4)),
            vld1q_f32(xb.as_ptr().add(4)),
        );
        acc_lo = vfmaq_f32(acc_lo, d_lo, d_lo);
        acc_hi = vfmaq_f32(acc_hi, d_hi, d_hi);
    }

    let mut sum = vaddvq_f32(vaddq_f32(acc_lo, acc_hi));
    for (x, y) in a_tail.iter().zip(b_tail) {
        let d = x - y;
        sum += d * d;
    }
    sum
}

// ============================================================================
// AVX2 implementations (x86_64)
// ============================================================================

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

/// Horizontal sum of an 8-lane f32 vector: spill to a stack array and add.
/// The compiler lowers this to a short reduction sequence; it is off the
/// per-lane hot loop, so the simple form wins on clarity.
#[cfg(target_arch = "x86_64")]
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn hsum_f32x8(v: __m256) -> f32 {
    let mut lanes = [0.0f32; 8];
    _mm256_storeu_ps(lanes.as_mut_ptr(), v);
    lanes.iter().sum()
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2,fma")]
unsafe fn avx2_dot_product_f32(a: &[f32], b: &[f32]) -> f32 {
    let split = vector_head(a.len(), 8);
    let (a_head, a_tail) = a.split_at(split);
    let (b_head, b_tail) = b.split_at(split);

    let mut acc = _mm256_setzero_ps();
    for (xa, xb) in a_head.chunks_exact(8).zip(b_head.chunks_exact(8)) {
        acc = _mm256_fmadd_ps(
            _mm256_loadu_ps(xa.as_ptr()),
            _mm256_loadu_ps(xb.as_ptr()),
            acc,
        );
    }

    let mut sum = hsum_f32x8(acc);
    for (x, y) in a_tail.iter().zip(b_tail) {
        sum += x * y;
    }
    sum
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2,fma")]
unsafe fn avx2_euclidean_sq_f32(a: &[f32], b: &[f32]) -> f32 {
    let split = vector_head(a.len(), 8);
    let (a_head, a_tail) = a.split_at(split);
    let (b_head, b_tail) = b.split_at(split);

    let mut acc = _mm256_setzero_ps();
    for (xa, xb) in a_head.chunks_exact(8).zip(b_head.chunks_exact(8)) {
        let d = _mm256_sub_ps(_mm256_loadu_ps(xa.as_ptr()), _mm256_loadu_ps(xb.as_ptr()));
        acc = _mm256_fmadd_ps(d, d, acc);
    }

    let mut sum = hsum_f32x8(acc);
    for (x, y) in a_tail.iter().zip(b_tail) {
        let d = x - y;
        sum += d * d;
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic pseudo-random vector for kernel comparison tests.
    fn make_vec(len: usize, seed: u64) -> Vec<f32> {
        let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        (0..len)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                ((state >> 33) as f32 / (1u64 << 31) as f32) - 0.5
            })
            .collect()
    }

    #[cfg(any(target_arch = "aarch64", target_arch = "x86_64"))]
    #[test]
    fn test_vector_head_splits() {
        assert_eq!(vector_head(0, 8), 0);
        assert_eq!(vector_head(7, 8), 0);
        assert_eq!(vector_head(8, 8), 8);
        assert_eq!(vector_head(17, 8), 16);
    }

    #[test]
    fn test_dot_matches_scalar() {
        // Cover the tiled body, the scalar tail, and sub-tile lengths
        for len in [3, 8, 16, 17, 64, 100] {
            let a = make_vec(len, 1);
            let b = make_vec(len, 2);
            let simd = dot_product_f32(&a, &b);
            let scalar = scalar_dot_product_f32(&a, &b);
            assert!(
                (simd - scalar).abs() < 1e-3,
                "len={len}: simd={simd} scalar={scalar}"
            );
        }
    }

    #[test]
    fn test_euclidean_matches_scalar() {
        for len in [3, 8, 16, 17, 64, 100] {
            let a = make_vec(len, 3);
            let b = make_vec(len, 4);
            let simd = euclidean_sq_f32(&a, &b);
            let scalar = scalar_euclidean_sq_f32(&a, &b);
            assert!(
                (simd - scalar).abs() < 1e-3,
                "len={len}: simd={simd} scalar={scalar}"
            );
        }
    }

    #[test]
    fn test_dot_empty() {
        assert_eq!(dot_product_f32(&[], &[]), 0.0);
    }

    #[test]
    fn test_euclidean_self_is_zero() {
        let a = make_vec(48, 5);
        assert_eq!(euclidean_sq_f32(&a, &a), 0.0);
    }
}
