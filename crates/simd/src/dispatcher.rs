//! Runtime Backend Detection
//!
//! This module provides CPU feature detection and register-family selection.
//! On x86/x86_64 it detects SSE2 and AVX support at runtime; on aarch64
//! NEON is assumed present (it is mandatory for the architecture).

use core::fmt;

/// Byte alignment of SIMD-aligned storage (the widest register, AVX).
pub const SIMD_ALIGNMENT: usize = 32;

/// CPU Feature Detection Results
///
/// Represents the SIMD capabilities detected on the current CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuFeatures {
    /// SSE2 support available (x86/x86_64)
    pub has_sse2: bool,

    /// AVX support available, including OS register-state support (x86/x86_64)
    pub has_avx: bool,

    /// NEON support available (aarch64)
    pub has_neon: bool,
}

impl CpuFeatures {
    /// Detect CPU features
    ///
    /// # Platform Behavior
    /// - **x86/x86_64 with `runtime-dispatch`**: CPUID detection using the
    ///   `cpufeatures` crate (cached after the first call)
    /// - **otherwise**: the target features enabled at compile time
    ///
    /// # Example
    /// ```
    /// use vexpr_simd::CpuFeatures;
    ///
    /// let features = CpuFeatures::detect();
    /// if features.has_avx {
    ///     assert!(features.has_sse2);
    /// }
    /// ```
    pub fn detect() -> Self {
        #[cfg(all(
            feature = "runtime-dispatch",
            any(target_arch = "x86", target_arch = "x86_64")
        ))]
        {
            cpufeatures::new!(cpuid_sse2, "sse2");
            cpufeatures::new!(cpuid_avx, "avx");

            Self {
                has_sse2: cpuid_sse2::get(),
                has_avx: cpuid_avx::get(),
                has_neon: false,
            }
        }

        #[cfg(not(all(
            feature = "runtime-dispatch",
            any(target_arch = "x86", target_arch = "x86_64")
        )))]
        {
            Self::compile_time()
        }
    }

    /// Features guaranteed by the compilation target
    pub const fn compile_time() -> Self {
        Self {
            has_sse2: cfg!(all(
                any(target_arch = "x86", target_arch = "x86_64"),
                target_feature = "sse2"
            )),
            has_avx: cfg!(all(
                any(target_arch = "x86", target_arch = "x86_64"),
                target_feature = "avx"
            )),
            has_neon: cfg!(target_arch = "aarch64"),
        }
    }

    /// Whether registers of the given family can run on this CPU
    pub const fn supports(&self, backend: BackendType) -> bool {
        match backend {
            BackendType::Scalar => true,
            BackendType::Sse => self.has_sse2,
            BackendType::Avx => self.has_avx,
            BackendType::Neon => self.has_neon,
        }
    }

    /// All register families usable on this CPU
    pub fn supported(&self) -> BackendSet {
        BackendType::ALL
            .into_iter()
            .filter(|b| self.supports(*b))
            .collect()
    }
}

/// Backend Type Enumeration
///
/// Represents a register family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendType {
    /// Portable single-lane registers (always available)
    Scalar,

    /// SSE backend (x86/x86_64, 128-bit)
    Sse,

    /// AVX backend (x86/x86_64, 256-bit)
    Avx,

    /// NEON backend (aarch64, 128-bit)
    Neon,
}

impl BackendType {
    /// Every register family, narrowest first
    pub const ALL: [BackendType; 4] = [
        BackendType::Scalar,
        BackendType::Sse,
        BackendType::Neon,
        BackendType::Avx,
    ];

    /// Select the widest backend the CPU supports
    ///
    /// # Selection Priority
    /// 1. Forced backend via cargo feature (if the CPU supports it)
    /// 2. AVX
    /// 3. NEON
    /// 4. SSE
    /// 5. Scalar
    #[allow(unreachable_code)]
    pub fn select(features: CpuFeatures) -> Self {
        #[cfg(feature = "force-scalar")]
        {
            return BackendType::Scalar;
        }

        #[cfg(feature = "force-sse")]
        if features.has_sse2 {
            return BackendType::Sse;
        }

        #[cfg(feature = "force-avx")]
        if features.has_avx {
            return BackendType::Avx;
        }

        #[cfg(feature = "force-neon")]
        if features.has_neon {
            return BackendType::Neon;
        }

        if features.has_avx {
            BackendType::Avx
        } else if features.has_neon {
            BackendType::Neon
        } else if features.has_sse2 {
            BackendType::Sse
        } else {
            BackendType::Scalar
        }
    }

    /// Backends to try, widest first, when this one is the ceiling
    pub const fn fallback_chain(self) -> &'static [BackendType] {
        match self {
            BackendType::Scalar => &[BackendType::Scalar],
            BackendType::Sse => &[BackendType::Sse, BackendType::Scalar],
            BackendType::Avx => &[BackendType::Avx, BackendType::Sse, BackendType::Scalar],
            BackendType::Neon => &[BackendType::Neon, BackendType::Scalar],
        }
    }

    /// Lanes per register for 32-bit elements
    pub const fn f32_lanes(self) -> usize {
        match self {
            BackendType::Scalar => 1,
            BackendType::Sse | BackendType::Neon => 4,
            BackendType::Avx => 8,
        }
    }

    /// Lanes per register for 64-bit elements
    pub const fn f64_lanes(self) -> usize {
        match self {
            BackendType::Scalar => 1,
            BackendType::Sse | BackendType::Neon => 2,
            BackendType::Avx => 4,
        }
    }

    /// Get backend name as string
    pub const fn name(self) -> &'static str {
        match self {
            BackendType::Scalar => "scalar",
            BackendType::Sse => "sse",
            BackendType::Avx => "avx",
            BackendType::Neon => "neon",
        }
    }
}

impl fmt::Display for BackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of register families
///
/// Each expression node carries the set of families its whole subtree can be
/// evaluated with.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BackendSet(u8);

impl BackendSet {
    /// No register family
    pub const EMPTY: Self = BackendSet(0);

    /// Every register family
    pub const ALL: Self = BackendSet(0b1111);

    const fn bit(backend: BackendType) -> u8 {
        1 << (backend as u8)
    }

    /// Set holding a single family
    pub const fn only(backend: BackendType) -> Self {
        BackendSet(Self::bit(backend))
    }

    /// This set with `backend` added
    pub const fn with(self, backend: BackendType) -> Self {
        BackendSet(self.0 | Self::bit(backend))
    }

    /// Whether `backend` is in the set
    pub const fn contains(self, backend: BackendType) -> bool {
        self.0 & Self::bit(backend) != 0
    }

    /// Families present in both sets
    pub const fn intersect(self, other: Self) -> Self {
        BackendSet(self.0 & other.0)
    }

    /// Families present in either set
    pub const fn union(self, other: Self) -> Self {
        BackendSet(self.0 | other.0)
    }

    /// Whether the set is empty
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate the families in the set, narrowest first
    pub fn iter(self) -> impl Iterator<Item = BackendType> {
        BackendType::ALL
            .into_iter()
            .filter(move |b| self.contains(*b))
    }
}

impl FromIterator<BackendType> for BackendSet {
    fn from_iter<I: IntoIterator<Item = BackendType>>(iter: I) -> Self {
        iter.into_iter().fold(BackendSet::EMPTY, BackendSet::with)
    }
}

impl fmt::Debug for BackendSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(BackendType::name)).finish()
    }
}
