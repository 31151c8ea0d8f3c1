//! Architecture-specific SIMD row kernels.
//!
//! This module contains unsafe SIMD code for different CPU architectures.
//! The safe API in `matrix` handles dispatch and leftover rows.

#[cfg(target_arch = "x86_64")]
pub mod x86_64;

#[cfg(target_arch = "aarch64")]
pub mod aarch64;
