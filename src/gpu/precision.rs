//! Fragment-stage scalar precision negotiation.
//!
//! The level computation reconstructs f32 samples from raw texel bytes, so
//! the fragment stage needs a scalar type with enough mantissa to keep
//! per-column peaks stable. Candidates are probed cheapest-first and the
//! first one that is both supported by the device and wide enough wins;
//! the winner contributes a source prefix injected ahead of both shader
//! bodies.

use wgpu::Features;

/// Minimum mantissa bits the level computation tolerates.
pub const MIN_MANTISSA_BITS: u32 = 16;

/// One rung of the precision ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precision {
    /// WGSL scalar type name.
    pub wgsl_type: &'static str,
    /// Mantissa bits the type guarantees.
    pub mantissa_bits: u32,
    /// WGSL `enable` directive the type needs, if any.
    pub directive: Option<&'static str>,
    /// Device features the type needs.
    pub required_features: Features,
}

/// Candidates ordered cheapest first.
pub const CANDIDATES: [Precision; 2] = [
    Precision {
        wgsl_type: "f16",
        mantissa_bits: 10,
        directive: Some("enable f16;"),
        required_features: Features::SHADER_F16,
    },
    Precision {
        wgsl_type: "f32",
        mantissa_bits: 23,
        directive: None,
        required_features: Features::empty(),
    },
];

/// Pick the cheapest candidate the device supports that still guarantees
/// [`MIN_MANTISSA_BITS`] bits of mantissa.
pub fn negotiate(available: Features) -> Option<Precision> {
    CANDIDATES.iter().copied().find(|candidate| {
        available.contains(candidate.required_features)
            && candidate.mantissa_bits >= MIN_MANTISSA_BITS
    })
}

/// Source prefix injected ahead of every shader body.
///
/// Declares the `scalar` alias both shader stages compute levels in.
pub fn shader_prefix(precision: &Precision) -> String {
    match precision.directive {
        Some(directive) => format!("{directive}\nalias scalar = {};\n", precision.wgsl_type),
        None => format!("alias scalar = {};\n", precision.wgsl_type),
    }
}
