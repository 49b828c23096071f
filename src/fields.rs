//! Preset fields used by zkVM configurations.
//!
//! Base primes come from the `ark-ff` Montgomery configurations below; the
//! soundness formulas only need the size of the extension field and the size
//! of one element in bits.

use std::fmt;

use ark_ff::{Fp64, MontBackend, MontConfig, PrimeField};
use serde::{Deserialize, Serialize};

#[derive(MontConfig)]
#[modulus = "18446744069414584321"]
#[generator = "7"]
pub struct GoldilocksConfig;
pub type Goldilocks = Fp64<MontBackend<GoldilocksConfig, 1>>;

#[derive(MontConfig)]
#[modulus = "2013265921"]
#[generator = "31"]
pub struct BabyBearConfig;
pub type BabyBear = Fp64<MontBackend<BabyBearConfig, 1>>;

/// Parameters of an extension field `F_p^d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldParams {
    pub name: &'static str,
    /// Base field characteristic.
    pub p: u64,
    /// Bit length of `p`.
    pub modulus_bits: u32,
    /// Extension degree `d`.
    pub extension_degree: u32,
}

impl FieldParams {
    fn from_prime_field<F: PrimeField>(name: &'static str, extension_degree: u32) -> Self {
        let limbs = F::MODULUS;
        let limbs = limbs.as_ref();
        debug_assert!(limbs[1..].iter().all(|&limb| limb == 0));
        Self {
            name,
            p: limbs[0],
            modulus_bits: F::MODULUS_BIT_SIZE,
            extension_degree,
        }
    }

    /// Size of the extension field `|F| = p^d`, as a float.
    pub fn size(&self) -> f64 {
        (self.p as f64).powf(f64::from(self.extension_degree))
    }

    /// Size of one extension field element in bits.
    pub const fn element_size_bits(&self) -> usize {
        (self.modulus_bits * self.extension_degree) as usize
    }
}

impl fmt::Display for FieldParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Extension fields with a preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AvailableFields {
    #[serde(rename = "Goldilocks^2")]
    Goldilocks2,
    #[serde(rename = "Goldilocks^3")]
    Goldilocks3,
    #[serde(rename = "BabyBear^4")]
    BabyBear4,
    #[serde(rename = "BabyBear^5")]
    BabyBear5,
}

impl AvailableFields {
    pub fn params(self) -> FieldParams {
        match self {
            Self::Goldilocks2 => FieldParams::from_prime_field::<Goldilocks>("Goldilocks²", 2),
            Self::Goldilocks3 => FieldParams::from_prime_field::<Goldilocks>("Goldilocks³", 3),
            Self::BabyBear4 => FieldParams::from_prime_field::<BabyBear>("BabyBear⁴", 4),
            Self::BabyBear5 => FieldParams::from_prime_field::<BabyBear>("BabyBear⁵", 5),
        }
    }
}

impl fmt::Display for AvailableFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.params())
    }
}
