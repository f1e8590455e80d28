//! Per-face light payload: producer array, two-vector wire packing and
//! quantization.
//!
//! The six light levels of an instance travel as one 4-wide and one 2-wide
//! integer vector (`light_lo = faces 0..4`, `light_hi = faces 4..6`). The
//! quantization is not self-describing, so every draw carries a
//! [`LightFormat`] tag and uploads its maximum alongside the other uniforms.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::face::{Face, FACE_COUNT};

/// Slots carried by the 4-wide wire vector.
pub const LIGHT_LO_LANES: usize = 4;
/// Slots carried by the 2-wide wire vector.
pub const LIGHT_HI_LANES: usize = FACE_COUNT - LIGHT_LO_LANES;

/// Quantization of the light levels in a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightFormat {
    /// Wire format 1: four bits per face, levels 0..=15.
    Nibble,
    /// Wire format 2: eight bits per face, levels 0..=255.
    #[default]
    Byte,
}

impl LightFormat {
    /// Format every new producer should emit.
    pub const CANONICAL: LightFormat = LightFormat::Byte;

    /// Wire format version number.
    pub fn version(self) -> u8 {
        match self {
            LightFormat::Nibble => 1,
            LightFormat::Byte => 2,
        }
    }

    /// Format for a wire version number.
    pub fn from_version(version: u8) -> Result<Self, LightError> {
        match version {
            1 => Ok(LightFormat::Nibble),
            2 => Ok(LightFormat::Byte),
            other => Err(LightError::UnknownVersion(other)),
        }
    }

    /// Largest representable level (full brightness).
    pub fn max_level(self) -> u8 {
        match self {
            LightFormat::Nibble => 15,
            LightFormat::Byte => u8::MAX,
        }
    }

    /// Map a raw level to an intensity in `[0, 1]`.
    pub fn normalize(self, level: u8) -> f32 {
        (level as f32 / self.max_level() as f32).clamp(0.0, 1.0)
    }

    /// Check that every level fits this quantization.
    pub fn validate(self, lights: &FaceLights) -> Result<(), LightError> {
        let max = self.max_level();
        for face in Face::ALL {
            let level = lights.get(face);
            if level > max {
                return Err(LightError::LevelOutOfRange {
                    face,
                    level,
                    format: self,
                });
            }
        }
        Ok(())
    }
}

/// Producer-side light payload errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LightError {
    /// A level exceeds the format's maximum.
    #[error("light level {level} on face {face:?} exceeds the {format:?} maximum")]
    LevelOutOfRange {
        /// Offending face.
        face: Face,
        /// Offending level.
        level: u8,
        /// Format the payload was checked against.
        format: LightFormat,
    },
    /// The wire version tag is not known.
    #[error("unknown light format version {0}")]
    UnknownVersion(u8),
}

/// Light levels of the six faces of one instance, in face order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FaceLights(pub [u8; FACE_COUNT]);

impl FaceLights {
    /// Same level on every face.
    pub fn uniform(level: u8) -> Self {
        Self([level; FACE_COUNT])
    }

    /// Level of one face.
    pub fn get(&self, face: Face) -> u8 {
        self.0[face.index()]
    }

    /// Overwrite the level of one face.
    pub fn set(&mut self, face: Face, level: u8) {
        self.0[face.index()] = level;
    }

    /// Split into the two wire vectors.
    pub fn pack(&self) -> PackedLight {
        let [l0, l1, l2, l3, l4, l5] = self.0;
        PackedLight {
            lo: [l0, l1, l2, l3],
            hi: [l4, l5],
        }
    }

    /// Rescale every level from one quantization to another, rounding to nearest.
    pub fn requantize(&self, from: LightFormat, to: LightFormat) -> Self {
        if from == to {
            return *self;
        }
        let from_max = from.max_level() as u32;
        let to_max = to.max_level() as u32;
        Self(self.0.map(|level| {
            let level = (level as u32).min(from_max);
            ((level * to_max + from_max / 2) / from_max) as u8
        }))
    }
}

/// The wire encoding of [`FaceLights`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PackedLight {
    /// Faces 0..4.
    pub lo: [u8; LIGHT_LO_LANES],
    /// Faces 4..6.
    pub hi: [u8; LIGHT_HI_LANES],
}

impl PackedLight {
    /// Concatenate both vectors back into face order.
    pub fn unpack(&self) -> FaceLights {
        let [l0, l1, l2, l3] = self.lo;
        let [l4, l5] = self.hi;
        FaceLights([l0, l1, l2, l3, l4, l5])
    }

    /// Level for a raw `face` attribute.
    ///
    /// `face` must be below 6. The mesher guarantees it; nothing checks it here
    /// and an out-of-range index panics on the slice lookup.
    pub fn level(&self, face: u32) -> u8 {
        self.unpack().0[face as usize]
    }
}
