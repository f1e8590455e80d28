//! Fragment outcomes shared by every pass.

use glam::Vec4;
use serde::{Deserialize, Serialize};

/// Result of one fragment invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fragment {
    /// Write this RGBA color.
    Color(Vec4),
    /// Drop the fragment: no color and no depth write.
    Discard,
}

impl Fragment {
    /// Color if the fragment survived.
    pub fn color(self) -> Option<Vec4> {
        match self {
            Fragment::Color(color) => Some(color),
            Fragment::Discard => None,
        }
    }

    /// Whether the fragment was discarded.
    pub fn is_discarded(self) -> bool {
        matches!(self, Fragment::Discard)
    }
}

/// What happens to texel alpha once a fragment passes the cutout test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlphaPolicy {
    /// Output alpha is forced to 1.0 (lit cube pass).
    #[default]
    CutoutOpaque,
    /// Output alpha is the sampled texel alpha (unlit cube pass).
    CutoutPassthrough,
}

impl AlphaPolicy {
    /// Output alpha for a texel that survived the cutout test.
    pub fn resolve(self, texel_alpha: f32) -> f32 {
        match self {
            AlphaPolicy::CutoutOpaque => 1.0,
            AlphaPolicy::CutoutPassthrough => texel_alpha,
        }
    }
}

/// Cutout test: exactly zero alpha is dropped, anything above survives.
pub fn is_cut_out(alpha: f32) -> bool {
    alpha == 0.0
}
