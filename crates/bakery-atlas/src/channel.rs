//! The semantic texture channels an atlas tracks.

use serde::{Deserialize, Serialize};

/// Per-channel fix-up applied after a material's pixels are copied into its cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostProcess {
    /// Copy as-is.
    None,
    /// Multiply every pixel by the material's color tint.
    AlbedoTint,
    /// Replace alpha with `occlusion.alpha * metallic_strength` when the
    /// material has an occlusion texture.
    OcclusionToAlpha,
}

/// One semantic texture slot of a standard PBR material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TextureChannel {
    /// Base color, `_MainTex`.
    Albedo,
    /// Tangent-space normal map, `_BumpMap`.
    Normal,
    /// Ambient occlusion, `_OcclusionMap`.
    Occlusion,
    /// Metallic/gloss with occlusion folded into alpha, `_MetallicGlossMap`.
    MetallicGloss,
    /// Emission, `_EmissionMap`.
    Emission,
    /// Detail albedo, `_DetailAlbedoMap`.
    DetailAlbedo,
    /// Detail normal map, `_DetailNormalMap`.
    DetailNormal,
}

/// All channels, in export order.
pub const DEFAULT_CHANNELS: [TextureChannel; 7] = [
    TextureChannel::Albedo,
    TextureChannel::Normal,
    TextureChannel::Occlusion,
    TextureChannel::MetallicGloss,
    TextureChannel::Emission,
    TextureChannel::DetailAlbedo,
    TextureChannel::DetailNormal,
];

impl TextureChannel {
    /// Shader property the channel is bound to on source and baked materials.
    pub fn property_name(self) -> &'static str {
        match self {
            Self::Albedo => "_MainTex",
            Self::Normal => "_BumpMap",
            Self::Occlusion => "_OcclusionMap",
            Self::MetallicGloss => "_MetallicGlossMap",
            Self::Emission => "_EmissionMap",
            Self::DetailAlbedo => "_DetailAlbedoMap",
            Self::DetailNormal => "_DetailNormalMap",
        }
    }

    /// Suffix appended to the asset name of the exported atlas image.
    pub fn file_tag(self) -> &'static str {
        match self {
            Self::Albedo => "_alb",
            Self::Normal => "_nrm",
            Self::Occlusion => "_occ",
            Self::MetallicGloss => "_PBR",
            Self::Emission => "_emission",
            Self::DetailAlbedo => "_dtm",
            Self::DetailNormal => "_dtn",
        }
    }

    /// Fix-up run on this channel's pixels after the copy.
    pub fn post_process(self) -> PostProcess {
        match self {
            Self::Albedo => PostProcess::AlbedoTint,
            Self::MetallicGloss => PostProcess::OcclusionToAlpha,
            _ => PostProcess::None,
        }
    }

    /// Looks a channel up by its shader property name.
    pub fn from_property_name(name: &str) -> Option<Self> {
        DEFAULT_CHANNELS
            .into_iter()
            .find(|channel| channel.property_name() == name)
    }
}
