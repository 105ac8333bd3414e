use std::{collections::HashMap, path::Path, str::FromStr, sync::Arc};

use crate::{
    assets::decode::decode_image,
    foundation::{
        core::PixelBuffer,
        error::{FramefitError, FramefitResult},
    },
};

/// Frame choices offered to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameId {
    R1,
    R2,
    /// A user-supplied frame image.
    Custom,
}

impl FrameId {
    pub const PREBUILT: [FrameId; 2] = [FrameId::R1, FrameId::R2];

    pub fn as_str(self) -> &'static str {
        match self {
            FrameId::R1 => "r1",
            FrameId::R2 => "r2",
            FrameId::Custom => "custom",
        }
    }

    pub fn is_prebuilt(self) -> bool {
        !matches!(self, FrameId::Custom)
    }
}

impl std::fmt::Display for FrameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FrameId {
    type Err = FramefitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "r1" => Ok(FrameId::R1),
            "r2" => Ok(FrameId::R2),
            "custom" => Ok(FrameId::Custom),
            other => Err(FramefitError::validation(format!(
                "unknown frame '{other}' (expected r1, r2 or custom)"
            ))),
        }
    }
}

/// A frame identifier paired with its decoded pixels.
#[derive(Clone, Debug)]
pub struct FrameAsset {
    pub id: FrameId,
    pub pixels: Arc<PixelBuffer>,
}

/// Prebuilt frames, decoded once and shared read-only afterwards.
#[derive(Clone, Debug, Default)]
pub struct FrameLibrary {
    frames: HashMap<FrameId, Arc<PixelBuffer>>,
}

impl FrameLibrary {
    /// Build a library from already-decoded frames. `Custom` entries are rejected.
    pub fn from_frames(
        frames: impl IntoIterator<Item = (FrameId, PixelBuffer)>,
    ) -> FramefitResult<Self> {
        let mut out = HashMap::new();
        for (id, px) in frames {
            if !id.is_prebuilt() {
                return Err(FramefitError::validation(
                    "custom frames are uploaded per session, not bundled",
                ));
            }
            out.insert(id, Arc::new(px));
        }
        Ok(Self { frames: out })
    }

    /// Load `r1.png` and `r2.png` from `dir`. Missing files are skipped, unreadable ones fail.
    pub fn load_dir(dir: &Path) -> FramefitResult<Self> {
        let mut frames = HashMap::new();
        for id in FrameId::PREBUILT {
            let path = dir.join(format!("{id}.png"));
            if !path.is_file() {
                tracing::debug!(frame = %id, path = %path.display(), "prebuilt frame not found");
                continue;
            }
            let bytes = std::fs::read(&path)
                .map_err(|e| anyhow::anyhow!("read frame '{}': {e}", path.display()))?;
            let px = decode_image(&bytes)?;
            tracing::debug!(frame = %id, width = px.width(), height = px.height(), "loaded prebuilt frame");
            frames.insert(id, Arc::new(px));
        }
        Ok(Self { frames })
    }

    pub fn get(&self, id: FrameId) -> Option<FrameAsset> {
        self.frames.get(&id).map(|px| FrameAsset {
            id,
            pixels: Arc::clone(px),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_id_parse_and_display_agree() {
        for id in [FrameId::R1, FrameId::R2, FrameId::Custom] {
            assert_eq!(id.to_string().parse::<FrameId>().unwrap(), id);
        }
        assert!("r3".parse::<FrameId>().is_err());
    }

    #[test]
    fn library_shares_one_decoded_buffer() {
        let lib =
            FrameLibrary::from_frames([(FrameId::R1, PixelBuffer::filled(4, 4, [0; 4]).unwrap())])
                .unwrap();
        let a = lib.get(FrameId::R1).unwrap();
        let b = lib.get(FrameId::R1).unwrap();
        assert!(Arc::ptr_eq(&a.pixels, &b.pixels));
        assert!(lib.get(FrameId::R2).is_none());
    }

    #[test]
    fn library_refuses_custom_entries() {
        let res =
            FrameLibrary::from_frames([(FrameId::Custom, PixelBuffer::filled(1, 1, [0; 4]).unwrap())]);
        assert!(res.is_err());
    }
}
