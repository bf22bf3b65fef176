//! Texture set loaded once at startup
//!
//! The door maps, a matcap and a toon gradient live at fixed paths under the
//! asset root. Each is decoded to RGBA8 on the CPU here; the render engine
//! uploads the ones the material references.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::AssetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureKey {
    DoorColor,
    DoorAlpha,
    DoorAmbientOcclusion,
    DoorHeight,
    DoorNormal,
    DoorMetalness,
    Matcap,
    Gradient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Srgb,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    Linear,
    Nearest,
}

impl TextureKey {
    pub const ALL: [TextureKey; 8] = [
        TextureKey::DoorColor,
        TextureKey::DoorAlpha,
        TextureKey::DoorAmbientOcclusion,
        TextureKey::DoorHeight,
        TextureKey::DoorNormal,
        TextureKey::DoorMetalness,
        TextureKey::Matcap,
        TextureKey::Gradient,
    ];

    /// Path relative to the asset root
    pub fn relative_path(self) -> &'static str {
        match self {
            TextureKey::DoorColor => "textures/door/color.jpg",
            TextureKey::DoorAlpha => "textures/door/alpha.jpg",
            TextureKey::DoorAmbientOcclusion => "textures/door/ambientOcclusion.jpg",
            TextureKey::DoorHeight => "textures/door/height.jpg",
            TextureKey::DoorNormal => "textures/door/normal.jpg",
            TextureKey::DoorMetalness => "textures/door/metalness.jpg",
            TextureKey::Matcap => "textures/matcaps/2.png",
            TextureKey::Gradient => "textures/gradients/3.jpg",
        }
    }

    /// Color data is stored sRGB-encoded; masks and normals are linear
    pub fn color_space(self) -> ColorSpace {
        match self {
            TextureKey::DoorColor | TextureKey::Matcap => ColorSpace::Srgb,
            _ => ColorSpace::Linear,
        }
    }

    pub fn filter(self) -> TextureFilter {
        match self {
            // Toon gradients must keep their hard steps
            TextureKey::Gradient => TextureFilter::Nearest,
            _ => TextureFilter::Linear,
        }
    }

    /// Texel used when the file is missing or undecodable
    pub fn placeholder_texel(self) -> [u8; 4] {
        match self {
            TextureKey::DoorNormal => [128, 128, 255, 255],
            _ => [255, 255, 255, 255],
        }
    }
}

/// CPU-side RGBA8 image
#[derive(Debug, Clone)]
pub struct DecodedTexture {
    pub key: TextureKey,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
    pub is_placeholder: bool,
}

impl DecodedTexture {
    pub fn decode(key: TextureKey, path: &Path) -> Result<Self, AssetError> {
        let image = image::open(path).map_err(|e| AssetError::from_image(path, e))?;
        let rgba = image.to_rgba8();
        Ok(Self {
            key,
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
            is_placeholder: false,
        })
    }

    pub fn placeholder(key: TextureKey) -> Self {
        Self {
            key,
            width: 1,
            height: 1,
            rgba: key.placeholder_texel().to_vec(),
            is_placeholder: true,
        }
    }
}

/// All startup textures, keyed by `TextureKey`
pub struct TextureSet {
    textures: HashMap<TextureKey, DecodedTexture>,
}

impl TextureSet {
    /// Decodes every texture under `assets_root`
    ///
    /// A texture that cannot be read is replaced by its placeholder and
    /// logged; this never fails.
    pub fn load(assets_root: &Path) -> Self {
        let textures = TextureKey::ALL
            .iter()
            .map(|&key| {
                let path = assets_root.join(key.relative_path());
                let texture = match DecodedTexture::decode(key, &path) {
                    Ok(texture) => {
                        log::debug!(
                            "Loaded {:?} ({}x{}) from {}",
                            key,
                            texture.width,
                            texture.height,
                            path.display()
                        );
                        texture
                    }
                    Err(error) => {
                        log::warn!("{error}; using placeholder for {key:?}");
                        DecodedTexture::placeholder(key)
                    }
                };
                (key, texture)
            })
            .collect();

        Self { textures }
    }

    pub fn get(&self, key: TextureKey) -> &DecodedTexture {
        // `load` populates every key.
        &self.textures[&key]
    }

    pub fn placeholder_count(&self) -> usize {
        self.textures.values().filter(|t| t.is_placeholder).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sheen-textures-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_root_yields_placeholders_for_every_key() {
        let set = TextureSet::load(Path::new("/definitely/not/a/real/asset/root"));
        assert_eq!(set.placeholder_count(), TextureKey::ALL.len());

        let normal = set.get(TextureKey::DoorNormal);
        assert_eq!((normal.width, normal.height), (1, 1));
        assert_eq!(normal.rgba, vec![128, 128, 255, 255]);
        assert_eq!(set.get(TextureKey::DoorColor).rgba, vec![255; 4]);
    }

    #[test]
    fn decodes_present_files_and_falls_back_for_the_rest() {
        let root = scratch_dir("partial");
        let matcap_path = root.join(TextureKey::Matcap.relative_path());
        std::fs::create_dir_all(matcap_path.parent().unwrap()).unwrap();
        image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]))
            .save(&matcap_path)
            .unwrap();

        let set = TextureSet::load(&root);
        let matcap = set.get(TextureKey::Matcap);
        assert!(!matcap.is_placeholder);
        assert_eq!((matcap.width, matcap.height), (3, 2));
        assert_eq!(&matcap.rgba[..4], &[10, 20, 30, 255]);
        assert_eq!(set.placeholder_count(), TextureKey::ALL.len() - 1);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn corrupt_file_reports_an_error_naming_the_file() {
        let root = scratch_dir("corrupt");
        let path = root.join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();

        let error = DecodedTexture::decode(TextureKey::Matcap, &path).unwrap_err();
        assert!(error.to_string().contains("broken.png"), "{error}");

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn texture_settings_follow_content_type() {
        assert_eq!(TextureKey::DoorColor.color_space(), ColorSpace::Srgb);
        assert_eq!(TextureKey::Matcap.color_space(), ColorSpace::Srgb);
        assert_eq!(TextureKey::DoorNormal.color_space(), ColorSpace::Linear);
        assert_eq!(TextureKey::Gradient.filter(), TextureFilter::Nearest);
        assert_eq!(TextureKey::DoorAlpha.filter(), TextureFilter::Linear);
    }
}
