use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::ImageFormat;

use crate::error::{Error, Result};

/// Output file name and square edge length for each variant.
pub const FAVICON_SIZES: &[(&str, u32)] = &[
    ("favicon-16x16.png", 16),
    ("favicon-32x32.png", 32),
    ("apple-touch-icon.png", 180),
    ("favicon-192x192.png", 192),
    ("favicon-512x512.png", 512),
];

#[derive(Debug, Clone)]
pub struct GeneratedIcon {
    pub path: PathBuf,
    pub size: u32,
    pub bytes: u64,
}

pub fn generate_favicons(source: &Path, out_dir: &Path) -> Result<Vec<GeneratedIcon>> {
    if !source.is_file() {
        return Err(Error::NotFound(source.to_path_buf()));
    }

    let img = image::open(source)?;
    tracing::info!(
        "Loaded {}: {}x{} ({:?})",
        source.display(),
        img.width(),
        img.height(),
        img.color()
    );
    let rgba = img.into_rgba8();

    fs::create_dir_all(out_dir)?;

    let mut generated = Vec::with_capacity(FAVICON_SIZES.len());
    for &(file_name, size) in FAVICON_SIZES {
        let path = out_dir.join(file_name);
        let resized = imageops::resize(&rgba, size, size, FilterType::Lanczos3);
        resized.save_with_format(&path, ImageFormat::Png)?;

        let bytes = fs::metadata(&path)?.len();
        tracing::info!("{} ({}x{}, {:.1} KB)", file_name, size, size, bytes as f64 / 1024.0);
        generated.push(GeneratedIcon { path, size, bytes });
    }

    Ok(generated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    #[test]
    fn test_generates_every_size() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("pfp.png");
        RgbImage::from_pixel(64, 48, Rgb([200, 40, 90])).save(&source).unwrap();

        let out = dir.path().join("public");
        let icons = generate_favicons(&source, &out).unwrap();

        assert_eq!(icons.len(), FAVICON_SIZES.len());
        for (icon, &(name, size)) in icons.iter().zip(FAVICON_SIZES) {
            assert_eq!(icon.path, out.join(name));
            assert_eq!(image::image_dimensions(&icon.path).unwrap(), (size, size));
            let decoded = image::open(&icon.path).unwrap();
            assert!(decoded.color().has_alpha());
        }
    }

    #[test]
    fn test_missing_source() {
        let dir = tempdir().unwrap();
        let err = generate_favicons(&dir.path().join("pfp.png"), dir.path()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
