//! PNG snapshots of the height field.

use std::path::Path;

use anyhow::{Context, Result};
use image::{GrayImage, Luma, Rgb, RgbImage};
use terrain_procgen::{ElevationBand, HeightField};

/// One pixel per lattice point, row `z` as image row. Samples are clamped to [0, 1].
pub fn heightmap_image(field: &HeightField) -> GrayImage {
    GrayImage::from_fn(field.columns() as u32, field.rows() as u32, |x, y| {
        let s = field.get(y as usize, x as usize);
        Luma([to_byte(s)])
    })
}

/// One pixel per lattice point, colored by elevation band.
pub fn band_image(field: &HeightField) -> RgbImage {
    RgbImage::from_fn(field.columns() as u32, field.rows() as u32, |x, y| {
        let [r, g, b] = ElevationBand::classify(field.get(y as usize, x as usize)).color();
        Rgb([to_byte(r), to_byte(g), to_byte(b)])
    })
}

pub fn save_heightmap(field: &HeightField, path: &Path) -> Result<()> {
    heightmap_image(field)
        .save(path)
        .with_context(|| format!("writing heightmap {:?}", path))?;
    log::info!("Wrote heightmap to {:?}", path);
    Ok(())
}

pub fn save_band_colors(field: &HeightField, path: &Path) -> Result<()> {
    band_image(field)
        .save(path)
        .with_context(|| format!("writing band colors {:?}", path))?;
    log::info!("Wrote band colors to {:?}", path);
    Ok(())
}

fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrain_procgen::{NoiseGenerator, SynthesisSettings};

    fn field(width: u32, height: u32) -> HeightField {
        let noise = NoiseGenerator::new(Some(3));
        let settings = SynthesisSettings {
            width,
            height,
            frequency: 1.0,
            lacunarity: 2.0,
            persistence: 0.5,
            octaves: 4,
            dimension: 10.0,
        };
        HeightField::synthesize(&noise, &settings).unwrap()
    }

    #[test]
    fn images_cover_every_lattice_point() {
        let f = field(7, 4);
        let gray = heightmap_image(&f);
        assert_eq!(gray.dimensions(), (8, 5));
        assert_eq!(band_image(&f).dimensions(), (8, 5));
        assert_eq!(gray.get_pixel(3, 2)[0], to_byte(f.get(2, 3)));
    }

    #[test]
    fn byte_conversion_clamps() {
        assert_eq!(to_byte(-0.5), 0);
        assert_eq!(to_byte(0.5), 128);
        assert_eq!(to_byte(3.0), 255);
    }

    #[test]
    fn saved_png_reads_back_with_same_size() {
        let f = field(5, 6);
        let path = std::env::temp_dir().join(format!("terrain-heightmap-{}.png", std::process::id()));
        save_heightmap(&f, &path).unwrap();
        let loaded = image::open(&path).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (6, 7));
        let _ = std::fs::remove_file(&path);
    }
}
