//! Экспорт мира в PNG
//!
//! Каждая клетка рисуется квадратом `scale × scale` пикселей по типу суши,
//! озёра закрашиваются отдельным цветом, реки — отрезками между центрами звеньев.

use std::path::Path;

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use crate::coordinate::Coordinate;
use crate::landmass::LandType;
use crate::world::World;

pub const OCEAN: [u8; 3] = [0, 64, 128];
pub const LAKE: [u8; 3] = [40, 100, 170];
pub const RIVER: [u8; 3] = [30, 90, 200];

#[must_use]
pub fn land_color(land_type: LandType) -> [u8; 3] {
    match land_type {
        LandType::Land => [60, 140, 60],
        LandType::Coast => [200, 180, 120],
        LandType::Mountain => [150, 150, 150],
        LandType::Snowcapped => [240, 240, 250],
    }
}

/// Рисует мир с полем в одну клетку вокруг габаритов суши.
#[must_use]
pub fn render_world(world: &World, scale: u32) -> RgbImage {
    let scale = scale.max(1);
    let Some(bounds) = world.bounds() else {
        return RgbImage::from_pixel(scale, scale, Rgb(OCEAN));
    };

    let width = (bounds.width() + 2) * scale;
    let height = (bounds.height() + 2) * scale;
    let origin = Coordinate::new(bounds.min.x - 1, bounds.min.y - 1);
    let mut img = RgbImage::from_pixel(width, height, Rgb(OCEAN));

    let cell = |c: Coordinate| {
        Rect::at((c.x - origin.x) * scale as i32, (c.y - origin.y) * scale as i32)
            .of_size(scale, scale)
    };
    let center = |c: Coordinate| {
        let half = scale as f32 / 2.0;
        (
            (c.x - origin.x) as f32 * scale as f32 + half,
            (c.y - origin.y) as f32 * scale as f32 + half,
        )
    };

    for landmass in world.landmasses() {
        for ring in landmass.coastal_rings() {
            if let Some(water) = &ring.water {
                for &c in &water.cells {
                    draw_filled_rect_mut(&mut img, cell(c), Rgb(LAKE));
                }
            }
        }

        for point in landmass.points().values() {
            draw_filled_rect_mut(
                &mut img,
                cell(point.coordinate),
                Rgb(land_color(point.land_type)),
            );
        }

        for river in landmass.rivers() {
            for pair in river.path.windows(2) {
                draw_line_segment_mut(
                    &mut img,
                    center(pair[0].value),
                    center(pair[1].value),
                    Rgb(RIVER),
                );
            }
        }
    }

    img
}

pub fn save_as_png(
    world: &World,
    path: impl AsRef<Path>,
    scale: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    render_world(world, scale).save(path)?;
    Ok(())
}
