use nalgebra::Point2;

use super::*;
use Color as C;

fn mkimage<const W: usize, const H: usize>(data: [[Color; W]; H]) -> Image {
    let data = data
        .into_iter()
        .flat_map(|row| row.into_iter())
        .flat_map(|col| col.0)
        .collect::<Vec<_>>();
    Image::from_rgba8(Resolution::new(W as u32, H as u32), &data)
}

fn count(image: &Image, color: Color) -> usize {
    let mut n = 0;
    for y in 0..image.height() {
        for x in 0..image.width() {
            if image.get(x, y) == color {
                n += 1;
            }
        }
    }
    n
}

#[test]
fn get_set() {
    let mut image = mkimage([[C::RED, C::GREEN], [C::BLUE, C::WHITE]]);
    assert_eq!(image.get(0, 0), C::RED);
    assert_eq!(image.get(1, 0), C::GREEN);
    assert_eq!(image.get(0, 1), C::BLUE);
    assert_eq!(image.get(1, 1), C::WHITE);

    image.set(1, 1, C::YELLOW);
    assert_eq!(image.get(1, 1), C::YELLOW);

    image.clear(C::BLACK);
    assert_eq!(count(&image, C::BLACK), 4);
}

#[test]
fn drawing_is_clipped() {
    let mut image = Image::new(8, 8);
    draw::line(&mut image, Point2::new(-20, 3), Point2::new(20, 3)).color(C::WHITE);
    assert_eq!(count(&image, C::WHITE), 8);

    draw::circle(&mut image, Point2::new(100, 100), 10).filled(true);
    assert_eq!(count(&image, C::GREEN), 0);
}

#[test]
fn filled_circle() {
    let mut image = Image::new(21, 21);
    draw::circle(&mut image, Point2::new(10, 10), 10)
        .color(C::RED)
        .filled(true);
    assert_eq!(image.get(10, 10), C::RED);
    assert_eq!(image.get(10, 0), C::RED);
    assert_eq!(image.get(0, 0), C::NULL);

    let mut outline = Image::new(21, 21);
    draw::circle(&mut outline, Point2::new(10, 10), 10).color(C::RED);
    assert_eq!(outline.get(10, 10), C::NULL);
    assert!(count(&outline, C::RED) < count(&image, C::RED));
}

#[test]
fn polygon_is_closed() {
    let mut image = Image::new(10, 10);
    draw::polygon(
        &mut image,
        [Point2::new(1, 1), Point2::new(8, 1), Point2::new(8, 8)],
    )
    .color(C::WHITE);

    // the closing edge runs along the diagonal
    assert_eq!(image.get(1, 1), C::WHITE);
    assert_eq!(image.get(4, 4), C::WHITE);
    assert_eq!(image.get(8, 8), C::WHITE);
    assert_eq!(image.get(8, 4), C::WHITE);
    assert_eq!(image.get(1, 8), C::NULL);
}

#[test]
fn save_requires_known_extension() {
    let image = Image::new(2, 2);
    assert!(image.save("overlay.bmp").is_err());
}
