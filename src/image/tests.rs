use super::*;

#[test]
fn luma_is_widened_to_rgba() {
    let gray = GrayImage::from_fn(3, 2, |x, y| Luma([(x + 10 * y) as u8]));
    let image = Image::from_luma(&gray);
    assert_eq!(image.resolution(), Resolution::new(3, 2));
    assert_eq!(image.get(2, 1), Color([12, 12, 12, 255]));
    assert_eq!(image.data().len(), 3 * 2 * 4);
}

#[test]
fn mask_normalizes_foreground() {
    let gray = GrayImage::from_fn(4, 4, |x, _| Luma([if x < 2 { 0 } else { 7 }]));
    let mask = Mask::from(gray);
    assert_eq!(mask.count_foreground(), 8);
    assert!(mask.data().iter().all(|&v| v == 0 || v == Mask::FOREGROUND));
    assert!(mask.get(3, 0));
    assert!(!mask.get(0, 3));
}

#[test]
fn mask_set_get() {
    let mut mask = Mask::new(5, 5);
    assert_eq!(mask.count_foreground(), 0);
    mask.set(1, 2, true);
    assert!(mask.get(1, 2));
    assert_eq!(mask.data()[2 * 5 + 1], Mask::FOREGROUND);
    mask.set(1, 2, false);
    assert_eq!(mask, Mask::new(5, 5));
}

#[test]
fn unsupported_extension() {
    let err = Image::new(1, 1).save("out.bmp").unwrap_err();
    assert!(err.to_string().contains("out.bmp"), "{err}");
}

#[test]
fn draw_clips_to_image() {
    let mut image = Image::new(8, 8);
    draw::line(&mut image, -4, 3, 20, 3).color(Color::WHITE);
    for x in 0..8 {
        assert_eq!(image.get(x, 3), Color::WHITE);
    }
    assert_eq!(image.get(0, 2), Color::NULL);

    draw::marker(&mut image, 0, 0).size(3).color(Color::RED);
    assert_eq!(image.get(0, 0), Color::RED);
    assert_eq!(image.get(1, 1), Color::RED);
}

#[test]
fn draw_polygon_closes_outline() {
    let mut image = Image::new(8, 8);
    draw::polygon(&mut image, [(1, 1), (5, 1), (5, 5)]).color(Color::BLUE);
    assert_eq!(image.get(3, 1), Color::BLUE);
    assert_eq!(image.get(5, 3), Color::BLUE);
    // closing edge from (5, 5) back to (1, 1)
    assert_eq!(image.get(3, 3), Color::BLUE);
}
