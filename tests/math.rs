use gamecore::*;
use glam::{Vec2, Vec3, Vec4};
use rand::{rngs::StdRng, SeedableRng};

#[test]
fn test_vector_with() {
    let v = Vec3::new(1.0, 2.0, 3.0);
    assert_eq!(v.with_x(0.0), Vec3::new(0.0, 2.0, 3.0));
    assert_eq!(v.with_z(9.0), Vec3::new(1.0, 2.0, 9.0));
    assert_eq!(Vec2::ONE.with_y(3.0), Vec2::new(1.0, 3.0));
    assert_eq!(Vec4::ZERO.with_w(1.0), Vec4::new(0.0, 0.0, 0.0, 1.0));
}

#[test]
fn test_vector_map() {
    let v = Vec4::new(1.0, 2.0, 3.0, 4.0);
    let mapped = v
        .map_x(|x| x + 1.0)
        .map_y(|y| y * 2.0)
        .map_z(f32::sqrt)
        .map_w(|w| -w);
    assert_eq!(mapped, Vec4::new(2.0, 4.0, 3.0_f32.sqrt(), -4.0));
}

#[test]
fn test_swizzles() {
    let v = Vec3::new(1.0, 2.0, 3.0);
    assert_eq!(v.zyx(), Vec3::new(3.0, 2.0, 1.0));
    assert_eq!(v.xz(), Vec2::new(1.0, 3.0));
}

#[test]
fn test_color_with() {
    let color = Color::WHITE.with(Some(0.5), None, Some(0.0), None);
    assert_eq!(color, Color::new(0.5, 1.0, 0.0, 1.0));
    assert_eq!(Color::BLACK.with(None, None, None, None), Color::BLACK);
    assert_eq!(Color::RED.with_a(0.0).with_g(1.0), Color::new(1.0, 1.0, 0.0, 0.0));
    assert_eq!(Color::BLUE.map_b(|b| b / 2.0), Color::rgb(0.0, 0.0, 0.5));
}

#[test]
fn test_color_swizzle() {
    use Channel::*;
    let color = Color::new(0.1, 0.2, 0.3, 0.4);
    assert_eq!(color.swizzle([R, G, B, A]), color);
    assert_eq!(color.swizzle([R, R, R, A]), Color::new(0.1, 0.1, 0.1, 0.4));
    assert_eq!(color.channel(B), 0.3);
}

#[test]
fn test_color_conversions() {
    let color = Color::new(0.1, 0.2, 0.3, 0.4);
    assert_eq!(Vec4::from(color), Vec4::new(0.1, 0.2, 0.3, 0.4));
    assert_eq!(Color::from(Vec4::new(0.1, 0.2, 0.3, 0.4)), color);
    assert_eq!(Color::from(Vec3::ONE), Color::WHITE);
    assert_eq!(color.to_vec3(), Vec3::new(0.1, 0.2, 0.3));
}

#[test]
fn test_shuffled_keeps_elements() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut shuffled = (0..100).shuffled_with(&mut rng);
    assert_eq!(shuffled.len(), 100);
    shuffled.sort_unstable();
    assert_eq!(shuffled, (0..100).collect::<Vec<_>>());

    let again = (0..100).shuffled_with(&mut StdRng::seed_from_u64(7));
    let first = (0..100).shuffled_with(&mut StdRng::seed_from_u64(7));
    assert_eq!(again, first);
}

#[test]
fn test_shuffled_empty() {
    let empty: Vec<u8> = Vec::<u8>::new().into_iter().shuffled();
    assert!(empty.is_empty());
}
