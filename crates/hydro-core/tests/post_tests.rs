// Post chain (blur, saturation) and clip-shape coverage.

use glam::{Vec2, Vec4};
use hydro_core::config::{ClipShape, EffectConfig, HydroEffects};
use hydro_core::post::*;
use hydro_core::shape::{apply_clip, coverage};
use hydro_core::Image;

fn approx4(a: Vec4, b: Vec4, eps: f32) -> bool {
    (a - b).abs().max_element() <= eps
}

#[test]
fn gaussian_kernel_is_normalized_and_symmetric() {
    let k = gaussian_kernel(2.0);
    assert_eq!(k.len(), 13);
    let sum: f32 = k.iter().sum();
    assert!((sum - 1.0).abs() < 1e-5);
    for i in 0..k.len() / 2 {
        assert!((k[i] - k[k.len() - 1 - i]).abs() < 1e-7);
    }
    assert!(k[6] > k[5]);
    assert_eq!(gaussian_kernel(0.0), vec![1.0]);
}

#[test]
fn mirror_index_reflects_with_edge_repeat() {
    assert_eq!(mirror_index(-1, 5), 0);
    assert_eq!(mirror_index(-2, 5), 1);
    assert_eq!(mirror_index(0, 5), 0);
    assert_eq!(mirror_index(4, 5), 4);
    assert_eq!(mirror_index(5, 5), 4);
    assert_eq!(mirror_index(6, 5), 3);
    assert_eq!(mirror_index(10, 5), 0);
}

#[test]
fn blur_leaves_flat_image_flat() {
    let c = Vec4::new(0.3, 0.5, 0.7, 0.6);
    let img = Image::filled(9, 7, c);
    let out = gaussian_blur(&img, 3.0);
    for p in out.pixels() {
        assert!(approx4(*p, c, 1e-5), "{p:?}");
    }
}

#[test]
fn blur_spreads_a_point_and_keeps_its_energy() {
    let mut img = Image::filled(21, 21, Vec4::new(0.0, 0.0, 0.0, 1.0));
    img.set(10, 10, Vec4::new(1.0, 1.0, 1.0, 1.0));
    let out = gaussian_blur(&img, 1.5);
    let centre = out.get(10, 10).x;
    assert!(centre < 1.0 && centre > 0.0);
    assert!(out.get(11, 10).x > 0.0);
    assert!(out.get(11, 10).x < centre);
    let total: f32 = out.pixels().iter().map(|p| p.x).sum();
    assert!((total - 1.0).abs() < 1e-3, "{total}");
}

#[test]
fn blur_does_not_bleed_transparent_black() {
    let mut img = Image::new(8, 1);
    for x in 4..8 {
        img.set(x, 0, Vec4::new(1.0, 0.0, 0.0, 1.0));
    }
    let out = gaussian_blur(&img, 1.0);
    // colour stays pure red wherever anything is visible
    for p in out.pixels() {
        if p.w > 1e-3 {
            assert!((p.x - 1.0).abs() < 1e-4, "{p:?}");
        }
    }
}

#[test]
fn saturation_zero_is_luminance_grey() {
    let out = apply_color_matrix(&saturation_matrix(0.0), Vec4::new(1.0, 0.0, 0.0, 0.5));
    assert!(approx4(out, Vec4::new(0.213, 0.213, 0.213, 0.5), 1e-6));
}

#[test]
fn saturation_one_is_identity() {
    let c = Vec4::new(0.1, 0.4, 0.9, 0.3);
    assert!(approx4(apply_color_matrix(&saturation_matrix(1.0), c), c, 1e-6));
}

#[test]
fn oversaturation_pushes_channels_apart_and_clamps() {
    let c = Vec4::new(0.6, 0.5, 0.4, 1.0);
    let out = apply_color_matrix(&saturation_matrix(3.0), c);
    assert!(out.x > c.x && out.z < c.z);
    let vivid = apply_color_matrix(&saturation_matrix(10.0), Vec4::new(1.0, 0.0, 0.0, 1.0));
    assert_eq!(vivid.x, 1.0);
    assert_eq!(vivid.y, 0.0);
}

#[test]
fn chain_is_empty_by_default() {
    assert!(PostChain::from_config(&EffectConfig::default()).is_empty());
}

#[test]
fn chain_orders_blur_before_saturation() {
    let config = EffectConfig::default()
        .with_density(1.5)
        .with_effects(HydroEffects {
            blur: 2.0,
            vibrancy: 1.4,
            ..HydroEffects::default()
        });
    let chain = PostChain::from_config(&config);
    assert_eq!(
        chain.steps(),
        &[
            PostStep::Blur {
                sigma: blur_radius_to_sigma(3.0)
            },
            PostStep::Saturate { amount: 1.4 }
        ]
    );
    let img = Image::filled(6, 6, Vec4::new(0.5, 0.2, 0.1, 1.0));
    let out = chain.apply(img.clone());
    assert_eq!(out.size(), img.size());
}

#[test]
fn blur_radius_maps_to_a_narrower_sigma() {
    assert_eq!(blur_radius_to_sigma(0.0), 0.0);
    assert!((blur_radius_to_sigma(4.0) - 2.8094).abs() < 1e-3);
    assert!((blur_radius_to_sigma(10.0) - 6.2735).abs() < 1e-3);

    let config = EffectConfig::default().with_effects(HydroEffects {
        blur: 4.0,
        ..HydroEffects::default()
    });
    let chain = PostChain::from_config(&config);
    let [PostStep::Blur { sigma }] = chain.steps() else {
        panic!("expected a single blur step, got {:?}", chain.steps());
    };
    assert!((sigma - 2.8094).abs() < 1e-3, "{sigma}");
    // ceil(3 * 2.81) = 9 taps per side
    assert_eq!(gaussian_kernel(*sigma).len(), 19);
}

#[test]
fn rectangle_clip_is_a_no_op() {
    let img = Image::filled(5, 5, Vec4::ONE);
    assert_eq!(apply_clip(img.clone(), ClipShape::Rectangle, 1.0), img);
}

#[test]
fn rounded_rect_clears_corners_only() {
    let img = Image::filled(40, 20, Vec4::ONE);
    let out = apply_clip(img, ClipShape::RoundedRect { radius: 6.0 }, 1.0);
    assert_eq!(out.get(0, 0).w, 0.0);
    assert_eq!(out.get(39, 19).w, 0.0);
    assert_eq!(out.get(20, 0).w, 1.0);
    assert_eq!(out.get(0, 10).w, 1.0);
    assert_eq!(out.get(20, 10).w, 1.0);
}

#[test]
fn capsule_uses_half_the_short_side() {
    let size = Vec2::new(60.0, 20.0);
    // end caps are semicircles of radius 10
    assert_eq!(coverage(ClipShape::Capsule, 1.0, size, Vec2::new(1.0, 1.0)), 0.0);
    assert_eq!(coverage(ClipShape::Capsule, 1.0, size, Vec2::new(30.0, 10.0)), 1.0);
    assert_eq!(coverage(ClipShape::Capsule, 1.0, size, Vec2::new(2.5, 10.0)), 1.0);
    let edge = coverage(ClipShape::Capsule, 1.0, size, Vec2::new(0.0, 10.0));
    assert!(edge > 0.0 && edge < 1.0, "{edge}");
}

#[test]
fn corner_radius_scales_with_density() {
    let size = Vec2::new(40.0, 40.0);
    let p = Vec2::new(2.5, 2.5);
    let shape = ClipShape::RoundedRect { radius: 3.0 };
    assert_eq!(coverage(shape, 1.0, size, p), 1.0);
    assert_eq!(coverage(shape, 4.0, size, p), 0.0);
}
