use lumen::math::*;

fn assert_close(a: f64, b: f64, tol: f64) {
    assert!((a - b).abs() < tol, "expected {b} ± {tol}, got {a}");
}

#[test]
fn gamma_round_trips() {
    for i in 0..=100 {
        let x = i as f64 / 100.0;
        assert_close(gamma(reverse_gamma(x)), x, 1e-6);
        assert_close(reverse_gamma(gamma(x)), x, 1e-6);
    }
}

#[test]
fn interval_contains_and_surrounds() {
    let i = Interval::new(1.0, 2.0);
    assert!(i.contains(1.0));
    assert!(i.contains(2.0));
    assert!(i.contains(1.5));
    assert!(!i.contains(0.999));

    assert!(!i.surrounds(1.0));
    assert!(!i.surrounds(2.0));
    assert!(i.surrounds(1.5));
}

#[test]
fn interval_expand_is_symmetric() {
    let i = Interval::new(1.0, 2.0).expand(1.0);
    assert_close(i.min, 0.5, 1e-12);
    assert_close(i.max, 2.5, 1e-12);
}

#[test]
fn aabb_merge_algebra() {
    let a = Aabb::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 2.0, 1.0));
    let b = Aabb::new(Vec3::new(0.0, -3.0, 0.5), Vec3::new(4.0, 1.0, 0.75));
    let c = Aabb::new(Vec3::new(-5.0, -5.0, -5.0), Vec3::new(-4.0, -4.0, -4.0));

    let ab = Aabb::merge(&a, &b);
    let ba = Aabb::merge(&b, &a);
    assert_eq!(ab.min, ba.min);
    assert_eq!(ab.max, ba.max);

    let ab_c = Aabb::merge(&Aabb::merge(&a, &b), &c);
    let a_bc = Aabb::merge(&a, &Aabb::merge(&b, &c));
    assert_eq!(ab_c.min, a_bc.min);
    assert_eq!(ab_c.max, a_bc.max);

    let aa = Aabb::merge(&a, &a);
    assert_eq!(aa.min, a.min);
    assert_eq!(aa.max, a.max);
}

#[test]
fn aabb_longest_axis_prefers_y_then_z_then_x() {
    // Perfect cube: Y wins the tie.
    let cube = Aabb::new(Vec3::zero(), Vec3::ones());
    assert_eq!(cube.longest_axis(), 1);

    // Y and Z tied and longer than X: still Y.
    let yz = Aabb::new(Vec3::zero(), Vec3::new(1.0, 2.0, 2.0));
    assert_eq!(yz.longest_axis(), 1);

    // Z and X tied, longer than Y: Z.
    let zx = Aabb::new(Vec3::zero(), Vec3::new(2.0, 1.0, 2.0));
    assert_eq!(zx.longest_axis(), 2);

    let x = Aabb::new(Vec3::zero(), Vec3::new(3.0, 1.0, 2.0));
    assert_eq!(x.longest_axis(), 0);
}

#[test]
fn slab_test_hits_box_on_the_ray() {
    let interval = Interval::new(0.001, 1e9);
    for _ in 0..1000 {
        let bb = Aabb::new(
            Vec3::new(
                random_double() * 4.0 - 2.0,
                random_double() * 4.0 - 2.0,
                random_double() * 4.0 - 2.0,
            ),
            Vec3::new(
                2.0 + random_double() * 4.0,
                2.0 + random_double() * 4.0,
                2.0 + random_double() * 4.0,
            ),
        );
        let origin = Vec3::new(10.0 + random_double(), 10.0, 10.0);
        let ray = Ray::new(origin, (bb.center() - origin).normalized());
        assert!(bb.hit(&ray, interval), "ray aimed at a box center must hit");

        // The parametric point at the center distance lies inside the box.
        let t = (bb.center() - origin).length();
        let p = ray.at(t);
        assert!(bb.min.x <= p.x && p.x <= bb.max.x);
        assert!(bb.min.y <= p.y && p.y <= bb.max.y);
        assert!(bb.min.z <= p.z && p.z <= bb.max.z);

        // Pointing the other way misses.
        let away = Ray::new(origin, (origin - bb.center()).normalized());
        assert!(!bb.hit(&away, interval));
    }
}

#[test]
fn slab_test_from_inside_hits_in_any_direction() {
    let bb = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
    let interval = Interval::new(0.01, 1e9);
    for _ in 0..1000 {
        let ray = Ray::new(Vec3::new(0.2, -0.3, 0.4), random_unit_vector());
        assert!(bb.hit(&ray, interval));
    }
}

#[test]
fn orthonormal_basis_is_orthonormal() {
    for _ in 0..1000 {
        let up = random_unit_vector();
        let m = local_to_world(up);
        let [x, y, z] = m.cols;
        assert_close(x.length(), 1.0, 1e-9);
        assert_close(y.length(), 1.0, 1e-9);
        assert_close(z.length(), 1.0, 1e-9);
        assert_close(x.dot(y), 0.0, 1e-9);
        assert_close(y.dot(z), 0.0, 1e-9);
        assert_close(z.dot(x), 0.0, 1e-9);
        // Right-handed: X × Y = Z.
        assert!((x.cross(y) - z).near_zero());
        // The frame maps local +Y back onto the input normal.
        assert!((m.mul_vec3(Vec3::unit_y()) - up).near_zero());
    }
}

#[test]
fn orthonormal_basis_of_world_up_is_axis_permutation() {
    let m = local_to_world(Vec3::unit_y());
    for col in m.cols {
        let components = [col.x.abs(), col.y.abs(), col.z.abs()];
        let ones = components.iter().filter(|c| (**c - 1.0).abs() < 1e-12).count();
        let zeros = components.iter().filter(|c| **c < 1e-12).count();
        assert_eq!(ones, 1);
        assert_eq!(zeros, 2);
    }
    assert_eq!(m.cols[1], Vec3::unit_y());
}

#[test]
fn cosine_weighted_sampling_mean_converges() {
    let normal = random_unit_vector();
    let samples = 200_000;
    let mut sum = 0.0;
    for _ in 0..samples {
        let d = cosine_weighted_sampling(normal);
        assert_close(d.length(), 1.0, 1e-9);
        let cos_theta = normal.dot(d);
        assert!(cos_theta >= -1e-9, "sample below the hemisphere");
        sum += cos_theta;
    }
    // E[cos θ] under the cos θ/π density is 2/3.
    assert_close(sum / samples as f64, 2.0 / 3.0, 0.01);
}

#[test]
fn cosine_weighted_histogram_matches_density() {
    // Bin by cos θ; the mass in [a, b] under pdf cos θ/π over the hemisphere
    // is b² − a².
    let normal = Vec3::unit_y();
    let samples = 200_000;
    let bins = 10;
    let mut counts = vec![0u32; bins];
    for _ in 0..samples {
        let c = normal.dot(cosine_weighted_sampling(normal)).clamp(0.0, 1.0 - 1e-12);
        counts[(c * bins as f64) as usize] += 1;
    }
    for (i, count) in counts.iter().enumerate() {
        let a = i as f64 / bins as f64;
        let b = (i + 1) as f64 / bins as f64;
        let expected = b * b - a * a;
        let observed = *count as f64 / samples as f64;
        assert_close(observed, expected, 0.01);
    }
}

#[test]
fn random_unit_vector_is_unit() {
    for _ in 0..1000 {
        assert_close(random_unit_vector().length(), 1.0, 1e-9);
    }
}

#[test]
fn equirectangular_round_trips_on_cardinal_axes() {
    let axes = [
        Vec3::unit_x(),
        -Vec3::unit_x(),
        Vec3::unit_y(),
        -Vec3::unit_y(),
        Vec3::unit_z(),
        -Vec3::unit_z(),
    ];
    for axis in axes {
        let back = uv_to_direction(direction_to_uv(axis));
        assert!(
            (back - axis).length() < 1e-9,
            "axis {axis} round-tripped to {back}"
        );
    }
}

#[test]
fn reflect_and_refract_basics() {
    let n = Vec3::unit_y();
    let incident = Vec3::new(1.0, -1.0, 0.0).normalized();
    let reflected = incident.reflect(n);
    assert!((reflected - Vec3::new(1.0, 1.0, 0.0).normalized()).near_zero());

    // Straight-on refraction passes through unchanged.
    let straight = -Vec3::unit_y();
    let refracted = straight.refract(n, 1.0 / 1.5).unwrap();
    assert!((refracted - straight).near_zero());

    // Total internal reflection from the dense side at a grazing angle.
    let grazing = Vec3::new(1.0, -0.1, 0.0).normalized();
    assert!(grazing.refract(n, 1.5).is_none());
}
