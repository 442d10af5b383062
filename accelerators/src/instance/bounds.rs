//! Instance bounds.

use super::*;
use itertools::iproduct;
use rtcore::stat_inc;

/// Largest number of zeros kept per motion derivative search.
const MAX_ZEROS: usize = 8;

impl Instance {
    /// Returns the bounds of the instanced object at a global time or an
    /// invalid box if there is no object.
    fn object_bounds_at(&self, time: Float) -> Bounds3f {
        self.object
            .as_ref()
            .map_or(Bounds3f::EMPTY, |object| object.bounds_at(time))
    }

    /// Returns the world space bounds at a global time.
    ///
    /// * `time` - Global time.
    pub fn interpolated_bounds(&self, time: Float) -> Bounds3f {
        self.get_local_to_world(time)
            .transform_bounds(&self.object_bounds_at(time))
    }

    /// Returns the linear bounds over a range of local times.
    fn local_linear_bounds(&self, t0: Float, t1: Float, range: &TimeRange) -> LBounds3f {
        let keys = self.time_segment_range(range);

        // Box containing the object at every time in the range.
        let mut object_bounds = Bounds3f::EMPTY;
        for itime in keys.clone() {
            let b = self.object_bounds_at(self.time_step(itime));
            if !b.is_valid() {
                return LBounds3f::EMPTY;
            }
            object_bounds = object_bounds.union(&b);
        }

        let bounds0 = Transform::new(self.local_transform(t0)).transform_bounds(&object_bounds);
        let bounds1 = Transform::new(self.local_transform(t1)).transform_bounds(&object_bounds);
        if !bounds0.is_valid() || !bounds1.is_valid() {
            return LBounds3f::EMPTY;
        }
        if t1 <= t0 {
            return LBounds3f::new(bounds0, bounds1);
        }

        // Times where a corner may stray furthest from the envelope.
        let segments = self.num_time_segments();
        let dt = t1 - t0;
        let env = LBounds3f::new(bounds0, bounds1);
        let slope_min = (bounds1.p_min - bounds0.p_min) / dt;
        let slope_max = (bounds1.p_max - bounds0.p_max) / dt;
        let mut candidates: Vec<(u8, Float)> = vec![];

        for (corner, itime) in iproduct!(0..8u8, *keys.start()..*keys.end()) {
            let t = (itime + 1) as Float / segments as Float;
            if itime + 1 < *keys.end() && t0 < t && t < t1 {
                candidates.push((corner, t));
            }

            if self.interpolation == TransformationInterpolation::NonLinear {
                let coeffs = self.motion_derivative_coeffs.get(itime).copied().unwrap_or_else(|| {
                    MotionDerivativeCoefficients::new(
                        &self.local2world[itime],
                        &self.local2world[itime + 1],
                    )
                });

                let p = object_bounds.corner(corner);
                let mut zeros = [0.0; MAX_ZEROS];
                for axis in 0..3 {
                    for slope in [slope_min[axis], slope_max[axis]] {
                        let n = coeffs.find_zeros(&p, axis, slope / segments as Float, &mut zeros);
                        stat_inc!(MOTION_DERIVATIVE_ZEROS, n as i64);
                        for u in &zeros[..n] {
                            let t = (itime as Float + u) / segments as Float;
                            if t0 < t && t < t1 {
                                candidates.push((corner, t));
                            }
                        }
                    }
                }
            }
        }

        // Grow both ends by the largest distance a corner leaves the envelope.
        let mut lower = Vector3f::zero();
        let mut upper = Vector3f::zero();
        for (corner, t) in candidates {
            let p = Transform::new(self.local_transform(t))
                .transform_point(&object_bounds.corner(corner));
            let e = env.interpolate((t - t0) / dt);
            lower = lower.max(&(e.p_min - p));
            upper = upper.max(&(p - e.p_max));
        }

        LBounds3f::new(
            bounds0.enlarge(&lower, &upper),
            bounds1.enlarge(&lower, &upper),
        )
    }
}

impl BoundsProvider for Instance {
    fn bounds(&self, prim: usize) -> Bounds3f {
        assert!(prim == 0, "instance has a single primitive");
        match &self.object {
            Some(object) => self
                .get_local_to_world0()
                .transform_bounds(&object.linear_bounds().bounds()),
            None => Bounds3f::EMPTY,
        }
    }

    fn bounds_at_step(&self, prim: usize, itime: usize) -> Bounds3f {
        assert!(prim == 0, "instance has a single primitive");
        Transform::new(self.key_transform(itime))
            .transform_bounds(&self.object_bounds_at(self.time_step(itime)))
    }

    fn linear_bounds_at_segment(&self, prim: usize, itime: usize) -> LBounds3f {
        let next = min(itime + 1, self.num_time_segments());
        LBounds3f::new(self.bounds_at_step(prim, itime), self.bounds_at_step(prim, next))
    }

    fn linear_bounds(&self, prim: usize, time_range: &TimeRange) -> LBounds3f {
        assert!(prim == 0, "instance has a single primitive");
        if self.num_time_steps() == 1 {
            return LBounds3f::from(self.bounds_at_step(prim, 0));
        }
        let t0 = self.local_time(time_range.lower);
        let t1 = self.local_time(time_range.upper);
        self.local_linear_bounds(t0, t1, time_range)
    }

    fn valid(&self, prim: usize, itimes: RangeInclusive<usize>) -> bool {
        assert!(prim == 0, "instance has a single primitive");
        itimes.into_iter().all(|itime| {
            itime < self.num_time_steps() && self.bounds_at_step(prim, itime).is_valid()
        })
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    fn unit_box() -> Bounds3f {
        bounds3(point3(-1.0, -1.0, -1.0), point3(1.0, 1.0, 1.0))
    }

    fn unit_scene() -> Arc<Scene> {
        let scene = Arc::new(Scene::new());
        scene.set_bounds(unit_box());
        scene
    }

    fn translating_instance() -> Instance {
        let mut instance = Instance::new(Some(unit_scene()), 2).unwrap();
        instance.set_transform(&IDENTITY_MATRIX, 0).unwrap();
        instance
            .set_transform(&Transform::translate(&vector3(10.0, 0.0, 0.0)).m, 1)
            .unwrap();
        instance.commit().unwrap();
        instance
    }

    fn spinning_instance(num_time_steps: usize, degrees_per_step: Float) -> Instance {
        let mut instance = Instance::new(Some(unit_scene()), num_time_steps).unwrap();
        for i in 0..num_time_steps {
            let qd = QuaternionDecomposition::default()
                .with_translation(vector3(3.0, 0.0, 0.0))
                .with_shift(vector3(2.0, 0.0, 0.0))
                .with_quaternion(Quaternion::from_axis_angle(
                    degrees_per_step * i as Float,
                    &vector3(0.0, 0.0, 1.0),
                ));
            instance.set_quaternion_decomposition(&qd, i).unwrap();
        }
        instance.commit().unwrap();
        instance
    }

    fn assert_bounds_approx_eq(b: &Bounds3f, p_min: (Float, Float, Float), p_max: (Float, Float, Float)) {
        for (p, e) in [(b.p_min, p_min), (b.p_max, p_max)] {
            assert!(approx_eq!(Float, p.x, e.0, epsilon = 1e-4), "{}", b);
            assert!(approx_eq!(Float, p.y, e.1, epsilon = 1e-4), "{}", b);
            assert!(approx_eq!(Float, p.z, e.2, epsilon = 1e-4), "{}", b);
        }
    }

    #[test]
    fn translating_instance_linear_bounds() {
        let instance = translating_instance();
        let lb = instance.linear_bounds(0, &TimeRange::new(0.0, 1.0));
        assert_eq!(lb.bounds(), bounds3(point3(-1.0, -1.0, -1.0), point3(11.0, 1.0, 1.0)));
        assert_eq!(lb.bounds0, unit_box());
    }

    #[test]
    fn bounds_at_keys() {
        let instance = translating_instance();
        assert_eq!(instance.bounds(0), unit_box());
        assert_eq!(
            instance.bounds_at_step(0, 1),
            bounds3(point3(9.0, -1.0, -1.0), point3(11.0, 1.0, 1.0))
        );
        let lb = instance.linear_bounds_at_segment(0, 0);
        assert_eq!(lb.bounds0, instance.bounds_at_step(0, 0));
        assert_eq!(lb.bounds1, instance.bounds_at_step(0, 1));
        assert!(instance.valid(0, 0..=1));
        assert!(!instance.valid(0, 0..=2));
    }

    #[test]
    #[should_panic]
    fn primitive_index_must_be_zero() {
        translating_instance().bounds(1);
    }

    #[test]
    fn missing_object_gives_invalid_bounds() {
        let mut instance = Instance::new(None, 2).unwrap();
        instance.commit().unwrap();
        assert!(!instance.bounds(0).is_valid());
        assert!(!instance.bounds_at_step(0, 1).is_valid());
        assert!(!instance.linear_bounds(0, &TimeRange::default()).is_valid());
        assert!(!instance.valid(0, 0..=1));
    }

    #[test]
    fn empty_object_gives_invalid_bounds() {
        let mut instance = Instance::new(Some(Arc::new(Scene::new())), 1).unwrap();
        instance.commit().unwrap();
        assert!(!instance.bounds(0).is_valid());
        assert!(!instance.interpolated_bounds(0.5).is_valid());
    }

    #[test]
    fn singular_key_is_not_valid() {
        let mut instance = translating_instance();
        instance
            .set_transform(&Transform::scale(1.0, 0.0, 1.0).m, 1)
            .unwrap();
        instance.commit().unwrap();
        assert!(instance.valid(0, 0..=0));
        assert!(!instance.valid(0, 0..=1));
        assert!(!instance.bounds_at_step(0, 1).is_valid());
    }

    #[test]
    fn detached_instance_releases_object() {
        let scene = Arc::new(Scene::new());
        let object = unit_scene();
        let mut instance = Instance::new(Some(object.clone()), 1).unwrap();
        instance.attach(&scene, 7).unwrap();
        assert_eq!(Arc::strong_count(&object), 2);

        instance.detach();
        assert_eq!(Arc::strong_count(&object), 1);
        assert!(!instance.bounds(0).is_valid());
        instance.detach();
    }

    #[test]
    fn detaching_unattached_instance_releases_object() {
        let object = unit_scene();
        let mut instance = Instance::new(Some(object.clone()), 1).unwrap();
        assert_eq!(Arc::strong_count(&object), 2);

        instance.detach();
        assert_eq!(Arc::strong_count(&object), 1);
        assert!(instance.object().is_none());
        assert!(!instance.bounds(0).is_valid());
    }

    #[test]
    fn quarter_turn_bounds_include_arc() {
        // The box center moves on a circle of radius 2 around (3, 0, 0) from
        // angle 0 to 90 degrees, passing through (3 + √2, √2, 0).
        let instance = spinning_instance(2, 90.0);
        let lb = instance.linear_bounds(0, &TimeRange::default());
        let mid = lb.interpolate(0.5);
        let c = point3(3.0 + 2.0f32.sqrt(), 2.0f32.sqrt(), 0.0);
        assert!(mid.expand(1e-3).contains_bounds(&bounds3(
            c - vector3(1.0, 1.0, 1.0),
            c + vector3(1.0, 1.0, 1.0)
        )));
    }

    proptest! {
        #[test]
        fn linear_round_trip_at_keys(
            num_time_steps in 1..6usize,
            step in 0..6usize,
            tx in -10.0..10.0f32,
            sy in 0.5..3.0f32,
        ) {
            let step = step % num_time_steps;
            let mut instance = Instance::new(None, num_time_steps).unwrap();
            let m = (Transform::translate(&vector3(tx, 1.0, -2.0)) * Transform::scale(1.0, sy, 1.0)).m;
            instance.set_transform(&m, step).unwrap();
            instance.commit().unwrap();

            let r = instance.get_transform(instance.time_step(step));
            for i in 0..4 {
                for j in 0..4 {
                    prop_assert!(approx_eq!(Float, r.m[i][j], m.m[i][j], epsilon = 1e-4));
                }
            }
        }

        #[test]
        fn slerp_reproduces_end_keys(degrees in -170.0..170.0f32) {
            let instance = spinning_instance(2, degrees);
            let qd0 = QuaternionDecomposition::unpack(&instance.local2world[0]);
            let qd1 = QuaternionDecomposition::unpack(&instance.local2world[1]);
            let m0 = instance.get_transform(0.0);
            let m1 = instance.get_transform(1.0);
            for i in 0..4 {
                for j in 0..4 {
                    prop_assert!(approx_eq!(Float, m0.m[i][j], qd0.to_affine().m[i][j], epsilon = 1e-4));
                    prop_assert!(approx_eq!(Float, m1.m[i][j], qd1.to_affine().m[i][j], epsilon = 1e-4));
                }
            }
        }

        #[test]
        fn slerp_angle_to_start_grows_monotonically(degrees in 10.0..170.0f32) {
            let instance = spinning_instance(2, degrees);
            let q0 = Quaternion::default();
            let mut last = -1.0;
            for i in 0..=10 {
                let q = Quaternion::from(&instance.get_transform(i as Float / 10.0));
                let angle = clamp(q.dot(&q0).abs(), 0.0, 1.0).acos();
                prop_assert!(angle >= last - 1e-3);
                last = angle;
            }
        }

        #[test]
        fn linear_bounds_contain_sampled_bounds(
            nonlinear in proptest::bool::ANY,
            num_time_steps in 2..5usize,
            degrees in -120.0..120.0f32,
            lower in 0.0..1.0f32,
            len in 0.0..1.0f32,
            s in 0.0..=1.0f32,
        ) {
            let instance = if nonlinear {
                spinning_instance(num_time_steps, degrees)
            } else {
                let mut instance = Instance::new(Some(unit_scene()), num_time_steps).unwrap();
                for i in 0..num_time_steps {
                    let f = i as Float;
                    let m = Transform::translate(&vector3(f * degrees / 10.0, f * f, -f))
                        * Transform::rotate_z(degrees * f);
                    instance.set_transform(&m.m, i).unwrap();
                }
                instance.commit().unwrap();
                instance
            };

            let upper = min(lower + len, 1.0);
            let range = TimeRange::new(lower, upper);
            let lb = instance.linear_bounds(0, &range);
            prop_assert!(lb.is_valid());

            let t = lower + s * (upper - lower);
            let b = instance.interpolated_bounds(t);
            let rel = if upper > lower { (t - lower) / (upper - lower) } else { 0.0 };
            let env = lb.interpolate(rel).expand(1e-2);
            prop_assert!(env.contains_bounds(&b), "{} not in {} at {}", b, env, t);
        }
    }
}
