//! Unit tests for nav-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, EdgeId, NodeId};

    #[test]
    fn index_roundtrip() {
        let id = AgentId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(AgentId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinel() {
        assert_eq!(NodeId::INVALID.0, u32::MAX);
        assert!(!EdgeId::default().is_valid());
        assert!(NodeId(0).is_valid());
    }

    #[test]
    fn display() {
        assert_eq!(AgentId(7).to_string(), "AgentId(7)");
    }
}

#[cfg(test)]
mod geom {
    use crate::{Line, Vector2, det, dist_sq_point_segment, left_of};

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn det_sign_is_counter_clockwise() {
        let x = Vector2::new(1.0, 0.0);
        let y = Vector2::new(0.0, 1.0);
        assert!(det(x, y) > 0.0);
        assert!(det(y, x) < 0.0);
    }

    #[test]
    fn left_of_directed_line() {
        let a = Vector2::new(0.0, 0.0);
        let b = Vector2::new(1.0, 0.0);
        assert!(left_of(a, b, Vector2::new(0.5, 1.0)) > 0.0);
        assert!(left_of(a, b, Vector2::new(0.5, -1.0)) < 0.0);
        assert_eq!(left_of(a, b, Vector2::new(3.0, 0.0)), 0.0);
    }

    #[test]
    fn normalize_zero_stays_zero() {
        assert_eq!(Vector2::ZERO.normalized(), Vector2::ZERO);
        let n = Vector2::new(3.0, 4.0).normalized();
        assert!(approx(n.length(), 1.0));
    }

    #[test]
    fn segment_distance_regions() {
        let a = Vector2::new(0.0, 0.0);
        let b = Vector2::new(2.0, 0.0);
        assert!(approx(dist_sq_point_segment(a, b, Vector2::new(1.0, 1.0)), 1.0));
        assert!(approx(dist_sq_point_segment(a, b, Vector2::new(-1.0, 0.0)), 1.0));
        assert!(approx(dist_sq_point_segment(a, b, Vector2::new(3.0, 1.0)), 2.0));
        assert!(approx(dist_sq_point_segment(a, a, Vector2::new(0.0, 2.0)), 4.0));
    }

    #[test]
    fn line_violation_is_right_side() {
        let line = Line::new(Vector2::ZERO, Vector2::new(1.0, 0.0));
        assert!(line.violation(Vector2::new(0.0, -1.0)) > 0.0);
        assert!(line.violation(Vector2::new(0.0, 1.0)) < 0.0);
    }

    #[test]
    fn scalar_multiplication_commutes() {
        let v = Vector2::new(1.0, -2.0);
        assert_eq!(2.0 * v, v * 2.0);
    }
}

#[cfg(test)]
mod pref_velocity {
    use crate::{PrefVelocity, Vector2};

    #[test]
    fn default_points_along_x() {
        let p = PrefVelocity::default();
        assert_eq!(p.preferred(), Vector2::new(1.0, 0.0));
        assert_eq!(p.speed(), 1.0);
        assert!(p.is_single());
    }

    #[test]
    fn span_and_velocity() {
        let mut p = PrefVelocity::default();
        let left = Vector2::new(0.0, 1.0);
        let right = Vector2::new(1.0, 0.0);
        let pref = Vector2::new(1.0, 1.0).normalized();
        p.set_span(left, right, pref);
        p.set_speed(2.0);
        assert!(!p.is_single());
        let v = p.preferred_velocity();
        assert!((v.length() - 2.0).abs() < 1e-5);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn inverted_span_panics_in_debug() {
        let mut p = PrefVelocity::default();
        p.set_span(Vector2::new(1.0, 0.0), Vector2::new(0.0, 1.0), Vector2::new(1.0, 0.0));
    }
}

#[cfg(test)]
mod time {
    use crate::{SimConfig, Tick};

    #[test]
    fn tick_arithmetic() {
        let t = Tick(10);
        assert_eq!(t + 5, Tick(15));
        assert_eq!(t.offset(3), Tick(13));
        assert_eq!(Tick(15) - Tick(10), 5u64);
    }

    #[test]
    fn clock_elapsed() {
        let cfg = SimConfig { time_step: 0.25, ..SimConfig::default() };
        let mut clock = cfg.make_clock();
        clock.advance();
        clock.advance();
        assert!((clock.elapsed_secs() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn validate_rejects_bad_step() {
        assert!(SimConfig::default().validate().is_ok());
        let bad = SimConfig { time_step: 0.0, ..SimConfig::default() };
        assert!(bad.validate().is_err());
        let nan = SimConfig { time_step: f32::NAN, ..SimConfig::default() };
        assert!(nan.validate().is_err());
        let threads = SimConfig { num_threads: Some(0), ..SimConfig::default() };
        assert!(threads.validate().is_err());
    }
}
