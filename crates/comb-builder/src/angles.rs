use rand::Rng;

/// Bend angles for a contiguous run of bent teeth, in radians.
///
/// The profile ramps up from 5 degrees in 3-degree steps to the middle of
/// the run and mirrors back down, every value clamped to `max_angle`. This
/// models a physically plausible damage pattern: teeth bend most in the
/// middle of the run, tapering at the edges. Interior entries get an extra
/// uniform jitter of up to one degree either way; the two endpoints stay
/// exact.
pub fn bend_angle_schedule<R: Rng>(count: usize, max_angle: f64, rng: &mut R) -> Vec<f64> {
    let middle = count / 2;
    let mut angles = Vec::with_capacity(count);

    for i in 0..count {
        let step = if i < middle { i } else { count - 1 - i };
        let mut angle = ((5 + 3 * step) as f64).to_radians().min(max_angle);

        if i != 0 && i != count - 1 {
            angle += rng.gen_range(-1.0f64.to_radians()..=1.0f64.to_radians());
        }
        angles.push(angle);
    }

    angles
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const JITTER: f64 = 1.0 * std::f64::consts::PI / 180.0;

    #[test]
    fn test_schedule_length_and_bounds() {
        let mut rng = Pcg32::seed_from_u64(1);
        for count in [1usize, 2, 3, 7, 20] {
            let max = 12.0f64.to_radians();
            let angles = bend_angle_schedule(count, max, &mut rng);
            assert_eq!(angles.len(), count);
            for a in &angles {
                assert!(*a <= max + JITTER);
                assert!(*a > 0.0);
            }
        }
    }

    #[test]
    fn test_endpoints_are_exactly_five_degrees() {
        let mut rng = Pcg32::seed_from_u64(2);
        let max = 15.0f64.to_radians();
        let angles = bend_angle_schedule(9, max, &mut rng);

        assert_relative_eq!(angles[0], 5.0f64.to_radians(), epsilon = 1e-12);
        assert_relative_eq!(angles[8], 5.0f64.to_radians(), epsilon = 1e-12);
    }

    #[test]
    fn test_profile_is_symmetric_up_to_jitter() {
        let mut rng = Pcg32::seed_from_u64(3);
        let max = 90.0f64.to_radians(); // no clamping in play
        let count = 11;
        let angles = bend_angle_schedule(count, max, &mut rng);

        for i in 0..count {
            let mirrored = angles[count - 1 - i];
            assert!(
                (angles[i] - mirrored).abs() <= 2.0 * JITTER + 1e-12,
                "index {i}: {} vs {}",
                angles[i],
                mirrored
            );
        }
    }

    #[test]
    fn test_ramp_increases_toward_middle() {
        let mut rng = Pcg32::seed_from_u64(4);
        let max = 90.0f64.to_radians();
        let angles = bend_angle_schedule(9, max, &mut rng);

        for i in 0..4 {
            assert!(
                angles[i + 1] >= angles[i] - 2.0 * JITTER,
                "ramp should not decrease before the middle"
            );
        }
    }

    #[test]
    fn test_clamp_to_max_angle() {
        let mut rng = Pcg32::seed_from_u64(5);
        let max = 6.0f64.to_radians();
        let angles = bend_angle_schedule(15, max, &mut rng);

        for a in &angles {
            assert!(*a <= max + JITTER);
        }
        // The middle of a long run saturates at the clamp.
        assert_relative_eq!(angles[7], max, epsilon = JITTER + 1e-12);
    }

    #[test]
    fn test_single_tooth_run() {
        let mut rng = Pcg32::seed_from_u64(6);
        let angles = bend_angle_schedule(1, 10.0f64.to_radians(), &mut rng);
        // One tooth is both endpoints: no jitter, base 5 degrees.
        assert_relative_eq!(angles[0], 5.0f64.to_radians(), epsilon = 1e-12);
    }
}
