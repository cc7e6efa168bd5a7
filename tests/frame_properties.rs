//! Behaviour shared by every frame: reversible corrections, pure queries,
//! validated construction and continuous tracking

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstest::rstest;
use starframes::{
    CelestialFrame, Corrections, EclipticCenter, EclipticFrame, EclipticOptions, EclipticRetarget,
    Epoch, EquinoctialFrame, EquinoctialOptions, EquinoctialRetarget, FrameError, GalacticFrame,
    GalacticOptions, GalacticRetarget, HorizontalCenter, HorizontalFrame, HorizontalOptions,
    HourAngleFrame, HourAngleOptions, ObservingCondition, ObservingRetarget, SpatialPosition,
};

fn observer() -> ObservingCondition {
    let time = Epoch::from_calendar(2024, 8, 12, 21, 30, 0.0).unwrap();
    ObservingCondition::new(time, -17.88, 28.76, 2400.0).unwrap()
}

fn assert_same(actual: &SpatialPosition, expected: &SpatialPosition) {
    assert!(actual.angle_between(expected) < 1e-12);
    assert_relative_eq!(actual.r(), expected.r(), max_relative = 1e-12);
}

#[test]
fn test_equinoctial_layers_are_involutions() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..20 {
        let frame = EquinoctialFrame::new(
            EquinoctialOptions::default()
                .with_ra_dec(rng.gen_range(0.0..360.0), rng.gen_range(-90.0..=90.0))
                .with_epoch(Epoch::julian_epoch(rng.gen_range(1950.0..2050.0)).unwrap())
                .with_corrections(Corrections {
                    nutation: rng.gen(),
                    fk5: rng.gen(),
                    annual_aberration: rng.gen(),
                    gravitational_deflection: rng.gen(),
                }),
        )
        .unwrap();

        type Toggle = fn(&mut EquinoctialFrame);
        let pairs: [(Toggle, Toggle); 4] = [
            (EquinoctialFrame::apply_nutation, EquinoctialFrame::remove_nutation),
            (EquinoctialFrame::apply_fk5, EquinoctialFrame::remove_fk5),
            (
                EquinoctialFrame::apply_annual_aberration,
                EquinoctialFrame::remove_annual_aberration,
            ),
            (
                EquinoctialFrame::apply_gravitational_deflection,
                EquinoctialFrame::remove_gravitational_deflection,
            ),
        ];
        for (apply, remove) in pairs {
            let mut toggled = frame.clone();
            remove(&mut toggled);
            apply(&mut toggled);
            remove(&mut toggled);
            apply(&mut toggled);
            let mut restored = toggled.clone();
            // Back to the original flag for this layer
            restored.retarget(&EquinoctialRetarget {
                nutation: Some(frame.corrections().nutation),
                fk5: Some(frame.corrections().fk5),
                annual_aberration: Some(frame.corrections().annual_aberration),
                gravitational_deflection: Some(frame.corrections().gravitational_deflection),
                ..EquinoctialRetarget::default()
            });
            assert_eq!(restored.corrections(), frame.corrections());
            assert_same(&restored.position(), &frame.position());
        }
    }
}

#[test]
fn test_ecliptic_involutions() {
    let mut frame = EclipticFrame::new(
        EclipticOptions::default()
            .with_lon_lat(301.5, -4.25)
            .with_radius(5.2)
            .with_epoch(Epoch::julian_epoch(2031.0).unwrap()),
    )
    .unwrap();
    let original = frame.clone();

    frame.apply_nutation();
    assert!(frame.with_nutation());
    frame.remove_nutation();
    assert!(!frame.with_nutation());
    assert_same(&frame.position(), &original.position());

    frame.to_heliocentric().unwrap();
    assert_eq!(frame.center(), EclipticCenter::Heliocentric);
    frame.to_geocentric().unwrap();
    assert_eq!(frame.center(), EclipticCenter::Geocentric);
    assert_same(&frame.position(), &original.position());
}

#[test]
fn test_horizontal_involutions() {
    let mut frame = HorizontalFrame::new(
        HorizontalOptions::default()
            .with_azimuth_altitude(140.0, 12.5)
            .with_radius(0.0026)
            .with_observing(observer()),
    )
    .unwrap();
    let original = frame.clone();

    frame.to_topocentric().unwrap();
    assert_eq!(frame.center(), HorizontalCenter::Topocentric);
    frame.to_geocentric().unwrap();
    assert_eq!(frame.center(), HorizontalCenter::Geocentric);
    assert!(frame.position().angle_between(&original.position()) < 1e-11);

    frame.apply_refraction().unwrap();
    assert!(frame.with_ar());
    frame.remove_refraction().unwrap();
    assert!(!frame.with_ar());
    assert!(frame.position().angle_between(&original.position()) < 1e-11);
}

#[test]
fn test_repeated_epoch_retarget_is_idempotent() {
    let target = Epoch::julian_epoch(2077.5).unwrap();

    let mut equinoctial = EquinoctialFrame::new(
        EquinoctialOptions::default()
            .with_ra_dec(88.79, 7.41)
            .with_corrections(Corrections::all()),
    )
    .unwrap();
    equinoctial.retarget_epoch(target);
    let once = equinoctial.position();
    equinoctial.retarget_epoch(target);
    assert_eq!(equinoctial.position(), once);

    let mut ecliptic = EclipticFrame::from_lon_lat(10.0, 1.0, Epoch::B1950).unwrap();
    ecliptic.retarget_epoch(target).unwrap();
    let once = ecliptic.position();
    ecliptic.retarget_epoch(target).unwrap();
    assert_eq!(ecliptic.position(), once);

    let mut galactic = GalacticFrame::from_lon_lat(200.0, -30.0, Epoch::J2000).unwrap();
    galactic.retarget_epoch(target);
    let once = galactic.position();
    galactic.retarget_epoch(target);
    assert_eq!(galactic.position(), once);
}

#[test]
fn test_queries_leave_frames_untouched() {
    let later = Epoch::julian_epoch(2100.0).unwrap();

    let equinoctial = EquinoctialFrame::from_ra_dec(250.0, -45.0, Epoch::J2000).unwrap();
    let before = equinoctial.clone();
    let snapshot = equinoctial
        .snapshot(&EquinoctialRetarget::default().with_epoch(later).with_nutation(true))
        .unwrap();
    assert_eq!(snapshot.epoch(), later);
    equinoctial.to_ecliptic().unwrap();
    equinoctial.to_galactic().unwrap();
    equinoctial.to_horizontal(Some(&observer())).unwrap();
    assert_eq!(equinoctial, before);

    let ecliptic = EclipticFrame::from_lon_lat(250.0, -1.0, Epoch::J2000).unwrap();
    let before = ecliptic.clone();
    ecliptic
        .snapshot(&EclipticRetarget::default().with_epoch(later).with_center(EclipticCenter::Heliocentric))
        .unwrap();
    ecliptic.to_hour_angle(Some(&observer())).unwrap();
    assert_eq!(ecliptic, before);

    let galactic = GalacticFrame::from_lon_lat(250.0, -1.0, Epoch::J2000).unwrap();
    let before = galactic.clone();
    galactic.snapshot(&GalacticRetarget::default().with_epoch(later)).unwrap();
    galactic.to_equinoctial().unwrap();
    assert_eq!(galactic, before);

    let horizontal = HorizontalFrame::new(
        HorizontalOptions::default()
            .with_azimuth_altitude(10.0, 40.0)
            .with_observing(observer())
            .with_ar(true),
    )
    .unwrap();
    let before = horizontal.clone();
    let moved = horizontal
        .snapshot(&ObservingRetarget::default().with_time(later).with_geo_latitude(-33.9))
        .unwrap();
    assert_eq!(moved.observing().geo_latitude(), -33.9);
    horizontal.to_hour_angle(None).unwrap();
    horizontal.to_galactic().unwrap();
    assert_eq!(horizontal, before);

    let hour_angle = horizontal.to_hour_angle(None).unwrap();
    let before = hour_angle.clone();
    hour_angle.snapshot(&ObservingRetarget::default().with_elevation(0.0)).unwrap();
    hour_angle.to_horizontal(None).unwrap();
    assert_eq!(hour_angle, before);
}

#[test]
fn test_failed_retarget_leaves_frame_untouched() {
    let mut horizontal = HorizontalFrame::new(
        HorizontalOptions::default()
            .with_azimuth_altitude(10.0, 40.0)
            .with_observing(observer()),
    )
    .unwrap();
    let before = horizontal.clone();
    let err = horizontal
        .retarget(&ObservingRetarget::default().with_geo_latitude(95.0))
        .unwrap_err();
    assert!(matches!(err, FrameError::RangeValidation { field: "geo_latitude", .. }));
    assert_eq!(horizontal, before);
}

#[rstest]
#[case(0.0, 0.0, 1.0, true)]
#[case(359.999, 90.0, 1.0, true)]
#[case(0.0, -90.0, 1e-7, true)]
#[case(360.0, 0.0, 1.0, false)]
#[case(-0.001, 0.0, 1.0, false)]
#[case(10.0, 90.001, 1.0, false)]
#[case(10.0, -90.001, 1.0, false)]
#[case(10.0, 10.0, 9e-8, false)]
fn test_construction_ranges(#[case] lon: f64, #[case] lat: f64, #[case] radius: f64, #[case] valid: bool) {
    let results = [
        EquinoctialFrame::new(EquinoctialOptions::default().with_ra_dec(lon, lat).with_radius(radius)).map(|_| ()),
        EclipticFrame::new(EclipticOptions::default().with_lon_lat(lon, lat).with_radius(radius)).map(|_| ()),
        HourAngleFrame::new(
            HourAngleOptions::default()
                .with_hour_angle_dec(lon, lat)
                .with_radius(radius)
                .with_observing(observer()),
        )
        .map(|_| ()),
        HorizontalFrame::new(
            HorizontalOptions::default()
                .with_azimuth_altitude(lon, lat)
                .with_radius(radius)
                .with_observing(observer()),
        )
        .map(|_| ()),
    ];
    for result in results {
        match result {
            Ok(()) => assert!(valid),
            Err(err) => {
                assert!(!valid);
                assert!(matches!(err, FrameError::RangeValidation { .. }), "{err}");
            }
        }
    }
}

#[test]
fn test_non_finite_input_is_a_type_error() {
    let err = EquinoctialFrame::from_ra_dec(f64::NAN, 0.0, Epoch::J2000).unwrap_err();
    assert!(matches!(err, FrameError::TypeValidation { .. }));
    let err = GalacticFrame::new(GalacticOptions::default().with_lon_lat(0.0, f64::INFINITY)).unwrap_err();
    assert!(matches!(err, FrameError::TypeValidation { .. }));
}

#[test]
fn test_galactic_bounds_are_configurable() {
    let wide = GalacticFrame::new(GalacticOptions::default().with_lon_lat(-30.0, 100.0)).unwrap();
    assert_relative_eq!(wide.lat(), 80.0, epsilon = 1e-12);
    assert_relative_eq!(wide.lon(), 150.0, epsilon = 1e-12);

    let strict = GalacticFrame::new(
        GalacticOptions::default()
            .with_lon_lat(-30.0, 10.0)
            .with_bounds(starframes::BoundsPolicy::Strict),
    );
    assert!(matches!(strict, Err(FrameError::RangeValidation { field: "lon", .. })));
}

/// A star whose declination equals the site latitude culminates in the zenith
fn zenith_pass(continuous: bool) -> (Vec<f64>, Vec<f64>) {
    let site = observer();
    let hour_angle = HourAngleFrame::new(
        HourAngleOptions::default()
            .with_hour_angle_dec(359.5, site.geo_latitude())
            .with_observing(site),
    )
    .unwrap();
    let mut frame = hour_angle.to_horizontal(None).unwrap();
    frame.common_mut().set_continuous(continuous);

    let mut azimuths = vec![frame.azimuth()];
    let mut altitudes = vec![frame.altitude()];
    for step in 1..=12 {
        let time = site.time().add_days(f64::from(step) * 20.0 / 86400.0).unwrap();
        frame.retarget(&ObservingRetarget::default().with_time(time)).unwrap();
        azimuths.push(frame.azimuth());
        altitudes.push(frame.altitude());
    }
    (azimuths, altitudes)
}

fn largest_step(values: &[f64]) -> f64 {
    values
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).abs())
        .fold(0.0, f64::max)
}

#[test]
fn test_continuous_tracking_through_the_zenith() {
    let (azimuths, altitudes) = zenith_pass(true);
    assert!(largest_step(&azimuths) < 1.0, "{azimuths:?}");
    // Past the zenith the tracked altitude keeps climbing instead of folding back
    assert!(altitudes.iter().cloned().fold(f64::MIN, f64::max) > 90.0);
    assert!(largest_step(&altitudes) < 0.1);
}

#[test]
fn test_discontinuous_reads_stay_canonical() {
    let (azimuths, altitudes) = zenith_pass(false);
    assert!(largest_step(&azimuths) > 170.0, "{azimuths:?}");
    for (azimuth, altitude) in azimuths.iter().zip(&altitudes) {
        assert!((0.0..360.0).contains(azimuth));
        assert!((-90.0..=90.0).contains(altitude));
    }
}
