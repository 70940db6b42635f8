use approx::assert_relative_eq;
use fingertip::{
    depth::{DepthFrame, HandPoint, Joint},
    detector::{detect_hand, HandDetector},
    resolution::Resolution,
    synthetic::{self, DemoScene},
    tracking::{FrameProcessor, Handedness, Skeleton, UserId},
    Error, HandParams,
};
use nalgebra::Point2;
use rayon::prelude::*;

const CENTER: HandPoint = HandPoint::new(320.0, 240.0, 0.5);

fn disk_frame() -> DepthFrame {
    let mut frame = DepthFrame::new(Resolution::RES_VGA);
    synthetic::fill_disk(&mut frame, Point2::new(320.0, 240.0), 60.0, 500);
    frame
}

fn star_frame() -> (DepthFrame, Vec<Point2<f32>>) {
    let mut frame = DepthFrame::new(Resolution::RES_VGA);
    let tips = synthetic::fill_star(
        &mut frame,
        Point2::new(320.0, 240.0),
        100.0,
        40.0,
        5,
        0.0,
        500,
    );
    (frame, tips)
}

#[test]
fn closed_hand() {
    let obs = detect_hand(&disk_frame(), CENTER, &HandParams::default()).unwrap();
    assert!(obs.contour().len() >= 4);
    assert!(obs.convexity() > 0.95, "{}", obs.convexity());
    assert!(obs.convexity() <= 1.0);
    assert!(obs.is_grasp());
}

#[test]
fn open_hand() {
    let (frame, star_tips) = star_frame();
    let obs = detect_hand(&frame, CENTER, &HandParams::default()).unwrap();

    // Star polygon area over the area of the pentagon spanned by its tips.
    let expected = (40.0 * 36f64.to_radians().sin()) / (50.0 * 72f64.to_radians().sin());
    assert_relative_eq!(obs.convexity(), expected, epsilon = 0.05);
    assert!(!obs.is_grasp());

    let tips = obs.fingertips();
    assert!(!tips.is_empty() && tips.len() <= 5, "{:?}", tips);
    for tip in tips {
        assert!((tip.y as f32) < obs.cutoff());
        let nearest = star_tips
            .iter()
            .map(|t| (*t - tip.cast::<f32>()).norm())
            .fold(f32::INFINITY, f32::min);
        assert!(nearest < 5.0, "{tip:?} is not a star tip");
    }

    // The top tip is always found, the bottom ones are below the cutoff.
    assert!(tips.iter().any(|t| (t.x - 320).abs() <= 2 && (t.y - 140).abs() <= 2));
    assert!(tips.iter().all(|t| t.y < 300));
}

#[test]
fn hand_outside_frame() {
    let (frame, _) = star_frame();
    let hand = HandPoint::new(5000.0, 5000.0, 0.5);
    assert_eq!(
        detect_hand(&frame, hand, &HandParams::default()),
        Err(Error::NotFound)
    );
}

#[test]
fn empty_frame() {
    let frame = DepthFrame::new(Resolution::RES_VGA);
    assert_eq!(
        detect_hand(&frame, CENTER, &HandParams::default()),
        Err(Error::NotFound)
    );
}

#[test]
fn idempotent() {
    let (star, _) = star_frame();
    let disk = disk_frame();
    let mut detector = HandDetector::new(HandParams::default());

    let a = detector.detect(&star, CENTER).unwrap();
    let _ = detector.detect(&disk, CENTER).unwrap();
    let b = detector.detect(&star, CENTER).unwrap();
    assert_eq!(a, b);
    assert_eq!(a, detect_hand(&star, CENTER, &HandParams::default()).unwrap());
}

#[test]
fn parallel_workers() {
    let (star, _) = star_frame();
    let disk = disk_frame();
    let expected = [
        detect_hand(&star, CENTER, &HandParams::default()).unwrap(),
        detect_hand(&disk, CENTER, &HandParams::default()).unwrap(),
    ];

    let results = (0..32usize)
        .into_par_iter()
        .map_init(
            || HandDetector::new(HandParams::default()),
            |detector, i| {
                let frame = if i % 2 == 0 { &star } else { &disk };
                (i, detector.detect(frame, CENTER).unwrap())
            },
        )
        .collect::<Vec<_>>();

    for (i, obs) in results {
        assert_eq!(obs, expected[i % 2]);
    }
}

#[test]
fn tuned_params() {
    let (frame, _) = star_frame();

    // A region too small to contain the star's tips sees a near-convex blob.
    let params = HandParams::default().max_hand_radius(35);
    let obs = detect_hand(&frame, CENTER, &params).unwrap();
    assert!(obs.is_grasp());

    // Nothing is sharp enough with a tiny angle threshold.
    let params = HandParams::default().fingertip_max_angle(0.1);
    let obs = detect_hand(&frame, CENTER, &params).unwrap();
    assert!(obs.fingertips().is_empty());
}

#[test]
fn demo_scene() {
    let scene = DemoScene::new();
    let mut processor = FrameProcessor::new(HandParams::default());

    for (t, open) in [(0, Handedness::Right), (DemoScene::SWAP_INTERVAL, Handedness::Left)] {
        let (frame, skeleton) = scene.render(t);
        let reports = processor.process(&frame, &[skeleton]);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].handedness, Handedness::Right);
        assert_eq!(reports[1].handedness, Handedness::Left);
        for report in &reports {
            assert_eq!(report.user, UserId(1));
            let is_open = report.handedness == open;
            assert_eq!(report.observation.is_grasp(), !is_open);
            assert_eq!(report.observation.fingertips().is_empty(), !is_open);
        }
    }
}

#[test]
fn resting_hands_are_ignored() {
    let (frame, _) = star_frame();
    let mut processor = FrameProcessor::new(HandParams::default());
    let user = Skeleton {
        user: UserId(7),
        torso: Joint::confident(HandPoint::new(320.0, 200.0, 0.6)),
        left_hand: Joint::confident(CENTER),
        right_hand: Joint::new(CENTER, 0.9),
    };
    // Hands are neither extended nor raised.
    assert!(processor.process(&frame, &[user]).is_empty());

    processor.set_min_hand_extension(0.0);
    processor.set_require_raised_hand(false);
    let reports = processor.process(&frame, &[user]);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].handedness, Handedness::Left);
}
