//! Fingertip detection demo.
//!
//! ```text
//! fingertip [OUTPUT] [FRAMES]
//! fingertip OUTPUT DEPTH.png U V Z
//! ```
//!
//! The first form animates a synthetic scene for `FRAMES` frames (default 90), logging every hand
//! report and the pipeline timings. The second form analyzes the hand at pixel `(U, V)`, `Z`
//! meters away from the sensor, in a recorded 16-bit depth map. Both write the overlay of the last
//! processed frame to `OUTPUT` (default `fingertip.png`).

use std::{env, str::FromStr};

use anyhow::{bail, Context};
use fingertip::{
    depth::{DepthFrame, HandPoint, Joint},
    detector::HandDetector,
    overlay,
    synthetic::DemoScene,
    timer::FpsCounter,
    tracking::{FrameProcessor, HandReport, Handedness},
    HandParams,
};

const DEFAULT_OUTPUT: &str = "fingertip.png";
const DEFAULT_FRAMES: u32 = 90;

fn main() -> anyhow::Result<()> {
    fingertip::init_logger!();

    let params = HandParams::from_env()?;
    let args = env::args().skip(1).collect::<Vec<_>>();
    let output = args.first().map_or(DEFAULT_OUTPUT, |s| s.as_str());

    match &args[..] {
        [] | [_] => run_scene(params, output, DEFAULT_FRAMES),
        [_, frames] => run_scene(params, output, parse_arg(frames, "FRAMES")?),
        [_, path, u, v, z] => {
            let hand = HandPoint::new(
                parse_arg(u, "U")?,
                parse_arg(v, "V")?,
                parse_arg(z, "Z")?,
            );
            run_recording(params, output, path, hand)
        }
        _ => bail!("usage: fingertip [OUTPUT] [FRAMES] | fingertip OUTPUT DEPTH.png U V Z"),
    }
}

fn parse_arg<T>(arg: &str, name: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    arg.parse()
        .with_context(|| format!("invalid {name} argument '{arg}'"))
}

fn run_scene(params: HandParams, output: &str, frames: u32) -> anyhow::Result<()> {
    let scene = DemoScene::new();
    let mut processor = FrameProcessor::new(params);
    let mut fps = FpsCounter::new("fingertip");

    log::info!(
        "processing {frames} frames of a {} synthetic scene",
        scene.resolution()
    );

    let mut last = None;
    for t in 0..frames {
        let (frame, skeleton) = scene.render(t);
        let reports = processor.process(&frame, &[skeleton]);
        if t % DemoScene::SWAP_INTERVAL == 0 {
            log_reports(t, &reports);
        }
        fps.tick_with(processor.detector().timers());
        last = Some((frame, skeleton, reports));
    }

    if let Some((frame, skeleton, reports)) = last {
        overlay::render(&frame, &[skeleton], &reports)
            .save(output)
            .with_context(|| format!("failed to write overlay to '{output}'"))?;
        log::info!("wrote overlay to '{output}'");
    }
    Ok(())
}

fn run_recording(
    params: HandParams,
    output: &str,
    path: &str,
    hand: HandPoint,
) -> anyhow::Result<()> {
    let frame = DepthFrame::load(path)
        .with_context(|| format!("failed to load depth map '{path}'"))?;
    let mut detector = HandDetector::new(params);
    let mut image = frame.to_image(overlay::MAX_VISUALIZED_DEPTH);

    match detector.detect(&frame, hand) {
        Ok(obs) => {
            log::info!(
                "{} fingertips at {:?}, convexity {:.3}, grasp: {}",
                obs.fingertips().len(),
                obs.fingertips().iter().map(|p| (p.x, p.y)).collect::<Vec<_>>(),
                obs.convexity(),
                obs.is_grasp(),
            );
            overlay::draw_observation(&mut image, &obs);
            overlay::draw_hand(
                &mut image,
                Handedness::Right,
                &Joint::confident(hand),
                obs.is_grasp(),
            );
        }
        Err(e) => log::info!("no hand at {hand:?}: {e}"),
    }

    image
        .save(output)
        .with_context(|| format!("failed to write overlay to '{output}'"))?;
    log::info!("wrote overlay to '{output}'");
    Ok(())
}

fn log_reports(t: u32, reports: &[HandReport]) {
    if reports.is_empty() {
        log::info!("frame {t}: no hands");
    }
    for report in reports {
        let obs = &report.observation;
        log::info!(
            "frame {t}: {} {} hand: {} fingertips, convexity {:.3}, {}",
            report.user,
            report.handedness,
            obs.fingertips().len(),
            obs.convexity(),
            if obs.is_grasp() { "closed" } else { "open" },
        );
    }
}
