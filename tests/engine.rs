//! End-to-end scenarios over the full engine.

mod common;

use common::{color_at, flat_screen_face, pulsatile_roi, reddish_face, textured_face};
use prism_liveness::{
    BgrFrame, LivenessConfig, LivenessEngine, LivenessResult, RppgMethod, ScreenColor,
};

/// Gate thresholds opened up for solid-color synthetic ROIs, as the
/// offline sanity harness runs them.
fn permissive_config() -> LivenessConfig {
    LivenessConfig {
        fps: 30,
        max_motion_score: 9999.0,
        min_blur_var_laplacian: 0.0,
        max_exposure_clip_pct: 1.0,
        min_roi_size: 10,
        temporal_xcorr_min_corr: 0.1,
        min_signal_quality: 0.1,
        ..Default::default()
    }
}

fn live_subject_config() -> LivenessConfig {
    LivenessConfig {
        buffer_size: 240,
        rppg_method: RppgMethod::Pos,
        rppg_min_window_seconds: 8.0,
        ..permissive_config()
    }
}

/// Drives one live-subject frame: pulsatile ROI under the current
/// stimulus, textured face responding five frames late.
fn live_frame(engine: &mut LivenessEngine, i: usize, bpm: f64, hold: usize) -> LivenessResult {
    let stim = color_at(i, hold);
    let delayed = color_at(i.saturating_sub(5), hold);
    let roi = pulsatile_roi(i, 30.0, bpm, stim, 4.0);
    let face = textured_face(delayed);
    engine.process_frame(&roi, &face, stim, Some(i as f64 * 1000.0 / 30.0))
}

#[test]
fn warmup_frames_report_zero_bpm() {
    let config = permissive_config();
    config.validate().unwrap();
    let mut engine = LivenessEngine::new(config);
    for i in 0..89 {
        let r = live_frame(&mut engine, i, 84.0, 60);
        assert_eq!(r.bpm, 0, "frame {i}");
        assert_eq!(r.signal_quality, 0.0, "frame {i}");
    }
    // The 90th admitted frame fills the buffer and produces an estimate.
    let r = live_frame(&mut engine, 89, 84.0, 60);
    assert!(r.bpm > 0);
    assert!(r.signal_quality > 0.0);
    assert_eq!(engine.green_buffer_len(), engine.buffer_size());
}

#[test]
fn confidence_and_bpm_stay_in_bounds() {
    let config = permissive_config();
    let mut engine = LivenessEngine::new(config.clone());
    for i in 0..200 {
        // Alternate hostile and benign inputs.
        let r = match i % 4 {
            0 => live_frame(&mut engine, i, 84.0, 60),
            1 => engine.process_frame(
                &BgrFrame::empty(),
                &BgrFrame::empty(),
                ScreenColor::White,
                Some(i as f64 * 33.4),
            ),
            2 => engine.process_frame(
                &BgrFrame::solid(32, 32, 128, 128, 128),
                &flat_screen_face(),
                ScreenColor::Red,
                Some(i as f64 * 33.4),
            ),
            _ => live_frame(&mut engine, i, 84.0, 60),
        };
        assert!((0.0..=100.0).contains(&r.confidence), "frame {i}");
        assert!(
            r.bpm == 0 || (r.bpm as f64 >= config.min_bpm && r.bpm as f64 <= config.max_bpm),
            "frame {i}: bpm {}",
            r.bpm
        );
    }
}

#[test]
fn static_gray_photo_is_forced_false() {
    let mut engine = LivenessEngine::new(permissive_config());
    let roi = BgrFrame::solid(40, 30, 128, 128, 128);
    let face = BgrFrame::solid(64, 64, 128, 128, 128);
    let mut last = None;
    for i in 0..120 {
        let stim = color_at(i, 60);
        let r = engine.process_frame(&roi, &face, stim, Some(i as f64 * 1000.0 / 30.0));
        if i >= 60 {
            assert!(!r.is_human, "frame {i}");
            assert_eq!(
                r.details["forced_false_reason"].as_str(),
                Some("static_image_low_variance"),
                "frame {i}"
            );
        }
        last = Some(r);
    }
    let last = last.unwrap();
    assert!(last.details["signal_variance"].as_f64().unwrap() < 0.4);
    assert_eq!(last.details["is_static_image"].as_bool(), Some(true));
    assert_eq!(last.bpm, 0);
}

#[test]
fn live_subject_reads_as_human() {
    let config = live_subject_config();
    config.validate().unwrap();
    let mut engine = LivenessEngine::new(config);

    let mut final_result = None;
    for i in 0..300 {
        let r = live_frame(&mut engine, i, 84.0, 60);
        if i == 230 {
            // Buffer (240) not yet full: still warming up.
            assert_eq!(r.bpm, 0, "premature estimate at frame {i}");
        }
        final_result = Some(r);
    }
    let r = final_result.unwrap();

    let bpm = r.bpm as f64;
    assert!((bpm - 84.0).abs() <= 6.0, "bpm {bpm}");
    assert!(r.signal_quality >= 0.1, "quality {}", r.signal_quality);
    assert_eq!(r.details["temporal_xcorr_passed"].as_bool(), Some(true));
    assert!(r.confidence >= 40.0, "confidence {}", r.confidence);
    assert!(r.is_human);
    assert_eq!(r.details["quality_gate"].as_bool(), Some(true));
    assert_eq!(r.details["is_static_image"].as_bool(), Some(false));
    assert_eq!(r.details["screen_texture_detected"].as_bool(), Some(false));
    assert_eq!(r.details["screen_flicker_detected"].as_bool(), Some(false));
}

#[test]
fn red_reflecting_photo_fails_on_static_signal() {
    let mut engine = LivenessEngine::new(permissive_config());
    let face = reddish_face(ScreenColor::Red);
    let mut last = None;
    for i in 0..90 {
        // A photo: identical pixels every frame, red screen throughout.
        let r = engine.process_frame(&face, &face, ScreenColor::Red, Some(i as f64 * 33.4));
        last = Some(r);
    }
    let r = last.unwrap();
    assert_eq!(r.details["chroma_passed"].as_bool(), Some(true));
    assert_eq!(r.details["is_static_image"].as_bool(), Some(true));
    assert!(!r.is_human);
    assert_eq!(
        r.details["forced_false_reason"].as_str(),
        Some("static_image_low_variance")
    );
}

#[test]
fn screen_replay_trips_the_texture_gate() {
    let mut engine = LivenessEngine::new(permissive_config());
    let face = flat_screen_face();
    let mut saw_early_detection = false;
    for i in 0..40 {
        let stim = color_at(i, 60);
        let roi = pulsatile_roi(i, 30.0, 84.0, stim, 4.0);
        let r = engine.process_frame(&roi, &face, stim, Some(i as f64 * 1000.0 / 30.0));
        assert!(!r.is_human, "frame {i}");
        if i < 30 {
            saw_early_detection |=
                r.details["screen_texture_detected"].as_bool() == Some(true);
        } else {
            assert_eq!(
                r.details["forced_false_reason"].as_str(),
                Some("screen_texture_detected"),
                "frame {i}"
            );
        }
    }
    assert!(saw_early_detection);
}

#[test]
fn empty_inputs_degrade_without_crashing() {
    let mut engine = LivenessEngine::new(LivenessConfig::default());
    for i in 0..200 {
        let r = engine.process_frame(
            &BgrFrame::empty(),
            &BgrFrame::empty(),
            ScreenColor::White,
            Some(i as f64 * 33.4),
        );
        assert!(!r.is_human, "frame {i}");
        assert_eq!(r.confidence, 0.0, "frame {i}");
        assert_eq!(r.bpm, 0);
        assert_eq!(r.details["quality_gate_reason"].as_str(), Some("roi_missing"));
        assert_eq!(r.details["sss_ratio"].as_f64(), Some(0.0));
        assert_eq!(r.details["moire_detected"].as_bool(), Some(false));
        assert_eq!(r.details["chroma_passed"].as_bool(), Some(false));
    }
}

#[test]
fn reset_returns_the_engine_to_warmup() {
    let mut engine = LivenessEngine::new(permissive_config());
    let mut last = None;
    for i in 0..150 {
        last = Some(live_frame(&mut engine, i, 84.0, 60));
    }
    assert!(last.unwrap().is_human, "live subject should read human");

    engine.reset();
    assert_eq!(engine.green_buffer_len(), 0);

    let r = live_frame(&mut engine, 150, 84.0, 60);
    assert_eq!(r.bpm, 0);
    assert_eq!(r.signal_quality, 0.0);
    assert!(!r.is_human);
}

#[test]
fn reset_is_observationally_a_fresh_engine() {
    let mut warmed = LivenessEngine::new(permissive_config());
    for i in 0..100 {
        live_frame(&mut warmed, i, 84.0, 60);
    }
    warmed.reset();

    let mut fresh = LivenessEngine::new(permissive_config());
    for i in 0..5 {
        let a = live_frame(&mut warmed, i, 84.0, 60);
        let b = live_frame(&mut fresh, i, 84.0, 60);
        assert_eq!(a.is_human, b.is_human, "frame {i}");
        assert_eq!(a.confidence, b.confidence, "frame {i}");
        assert_eq!(a.bpm, b.bpm, "frame {i}");
        assert_eq!(a.details, b.details, "frame {i}");
    }
}
