use super::*;
use std::path::PathBuf;

fn source(fps_num: u32, fps_den: u32) -> VideoSourceInfo {
    VideoSourceInfo {
        source_path: PathBuf::from("clip.mp4"),
        width: 640,
        height: 360,
        fps_num,
        fps_den,
        duration_sec: 10.0,
        has_audio: true,
    }
}

#[test]
fn window_bounds_are_validated_against_the_source() {
    let ok = TrimWindow {
        start_sec: 2.0,
        end_sec: 5.0,
    };
    assert!(ok.validate(10.0).is_ok());
    assert_eq!(ok.duration_sec(), 3.0);

    let inverted = TrimWindow {
        start_sec: 5.0,
        end_sec: 5.0,
    };
    assert!(inverted.validate(10.0).is_err());

    let negative = TrimWindow {
        start_sec: -1.0,
        end_sec: 5.0,
    };
    assert!(negative.validate(10.0).is_err());

    let overlong = TrimWindow {
        start_sec: 0.0,
        end_sec: 10.5,
    };
    assert!(overlong.validate(10.0).is_err());

    let non_finite = TrimWindow {
        start_sec: 0.0,
        end_sec: f64::NAN,
    };
    assert!(non_finite.validate(10.0).is_err());
}

fn pipeline_in(state: TrimState) -> TrimPipeline {
    TrimPipeline {
        state,
        source: source(30, 1),
        slot: VideoSlot::new("clip.mp4", 10.0),
        window: TrimWindow {
            start_sec: 0.0,
            end_sec: 10.0,
        },
    }
}

#[test]
fn dismissal_is_refused_while_running_and_after_finishing() {
    for state in [
        TrimState::Recording,
        TrimState::Finalizing,
        TrimState::Done,
        TrimState::Failed,
    ] {
        let mut trim = pipeline_in(state);
        assert!(trim.cancel().is_err());
        assert_eq!(trim.state(), state, "state must be left untouched");
    }

    let mut trim = pipeline_in(TrimState::RangeSelected);
    trim.cancel().unwrap();
    assert_eq!(trim.state(), TrimState::Idle);
}

#[test]
fn finished_jobs_cannot_be_confirmed_again() {
    for state in [TrimState::Done, TrimState::Failed, TrimState::Idle] {
        let mut trim = pipeline_in(state);
        assert!(trim.confirm(&mut |_| {}).is_err());
        assert_eq!(trim.state(), state);
    }
}

#[test]
fn done_and_failed_are_the_only_terminal_states() {
    assert!(TrimState::Done.is_terminal());
    assert!(TrimState::Failed.is_terminal());
    assert!(!TrimState::Idle.is_terminal());
    assert!(!TrimState::RangeSelected.is_terminal());
    assert!(!TrimState::Recording.is_terminal());
    assert!(!TrimState::Finalizing.is_terminal());
}

#[test]
fn recode_fps_rounds_the_source_rate() {
    assert_eq!(recode_fps(&source(30, 1)), 30);
    assert_eq!(recode_fps(&source(30000, 1001)), 30);
    assert_eq!(recode_fps(&source(24000, 1001)), 24);
    assert_eq!(recode_fps(&source(25, 2)), 13);
}

#[test]
fn recode_fps_falls_back_when_the_probe_is_unusable() {
    assert_eq!(recode_fps(&source(0, 1)), 30);
    assert_eq!(recode_fps(&source(30, 0)), 30);
}
