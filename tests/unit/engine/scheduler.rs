use super::*;

fn default_scheduler(images: usize) -> FrameScheduler {
    FrameScheduler::new(images, Timing::default(), Fps::new(30, 1).unwrap()).unwrap()
}

#[test]
fn total_frames_derive_from_timing_not_wall_clock() {
    // 3 images * 3500 ms * 30 fps / 1000 = 315 exactly.
    assert_eq!(default_scheduler(3).total_frames(), 315);
    assert_eq!(default_scheduler(1).total_frames(), 105);
    assert_eq!(default_scheduler(10).total_frames(), 1050);
}

#[test]
fn iterator_yields_each_frame_once_in_order() {
    let scheduler = default_scheduler(2);
    let total = scheduler.total_frames();
    let frames: Vec<u64> = scheduler.map(|plan| plan.frame.0).collect();
    assert_eq!(frames.len(), total as usize);
    assert!(frames.windows(2).all(|w| w[1] == w[0] + 1));
    assert_eq!(frames.first(), Some(&0));
    assert_eq!(frames.last(), Some(&(total - 1)));
}

#[test]
fn display_window_plans_have_no_transition_progress() {
    let scheduler = default_scheduler(3);
    // 33.33 ms per frame: frames 0..90 sit inside the 3000 ms display window.
    for frame in [0, 1, 45, 89] {
        let plan = scheduler.plan_at(frame);
        assert_eq!(plan.image_a, 0);
        assert_eq!(plan.image_b, 1);
        assert_eq!(plan.progress, None);
    }
}

#[test]
fn transition_window_progress_is_linear_in_frame_time() {
    let scheduler = default_scheduler(3);

    // Frame 90 lands on the display/transition boundary (modulo float noise).
    let plan = scheduler.plan_at(90);
    assert!(plan.progress.unwrap() < 1e-9);

    // Half a second later (frame 104) the transition is nearly done.
    let plan = scheduler.plan_at(104);
    let progress = plan.progress.unwrap();
    assert!((progress - 14.0 / 15.0).abs() < 1e-9);
    assert!(progress < 1.0);

    // Frame 105 opens the next cycle.
    let plan = scheduler.plan_at(105);
    assert_eq!(plan.image_a, 1);
    assert_eq!(plan.image_b, 2);
    assert_eq!(plan.progress, None);
}

#[test]
fn final_transition_wraps_to_the_first_image() {
    let scheduler = default_scheduler(3);
    let plan = scheduler.plan_at(314);
    assert_eq!(plan.image_a, 2);
    assert_eq!(plan.image_b, 0);
    assert!(plan.progress.is_some());
}

#[test]
fn single_image_transitions_to_itself() {
    let scheduler = default_scheduler(1);
    let plan = scheduler.plan_at(100);
    assert_eq!(plan.image_a, 0);
    assert_eq!(plan.image_b, 0);
}

#[test]
fn invalid_inputs_are_rejected() {
    let fps = Fps::new(30, 1).unwrap();
    assert!(FrameScheduler::new(0, Timing::default(), fps).is_err());
    assert!(
        FrameScheduler::new(
            1,
            Timing {
                display_ms: 0,
                transition_ms: 500
            },
            fps
        )
        .is_err()
    );
}

#[test]
fn is_complete_tracks_the_iterator() {
    let mut scheduler = default_scheduler(1);
    assert!(!scheduler.is_complete());
    while scheduler.next().is_some() {}
    assert!(scheduler.is_complete());
    assert_eq!(scheduler.current_frame(), scheduler.total_frames());
}
