use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use wheel_gallery::config::WheelOptions;
use wheel_gallery::events::{GalleryCommand, WheelGesture};
use wheel_gallery::tasks::wheel;
use wheel_gallery::wheel::Point;

async fn next_percentage(rx: &mut mpsc::Receiver<GalleryCommand>) -> f64 {
    match tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timeout waiting for wheel output")
        .expect("wheel channel closed")
    {
        GalleryCommand::PercentageChanged(p) => p.value(),
        other => panic!("unexpected command {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn drags_map_to_percentages_around_the_ring() {
    let (gesture_tx, gesture_rx) = mpsc::channel(8);
    let (to_gallery, mut from_wheel) = mpsc::channel(8);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(wheel::run(
        gesture_rx,
        to_gallery,
        WheelOptions::default(),
        Some(9),
        cancel.clone(),
    ));

    // Center of the default 240pt wheel is (120, 120).
    for (pointer, expected) in [
        (Point::new(120.0, 0.0), 0.0),
        (Point::new(240.0, 120.0), 0.25),
        (Point::new(120.0, 240.0), 0.5),
        (Point::new(0.0, 120.0), 0.75),
    ] {
        gesture_tx.send(WheelGesture::Drag(pointer)).await.unwrap();
        let p = next_percentage(&mut from_wheel).await;
        assert!((p - expected).abs() < 1e-9, "{pointer:?} -> {p}");
    }

    cancel.cancel();
    handle.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn taps_advance_from_the_running_angle() {
    let (gesture_tx, gesture_rx) = mpsc::channel(8);
    let (to_gallery, mut from_wheel) = mpsc::channel(8);
    let handle = tokio::spawn(wheel::run(
        gesture_rx,
        to_gallery,
        WheelOptions::default(),
        Some(4),
        CancellationToken::new(),
    ));

    // Starts at the top (0%); each tap moves 15..=180 degrees forward.
    let mut previous = 0.0;
    for _ in 0..20 {
        gesture_tx.send(WheelGesture::Tap).await.unwrap();
        let p = next_percentage(&mut from_wheel).await;
        let moved = (p - previous).rem_euclid(1.0) * 360.0;
        assert!((15.0 - 1e-6..=180.0 + 1e-6).contains(&moved), "moved {moved}");
        previous = p;
    }

    // Closing the gesture channel ends the task.
    drop(gesture_tx);
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("wheel exits when input closes")
        .unwrap()
        .unwrap();
}
