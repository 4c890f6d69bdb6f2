use super::*;
use crate::foundation::core::Fps;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("barrace-png-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn writes_numbered_straight_alpha_files() {
    let dir = scratch_dir("seq");
    let mut sink = PngSequenceSink::new(&dir);
    sink.begin(SinkConfig {
        width: 1,
        height: 1,
        fps: Fps::default(),
    })
    .unwrap();
    let frame = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![64, 0, 0, 128],
        premultiplied: true,
    };
    sink.push_frame(FrameIndex(0), &frame).unwrap();
    sink.push_frame(FrameIndex(7), &frame).unwrap();
    sink.end().unwrap();
    assert_eq!(sink.written(), 2);

    let img = image::open(dir.join("frame_000007.png")).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(0, 0).0, [128, 0, 0, 128]);
    assert!(dir.join("frame_000000.png").exists());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn push_before_begin_fails() {
    let mut sink = PngSequenceSink::new(scratch_dir("unstarted"));
    let frame = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![0; 4],
        premultiplied: false,
    };
    assert!(matches!(
        sink.push_frame(FrameIndex(0), &frame),
        Err(RaceError::Encode(_))
    ));
}
