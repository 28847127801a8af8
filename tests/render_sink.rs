use keystable::render::MARKER_RADIUS;
use keystable::{DetectConfig, Detector, Keypoint, KeystableResult, PixelBuffer, RenderSink};

#[derive(Default)]
struct RecordingSink {
    frames: Vec<(usize, usize, Vec<(usize, usize)>)>,
}

impl RenderSink for RecordingSink {
    fn render(&mut self, image: &PixelBuffer, keypoints: &[Keypoint]) -> KeystableResult<()> {
        let marks = keypoints.iter().map(|k| (k.x, k.y)).collect();
        self.frames.push((image.width(), image.height(), marks));
        Ok(())
    }
}

#[test]
fn sink_receives_source_image_and_stable_locations() {
    let image = PixelBuffer::from_fn(15, 15, |x, y| {
        if x >= 7 && y >= 7 {
            [255, 0, 0, 255]
        } else {
            [0, 255, 0, 255]
        }
    })
    .unwrap();
    let detector = Detector::new(DetectConfig {
        gradient_threshold: 1050.0,
        size: 3,
        sigma: 0.2,
        parallel: false,
    });
    let stable = detector.detect_stable(&image).unwrap();

    let mut sink = RecordingSink::default();
    sink.render(&image, &stable).unwrap();
    assert_eq!(sink.frames, vec![(15, 15, vec![(7, 7)])]);
    assert_eq!(MARKER_RADIUS, 5);
}

#[cfg(feature = "image-io")]
#[test]
fn overlay_sink_writes_circles() {
    use keystable::io::{draw_keypoints, load_rgba_image, OverlayFileSink};

    let image = PixelBuffer::uniform(32, 32, [0, 0, 0, 255]).unwrap();
    let kp = Keypoint {
        x: 16,
        y: 16,
        descriptor_mean: 0.0,
        gradient_magnitude: 0.0,
        gradient_orientation: 0.0,
    };
    let canvas = draw_keypoints(&image, &[kp]).unwrap();
    assert_eq!(canvas.get_pixel(16 + MARKER_RADIUS as u32, 16).0, [255, 0, 0, 255]);
    assert_eq!(canvas.get_pixel(16, 16).0, [0, 0, 0, 255]);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("overlay.png");
    OverlayFileSink::new(&path).render(&image, &[kp]).unwrap();
    let reloaded = load_rgba_image(&path).unwrap();
    assert_eq!(reloaded.pixel(16, 16 + MARKER_RADIUS as usize), Some([255, 0, 0, 255]));
}
