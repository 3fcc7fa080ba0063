//! Integration tests for the orchestrator.
//!
//! These tests verify end-to-end run behavior including:
//! - Concurrent execution of both strategies
//! - Failure attribution and the no-partial-outcome rule
//! - Missing and corrupt inputs
//! - The built-in recognizer on a real file

use plate_duo::core::encoder::{LineEncoder, ResultEncoder};
use plate_duo::core::orchestrator::{LaunchOrder, Orchestrator, Strategy};
use plate_duo::core::recognizer::{
    OriginalImage, PlateColor, PlateRecognizer, PreparedImage, PreparedInputs, RawImage,
    RegionImage, TaskResult,
};
use plate_duo::error::{PlateError, RecognizerError, TaskError};
use image::{GrayImage, Rgb, RgbImage};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

const PLATE: [&str; 7] = ["京", "A", "1", "2", "3", "4", "5"];

/// Engine stub that sleeps a fixed time per strategy and counts calls
struct DelayedRecognizer {
    shape_delay: Duration,
    color_delay: Duration,
    color_fails: bool,
    calls: AtomicUsize,
}

impl DelayedRecognizer {
    fn new(shape_ms: u64, color_ms: u64) -> Self {
        Self {
            shape_delay: Duration::from_millis(shape_ms),
            color_delay: Duration::from_millis(color_ms),
            color_fails: false,
            calls: AtomicUsize::new(0),
        }
    }

    fn plate() -> TaskResult {
        let label: Vec<char> = PLATE.iter().flat_map(|s| s.chars()).collect();
        let region = RegionImage::new(RgbImage::new(20, 5));
        (label, Some(region), PlateColor::Blue).into()
    }
}

impl PlateRecognizer for DelayedRecognizer {
    fn preprocess(&self, image: &RawImage) -> Result<PreparedInputs, RecognizerError> {
        Ok(PreparedInputs {
            prepared: PreparedImage::new(image.to_luma8()),
            original: OriginalImage::new(image.to_rgb8()),
        })
    }

    fn recognize_by_shape(
        &self,
        _prepared: &PreparedImage,
        _original: &OriginalImage,
    ) -> Result<TaskResult, RecognizerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.shape_delay);
        Ok(Self::plate())
    }

    fn recognize_by_color(
        &self,
        _original: &OriginalImage,
        _prepared: &PreparedImage,
    ) -> Result<TaskResult, RecognizerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.color_delay);
        if self.color_fails {
            return Err(RecognizerError::Recognition("color model crashed".to_string()));
        }
        Ok(Self::plate())
    }
}

fn write_png(dir: &TempDir, name: &str, image: &RgbImage) -> PathBuf {
    let path = dir.path().join(name);
    image.save(&path).unwrap();
    path
}

fn blank_png(dir: &TempDir) -> PathBuf {
    write_png(dir, "blank.png", &RgbImage::from_pixel(16, 16, Rgb([128, 128, 128])))
}

#[test]
fn dual_strategy_scenario_overlaps_and_encodes() {
    let dir = TempDir::new().unwrap();
    let path = blank_png(&dir);
    let stub = Arc::new(DelayedRecognizer::new(100, 150));

    let outcome = Orchestrator::builder()
        .recognizer(stub.clone())
        .build()
        .run(&path)
        .unwrap();

    assert!(outcome.elapsed() >= Duration::from_millis(150));
    assert!(
        outcome.elapsed() < Duration::from_millis(240),
        "elapsed {:?} suggests sequential execution",
        outcome.elapsed()
    );
    assert_eq!(
        LineEncoder::new().encode(&outcome),
        "京A12345|||京A12345"
    );
    assert_eq!(outcome.shape().color(), PlateColor::Blue);
    assert!(outcome.color().region().is_some());
    assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn launch_order_does_not_change_field_assignment() {
    let dir = TempDir::new().unwrap();
    let path = blank_png(&dir);

    let run = |order| {
        Orchestrator::builder()
            .recognizer(Arc::new(DelayedRecognizer::new(60, 10)))
            .launch_order(order)
            .build()
            .run(&path)
            .unwrap()
    };

    let shape_first = run(LaunchOrder::ShapeFirst);
    let color_first = run(LaunchOrder::ColorFirst);

    assert_eq!(shape_first.shape(), color_first.shape());
    assert_eq!(shape_first.color(), color_first.color());
    assert!(shape_first.timings().shape > shape_first.timings().color);
}

#[test]
fn color_failure_is_not_a_partial_success() {
    let dir = TempDir::new().unwrap();
    let path = blank_png(&dir);
    let mut stub = DelayedRecognizer::new(0, 0);
    stub.color_fails = true;

    let error = Orchestrator::builder()
        .recognizer(Arc::new(stub))
        .build()
        .run(&path)
        .unwrap_err();

    match error {
        PlateError::Strategy {
            strategy: Strategy::Color,
            cause: TaskError::Failed(RecognizerError::Recognition(reason)),
        } => assert!(reason.contains("crashed")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_file_fails_before_any_strategy() {
    let stub = Arc::new(DelayedRecognizer::new(0, 0));

    let error = Orchestrator::builder()
        .recognizer(stub.clone())
        .build()
        .run(Path::new("/no/such/file.jpg"))
        .unwrap_err();

    assert!(matches!(error, PlateError::InputNotFound { .. }));
    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn directory_is_not_an_input() {
    let dir = TempDir::new().unwrap();
    let error = Orchestrator::builder().build().run(dir.path()).unwrap_err();
    assert!(matches!(error, PlateError::InputNotFound { .. }));
}

#[test]
fn corrupt_file_is_a_decode_failure() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("corrupt.jpg");
    std::fs::write(&path, b"this is not a valid image file").unwrap();
    let stub = Arc::new(DelayedRecognizer::new(0, 0));

    let error = Orchestrator::builder()
        .recognizer(stub.clone())
        .build()
        .run(&path)
        .unwrap_err();

    assert!(matches!(error, PlateError::Decode { .. }));
    assert_eq!(error.stage(), "decode");
    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn timeout_bounds_a_hung_strategy() {
    let dir = TempDir::new().unwrap();
    let path = blank_png(&dir);

    let error = Orchestrator::builder()
        .recognizer(Arc::new(DelayedRecognizer::new(800, 0)))
        .timeout(Some(Duration::from_millis(100)))
        .build()
        .run(&path)
        .unwrap_err();

    assert!(matches!(
        error,
        PlateError::StrategyTimeout {
            strategy: Strategy::Shape,
            ..
        }
    ));
}

#[test]
fn builtin_recognizer_locates_plate_in_file() {
    let dir = TempDir::new().unwrap();
    let scene = RgbImage::from_fn(400, 300, |x, y| {
        if (100..300).contains(&x) && (120..170).contains(&y) {
            Rgb([10, 60, 200])
        } else {
            Rgb([128, 128, 128])
        }
    });
    let path = write_png(&dir, "car.png", &scene);

    let outcome = Orchestrator::builder().build().run(&path).unwrap();

    let region = outcome.color().region().expect("color region");
    assert_eq!((region.width(), region.height()), (200, 50));
    assert_eq!(outcome.color().color(), PlateColor::Blue);
    // No character model: nothing is read, which is not an error
    assert_eq!(LineEncoder::new().encode(&outcome), "未识别|||未识别");
}

#[test]
fn builtin_recognizer_on_blank_image_returns_empty_results() {
    let dir = TempDir::new().unwrap();
    let path = blank_png(&dir);

    let outcome = Orchestrator::builder().build().run(&path).unwrap();

    assert_eq!(outcome.shape(), &TaskResult::empty());
    assert_eq!(outcome.color(), &TaskResult::empty());
}

#[test]
fn prepared_inputs_are_shared_not_copied() {
    struct PointerCheck {
        seen: std::sync::Mutex<Vec<usize>>,
    }

    impl PlateRecognizer for PointerCheck {
        fn preprocess(&self, _image: &RawImage) -> Result<PreparedInputs, RecognizerError> {
            Ok(PreparedInputs {
                prepared: PreparedImage::new(GrayImage::new(8, 8)),
                original: OriginalImage::new(RgbImage::new(8, 8)),
            })
        }

        fn recognize_by_shape(
            &self,
            prepared: &PreparedImage,
            _original: &OriginalImage,
        ) -> Result<TaskResult, RecognizerError> {
            self.seen
                .lock()
                .unwrap()
                .push(prepared.pixels() as *const GrayImage as usize);
            Ok(TaskResult::empty())
        }

        fn recognize_by_color(
            &self,
            _original: &OriginalImage,
            prepared: &PreparedImage,
        ) -> Result<TaskResult, RecognizerError> {
            self.seen
                .lock()
                .unwrap()
                .push(prepared.pixels() as *const GrayImage as usize);
            Ok(TaskResult::empty())
        }
    }

    let dir = TempDir::new().unwrap();
    let path = blank_png(&dir);
    let check = Arc::new(PointerCheck {
        seen: std::sync::Mutex::new(Vec::new()),
    });

    Orchestrator::builder()
        .recognizer(check.clone())
        .build()
        .run(&path)
        .unwrap();

    let seen = check.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], seen[1]);
}
