//! End-to-end batch-driver scenarios: full runs over the mock engine with
//! a recording renderer.

use dataset_gen::{BatchDriver, DriverError, SurfaceFinish};
use mesh_kernel::MockOperator;
use test_harness::assertions::assert_live_solids;
use test_harness::helpers::{self, CountingRenderer};

// ── Scenario 1: Full run delivers every image, labeled ──────────────────

#[test]
fn test_full_run_with_all_defects() {
    let config = helpers::run_config(6, helpers::all_defects(), 20, 4, 11);
    let driver = BatchDriver::new(config.clone()).unwrap();
    let mut ops = MockOperator::new();
    let mut renderer = CountingRenderer::new();
    let mut rng = config.rng();

    let report = driver.run(&mut ops, &mut renderer, &mut rng).unwrap();

    assert_eq!(report.labels.len(), 20);
    assert_eq!(renderer.calls.len(), 20);
    assert_eq!(report.skipped_objects, 0);
    assert_live_solids(&ops, 0, "after full run").unwrap();

    // 5 objects of 4 images each, one id per object.
    let mut ids: Vec<_> = report.labels.iter().map(|l| l.object_id).collect();
    ids.dedup();
    assert_eq!(ids.len(), 5);
}

// ── Scenario 2: Labels match what the renderer was shown ────────────────

#[test]
fn test_labels_align_with_appearance() {
    let config = helpers::run_config(6, helpers::all_defects(), 12, 3, 12);
    let driver = BatchDriver::new(config.clone()).unwrap();
    let mut ops = MockOperator::new();
    let mut renderer = CountingRenderer::new();
    let mut rng = config.rng();

    let report = driver.run(&mut ops, &mut renderer, &mut rng).unwrap();

    for (label, call) in report.labels.iter().zip(&renderer.calls) {
        assert_eq!(label.image, call.image);
        assert_eq!(label.low_gloss, call.appearance.low_gloss);
        assert_eq!(label.discoloration, call.appearance.discoloration);
        assert_eq!(
            label.contamination || label.cloudy || label.splay,
            call.appearance.texture.is_some()
        );
        assert_eq!(call.appearance.finish, SurfaceFinish::Matte);
    }
}

// ── Scenario 3: Shader randomization passes through, finish untouched ───

#[test]
fn test_randomize_keeps_configured_finish() {
    let mut config = helpers::run_config(6, helpers::all_defects(), 8, 2, 21);
    config.object.randomize = true;
    let driver = BatchDriver::new(config.clone()).unwrap();
    let mut ops = MockOperator::new();
    let mut renderer = CountingRenderer::new();
    let mut rng = config.rng();

    driver.run(&mut ops, &mut renderer, &mut rng).unwrap();

    for call in &renderer.calls {
        assert!(call.appearance.randomize);
        assert_eq!(call.appearance.finish, SurfaceFinish::Matte);
    }
}

// ── Scenario 4: Framing varies between images of one object ─────────────

#[test]
fn test_framing_is_randomized_per_image() {
    let config = helpers::run_config(6, helpers::all_geometry_defects(), 6, 6, 13);
    let driver = BatchDriver::new(config.clone()).unwrap();
    let mut ops = MockOperator::new();
    let mut renderer = CountingRenderer::new();
    let mut rng = config.rng();

    driver.run(&mut ops, &mut renderer, &mut rng).unwrap();

    let first = renderer.calls[0].framing;
    let varied = renderer.calls[1..]
        .iter()
        .any(|c| c.framing.min != first.min || c.framing.max != first.max);
    assert!(varied, "independent framing draws per image");
}

// ── Scenario 5: Renderer failure aborts without leaking solids ──────────

#[test]
fn test_renderer_failure_aborts_run() {
    let config = helpers::run_config(6, helpers::all_geometry_defects(), 10, 2, 14);
    let driver = BatchDriver::new(config.clone()).unwrap();
    let mut ops = MockOperator::new();
    let mut renderer = CountingRenderer::failing_at(5);
    let mut rng = config.rng();

    let err = driver.run(&mut ops, &mut renderer, &mut rng).unwrap_err();

    assert!(matches!(err, DriverError::Render(_)));
    assert_eq!(renderer.calls.len(), 5);
    assert_live_solids(&ops, 0, "after aborted run").unwrap();
}

// ── Scenario 6: Seed reproducibility end to end ─────────────────────────

#[test]
fn test_runs_are_reproducible_per_seed() {
    let config = helpers::run_config(6, helpers::all_defects(), 9, 3, 15);
    let driver = BatchDriver::new(config.clone()).unwrap();

    let mut run = || {
        let mut ops = MockOperator::new();
        let mut renderer = CountingRenderer::new();
        let mut rng = config.rng();
        let report = driver.run(&mut ops, &mut renderer, &mut rng).unwrap();
        (report, ops.log().len())
    };
    let (a, a_ops) = run();
    let (b, b_ops) = run();

    assert_eq!(a_ops, b_ops, "identical op sequences");
    let flags = |r: &dataset_gen::BatchReport| {
        r.labels
            .iter()
            .map(|l| {
                (
                    l.missing_teeth,
                    l.bent_teeth,
                    l.warped,
                    l.ejector_marks,
                    l.low_gloss,
                )
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(flags(&a), flags(&b));
}
