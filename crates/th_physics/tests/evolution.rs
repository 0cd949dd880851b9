// crates/th_physics/tests/evolution.rs

//! 演进驱动集成测试
//!
//! 用记录式协作者验证相位顺序契约：边界更新先于通量计算，
//! 通量计算进入时累加器已清零，算子在通量之后、守恒更新之前
//! 施加，外插在更新之后恢复表示一致性。

use std::sync::{Arc, Mutex};

use th_foundation::ThResult;
use th_mesh::{RectMeshBuilder, TriangleMesh};
use th_physics::boundary::{Boundary, Dirichlet};
use th_physics::domain::{Domain, FluxComputer};
use th_physics::operators::{Operator, OperatorContext, Rate, RateOperator};
use th_physics::quantity::QuantitySet;
use th_physics::region::Region;

type EventLog = Arc<Mutex<Vec<&'static str>>>;

/// 记录调用顺序的边界
struct RecordingBoundary {
    log: EventLog,
    inner: Dirichlet,
}

impl Boundary for RecordingBoundary {
    fn kind(&self) -> &'static str {
        "recording"
    }

    fn evaluate(&mut self, time: f64, interior: &[f64], out: &mut [f64]) -> ThResult<()> {
        self.log.lock().unwrap().push("boundary");
        self.inner.evaluate(time, interior, out)
    }
}

/// 记录调用顺序并断言累加器契约的通量协作者
struct RecordingFlux {
    log: EventLog,
    explicit_fill: f64,
    semi_implicit_fill: f64,
}

impl FluxComputer for RecordingFlux {
    fn compute(
        &mut self,
        quantities: &mut QuantitySet,
        _mesh: &TriangleMesh,
        _time: f64,
        _dt: f64,
    ) -> ThResult<()> {
        self.log.lock().unwrap().push("flux");

        let stage = quantities.get_mut("stage")?;
        // 相位进入契约：两个累加器已清零
        assert!(stage.explicit_update().iter().all(|&v| v == 0.0));
        assert!(stage.semi_implicit_update().iter().all(|&v| v == 0.0));

        stage.explicit_update_mut().fill(self.explicit_fill);
        stage.semi_implicit_update_mut().fill(self.semi_implicit_fill);
        Ok(())
    }
}

/// 记录调用顺序并断言观察到通量结果的算子
struct RecordingOperator {
    log: EventLog,
    expected_explicit: f64,
}

impl Operator for RecordingOperator {
    fn name(&self) -> &str {
        "recording"
    }

    fn parallel_safe(&self) -> bool {
        true
    }

    fn apply(&mut self, quantities: &mut QuantitySet, _ctx: &OperatorContext<'_>) -> ThResult<()> {
        self.log.lock().unwrap().push("operators");

        // 算子在通量计算之后施加
        let stage = quantities.get("stage")?;
        assert!(stage
            .explicit_update()
            .iter()
            .all(|&v| v == self.expected_explicit));
        Ok(())
    }
}

fn build_domain(log: &EventLog) -> Domain {
    let mesh = RectMeshBuilder::square(2, 2.0).build().unwrap();
    let mut domain = Domain::new(mesh, &["stage"]);

    for tag in ["left", "right", "bottom", "top"] {
        domain.set_boundary(
            tag,
            Box::new(RecordingBoundary {
                log: log.clone(),
                inner: Dirichlet::new(vec![0.0]),
            }),
        );
    }
    domain.set_flux_computer(Box::new(RecordingFlux {
        log: log.clone(),
        explicit_fill: 1.0,
        semi_implicit_fill: 0.0,
    }));
    domain.add_operator(Box::new(RecordingOperator {
        log: log.clone(),
        expected_explicit: 1.0,
    }));
    domain
}

#[test]
fn test_phase_sequence_per_timestep() {
    let log: EventLog = Arc::new(Mutex::new(Vec::new()));
    let mut domain = build_domain(&log);
    let n_boundary = domain.mesh().n_boundary_edges();

    let steps: Vec<f64> = domain
        .evolve(0.5, 1.0)
        .unwrap()
        .collect::<ThResult<_>>()
        .unwrap();
    assert_eq!(steps, vec![0.5, 1.0]);

    let events = log.lock().unwrap();
    // 每步: 每条边界边一次边界求值，然后通量，然后算子
    let per_step = n_boundary + 2;
    assert_eq!(events.len(), 2 * per_step);
    for step in 0..2 {
        let window = &events[step * per_step..(step + 1) * per_step];
        assert!(window[..n_boundary].iter().all(|&e| e == "boundary"));
        assert_eq!(window[n_boundary], "flux");
        assert_eq!(window[n_boundary + 1], "operators");
    }
}

#[test]
fn test_update_observes_flux_and_extrapolation_follows() {
    let log: EventLog = Arc::new(Mutex::new(Vec::new()));
    let mut domain = build_domain(&log);

    let mut evolve = domain.evolve(0.5, 0.5).unwrap();
    evolve.next().unwrap().unwrap();
    drop(evolve);

    let stage = domain.quantities().get("stage").unwrap();
    // 初始 0，显式贡献 1.0 × dt
    for t in 0..stage.len() {
        assert!((stage.centroid_values()[t] - 0.5).abs() < 1e-14);
        // 外插后三套表示一致
        assert_eq!(stage.vertex_values()[t], [0.5; 3]);
        assert_eq!(stage.edge_values()[t], [0.5; 3]);
    }
    // 更新后累加器清零
    assert!(stage.explicit_update().iter().all(|&v| v == 0.0));
}

#[test]
fn test_semi_implicit_through_driver() {
    let mesh = RectMeshBuilder::square(2, 2.0).build().unwrap();
    let mut domain = Domain::new(mesh, &["stage"]);
    for tag in ["left", "right", "bottom", "top"] {
        domain.set_boundary(tag, Box::new(Dirichlet::new(vec![0.0])));
    }

    struct SemiFlux;
    impl FluxComputer for SemiFlux {
        fn compute(
            &mut self,
            quantities: &mut QuantitySet,
            _mesh: &TriangleMesh,
            _time: f64,
            _dt: f64,
        ) -> ThResult<()> {
            quantities.get_mut("stage")?.semi_implicit_update_mut().fill(1.0);
            Ok(())
        }
    }
    domain.set_flux_computer(Box::new(SemiFlux));
    domain
        .quantities_mut()
        .get_mut("stage")
        .unwrap()
        .set_constant(2.0, &Region::All);

    let mut evolve = domain.evolve(0.1, 0.1).unwrap();
    evolve.next().unwrap().unwrap();
    drop(evolve);

    let expected = 2.0 / (1.0 - 0.1 * 1.0 / 2.0);
    let stage = domain.quantities().get("stage").unwrap();
    assert!(stage
        .centroid_values()
        .iter()
        .all(|&v| (v - expected).abs() < 1e-14));
}

#[test]
fn test_rate_operator_inside_driver() {
    let mesh = RectMeshBuilder::square(2, 2.0).build().unwrap();
    let mut domain = Domain::new(mesh, &["stage"]);
    domain.add_quantity("elevation");
    for tag in ["left", "right", "bottom", "top"] {
        domain.set_boundary(tag, Box::new(Dirichlet::new(vec![0.0])));
    }
    domain
        .quantities_mut()
        .get_mut("elevation")
        .unwrap()
        .set_constant(-1.0, &Region::All);

    domain.add_operator(Box::new(RateOperator::new(
        Rate::Constant(2.0),
        Region::All,
    )));

    let times: Vec<f64> = domain
        .evolve(0.25, 1.0)
        .unwrap()
        .collect::<ThResult<_>>()
        .unwrap();
    assert_eq!(times.len(), 4);

    // 4 步 × 2.0 × 0.25
    let stage = domain.quantities().get("stage").unwrap();
    assert!(stage
        .centroid_values()
        .iter()
        .all(|&v| (v - 2.0).abs() < 1e-14));
}
