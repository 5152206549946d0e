//! End-to-end checks of the engines on small reference networks.

use taskpert::{
    analyze_pert, analyze_relaxation, analyze_topological, on_time_probability, simulate,
    simulate_with_config, CpmGraph, PertGraph, PertTask, SimulationConfig, Task,
};

fn diamond() -> CpmGraph {
    // ids A=1, B=2, C=3, D=4; durations 1, 5, 2, 1
    CpmGraph::from_tasks([
        Task::new(1, 1),
        Task::new(2, 5).with_predecessors([1]),
        Task::new(3, 2).with_predecessors([1]),
        Task::new(4, 1).with_predecessors([2, 3]),
    ])
    .unwrap()
}

fn pert_chain() -> PertGraph {
    PertGraph::from_tasks([
        PertTask::new(1, 1, 2, 3),
        PertTask::new(2, 2, 4, 6).with_predecessors([1]),
        PertTask::new(3, 1, 3, 5).with_predecessors([2]),
    ])
    .unwrap()
}

#[test]
fn empty_graph_yields_zero_results() {
    assert_eq!(analyze_topological(&CpmGraph::new()).unwrap().total_duration, 0);
    assert!(analyze_relaxation(&CpmGraph::new())
        .unwrap()
        .critical_path
        .is_empty());

    let pert = analyze_pert(&PertGraph::new()).unwrap();
    assert_eq!(pert.expected_duration, 0.0);
    assert!(pert.critical_path.is_empty());

    let sim = simulate(&PertGraph::new(), 10).unwrap();
    assert_eq!(sim.trials, 0);
    assert!(sim.samples.is_empty());
}

#[test]
fn diamond_engines_agree() {
    let graph = diamond();
    let topological = analyze_topological(&graph).unwrap();
    let relaxed = analyze_relaxation(&graph).unwrap();

    assert_eq!(topological.total_duration, 7);
    assert_eq!(topological.critical_path, vec![1, 2, 4]);
    assert_eq!(topological.timing(3).unwrap().slack, 3);
    assert_eq!(topological, relaxed);
}

#[test]
fn repeated_analysis_leaves_graph_untouched() {
    let graph = diamond();
    let before = graph.clone();
    analyze_topological(&graph).unwrap();
    analyze_relaxation(&graph).unwrap();
    assert_eq!(graph, before);
}

#[test]
fn analysis_is_thread_safe_on_shared_graph() {
    let graph = diamond();
    let expected = analyze_topological(&graph).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| analyze_topological(&graph).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn long_chain_is_analyzed_by_every_engine() {
    let n: u32 = 100_000;
    let cpm = CpmGraph::from_tasks(
        (1..=n).map(|id| Task::new(id, 1).with_predecessors((id > 1).then_some(id - 1))),
    )
    .unwrap();

    let topological = analyze_topological(&cpm).unwrap();
    assert_eq!(topological.total_duration, i64::from(n));
    assert_eq!(topological.critical_path.len(), n as usize);
    assert_eq!(topological.critical_paths.len(), 1);
    assert_eq!(topological.critical_paths[0].len(), n as usize);

    let relaxed = analyze_relaxation(&cpm).unwrap();
    assert_eq!(relaxed, topological);

    let pert = PertGraph::from_tasks(
        (1..=n).map(|id| PertTask::new(id, 1, 1, 1).with_predecessors((id > 1).then_some(id - 1))),
    )
    .unwrap();
    let result = analyze_pert(&pert).unwrap();
    assert!((result.expected_duration - f64::from(n)).abs() < 1e-6);
    assert_eq!(result.critical_paths.len(), 1);
    assert_eq!(result.critical_paths[0].len(), n as usize);
}

#[test]
fn pert_chain_statistics() {
    let result = analyze_pert(&pert_chain()).unwrap();

    // Expected durations 2 + 4 + 3
    assert!((result.expected_duration - 9.0).abs() < 1e-9);
    assert_eq!(result.critical_path, vec![1, 2, 3]);
    let variance = (2.0f64 / 6.0).powi(2) + (4.0f64 / 6.0).powi(2) + (4.0f64 / 6.0).powi(2);
    assert!((result.variance - variance).abs() < 1e-12);
    assert!((result.on_time_probability(9.0) - 0.5).abs() < 1e-9);
}

#[test]
fn zero_deviation_on_time_probability() {
    assert_eq!(on_time_probability(10.0, 0.0, 10.0), 1.0);
    assert_eq!(on_time_probability(10.0, 0.0, 9.0), 0.0);
}

fn spread_of_means(trials: usize, runs: u64) -> f64 {
    let means: Vec<f64> = (0..runs)
        .map(|run| {
            let config = SimulationConfig::with_trials(trials).seeded(1_000 + run);
            simulate_with_config(&pert_chain(), &config).unwrap().mean
        })
        .collect();
    let center = means.iter().sum::<f64>() / means.len() as f64;
    let variance =
        means.iter().map(|m| (m - center).powi(2)).sum::<f64>() / means.len() as f64;
    variance.sqrt()
}

#[test]
fn monte_carlo_mean_converges() {
    let small = spread_of_means(100, 20);
    let large = spread_of_means(10_000, 20);
    assert!(
        large < small,
        "spread did not shrink: {} trials -> {}, {} trials -> {}",
        100,
        small,
        10_000,
        large
    );
}

#[test]
fn monte_carlo_mean_within_uniform_bounds() {
    let result =
        simulate_with_config(&pert_chain(), &SimulationConfig::with_trials(10_000).seeded(3))
            .unwrap();

    // Uniform midpoints: (1+3)/2 + (2+6)/2 + (1+5)/2 = 9
    assert!(result.mean >= 4.0 && result.mean <= 14.0);
    assert!((result.mean - 9.0).abs() < 0.1, "mean {}", result.mean);
    assert!(result.percentile(5.0) <= result.percentile(50.0));
    assert!(result.percentile(50.0) <= result.percentile(95.0));
}
