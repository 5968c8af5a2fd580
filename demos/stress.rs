//! Dense stress scenario (spec.md §8 S5): a grid of short segments with
//! small random velocities, stepped repeatedly, reporting the per-step
//! cost and checking the invariants a host would care about — kinetic
//! energy drift and wall-counter monotonicity — the way the teacher's
//! `perf_sweep.rs` reports a CSV of per-run stats.

use nobonk::{Engine, EngineApi, EngineConfig, SegmentInit, Vec2, WorldBox};

fn lcg(seed: &mut u32) -> u32 {
    *seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
    *seed
}

fn unit_rand(seed: &mut u32) -> f64 {
    (lcg(seed) as f64) / (u32::MAX as f64)
}

fn kinetic_energy(e: &Engine, n: usize) -> f64 {
    let mut ke = 0.0;
    for i in 0..n {
        let s = e.segment(i).unwrap();
        ke += 0.5 * s.mass * s.v.length_squared();
    }
    ke
}

fn main() {
    let _ = pretty_env_logger::try_init();

    let side = 16usize;
    let n = side * side;
    let mut seed = 0xC0FFEEu32;

    let mut engine = Engine::new(
        n,
        EngineConfig { bounds: WorldBox::new(0.0, 1.0, 0.0, 1.0), dt: 0.5, enable_timing: true },
    );

    for row in 0..side {
        for col in 0..side {
            let cx = (col as f64 + 0.5) / side as f64;
            let cy = (row as f64 + 0.5) / side as f64;
            let half = 0.2 / side as f64;
            let vx = (unit_rand(&mut seed) - 0.5) * 0.2;
            let vy = (unit_rand(&mut seed) - 0.5) * 0.2;
            engine
                .add_segment(SegmentInit {
                    p1: Vec2::new(cx - half, cy),
                    p2: Vec2::new(cx + half, cy),
                    v: Vec2::new(vx, vy),
                })
                .expect("grid sized to capacity");
        }
    }

    let ke0 = kinetic_energy(&engine, n);
    let mut prev_walls = 0u64;

    println!("step,line_line,wall,cum_wall,cum_line_line,index_build_us,enumerate_us,resolve_us");
    for step in 0..100 {
        let counts = engine.step();
        let (walls, lines) = engine.counters();
        assert!(walls >= prev_walls, "wall counter must be monotone non-decreasing");
        prev_walls = walls;

        let t = engine.step_timing().unwrap_or_default();
        println!(
            "{},{},{},{},{},{:.1},{:.1},{:.1}",
            step,
            counts.line_line_collisions,
            counts.wall_collisions,
            walls,
            lines,
            t.index_build.as_secs_f64() * 1e6,
            t.enumerate.as_secs_f64() * 1e6,
            t.resolve.as_secs_f64() * 1e6,
        );
    }

    let ke1 = kinetic_energy(&engine, n);
    let drift = (ke1 - ke0).abs() / ke0.max(1e-12);
    println!("# kinetic energy drift over 100 steps: {:.5}%", drift * 100.0);
    assert!(drift < 1e-3, "kinetic energy drifted by more than 0.1%: {:.5}%", drift * 100.0);
}
