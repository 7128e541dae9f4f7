//! Load a Matrix Market file and benchmark one CG solve.
//!
//! Configuration comes from the environment (CG_FORMAT, CG_PRECONDITIONER,
//! CG_BACKEND, CG_MAX_ITERATIONS, CG_TOLERANCE, CG_CHUNKS):
//!
//! ```text
//! CG_FORMAT=ell CG_PRECONDITIONER=jacobi cargo run --example solve_mtx -- bcsstk14.mtx
//! ```

use std::path::Path;
use std::time::Duration;

use cgbench::config::SolverOptions;
use cgbench::solver::CgEngine;

fn print_padded(label: &str, value: &str) {
    println!("{label:<22}{value}");
}

fn seconds(d: Duration) -> String {
    format!("{:.6}s", d.as_secs_f64())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: solve_mtx <matrix.mtx>")?;
    let options = SolverOptions::from_env()?;

    let mut engine: CgEngine<f64> = CgEngine::from_options(&options)?;
    engine.load(Path::new(&path))?;
    let report = engine.solve()?;

    print_padded("matrix:", &path);
    print_padded("dimension:", &engine.dimension().to_string());
    print_padded("format:", &options.format.to_string());
    print_padded("preconditioner:", &options.preconditioner.to_string());
    print_padded("backend:", &options.backend.to_string());
    print_padded(
        "outcome:",
        if report.stats.converged { "converged" } else { "max iterations reached" },
    );
    print_padded("iterations:", &report.stats.iterations.to_string());
    print_padded("residual:", &format!("{:e}", report.stats.final_residual));
    println!();
    print_padded("io:", &seconds(report.timing.io));
    print_padded("converting:", &seconds(report.timing.converting));
    print_padded("solve:", &seconds(report.timing.solve));
    print_padded("  matvec:", &seconds(report.timing.matvec));
    print_padded("  axpy:", &seconds(report.timing.axpy));
    print_padded("  xpay:", &seconds(report.timing.xpay));
    print_padded("  dot:", &seconds(report.timing.dot));
    print_padded("  preconditioner:", &seconds(report.timing.preconditioner));

    Ok(())
}
