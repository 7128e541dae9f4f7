//! Matrix Market reading through the filesystem, plus a file-to-solution
//! round trip through the engine.

use std::io::Write;

use approx::assert_abs_diff_eq;

use cgbench::config::SolverOptions;
use cgbench::error::CgError;
use cgbench::io::market;
use cgbench::solver::CgEngine;

const SPD_SYMMETRIC: &str = "%%MatrixMarket matrix coordinate real symmetric\n\
                             % 4x4 SPD tridiagonal, lower triangle stored\n\
                             4 4 7\n\
                             1 1 2.0\n\
                             2 1 -1.0\n\
                             2 2 2.0\n\
                             3 2 -1.0\n\
                             3 3 2.0\n\
                             4 3 -1.0\n\
                             4 4 2.0\n";

fn write_mtx(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn reads_symmetric_file_with_mirrored_storage() {
    let file = write_mtx(SPD_SYMMETRIC);
    let coo = market::read_file::<f64>(file.path()).unwrap();
    assert_eq!(coo.n, 4);
    // 7 stored entries, 4 on the diagonal: 2*7 - 4 mirrored nonzeros.
    assert_eq!(coo.nz, 10);
    assert_eq!(coo.nz_per_row, vec![2, 3, 3, 2]);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = market::read_file::<f64>(std::path::Path::new("no-such-matrix.mtx"));
    assert!(matches!(err, Err(CgError::Io(_))));
}

#[test]
fn file_to_solution_round_trip() {
    let file = write_mtx(SPD_SYMMETRIC);
    let mut engine: CgEngine<f64> = CgEngine::from_options(&SolverOptions::default()).unwrap();
    engine.load(file.path()).unwrap();

    // b = A * [1, 1, 1, 1] for the mirrored tridiagonal matrix.
    engine.set_rhs(&[1.0, 0.0, 0.0, 1.0]).unwrap();
    let report = engine.solve().unwrap();
    assert!(report.stats.converged);
    for xi in engine.solution() {
        assert_abs_diff_eq!(*xi, 1.0, epsilon = 1e-8);
    }
    assert!(report.timing.io > std::time::Duration::ZERO);
}
