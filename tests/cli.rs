use pnmkit::{pnm, Format, Raster};
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(bin: &str, args: &[&str]) -> Output {
    Command::new(bin)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to spawn {bin}: {e}"))
}

fn write_image(dir: &TempDir, name: &str, raster: &Raster) -> PathBuf {
    let path = dir.path().join(name);
    pnm::write_file(&path, raster).unwrap();
    path
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn resize_bilinear_averages_in_linear_light() {
    let dir = TempDir::new().unwrap();
    let input = write_image(&dir, "in.pgm", &Raster::gray(2, 2, vec![0, 64, 128, 255]).unwrap());
    let output = dir.path().join("out.pgm");

    let result = run(
        env!("CARGO_BIN_EXE_pnm-resize"),
        &[arg(&input), arg(&output), "1", "1", "0", "1"],
    );
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    let bytes = std::fs::read(&output).unwrap();
    assert_eq!(bytes, b"P5\n1 1\n255\n\x99".to_vec());
}

#[test]
fn resize_accepts_filter_names_and_bc_parameters() {
    let dir = TempDir::new().unwrap();
    let src = Raster::rgb(3, 2, (0..18).map(|v| v * 14).collect()).unwrap();
    let input = write_image(&dir, "in.ppm", &src);
    let output = dir.path().join("out.ppm");

    let result = run(
        env!("CARGO_BIN_EXE_pnm-resize"),
        &[arg(&input), arg(&output), "6", "4", "2.2", "bc-spline", "0.333", "0.333"],
    );
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    let out = pnm::read_file(&output).unwrap();
    assert_eq!((out.format(), out.width(), out.height()), (Format::Pixmap, 6, 4));
}

#[test]
fn resize_rejects_zero_target() {
    let dir = TempDir::new().unwrap();
    let input = write_image(&dir, "in.pgm", &Raster::gray(1, 1, vec![7]).unwrap());
    let output = dir.path().join("out.pgm");

    let result = run(
        env!("CARGO_BIN_EXE_pnm-resize"),
        &[arg(&input), arg(&output), "0", "3", "0", "2"],
    );
    assert!(!result.status.success());
    assert!(!output.exists());
}

#[test]
fn resize_reports_malformed_input() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("bad.pgm");
    std::fs::write(&input, b"P7\n1 1\n255\n\0").unwrap();
    let output = dir.path().join("out.pgm");

    let result = run(
        env!("CARGO_BIN_EXE_pnm-resize"),
        &[arg(&input), arg(&output), "2", "2", "0", "0"],
    );
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("Parse"));
    assert!(!output.exists());
}

#[test]
fn dither_floyd_steinberg_one_bit() {
    let dir = TempDir::new().unwrap();
    let input = write_image(&dir, "in.pgm", &Raster::gray(4, 1, vec![0, 85, 170, 255]).unwrap());
    let output = dir.path().join("out.pgm");

    let result = run(
        env!("CARGO_BIN_EXE_pnm-dither"),
        &[arg(&input), arg(&output), "0", "3", "1", "1"],
    );
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    assert_eq!(pnm::read_file(&output).unwrap().data(), &[0, 0, 255, 255]);
}

#[test]
fn dither_random_with_seed_is_reproducible() {
    let dir = TempDir::new().unwrap();
    let input = write_image(&dir, "in.pgm", &Raster::gray(16, 8, vec![100; 128]).unwrap());
    let first = dir.path().join("a.pgm");
    let second = dir.path().join("b.pgm");

    for out in [&first, &second] {
        let result = run(
            env!("CARGO_BIN_EXE_pnm-dither"),
            &[arg(&input), arg(out), "1", "2", "2", "0", "--seed", "42"],
        );
        assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    }

    let a = pnm::read_file(&first).unwrap();
    assert_eq!(a, pnm::read_file(&second).unwrap());
    for v in a.data() {
        assert!([0, 85, 170, 255].contains(v), "{v}");
    }
}

#[test]
fn dither_rejects_out_of_range_bits() {
    let dir = TempDir::new().unwrap();
    let input = write_image(&dir, "in.pgm", &Raster::gray(1, 1, vec![0]).unwrap());
    let output = dir.path().join("out.pgm");

    let result = run(
        env!("CARGO_BIN_EXE_pnm-dither"),
        &[arg(&input), arg(&output), "0", "3", "9", "0"],
    );
    assert_eq!(result.status.code(), Some(2));
}

#[test]
fn transform_rotates_pixmap() {
    let dir = TempDir::new().unwrap();
    let src = Raster::rgb(2, 1, vec![1, 2, 3, 4, 5, 6]).unwrap();
    let input = write_image(&dir, "in.ppm", &src);
    let output = dir.path().join("out.ppm");

    let result = run(
        env!("CARGO_BIN_EXE_pnm-transform"),
        &[arg(&input), arg(&output), "3"],
    );
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    let out = pnm::read_file(&output).unwrap();
    assert_eq!((out.width(), out.height()), (1, 2));
    assert_eq!(out.data(), &[1, 2, 3, 4, 5, 6]);
}

#[test]
fn levels_auto_prints_correction() {
    let dir = TempDir::new().unwrap();
    let input = write_image(&dir, "in.pgm", &Raster::gray(2, 1, vec![55, 140]).unwrap());
    let output = dir.path().join("out.pgm");

    let result = run(
        env!("CARGO_BIN_EXE_pnm-levels"),
        &[arg(&input), arg(&output), "2"],
    );
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    assert_eq!(String::from_utf8_lossy(&result.stdout).trim(), "55 3");
    assert_eq!(pnm::read_file(&output).unwrap().data(), &[0, 255]);
}

#[test]
fn levels_manual_accepts_negative_offset() {
    let dir = TempDir::new().unwrap();
    let input = write_image(&dir, "in.pgm", &Raster::gray(2, 1, vec![0, 100]).unwrap());
    let output = dir.path().join("out.pgm");

    let result = run(
        env!("CARGO_BIN_EXE_pnm-levels"),
        &[arg(&input), arg(&output), "0", "-10", "2"],
    );
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    assert_eq!(pnm::read_file(&output).unwrap().data(), &[20, 220]);
}

#[test]
fn convert_round_trips_through_planes() {
    let dir = TempDir::new().unwrap();
    let src = Raster::rgb(2, 2, vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 200, 200, 200]).unwrap();
    let input = write_image(&dir, "in.ppm", &src);
    let planes = dir.path().join("planes.pgm");
    let back = dir.path().join("back.ppm");

    let result = run(
        env!("CARGO_BIN_EXE_pnm-convert"),
        &["-f", "RGB", "-t", "CMY", "-i", "1", arg(&input), "-o", "3", arg(&planes)],
    );
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    let cyan = pnm::read_file(dir.path().join("planes_1.pgm")).unwrap();
    assert_eq!(cyan.data(), &[0, 255, 255, 55]);

    let result = run(
        env!("CARGO_BIN_EXE_pnm-convert"),
        &["-f", "CMY", "-t", "RGB", "-i", "3", arg(&planes), "-o", "1", arg(&back)],
    );
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    assert_eq!(pnm::read_file(&back).unwrap(), src);
}
