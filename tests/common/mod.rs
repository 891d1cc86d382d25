//! Shared test helpers for cargen integration tests.
//!
//! All tests use temp directories, with no side effects on the real tree.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use glam::Vec3;

use cargen::dataset::{JsonSaveCodec, SaveCodec, SaveDataset};
use cargen::model::{CarGenerator, FormatRevision, Game};

pub fn codec() -> JsonSaveCodec {
    JsonSaveCodec::new(Game::Gta3, FormatRevision::Colors)
}

/// An enabled record at `(x, y, 0)`.
pub fn rec(model: u32, x: f32, y: f32) -> CarGenerator {
    CarGenerator {
        model,
        position: Vec3::new(x, y, 0.0),
        heading: 0.0,
        enabled: true,
        ..CarGenerator::empty(FormatRevision::Colors)
    }
}

/// Write a GTA3 save named `<name>.json` whose listed slots are filled.
pub fn write_save(dir: &Path, name: &str, slots: &[(usize, CarGenerator)]) -> PathBuf {
    let mut ds = SaveDataset::new(Game::Gta3, FormatRevision::Colors, name);
    for (i, r) in slots {
        ds.car_generators.set(*i, r).expect("slot in range");
    }
    ds.car_generators.recompute_counters();
    let path = dir.join(format!("{name}.json"));
    codec().save(&ds, &path).expect("failed to write save");
    path
}

pub fn load(path: &Path) -> SaveDataset {
    codec().load(path).expect("failed to load save")
}

/// Run the cargen binary in `dir`.
pub fn cargen_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cargen"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("CARGEN_LOG_FORMAT")
        .env_remove("CARGEN_CONFIG")
        .output()
        .expect("failed to execute cargen")
}

/// Run cargen and assert it succeeds. Returns stderr (where logs go).
pub fn cargen_ok(dir: &Path, args: &[&str]) -> String {
    let out = cargen_in(dir, args);
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        out.status.success(),
        "cargen {} failed:\nstderr: {stderr}",
        args.join(" "),
    );
    stderr.to_string()
}

/// Run cargen and assert it exits with `code`. Returns stderr.
pub fn cargen_exits(dir: &Path, args: &[&str], code: i32) -> String {
    let out = cargen_in(dir, args);
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert_eq!(
        out.status.code(),
        Some(code),
        "cargen {} exited with {:?}:\nstderr: {stderr}",
        args.join(" "),
        out.status.code(),
    );
    stderr.to_string()
}
