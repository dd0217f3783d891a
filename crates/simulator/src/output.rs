use rr_core::{FrequencyTable, MechanismKind, Population, RrParams};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Load a seed file: a JSON array of category → 0/1 objects.
pub fn read_seed(path: &Path) -> Result<Population, BoxError> {
    let file = File::open(path)
        .map_err(|e| format!("failed to open seed file {}: {e}", path.display()))?;
    let seed: Population = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| format!("failed to parse seed file {}: {e}", path.display()))?;
    Ok(seed)
}

/// `<results_dir>/<mechanism>/frequencies/run-<run>_q-<q>_r-<r>_tau-<tau>.json`
pub fn frequency_path(
    results_dir: &Path,
    kind: MechanismKind,
    run: u64,
    params: &RrParams,
) -> PathBuf {
    results_dir
        .join(kind.as_str())
        .join("frequencies")
        .join(format!(
            "run-{run}_q-{}_r-{}_tau-{}.json",
            format_param(params.q),
            format_param(params.r),
            params.tau
        ))
}

/// Render a float parameter for a file name. Integral values keep one
/// decimal (`1.0`), tiny values use a two-digit exponent (`1e-05`),
/// everything else the shortest round-trip form.
pub fn format_param(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e16 {
        return format!("{value:.1}");
    }
    if value.abs() < 1e-4 {
        let sci = format!("{value:e}");
        if let Some((mantissa, exp)) = sci.split_once('e') {
            if let Ok(exp) = exp.parse::<i32>() {
                let sign = if exp < 0 { '-' } else { '+' };
                return format!("{mantissa}e{sign}{:02}", exp.abs());
            }
        }
        return sci;
    }
    value.to_string()
}

/// Write a frequency table as a JSON object, creating parent directories.
pub fn write_frequencies(path: &Path, table: &FrequencyTable) -> Result<(), BoxError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .map_err(|e| format!("failed to create {}: {e}", dir.display()))?;
    }
    let file = File::create(path)
        .map_err(|e| format!("failed to create {}: {e}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, table)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rr_core::population;
    use rr_core::Popularity;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rr-sim-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn param_formatting() {
        assert_eq!(format_param(1.0), "1.0");
        assert_eq!(format_param(0.0), "0.0");
        assert_eq!(format_param(0.5), "0.5");
        assert_eq!(format_param(0.75), "0.75");
        assert_eq!(format_param(0.1), "0.1");
        assert_eq!(format_param(0.00001), "1e-05");
        assert_eq!(format_param(0.000025), "2.5e-05");
    }

    #[test]
    fn path_layout() {
        let path = frequency_path(
            Path::new("results"),
            MechanismKind::Fixed,
            3,
            &RrParams::new(1.0, 0.25, 10),
        );
        assert_eq!(
            path,
            PathBuf::from("results/fixed/frequencies/run-3_q-1.0_r-0.25_tau-10.json")
        );
    }

    #[test]
    fn write_creates_directories() {
        let dir = scratch_dir("write");
        let path = dir.join("fox").join("frequencies").join("out.json");
        let table: FrequencyTable = [("0", 12u64), ("1", 0)].into_iter().collect();
        write_frequencies(&path, &table).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, r#"{"0":12,"1":0}"#);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn seed_file_round_trip() {
        let dir = scratch_dir("seed");
        fs::create_dir_all(&dir).unwrap();
        let popularity: Popularity = [("0", 2u64), ("1", 1)].into_iter().collect();
        let seed = population::build(3, &popularity);
        let path = dir.join("seed.json");
        fs::write(&path, serde_json::to_vec(&seed).unwrap()).unwrap();

        assert_eq!(read_seed(&path).unwrap(), seed);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_seed_file_fails() {
        let err = read_seed(Path::new("/nonexistent/seed.json")).unwrap_err();
        assert!(err.to_string().contains("failed to open seed file"));
    }
}
