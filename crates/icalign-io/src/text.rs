//! The parameter file holds the number of parameters on the first line and the values,
//! separated by single spaces, on the second one. The matrix file holds three lines of three
//! values each, row-major.
//!
//! Values are printed with the shortest representation that parses back to the same `f64`.

use crate::error::IoError;
use std::{
    fs,
    io::{BufWriter, Write},
    path::Path,
};

fn join_values(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_values(file_path: &Path, tokens: &[&str]) -> Result<Vec<f64>, IoError> {
    tokens
        .iter()
        .map(|token| {
            token.parse::<f64>().map_err(|_| {
                IoError::InvalidTextArtifact(
                    file_path.to_path_buf(),
                    format!("cannot parse '{token}' as a real value"),
                )
            })
        })
        .collect()
}

/// Write a parameter vector as text.
///
/// # Arguments
///
/// * `file_path` - The destination path.
/// * `params` - The parameter values.
pub fn write_parameters_txt(file_path: impl AsRef<Path>, params: &[f64]) -> Result<(), IoError> {
    let mut writer = BufWriter::new(fs::File::create(file_path)?);
    writeln!(writer, "{}", params.len())?;
    writeln!(writer, "{}", join_values(params))?;
    writer.flush()?;
    Ok(())
}

/// Read a parameter vector written by [`write_parameters_txt`].
///
/// # Errors
///
/// Returns [`IoError::InvalidTextArtifact`] when the count is missing, a value does not parse,
/// or the number of values differs from the declared count.
pub fn read_parameters_txt(file_path: impl AsRef<Path>) -> Result<Vec<f64>, IoError> {
    let file_path = file_path.as_ref();
    let content = fs::read_to_string(file_path)?;
    let mut lines = content.lines();

    let count = lines
        .next()
        .and_then(|line| line.trim().parse::<usize>().ok())
        .ok_or_else(|| {
            IoError::InvalidTextArtifact(file_path.to_path_buf(), "missing parameter count".into())
        })?;

    let tokens = lines.flat_map(str::split_whitespace).collect::<Vec<_>>();
    if tokens.len() != count {
        return Err(IoError::InvalidTextArtifact(
            file_path.to_path_buf(),
            format!("expected {count} values, found {}", tokens.len()),
        ));
    }

    parse_values(file_path, &tokens)
}

/// Write a 3x3 row-major matrix as text.
///
/// # Arguments
///
/// * `file_path` - The destination path.
/// * `matrix` - The 9 matrix entries, row-major.
pub fn write_matrix_txt(file_path: impl AsRef<Path>, matrix: &[f64; 9]) -> Result<(), IoError> {
    let mut writer = BufWriter::new(fs::File::create(file_path)?);
    for row in matrix.chunks_exact(3) {
        writeln!(writer, "{}", join_values(row))?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a 3x3 row-major matrix written by [`write_matrix_txt`].
///
/// # Errors
///
/// Returns [`IoError::InvalidTextArtifact`] unless the file holds three non empty lines of three
/// real values each.
pub fn read_matrix_txt(file_path: impl AsRef<Path>) -> Result<[f64; 9], IoError> {
    let file_path = file_path.as_ref();
    let content = fs::read_to_string(file_path)?;

    let rows = content
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>())
        .filter(|tokens| !tokens.is_empty())
        .collect::<Vec<_>>();

    if rows.len() != 3 || rows.iter().any(|row| row.len() != 3) {
        return Err(IoError::InvalidTextArtifact(
            file_path.to_path_buf(),
            "expected 3 rows of 3 values".into(),
        ));
    }

    let values = parse_values(file_path, &rows.concat())?;

    let mut matrix = [0.0; 9];
    matrix.copy_from_slice(&values);
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_round_trip() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("transform.mat");

        let params = [0.1 + 0.2, -1.0 / 3.0, 1e-17, 12345.678901234567, 0.0, -0.0];
        write_parameters_txt(&file_path, &params)?;

        let content = fs::read_to_string(&file_path)?;
        assert!(content.starts_with("6\n"));

        let params_back = read_parameters_txt(&file_path)?;
        assert_eq!(params_back, params);

        Ok(())
    }

    #[test]
    fn matrix_round_trip() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("matrix.mat");

        let matrix = [
            1.0,
            0.0,
            2.5,
            0.0,
            (0.3f64).cos(),
            -(0.3f64).sin(),
            1e-7,
            0.0,
            1.0,
        ];
        write_matrix_txt(&file_path, &matrix)?;

        let content = fs::read_to_string(&file_path)?;
        assert_eq!(content.lines().count(), 3);
        assert_eq!(content.lines().next(), Some("1 0 2.5"));

        assert_eq!(read_matrix_txt(&file_path)?, matrix);

        Ok(())
    }

    #[test]
    fn parameters_count_mismatch() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("bad.mat");
        fs::write(&file_path, "3\n1 2\n")?;

        assert!(matches!(
            read_parameters_txt(&file_path),
            Err(IoError::InvalidTextArtifact(..))
        ));

        Ok(())
    }

    #[test]
    fn matrix_malformed() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("bad.mat");

        fs::write(&file_path, "1 0 0\n0 1 0\n")?;
        assert!(read_matrix_txt(&file_path).is_err());

        fs::write(&file_path, "1 0 0\n0 one 0\n0 0 1\n")?;
        assert!(matches!(
            read_matrix_txt(&file_path),
            Err(IoError::InvalidTextArtifact(..))
        ));

        Ok(())
    }
}
