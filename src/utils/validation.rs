use crate::utils::error::{AnalysisError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(AnalysisError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(AnalysisError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[String],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        if let Some(extension) = std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            let extension = extension.to_ascii_lowercase();
            if !allowed_set.contains(extension.as_str()) {
                return Err(AnalysisError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
        } else {
            return Err(AnalysisError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: file.clone(),
                reason: "File has no extension or invalid filename".to_string(),
            });
        }
    }

    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| AnalysisError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AnalysisError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(AnalysisError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_output_formats(field_name: &str, formats: &[String]) -> Result<()> {
    let valid_formats = ["csv", "tsv", "json"];
    if formats.is_empty() {
        return Err(AnalysisError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: String::new(),
            reason: "At least one output format is required".to_string(),
        });
    }
    for (i, format) in formats.iter().enumerate() {
        if formats[..i].contains(format) {
            return Err(AnalysisError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: format.clone(),
                reason: "Format listed more than once".to_string(),
            });
        }
        if !valid_formats.contains(&format.as_str()) {
            return Err(AnalysisError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: format.clone(),
                reason: format!(
                    "Unsupported format. Valid formats: {}",
                    valid_formats.join(", ")
                ),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("load.output_path", "./output").is_ok());
        assert!(validate_path("load.output_path", "").is_err());
        assert!(validate_path("load.output_path", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_file_extensions() {
        let files = vec!["stock.csv".to_string(), "Stock.XLSX".to_string()];
        assert!(validate_file_extensions("source.path", &files, &["csv", "xlsx"]).is_ok());

        let invalid_files = vec!["stock.txt".to_string()];
        assert!(validate_file_extensions("source.path", &invalid_files, &["csv", "xlsx"]).is_err());

        let no_extension = vec!["stock".to_string()];
        assert!(validate_file_extensions("source.path", &no_extension, &["csv"]).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("analysis.price_target_year", 2028, 2023, 2100).is_ok());
        assert!(validate_range("analysis.price_target_year", 2022, 2023, 2100).is_err());
        assert!(validate_range("analysis.price_target_year", 2101, 2023, 2100).is_err());
    }

    #[test]
    fn test_validate_output_formats() {
        let formats = vec!["csv".to_string(), "json".to_string()];
        assert!(validate_output_formats("load.output_formats", &formats).is_ok());
        assert!(validate_output_formats("load.output_formats", &[]).is_err());
        assert!(validate_output_formats("load.output_formats", &["xml".to_string()]).is_err());

        let repeated = vec!["csv".to_string(), "json".to_string(), "csv".to_string()];
        assert!(matches!(
            validate_output_formats("load.output_formats", &repeated),
            Err(AnalysisError::InvalidConfigValueError { value, .. }) if value == "csv"
        ));
    }

    #[test]
    fn test_validate_required_field() {
        let input: Option<String> = None;
        assert!(matches!(
            validate_required_field("source.path", &input),
            Err(AnalysisError::MissingConfigError { .. })
        ));
        let input = Some("stock.csv".to_string());
        assert_eq!(validate_required_field("source.path", &input).unwrap(), "stock.csv");
    }
}
