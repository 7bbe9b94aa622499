use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    SpreadsheetError(#[from] calamine::XlsxError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported file format: {path}")]
    UnsupportedFormat { path: String },

    #[error("Missing required columns: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("No year columns found in the data (e.g., 2021, FY21)")]
    NoYearColumns,

    #[error("No usable inventory rows in {source_name}")]
    EmptyDataset { source_name: String },

    #[error("Forecast error: {message}")]
    ForecastError { message: String },

    #[error("Material not found: {material}")]
    MaterialNotFound { material: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Analysis,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 根據錯誤嚴重程度決定退出碼
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl AnalysisError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AnalysisError::ConfigError { .. }
            | AnalysisError::ConfigValidationError { .. }
            | AnalysisError::MissingConfigError { .. }
            | AnalysisError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            AnalysisError::CsvError(_)
            | AnalysisError::SpreadsheetError(_)
            | AnalysisError::UnsupportedFormat { .. }
            | AnalysisError::MissingColumns { .. }
            | AnalysisError::NoYearColumns
            | AnalysisError::EmptyDataset { .. } => ErrorCategory::Input,
            AnalysisError::ForecastError { .. }
            | AnalysisError::MaterialNotFound { .. }
            | AnalysisError::ProcessingError { .. } => ErrorCategory::Analysis,
            AnalysisError::ZipError(_)
            | AnalysisError::IoError(_)
            | AnalysisError::SerializationError(_) => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AnalysisError::ForecastError { .. } | AnalysisError::MaterialNotFound { .. } => {
                ErrorSeverity::Medium
            }
            AnalysisError::IoError(_) | AnalysisError::ZipError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.severity().exit_code()
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            AnalysisError::ConfigError { .. } | AnalysisError::ConfigValidationError { .. } => {
                "Check the TOML configuration file syntax and values".to_string()
            }
            AnalysisError::MissingConfigError { field } => {
                format!("Provide '{}' on the command line or in the config file", field)
            }
            AnalysisError::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of '{}'", field)
            }
            AnalysisError::UnsupportedFormat { .. } => {
                "Provide the inventory data as an .xlsx or .csv file".to_string()
            }
            AnalysisError::MissingColumns { .. } => {
                "Make sure the header row contains the material and unit price columns, or set source.material_column / source.price_column".to_string()
            }
            AnalysisError::NoYearColumns => {
                "Name quantity columns by year, e.g. 2021 or FY21".to_string()
            }
            AnalysisError::EmptyDataset { .. } => {
                "Check that rows have a positive unit price and at least one positive yearly quantity".to_string()
            }
            AnalysisError::ForecastError { .. } => {
                "Choose a target year after the last historical usage year".to_string()
            }
            AnalysisError::MaterialNotFound { .. } => {
                "Check the material name against the usage history table".to_string()
            }
            AnalysisError::CsvError(_) | AnalysisError::SpreadsheetError(_) => {
                "Verify the input file is not corrupted and opens in a spreadsheet tool".to_string()
            }
            AnalysisError::IoError(_) | AnalysisError::ZipError(_) => {
                "Check file paths and write permissions for the output directory".to_string()
            }
            AnalysisError::SerializationError(_) | AnalysisError::ProcessingError { .. } => {
                "Re-run with --verbose and inspect the logs".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AnalysisError::MissingColumns { columns } => {
                format!("The input file is missing columns: {}", columns.join(", "))
            }
            AnalysisError::NoYearColumns => {
                "No year columns found in the data (e.g., 2021, FY21)".to_string()
            }
            AnalysisError::UnsupportedFormat { path } => {
                format!("Unsupported file format for '{}'. Please use XLSX or CSV.", path)
            }
            AnalysisError::ForecastError { message } => message.clone(),
            AnalysisError::MaterialNotFound { material } => {
                format!("No inventory named '{}' was found in the data", material)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
