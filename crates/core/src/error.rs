use needle_types::BedId;

#[derive(Debug, thiserror::Error)]
pub enum NeedleError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("bed {bed} is outside the configured range 1..={bed_count}")]
    UnknownBed { bed: BedId, bed_count: u16 },
    #[error("{field} must be between 0 and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        max: u32,
    },
    #[error("unknown route: '{0}'")]
    UnknownRoute(String),
    #[error("invalid value: {0}")]
    Types(#[from] needle_types::TypesError),
}

pub type NeedleResult<T> = std::result::Result<T, NeedleError>;
