use review_core::ReviewError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Review(#[from] ReviewError),

    #[error("config error: {0}")]
    Config(String),

    #[error("no document loaded")]
    NoDocument,

    #[error("stale document: requested {requested}, current is {current}")]
    StaleDocument { requested: String, current: String },
}
