use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use runtime::BacktestError;

use crate::dto::ErrorBody;
use crate::state::StartRunError;

#[derive(Debug)]
pub enum ApiError {
    Backtest(BacktestError),
    RunIdOverflow,
    InvalidRunId(String),
    RunNotFound,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Backtest(BacktestError::Input(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Backtest(BacktestError::DataUnavailable(_)) => StatusCode::BAD_GATEWAY,
            Self::Backtest(BacktestError::Export(_)) | Self::RunIdOverflow => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::InvalidRunId(_) => StatusCode::BAD_REQUEST,
            Self::RunNotFound => StatusCode::NOT_FOUND,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            Self::Backtest(err) => ErrorBody {
                error: err.kind(),
                message: err.to_string(),
            },
            Self::RunIdOverflow => ErrorBody {
                error: "run_id_overflow",
                message: "no run ids left".to_owned(),
            },
            Self::InvalidRunId(raw) => ErrorBody {
                error: "invalid_run_id",
                message: format!("`{raw}` is neither a run id nor `latest`"),
            },
            Self::RunNotFound => ErrorBody {
                error: "run_not_found",
                message: "no such run".to_owned(),
            },
        }
    }
}

impl From<BacktestError> for ApiError {
    fn from(err: BacktestError) -> Self {
        Self::Backtest(err)
    }
}

impl From<StartRunError> for ApiError {
    fn from(err: StartRunError) -> Self {
        match err {
            StartRunError::RunIdOverflow => Self::RunIdOverflow,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
