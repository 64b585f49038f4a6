use kn0sys_lmdb_rs::MdbError;
use log::error;
use rocket::{
    catch,
    catchers,
    http::Status,
    response::{
        self,
        status::Custom,
        Responder,
    },
    serde::json::Json,
    Catcher,
    Request,
};
use thiserror::Error;

use crate::reqres::ErrorResponse;

/// Use for mapping errors in functions that can throw multiple errors.
#[derive(Debug, Error)]
pub enum MarketError {
    #[error("Database error. See logs for more info.")]
    Database(MdbError),
    #[error("Corrupt record. See logs for more info.")]
    Serialization(#[from] bincode::Error),
    #[error("Resource does not exist")]
    NotFound,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden")]
    Forbidden,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Coupon rejected: {0}")]
    Coupon(String),
    #[error("Delivery unavailable: {0}")]
    Delivery(String),
    #[error("Payment rejected: {0}")]
    Payment(String),
    #[error("Internal server error")]
    Unknown,
}

impl From<MdbError> for MarketError {
    fn from(e: MdbError) -> Self {
        error!("lmdb failure: {:?}", e);
        MarketError::Database(e)
    }
}

impl MarketError {
    /// HTTP status reported for this error
    pub fn status(&self) -> Status {
        match *self {
            MarketError::NotFound => Status::NotFound,
            MarketError::InvalidInput(_) => Status::BadRequest,
            MarketError::Unauthorized => Status::Unauthorized,
            MarketError::Forbidden => Status::Forbidden,
            MarketError::Conflict(_) => Status::Conflict,
            MarketError::Coupon(_) | MarketError::Delivery(_) => Status::UnprocessableEntity,
            MarketError::Payment(_) => Status::BadRequest,
            MarketError::Database(_) | MarketError::Serialization(_) | MarketError::Unknown => {
                Status::InternalServerError
            }
        }
    }
}

impl<'r> Responder<'r, 'static> for MarketError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        if status == Status::InternalServerError {
            error!("{:?}", self);
        }
        Custom(
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
        .respond_to(req)
    }
}

fn caught(status: Status, error: &str) -> Custom<Json<ErrorResponse>> {
    Custom(
        status,
        Json(ErrorResponse {
            error: String::from(error),
        }),
    )
}

#[catch(400)]
pub fn bad_request() -> Custom<Json<ErrorResponse>> {
    caught(Status::BadRequest, "Malformed request")
}

#[catch(401)]
pub fn unauthorized() -> Custom<Json<ErrorResponse>> {
    caught(Status::Unauthorized, "Unauthorized")
}

#[catch(403)]
pub fn forbidden() -> Custom<Json<ErrorResponse>> {
    caught(Status::Forbidden, "Forbidden")
}

#[catch(404)]
pub fn not_found() -> Custom<Json<ErrorResponse>> {
    caught(Status::NotFound, "Resource does not exist")
}

#[catch(422)]
pub fn unprocessable() -> Custom<Json<ErrorResponse>> {
    caught(Status::UnprocessableEntity, "Request body could not be read")
}

#[catch(500)]
pub fn internal_error() -> Custom<Json<ErrorResponse>> {
    caught(Status::InternalServerError, "Internal server error")
}

/// JSON catchers registered by every server
pub fn catchers() -> Vec<Catcher> {
    catchers![
        bad_request,
        unauthorized,
        forbidden,
        not_found,
        unprocessable,
        internal_error
    ]
}
