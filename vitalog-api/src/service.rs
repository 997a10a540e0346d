use actix_web::{
    delete, get, http::StatusCode, post, web, HttpResponse, ResponseError,
};
use chrono::{Local, NaiveDate};
use log::info;
use serde::{Deserialize, Serialize};
use vitalog_model::{
    measurement::Sex,
    metrics::{DerivedMetrics, ReferenceBands},
    record::Record,
};
use vitalog_store::RecordRepository;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("user has no records")]
    NotFound,
    #[error("storage error: {0}")]
    Store(#[from] vitalog_store::Error),
}

impl From<vitalog_metrics::Error> for ApiError {
    fn from(e: vitalog_metrics::Error) -> Self {
        ApiError::InvalidInput(e.to_string())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

/// One form submission. The activity level arrives as its raw key so an
/// unknown key surfaces as the engine's error rather than a decode failure.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub date: Option<NaiveDate>,
    pub name: String,
    pub age: u32,
    pub sex: Sex,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity: String,
}

/// Profile fields needed to recompute metrics for the summary view. The
/// table rows only carry weight, so the rest comes from the caller.
#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub age: u32,
    pub sex: Sex,
    pub height_cm: f64,
    pub activity: String,
}

/// The metric-card view: latest stored row, metrics recomputed from the
/// latest weight and the supplied profile, and the reference captions.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub name: String,
    pub latest: Record,
    pub metrics: DerivedMetrics,
    pub reference: ReferenceBands,
}

#[post("/records")]
async fn submit_record(
    repository: web::Data<dyn RecordRepository>,
    request: web::Json<SubmitRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    let name = request.name.trim();
    if name.chars().count() < 2 {
        return Err(ApiError::InvalidInput(
            "name must be at least 2 characters".to_owned(),
        ));
    }

    let metrics = vitalog_metrics::compute_for_key(
        request.weight_kg,
        request.height_cm,
        request.age,
        request.sex,
        &request.activity,
    )?;
    let date = request.date.unwrap_or_else(|| Local::now().date_naive());
    let record = Record::new(date, name.to_owned(), request.weight_kg, &metrics);

    repository.append(record.clone()).await?;
    info!("Stored record for {} on {}", record.name, record.date);
    Ok(HttpResponse::Created().json(record))
}

#[get("/users")]
async fn list_users(
    repository: web::Data<dyn RecordRepository>,
) -> Result<web::Json<Vec<String>>, ApiError> {
    Ok(web::Json(repository.users().await?))
}

#[get("/users/{name}/records")]
async fn user_records(
    repository: web::Data<dyn RecordRepository>,
    name: web::Path<String>,
) -> Result<web::Json<Vec<Record>>, ApiError> {
    Ok(web::Json(repository.query(&name).await?))
}

#[get("/users/{name}/summary")]
async fn user_summary(
    repository: web::Data<dyn RecordRepository>,
    name: web::Path<String>,
    profile: web::Query<ProfileQuery>,
) -> Result<web::Json<Summary>, ApiError> {
    let name = name.into_inner();
    let latest = repository
        .query(&name)
        .await?
        .pop()
        .ok_or(ApiError::NotFound)?;

    let metrics = vitalog_metrics::compute_for_key(
        latest.weight_kg,
        profile.height_cm,
        profile.age,
        profile.sex,
        &profile.activity,
    )?;
    let reference = vitalog_metrics::reference_bands(profile.sex);

    Ok(web::Json(Summary {
        name,
        latest,
        metrics,
        reference,
    }))
}

#[delete("/users/{name}/records/latest")]
async fn delete_latest_record(
    repository: web::Data<dyn RecordRepository>,
    name: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    if repository.delete_latest(&name).await? {
        info!("Deleted latest record for {}", name);
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(ApiError::NotFound)
    }
}

#[delete("/users/{name}")]
async fn delete_user(
    repository: web::Data<dyn RecordRepository>,
    name: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let removed = repository.delete_all(&name).await?;
    if removed > 0 {
        info!("Deleted {} records for {}", removed, name);
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(ApiError::NotFound)
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(submit_record)
        .service(list_users)
        .service(user_records)
        .service(user_summary)
        .service(delete_latest_record)
        .service(delete_user);
}
