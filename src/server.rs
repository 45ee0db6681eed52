use crate::{error::PosterError, handler::PosterHandler};
use actix_web::{
    http::StatusCode, web, App, HttpResponse, HttpServer, Responder, ResponseError,
};
use serde_json::{json, Value};

impl ResponseError for PosterError {
    fn status_code(&self) -> StatusCode {
        match self {
            PosterError::MissingField(_) => StatusCode::BAD_REQUEST,
            PosterError::InferenceError(_) | PosterError::StorageError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Generic body only; the cause stays in the logs.
    fn error_response(&self) -> HttpResponse {
        let message = match self {
            PosterError::MissingField(field) => format!("missing required field '{}'", field),
            _ => "internal server error".to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}

async fn create_poster(
    handler: web::Data<PosterHandler>,
    event: web::Json<Value>,
) -> Result<HttpResponse, PosterError> {
    let envelope = handler.handle(&event).await.inspect_err(|e| {
        if !e.is_backend() {
            log::warn!("Rejected request: {}", e);
        }
    })?;
    Ok(HttpResponse::Ok().json(envelope))
}

async fn health() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/posters", web::post().to(create_poster))
        .route("/health", web::get().to(health));
}

pub async fn run(handler: PosterHandler, port: u16) -> std::io::Result<()> {
    let data = web::Data::new(handler);

    log::info!("🌐 Listening on http://0.0.0.0:{}", port);

    HttpServer::new(move || App::new().app_data(data.clone()).configure(configure))
        .bind(("0.0.0.0", port))?
        .run()
        .await
}
