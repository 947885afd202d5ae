use actix_web::{
    delete, get,
    http::header::{Charset, ContentDisposition, DispositionParam, DispositionType, ExtendedValue},
    post, web, HttpResponse,
};
use uuid::Uuid;

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::{
        request::{CreateSessionRequest, GenerateQuizRequest, ImportQuizRequest, SelectOptionRequest},
        response::{DeleteSessionResponse, GenerationStartedResponse},
    },
    services::import_service::ascii_file_name,
};

#[post("/api/sessions")]
async fn create_session(
    state: web::Data<AppState>,
    request: Option<web::Json<CreateSessionRequest>>,
) -> Result<HttpResponse, AppError> {
    let language = request.and_then(|r| r.into_inner().language);
    let view = state.session_service.create_session(language).await;
    Ok(HttpResponse::Created().json(view))
}

#[get("/api/sessions/{id}")]
async fn get_session(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let view = state.session_service.get_view(&id).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[delete("/api/sessions/{id}")]
async fn delete_session(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    state.session_service.delete_session(&id).await?;
    Ok(HttpResponse::Ok().json(DeleteSessionResponse {
        message: format!("Session '{}' deleted", id),
    }))
}

#[post("/api/sessions/{id}/generate")]
async fn generate_quiz(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    request: web::Json<GenerateQuizRequest>,
) -> Result<HttpResponse, AppError> {
    let session_id = id.into_inner();
    let handle = state
        .session_service
        .start_generation(session_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Accepted().json(GenerationStartedResponse {
        session_id,
        attempt_id: handle.attempt_id,
    }))
}

#[post("/api/sessions/{id}/import")]
async fn import_quiz(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    request: web::Json<ImportQuizRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state
        .session_service
        .import_snapshots(id.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/api/sessions/{id}/select")]
async fn select_option(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    request: web::Json<SelectOptionRequest>,
) -> Result<HttpResponse, AppError> {
    let view = state
        .session_service
        .select_option(id.into_inner(), request.option_index)
        .await?;
    Ok(HttpResponse::Ok().json(view))
}

#[post("/api/sessions/{id}/confirm")]
async fn confirm_answer(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let view = state.session_service.confirm(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[post("/api/sessions/{id}/next")]
async fn next_question(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let view = state.session_service.advance(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[post("/api/sessions/{id}/retry")]
async fn retry_incorrect(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let view = state.session_service.retry_incorrect(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[post("/api/sessions/{id}/restart")]
async fn restart_session(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let view = state.session_service.restart(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[get("/api/sessions/{id}/export")]
async fn export_quiz(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let exported = state.session_service.export(&id).await?;
    let disposition = ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![
            DispositionParam::Filename(ascii_file_name(&exported.file_name)),
            DispositionParam::FilenameExt(ExtendedValue {
                charset: Charset::Ext("UTF-8".to_owned()),
                language_tag: None,
                value: exported.file_name.into_bytes(),
            }),
        ],
    };
    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .insert_header(disposition)
        .body(exported.body))
}

#[get("/health")]
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(create_session)
        .service(get_session)
        .service(delete_session)
        .service(generate_quiz)
        .service(import_quiz)
        .service(select_option)
        .service(confirm_answer)
        .service(next_question)
        .service(retry_incorrect)
        .service(restart_session)
        .service(export_quiz);
}
