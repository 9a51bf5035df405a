use std::sync::Arc;

use actix_web::{get, http, post, web, HttpResponse, Responder};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tera::Tera;
use tracing::info;

use crate::error::AppError;
use crate::message_database::{Message, MessageStore};

pub struct AppState {
    pub tera: Tera,
    pub store: Arc<dyn MessageStore>,
}

#[derive(Serialize)]
struct MessageTdo {
    id: i64,
    created_at: String,
    text: String,
}

impl MessageTdo {
    // Convert to something we can use in templates
    fn from_message(msg: &Message) -> MessageTdo {
        let created_at = msg.created_at.with_timezone(&Local);
        let created_at = created_at.format("%d/%m/%Y %H:%M:%S").to_string();
        MessageTdo {
            id: msg.id,
            created_at,
            text: msg.text.clone(),
        }
    }
}

#[derive(Deserialize)]
struct MessageForm {
    #[serde(default)]
    text: String,
}

fn see_other() -> HttpResponse {
    HttpResponse::SeeOther()
        .append_header((http::header::LOCATION, "/"))
        .finish()
}

fn bad_request() -> HttpResponse {
    HttpResponse::BadRequest()
        .content_type("text/plain; charset=utf-8")
        .body("Invalid message id")
}

#[get("/")]
async fn get_index(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let messages = data.store.list().await?;
    let messages: Vec<MessageTdo> = messages.iter().map(MessageTdo::from_message).collect();

    let mut context = tera::Context::new();
    context.insert("messages", &messages);

    let output = data.tera.render("index.html", &context)?;
    Ok(HttpResponse::Ok().body(output))
}

#[get("/time")]
async fn get_time(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let context = tera::Context::new();
    let output = data.tera.render("time.html", &context)?;
    Ok(HttpResponse::Ok().body(output))
}

#[get("/dbtime")]
async fn get_dbtime(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let now = data.store.now().await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "time": now.to_rfc3339() })))
}

#[post("/submit")]
async fn post_submit(
    form: web::Form<MessageForm>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    if !form.text.is_empty() {
        info!("Got message {:?}", form.text);
        data.store.insert(&form.text).await?;
    }

    // Redirect back to home whether or not anything was inserted
    Ok(see_other())
}

#[get("/edit/{id}")]
async fn get_edit(
    path: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id: i64 = match path.parse() {
        Ok(id) => id,
        Err(_) => return Ok(bad_request()),
    };

    let message = match data.store.get(id).await? {
        Some(message) => message,
        None => {
            return Ok(HttpResponse::NotFound()
                .content_type("text/plain; charset=utf-8")
                .body("Message not found"))
        }
    };

    let mut context = tera::Context::new();
    context.insert("message", &MessageTdo::from_message(&message));

    let output = data.tera.render("edit.html", &context)?;
    Ok(HttpResponse::Ok().body(output))
}

#[post("/update/{id}")]
async fn post_update(
    path: web::Path<String>,
    form: web::Form<MessageForm>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id: i64 = match path.parse() {
        Ok(id) => id,
        Err(_) => return Ok(bad_request()),
    };

    if !form.text.is_empty() {
        info!("Updating message {} to {:?}", id, form.text);
        data.store.update(id, &form.text).await?;
    }

    Ok(see_other())
}

#[post("/delete/{id}")]
async fn post_delete(
    path: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id: i64 = match path.parse() {
        Ok(id) => id,
        Err(_) => return Ok(bad_request()),
    };

    info!("Deleting message {}", id);
    data.store.delete(id).await?;
    Ok(see_other())
}

async fn not_found() -> impl Responder {
    HttpResponse::NotFound()
        .content_type("text/plain; charset=utf-8")
        .body("Not Found")
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_index)
        .service(get_time)
        .service(get_dbtime)
        .service(post_submit)
        .service(get_edit)
        .service(post_update)
        .service(post_delete)
        .default_service(web::route().to(not_found));
}
