use std::collections::HashMap;
use std::io::Write;

use actix_web::{HttpResponse, HttpServer, get, post, web};
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::integrator::{LlmIntegrator, PromptVariableMap};
use crate::prompts::EVALUATION_PROMPT;
use crate::table::Table;
use crate::triage::{TicketClass, classify};

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub completion: String,
    pub classification: TicketClass,
}

#[get("/health")]
pub async fn health(_: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().body("Ok")
}

/// Batch evaluation: body is the raw CSV upload with `question` and
/// `chat_history` columns. Returns the table augmented with `llm_response`.
#[post("/bots/evaluate_bot")]
pub async fn evaluate_bot(
    body: web::Bytes,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, GatewayError> {
    let table = Table::from_csv_bytes(&body)?;
    let prompt_variables_map: PromptVariableMap = HashMap::from([
        ("question".to_string(), "question".to_string()),
        ("chat_history".to_string(), "chat_history".to_string()),
    ]);
    let integrator = LlmIntegrator::new(
        table,
        prompt_variables_map,
        EVALUATION_PROMPT,
        app_state.client.clone(),
    )?
    .with_max_retry(app_state.max_retry);
    let result = integrator.generate_response_df().await?;
    Ok(HttpResponse::Ok().json(result))
}

#[post("/bots/classify_ticket")]
pub async fn classify_ticket(
    req: web::Json<ClassifyRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, GatewayError> {
    let (completion, classification) =
        classify(app_state.client.as_ref(), &req.description).await?;
    Ok(HttpResponse::Ok().json(ClassifyResponse {
        completion,
        classification,
    }))
}

pub async fn startup(config: GatewayConfig, state: AppState) -> std::io::Result<()> {
    let app_state = web::Data::new(state);

    println!("Starting server at {}:{}", config.host, config.port);

    // default level is info
    env_logger::Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, log::LevelFilter::Info)
        .init();

    HttpServer::new(move || {
        actix_web::App::new()
            .wrap(actix_web::middleware::Logger::default())
            .app_data(app_state.clone())
            .service(health)
            .service(evaluate_bot)
            .service(classify_ticket)
    })
    .bind((config.host, config.port))?
    .run()
    .await?;

    std::io::Result::Ok(())
}
