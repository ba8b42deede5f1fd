use actix_web::{HttpResponse, web};

use crate::database::models::CreateUserInput;
use crate::database::repositories::UserRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;

/// Provision a user ahead of first chat contact (admin use)
pub async fn register_user(
    users: web::Data<UserRepository>,
    input: web::Json<CreateUserInput>,
) -> Result<HttpResponse, AppError> {
    let input = input.into_inner();

    if input.chat_id.is_empty() || input.name.is_empty() {
        return Err(AppError::BadRequest(
            "chat_id and name are required".to_string(),
        ));
    }

    if users.find_by_chat_id(&input.chat_id).await?.is_some() {
        return Err(AppError::BadRequest(format!(
            "a user with chat id {} already exists",
            input.chat_id
        )));
    }

    let user = users.create(input).await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(user)))
}

pub async fn list_users(users: web::Data<UserRepository>) -> Result<HttpResponse, AppError> {
    let all = users.list_all().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(all)))
}
