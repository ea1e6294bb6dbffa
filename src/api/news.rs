// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! News feed: public reads, admin writes

use std::sync::Arc;

use log::info;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{delete, get, post, put, State};

use super::error::ApiError;
use crate::auth::AdminOnly;
use crate::store::{Article, ArticleDraft, ArticlePatch, NewsStore};

#[get("/news")]
pub fn list_news(news: &State<Arc<NewsStore>>) -> Result<Json<Vec<Article>>, ApiError> {
    Ok(Json(news.list()?))
}

#[get("/news/<id>")]
pub fn get_news(id: &str, news: &State<Arc<NewsStore>>) -> Result<Json<Article>, ApiError> {
    Ok(Json(news.get(id)?))
}

#[post("/news", format = "json", data = "<draft>")]
pub fn create_news(
    admin: AdminOnly,
    draft: Json<ArticleDraft>,
    news: &State<Arc<NewsStore>>,
) -> Result<(Status, Json<Article>), ApiError> {
    let draft = draft.into_inner();
    if draft.title.trim().is_empty() {
        return Err(ApiError::bad_request("Title is required"));
    }
    let article = news.create(draft, &admin.0.user_id)?;
    info!("Article {} published by {}", article.id, admin.0.user_id);
    Ok((Status::Created, Json(article)))
}

#[put("/news/<id>", format = "json", data = "<patch>")]
pub fn update_news(
    _admin: AdminOnly,
    id: &str,
    patch: Json<ArticlePatch>,
    news: &State<Arc<NewsStore>>,
) -> Result<Json<Article>, ApiError> {
    let patch = patch.into_inner();
    if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(ApiError::bad_request("Title must not be empty"));
    }
    Ok(Json(news.update(id, patch)?))
}

#[delete("/news/<id>")]
pub fn delete_news(
    admin: AdminOnly,
    id: &str,
    news: &State<Arc<NewsStore>>,
) -> Result<Status, ApiError> {
    news.delete(id)?;
    info!("Article {} deleted by {}", id, admin.0.user_id);
    Ok(Status::NoContent)
}
