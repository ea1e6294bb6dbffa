// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! News feed

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{snapshot, StoreError};

/// A published article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub body: String,
    /// Id of the user who created the article
    pub author_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Content of a new article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleDraft {
    pub title: String,
    pub body: String,
}

/// Partial update of an article; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// In-memory article store with optional JSON snapshot
pub struct NewsStore {
    articles: RwLock<BTreeMap<String, Article>>,
    snapshot: Option<PathBuf>,
}

impl NewsStore {
    pub fn new() -> Self {
        NewsStore {
            articles: RwLock::new(BTreeMap::new()),
            snapshot: None,
        }
    }

    pub fn open(path: Option<PathBuf>) -> Result<Self, StoreError> {
        Ok(NewsStore {
            articles: RwLock::new(snapshot::load(path.as_deref())?),
            snapshot: path,
        })
    }

    /// All articles, newest first
    pub fn list(&self) -> Result<Vec<Article>, StoreError> {
        let articles = self.articles.read().map_err(|_| StoreError::Poisoned("news"))?;
        let mut list: Vec<Article> = articles.values().cloned().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    pub fn get(&self, id: &str) -> Result<Article, StoreError> {
        let articles = self.articles.read().map_err(|_| StoreError::Poisoned("news"))?;
        articles
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("article", id))
    }

    pub fn create(&self, draft: ArticleDraft, author_id: &str) -> Result<Article, StoreError> {
        let now = Utc::now();
        let article = Article {
            id: uuid::Uuid::new_v4().to_string(),
            title: draft.title,
            body: draft.body,
            author_id: author_id.to_string(),
            created_at: now,
            updated_at: now,
        };
        let mut articles = self.articles.write().map_err(|_| StoreError::Poisoned("news"))?;
        snapshot::commit(self.snapshot.as_deref(), &mut *articles, |articles| {
            articles.insert(article.id.clone(), article.clone());
            Ok(())
        })?;
        Ok(article)
    }

    pub fn update(&self, id: &str, patch: ArticlePatch) -> Result<Article, StoreError> {
        let mut articles = self.articles.write().map_err(|_| StoreError::Poisoned("news"))?;
        snapshot::commit(self.snapshot.as_deref(), &mut *articles, |articles| {
            let article = articles
                .get_mut(id)
                .ok_or_else(|| StoreError::not_found("article", id))?;
            if let Some(title) = patch.title {
                article.title = title;
            }
            if let Some(body) = patch.body {
                article.body = body;
            }
            article.updated_at = Utc::now();
            Ok(article.clone())
        })
    }

    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut articles = self.articles.write().map_err(|_| StoreError::Poisoned("news"))?;
        snapshot::commit(self.snapshot.as_deref(), &mut *articles, |articles| {
            articles
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| StoreError::not_found("article", id))
        })
    }
}

impl Default for NewsStore {
    fn default() -> Self {
        Self::new()
    }
}
