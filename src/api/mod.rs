// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! JSON API, mounted under `/api`
//!
//! | Route | Access |
//! |-------|--------|
//! | `POST /login`, `POST /register` | public |
//! | `POST /logout`, `GET /me` | any valid token |
//! | `GET /news`, `GET /news/<id>`, `GET /files`, `GET /files/<id>` | public |
//! | news and file writes, everything under `/users` | administrator token |

pub mod error;
pub mod files;
pub mod news;
pub mod session;
pub mod users;

pub use error::{ApiError, ErrorBody};
pub use session::{LoginRequest, LoginResponse};
pub use users::UserView;

use rocket::{routes, Route};

/// All API routes
pub fn routes() -> Vec<Route> {
    routes![
        session::login,
        session::logout,
        session::register,
        session::me,
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        news::list_news,
        news::get_news,
        news::create_news,
        news::update_news,
        news::delete_news,
        files::list_files,
        files::download_file,
        files::upload_file,
        files::delete_file,
    ]
}
