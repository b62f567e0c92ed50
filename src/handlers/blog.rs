//! Blog content routes
//!
//! Unrelated to the identity surface; a read-only content listing served
//! from an in-memory store.

use crate::models::BlogPost;
use crate::utils::ResponseBuilder;
use actix_web::{web, HttpResponse};
use chrono::{TimeZone, Utc};

/// In-memory blog content store shared across requests
#[derive(Clone)]
pub struct BlogStore {
    posts: Vec<BlogPost>,
}

impl BlogStore {
    #[must_use]
    pub fn new(posts: Vec<BlogPost>) -> Self {
        Self { posts }
    }

    /// Seed content served until a real content backend exists
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded timestamps are invalid (should never happen)
    #[must_use]
    pub fn sample() -> Self {
        Self::new(vec![
            BlogPost {
                id: 1,
                title: "Welcome to the blog".to_string(),
                author: "Ann Admin".to_string(),
                body: "First post! More to come.".to_string(),
                posted_at: Utc.with_ymd_and_hms(2023, 1, 15, 9, 30, 0).unwrap(),
            },
            BlogPost {
                id: 2,
                title: "Why we moved our auth to a managed provider".to_string(),
                author: "Ann Admin".to_string(),
                body: "Running your own password storage is a liability.".to_string(),
                posted_at: Utc.with_ymd_and_hms(2023, 2, 2, 17, 5, 0).unwrap(),
            },
        ])
    }

    #[must_use]
    pub fn all(&self) -> &[BlogPost] {
        &self.posts
    }

    #[must_use]
    pub fn find(&self, id: u32) -> Option<&BlogPost> {
        self.posts.iter().find(|post| post.id == id)
    }
}

/// GET /blog
pub async fn list_posts(store: web::Data<BlogStore>) -> HttpResponse {
    ResponseBuilder::ok().json(&store.all())
}

/// GET /blog/{id}
pub async fn get_post(path: web::Path<u32>, store: web::Data<BlogStore>) -> HttpResponse {
    let id = path.into_inner();
    match store.find(id) {
        Some(post) => ResponseBuilder::ok().json(post),
        None => ResponseBuilder::not_found()
            .with_error_code("post_not_found")
            .with_message(&format!("No blog post with id {id}"))
            .build(),
    }
}
