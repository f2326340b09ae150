//! Post and comment route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use inkpost_core::PostId;

use super::Viewer;
use super::auth::MessageQuery;
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::{CurrentIdentity, RequireOwner};
use crate::models::{CommentWithAuthor, Identity, PostDraft, PostWithAuthor};
use crate::services::posts::{PostError, PostService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Post form data, shared by the new and edit pages.
#[derive(Debug, Default, Deserialize)]
pub struct PostForm {
    pub title: String,
    pub subtitle: String,
    pub img_url: String,
    pub body: String,
}

impl From<PostForm> for PostDraft {
    fn from(form: PostForm) -> Self {
        Self {
            title: form.title,
            subtitle: form.subtitle,
            body: form.body,
            image_reference: form.img_url,
        }
    }
}

/// Comment form data.
#[derive(Debug, Deserialize)]
pub struct CommentForm {
    pub text: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Post listing template.
#[derive(Template, WebTemplate)]
#[template(path = "posts/index.html")]
pub struct IndexTemplate {
    pub viewer: Viewer,
    pub posts: Vec<PostWithAuthor>,
}

/// Single post template.
#[derive(Template, WebTemplate)]
#[template(path = "posts/show.html")]
pub struct ShowTemplate {
    pub viewer: Viewer,
    pub post: PostWithAuthor,
    pub comments: Vec<CommentWithAuthor>,
    pub error: Option<&'static str>,
}

/// New/edit post form template.
#[derive(Template, WebTemplate)]
#[template(path = "posts/form.html")]
pub struct PostFormTemplate {
    pub viewer: Viewer,
    pub heading: &'static str,
    pub action: String,
    pub draft: PostDraft,
    pub error: Option<&'static str>,
}

fn form_message(code: &str) -> Option<&'static str> {
    match code {
        "duplicate_title" => Some("A post with that title already exists."),
        "missing_field" => Some("Every field is required."),
        _ => None,
    }
}

fn comment_message(code: &str) -> Option<&'static str> {
    match code {
        "empty_comment" => Some("Comments can't be empty."),
        _ => None,
    }
}

const fn empty_draft() -> PostDraft {
    PostDraft {
        title: String::new(),
        subtitle: String::new(),
        body: String::new(),
        image_reference: String::new(),
    }
}

// =============================================================================
// Reading
// =============================================================================

/// List every post.
#[instrument(skip(state, identity))]
pub async fn index(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<impl IntoResponse, AppError> {
    let posts = PostService::new(state.pool()).list_posts().await?;

    Ok(IndexTemplate {
        viewer: Viewer::from(&identity),
        posts,
    })
}

/// Show a post with its comments. Unknown ids go back to the listing.
#[instrument(skip(state, identity, query))]
pub async fn show(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(post_id): Path<PostId>,
    Query(query): Query<MessageQuery>,
) -> Result<Response, AppError> {
    let service = PostService::new(state.pool());

    let post = match service.get_post(post_id).await {
        Ok(post) => post,
        Err(PostError::NotFound) => return Ok(Redirect::to("/").into_response()),
        Err(e) => return Err(e.into()),
    };
    let comments = match service.list_comments(post_id).await {
        Ok(comments) => comments,
        Err(PostError::NotFound) => return Ok(Redirect::to("/").into_response()),
        Err(e) => return Err(e.into()),
    };

    Ok(ShowTemplate {
        viewer: Viewer::from(&identity),
        post,
        comments,
        error: query.error.as_deref().and_then(comment_message),
    }
    .into_response())
}

// =============================================================================
// Comments
// =============================================================================

/// Add a comment. Anonymous visitors are sent to the login page.
#[instrument(skip(state, identity, form))]
pub async fn comment(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(post_id): Path<PostId>,
    Form(form): Form<CommentForm>,
) -> Result<Redirect, AppError> {
    match PostService::new(state.pool())
        .add_comment(&identity, post_id, &form.text)
        .await
    {
        Ok(_) => {
            let id = post_id.to_string();
            add_breadcrumb("post", "Comment added", Some(&[("post_id", id.as_str())]));
            Ok(Redirect::to(&format!("/post/{post_id}#comments")))
        }
        Err(PostError::Denied) => Ok(Redirect::to("/login?error=login_to_comment")),
        Err(e @ PostError::Invalid(_)) => Ok(Redirect::to(&format!(
            "/post/{post_id}?error={}",
            e.code()
        ))),
        Err(PostError::NotFound) => Ok(Redirect::to("/")),
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Owner-only management
// =============================================================================

/// Display the new post form.
pub async fn new_post_page(
    RequireOwner(owner): RequireOwner,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    PostFormTemplate {
        viewer: Viewer::from(&owner),
        heading: "New Post",
        action: "/new-post".to_owned(),
        draft: empty_draft(),
        error: query.error.as_deref().and_then(form_message),
    }
}

/// Publish a new post.
#[instrument(skip(state, owner, form))]
pub async fn create(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
    Form(form): Form<PostForm>,
) -> Result<Redirect, AppError> {
    let identity = Identity::from(owner);
    match PostService::new(state.pool())
        .create_post(&identity, form.into())
        .await
    {
        Ok(_) => Ok(Redirect::to("/")),
        Err(e) => post_error_redirect(e, "/new-post"),
    }
}

/// Display the edit form prefilled with the post's current content.
#[instrument(skip(state, owner, query))]
pub async fn edit_page(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
    Path(post_id): Path<PostId>,
    Query(query): Query<MessageQuery>,
) -> Result<Response, AppError> {
    let post = match PostService::new(state.pool()).get_post(post_id).await {
        Ok(post) => post,
        Err(PostError::NotFound) => return Ok(Redirect::to("/").into_response()),
        Err(e) => return Err(e.into()),
    };

    Ok(PostFormTemplate {
        viewer: Viewer::from(&owner),
        heading: "Edit Post",
        action: format!("/edit-post/{post_id}"),
        draft: PostDraft::from(&post.post),
        error: query.error.as_deref().and_then(form_message),
    }
    .into_response())
}

/// Save edits to a post.
#[instrument(skip(state, owner, form))]
pub async fn update(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
    Path(post_id): Path<PostId>,
    Form(form): Form<PostForm>,
) -> Result<Redirect, AppError> {
    let identity = Identity::from(owner);
    match PostService::new(state.pool())
        .edit_post(&identity, post_id, form.into())
        .await
    {
        Ok(post) => Ok(Redirect::to(&format!("/post/{}", post.id))),
        Err(e) => post_error_redirect(e, &format!("/edit-post/{post_id}")),
    }
}

/// Delete a post and its comments.
#[instrument(skip(state, owner))]
pub async fn delete(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
    Path(post_id): Path<PostId>,
) -> Result<Redirect, AppError> {
    let identity = Identity::from(owner);
    match PostService::new(state.pool())
        .delete_post(&identity, post_id)
        .await
    {
        Ok(()) => Ok(Redirect::to("/")),
        Err(e) => post_error_redirect(e, "/"),
    }
}

/// Map a failed owner action to where the browser should go next.
fn post_error_redirect(err: PostError, form_path: &str) -> Result<Redirect, AppError> {
    match err {
        PostError::Denied => Ok(Redirect::to("/forbidden")),
        PostError::NotFound => Ok(Redirect::to("/")),
        PostError::DuplicateTitle | PostError::Invalid(_) => Ok(Redirect::to(&format!(
            "{form_path}?error={}",
            err.code()
        ))),
        PostError::Repository(_) => Err(err.into()),
    }
}
