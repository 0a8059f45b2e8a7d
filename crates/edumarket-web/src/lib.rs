//! Axum + Askama web UI for the EduMarket course catalog.
//!
//! Presentation only: filtering and assistant replies come from
//! `edumarket-engine`, mutable session state lives in `edumarket-storage`,
//! and suggestions arrive through the `SuggestionSource` capability so tests
//! can inject a deterministic fake.

use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Form, Path as AxumPath, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use edumarket_core::{
    format_vnd, Author, ChatMessage, Course, ALL_CATEGORIES, CATEGORIES, PRICE_RANGES,
};
use edumarket_engine::{filter_catalog, respond, FilterQuery, PriceSelector, GREETING};
use edumarket_storage::SessionStore;
use edumarket_suggest::{SuggestionSource, DEFAULT_USER};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::info;

pub const CRATE_NAME: &str = "edumarket-web";

pub struct AppState {
    pub catalog: Vec<Course>,
    pub store: Mutex<SessionStore>,
    pub suggestions: Arc<dyn SuggestionSource>,
    pub conversation: Mutex<Vec<ChatMessage>>,
}

impl AppState {
    /// Seeds the session conversation with the assistant greeting.
    pub fn new(
        catalog: Vec<Course>,
        store: SessionStore,
        suggestions: Arc<dyn SuggestionSource>,
    ) -> Self {
        let greeting = ChatMessage::new(Author::Assistant, GREETING, vec![]);
        Self {
            catalog,
            store: Mutex::new(store),
            suggestions,
            conversation: Mutex::new(vec![greeting]),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
struct CatalogParams {
    q: Option<String>,
    price: Option<String>,
    category: Option<String>,
}

impl CatalogParams {
    fn to_filter_query(&self) -> FilterQuery {
        FilterQuery {
            search: self.q.clone().unwrap_or_default(),
            price: PriceSelector::parse(self.price.as_deref().unwrap_or("all")),
            category: self
                .category
                .clone()
                .unwrap_or_else(|| ALL_CATEGORIES.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FavoriteForm {
    #[serde(default)]
    next: String,
}

#[derive(Debug, Deserialize)]
struct ChatForm {
    message: String,
}

#[derive(Debug, Deserialize, Default)]
struct SuggestParams {
    user: Option<String>,
}

/// Display-ready course row shared by the catalog grid, favorites, history,
/// chat attachments, and suggestions.
#[derive(Debug, Clone)]
struct CourseCardView {
    id: String,
    title: String,
    instructor: String,
    image: String,
    short_description: String,
    price_text: String,
    original_price_text: String,
    discount_text: String,
    rating_text: String,
    review_count: u64,
    duration: String,
    level: String,
    category: String,
    is_favorite: bool,
}

fn card_view(course: &Course, store: &SessionStore) -> CourseCardView {
    CourseCardView {
        id: course.id.clone(),
        title: course.title.clone(),
        instructor: course.instructor.clone(),
        image: course.image.clone(),
        short_description: course.short_description.clone(),
        price_text: format_vnd(course.price),
        original_price_text: course.original_price.map(format_vnd).unwrap_or_default(),
        discount_text: course
            .discount_percent()
            .map(|p| format!("-{p}%"))
            .unwrap_or_default(),
        rating_text: format!("{:.1}", course.rating),
        review_count: course.review_count,
        duration: course.duration.clone(),
        level: course.level.as_str().to_string(),
        category: course.category.clone(),
        is_favorite: store.is_favorite(&course.id),
    }
}

fn card_views(courses: &[Course], store: &SessionStore) -> Vec<CourseCardView> {
    courses.iter().map(|course| card_view(course, store)).collect()
}

#[derive(Debug, Clone)]
struct FilterOptionView {
    value: String,
    label: String,
    selected: bool,
}

#[derive(Debug, Clone)]
struct ChatEntryView {
    is_user: bool,
    text: String,
    time_text: String,
    cards: Vec<CourseCardView>,
}

#[derive(Template)]
#[template(path = "catalog.html")]
struct CatalogTemplate {
    search: String,
    price_options: Vec<FilterOptionView>,
    category_options: Vec<FilterOptionView>,
    cards: Vec<CourseCardView>,
    total: usize,
    favorites_count: usize,
    history_count: usize,
}

#[derive(Template)]
#[template(path = "course_detail.html")]
struct CourseDetailTemplate {
    card: CourseCardView,
    long_description: String,
    skills_text: String,
    language: String,
    last_updated_text: String,
    students_text: String,
    certificate_text: String,
}

#[derive(Template)]
#[template(path = "favorites.html")]
struct FavoritesTemplate {
    cards: Vec<CourseCardView>,
}

#[derive(Template)]
#[template(path = "history.html")]
struct HistoryTemplate {
    cards: Vec<CourseCardView>,
}

#[derive(Template)]
#[template(path = "chat.html")]
struct ChatTemplate {
    entries: Vec<ChatEntryView>,
}

#[derive(Template)]
#[template(path = "suggestions.html")]
struct SuggestionsTemplate {
    user_id: String,
    error_text: String,
    cards: Vec<CourseCardView>,
}

#[derive(Template)]
#[template(path = "not_found.html")]
struct NotFoundTemplate {}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(catalog_handler))
        .route("/courses/{id}", get(course_detail_handler))
        .route("/courses/{id}/favorite", post(toggle_favorite_handler))
        .route("/favorites", get(favorites_handler))
        .route("/history", get(history_handler))
        .route("/chat", get(chat_handler).post(chat_send_handler))
        .route("/suggestions", get(suggestions_handler))
        .route("/api/courses", get(api_courses_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>, port: u16) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "serving EduMarket web UI");
    axum::serve(listener, app(state)).await?;
    Ok(())
}

async fn catalog_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CatalogParams>,
) -> Response {
    let query = params.to_filter_query();
    let filtered = filter_catalog(&state.catalog, &query);

    let store = state.store.lock().await;
    let price_options = PRICE_RANGES
        .iter()
        .enumerate()
        .map(|(idx, range)| {
            // Index 0 is the sentinel; buckets are offsets past it.
            let value = if idx == 0 {
                "all".to_string()
            } else {
                (idx - 1).to_string()
            };
            FilterOptionView {
                selected: match query.price {
                    PriceSelector::All => idx == 0,
                    PriceSelector::Bucket(offset) => idx == offset + 1,
                },
                value,
                label: range.label.to_string(),
            }
        })
        .collect();
    let category_options = CATEGORIES
        .iter()
        .map(|name| FilterOptionView {
            value: name.to_string(),
            label: name.to_string(),
            selected: query.category == *name,
        })
        .collect();

    render_html(CatalogTemplate {
        search: query.search.clone(),
        price_options,
        category_options,
        total: filtered.len(),
        cards: card_views(&filtered, &store),
        favorites_count: store.favorites().len(),
        history_count: store.history().len(),
    })
}

async fn course_detail_handler(
    State(state): State<Arc<AppState>>,
    AxumPath(id): AxumPath<String>,
) -> Response {
    let Some(course) = state.catalog.iter().find(|c| c.id == id).cloned() else {
        return not_found_handler().await;
    };

    let mut store = state.store.lock().await;
    if let Err(err) = store.record_view(&course).await {
        return server_error(err.into());
    }
    store.select_course(course.clone());

    render_html(CourseDetailTemplate {
        card: card_view(&course, &store),
        long_description: course.long_description.clone(),
        skills_text: course.skills.join(", "),
        language: course.language.clone(),
        last_updated_text: course.last_updated.format("%d/%m/%Y").to_string(),
        students_text: course.students.to_string(),
        certificate_text: if course.certificate {
            "Có chứng chỉ hoàn thành".to_string()
        } else {
            "Không cấp chứng chỉ".to_string()
        },
    })
}

async fn toggle_favorite_handler(
    State(state): State<Arc<AppState>>,
    AxumPath(id): AxumPath<String>,
    Form(form): Form<FavoriteForm>,
) -> Response {
    if !state.catalog.iter().any(|c| c.id == id) {
        return not_found_handler().await;
    }

    let mut store = state.store.lock().await;
    if let Err(err) = store.toggle_favorite(&id).await {
        return server_error(err.into());
    }

    // Only same-site paths are followed back.
    let next = if form.next.starts_with('/') {
        form.next.as_str()
    } else {
        "/"
    };
    Redirect::to(next).into_response()
}

async fn favorites_handler(State(state): State<Arc<AppState>>) -> Response {
    let store = state.store.lock().await;
    let favorites = store.favorite_courses(&state.catalog);
    render_html(FavoritesTemplate {
        cards: card_views(&favorites, &store),
    })
}

async fn history_handler(State(state): State<Arc<AppState>>) -> Response {
    let store = state.store.lock().await;
    let history = store.history().to_vec();
    render_html(HistoryTemplate {
        cards: card_views(&history, &store),
    })
}

async fn chat_handler(State(state): State<Arc<AppState>>) -> Response {
    let store = state.store.lock().await;
    let conversation = state.conversation.lock().await;
    let entries = conversation
        .iter()
        .map(|message| ChatEntryView {
            is_user: message.author == Author::User,
            text: message.text.clone(),
            time_text: message.sent_at.format("%H:%M").to_string(),
            cards: card_views(&message.courses, &store),
        })
        .collect();
    render_html(ChatTemplate { entries })
}

async fn chat_send_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ChatForm>,
) -> Response {
    let message = form.message.trim();
    if !message.is_empty() {
        let reply = respond(message, &state.catalog);
        let mut conversation = state.conversation.lock().await;
        conversation.push(ChatMessage::new(Author::User, message, vec![]));
        conversation.push(ChatMessage::new(Author::Assistant, reply.text, reply.courses));
    }
    Redirect::to("/chat").into_response()
}

async fn suggestions_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SuggestParams>,
) -> Response {
    let user_id = params.user.unwrap_or_else(|| DEFAULT_USER.to_string());
    match state.suggestions.fetch_suggestions(&user_id).await {
        Ok(courses) => {
            let store = state.store.lock().await;
            render_html(SuggestionsTemplate {
                user_id,
                error_text: String::new(),
                cards: card_views(&courses, &store),
            })
        }
        // Degrades to the retry view, never a crash.
        Err(_) => render_html(SuggestionsTemplate {
            user_id,
            error_text: "Không thể lấy gợi ý lúc này. Vui lòng thử lại sau.".to_string(),
            cards: vec![],
        }),
    }
}

async fn api_courses_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CatalogParams>,
) -> Response {
    let filtered = filter_catalog(&state.catalog, &params.to_filter_query());
    Json(serde_json::json!({
        "total": filtered.len(),
        "courses": filtered,
    }))
    .into_response()
}

async fn not_found_handler() -> Response {
    let body = match (NotFoundTemplate {}).render() {
        Ok(html) => html,
        Err(err) => return server_error(anyhow::anyhow!(err.to_string())),
    };
    (StatusCode::NOT_FOUND, Html(body)).into_response()
}

fn render_html<T: Template>(tpl: T) -> Response {
    match tpl.render() {
        Ok(html) => Html(html).into_response(),
        Err(err) => server_error(anyhow::anyhow!(err.to_string())),
    }
}

fn server_error(err: anyhow::Error) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(format!("Server error: {}", err)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use edumarket_core::seed_catalog;
    use edumarket_suggest::FixedSuggestionSource;
    use http_body_util::BodyExt;
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn test_state(suggestions: Arc<dyn SuggestionSource>) -> (TempDir, Arc<AppState>) {
        let dir = TempDir::new().expect("tempdir");
        let store = SessionStore::load(dir.path()).await.expect("store");
        let state = Arc::new(AppState::new(seed_catalog(), store, suggestions));
        (dir, state)
    }

    async fn fixed_state() -> (TempDir, Arc<AppState>) {
        test_state(Arc::new(FixedSuggestionSource::succeeding(
            seed_catalog()[..2].to_vec(),
        )))
        .await
    }

    async fn get_text(state: Arc<AppState>, uri: &str) -> (StatusCode, String) {
        let resp = app(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn post_form(state: Arc<AppState>, uri: &str, body: &'static str) -> StatusCode {
        let resp = app(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        resp.status()
    }

    #[tokio::test]
    async fn catalog_page_lists_the_full_catalog() {
        let (_dir, state) = fixed_state().await;
        let (status, body) = get_text(state, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("EduMarket"));
        assert!(body.contains("Tìm thấy 8 khóa học"));
        assert!(body.contains("React &amp; TypeScript - Complete Developer Course"));
    }

    #[tokio::test]
    async fn catalog_page_applies_query_filters() {
        let (_dir, state) = fixed_state().await;
        let (status, body) =
            get_text(state.clone(), "/?category=Programming&price=all&q=").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Tìm thấy 1 khóa học"));

        let (_, body) = get_text(state, "/?q=zzz-no-such-course").await;
        assert!(body.contains("Không tìm thấy khóa học phù hợp"));
        assert!(body.contains("Xóa bộ lọc"));
    }

    #[tokio::test]
    async fn detail_page_records_view_history() {
        let (_dir, state) = fixed_state().await;
        let (status, body) = get_text(state.clone(), "/courses/2").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Redux"));

        let (_, history) = get_text(state.clone(), "/history").await;
        assert!(history.contains("React &amp; TypeScript - Complete Developer Course"));

        let store = state.store.lock().await;
        assert_eq!(store.history().len(), 1);
        assert_eq!(store.selected().map(|c| c.id.as_str()), Some("2"));
    }

    #[tokio::test]
    async fn unknown_course_and_unknown_path_render_not_found() {
        let (_dir, state) = fixed_state().await;
        let (status, body) = get_text(state.clone(), "/courses/999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Không tìm thấy trang"));

        let (status, _) = get_text(state, "/definitely/not/a/page").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn favorite_toggle_round_trips_through_the_favorites_page() {
        let (_dir, state) = fixed_state().await;
        let status = post_form(state.clone(), "/courses/2/favorite", "next=%2Ffavorites").await;
        assert_eq!(status, StatusCode::SEE_OTHER);

        let (_, favorites) = get_text(state.clone(), "/favorites").await;
        assert!(favorites.contains("React &amp; TypeScript - Complete Developer Course"));

        // Toggling again removes it.
        post_form(state.clone(), "/courses/2/favorite", "next=%2F").await;
        let (_, favorites) = get_text(state.clone(), "/favorites").await;
        assert!(favorites.contains("Chưa có khóa học yêu thích"));
    }

    #[tokio::test]
    async fn favorite_redirect_rejects_offsite_targets() {
        let (_dir, state) = fixed_state().await;
        let resp = app(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/courses/1/favorite")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("next=https%3A%2F%2Fevil.example"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[header::LOCATION].to_str().unwrap(), "/");
    }

    #[tokio::test]
    async fn chat_page_opens_with_the_greeting() {
        let (_dir, state) = fixed_state().await;
        let (status, body) = get_text(state, "/chat").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Xin chào! Tôi là AI Assistant của EduMarket."));
    }

    #[tokio::test]
    async fn chat_send_appends_user_message_and_reply() {
        let (_dir, state) = fixed_state().await;
        let status = post_form(state.clone(), "/chat", "message=programming").await;
        assert_eq!(status, StatusCode::SEE_OTHER);

        let (_, body) = get_text(state.clone(), "/chat").await;
        assert!(body.contains("programming"));
        assert!(body.contains("khóa học lập trình được đánh giá cao"));

        let conversation = state.conversation.lock().await;
        assert_eq!(conversation.len(), 3);
    }

    #[tokio::test]
    async fn blank_chat_message_is_ignored() {
        let (_dir, state) = fixed_state().await;
        let status = post_form(state.clone(), "/chat", "message=+++").await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        let conversation = state.conversation.lock().await;
        assert_eq!(conversation.len(), 1);
    }

    #[tokio::test]
    async fn suggestions_page_renders_injected_courses() {
        let (_dir, state) = fixed_state().await;
        let (status, body) = get_text(state, "/suggestions?user=user123").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Complete English Conversation with Native Americans"));
    }

    #[tokio::test]
    async fn failed_suggestions_degrade_to_retry_view() {
        let (_dir, state) = test_state(Arc::new(FixedSuggestionSource::failing())).await;
        let (status, body) = get_text(state, "/suggestions").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Không thể lấy gợi ý lúc này"));
        assert!(body.contains("Thử lại"));
    }

    #[tokio::test]
    async fn api_courses_returns_filtered_json() {
        let (_dir, state) = fixed_state().await;
        let resp = app(state)
            .oneshot(
                Request::builder()
                    .uri("/api/courses?category=Design")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["total"], 1);
        assert_eq!(value["courses"][0]["id"], "4");
    }
}
