//! API route table
//!
//! Every collection gets the same CRUD routes plus its search endpoint.
//! `/auth/login` and `/health` are the only public routes; everything else
//! sits behind the bearer-token middleware.

use axum::routing::{get, post};
use axum::{Router, middleware};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::entities::{
    Brand, Category, Permission, Product, Provider, Role, Sale, Stocktaking, User,
};
use crate::server::AppState;
use crate::server::handlers::{
    create, fetch, health, list, login, lookup_user, remove, search_permissions, search_products,
    search_sales, search_stocktakings, update,
};
use crate::server::middleware::require_auth;

pub fn api_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/products", get(list::<Product>).post(create::<Product>))
        .route("/products/search", get(search_products))
        .route(
            "/products/{id}",
            get(fetch::<Product>)
                .put(update::<Product>)
                .delete(remove::<Product>),
        )
        .route("/brands", get(list::<Brand>).post(create::<Brand>))
        .route(
            "/brands/{id}",
            get(fetch::<Brand>)
                .put(update::<Brand>)
                .delete(remove::<Brand>),
        )
        .route("/categories", get(list::<Category>).post(create::<Category>))
        .route(
            "/categories/{id}",
            get(fetch::<Category>)
                .put(update::<Category>)
                .delete(remove::<Category>),
        )
        .route("/providers", get(list::<Provider>).post(create::<Provider>))
        .route(
            "/providers/{id}",
            get(fetch::<Provider>)
                .put(update::<Provider>)
                .delete(remove::<Provider>),
        )
        .route("/sales", get(list::<Sale>).post(create::<Sale>))
        .route("/sales/search", get(search_sales))
        .route(
            "/sales/{id}",
            get(fetch::<Sale>).put(update::<Sale>).delete(remove::<Sale>),
        )
        .route(
            "/stocktakings",
            get(list::<Stocktaking>).post(create::<Stocktaking>),
        )
        .route("/stocktakings/search", get(search_stocktakings))
        .route(
            "/stocktakings/{id}",
            get(fetch::<Stocktaking>)
                .put(update::<Stocktaking>)
                .delete(remove::<Stocktaking>),
        )
        .route("/users", get(list::<User>).post(create::<User>))
        .route("/users/lookup", get(lookup_user))
        .route(
            "/users/{id}",
            get(fetch::<User>).put(update::<User>).delete(remove::<User>),
        )
        .route("/roles", get(list::<Role>).post(create::<Role>))
        .route(
            "/roles/{id}",
            get(fetch::<Role>).put(update::<Role>).delete(remove::<Role>),
        )
        .route(
            "/permissions",
            get(list::<Permission>).post(create::<Permission>),
        )
        .route("/permissions/search", get(search_permissions))
        .route(
            "/permissions/{id}",
            get(fetch::<Permission>)
                .put(update::<Permission>)
                .delete(remove::<Permission>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.verifier.clone(),
            require_auth,
        ));

    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(login));

    Router::new()
        .nest("/api/v1", protected.merge(public))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
