use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
    routing::{get, post, put},
};

use crate::AppState;
use crate::handlers::{auth, oil_changes, profiles, services, taxonomy, users, vehicles};
use crate::middleware::auth::auth_middleware;
use crate::policy::{Resource, enforce};

pub fn create_router(state: AppState) -> Router {
    // Public routes
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    // Taxonomy reads are open to anyone
    let taxonomy_public = Router::new()
        .route("/types", get(taxonomy::list_types))
        .route("/types/{type_id}", get(taxonomy::get_type))
        .route("/types/{type_id}/brands", get(taxonomy::list_brands))
        .route("/types/{type_id}/brands/{brand_id}", get(taxonomy::get_brand))
        .route(
            "/types/{type_id}/brands/{brand_id}/models",
            get(taxonomy::list_models),
        )
        .route(
            "/types/{type_id}/brands/{brand_id}/models/{id}",
            get(taxonomy::get_model),
        );

    // Taxonomy writes (admin, via the policy gate)
    let taxonomy_admin = Router::new()
        .route("/types", post(taxonomy::create_type))
        .route(
            "/types/{type_id}",
            put(taxonomy::update_type).delete(taxonomy::delete_type),
        )
        .route("/types/{type_id}/brands", post(taxonomy::create_brand))
        .route(
            "/types/{type_id}/brands/{brand_id}",
            put(taxonomy::update_brand).delete(taxonomy::delete_brand),
        )
        .route(
            "/types/{type_id}/brands/{brand_id}/models",
            post(taxonomy::create_model),
        )
        .route(
            "/types/{type_id}/brands/{brand_id}/models/{id}",
            put(taxonomy::update_model).delete(taxonomy::delete_model),
        )
        .layer(middleware::from_fn(|req: Request, next: Next| {
            enforce(Resource::Taxonomy, req, next)
        }))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // The caller's vehicles
    let vehicle_routes = Router::new()
        .route("/me", get(vehicles::list_vehicles).post(vehicles::create_vehicle))
        .route(
            "/me/{id}",
            get(vehicles::get_vehicle)
                .put(vehicles::update_vehicle)
                .delete(vehicles::delete_vehicle),
        )
        .layer(middleware::from_fn(|req: Request, next: Next| {
            enforce(Resource::Vehicles, req, next)
        }))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Services, flat and nested under a vehicle
    let service_routes = Router::new()
        .route(
            "/services",
            get(services::list_services).post(services::create_service),
        )
        .route(
            "/services/{service_id}",
            get(services::get_service)
                .put(services::update_service)
                .delete(services::delete_service),
        )
        .route(
            "/vehicles/{vehicle_id}/services",
            get(services::list_vehicle_services).post(services::create_vehicle_service),
        )
        .layer(middleware::from_fn(|req: Request, next: Next| {
            enforce(Resource::Services, req, next)
        }))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Oil changes nested under a service
    let oil_change_routes = Router::new()
        .route(
            "/services/{service_id}/oil-changes",
            get(oil_changes::list_oil_changes).post(oil_changes::create_oil_change),
        )
        .route(
            "/services/{service_id}/oil-changes/{id}",
            get(oil_changes::get_oil_change)
                .put(oil_changes::update_oil_change)
                .delete(oil_changes::delete_oil_change),
        )
        .layer(middleware::from_fn(|req: Request, next: Next| {
            enforce(Resource::OilChanges, req, next)
        }))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // User directory (admin) and self lookup
    let user_list_routes = Router::new()
        .route("/users", get(users::list_users))
        .layer(middleware::from_fn(|req: Request, next: Next| {
            enforce(Resource::Directory, req, next)
        }))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let user_self_routes = Router::new()
        .route("/users/{id}", get(users::get_user))
        .layer(middleware::from_fn(|req: Request, next: Next| {
            enforce(Resource::Account, req, next)
        }))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // The caller's profile
    let profile_routes = Router::new()
        .route(
            "/profiles/me",
            get(profiles::me).put(profiles::update_me),
        )
        .layer(middleware::from_fn(|req: Request, next: Next| {
            enforce(Resource::Profile, req, next)
        }))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest(
            "/api",
            taxonomy_public
                .merge(taxonomy_admin)
                .merge(vehicle_routes)
                .merge(service_routes)
                .merge(oil_change_routes)
                .merge(user_list_routes)
                .merge(user_self_routes)
                .merge(profile_routes),
        )
        .with_state(state)
}
