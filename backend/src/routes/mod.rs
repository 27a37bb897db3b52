//! Route definitions for the Tradebook API

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes
        .nest("/users", user_routes())
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/customers", customer_routes())
        .nest("/suppliers", supplier_routes())
        .nest("/invoices", invoice_routes())
        .nest("/payments", payment_routes())
        .nest("/stock", stock_routes())
        .nest("/ledger", ledger_routes())
        .nest("/reports", report_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route(
            "/me",
            get(handlers::auth::me).route_layer(middleware::from_fn(auth_middleware)),
        )
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::auth::list_users))
        .route("/:id", delete(handlers::auth::delete_user))
        .route_layer(middleware::from_fn(auth_middleware))
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::catalog::list_products).post(handlers::catalog::create_product),
        )
        .route(
            "/:id",
            get(handlers::catalog::get_product)
                .put(handlers::catalog::update_product)
                .delete(handlers::catalog::delete_product),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

fn category_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::catalog::list_categories).post(handlers::catalog::create_category),
        )
        .route(
            "/:id",
            put(handlers::catalog::update_category).delete(handlers::catalog::delete_category),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

fn customer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::party::list_customers).post(handlers::party::create_customer),
        )
        .route(
            "/:id",
            get(handlers::party::get_customer)
                .put(handlers::party::update_customer)
                .delete(handlers::party::delete_customer),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::party::list_suppliers).post(handlers::party::create_supplier),
        )
        .route(
            "/:id",
            get(handlers::party::get_supplier)
                .put(handlers::party::update_supplier)
                .delete(handlers::party::delete_supplier),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

fn invoice_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/purchases",
            get(handlers::invoice::list_purchases).post(handlers::invoice::create_purchase),
        )
        .route("/purchases/:id", get(handlers::invoice::get_purchase))
        .route(
            "/sales",
            get(handlers::invoice::list_sales).post(handlers::invoice::create_sale),
        )
        .route("/sales/:id", get(handlers::invoice::get_sale))
        .route_layer(middleware::from_fn(auth_middleware))
}

fn payment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/customers",
            get(handlers::payment::list_customer_payments)
                .post(handlers::payment::record_customer_payment),
        )
        .route(
            "/suppliers",
            get(handlers::payment::list_supplier_payments)
                .post(handlers::payment::record_supplier_payment),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/valuation", get(handlers::stock::valuation))
        .route("/valuation.csv", get(handlers::stock::valuation_csv))
        .route("/reconcile", post(handlers::stock::reconcile))
        .route_layer(middleware::from_fn(auth_middleware))
}

fn ledger_routes() -> Router<AppState> {
    Router::new()
        .route("/customers/:id", get(handlers::ledger::customer_statement))
        .route("/suppliers/:id", get(handlers::ledger::supplier_statement))
        .route_layer(middleware::from_fn(auth_middleware))
}

fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/balance-sheet", get(handlers::report::balance_sheet))
        .route("/pnl", get(handlers::report::pnl))
        .route("/daily-sales", get(handlers::report::daily_sales))
        .route("/monthly-profit", get(handlers::report::monthly_profit))
        .route_layer(middleware::from_fn(auth_middleware))
}
