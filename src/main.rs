use std::sync::Arc;

use dotenv::dotenv;

use rent_my_trip_be::auth::JwtKeys;
use rent_my_trip_be::config::Config;
use rent_my_trip_be::store::{MemoryStore, PgStore, SharedStore};
use rent_my_trip_be::{app, AppState};

#[tokio::main]
async fn main() {
    dotenv().ok();
    let config = Config::from_env();

    if config.jwt_secret_is_default() {
        eprintln!("⚠️ JWT_SECRET not set - using insecure development default");
    }
    let jwt = Arc::new(JwtKeys::new(&config.jwt_secret));

    let store: SharedStore = match config.database_url.as_deref() {
        Some(url) => {
            let pg = match PgStore::connect(url) {
                Ok(pg) => pg,
                Err(e) => {
                    eprintln!("❌ Invalid DATABASE_URL: {}", e);
                    std::process::exit(1);
                }
            };
            match pg.ensure_schema().await {
                Ok(()) => println!("✅ Postgres connected, schema ready"),
                Err(e) => eprintln!(
                    "⚠️ Postgres not reachable yet ({}). Requests will answer 503 until it is.",
                    e
                ),
            }
            Arc::new(pg)
        }
        None => {
            println!("🔧 DATABASE_URL not set - using in-memory store (data is lost on restart)");
            Arc::new(MemoryStore::new())
        }
    };

    let port = config.port;
    let app = app(AppState { store, jwt, port });

    let addr = format!("0.0.0.0:{}", port);
    println!("🚀 Listening on http://{}", addr);
    println!("📊 API endpoints:");
    println!("   POST /api/register       - user registration");
    println!("   POST /api/login          - user login");
    println!("   GET  /api/users          - list users");
    println!("   POST /api/lodge-bookings - create lodge booking");
    println!("   GET  /api/lodge-bookings - list lodge bookings");
    println!("   GET  /api/status         - store connectivity and counts");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind listen address");
    axum::serve(listener, app).await.expect("server error");
}
