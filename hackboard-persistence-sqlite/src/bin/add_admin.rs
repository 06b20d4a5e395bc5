use hackboard_domain::admin::{AdminRepository, NewAdmin};
use hackboard_persistence_sqlite::{admins::SqliteAdminRepository, init_schema};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: add_admin <username> <password>");
        std::process::exit(1);
    }

    let db_path = std::env::var("HACKBOARD_DB").expect("HACKBOARD_DB env var not set");

    let username = &args[1];
    let password = &args[2];

    let connect_options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options)
        .await
        .expect("Failed to create pool");

    init_schema(&pool).await.expect("Failed to initialize schema");

    let repo = SqliteAdminRepository::new(pool);

    let existing = repo
        .get_admin_by_username(username)
        .await
        .expect("Failed to query for existing admin");
    if existing.is_some() {
        panic!("Admin with username [{}] already exists", username);
    }

    let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST).expect("Failed to hash password");
    repo.create_admin(&NewAdmin {
        username: username.clone(),
        password_hash,
    })
    .await
    .expect("Failed to insert new admin");

    println!("Created admin [{}]", username);
}
