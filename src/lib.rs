#[macro_use]
extern crate rocket;

pub mod auth;
pub mod db;
pub mod error;
pub mod import;
pub mod models;
pub mod request_logger;
pub mod routes;
pub mod store;

use crate::auth::{AuthConfig, JwtAuthorizer, SharedAuthorizer};
use crate::db::BugspotDb;
use crate::import::{HttpSheetSource, ImportConfig, SharedSheetSource};
use crate::request_logger::RequestLogger;
use crate::store::{PgEntityStore, SharedStore};
use env_logger::Env;
use rocket::fairing::AdHoc;
use rocket::http::Method;
use rocket::{Build, Rocket};
use rocket_cors::{AllowedOrigins, CorsOptions};
use rocket_db_pools::Database;
use rocket_okapi::{
    openapi_get_routes,
    rapidoc::{GeneralConfig, HideShowConfig, RapiDocConfig, make_rapidoc},
    settings::UrlObject,
    swagger_ui::{SwaggerUIConfig, make_swagger_ui},
};
use std::sync::{Arc, Once};

static LOGGER: Once = Once::new();

pub fn init_logger() {
    LOGGER.call_once(|| {
        env_logger::Builder::from_env(
            Env::default().default_filter_or("info,rocket::server=warn,rocket::request=warn"),
        )
        .init();
    });
}

pub fn rocket() -> Rocket<Build> {
    init_logger();

    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .allowed_methods(
            vec![Method::Get, Method::Post]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .allow_credentials(true)
        .to_cors()
        .expect("Error creating CORS");

    rocket::build()
        .attach(RequestLogger)
        .attach(BugspotDb::init())
        .attach(cors)
        // Run database migrations on startup
        .attach(AdHoc::try_on_ignite(
            "Run Migrations",
            |rocket| async move {
                match BugspotDb::fetch(&rocket) {
                    Some(db) => {
                        let pool = (**db).clone();
                        match db::run_migrations(&pool).await {
                            Ok(_) => {
                                log::info!("database migrations successful");
                                Ok(rocket)
                            }
                            Err(e) => {
                                log::error!("database migrations failed: {}", e);
                                Err(rocket)
                            }
                        }
                    }
                    None => {
                        log::error!("database pool not available for migrations");
                        Err(rocket)
                    }
                }
            },
        ))
        .attach(AdHoc::try_on_ignite(
            "Content Store",
            |rocket| async move {
                match BugspotDb::fetch(&rocket) {
                    Some(db) => {
                        let store: SharedStore = Arc::new(PgEntityStore::new((**db).clone()));
                        Ok(rocket.manage(store))
                    }
                    None => Err(rocket),
                }
            },
        ))
        .attach(AdHoc::try_on_ignite(
            "Import Configuration",
            |rocket| async move {
                let import_config = ImportConfig::from_env();
                if import_config.sheet_id.is_none() {
                    log::warn!("BUGSPOT_SHEET_ID not set; imports will be rejected");
                }

                let source: SharedSheetSource = match HttpSheetSource::new(import_config.clone())
                {
                    Ok(source) => Arc::new(source),
                    Err(err) => {
                        log::error!("failed to initialize spreadsheet client: {}", err);
                        return Err(rocket);
                    }
                };

                let authorizer: SharedAuthorizer =
                    match AuthConfig::from_env().and_then(|config| JwtAuthorizer::new(&config)) {
                        Ok(authorizer) => Arc::new(authorizer),
                        Err(err) => {
                            log::error!("failed to initialize authorization: {}", err);
                            return Err(rocket);
                        }
                    };

                Ok(rocket
                    .manage(import_config)
                    .manage(source)
                    .manage(authorizer))
            },
        ))
        .mount(
            "/api/v1",
            openapi_get_routes![
                // Health routes
                routes::health::health_check,
                // Import routes
                routes::admin::import_problems,
                // Content routes
                routes::content::list_courses,
                routes::content::list_categories,
                routes::content::list_problems,
            ],
        )
        .mount(
            "/api/docs/swagger/",
            make_swagger_ui(&SwaggerUIConfig {
                url: "../../v1/openapi.json".to_owned(),
                ..Default::default()
            }),
        )
        .mount(
            "/api/docs/rapidoc/",
            make_rapidoc(&RapiDocConfig {
                general: GeneralConfig {
                    spec_urls: vec![UrlObject::new("Bugspot API", "../../v1/openapi.json")],
                    ..Default::default()
                },
                hide_show: HideShowConfig {
                    allow_spec_url_load: false,
                    allow_spec_file_load: false,
                    ..Default::default()
                },
                ..Default::default()
            }),
        )
}

#[cfg_attr(not(test), allow(dead_code))]
pub mod test_support {
    use std::sync::Arc;

    use rocket::config::LogLevel;
    use rocket::figment::Figment;
    use rocket::local::asynchronous::Client as AsyncClient;
    use rocket::local::blocking::Client;
    use rocket::{Build, Rocket, Route};

    use crate::auth::SharedAuthorizer;
    use crate::import::{ImportConfig, SharedSheetSource, StaticSheetSource};
    use crate::store::{EntityStore, SharedStore};

    pub use database::{TestDatabase, TestDatabaseError};

    pub mod database {
        use log::LevelFilter;
        use rocket_db_pools::sqlx::postgres::{PgConnectOptions, PgPoolOptions};
        use rocket_db_pools::sqlx::{ConnectOptions, PgPool};
        use testcontainers::{GenericImage, ImageExt, core::WaitFor};
        use testcontainers_modules::testcontainers::{
            ContainerAsync, core::error::TestcontainersError, runners::AsyncRunner,
        };
        use thiserror::Error;

        #[derive(Debug, Error)]
        pub enum TestDatabaseError {
            #[error("database error: {0}")]
            Sqlx(#[from] rocket_db_pools::sqlx::Error),
            #[error("migration error: {0}")]
            Migration(#[from] rocket_db_pools::sqlx::migrate::MigrateError),
            #[error("container error: {0}")]
            Container(#[from] TestcontainersError),
        }

        /// Disposable PostgreSQL instance with the schema applied.
        pub struct TestDatabase {
            pool: Option<PgPool>,
            container: Option<ContainerAsync<GenericImage>>,
        }

        impl TestDatabase {
            /// Launch a throwaway Postgres container and run migrations.
            pub async fn new() -> Result<Self, TestDatabaseError> {
                let image = GenericImage::new("postgres", "16-alpine")
                    .with_wait_for(WaitFor::message_on_stderr(
                        "database system is ready to accept connections",
                    ));

                let container = image
                    .with_env_var("POSTGRES_DB", "bugspot")
                    .with_env_var("POSTGRES_USER", "postgres")
                    .with_env_var("POSTGRES_PASSWORD", "postgres")
                    .start()
                    .await?;

                let host = container.get_host().await?.to_string();
                let port = container.get_host_port_ipv4(5432).await?;
                let url = format!("postgres://postgres:postgres@{}:{}/bugspot", host, port);

                let options: PgConnectOptions = url.parse()?;
                let pool = PgPoolOptions::new()
                    .max_connections(5)
                    .connect_with(options.log_statements(LevelFilter::Off))
                    .await?;

                crate::db::run_migrations(&pool).await?;

                Ok(Self {
                    pool: Some(pool),
                    container: Some(container),
                })
            }

            pub fn pool(&self) -> &PgPool {
                self.pool.as_ref().expect("test database pool is available")
            }

            pub fn pool_clone(&self) -> PgPool {
                self.pool().clone()
            }

            /// Close pool connections and stop the container.
            pub async fn close(mut self) {
                if let Some(pool) = self.pool.take() {
                    pool.close().await;
                }
                if let Some(container) = self.container.take() {
                    drop(container);
                }
            }
        }
    }

    /// Builder for constructing Rocket instances tailored for integration tests.
    ///
    /// Anything not provided explicitly gets a permissive default: an import
    /// config with a sheet id, a sheet source serving an empty document and an
    /// authorizer that accepts every caller.
    pub struct TestRocketBuilder {
        figment: Figment,
        mounts: Vec<(String, Vec<Route>)>,
        store: Option<SharedStore>,
        authorizer: SharedAuthorizer,
        source: SharedSheetSource,
        import_config: ImportConfig,
    }

    impl Default for TestRocketBuilder {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestRocketBuilder {
        /// Start a builder with sensible defaults: random port, logging disabled.
        pub fn new() -> Self {
            let figment = rocket::Config::figment()
                .merge(("port", 0))
                .merge(("log_level", LogLevel::Off))
                .merge(("cli_colors", false));

            Self {
                figment,
                mounts: Vec::new(),
                store: None,
                authorizer: Arc::new(|_: Option<&str>| true),
                source: Arc::new(StaticSheetSource(String::new())),
                import_config: ImportConfig {
                    sheet_id: Some("test-sheet".to_string()),
                    ..Default::default()
                },
            }
        }

        /// Mount routes under `/api/v1`.
        pub fn mount_api_routes(mut self, routes: Vec<Route>) -> Self {
            self.mounts.push(("/api/v1".to_string(), routes));
            self
        }

        pub fn manage_store<S: EntityStore + 'static>(mut self, store: Arc<S>) -> Self {
            let store: SharedStore = store;
            self.store = Some(store);
            self
        }

        pub fn manage_authorizer(mut self, authorizer: SharedAuthorizer) -> Self {
            self.authorizer = authorizer;
            self
        }

        /// Serve `csv` as the fetched spreadsheet.
        pub fn with_sheet(mut self, csv: impl Into<String>) -> Self {
            self.source = Arc::new(StaticSheetSource(csv.into()));
            self
        }

        pub fn manage_sheet_source(mut self, source: SharedSheetSource) -> Self {
            self.source = source;
            self
        }

        pub fn manage_import_config(mut self, config: ImportConfig) -> Self {
            self.import_config = config;
            self
        }

        /// Finish building the Rocket instance.
        pub fn build(self) -> Rocket<Build> {
            let mut rocket = rocket::custom(self.figment);

            for (base, routes) in self.mounts {
                rocket = rocket.mount(base, routes);
            }

            if let Some(store) = self.store {
                rocket = rocket.manage(store);
            }

            rocket
                .manage(self.authorizer)
                .manage(self.source)
                .manage(self.import_config)
        }

        /// Convenience helper to produce a blocking local client.
        pub fn blocking_client(self) -> Client {
            Client::tracked(self.build()).expect("valid Rocket instance")
        }

        /// Convenience helper to produce an asynchronous local client.
        pub async fn async_client(self) -> AsyncClient {
            AsyncClient::tracked(self.build())
                .await
                .expect("valid Rocket instance")
        }
    }
}
