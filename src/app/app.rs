use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::app_conf::AppConfig;
use crate::config::{AdminConfig, EmailConfig, MongoConfig};
use crate::middlewares::admin_middleware::AdminAuthState;
use crate::repository::request_repo::MongoRequestRepository;
use crate::router::request_router::request_router;
use crate::service::notifier::RequestNotifier;
use crate::service::request_service::RequestServiceImpl;
use crate::util::email::{Mailer, SmtpEmailService};

pub struct App {
    config: AppConfig,
    router: Router,
    pub request_service: Arc<RequestServiceImpl>,
}

impl App {
    pub async fn new() -> Self {
        let config = AppConfig::from_env();
        let mongo_config = MongoConfig::from_env().expect("Mongo config error");
        let admin_config = AdminConfig::from_env().expect("Admin config error");

        let repo = Arc::new(
            MongoRequestRepository::new(&mongo_config)
                .await
                .expect("Request repo error"),
        );

        // Email is optional at startup: without it the service still
        // answers lookups, but submissions and admin side effects fail
        // with a configuration error.
        let notifier = match EmailConfig::from_env() {
            Ok(email_config) => {
                let staff_email = email_config.staff_email.clone();
                let mailer = Arc::new(
                    SmtpEmailService::new(email_config).expect("SMTP service error"),
                ) as Arc<dyn Mailer>;
                Some(Arc::new(RequestNotifier::new(
                    mailer,
                    staff_email,
                    config.site_base_url.clone(),
                )))
            }
            Err(e) => {
                warn!("Email configuration not loaded: {e}");
                None
            }
        };

        let request_service = Arc::new(RequestServiceImpl::new(repo, notifier));

        let admin_auth_state = Arc::new(AdminAuthState {
            admin_password: admin_config.password,
        });

        let router = request_router(request_service.clone(), admin_auth_state)
            .route("/health", get(|| async { "OK" }));

        App {
            config,
            router,
            request_service,
        }
    }

    pub async fn start(self) {
        let addr = SocketAddr::new(
            self.config.host.parse().expect("Invalid host"),
            self.config.port,
        );
        info!("🚀 Server running at http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .expect("Failed to bind address");
        axum::serve(listener, self.router)
            .await
            .expect("Failed to start server");
    }
}
