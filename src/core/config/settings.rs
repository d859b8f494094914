use rand::distributions::Alphanumeric;
use rand::Rng;

use super::parsing::{
    env_optional, env_or_default, parse_bool, parse_cors_origins, parse_environment,
    parse_mime_list, parse_u16, parse_u32, parse_u64, DEFAULT_MATERIAL_MIME_TYPES,
    DEFAULT_SUBMISSION_MIME_TYPES,
};
use super::types::{
    ApiSettings, ConfigError, CorsSettings, DatabaseSettings, GradingSettings, RuntimeSettings,
    S3Settings, SecuritySettings, ServerHost, ServerPort, ServerSettings, Settings,
    TelemetrySettings, UploadLimit, UploadSettings,
};

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("GRADEFLOW_HOST", "0.0.0.0");
        let port = env_or_default("GRADEFLOW_PORT", "8000");

        let environment = parse_environment(
            env_optional("GRADEFLOW_ENV").or_else(|| env_optional("ENVIRONMENT")),
        );
        let strict_config = env_optional("GRADEFLOW_STRICT_CONFIG")
            .map(|value| parse_bool(&value))
            .unwrap_or(false)
            || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "Gradeflow API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_v1_str = env_or_default("API_V1_STR", "/api/v1");

        let jwt_secret = match env_optional("JWT_SECRET") {
            Some(value) => value,
            None if strict_config => return Err(ConfigError::MissingSecret("JWT_SECRET")),
            None => {
                tracing::warn!("JWT_SECRET not configured; using an ephemeral secret");
                ephemeral_secret()
            }
        };
        let jwt_audience = env_optional("JWT_AUDIENCE");
        let algorithm = env_or_default("JWT_ALGORITHM", "HS256");

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = parse_u16("POSTGRES_PORT", env_or_default("POSTGRES_PORT", "5432"))?;
        let postgres_user = env_or_default("POSTGRES_USER", "gradeflow");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "gradeflow");
        let database_url = env_optional("DATABASE_URL");

        let function_url = env_or_default("GRADING_FUNCTION_URL", "");
        let function_key = env_or_default("GRADING_FUNCTION_KEY", "");
        let timeout_seconds = parse_u64(
            "GRADING_TIMEOUT_SECONDS",
            env_or_default("GRADING_TIMEOUT_SECONDS", "60"),
        )?;
        let max_retries =
            parse_u32("GRADING_MAX_RETRIES", env_or_default("GRADING_MAX_RETRIES", "0"))?;
        let retry_base_ms =
            parse_u64("GRADING_RETRY_BASE_MS", env_or_default("GRADING_RETRY_BASE_MS", "500"))?;

        let submission_max_mb = parse_u64(
            "SUBMISSION_MAX_UPLOAD_MB",
            env_or_default("SUBMISSION_MAX_UPLOAD_MB", "10"),
        )?;
        let submission_mime_types = parse_mime_list(
            "SUBMISSION_ALLOWED_MIME_TYPES",
            env_optional("SUBMISSION_ALLOWED_MIME_TYPES"),
            DEFAULT_SUBMISSION_MIME_TYPES,
        )?;
        let material_max_mb =
            parse_u64("MATERIAL_MAX_UPLOAD_MB", env_or_default("MATERIAL_MAX_UPLOAD_MB", "50"))?;
        let material_mime_types = parse_mime_list(
            "MATERIAL_ALLOWED_MIME_TYPES",
            env_optional("MATERIAL_ALLOWED_MIME_TYPES"),
            DEFAULT_MATERIAL_MIME_TYPES,
        )?;

        let s3_endpoint = env_or_default("S3_ENDPOINT", "http://localhost:9000");
        let s3_access_key = env_or_default("S3_ACCESS_KEY", "");
        let s3_secret_key = env_or_default("S3_SECRET_KEY", "");
        let s3_bucket = env_or_default("S3_BUCKET", "gradeflow-submissions");
        let s3_region = env_or_default("S3_REGION", "us-east-1");
        let s3_public_base_url = env_optional("S3_PUBLIC_BASE_URL");

        let log_level = env_or_default("GRADEFLOW_LOG_LEVEL", "info");
        let json = env_optional("GRADEFLOW_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, api_v1_str },
            security: SecuritySettings { jwt_secret, jwt_audience, algorithm },
            cors: CorsSettings { origins: cors_origins },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
            },
            grading: GradingSettings {
                function_url,
                function_key,
                timeout_seconds,
                max_retries,
                retry_base_ms,
            },
            uploads: UploadSettings {
                submission: UploadLimit {
                    max_size_mb: submission_max_mb,
                    allowed_mime_types: submission_mime_types,
                },
                material: UploadLimit {
                    max_size_mb: material_max_mb,
                    allowed_mime_types: material_mime_types,
                },
            },
            s3: S3Settings {
                endpoint: s3_endpoint,
                access_key: s3_access_key,
                secret_key: s3_secret_key,
                bucket: s3_bucket,
                region: s3_region,
                public_base_url: s3_public_base_url,
            },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn security(&self) -> &SecuritySettings {
        &self.security
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn grading(&self) -> &GradingSettings {
        &self.grading
    }

    pub(crate) fn uploads(&self) -> &UploadSettings {
        &self.uploads
    }

    pub(crate) fn s3(&self) -> &S3Settings {
        &self.s3
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.grading.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "GRADING_TIMEOUT_SECONDS",
                value: "0".to_string(),
            });
        }

        if self.uploads.submission.max_size_mb == 0 {
            return Err(ConfigError::InvalidValue {
                field: "SUBMISSION_MAX_UPLOAD_MB",
                value: "0".to_string(),
            });
        }

        if self.uploads.material.max_size_mb == 0 {
            return Err(ConfigError::InvalidValue {
                field: "MATERIAL_MAX_UPLOAD_MB",
                value: "0".to_string(),
            });
        }

        if !matches!(self.security.algorithm.as_str(), "HS256" | "HS384" | "HS512") {
            return Err(ConfigError::InvalidValue {
                field: "JWT_ALGORITHM",
                value: self.security.algorithm.clone(),
            });
        }

        if !self.runtime.strict_config {
            return Ok(());
        }

        if self.database.database_url.is_none() && self.database.postgres_password.is_empty() {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }
        if !self.grading.is_configured() {
            return Err(ConfigError::MissingSecret("GRADING_FUNCTION_URL"));
        }
        if self.grading.function_key.is_empty() {
            return Err(ConfigError::MissingSecret("GRADING_FUNCTION_KEY"));
        }
        if !self.s3.is_configured() {
            return Err(ConfigError::MissingSecret("S3_ACCESS_KEY/S3_SECRET_KEY"));
        }

        Ok(())
    }
}

fn ephemeral_secret() -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, Settings};
    use crate::test_support;

    #[tokio::test]
    async fn defaults_keep_upload_limits_independent() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();

        let settings = Settings::load().expect("settings");
        assert_eq!(settings.uploads().submission.max_size_mb, 10);
        assert_eq!(settings.uploads().material.max_size_mb, 50);
        assert_eq!(settings.uploads().submission.max_bytes(), 10 * 1024 * 1024);
        assert_eq!(settings.uploads().submission.allowed_mime_types.len(), 4);
        assert!(settings
            .uploads()
            .material
            .allowed_mime_types
            .iter()
            .any(|mime| mime.contains("presentation")));
    }

    #[tokio::test]
    async fn submission_limit_does_not_move_material_limit() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::set_var("SUBMISSION_MAX_UPLOAD_MB", "2");

        let settings = Settings::load().expect("settings");
        std::env::remove_var("SUBMISSION_MAX_UPLOAD_MB");

        assert_eq!(settings.uploads().submission.max_size_mb, 2);
        assert_eq!(settings.uploads().material.max_size_mb, 50);
    }

    #[tokio::test]
    async fn strict_mode_requires_jwt_secret() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::remove_var("JWT_SECRET");
        std::env::set_var("GRADEFLOW_STRICT_CONFIG", "1");

        let result = Settings::load();
        std::env::set_var("GRADEFLOW_STRICT_CONFIG", "0");

        assert!(matches!(result, Err(ConfigError::MissingSecret("JWT_SECRET"))));
    }

    #[tokio::test]
    async fn zero_grading_timeout_is_rejected() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::set_var("GRADING_TIMEOUT_SECONDS", "0");

        let result = Settings::load();
        std::env::remove_var("GRADING_TIMEOUT_SECONDS");

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { field: "GRADING_TIMEOUT_SECONDS", .. })
        ));
    }
}
