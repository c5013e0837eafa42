//! Privilege initialization for the application identity.

use crate::config::CredentialsConfig;
use crate::engine::ContainerEngine;
use crate::error::ProvisionError;
use crate::instance::ServiceInstance;
use std::sync::Arc;

/// Grants the application identity full privileges on an instance.
pub struct PrivilegeInitializer {
    engine: Arc<dyn ContainerEngine>,
    credentials: CredentialsConfig,
}

/// Escape a value for use inside a single-quoted SQL string literal. The
/// credentials come from the environment, so they can hold any byte.
fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "''")
}

/// SQL executed under the administrative credential. CREATE USER IF NOT
/// EXISTS keeps the whole statement set idempotent; the trailing flush makes
/// the grant effective immediately.
pub fn grant_sql(app_user: &str, app_password: &str) -> String {
    format!(
        "CREATE USER IF NOT EXISTS '{user}'@'%' IDENTIFIED BY '{password}'; \
         GRANT ALL PRIVILEGES ON *.* TO '{user}'@'%' WITH GRANT OPTION; \
         FLUSH PRIVILEGES;",
        user = escape_literal(app_user),
        password = escape_literal(app_password)
    )
}

impl PrivilegeInitializer {
    pub fn new(engine: Arc<dyn ContainerEngine>, credentials: CredentialsConfig) -> Self {
        Self {
            engine,
            credentials,
        }
    }

    /// Grant full privileges with grant option to the application identity.
    /// Safe to invoke repeatedly against the same instance.
    pub async fn grant_full_access(
        &self,
        instance: &ServiceInstance,
    ) -> Result<(), ProvisionError> {
        tracing::info!(
            "[Privileges] Granting '{}' full access on {} instance",
            self.credentials.app_user,
            instance.role.as_str()
        );

        let sql = grant_sql(&self.credentials.app_user, &self.credentials.app_password);
        let command = vec![
            "mysql".to_string(),
            "-uroot".to_string(),
            format!("-p{}", self.credentials.root_password),
            "-e".to_string(),
            sql,
        ];

        let out = self
            .engine
            .exec(&instance.container_name, &command)
            .await
            .map_err(|e| ProvisionError::Runtime(format!("grant exec failed: {}", e)))?;

        if !out.success() {
            return Err(ProvisionError::Runtime(format!(
                "grant on {} failed (exit {}): {}",
                instance.container_name,
                out.exit_code,
                out.last_stderr_line()
            )));
        }

        tracing::info!(
            "[Privileges] Grant applied on {} instance",
            instance.role.as_str()
        );
        Ok(())
    }
}
