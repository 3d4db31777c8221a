use std::sync::Arc;

use cehelper::{Error, KubeSchemaSource, Repairer, Settings, WebhookServer, telemetry};
use clap::Parser;
use kube::Client;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let settings = Settings::parse();
    telemetry::init(settings.log_format);

    let client = Client::try_default().await?;

    let repairer = match settings.provider() {
        Ok(config) => {
            let provider = config.build()?;
            tracing::info!(provider = provider.name(), "completion provider configured");
            let schemas = Arc::new(KubeSchemaSource::new(client));
            Some(Arc::new(
                Repairer::new(provider, schemas).with_extraction(settings.extraction),
            ))
        }
        Err(err) => {
            tracing::error!(error = %err, "admission requests will be rejected until a provider is configured");
            None
        }
    };

    WebhookServer::builder()
        .addr(settings.addr())
        .tls(&settings.tls_cert, &settings.tls_key)
        .build()
        .run(repairer)
        .await
}
