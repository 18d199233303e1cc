use crate::Result;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::ImageExt;
use testcontainers::{ContainerAsync, GenericImage};
use typed_builder::TypedBuilder;

const MONGO_PORT: u16 = 27017;

#[derive(TypedBuilder)]
pub struct MongoConfig {
    #[builder(default = "7".to_string(), setter(into))]
    tag: String,
    #[builder(default = "asan".to_string(), setter(into))]
    database: String,
}

/// Test fixture for a disposable, single-node MongoDB server.
pub struct MongoServer {
    container: ContainerAsync<GenericImage>,
    config: MongoConfig,
}

impl MongoServer {
    /// Starts a MongoDB container suitable for integration tests.
    pub async fn new(config: MongoConfig) -> Result<Self> {
        let container = GenericImage::new("mongo", config.tag.as_str())
            .with_exposed_port(MONGO_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stdout("Waiting for connections"))
            .with_env_var("MONGO_INITDB_DATABASE", config.database.as_str())
            .start()
            .await?;

        Ok(Self { container, config })
    }

    pub async fn host(&self) -> Result<String> {
        let host = self.container.get_host().await?.to_string();

        Ok(match host.as_str() {
            "localhost" => String::from("127.0.0.1"),
            _ => host,
        })
    }

    pub async fn port(&self) -> Result<u16> {
        Ok(self.container.get_host_port_ipv4(MONGO_PORT).await?)
    }

    /// Connection descriptor naming the configured database.
    pub async fn uri(&self) -> Result<String> {
        let host = self.host().await?;
        let port = self.port().await?;
        Ok(format!("mongodb://{}:{}/{}", host, port, self.config.database))
    }

    /// Returns the underlying container reference.
    pub fn container(&self) -> &ContainerAsync<GenericImage> {
        &self.container
    }
}
