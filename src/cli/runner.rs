//! CLI runner - executes commands

use crate::adapters::{new_connector, ADAPTERS};
use crate::cli::commands::{Cli, Commands};
use crate::config::{load_config, ConnectorConfig};
use crate::connector::{dispatch, Connector, DeleteParams, ReadParams, WriteParams};
use crate::error::{Error, Result};
use crate::providers;
use crate::subscribe::{VerificationParams, WebhookRequest};
use crate::types::JsonValue;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::json;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

/// Options of the `read` command
struct ReadOptions<'a> {
    object: &'a str,
    fields: &'a [String],
    since: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
    associations: &'a [String],
    next_page: Option<&'a str>,
    page_size: Option<u32>,
    all: bool,
    max_pages: Option<usize>,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Providers => self.providers(),
            Commands::Objects => self.objects(),
            Commands::Metadata { objects } => self.metadata(objects).await,
            Commands::Read {
                object,
                fields,
                since,
                until,
                associations,
                next_page,
                page_size,
                all,
                max_pages,
            } => {
                self.read(ReadOptions {
                    object,
                    fields,
                    since: *since,
                    until: *until,
                    associations,
                    next_page: next_page.as_deref(),
                    page_size: *page_size,
                    all: *all,
                    max_pages: *max_pages,
                })
                .await
            }
            Commands::Write {
                object,
                id,
                data,
                file,
            } => {
                let record = match (data, file) {
                    (Some(data), _) => serde_json::from_str(data)?,
                    (None, Some(file)) => serde_json::from_slice(&read_input(file)?)?,
                    (None, None) => return Err(Error::missing_param("data")),
                };
                self.write(object, id.as_deref(), record).await
            }
            Commands::Delete { object, id } => self.delete(object, id).await,
            Commands::VerifyWebhook {
                secret,
                headers,
                body,
            } => self.verify_webhook(secret, headers, body),
        }
    }

    /// Load the connector config named by `--config`
    fn load_config(&self) -> Result<ConnectorConfig> {
        let path = self
            .cli
            .config
            .as_ref()
            .ok_or_else(|| Error::config("Connector config not specified (use --config)"))?;
        load_config(path)
    }

    fn connector(&self) -> Result<Box<dyn Connector>> {
        new_connector(&self.load_config()?)
    }

    /// List registered providers
    fn providers(&self) -> Result<()> {
        let providers: Vec<JsonValue> = providers::providers()?
            .into_iter()
            .map(|info| {
                json!({
                    "name": info.name,
                    "displayName": info.display_name,
                    "authType": info.auth_type,
                    "modules": info.modules.keys().collect::<Vec<_>>(),
                    "workspaceRequired": info.workspace_required,
                    "adapter": ADAPTERS.contains(&info.name.as_str()),
                })
            })
            .collect();

        self.output_message(&json!({
            "type": "PROVIDERS",
            "providers": providers
        }));
        Ok(())
    }

    /// Capabilities and declared objects of the configured connector
    fn objects(&self) -> Result<()> {
        let connector = self.connector()?;
        let capabilities: Vec<String> = connector
            .capabilities()
            .iter()
            .map(ToString::to_string)
            .collect();
        let objects = connector
            .endpoints()
            .map(|endpoints| endpoints.objects(connector.module()));

        self.output_message(&json!({
            "type": "OBJECTS",
            "provider": connector.provider(),
            "module": connector.module(),
            "capabilities": capabilities,
            "objects": objects
        }));
        Ok(())
    }

    async fn metadata(&self, objects: &[String]) -> Result<()> {
        let connector = self.connector()?;
        let result = dispatch::list_object_metadata(connector.as_ref(), objects).await?;
        info!(
            provider = connector.provider(),
            objects = result.result.len(),
            errors = result.errors.len(),
            "Fetched metadata"
        );

        self.output_message(&json!({
            "type": "METADATA",
            "metadata": result
        }));
        Ok(())
    }

    /// Read one page, or every page with `--all`; each page is one message
    async fn read(&self, options: ReadOptions<'_>) -> Result<()> {
        let connector = self.connector()?;

        let mut params = ReadParams::new(options.object, options.fields.iter().cloned());
        if let Some(since) = options.since {
            params = params.since(since);
        }
        if let Some(until) = options.until {
            params = params.until(until);
        }
        if !options.associations.is_empty() {
            params = params.associated_objects(options.associations.iter().cloned());
        }
        if let Some(size) = options.page_size {
            params = params.page_size(size);
        }
        if let Some(token) = options.next_page {
            params = params.next_page(token);
        }

        let mut pages = 0;
        let mut rows = 0;
        loop {
            let page = dispatch::read(connector.as_ref(), &params).await?;
            pages += 1;
            rows += page.rows;
            debug!(object = options.object, page = pages, rows = page.rows, "Read page");

            let next_page = page.next_page.clone();
            let done = page.done;
            self.output_message(&json!({
                "type": "PAGE",
                "object": options.object,
                "page": page
            }));

            let limit_reached = options.max_pages.is_some_and(|max| pages >= max);
            if !options.all || done || limit_reached {
                break;
            }
            params = params.next_page(next_page);
        }

        info!(object = options.object, pages, rows, "Read finished");
        Ok(())
    }

    async fn write(&self, object: &str, id: Option<&str>, record: JsonValue) -> Result<()> {
        let connector = self.connector()?;
        let params = match id {
            Some(id) => WriteParams::update(object, id, record),
            None => WriteParams::create(object, record),
        };
        let result = dispatch::write(connector.as_ref(), &params).await?;

        self.output_message(&json!({
            "type": "WRITE",
            "object": object,
            "result": result
        }));
        Ok(())
    }

    async fn delete(&self, object: &str, id: &str) -> Result<()> {
        let connector = self.connector()?;
        let result = dispatch::delete(connector.as_ref(), &DeleteParams::new(object, id)).await?;

        self.output_message(&json!({
            "type": "DELETE",
            "object": object,
            "id": id,
            "result": result
        }));
        Ok(())
    }

    fn verify_webhook(&self, secret: &str, headers: &[String], body: &Path) -> Result<()> {
        let connector = self.connector()?;
        let request = WebhookRequest::new(parse_headers(headers)?, read_input(body)?);
        let valid = dispatch::verify_webhook_message(
            connector.as_ref(),
            &request,
            &VerificationParams::new(secret),
        )?;

        self.output_message(&json!({
            "type": "WEBHOOK",
            "provider": connector.provider(),
            "valid": valid
        }));
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &JsonValue) {
        if self.cli.pretty {
            println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
        } else {
            println!("{}", serde_json::to_string(msg).unwrap_or_default());
        }
    }
}

/// Parse `Name: value` header arguments
fn parse_headers(raw: &[String]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for line in raw {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| Error::invalid_param("header", format!("expected 'Name: value', got '{line}'")))?;
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|e| Error::invalid_param("header", e.to_string()))?;
        let value = HeaderValue::from_str(value.trim())
            .map_err(|e| Error::invalid_param("header", e.to_string()))?;
        headers.append(name, value);
    }
    Ok(headers)
}

/// Read a file, or stdin for `-`
fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        return Ok(buf);
    }
    Ok(std::fs::read(path)?)
}
