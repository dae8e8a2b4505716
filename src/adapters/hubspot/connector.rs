//! HubSpot connector

use crate::components::{ComponentsConnector, ReadSpec, WriteSpec};
use crate::connector::{
    BatchRecordReader, BatchWriter, Connector, ConnectorBase, DeleteParams, DeleteResult, Deleter,
    EntityNameNormalizer, MetadataUpserter, ObjectMetadataReader, ReadParams, ReadResult, Reader,
    WriteParams, WriteResult, Writer,
};
use crate::error::Result;
use crate::http::JsonHttpClient;
use crate::naming;
use crate::pagination::CursorPaginator;
use crate::providers::ModuleId;
use crate::read::{EmbeddedAssociations, RecordsExtractor, RowMarshaller};
use crate::schema::{EndpointRegistry, EndpointSupport, FieldsV2, Support};
use crate::simultaneously::Simultaneously;
use crate::write::{partial_failure_predicate, BodyEncoding};
use async_trait::async_trait;

pub(super) const PAGE_SIZE: u32 = 100;
/// Records per batch request
pub(super) const BATCH_LIMIT: usize = 100;
pub(super) const PROPERTIES_KEY: &str = "properties";

#[derive(Debug)]
pub struct HubspotConnector {
    pub(super) components: ComponentsConnector<FieldsV2>,
    /// Client that hands 400/409 batch responses back for parsing
    pub(super) batch_json: JsonHttpClient,
    pub(super) runner: Simultaneously,
}

impl HubspotConnector {
    pub fn new(base: ConnectorBase) -> Result<Self> {
        let crud = Support::READ.union(Support::WRITE).union(Support::DELETE);
        let endpoints = EndpointRegistry::root(vec![
            EndpointSupport::new(
                "{calls,companies,contacts,deals,emails,line_items,meetings,notes,products,quotes,tasks,tickets}",
                crud,
            ),
            EndpointSupport::new("owners", Support::READ),
        ])?;

        let batch_json = JsonHttpClient::new(
            base.client()
                .http()
                .clone()
                .with_error_predicate(partial_failure_predicate),
        );

        let components = ComponentsConnector::new(base, endpoints)
            .object_prefix("objects")
            .path("owners", "owners")
            .with_read(
                ReadSpec::new(CursorPaginator::new("paging.next.after").with_param("after"))
                    .records(RecordsExtractor::path("results"))
                    .page_size("limit", PAGE_SIZE)
                    .fields_param(PROPERTIES_KEY, Some(","))
                    .marshaller(RowMarshaller::new().with_nested_key(PROPERTIES_KEY))
                    .associations(EmbeddedAssociations::new("associations")),
            )
            .with_write(WriteSpec::new().encoding(BodyEncoding::Wrapped(PROPERTIES_KEY.to_string())))
            .with_delete();

        Ok(Self {
            components,
            batch_json,
            runner: Simultaneously::default(),
        })
    }

    /// Replace the runner used for chunked batches and metadata fan-out
    #[must_use]
    pub fn with_runner(mut self, runner: Simultaneously) -> Self {
        self.runner = runner;
        self
    }

    pub(super) fn base(&self) -> &ConnectorBase {
        self.components.base()
    }
}

impl EntityNameNormalizer for HubspotConnector {
    /// Lowercase plural object names; custom object ids pass through
    fn normalize_entity_name(&self, name: &str) -> String {
        let name = name.trim();
        let is_custom = name.starts_with("p_")
            || name
                .split_once('-')
                .is_some_and(|(prefix, _)| prefix.chars().all(|c| c.is_ascii_digit()));
        if is_custom {
            return name.to_string();
        }

        let lower = name.to_lowercase();
        if naming::is_plural(&lower) {
            lower
        } else {
            naming::plural(&lower)
        }
    }
}

#[async_trait]
impl Reader for HubspotConnector {
    async fn read(&self, params: &ReadParams) -> Result<ReadResult> {
        self.components.read(params).await
    }
}

#[async_trait]
impl Writer for HubspotConnector {
    async fn write(&self, params: &WriteParams) -> Result<WriteResult> {
        self.components.write(params).await
    }
}

#[async_trait]
impl Deleter for HubspotConnector {
    async fn delete(&self, params: &DeleteParams) -> Result<DeleteResult> {
        self.components.delete(params).await
    }
}

impl Connector for HubspotConnector {
    fn provider(&self) -> &str {
        self.components.provider()
    }

    fn module(&self) -> &ModuleId {
        self.components.module()
    }

    fn as_object_metadata(&self) -> Option<&dyn ObjectMetadataReader> {
        Some(self)
    }

    fn as_reader(&self) -> Option<&dyn Reader> {
        Some(self)
    }

    fn as_writer(&self) -> Option<&dyn Writer> {
        Some(self)
    }

    fn as_deleter(&self) -> Option<&dyn Deleter> {
        Some(self)
    }

    fn as_batch_writer(&self) -> Option<&dyn BatchWriter> {
        Some(self)
    }

    fn as_metadata_upserter(&self) -> Option<&dyn MetadataUpserter> {
        Some(self)
    }

    fn as_batch_record_reader(&self) -> Option<&dyn BatchRecordReader> {
        Some(self)
    }

    fn as_entity_name_normalizer(&self) -> Option<&dyn EntityNameNormalizer> {
        Some(self)
    }

    fn endpoints(&self) -> Option<&EndpointRegistry> {
        Some(self.components.endpoints())
    }
}
