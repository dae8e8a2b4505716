//! Salesforce connector

use super::soql::SoqlQuery;
use crate::components::{ComponentsConnector, WriteSpec};
use crate::connector::{
    BatchWriter, Connector, ConnectorBase, DeleteParams, DeleteResult, Deleter,
    ObjectMetadataReader, ReadParams, ReadResult, Reader, WriteParams, WriteResult, Writer,
};
use crate::error::Result;
use crate::pagination::NextUrlPaginator;
use crate::providers::ModuleId;
use crate::read::{page_url, PageParser, RecordsExtractor, RowMarshaller};
use crate::schema::{EndpointRegistry, EndpointSupport, FieldsV2, Support};
use crate::simultaneously::Simultaneously;
use crate::types::Operation;
use async_trait::async_trait;
use tracing::debug;

pub(super) const SOBJECTS: &str = "sobjects";

#[derive(Debug)]
pub struct SalesforceConnector {
    pub(super) components: ComponentsConnector<FieldsV2>,
    pub(super) runner: Simultaneously,
    records: RecordsExtractor,
    paginator: NextUrlPaginator,
    marshaller: RowMarshaller,
}

impl SalesforceConnector {
    pub fn new(base: ConnectorBase) -> Result<Self> {
        let endpoints = EndpointRegistry::root(vec![EndpointSupport::new(
            "*",
            Support::READ.union(Support::WRITE).union(Support::DELETE),
        )])?;

        let components = ComponentsConnector::new(base, endpoints)
            .object_prefix(SOBJECTS)
            .with_write(WriteSpec::new())
            .with_delete();

        Ok(Self {
            components,
            runner: Simultaneously::default(),
            records: RecordsExtractor::path("records"),
            paginator: NextUrlPaginator::new("nextRecordsUrl"),
            marshaller: RowMarshaller::new().with_id_paths(["Id"]),
        })
    }

    pub(super) fn base(&self) -> &ConnectorBase {
        self.components.base()
    }

    pub(super) fn check(&self, object: &str, operation: Operation) -> Result<()> {
        self.components
            .endpoints()
            .check(self.base().module_id(), object, operation)
    }
}

#[async_trait]
impl Reader for SalesforceConnector {
    async fn read(&self, params: &ReadParams) -> Result<ReadResult> {
        params.validate()?;
        self.check(&params.object_name, Operation::Read)?;

        let mut first = self.base().url(&["query"])?;
        let soql = SoqlQuery::for_read(params).to_string();
        debug!(object = %params.object_name, %soql, "Salesforce query");
        first.with_query("q", soql);

        let url = page_url(first, &params.next_page, None)?.to_string();
        let response = self
            .base()
            .json()
            .get(&url)
            .await
            .map_err(|e| e.for_object(&params.object_name))?;

        PageParser {
            extractor: &self.records,
            paginator: &self.paginator,
            marshaller: &self.marshaller,
            fields: &params.fields,
        }
        .parse(&response, &url, &params.next_page)
    }
}

/// Single records go through `sobjects/{object}[/{id}]`; updates answer 204
#[async_trait]
impl Writer for SalesforceConnector {
    async fn write(&self, params: &WriteParams) -> Result<WriteResult> {
        self.components.write(params).await
    }
}

#[async_trait]
impl Deleter for SalesforceConnector {
    async fn delete(&self, params: &DeleteParams) -> Result<DeleteResult> {
        self.components.delete(params).await
    }
}

impl Connector for SalesforceConnector {
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

    fn endpoints(&self) -> Option<&EndpointRegistry> {
        Some(self.components.endpoints())
    }
}
