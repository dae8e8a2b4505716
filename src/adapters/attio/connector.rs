//! Attio connector

use crate::connector::{
    Connector, ConnectorBase, Deleter, ObjectMetadataReader, OnceCache, Reader, Subscriber,
    WebhookVerifier, Writer,
};
use crate::error::Result;
use crate::pagination::OffsetPaginator;
use crate::providers::ModuleId;
use crate::read::{RecordsExtractor, RowMarshaller};
use crate::schema::{EndpointRegistry, EndpointSupport, Support};
use crate::simultaneously::Simultaneously;
use crate::subscribe::{EventMapping, EventType, HmacVerifier};
use crate::types::Operation;
use tracing::debug;

pub(super) const PAGE_SIZE: u32 = 500;
pub(super) const SIGNATURE_HEADER: &str = "attio-signature";
pub(super) const VALUES_KEY: &str = "values";

const STANDARD_OBJECTS: [&str; 5] = ["companies", "deals", "people", "users", "workspaces"];

#[derive(Debug)]
pub struct AttioConnector {
    pub(super) base: ConnectorBase,
    endpoints: EndpointRegistry,
    pub(super) events: EventMapping,
    pub(super) verifier: HmacVerifier,
    pub(super) runner: Simultaneously,
    pub(super) records: RecordsExtractor,
    pub(super) paginator: OffsetPaginator,
    pub(super) marshaller: RowMarshaller,
    /// Object slug to object id
    object_ids: OnceCache<String, String>,
}

impl AttioConnector {
    pub fn new(base: ConnectorBase) -> Result<Self> {
        let endpoints = EndpointRegistry::root(vec![
            EndpointSupport::new(
                "{companies,deals,people,users,workspaces}",
                Support::ALL,
            ),
            EndpointSupport::new("*", Support::READ.union(Support::WRITE).union(Support::DELETE)),
        ])?;

        let events = STANDARD_OBJECTS.iter().fold(EventMapping::new(), |mapping, object| {
            mapping
                .event(object, EventType::Create, &["record.created"])
                .event(object, EventType::Update, &["record.updated"])
                .event(object, EventType::Delete, &["record.deleted"])
        });

        Ok(Self {
            base,
            endpoints,
            events,
            verifier: HmacVerifier::new(SIGNATURE_HEADER),
            runner: Simultaneously::default(),
            records: RecordsExtractor::path("data"),
            paginator: OffsetPaginator::new(PAGE_SIZE),
            marshaller: RowMarshaller::new()
                .with_nested_key(VALUES_KEY)
                .with_id_paths(["id.record_id"]),
            object_ids: OnceCache::new(),
        })
    }

    pub(super) fn check(&self, object: &str, operation: Operation) -> Result<()> {
        self.endpoints
            .check(self.base.module_id(), object, operation)
    }

    /// Id of an object, fetched once per slug
    pub async fn object_id(&self, object: &str) -> Result<String> {
        let key = object.to_string();
        self.object_ids
            .get_or_try_init(&key, || async {
                let url = self.base.url(&["objects", object])?.to_string();
                let response = self
                    .base
                    .json()
                    .get(&url)
                    .await
                    .map_err(|e| e.for_object(object))?;
                let id = response.query()?.str_required("data.id.object_id")?.to_string();
                debug!(object, object_id = %id, "Resolved Attio object id");
                Ok(id)
            })
            .await
    }
}

impl Connector for AttioConnector {
    fn provider(&self) -> &str {
        self.base.provider_name()
    }

    fn module(&self) -> &ModuleId {
        self.base.module_id()
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

    fn as_subscriber(&self) -> Option<&dyn Subscriber> {
        Some(self)
    }

    fn as_webhook_verifier(&self) -> Option<&dyn WebhookVerifier> {
        Some(self)
    }

    fn endpoints(&self) -> Option<&EndpointRegistry> {
        Some(&self.endpoints)
    }
}
