//! Connector assembled from declarative components

use super::spec::{MetadataSource, ReadSpec, WriteSpec};
use crate::codec::flatten_nested_fields;
use crate::connector::{
    Connector, ConnectorBase, DeleteParams, DeleteResult, Deleter, ObjectMetadataReader,
    ReadParams, ReadResult, Reader, WriteParams, WriteResult, Writer,
};
use crate::error::{Error, ErrorKind, Result};
use crate::http::JsonHttpClient;
use crate::providers::ModuleId;
use crate::read::{page_url, PageParser, RecordsExtractor};
use crate::schema::{
    EndpointRegistry, FieldInferrer, FieldsV1, FieldsVersion, ListObjectMetadataResult,
    ObjectMetadata, SchemaRegistry,
};
use crate::simultaneously::{Simultaneously, DEFAULT_CONCURRENCY};
use crate::types::{Capability, Method, Operation};
use crate::urlbuilder::UrlBuilder;
use crate::write::parse_write_response;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// A connector whose behavior is described rather than coded
///
/// Reads, writes, deletes and metadata all go through the shared pipelines;
/// an adapter only declares paths, envelopes, pagination and encodings.
#[derive(Debug)]
pub struct ComponentsConnector<F: FieldsVersion = FieldsV1> {
    base: ConnectorBase,
    schemas: Option<&'static SchemaRegistry<F>>,
    endpoints: EndpointRegistry,
    /// Object name to path under the module URL, when it differs from the name
    paths: BTreeMap<String, String>,
    /// Path segment in front of object names without an explicit path
    object_prefix: Option<String>,
    read: Option<ReadSpec>,
    write: Option<WriteSpec>,
    delete: bool,
    metadata: MetadataSource,
    concurrency: usize,
    /// Sent with every request
    headers: Vec<(String, String)>,
    content_type: Option<String>,
}

impl<F: FieldsVersion> ComponentsConnector<F> {
    pub fn new(base: ConnectorBase, endpoints: EndpointRegistry) -> Self {
        Self {
            base,
            schemas: None,
            endpoints,
            paths: BTreeMap::new(),
            object_prefix: None,
            read: None,
            write: None,
            delete: false,
            metadata: MetadataSource::Static,
            concurrency: DEFAULT_CONCURRENCY,
            headers: Vec::new(),
            content_type: None,
        }
    }

    #[must_use]
    pub fn schemas(mut self, schemas: &'static SchemaRegistry<F>) -> Self {
        self.schemas = Some(schemas);
        self
    }

    /// Object living at a path other than its name
    #[must_use]
    pub fn path(mut self, object: impl Into<String>, path: impl Into<String>) -> Self {
        self.paths.insert(object.into(), path.into());
        self
    }

    /// Objects live under `{module}/{prefix}/{object}`
    #[must_use]
    pub fn object_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.object_prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn with_read(mut self, spec: ReadSpec) -> Self {
        self.read = Some(spec);
        self
    }

    #[must_use]
    pub fn with_write(mut self, spec: WriteSpec) -> Self {
        self.write = Some(spec);
        self
    }

    #[must_use]
    pub fn with_delete(mut self) -> Self {
        self.delete = true;
        self
    }

    #[must_use]
    pub fn metadata(mut self, source: MetadataSource) -> Self {
        self.metadata = source;
        self
    }

    /// Concurrent requests when sampling metadata
    #[must_use]
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Content type of JSON request bodies
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn base(&self) -> &ConnectorBase {
        &self.base
    }

    pub fn endpoints(&self) -> &EndpointRegistry {
        &self.endpoints
    }

    pub fn schema_registry(&self) -> Result<&'static SchemaRegistry<F>> {
        self.schemas
            .ok_or_else(|| Error::config(format!("{} has no schema file", self.base.provider_name())))
    }

    pub fn read_spec(&self) -> Option<&ReadSpec> {
        self.read.as_ref()
    }

    /// Collection URL of an object
    pub fn object_url(&self, object: &str) -> Result<UrlBuilder> {
        if let Some(path) = self.paths.get(object) {
            return self.base.url(&[path.as_str()]);
        }
        if let Some(schemas) = self.schemas {
            if let Ok(path) = schemas.lookup_url_path(self.base.module_id(), object) {
                return self.base.url(&[path.as_str()]);
            }
        }
        match &self.object_prefix {
            Some(prefix) => self.base.url(&[prefix.as_str(), object]),
            None => self.base.url(&[object]),
        }
    }

    fn json(&self) -> JsonHttpClient {
        let json = self.base.json();
        match &self.content_type {
            Some(content_type) => json.with_content_type(content_type.as_str()),
            None => json,
        }
    }

    fn request_headers(&self) -> Vec<(&str, &str)> {
        self.headers
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    fn records_extractor(&self, spec: &ReadSpec, object: &str) -> RecordsExtractor {
        if let Some(extractor) = &spec.records {
            return extractor.clone();
        }
        self.schemas
            .and_then(|s| s.lookup_array_field_name(self.base.module_id(), object).ok())
            .map_or(RecordsExtractor::Auto, RecordsExtractor::Path)
    }

    /// URL of the first page of a read
    pub fn first_page_url(&self, spec: &ReadSpec, params: &ReadParams) -> Result<UrlBuilder> {
        let mut url = self.object_url(&params.object_name)?;
        for (key, value) in &spec.query {
            url.with_query(key, value.as_str());
        }
        if let Some(page_size) = &spec.page_size {
            let size = params.page_size.unwrap_or(page_size.size);
            url.with_query(&page_size.param, size.to_string());
        }
        if let Some(filter) = &spec.time_filter {
            filter.apply(&mut url, params.since, params.until);
        }
        if let Some(associations) = &spec.associations {
            if !params.associated_objects.is_empty() {
                url.with_query(&associations.param, params.associated_objects.join(","));
            }
        }
        if let Some(fields) = &spec.fields_param {
            if !params.all_fields() {
                match &fields.separator {
                    Some(sep) => {
                        let joined = params
                            .fields
                            .iter()
                            .map(String::as_str)
                            .collect::<Vec<_>>()
                            .join(sep);
                        url.with_query(&fields.param, joined);
                    }
                    None => {
                        url.with_query_values(&fields.param, params.fields.iter().cloned());
                    }
                }
            }
        }
        Ok(url)
    }

    fn require_read(&self) -> Result<&ReadSpec> {
        self.read.as_ref().ok_or(Error::CapabilityNotSupported {
            capability: Capability::Read,
        })
    }

    /// Fetch one page of an object and infer its fields
    pub async fn sample_object(&self, object: &str) -> Result<ObjectMetadata> {
        let spec = self.require_read()?;
        let url = self
            .first_page_url(spec, &ReadParams::new(object, ["*"]))?
            .to_string();
        let response = self
            .json()
            .get_with_headers(&url, &self.request_headers())
            .await
            .map_err(|e| e.for_object(object))?;

        let mut records = self
            .records_extractor(spec, object)
            .extract(response.body()?)?;
        if let Some(key) = spec.marshaller.nested_key() {
            records = records
                .iter()
                .map(|r| flatten_nested_fields(r, key))
                .collect();
        }
        FieldInferrer::new().infer_object(object, &records)
    }

    async fn sample_metadata(&self, objects: &[String]) -> Result<ListObjectMetadataResult> {
        let jobs: Vec<BoxFuture<'_, Result<(String, Result<ObjectMetadata>)>>> = objects
            .iter()
            .map(|name| async move { Ok((name.clone(), self.sample_object(name).await)) }.boxed())
            .collect();
        let outcomes = Simultaneously::new(self.concurrency).run(jobs).await?;

        let mut result = ListObjectMetadataResult::new();
        for (name, outcome) in outcomes {
            match outcome {
                Ok(metadata) => result.insert(name, metadata),
                Err(e) => {
                    debug!(object = %name, error = %e, "Metadata sampling failed");
                    result.insert_error(name, e);
                }
            }
        }
        Ok(result)
    }

    async fn composite_metadata(&self, objects: &[String]) -> Result<ListObjectMetadataResult> {
        let mut result = self
            .schema_registry()?
            .select(self.base.module_id(), objects)?;

        let unknown: Vec<String> = result
            .errors
            .iter()
            .filter(|(_, e)| e.is(ErrorKind::ObjectNotSupported))
            .map(|(name, _)| name.clone())
            .collect();
        if unknown.is_empty() {
            return Ok(result);
        }

        for name in &unknown {
            result.errors.remove(name);
        }
        result.extend(self.sample_metadata(&unknown).await?);
        Ok(result)
    }
}

#[async_trait]
impl<F: FieldsVersion> ObjectMetadataReader for ComponentsConnector<F> {
    async fn list_object_metadata(&self, objects: &[String]) -> Result<ListObjectMetadataResult> {
        if objects.is_empty() {
            return Err(Error::MissingObjects);
        }
        match self.metadata {
            MetadataSource::Static => self.schema_registry()?.select(self.base.module_id(), objects),
            MetadataSource::Sampling => self.sample_metadata(objects).await,
            MetadataSource::Composite => self.composite_metadata(objects).await,
        }
    }
}

#[async_trait]
impl<F: FieldsVersion> Reader for ComponentsConnector<F> {
    async fn read(&self, params: &ReadParams) -> Result<ReadResult> {
        params.validate()?;
        let spec = self.require_read()?;
        self.endpoints
            .check(self.base.module_id(), &params.object_name, Operation::Read)?;

        let url = page_url(
            self.first_page_url(spec, params)?,
            &params.next_page,
            spec.token_param.as_deref(),
        )?
        .to_string();

        let response = self
            .json()
            .get_with_headers(&url, &self.request_headers())
            .await
            .map_err(|e| e.for_object(&params.object_name))?;

        let extractor = self.records_extractor(spec, &params.object_name);
        let mut result = PageParser {
            extractor: &extractor,
            paginator: spec.paginator.as_ref(),
            marshaller: &spec.marshaller,
            fields: &params.fields,
        }
        .parse(&response, &url, &params.next_page)?;

        if let Some(associations) = &spec.associations {
            associations.attach(&mut result.data, &params.associated_objects);
        }
        Ok(result)
    }
}

#[async_trait]
impl<F: FieldsVersion> Writer for ComponentsConnector<F> {
    async fn write(&self, params: &WriteParams) -> Result<WriteResult> {
        params.validate()?;
        let spec = self.write.as_ref().ok_or(Error::CapabilityNotSupported {
            capability: Capability::Write,
        })?;
        self.endpoints
            .check(self.base.module_id(), &params.object_name, Operation::Write)?;

        let id = params.update_id();
        let mut url = self.object_url(&params.object_name)?;
        let method = match id {
            Some(id) => {
                if spec.id_in_path {
                    url.add_path(id);
                }
                spec.update_method
            }
            None => spec.create_method,
        };

        let body = spec
            .encoding
            .encode(&params.object_name, &params.record_data, id);
        let json = self.json();
        let url = url.to_string();
        let response = if spec.encoding.is_form() {
            json.send_form(method, &url, &body).await?
        } else {
            json.send(method, &url, Some(body), &self.request_headers())
                .await?
        };

        let result = parse_write_response(&response, spec.record_path.as_deref(), &spec.id_paths, id)?;
        debug!(
            object = %params.object_name,
            %method,
            record_id = ?result.record_id,
            "Record written"
        );
        Ok(result)
    }
}

#[async_trait]
impl<F: FieldsVersion> Deleter for ComponentsConnector<F> {
    async fn delete(&self, params: &DeleteParams) -> Result<DeleteResult> {
        params.validate()?;
        if !self.delete {
            return Err(Error::CapabilityNotSupported {
                capability: Capability::Delete,
            });
        }
        self.endpoints
            .check(self.base.module_id(), &params.object_name, Operation::Delete)?;

        let mut url = self.object_url(&params.object_name)?;
        url.add_path(&params.record_id);
        let response = self
            .json()
            .send(Method::DELETE, &url.to_string(), None, &self.request_headers())
            .await?;
        if !response.is_success() {
            warn!(code = response.code, "Unexpected delete response");
        }
        Ok(DeleteResult {
            success: response.is_success(),
        })
    }
}

impl<F: FieldsVersion> Connector for ComponentsConnector<F> {
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
        self.read.is_some().then_some(self as &dyn Reader)
    }

    fn as_writer(&self) -> Option<&dyn Writer> {
        self.write.is_some().then_some(self as &dyn Writer)
    }

    fn as_deleter(&self) -> Option<&dyn Deleter> {
        self.delete.then_some(self as &dyn Deleter)
    }

    fn endpoints(&self) -> Option<&EndpointRegistry> {
        Some(&self.endpoints)
    }
}
