//! Declarative pieces of a components connector

use crate::pagination::Paginator;
use crate::read::{EmbeddedAssociations, RecordsExtractor, RowMarshaller, TimeFilter};
use crate::types::Method;
use crate::write::BodyEncoding;
use std::sync::Arc;

/// Page size query parameter and its default value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSize {
    pub param: String,
    pub size: u32,
}

/// How requested fields are sent to the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldsParam {
    pub param: String,
    /// Joins the field names into one value; `None` repeats the parameter
    pub separator: Option<String>,
}

/// How an object is read
#[derive(Debug, Clone)]
pub struct ReadSpec {
    /// `None` uses the schema's response key, or auto-detection without one
    pub records: Option<RecordsExtractor>,
    pub paginator: Arc<dyn Paginator>,
    pub page_size: Option<PageSize>,
    /// Query parameter carrying bare next-page tokens
    pub token_param: Option<String>,
    pub time_filter: Option<TimeFilter>,
    pub fields_param: Option<FieldsParam>,
    pub marshaller: RowMarshaller,
    /// Static query parameters sent with the first page
    pub query: Vec<(String, String)>,
    pub associations: Option<EmbeddedAssociations>,
}

impl ReadSpec {
    pub fn new(paginator: impl Paginator + 'static) -> Self {
        Self {
            records: None,
            paginator: Arc::new(paginator),
            page_size: None,
            token_param: None,
            time_filter: None,
            fields_param: None,
            marshaller: RowMarshaller::default(),
            query: Vec::new(),
            associations: None,
        }
    }

    #[must_use]
    pub fn records(mut self, extractor: RecordsExtractor) -> Self {
        self.records = Some(extractor);
        self
    }

    #[must_use]
    pub fn page_size(mut self, param: impl Into<String>, size: u32) -> Self {
        self.page_size = Some(PageSize {
            param: param.into(),
            size,
        });
        self
    }

    #[must_use]
    pub fn token_param(mut self, param: impl Into<String>) -> Self {
        self.token_param = Some(param.into());
        self
    }

    #[must_use]
    pub fn time_filter(mut self, filter: TimeFilter) -> Self {
        self.time_filter = Some(filter);
        self
    }

    #[must_use]
    pub fn fields_param(mut self, param: impl Into<String>, separator: Option<&str>) -> Self {
        self.fields_param = Some(FieldsParam {
            param: param.into(),
            separator: separator.map(String::from),
        });
        self
    }

    #[must_use]
    pub fn marshaller(mut self, marshaller: RowMarshaller) -> Self {
        self.marshaller = marshaller;
        self
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Records list their associations when asked through a query parameter
    #[must_use]
    pub fn associations(mut self, associations: EmbeddedAssociations) -> Self {
        self.associations = Some(associations);
        self
    }
}

/// How records are created and updated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSpec {
    pub create_method: Method,
    pub update_method: Method,
    /// Updates go to `{object}/{id}`
    pub id_in_path: bool,
    pub encoding: BodyEncoding,
    /// Path of the written record in the response, the whole body when `None`
    pub record_path: Option<String>,
    pub id_paths: Vec<String>,
}

impl Default for WriteSpec {
    fn default() -> Self {
        Self {
            create_method: Method::POST,
            update_method: Method::PATCH,
            id_in_path: true,
            encoding: BodyEncoding::Json,
            record_path: None,
            id_paths: vec!["id".to_string()],
        }
    }
}

impl WriteSpec {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn update_method(mut self, method: Method) -> Self {
        self.update_method = method;
        self
    }

    #[must_use]
    pub fn encoding(mut self, encoding: BodyEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    #[must_use]
    pub fn record_path(mut self, path: impl Into<String>) -> Self {
        self.record_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn id_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.id_paths = paths.into_iter().map(Into::into).collect();
        self
    }
}

/// Where object metadata comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetadataSource {
    /// The embedded schema file
    #[default]
    Static,
    /// Fetch a page of each object and infer fields from its records
    Sampling,
    /// Static first, sampling for objects the schema does not know
    Composite,
}
