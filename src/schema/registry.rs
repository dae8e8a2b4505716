//! Static schema registry

use super::types::{FieldsVersion, ListObjectMetadataResult, Metadata, Module, Object, ObjectMetadata};
use crate::error::{Error, Result};
use crate::providers::ModuleId;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

/// An embedded registry: parsed once, or the parse failure message
pub type EmbeddedSchemas<F> = LazyLock<std::result::Result<SchemaRegistry<F>, String>>;

/// Parse an embedded schema file, keeping the failure as a message
///
/// Meant for `LazyLock` initializers, which cannot return `Error`.
pub fn parse_embedded<F: FieldsVersion>(
    provider: &str,
    json: &str,
) -> std::result::Result<SchemaRegistry<F>, String> {
    SchemaRegistry::from_json(json).map_err(|e| format!("invalid {provider} schemas: {e}"))
}

/// Access an embedded registry
pub fn embedded<F: FieldsVersion>(
    schemas: &'static EmbeddedSchemas<F>,
) -> Result<&'static SchemaRegistry<F>> {
    LazyLock::force(schemas)
        .as_ref()
        .map_err(|message| Error::config(message.clone()))
}

/// Immutable module/object/field lookup over a schema file
#[derive(Debug, Clone)]
pub struct SchemaRegistry<F: FieldsVersion> {
    metadata: Metadata<F>,
}

impl<F: FieldsVersion> SchemaRegistry<F> {
    /// Wrap parsed metadata, canonicalizing module ids
    pub fn new(mut metadata: Metadata<F>) -> Self {
        for (id, module) in &mut metadata.modules {
            module.id = id.clone();
        }
        Self { metadata }
    }

    /// Parse a schema file
    pub fn from_json(json: &str) -> Result<Self> {
        let metadata: Metadata<F> = serde_json::from_str(json)?;
        Ok(Self::new(metadata))
    }

    pub fn metadata(&self) -> &Metadata<F> {
        &self.metadata
    }

    fn module(&self, module: &ModuleId) -> Result<&Module<F>> {
        self.metadata
            .modules
            .get(module)
            .ok_or_else(|| Error::UnsupportedModule {
                module: module.to_string(),
            })
    }

    /// Schema entry of an object
    pub fn object(&self, module: &ModuleId, object: &str) -> Result<&Object<F>> {
        self.module(module)?
            .objects
            .get(object)
            .ok_or_else(|| Error::object_not_supported(object))
    }

    /// Metadata for several objects; unknown names go to `errors`
    pub fn select(&self, module: &ModuleId, objects: &[String]) -> Result<ListObjectMetadataResult> {
        if objects.is_empty() {
            return Err(Error::MissingObjects);
        }

        let module_schema = self.module(module)?;
        let mut result = ListObjectMetadataResult::new();
        for name in objects {
            match module_schema.objects.get(name) {
                Some(object) => {
                    result.insert(name.clone(), F::object_metadata(&object.display_name, &object.fields));
                }
                None => result.insert_error(name.clone(), Error::object_not_supported(name)),
            }
        }
        Ok(result)
    }

    /// Metadata for one object
    pub fn select_one(&self, module: &ModuleId, object: &str) -> Result<ObjectMetadata> {
        let entry = self.object(module, object)?;
        Ok(F::object_metadata(&entry.display_name, &entry.fields))
    }

    /// Path of an object relative to the provider base URL
    pub fn lookup_url_path(&self, module: &ModuleId, object: &str) -> Result<String> {
        let module_schema = self.module(module)?;
        let entry = module_schema
            .objects
            .get(object)
            .ok_or_else(|| Error::object_not_supported(object))?;
        Ok(join_paths(&module_schema.path, &entry.path))
    }

    /// Key under which list responses carry the records
    pub fn lookup_array_field_name(&self, module: &ModuleId, object: &str) -> Result<String> {
        Ok(self.object(module, object)?.response_key.clone())
    }

    /// Object names per module; the root module is also listed under `""`
    pub fn object_names(&self) -> BTreeMap<String, BTreeSet<String>> {
        let mut names = BTreeMap::new();
        for (id, module) in &self.metadata.modules {
            let objects: BTreeSet<String> = module.objects.keys().cloned().collect();
            if id.is_root() {
                names.insert(String::new(), objects.clone());
            }
            names.insert(id.to_string(), objects);
        }
        names
    }
}

fn join_paths(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    match (prefix.is_empty(), path.is_empty()) {
        (true, true) => String::new(),
        (true, false) => format!("/{path}"),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}/{path}"),
    }
}
