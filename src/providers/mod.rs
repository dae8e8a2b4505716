//! Provider registry
//!
//! Static information about every supported provider: base URL template,
//! authentication scheme and the modules it exposes. The registry is
//! embedded at build time and parsed once on first use.

mod info;
mod registry;

pub use info::{ModuleId, ModuleInfo, ProviderInfo};
pub use registry::{provider_info, providers};
