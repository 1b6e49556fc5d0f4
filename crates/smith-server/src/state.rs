use smith::{assembler::PromptAssembler, compiler::CompilerClient, providers::base::Provider};
use std::sync::Arc;

/// Shared application state. Nothing in here is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub assembler: Arc<PromptAssembler>,
    /// Anthropic provider behind the `/claude` route, if configured
    pub claude: Option<Arc<dyn Provider>>,
    pub compiler: Option<Arc<CompilerClient>>,
}
