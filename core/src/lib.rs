pub mod config;
pub mod document;
pub mod encoding;
pub mod extract;
pub mod gate;
pub mod languages;
pub mod locale;
pub mod paginator;
mod time;
pub mod translate;
pub mod workflow;

pub use config::{GateOptions, SimulatorOptions, ViewerOptions, WorkflowConfig};
pub use document::{Document, DocumentExtension, ALLOWED_EXTENSIONS};
pub use gate::{GateProgress, GateStage};
pub use languages::{
    find_language, supported_languages, LanguageOption, LanguagePair, TextDirection,
};
pub use locale::{
    JsonFilePreferenceStore, LocaleState, MemoryPreferenceStore, PreferenceError,
    PreferenceStore, UiLanguage,
};
pub use paginator::{PageView, Paginator};
pub use time::format_local_date;
pub use translate::{DocumentTranslator, SimulatedTranslator, TranslateError, TranslateRequest};
pub use workflow::{
    CloseGateOutcome, TranslationResult, WorkflowError, WorkflowEvent, WorkflowRunner,
    WorkflowSnapshot, WorkflowStatus,
};
