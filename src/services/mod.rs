// src/services/mod.rs
//
// Shared services module containing business logic services
// that can be used across different domain modules

pub mod brief;
pub mod downloads;
pub mod extraction;
pub mod pdf_render;
pub mod screenshot;
pub mod settings;
pub mod storage;

// Re-export commonly used types for convenience
pub use brief::CareerBriefService;
pub use downloads::DownloadTrackingService;
pub use extraction::ExtractionService;
pub use pdf_render::PdfRenderService;
pub use screenshot::{ScreenshotError, ScreenshotService};
pub use settings::SettingsService;
pub use storage::StorageService;
