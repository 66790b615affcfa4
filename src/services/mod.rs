pub mod artifact_writer;
pub mod form_filler;
pub mod record_validator;
pub mod session_service;
pub mod success_detector;

pub use artifact_writer::ArtifactWriter;
pub use form_filler::{FormField, FormFiller};
pub use record_validator::validate_records;
pub use session_service::SessionService;
pub use success_detector::SuccessDetector;
