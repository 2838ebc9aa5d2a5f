//! Services of the extraction pipeline
//!
//! Each service owns one concern (decoding, the remote call, packaging,
//! progress, file I/O) so the processor only wires them together.

pub mod archive;
pub mod io;
pub mod normalize;
pub mod progress;
pub mod removal;

pub use archive::{ArchiveEntry, ArchivePackager};
pub use io::UploadIOService;
pub use normalize::ImageNormalizer;
pub use progress::{
    ConsoleProgressReporter, NoOpProgressReporter, ProcessingStage, ProgressReporter,
    ProgressTracker, ProgressUpdate,
};
pub use removal::{decode_response, RemovalService, RemoveBgClient};
